//! Remote rendering: single-flight queue and endpoint client.
//!
//! Formula and widget constructs cannot be rendered locally; they go through
//! an external, authenticated, rate-sensitive endpoint. This crate provides
//! the [`RenderQueue`] that serializes all such traffic (FIFO, one request in
//! flight, per-input caching) and the [`RemoteClient`] that speaks to the
//! endpoint over HTTP.
//!
//! The queue implements the pipeline's `RemoteRenderer` trait, so it is
//! injected into a parse session as-is:
//!
//! ```no_run
//! use notecast_pipeline::{Destination, Document, NullImages, Pipeline, Services};
//! use notecast_remote::{RemoteClient, RenderQueue};
//!
//! let client = RemoteClient::new("https://render.example.com").with_token("secret");
//! let mut queue = RenderQueue::new(client);
//! let mut images = NullImages;
//! let mut services = Services { remote: &mut queue, images: &mut images };
//! # let mut pipeline = Pipeline::builder().build().unwrap();
//! let rendered = pipeline.parse(
//!     &Document::new("doc", "$x^2$"),
//!     Destination::RichHtml,
//!     &mut services,
//! );
//! ```

mod client;
mod error;
mod queue;

pub use client::{RemoteClient, RenderService};
pub use error::RemoteError;
pub use queue::RenderQueue;
