//! Extension pipeline and token tree for markdown rendering.
//!
//! This crate is the core of the rendering engine: it turns markdown source
//! into an owned token tree (pulldown-cmark is the token-producing
//! primitive), lets composed [`Extension`]s annotate the tree in document
//! order, resolves remote-rendered constructs through an injected
//! [`RemoteRenderer`], and serializes the annotated tree for a
//! [`Destination`].
//!
//! # Render phases
//!
//! 1. **Build**: events fold into a [`Token`] tree; extension inline rules
//!    split text segments; blockquotes are classified once via
//!    [`classify_quote`].
//! 2. **Annotate**: `walk` hooks run per token, strictly in document order,
//!    mutating tokens and allocating [`PlaceholderId`]s for async content.
//! 3. **Resolve**: the remote renderer drains its queue and fulfills the
//!    session's [`PlaceholderTable`].
//! 4. **Serialize**: one pass over the tree per destination; extensions
//!    render their claimed kinds, everything else has a base default.
//! 5. **Postprocess**: extensions rewrite the output string (appended
//!    sections, cleanups).
//!
//! # Example
//!
//! ```
//! use notecast_pipeline::{
//!     Destination, Document, NullImages, NullRemote, Pipeline, Services,
//! };
//!
//! let mut pipeline = Pipeline::builder().build().unwrap();
//! let mut remote = NullRemote::new();
//! let mut images = NullImages;
//! let mut services = Services { remote: &mut remote, images: &mut images };
//! let rendered = pipeline
//!     .parse(
//!         &Document::new("doc-1", "# Hello\n\n**World**"),
//!         Destination::RichHtml,
//!         &mut services,
//!     )
//!     .unwrap();
//! assert!(rendered.output.contains("<strong>World</strong>"));
//! ```

mod builder;
mod error;
mod extension;
mod html;
mod pipeline;
mod placeholder;
mod plaintext;
mod style;
mod tree;

pub use builder::{TreeBuilder, parser_options};
pub use error::PipelineError;
pub use extension::{
    Extension, ImageSink, InlineRule, JobKind, NullImages, NullRemote, RemoteRenderer,
    RenderContext, Services, WalkContext,
};
pub use html::{async_span, escape_html};
pub use pipeline::{Document, Pipeline, PipelineBuilder, Rendered};
pub use placeholder::{PlaceholderId, PlaceholderTable, RemoteOutcome, update_element_by_id};
pub use plaintext::cleanup as plaintext_cleanup;
pub use style::{Destination, OrderedStyle, StyleTable};
pub use tree::{CalloutKind, Kind, QuoteClass, Token, TokenKind, classify_quote};
