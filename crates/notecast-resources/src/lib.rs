//! Resource lifecycle managers for the publishing pipeline.
//!
//! Two registries coordinate render-time bookkeeping with the caller-driven
//! upload/resolve phase:
//!
//! - [`ImageRegistry`] maps locally referenced images to canonical keys,
//!   uploads each resource once, and rewrites references to the resolved
//!   locators.
//! - [`CardStore`] captures verbatim card content before sanitization and
//!   restores it afterwards.
//!
//! Both are explicitly constructed per document scope and must be
//! [`cleanup`](ImageRegistry::cleanup)-ed on document switch. The
//! [`Sanitize`] trait and its ammonia-backed default live here too, since
//! the card store only exists to survive it.

mod cards;
mod error;
mod images;
mod sanitize;
mod uploader;

pub use cards::{CARD_ATTR, CardStore};
pub use error::UploadError;
pub use images::{ImageRegistry, canonical_key};
pub use sanitize::{AmmoniaSanitizer, Sanitize};
pub use uploader::{HttpImageUploader, ImageUploader};
