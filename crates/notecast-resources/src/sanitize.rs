//! Sanitizer interface and the default ammonia-backed implementation.

use ammonia::Builder;

use crate::cards::CARD_ATTR;

/// Strips unsafe and unrecognized markup from rendered output.
///
/// Trusted to be destructive: card content that must survive verbatim goes
/// through the [`CardStore`](crate::CardStore) capture/restore cycle around
/// this call.
pub trait Sanitize {
    fn sanitize(&self, html: &str) -> String;
}

/// Default sanitizer for the rich-HTML destination.
///
/// Keeps structural elements, inline styling, placeholder `id`s, and the
/// card wrapper attribute; everything else is stripped.
pub struct AmmoniaSanitizer {
    builder: Builder<'static>,
}

impl AmmoniaSanitizer {
    #[must_use]
    pub fn new() -> Self {
        let mut builder = Builder::default();
        builder
            .add_tags(["section", "figure", "figcaption", "mark", "input"])
            .add_generic_attributes(["id", "class", "style"])
            .add_tag_attributes("section", [CARD_ATTR])
            .add_tag_attributes("input", ["type", "checked", "disabled"])
            .add_tag_attributes("img", ["alt", "title"])
            .link_rel(None);
        Self { builder }
    }
}

impl Default for AmmoniaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitize for AmmoniaSanitizer {
    fn sanitize(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}
