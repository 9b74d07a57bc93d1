//! Card/verbatim store.
//!
//! Sanitization strips attributes and markup that remote-rendered card
//! content depends on. The store captures each card's raw source before
//! sanitization and restores it afterwards by rewriting the wrapper's inner
//! content in the whole output string.
//!
//! Wrapper markup: `<section data-card="{id}">...</section>`. The sanitizer
//! must be configured to keep the wrapper element and its `data-card`
//! attribute; everything inside may be mangled freely.

use std::collections::BTreeMap;

use tracing::{debug, warn};

/// Attribute marking a card wrapper.
pub const CARD_ATTR: &str = "data-card";

/// Store of verbatim card sources keyed by wrapper id.
#[derive(Debug, Default)]
pub struct CardStore {
    entries: BTreeMap<String, String>,
}

impl CardStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store one card's raw source.
    pub fn store(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.entries.insert(id.into(), raw.into());
    }

    /// Scan pre-sanitization output and store the contents of every card
    /// wrapper found in it.
    pub fn capture(&mut self, html: &str) {
        let mut rest = html;
        while let Some((id, content, remainder)) = next_wrapper(rest) {
            debug!(id, "captured card content");
            self.store(id, content);
            rest = remainder;
        }
    }

    /// Restore every stored card in the sanitized output.
    ///
    /// For each stored id the wrapper marker is located and its
    /// (sanitizer-mangled) contents replaced with the originally stored raw
    /// source. A missing wrapper is skipped and logged; that card stays
    /// sanitized but the rest of the document is unaffected.
    pub fn restore(&self, html: &mut String) {
        for (id, raw) in &self.entries {
            if !restore_one(html, id, raw) {
                warn!(id = %id, "card wrapper missing after sanitization; skipping restore");
            }
        }
    }

    /// Clear the store. Must be called on document switch.
    pub fn cleanup(&mut self) {
        self.entries.clear();
    }
}

/// Locate the next wrapper in `html`.
///
/// Returns `(id, content, rest_after_wrapper)`.
fn next_wrapper(html: &str) -> Option<(&str, &str, &str)> {
    let attr = format!("{CARD_ATTR}=\"");
    let marker = html.find(&attr)?;
    let id_start = marker + attr.len();
    let id_len = html[id_start..].find('"')?;
    let id = &html[id_start..id_start + id_len];

    let open_end = html[id_start + id_len..].find('>')?;
    let content_start = id_start + id_len + open_end + 1;
    let content_len = html[content_start..].find("</section>")?;
    let content = &html[content_start..content_start + content_len];
    let rest = &html[content_start + content_len..];
    Some((id, content, rest))
}

fn restore_one(html: &mut String, id: &str, raw: &str) -> bool {
    let attr = format!("{CARD_ATTR}=\"{id}\"");
    let Some(marker) = html.find(&attr) else {
        return false;
    };
    let Some(open_end) = html[marker..].find('>') else {
        return false;
    };
    let content_start = marker + open_end + 1;
    let Some(content_len) = html[content_start..].find("</section>") else {
        return false;
    };
    html.replace_range(content_start..content_start + content_len, raw);
    true
}
