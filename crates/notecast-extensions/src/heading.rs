//! Heading numbering and anchors.
//!
//! Assigns section numbers (strictly increasing in source order) to headings
//! of the configured level, and slugged anchor ids with duplicate suffixing
//! (`faq`, `faq-1`, ...) for the rich-HTML destination.

use std::collections::HashMap;

use notecast_pipeline::{
    Destination, Extension, Kind, PipelineError, RenderContext, Token, TokenKind, WalkContext,
    escape_html,
};

/// Heading renderer with per-session counters.
#[derive(Debug)]
pub struct HeadingExtension {
    /// Level that receives sequence numbers; `None` disables numbering.
    numbered_level: Option<u8>,
    counter: u32,
    slug_counts: HashMap<String, u32>,
}

impl HeadingExtension {
    #[must_use]
    pub fn new() -> Self {
        Self {
            numbered_level: Some(2),
            counter: 0,
            slug_counts: HashMap::new(),
        }
    }

    /// Set the heading level that receives sequence numbers.
    #[must_use]
    pub fn numbered_level(mut self, level: Option<u8>) -> Self {
        self.numbered_level = level;
        self
    }

    fn next_anchor(&mut self, text: &str) -> String {
        let slug = slugify(text);
        let count = self.slug_counts.entry(slug.clone()).or_insert(0);
        let anchor = if *count == 0 {
            slug.clone()
        } else {
            format!("{slug}-{count}")
        };
        *count += 1;
        anchor
    }
}

impl Default for HeadingExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for HeadingExtension {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn prepare(&mut self) {
        self.counter = 0;
        self.slug_counts.clear();
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Heading]
    }

    fn walk(&mut self, token: &mut Token, _ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        let text = token.plain_text();
        if let TokenKind::Heading { level, number, anchor } = &mut token.kind {
            *anchor = Some(self.next_anchor(&text));
            if self.numbered_level == Some(*level) {
                self.counter += 1;
                *number = Some(format!("{:02}", self.counter));
            }
        }
        Ok(())
    }

    fn render(&self, token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::Heading {
            level,
            number,
            anchor,
        } = &token.kind
        else {
            return inner.to_owned();
        };
        match ctx.destination {
            Destination::RichHtml => {
                let id_attr = anchor
                    .as_deref()
                    .map(|id| format!(r#" id="{}""#, escape_html(id)))
                    .unwrap_or_default();
                match number {
                    Some(number) => format!(
                        r#"<h{level}{id_attr}><span class="nc-h-num">{number}</span> {}</h{level}>"#,
                        inner.trim()
                    ),
                    None => format!("<h{level}{id_attr}>{}</h{level}>", inner.trim()),
                }
            }
            Destination::PlainText => {
                let prefix = ctx.style.heading_prefix(*level);
                match number {
                    Some(number) => format!("{prefix}{number} {}\n\n", inner.trim()),
                    None => format!("{prefix}{}\n\n", inner.trim()),
                }
            }
        }
    }
}

/// Slug from heading text: lowercase alphanumerics with hyphens.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_hyphen = true;
    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_owned()
}
