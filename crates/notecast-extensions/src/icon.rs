//! `:icon[name]` inline svg icons.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use notecast_pipeline::{
    Destination, Extension, InlineRule, Kind, RenderContext, Token, TokenKind, escape_html,
};

static ICON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":icon\[([a-z0-9_-]+)\]").unwrap());

// 16x16 Octicons-style glyphs, inline so the rich destination needs no
// external assets.
const SVG_STAR: &str = r#"<svg class="nc-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M8 .25a.75.75 0 0 1 .673.418l1.882 3.815 4.21.612a.75.75 0 0 1 .416 1.279l-3.046 2.97.719 4.192a.751.751 0 0 1-1.088.791L8 12.347l-3.766 1.98a.75.75 0 0 1-1.088-.79l.72-4.194L.818 6.374a.75.75 0 0 1 .416-1.28l4.21-.611L7.327.668A.75.75 0 0 1 8 .25Z"></path></svg>"#;
const SVG_HEART: &str = r#"<svg class="nc-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="m8 14.25.345.666a.75.75 0 0 1-.69 0l-.008-.004-.018-.01a7.152 7.152 0 0 1-.31-.17 22.055 22.055 0 0 1-3.434-2.414C2.045 10.731 0 8.35 0 5.5 0 2.836 2.086 1 4.25 1 5.797 1 7.153 1.802 8 3.02 8.847 1.802 10.203 1 11.75 1 13.914 1 16 2.836 16 5.5c0 2.85-2.045 5.231-3.885 6.818a22.066 22.066 0 0 1-3.744 2.584l-.018.01-.006.003h-.002Z"></path></svg>"#;
const SVG_CHECK: &str = r#"<svg class="nc-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M13.78 4.22a.75.75 0 0 1 0 1.06l-7.25 7.25a.75.75 0 0 1-1.06 0L2.22 9.28a.751.751 0 0 1 1.06-1.06L6 10.94l6.72-6.72a.75.75 0 0 1 1.06 0Z"></path></svg>"#;
const SVG_ROCKET: &str = r#"<svg class="nc-icon" viewBox="0 0 16 16" width="16" height="16" aria-hidden="true"><path d="M14.064 0h.186C15.216 0 16 .784 16 1.75v.186a8.752 8.752 0 0 1-2.564 6.186l-.458.459c-.314.314-.641.616-.979.904v3.207c0 .608-.315 1.172-.833 1.49l-2.774 1.707a.749.749 0 0 1-1.11-.418l-.954-3.102a1.214 1.214 0 0 1-.145-.125L3.754 9.816a1.218 1.218 0 0 1-.124-.145L.528 8.717a.749.749 0 0 1-.418-1.11l1.71-2.774A1.748 1.748 0 0 1 3.31 4h3.204c.288-.338.59-.665.904-.979l.459-.458A8.749 8.749 0 0 1 14.064 0Z"></path></svg>"#;

fn svg_for(name: &str) -> Option<&'static str> {
    match name {
        "star" => Some(SVG_STAR),
        "heart" => Some(SVG_HEART),
        "check" => Some(SVG_CHECK),
        "rocket" => Some(SVG_ROCKET),
        _ => None,
    }
}

fn glyph_for(name: &str) -> Option<&'static str> {
    match name {
        "star" => Some("⭐"),
        "heart" => Some("❤️"),
        "check" => Some("✔️"),
        "rocket" => Some("🚀"),
        _ => None,
    }
}

/// Tokenizes and renders `:icon[name]` inline icons.
#[derive(Debug, Default)]
pub struct IconExtension;

impl IconExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for IconExtension {
    fn name(&self) -> &'static str {
        "icon"
    }

    fn inline_rules(&self) -> Vec<InlineRule> {
        vec![InlineRule::new(ICON_PATTERN.clone(), |caps| {
            Token::new(TokenKind::Icon {
                name: caps[1].to_owned(),
            })
        })]
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Icon]
    }

    fn render(&self, token: &Token, _inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::Icon { name } = &token.kind else {
            return String::new();
        };
        match ctx.destination {
            Destination::RichHtml => svg_for(name).map_or_else(
                || {
                    debug!(name = %name, "unknown icon");
                    format!(r#"<span class="nc-icon nc-icon-unknown">{}</span>"#, escape_html(name))
                },
                str::to_owned,
            ),
            Destination::PlainText => glyph_for(name).unwrap_or_default().to_owned(),
        }
    }
}
