//! Callout boxes from classified blockquotes.

use notecast_pipeline::{
    CalloutKind, Extension, Kind, RenderContext, Destination, Token, TokenKind, escape_html,
};

/// Emoji used for callouts on plain-text destinations.
fn plain_glyph(kind: CalloutKind) -> &'static str {
    match kind {
        CalloutKind::Note => "📝",
        CalloutKind::Tip => "💡",
        CalloutKind::Important => "❗",
        CalloutKind::Warning => "⚠️",
        CalloutKind::Caution => "🚫",
    }
}

/// Renders `[!note]`-style callouts.
///
/// Classification happens during tree building; this extension only owns the
/// per-destination rendering of the already-tagged variant.
#[derive(Debug, Default)]
pub struct CalloutExtension;

impl CalloutExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for CalloutExtension {
    fn name(&self) -> &'static str {
        "callout"
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Callout]
    }

    fn render(&self, token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::Callout { kind, title } = &token.kind else {
            return inner.to_owned();
        };
        let label = title.as_deref().unwrap_or_else(|| kind.label());
        match ctx.destination {
            Destination::RichHtml => format!(
                r#"<section class="nc-callout nc-callout-{}"><p class="nc-callout-title">{}</p>{inner}</section>"#,
                kind.css_class(),
                escape_html(label)
            ),
            Destination::PlainText => {
                let mut out = format!("{} {label}\n", plain_glyph(*kind));
                for line in inner.trim_end().lines() {
                    out.push_str("▎");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
                out
            }
        }
    }
}
