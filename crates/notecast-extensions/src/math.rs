//! Inline and block math via the remote render queue.
//!
//! Math cannot be rendered locally for the rich destination; the annotation
//! pass allocates a placeholder per construct and submits the expression to
//! the remote queue. The plain-text destination keeps the source notation
//! and never touches the network.

use notecast_pipeline::{
    Destination, Extension, JobKind, Kind, PipelineError, RenderContext, Token, TokenKind,
    WalkContext, async_span, escape_html,
};

/// Renders `$...$` and `$$...$$` through the remote endpoint.
#[derive(Debug, Default)]
pub struct MathExtension;

impl MathExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for MathExtension {
    fn name(&self) -> &'static str {
        "math"
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::MathInline, Kind::MathBlock]
    }

    fn walk(&mut self, token: &mut Token, ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        if ctx.destination != Destination::RichHtml {
            return Ok(());
        }
        match &mut token.kind {
            TokenKind::MathInline {
                source,
                placeholder,
            } => {
                let id = ctx.placeholders.allocate();
                ctx.remote.submit(JobKind::MathInline, source, id);
                *placeholder = Some(id);
            }
            TokenKind::MathBlock {
                source,
                placeholder,
            } => {
                let id = ctx.placeholders.allocate();
                ctx.remote.submit(JobKind::MathBlock, source, id);
                *placeholder = Some(id);
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&self, token: &Token, _inner: &str, ctx: &RenderContext<'_>) -> String {
        match (&token.kind, ctx.destination) {
            (
                TokenKind::MathInline {
                    source,
                    placeholder,
                },
                Destination::RichHtml,
            ) => async_span(
                *placeholder,
                ctx,
                &format!("<code>{}</code>", escape_html(source)),
            ),
            (
                TokenKind::MathBlock {
                    source,
                    placeholder,
                },
                Destination::RichHtml,
            ) => {
                let body = async_span(
                    *placeholder,
                    ctx,
                    &format!("<code>{}</code>", escape_html(source)),
                );
                format!(r#"<section class="nc-math">{body}</section>"#)
            }
            (
                TokenKind::MathInline { source, .. } | TokenKind::MathBlock { source, .. },
                Destination::PlainText,
            ) => format!("${source}$"),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecast_pipeline::{
        NullImages, NullRemote, PlaceholderTable, RemoteOutcome, RemoteRenderer, StyleTable,
    };
    use pretty_assertions::assert_eq;

    fn math_inline(source: &str) -> Token {
        Token::new(TokenKind::MathInline {
            source: source.to_owned(),
            placeholder: None,
        })
    }

    #[test]
    fn test_walk_allocates_and_submits() {
        let mut ext = MathExtension::new();
        let mut token = math_inline("x^2");
        let mut placeholders = PlaceholderTable::new();
        let mut remote = NullRemote::new();
        let mut images = NullImages;
        let mut warnings = Vec::new();
        let mut ctx = WalkContext {
            destination: Destination::RichHtml,
            placeholders: &mut placeholders,
            remote: &mut remote,
            images: &mut images,
            warnings: &mut warnings,
        };
        ext.walk(&mut token, &mut ctx).unwrap();
        assert_eq!(placeholders.allocated(), 1);
    }

    #[test]
    fn test_plain_destination_skips_network() {
        let mut ext = MathExtension::new();
        let mut token = math_inline("x^2");
        let mut placeholders = PlaceholderTable::new();
        let mut remote = NullRemote::new();
        let mut images = NullImages;
        let mut warnings = Vec::new();
        let mut ctx = WalkContext {
            destination: Destination::PlainText,
            placeholders: &mut placeholders,
            remote: &mut remote,
            images: &mut images,
            warnings: &mut warnings,
        };
        ext.walk(&mut token, &mut ctx).unwrap();
        assert_eq!(placeholders.allocated(), 0);
    }

    #[test]
    fn test_rich_render_resolved() {
        let ext = MathExtension::new();
        let mut placeholders = PlaceholderTable::new();
        let id = placeholders.allocate();
        placeholders.fulfill(id, RemoteOutcome::Rendered("<svg>x²</svg>".to_owned()));
        let mut token = math_inline("x^2");
        if let TokenKind::MathInline { placeholder, .. } = &mut token.kind {
            *placeholder = Some(id);
        }
        let style = StyleTable::rich_default();
        let ctx = RenderContext {
            destination: Destination::RichHtml,
            style: &style,
            placeholders: &placeholders,
        };
        assert_eq!(
            ext.render(&token, "", &ctx),
            r#"<span id="nc-async-0"><svg>x²</svg></span>"#
        );
    }

    #[test]
    fn test_plain_render_keeps_notation() {
        let ext = MathExtension::new();
        let token = math_inline("x^2");
        let style = StyleTable::plain_default();
        let placeholders = PlaceholderTable::new();
        let ctx = RenderContext {
            destination: Destination::PlainText,
            style: &style,
            placeholders: &placeholders,
        };
        assert_eq!(ext.render(&token, "", &ctx), "$x^2$");
    }
}
