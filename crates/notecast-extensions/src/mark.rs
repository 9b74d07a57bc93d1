//! `==marked==` highlight spans.

use std::sync::LazyLock;

use regex::Regex;

use notecast_pipeline::{
    Destination, Extension, InlineRule, Kind, RenderContext, Token, TokenKind,
};

static MARK_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==([^=\n]+)==").unwrap());

/// Tokenizes and renders `==text==` highlight spans.
#[derive(Debug, Default)]
pub struct MarkExtension;

impl MarkExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for MarkExtension {
    fn name(&self) -> &'static str {
        "mark"
    }

    fn inline_rules(&self) -> Vec<InlineRule> {
        vec![InlineRule::new(MARK_PATTERN.clone(), |caps| {
            Token::with_children(
                TokenKind::Mark,
                vec![Token::new(TokenKind::Text(caps[1].to_owned()))],
            )
        })]
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Mark]
    }

    fn render(&self, _token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        match ctx.destination {
            Destination::RichHtml => format!("<mark>{inner}</mark>"),
            Destination::PlainText => format!("「{inner}」"),
        }
    }
}
