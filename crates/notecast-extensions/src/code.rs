//! Code block rendering with best-effort highlighting.
//!
//! Highlighting happens in the annotation pass: the walk hook stashes the
//! precomputed markup on the token, keeping the render pass pure. The
//! highlighter is an injected collaborator; an unknown language or a
//! highlighter failure falls back to escaped plain code.

use syntect::highlighting::Theme;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use tracing::debug;

use notecast_pipeline::{
    Destination, Extension, Kind, PipelineError, RenderContext, Token, TokenKind, WalkContext,
    escape_html,
};

/// Best-effort code highlighting service.
pub trait Highlighter: Send {
    /// Highlighted markup for `code`, or `None` when the language is
    /// unknown or highlighting fails.
    fn highlight(&self, code: &str, language: &str) -> Option<String>;
}

/// Syntect-backed highlighter producing inline-styled markup, which is the
/// only styling the strict rich-HTML destination accepts.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    #[must_use]
    pub fn new() -> Self {
        let mut themes = syntect::highlighting::ThemeSet::load_defaults().themes;
        let theme = themes.remove("InspiredGitHub").unwrap_or_default();
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        match highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme) {
            Ok(html) => Some(html),
            Err(err) => {
                debug!(language, error = %err, "highlighting failed");
                None
            }
        }
    }
}

/// Code block extension.
pub struct CodeExtension {
    highlighter: Box<dyn Highlighter>,
}

impl CodeExtension {
    /// Create with the default syntect highlighter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            highlighter: Box::new(SyntectHighlighter::new()),
        }
    }

    /// Create with a custom highlighting service.
    pub fn with_highlighter(highlighter: impl Highlighter + 'static) -> Self {
        Self {
            highlighter: Box::new(highlighter),
        }
    }
}

impl Default for CodeExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl Extension for CodeExtension {
    fn name(&self) -> &'static str {
        "code"
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::CodeBlock]
    }

    fn walk(&mut self, token: &mut Token, ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        if ctx.destination != Destination::RichHtml {
            return Ok(());
        }
        if let TokenKind::CodeBlock {
            lang: Some(lang),
            source,
            rendered,
        } = &mut token.kind
        {
            *rendered = self.highlighter.highlight(source, lang);
        }
        Ok(())
    }

    fn render(&self, token: &Token, _inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::CodeBlock {
            lang,
            source,
            rendered,
        } = &token.kind
        else {
            return String::new();
        };
        match ctx.destination {
            Destination::RichHtml => match rendered {
                Some(markup) => markup.clone(),
                None => match lang {
                    Some(lang) => format!(
                        r#"<pre><code class="language-{}">{}</code></pre>"#,
                        escape_html(lang),
                        escape_html(source)
                    ),
                    None => format!("<pre><code>{}</code></pre>", escape_html(source)),
                },
            },
            Destination::PlainText => format!("{}\n\n", source.trim_end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecast_pipeline::{NullImages, NullRemote, PlaceholderTable, StyleTable};

    struct FakeHighlighter;

    impl Highlighter for FakeHighlighter {
        fn highlight(&self, code: &str, language: &str) -> Option<String> {
            (language == "known").then(|| format!("<pre class=\"hl\">{code}</pre>"))
        }
    }

    fn walk(ext: &mut CodeExtension, token: &mut Token, destination: Destination) {
        let mut placeholders = PlaceholderTable::new();
        let mut remote = NullRemote::new();
        let mut images = NullImages;
        let mut warnings = Vec::new();
        let mut ctx = WalkContext {
            destination,
            placeholders: &mut placeholders,
            remote: &mut remote,
            images: &mut images,
            warnings: &mut warnings,
        };
        ext.walk(token, &mut ctx).unwrap();
    }

    fn code_token(lang: Option<&str>, source: &str) -> Token {
        Token::new(TokenKind::CodeBlock {
            lang: lang.map(str::to_owned),
            source: source.to_owned(),
            rendered: None,
        })
    }

    #[test]
    fn test_walk_stashes_highlight_markup() {
        let mut ext = CodeExtension::with_highlighter(FakeHighlighter);
        let mut token = code_token(Some("known"), "x");
        walk(&mut ext, &mut token, Destination::RichHtml);
        assert!(matches!(
            token.kind,
            TokenKind::CodeBlock {
                rendered: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_language_falls_back_to_escaped() {
        let mut ext = CodeExtension::with_highlighter(FakeHighlighter);
        let mut token = code_token(Some("mystery"), "a < b");
        walk(&mut ext, &mut token, Destination::RichHtml);

        let style = StyleTable::rich_default();
        let placeholders = PlaceholderTable::new();
        let ctx = RenderContext {
            destination: Destination::RichHtml,
            style: &style,
            placeholders: &placeholders,
        };
        let html = ext.render(&token, "", &ctx);
        assert_eq!(
            html,
            r#"<pre><code class="language-mystery">a &lt; b</code></pre>"#
        );
    }

    #[test]
    fn test_plain_destination_keeps_source() {
        let mut ext = CodeExtension::with_highlighter(FakeHighlighter);
        let mut token = code_token(Some("known"), "let x = 1;\n");
        walk(&mut ext, &mut token, Destination::PlainText);

        let style = StyleTable::plain_default();
        let placeholders = PlaceholderTable::new();
        let ctx = RenderContext {
            destination: Destination::PlainText,
            style: &style,
            placeholders: &placeholders,
        };
        assert_eq!(ext.render(&token, "", &ctx), "let x = 1;\n\n");
    }

    #[test]
    fn test_syntect_highlighter_known_language() {
        let highlighter = SyntectHighlighter::new();
        let html = highlighter.highlight("fn main() {}", "rust");
        assert!(html.is_some());
        assert!(html.unwrap().contains("<pre"));
    }

    #[test]
    fn test_syntect_highlighter_unknown_language() {
        let highlighter = SyntectHighlighter::new();
        assert!(highlighter.highlight("x", "no-such-language-xyz").is_none());
    }
}
