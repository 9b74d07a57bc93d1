//! Local image references.
//!
//! Supports both relative markdown images (detected by the tree builder) and
//! `![[wiki-style]]` embeds (tokenized here). The annotation pass registers
//! every reference with the injected image registry; the rendered `src`
//! holds the canonical key, which the caller-driven upload/rewrite phase
//! later replaces with the resolved remote locator.

use std::sync::LazyLock;

use regex::Regex;

use notecast_pipeline::{
    Destination, Extension, InlineRule, Kind, PipelineError, RenderContext, Token, TokenKind,
    WalkContext, escape_html,
};

static WIKI_EMBED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]\n]+)\]\]").unwrap());

/// Registers local images and renders canonical-key references.
#[derive(Debug, Default)]
pub struct LocalImageExtension;

impl LocalImageExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for LocalImageExtension {
    fn name(&self) -> &'static str {
        "local-image"
    }

    fn inline_rules(&self) -> Vec<InlineRule> {
        vec![InlineRule::new(WIKI_EMBED_PATTERN.clone(), |caps| {
            Token::new(TokenKind::LocalImage {
                origin: caps[1].trim().to_owned(),
                key: None,
            })
        })]
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::LocalImage]
    }

    fn walk(&mut self, token: &mut Token, ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        if let TokenKind::LocalImage { origin, key } = &mut token.kind {
            *key = Some(ctx.images.register(origin));
        }
        Ok(())
    }

    fn render(&self, token: &Token, _inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::LocalImage { origin, key } = &token.kind else {
            return String::new();
        };
        let src = key.as_deref().unwrap_or(origin);
        match ctx.destination {
            Destination::RichHtml => {
                let alt = token.plain_text();
                format!(
                    r#"<img src="{}" alt="{}">"#,
                    escape_html(src),
                    escape_html(&alt)
                )
            }
            Destination::PlainText => {
                let alt = token.plain_text();
                if alt.is_empty() {
                    format!("[image: {src}]")
                } else {
                    format!("[image: {alt}]")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecast_pipeline::{ImageSink, NullRemote, PlaceholderTable, StyleTable, TreeBuilder};
    use pretty_assertions::assert_eq;

    /// Image sink that normalizes `./` prefixes, like the real registry.
    #[derive(Default)]
    struct RecordingSink {
        registered: Vec<String>,
    }

    impl ImageSink for RecordingSink {
        fn register(&mut self, origin: &str) -> String {
            let key = origin.trim_start_matches("./").to_owned();
            self.registered.push(key.clone());
            key
        }
    }

    #[test]
    fn test_wiki_embed_rule() {
        let rules = LocalImageExtension::new().inline_rules();
        let doc = TreeBuilder::new(&rules).build("see ![[img/pic.png]] here");
        let paragraph = &doc.children[0];
        assert!(paragraph.children.iter().any(|t| matches!(
            &t.kind,
            TokenKind::LocalImage { origin, .. } if origin == "img/pic.png"
        )));
    }

    #[test]
    fn test_walk_registers_and_stores_key() {
        let mut ext = LocalImageExtension::new();
        let mut token = Token::new(TokenKind::LocalImage {
            origin: "./img/pic.png".to_owned(),
            key: None,
        });
        let mut placeholders = PlaceholderTable::new();
        let mut remote = NullRemote::new();
        let mut sink = RecordingSink::default();
        let mut warnings = Vec::new();
        let mut ctx = WalkContext {
            destination: Destination::RichHtml,
            placeholders: &mut placeholders,
            remote: &mut remote,
            images: &mut sink,
            warnings: &mut warnings,
        };
        ext.walk(&mut token, &mut ctx).unwrap();
        assert_eq!(sink.registered, vec!["img/pic.png"]);
        assert!(matches!(
            token.kind,
            TokenKind::LocalImage { key: Some(_), .. }
        ));
    }

    #[test]
    fn test_rich_render_uses_canonical_key() {
        let ext = LocalImageExtension::new();
        let token = Token::new(TokenKind::LocalImage {
            origin: "./img/pic.png".to_owned(),
            key: Some("img/pic.png".to_owned()),
        });
        let placeholders = PlaceholderTable::new();
        let style = StyleTable::rich_default();
        let ctx = RenderContext {
            destination: Destination::RichHtml,
            style: &style,
            placeholders: &placeholders,
        };
        assert_eq!(
            ext.render(&token, "", &ctx),
            r#"<img src="img/pic.png" alt="">"#
        );
    }
}
