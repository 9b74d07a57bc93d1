//! Link references for destinations without hyperlinks.
//!
//! Neither destination supports clickable external links, so external links
//! render as their text followed by a numbered reference, and the
//! postprocess hook appends a references section listing the URLs.
//! Fragment, mailto, and relative links render as plain text.

use notecast_pipeline::{
    Destination, Extension, Kind, PipelineError, RenderContext, Token, TokenKind, WalkContext,
    escape_html,
};

/// Collects external links and renders them as numbered references.
#[derive(Debug, Default)]
pub struct LinkExtension {
    urls: Vec<String>,
}

impl LinkExtension {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reference_for(&mut self, url: &str) -> usize {
        if let Some(position) = self.urls.iter().position(|known| known == url) {
            return position + 1;
        }
        self.urls.push(url.to_owned());
        self.urls.len()
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl Extension for LinkExtension {
    fn name(&self) -> &'static str {
        "links"
    }

    fn prepare(&mut self) {
        self.urls.clear();
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Link]
    }

    fn walk(&mut self, token: &mut Token, _ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        if let TokenKind::Link { url, reference, .. } = &mut token.kind {
            if is_external(url) {
                *reference = Some(self.reference_for(&url.clone()));
            }
        }
        Ok(())
    }

    fn render(&self, token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::Link { reference, .. } = &token.kind else {
            return inner.to_owned();
        };
        match (reference, ctx.destination) {
            (Some(n), Destination::RichHtml) => {
                format!(r#"{inner}<sup class="nc-ref">[{n}]</sup>"#)
            }
            (Some(n), Destination::PlainText) => format!("{inner}[{n}]"),
            (None, _) => inner.to_owned(),
        }
    }

    fn postprocess(&mut self, output: &mut String, ctx: &RenderContext<'_>) {
        if self.urls.is_empty() {
            return;
        }
        match ctx.destination {
            Destination::RichHtml => {
                output.push_str(r#"<section class="nc-refs"><h3>References</h3><ol>"#);
                for url in &self.urls {
                    output.push_str(&format!("<li>{}</li>", escape_html(url)));
                }
                output.push_str("</ol></section>");
            }
            Destination::PlainText => {
                output.push_str("\n\nReferences\n");
                for (index, url) in self.urls.iter().enumerate() {
                    output.push_str(&format!("[{}] {url}\n", index + 1));
                }
            }
        }
    }

    fn cleanup(&mut self) {
        self.urls.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecast_pipeline::{NullImages, NullRemote, PlaceholderTable, StyleTable};
    use pretty_assertions::assert_eq;

    fn walk(ext: &mut LinkExtension, token: &mut Token) {
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
        ext.walk(token, &mut ctx).unwrap();
    }

    fn link(url: &str) -> Token {
        Token::new(TokenKind::Link {
            url: url.to_owned(),
            title: String::new(),
            reference: None,
        })
    }

    #[test]
    fn test_external_links_numbered_in_order() {
        let mut ext = LinkExtension::new();
        ext.prepare();
        let mut a = link("https://a.example");
        let mut b = link("https://b.example");
        let mut a_again = link("https://a.example");
        walk(&mut ext, &mut a);
        walk(&mut ext, &mut b);
        walk(&mut ext, &mut a_again);

        let reference = |token: &Token| match token.kind {
            TokenKind::Link { reference, .. } => reference,
            _ => None,
        };
        assert_eq!(reference(&a), Some(1));
        assert_eq!(reference(&b), Some(2));
        assert_eq!(reference(&a_again), Some(1));
    }

    #[test]
    fn test_internal_links_untouched() {
        let mut ext = LinkExtension::new();
        ext.prepare();
        let mut anchor = link("#section");
        let mut mail = link("mailto:x@example.com");
        walk(&mut ext, &mut anchor);
        walk(&mut ext, &mut mail);
        assert!(matches!(
            anchor.kind,
            TokenKind::Link {
                reference: None,
                ..
            }
        ));
        assert!(matches!(
            mail.kind,
            TokenKind::Link {
                reference: None,
                ..
            }
        ));
    }

    #[test]
    fn test_postprocess_appends_references() {
        let mut ext = LinkExtension::new();
        ext.prepare();
        let mut a = link("https://a.example");
        walk(&mut ext, &mut a);

        let placeholders = PlaceholderTable::new();
        let style = StyleTable::rich_default();
        let ctx = RenderContext {
            destination: Destination::RichHtml,
            style: &style,
            placeholders: &placeholders,
        };
        let mut output = "<p>body</p>".to_owned();
        ext.postprocess(&mut output, &ctx);
        assert_eq!(
            output,
            r#"<p>body</p><section class="nc-refs"><h3>References</h3><ol><li>https://a.example</li></ol></section>"#
        );
    }

    #[test]
    fn test_postprocess_noop_without_links() {
        let mut ext = LinkExtension::new();
        ext.prepare();
        let placeholders = PlaceholderTable::new();
        let style = StyleTable::plain_default();
        let ctx = RenderContext {
            destination: Destination::PlainText,
            style: &style,
            placeholders: &placeholders,
        };
        let mut output = "text".to_owned();
        ext.postprocess(&mut output, &ctx);
        assert_eq!(output, "text");
    }
}
