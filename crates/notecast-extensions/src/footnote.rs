//! Footnote references and the appended footnote section.
//!
//! References are numbered in source order during the annotation pass;
//! definitions (hoisted into a trailing section by the tree builder) pick up
//! the index of their label. The strictly ordered walk makes the numbering
//! deterministic regardless of how unrelated async constructs resolve.

use std::collections::HashMap;

use notecast_pipeline::{
    Destination, Extension, Kind, PipelineError, RenderContext, Token, TokenKind, WalkContext,
};

#[derive(Debug, Default)]
pub struct FootnoteExtension {
    indices: HashMap<String, usize>,
    next: usize,
}

impl FootnoteExtension {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn index_for(&mut self, label: &str) -> usize {
        if let Some(&index) = self.indices.get(label) {
            return index;
        }
        self.next += 1;
        self.indices.insert(label.to_owned(), self.next);
        self.next
    }
}

impl Extension for FootnoteExtension {
    fn name(&self) -> &'static str {
        "footnote"
    }

    fn prepare(&mut self) {
        self.indices.clear();
        self.next = 0;
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::FootnoteRef, Kind::FootnoteSection, Kind::FootnoteDef]
    }

    fn walk(&mut self, token: &mut Token, _ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        match &mut token.kind {
            TokenKind::FootnoteRef { label, index } => {
                *index = Some(self.index_for(&label.clone()));
            }
            TokenKind::FootnoteDef { label, index } => {
                // Definitions sit at the end of the document; a definition
                // whose label was never referenced still gets a number so it
                // renders instead of disappearing.
                *index = Some(self.index_for(&label.clone()));
            }
            _ => {}
        }
        Ok(())
    }

    fn render(&self, token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        match (&token.kind, ctx.destination) {
            (TokenKind::FootnoteRef { label, index }, Destination::RichHtml) => {
                let text = display_index(label, *index);
                format!(r#"<sup class="nc-fn">[{text}]</sup>"#)
            }
            (TokenKind::FootnoteRef { label, index }, Destination::PlainText) => {
                format!("[{}]", display_index(label, *index))
            }
            (TokenKind::FootnoteSection, Destination::RichHtml) => {
                format!(r#"<section class="nc-footnotes"><hr><ol>{inner}</ol></section>"#)
            }
            (TokenKind::FootnoteSection, Destination::PlainText) => {
                format!("————————\n{inner}\n")
            }
            (TokenKind::FootnoteDef { label, index }, Destination::RichHtml) => {
                format!(
                    r#"<li id="nc-fn-{}">{inner}</li>"#,
                    display_index(label, *index)
                )
            }
            (TokenKind::FootnoteDef { label, index }, Destination::PlainText) => {
                format!("[{}] {}\n", display_index(label, *index), inner.trim())
            }
            _ => inner.to_owned(),
        }
    }
}

fn display_index(label: &str, index: Option<usize>) -> String {
    index.map_or_else(|| label.to_owned(), |i| i.to_string())
}
