//! Extension pipeline: composition, annotation, resolution, serialization.

use std::collections::HashMap;

use crate::builder::TreeBuilder;
use crate::error::PipelineError;
use crate::extension::{
    Extension, InlineRule, RenderContext, Services, WalkContext,
};
use crate::placeholder::PlaceholderTable;
use crate::style::{Destination, StyleTable};
use crate::tree::{Kind, Token, TokenKind};
use crate::{html, plaintext};

/// A source document with a stable identity.
///
/// The identity drives registry reset decisions in callers: resource and
/// card registries must be cleaned up when it changes.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Result of rendering one document for one destination.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Serialized output.
    pub output: String,
    /// Title extracted from the first H1 heading, if any.
    pub title: Option<String>,
    /// Non-fatal warnings accumulated during the session.
    pub warnings: Vec<String>,
    /// Placeholder ids allocated this session.
    pub placeholders_allocated: usize,
    /// Placeholder ids still pending after the resolve phase.
    pub placeholders_pending: usize,
}

/// Builder for a [`Pipeline`].
pub struct PipelineBuilder {
    extensions: Vec<Box<dyn Extension>>,
    rich_style: StyleTable,
    plain_style: StyleTable,
}

impl PipelineBuilder {
    /// Register an extension. Registration order is walk order and inline
    /// rule precedence.
    #[must_use]
    pub fn extension(mut self, extension: impl Extension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    /// Override the rich-HTML style table.
    #[must_use]
    pub fn rich_style(mut self, style: StyleTable) -> Self {
        self.rich_style = style;
        self
    }

    /// Override the plain-text style table.
    #[must_use]
    pub fn plain_style(mut self, style: StyleTable) -> Self {
        self.plain_style = style;
        self
    }

    /// Build the pipeline, validating renderer claims.
    ///
    /// Each node kind may be claimed by at most one extension; conflicting
    /// claims are a build error rather than a silent precedence rule.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        let mut dispatch: HashMap<Kind, usize> = HashMap::new();
        for (index, extension) in self.extensions.iter().enumerate() {
            for &kind in extension.claims() {
                if let Some(&owner) = dispatch.get(&kind) {
                    return Err(PipelineError::RendererConflict {
                        kind,
                        first: self.extensions[owner].name(),
                        second: extension.name(),
                    });
                }
                dispatch.insert(kind, index);
            }
        }
        let rules = self
            .extensions
            .iter()
            .flat_map(|extension| extension.inline_rules())
            .collect();
        Ok(Pipeline {
            extensions: self.extensions,
            dispatch,
            rules,
            rich_style: self.rich_style,
            plain_style: self.plain_style,
        })
    }
}

/// Composed parse pipeline.
///
/// Extensions persist across parses; per-session state is reset through the
/// `prepare`/`cleanup` contract.
pub struct Pipeline {
    extensions: Vec<Box<dyn Extension>>,
    dispatch: HashMap<Kind, usize>,
    rules: Vec<InlineRule>,
    rich_style: StyleTable,
    plain_style: StyleTable,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("extensions", &self.extensions.len())
            .field("dispatch", &self.dispatch)
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Pipeline {
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder {
            extensions: Vec::new(),
            rich_style: StyleTable::rich_default(),
            plain_style: StyleTable::plain_default(),
        }
    }

    /// Parse one document for one destination.
    ///
    /// Two-phase render: the annotation pass walks the tree in document
    /// order (extensions mutate tokens, submit remote jobs, register
    /// resources), the resolve phase drains the remote queue into the
    /// placeholder table, and a single serialization pass produces the
    /// output. Any hook error aborts the whole parse.
    pub fn parse(
        &mut self,
        document: &Document,
        destination: Destination,
        services: &mut Services<'_>,
    ) -> Result<Rendered, PipelineError> {
        let mut tree = TreeBuilder::new(&self.rules).build(&document.text);
        let mut placeholders = PlaceholderTable::new();
        let mut warnings = Vec::new();

        for extension in &mut self.extensions {
            extension.prepare();
        }

        {
            let mut ctx = WalkContext {
                destination,
                placeholders: &mut placeholders,
                remote: &mut *services.remote,
                images: &mut *services.images,
                warnings: &mut warnings,
            };
            walk_tokens(&mut tree, &mut self.extensions, &mut ctx)?;
        }

        services.remote.resolve(&mut placeholders);

        let title = extract_title(&tree);
        let style = match destination {
            Destination::RichHtml => &self.rich_style,
            Destination::PlainText => &self.plain_style,
        };
        let ctx = RenderContext {
            destination,
            style,
            placeholders: &placeholders,
        };

        let mut output = {
            let dispatch = &self.dispatch;
            let extensions = &self.extensions;
            let ext_render = |token: &Token, inner: &str, ctx: &RenderContext<'_>| {
                dispatch
                    .get(&token.kind.tag())
                    .map(|&index| extensions[index].render(token, inner, ctx))
            };
            match destination {
                Destination::RichHtml => html::render_document(&tree, &ctx, &ext_render),
                Destination::PlainText => plaintext::render_document(&tree, &ctx, &ext_render),
            }
        };

        for extension in &mut self.extensions {
            extension.postprocess(&mut output, &ctx);
        }
        // Final defensive pass for plain destinations: strip residual markup
        // and collapse blank-line runs, after postprocess hooks have appended
        // their sections.
        if destination == Destination::PlainText {
            output = plaintext::cleanup(&output);
        }
        for extension in &mut self.extensions {
            extension.cleanup();
        }

        Ok(Rendered {
            output,
            title,
            warnings,
            placeholders_allocated: placeholders.allocated(),
            placeholders_pending: placeholders.pending(),
        })
    }
}

/// Depth-first, document-order walk; every extension sees every token, each
/// hook completed before the next token is visited.
fn walk_tokens(
    token: &mut Token,
    extensions: &mut [Box<dyn Extension>],
    ctx: &mut WalkContext<'_>,
) -> Result<(), PipelineError> {
    for extension in extensions.iter_mut() {
        extension.walk(token, ctx)?;
    }
    for child in &mut token.children {
        walk_tokens(child, extensions, ctx)?;
    }
    Ok(())
}

fn extract_title(tree: &Token) -> Option<String> {
    tree.children.iter().find_map(|token| match &token.kind {
        TokenKind::Heading { level: 1, .. } => Some(token.plain_text()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::{NullImages, NullRemote};
    use crate::tree::Kind;
    use pretty_assertions::assert_eq;

    fn parse(pipeline: &mut Pipeline, text: &str, destination: Destination) -> Rendered {
        let mut remote = NullRemote::new();
        let mut images = NullImages;
        let mut services = Services {
            remote: &mut remote,
            images: &mut images,
        };
        pipeline
            .parse(&Document::new("doc", text), destination, &mut services)
            .expect("parse")
    }

    #[test]
    fn test_minimal_document_rich() {
        let mut pipeline = Pipeline::builder().build().unwrap();
        let rendered = parse(&mut pipeline, "# Title\n\nSome *text*.", Destination::RichHtml);
        assert_eq!(
            rendered.output,
            "<h1>Title</h1><p>Some <em>text</em>.</p>"
        );
        assert_eq!(rendered.title, Some("Title".to_owned()));
        assert_eq!(rendered.placeholders_allocated, 0);
        assert_eq!(rendered.placeholders_pending, 0);
    }

    #[test]
    fn test_minimal_document_plain() {
        let mut pipeline = Pipeline::builder().build().unwrap();
        let rendered = parse(&mut pipeline, "# Title\n\nSome *text*.", Destination::PlainText);
        assert_eq!(rendered.output, "✦ Title\n\nSome text.");
    }

    #[test]
    fn test_renderer_conflict_is_build_error() {
        struct Claimer(&'static str);
        impl Extension for Claimer {
            fn name(&self) -> &'static str {
                self.0
            }
            fn claims(&self) -> &'static [Kind] {
                &[Kind::Heading]
            }
        }
        let err = Pipeline::builder()
            .extension(Claimer("first"))
            .extension(Claimer("second"))
            .build()
            .unwrap_err();
        match err {
            PipelineError::RendererConflict { kind, first, second } => {
                assert_eq!(kind, Kind::Heading);
                assert_eq!(first, "first");
                assert_eq!(second, "second");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_walk_order_is_document_order() {
        #[derive(Default)]
        struct Recorder {
            seen: Vec<String>,
        }
        impl Extension for Recorder {
            fn name(&self) -> &'static str {
                "recorder"
            }
            fn prepare(&mut self) {
                self.seen.clear();
            }
            fn walk(
                &mut self,
                token: &mut Token,
                _ctx: &mut WalkContext<'_>,
            ) -> Result<(), PipelineError> {
                if let TokenKind::Heading { level, .. } = token.kind {
                    self.seen.push(format!("h{level}:{}", token.plain_text()));
                }
                Ok(())
            }
            fn postprocess(&mut self, output: &mut String, _ctx: &RenderContext<'_>) {
                output.push_str(&format!("<!--{}-->", self.seen.join(",")));
            }
        }

        let mut pipeline = Pipeline::builder().extension(Recorder::default()).build().unwrap();
        let rendered = parse(
            &mut pipeline,
            "# A\n\n## B\n\ntext\n\n### C\n",
            Destination::RichHtml,
        );
        assert!(rendered.output.ends_with("<!--h1:A,h2:B,h3:C-->"));
    }

    #[test]
    fn test_hook_error_aborts_parse() {
        struct Failing;
        impl Extension for Failing {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn walk(
                &mut self,
                token: &mut Token,
                _ctx: &mut WalkContext<'_>,
            ) -> Result<(), PipelineError> {
                if matches!(token.kind, TokenKind::Paragraph) {
                    return Err(PipelineError::extension("failing", "boom"));
                }
                Ok(())
            }
        }
        let mut pipeline = Pipeline::builder().extension(Failing).build().unwrap();
        let mut remote = NullRemote::new();
        let mut images = NullImages;
        let mut services = Services {
            remote: &mut remote,
            images: &mut images,
        };
        let err = pipeline
            .parse(
                &Document::new("doc", "# fine\n\nnot fine"),
                Destination::RichHtml,
                &mut services,
            )
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_unrecognized_block_falls_back_to_default() {
        // A quote with an unknown marker renders as a plain blockquote
        // instead of crashing the parse.
        let mut pipeline = Pipeline::builder().build().unwrap();
        let rendered = parse(
            &mut pipeline,
            "> [!mystery]\n> body",
            Destination::RichHtml,
        );
        assert!(rendered.output.starts_with("<blockquote>"));
        assert!(rendered.output.contains("body"));
    }
}
