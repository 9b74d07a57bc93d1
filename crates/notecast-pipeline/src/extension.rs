//! Extension trait and tokenizer rule contributions.
//!
//! An [`Extension`] is a self-contained contributor of inline tokenizer
//! rules, node-kind renderers, and lifecycle hooks. Extensions are
//! constructed once per pipeline instance and own per-session mutable state
//! (counters, accumulated reference lists); [`Extension::prepare`] resets
//! that state at the start of each parse.
//!
//! # Hook order
//!
//! For every parse: `prepare` → `walk` (once per token, strictly in document
//! order, each completed before the next) → serialization (`render` for
//! claimed kinds) → `postprocess` → `cleanup`. `walk` may mutate the token,
//! typically stashing a precomputed output field the renderer reads.

use regex::{Captures, Regex};

use crate::error::PipelineError;
use crate::placeholder::{PlaceholderId, PlaceholderTable};
use crate::style::{Destination, StyleTable};
use crate::tree::{Kind, Token};

/// An inline tokenizer rule contributed by an extension.
///
/// Rules run over text segments during tree building. The leftmost match
/// wins; ties go to the earlier-registered rule.
pub struct InlineRule {
    pattern: Regex,
    build: Box<dyn Fn(&Captures<'_>) -> Token + Send + Sync>,
}

impl InlineRule {
    pub fn new(
        pattern: Regex,
        build: impl Fn(&Captures<'_>) -> Token + Send + Sync + 'static,
    ) -> Self {
        Self {
            pattern,
            build: Box::new(build),
        }
    }

    pub(crate) fn find<'t>(&self, text: &'t str) -> Option<regex::Match<'t>> {
        self.pattern.find(text)
    }

    pub(crate) fn build_token(&self, text: &str) -> Option<Token> {
        self.pattern.captures(text).map(|caps| (self.build)(&caps))
    }
}

impl std::fmt::Debug for InlineRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineRule")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Remote render job category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    MathInline,
    MathBlock,
    Widget,
}

/// Mediator for rate-sensitive remote rendering.
///
/// `submit` records a job against a placeholder; `resolve` processes all
/// submitted jobs (implementations drain FIFO, one in-flight request at a
/// time) and fulfills the session's placeholder table.
pub trait RemoteRenderer {
    fn submit(&mut self, kind: JobKind, source: &str, placeholder: PlaceholderId);
    fn resolve(&mut self, placeholders: &mut PlaceholderTable);
}

/// Registry for locally referenced images.
///
/// Returns the canonical key the reference was registered under; multiple
/// references to the same resource converge to one key.
pub trait ImageSink {
    fn register(&mut self, origin: &str) -> String;
}

/// No-op remote renderer: every submitted job resolves to a failure sentinel.
#[derive(Debug, Default)]
pub struct NullRemote {
    submitted: Vec<PlaceholderId>,
}

impl NullRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RemoteRenderer for NullRemote {
    fn submit(&mut self, _kind: JobKind, _source: &str, placeholder: PlaceholderId) {
        self.submitted.push(placeholder);
    }

    fn resolve(&mut self, placeholders: &mut PlaceholderTable) {
        for id in self.submitted.drain(..) {
            placeholders.fulfill(
                id,
                crate::placeholder::RemoteOutcome::Failed("remote rendering disabled".to_owned()),
            );
        }
    }
}

/// No-op image sink: the origin string itself is the canonical key.
#[derive(Debug, Default)]
pub struct NullImages;

impl ImageSink for NullImages {
    fn register(&mut self, origin: &str) -> String {
        origin.to_owned()
    }
}

/// External collaborators injected into one parse session.
pub struct Services<'a> {
    pub remote: &'a mut dyn RemoteRenderer,
    pub images: &'a mut dyn ImageSink,
}

/// Mutable context handed to [`Extension::walk`].
pub struct WalkContext<'a> {
    pub destination: Destination,
    pub placeholders: &'a mut PlaceholderTable,
    pub remote: &'a mut dyn RemoteRenderer,
    pub images: &'a mut dyn ImageSink,
    pub warnings: &'a mut Vec<String>,
}

/// Immutable context handed to [`Extension::render`] and
/// [`Extension::postprocess`].
pub struct RenderContext<'a> {
    pub destination: Destination,
    pub style: &'a StyleTable,
    pub placeholders: &'a PlaceholderTable,
}

/// A unit contributing parsing rules, rendering logic, and lifecycle hooks to
/// one pipeline instance.
pub trait Extension: Send {
    /// Stable name used in diagnostics and renderer-conflict errors.
    fn name(&self) -> &'static str;

    /// Reset per-session state. Called at the start of every parse.
    fn prepare(&mut self) {}

    /// Inline tokenizer rules applied during tree building.
    fn inline_rules(&self) -> Vec<InlineRule> {
        Vec::new()
    }

    /// Node kinds this extension renders. Claiming a kind another extension
    /// already claims is a pipeline build error.
    fn claims(&self) -> &'static [Kind] {
        &[]
    }

    /// Annotation hook, run once per token in document order.
    fn walk(&mut self, token: &mut Token, ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        let _ = (token, ctx);
        Ok(())
    }

    /// Render a claimed token. `inner` holds the already-rendered children.
    fn render(&self, token: &Token, inner: &str, ctx: &RenderContext<'_>) -> String {
        let _ = (token, ctx);
        inner.to_owned()
    }

    /// Rewrite the serialized output after the render pass (e.g. append a
    /// references section).
    fn postprocess(&mut self, output: &mut String, ctx: &RenderContext<'_>) {
        let _ = (output, ctx);
    }

    /// Drop per-session state. Called at the end of every parse.
    fn cleanup(&mut self) {}
}
