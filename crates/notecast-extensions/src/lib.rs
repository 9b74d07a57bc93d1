//! Content extensions for the rendering pipeline.
//!
//! Each extension is a self-contained contributor of inline tokenizer rules,
//! node-kind renderers, and lifecycle hooks:
//!
//! - [`CalloutExtension`]: `[!note]`-style callout boxes
//! - [`WidgetExtension`]: `[!widget]` boxes rendered by the remote endpoint
//! - [`HeadingExtension`]: section numbering and anchor slugs
//! - [`FootnoteExtension`]: footnote numbering and the appended section
//! - [`CodeExtension`]: code blocks with best-effort highlighting
//! - [`MarkExtension`]: `==marked==` spans
//! - [`IconExtension`]: `:icon[name]` inline icons
//! - [`LinkExtension`]: external links as numbered references
//! - [`LocalImageExtension`]: local image registration for later upload
//! - [`MathExtension`]: `$...$` formulas via the remote render queue

mod callout;
mod code;
mod footnote;
mod heading;
mod icon;
mod links;
mod local_image;
mod mark;
mod math;
mod widget;

pub use callout::CalloutExtension;
pub use code::{CodeExtension, Highlighter, SyntectHighlighter};
pub use footnote::FootnoteExtension;
pub use heading::HeadingExtension;
pub use icon::IconExtension;
pub use links::LinkExtension;
pub use local_image::LocalImageExtension;
pub use mark::MarkExtension;
pub use math::MathExtension;
pub use widget::WidgetExtension;

use notecast_pipeline::{Pipeline, PipelineError};

/// The full pipeline with every standard extension registered.
pub fn standard_pipeline() -> Result<Pipeline, PipelineError> {
    Pipeline::builder()
        .extension(HeadingExtension::new())
        .extension(CalloutExtension::new())
        .extension(WidgetExtension::new())
        .extension(CodeExtension::new())
        .extension(MarkExtension::new())
        .extension(IconExtension::new())
        .extension(FootnoteExtension::new())
        .extension(LinkExtension::new())
        .extension(LocalImageExtension::new())
        .extension(MathExtension::new())
        .build()
}
