//! Remote-rendered widget boxes.
//!
//! A `[!widget]` quote's body is a widget spec. The annotation pass submits
//! the spec to the remote render queue; the rich-HTML renderer wraps the
//! resolved markup in a card wrapper so its contents can be restored
//! verbatim after sanitization.

use notecast_pipeline::{
    Destination, Extension, JobKind, Kind, PipelineError, RemoteOutcome, RenderContext, Token,
    TokenKind, WalkContext, escape_html,
};

/// Renders `[!widget]` boxes through the remote endpoint.
#[derive(Debug, Default)]
pub struct WidgetExtension;

impl WidgetExtension {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Extension for WidgetExtension {
    fn name(&self) -> &'static str {
        "widget"
    }

    fn claims(&self) -> &'static [Kind] {
        &[Kind::Widget]
    }

    fn walk(&mut self, token: &mut Token, ctx: &mut WalkContext<'_>) -> Result<(), PipelineError> {
        if ctx.destination != Destination::RichHtml {
            return Ok(());
        }
        if let TokenKind::Widget {
            source,
            placeholder,
        } = &mut token.kind
        {
            // The endpoint expects a JSON spec; a malformed one still gets
            // submitted (the endpoint reports its own error), but the author
            // sees a warning up front.
            if serde_json::from_str::<serde_json::Value>(source).is_err() {
                ctx.warnings
                    .push(format!("widget spec is not valid JSON: {source}"));
            }
            let id = ctx.placeholders.allocate();
            ctx.remote.submit(JobKind::Widget, source, id);
            *placeholder = Some(id);
        }
        Ok(())
    }

    fn render(&self, token: &Token, _inner: &str, ctx: &RenderContext<'_>) -> String {
        let TokenKind::Widget {
            source,
            placeholder,
        } = &token.kind
        else {
            return String::new();
        };
        match ctx.destination {
            Destination::RichHtml => {
                let Some(id) = placeholder else {
                    return format!("<pre>{}</pre>", escape_html(source));
                };
                let body = match ctx.placeholders.get(*id) {
                    Some(RemoteOutcome::Rendered(markup)) => markup.clone(),
                    Some(RemoteOutcome::Failed(reason)) => format!(
                        r#"<p class="nc-failed">widget unavailable: {}</p>"#,
                        escape_html(reason)
                    ),
                    None => r#"<p class="nc-pending">widget pending</p>"#.to_owned(),
                };
                format!(
                    r#"<section class="nc-widget" data-card="{}">{body}</section>"#,
                    id.value()
                )
            }
            Destination::PlainText => "[interactive widget]\n\n".to_owned(),
        }
    }
}
