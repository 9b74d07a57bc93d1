//! CLI commands.

mod publish;
mod render;

pub(crate) use publish::PublishArgs;
pub(crate) use render::RenderArgs;

use clap::ValueEnum;

use notecast_config::Config;
use notecast_extensions::{
    CalloutExtension, CodeExtension, FootnoteExtension, HeadingExtension, IconExtension,
    LinkExtension, LocalImageExtension, MarkExtension, MathExtension, WidgetExtension,
};
use notecast_pipeline::{
    Destination, NullRemote, Pipeline, PipelineError, RemoteRenderer, StyleTable, escape_html,
};
use notecast_remote::{RemoteClient, RenderQueue};

/// Destination selector for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DestArg {
    /// Rich HTML for the article destination.
    Rich,
    /// Glyph-based plain text for social destinations.
    Plain,
}

impl From<DestArg> for Destination {
    fn from(arg: DestArg) -> Self {
        match arg {
            DestArg::Rich => Self::RichHtml,
            DestArg::Plain => Self::PlainText,
        }
    }
}

/// Build the standard pipeline configured from `config`.
pub(crate) fn build_pipeline(config: &Config) -> Result<Pipeline, PipelineError> {
    let numbered = match config.docs.numbered_heading_level {
        0 => None,
        level => Some(level),
    };
    let mut plain_style = StyleTable::plain_default();
    if let Some(bullet) = &config.style.bullet {
        plain_style.bullet.clone_from(bullet);
    }
    if let Some(prefixes) = &config.style.heading_prefixes {
        for (slot, prefix) in plain_style.heading_prefixes.iter_mut().zip(prefixes) {
            slot.clone_from(prefix);
        }
    }
    if let Some(glyph) = &config.style.task_checked {
        plain_style.task_checked.clone_from(glyph);
    }
    if let Some(glyph) = &config.style.task_unchecked {
        plain_style.task_unchecked.clone_from(glyph);
    }

    Pipeline::builder()
        .extension(HeadingExtension::new().numbered_level(numbered))
        .extension(CalloutExtension::new())
        .extension(WidgetExtension::new())
        .extension(CodeExtension::new())
        .extension(MarkExtension::new())
        .extension(IconExtension::new())
        .extension(FootnoteExtension::new())
        .extension(LinkExtension::new())
        .extension(LocalImageExtension::new())
        .extension(MathExtension::new())
        .plain_style(plain_style)
        .build()
}

/// Build the remote renderer from config: a real queue when an endpoint is
/// configured, otherwise a no-op that resolves everything to failure
/// sentinels.
pub(crate) fn build_remote(config: &Config) -> Box<dyn RemoteRenderer> {
    match &config.remote {
        Some(remote) => {
            let mut client = RemoteClient::new(&remote.endpoint)
                .with_timeout(std::time::Duration::from_secs(remote.timeout_secs));
            if let Some(token) = &remote.token {
                client = client.with_token(token);
            }
            Box::new(RenderQueue::new(client))
        }
        None => Box::new(NullRemote::new()),
    }
}

/// Whole-document diagnostic page substituted when a parse aborts.
pub(crate) fn diagnostic_page(document: &str, error: &PipelineError) -> String {
    format!(
        concat!(
            r#"<section class="nc-error"><h1>Render failed</h1>"#,
            r#"<p>The document <code>{}</code> could not be rendered.</p>"#,
            "<pre>{}</pre></section>"
        ),
        escape_html(document),
        escape_html(&error.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_arg_mapping() {
        assert_eq!(Destination::from(DestArg::Rich), Destination::RichHtml);
        assert_eq!(Destination::from(DestArg::Plain), Destination::PlainText);
    }

    #[test]
    fn test_build_pipeline_with_defaults() {
        let config = Config::default();
        assert!(build_pipeline(&config).is_ok());
    }

    #[test]
    fn test_diagnostic_page_escapes() {
        let err = PipelineError::extension("x", "a < b");
        let page = diagnostic_page("doc.md", &err);
        assert!(page.contains("doc.md"));
        assert!(page.contains("a &lt; b"));
    }
}
