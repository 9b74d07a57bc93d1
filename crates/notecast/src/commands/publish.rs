//! `notecast publish` - render, upload resources, and commit final output.
//!
//! The publish workflow sequences the caller-driven phases around the parse:
//!
//! 1. Render the document for the rich-HTML destination
//! 2. Capture card content before sanitization
//! 3. Upload registered local images, rewrite references to their locators
//! 4. Sanitize, then restore captured cards
//! 5. Write the committed output

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use notecast_config::{CliSettings, Config};
use notecast_pipeline::{Destination, Document, Services};
use notecast_resources::{
    AmmoniaSanitizer, CardStore, HttpImageUploader, ImageRegistry, Sanitize,
};

use super::{build_pipeline, build_remote, diagnostic_page};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the publish command.
#[derive(Args)]
pub(crate) struct PublishArgs {
    /// Markdown file to publish.
    input: PathBuf,

    /// Output file for the committed HTML.
    #[arg(long)]
    out: PathBuf,

    /// Config file path (default: discover notecast.toml upwards).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory for local image references.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

impl PublishArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            base_dir: self.base_dir.clone(),
            remote_endpoint: None,
            upload_endpoint: None,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let upload = config.require_upload()?;

        let text = std::fs::read_to_string(&self.input)?;
        let document = Document::new(self.input.to_string_lossy(), text);

        let mut pipeline = build_pipeline(&config)?;
        let mut remote = build_remote(&config);
        let mut images = ImageRegistry::new(&config.docs.base_dir);
        let mut cards = CardStore::new();

        let mut services = Services {
            remote: &mut *remote,
            images: &mut images,
        };
        let rendered = match pipeline.parse(&document, Destination::RichHtml, &mut services) {
            Ok(rendered) => rendered,
            Err(err) => {
                output.error(&format!("{}: {err}", self.input.display()));
                std::fs::write(&self.out, diagnostic_page(&document.id, &err))?;
                return Err(err.into());
            }
        };
        for warning in &rendered.warnings {
            output.warning(warning);
        }

        let mut html = rendered.output;
        cards.capture(&html);

        let uploader = HttpImageUploader::new(&upload.endpoint);
        let uploaded = images.upload_all(&uploader, &upload.token);
        images.replace_all(&mut html);
        info!(uploaded, cards = cards.len(), "upload phase complete");

        let sanitizer = AmmoniaSanitizer::new();
        let mut committed = sanitizer.sanitize(&html);
        cards.restore(&mut committed);

        std::fs::write(&self.out, committed)?;
        output.success(&format!(
            "published {} -> {}",
            self.input.display(),
            self.out.display()
        ));

        // Registries are document-scoped; clear before the next run reuses
        // this process.
        images.cleanup();
        cards.cleanup();
        Ok(())
    }
}
