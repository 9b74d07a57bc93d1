//! `notecast render` - render documents to a destination format.

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::info;

use notecast_config::{CliSettings, Config};
use notecast_pipeline::{Destination, Document, Services};
use notecast_resources::ImageRegistry;

use super::{DestArg, build_pipeline, build_remote, diagnostic_page};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown files to render.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Destination format.
    #[arg(long, value_enum, default_value = "rich")]
    dest: DestArg,

    /// Config file path (default: discover notecast.toml upwards).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory for local image references.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Remote render endpoint (overrides config).
    #[arg(long, env = "NOTECAST_REMOTE")]
    remote: Option<String>,

    /// Directory to write outputs into (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(long, short)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            base_dir: self.base_dir.clone(),
            remote_endpoint: self.remote.clone(),
            upload_endpoint: None,
        };
        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let destination = Destination::from(self.dest);

        let mut pipeline = build_pipeline(&config)?;
        let mut remote = build_remote(&config);
        // One registry per document scope; cleaned up between documents.
        let mut images = ImageRegistry::new(&config.docs.base_dir);

        if let Some(dir) = &self.out {
            std::fs::create_dir_all(dir)?;
        }

        let mut failed = false;
        for input in &self.inputs {
            let text = std::fs::read_to_string(input)?;
            let document = Document::new(input.to_string_lossy(), text);

            let mut services = Services {
                remote: &mut *remote,
                images: &mut images,
            };
            let rendered = match pipeline.parse(&document, destination, &mut services) {
                Ok(rendered) => rendered,
                Err(err) => {
                    // Never emit partial output; the whole document becomes
                    // a diagnostic page.
                    failed = true;
                    output.error(&format!("{}: {err}", input.display()));
                    self.write(output, input, &diagnostic_page(&document.id, &err))?;
                    images.cleanup();
                    continue;
                }
            };

            for warning in &rendered.warnings {
                output.warning(warning);
            }
            info!(
                input = %input.display(),
                placeholders = rendered.placeholders_allocated,
                "rendered"
            );
            self.write(output, input, &rendered.output)?;
            images.cleanup();
        }

        if failed {
            return Err(CliError::Validation(
                "one or more documents failed to render".to_owned(),
            ));
        }
        Ok(())
    }

    fn write(&self, output: &Output, input: &Path, content: &str) -> Result<(), CliError> {
        match &self.out {
            Some(dir) => {
                let extension = match self.dest {
                    DestArg::Rich => "html",
                    DestArg::Plain => "txt",
                };
                let name = input
                    .file_stem()
                    .map_or_else(|| "output".to_owned(), |stem| stem.to_string_lossy().into_owned());
                let path = dir.join(format!("{name}.{extension}"));
                std::fs::write(&path, content)?;
                output.success(&format!("wrote {}", path.display()));
            }
            None => output.content(content),
        }
        Ok(())
    }
}
