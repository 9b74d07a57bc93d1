//! notecast CLI - Markdown publishing pipeline.
//!
//! Provides commands for:
//! - `render`: Render markdown for a destination (rich HTML or plain text)
//! - `publish`: Render, upload local resources, sanitize, and commit

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{PublishArgs, RenderArgs};
use output::Output;

/// notecast - Markdown publishing pipeline.
#[derive(Parser)]
#[command(name = "notecast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown documents for a destination.
    Render(RenderArgs),
    /// Render and publish a document, uploading its local resources.
    Publish(PublishArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Render(args) => args.verbose,
        Commands::Publish(args) => args.verbose,
    };

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(&output),
        Commands::Publish(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
