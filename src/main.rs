// Command-line entry point for the image pipeline.
// The lib.rs file serves as the public API; this binary only wires config,
// logging and signals to it.

use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use image_pipeline_lib::{
    PipelineConfig, TranscodeOutcome, audit_images, list_original_images, list_processed_images,
    optimize_image, optimize_images,
};

#[derive(Parser)]
#[command(name = "image-pipeline", about = "Re-encode images and audit their fidelity")]
struct Cli {
    /// Configuration file (defaults to config/default.* when present)
    #[arg(long)]
    config: Option<String>,

    /// Storage root holding `source/` and `processed/`; overrides configured directories
    #[arg(long)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcode every supported image in the source directory
    Preprocess,
    /// Transcode a single image on demand
    Process { filename: String },
    /// Score processed images against their originals with SSIM
    Audit,
    /// Print an asset listing as JSON
    List {
        #[arg(value_enum)]
        which: Listing,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Listing {
    Originals,
    Processed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_file(false)         // Remove file path
        .with_line_number(false)  // Remove line numbers
        .with_thread_ids(false)   // Remove thread IDs
        .with_thread_names(false) // Remove thread names
        .with_target(false)       // Remove module path
        .with_ansi(true)          // Keep colored output
        .with_writer(std::io::stderr)
        .compact();               // Use compact formatter instead of pretty

    subscriber.init();

    let cli = Cli::parse();
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(root) = cli.root {
        let rooted = PipelineConfig::with_root(&root);
        config.source_dir = rooted.source_dir;
        config.processed_dir = rooted.processed_dir;
    }

    match cli.command {
        Command::Preprocess => {
            let (tx, rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after in-flight files are abandoned");
                    let _ = tx.send(true);
                }
            });
            let summary = optimize_images(&config, Some(rx))
                .await
                .context("preprocessing failed")?;
            if summary.cancelled {
                std::process::exit(130);
            }
        }
        Command::Process { filename } => {
            match optimize_image(&config, &filename)
                .await
                .with_context(|| format!("processing '{filename}' failed"))?
            {
                TranscodeOutcome::Processed(report) => info!("Done: {}", report),
                TranscodeOutcome::Skipped { filename } => info!("'{}' was already processed", filename),
            }
        }
        Command::Audit => {
            audit_images(&config).await.context("audit failed")?;
        }
        Command::List { which } => {
            let entries = match which {
                Listing::Originals => list_original_images(&config).await?,
                Listing::Processed => list_processed_images(&config).await?,
            };
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}
