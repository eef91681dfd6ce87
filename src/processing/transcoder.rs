//! Idempotent per-file transcoding.
//!
//! Decoding and encoding run inside `tokio::task::spawn_blocking` so the async
//! runtime is never blocked; reads and writes stay on the async fs API.

use std::sync::Arc;
use tracing::{debug, info};

use crate::core::{CompressionReport, ImageAsset, ImageTask, PipelineConfig, TranscodeOutcome};
use crate::utils::{PipelineError, PipelineResult, file_exists, read_with_retry, write_atomic};

use super::formats::{EncoderSettings, encode_asset};

/// Re-encodes single files from the source directory into the processed
/// directory. Cheap to clone; clones share the configuration.
#[derive(Debug, Clone)]
pub struct Transcoder {
    config: Arc<PipelineConfig>,
}

impl Transcoder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Makes sure `processed/<filename>` exists.
    ///
    /// An existing output is the completion marker: the call then returns
    /// [`TranscodeOutcome::Skipped`] without touching the source. A changed
    /// source is therefore never re-encoded while its output exists.
    pub async fn ensure_processed(&self, filename: &str) -> PipelineResult<TranscodeOutcome> {
        let task = ImageTask::new(&self.config, filename)?;

        if file_exists(&task.output_path).await {
            debug!("'{}' already processed, skipping", filename);
            return Ok(TranscodeOutcome::Skipped {
                filename: task.filename,
            });
        }

        info!("Processing '{}'...", filename);
        let bytes = read_with_retry(&task.input_path, self.config.io_retries).await?;
        let asset = ImageAsset::new(task.filename.clone(), bytes);
        let original_size = asset.size();
        let settings = EncoderSettings::from(self.config.as_ref());

        let processed = tokio::task::spawn_blocking(move || encode_asset(&asset, &settings))
            .await
            .map_err(|e| PipelineError::worker(format!("Encode task for '{filename}' panicked: {e}")))??;

        write_atomic(&task.output_path, &processed.bytes).await?;

        let report = CompressionReport::new(task.filename, original_size, processed.size());
        info!("{report}");
        Ok(TranscodeOutcome::Processed(report))
    }
}
