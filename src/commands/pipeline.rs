//! Request handlers for the transcode pipeline and the fidelity audit.
//!
//! These are the entry points a front end (the CLI, or an HTTP layer) calls;
//! each takes an explicit [`PipelineConfig`].

use tokio::sync::watch;
use tracing::debug;
use crate::audit::{AuditReport, FidelityAuditor};
use crate::core::{BatchSummary, PipelineConfig, TranscodeOutcome};
use crate::processing::{BatchProcessor, Transcoder};
use crate::utils::{PipelineError, PipelineResult, ensure_dir};

/// Makes sure a single source image has been processed.
///
/// Suitable for on-demand use: the output directory is created if needed,
/// and the call is bounded by the configured per-file timeout. Once this
/// returns `Ok`, `processed/<filename>` exists.
pub async fn optimize_image(
    config: &PipelineConfig,
    filename: &str,
) -> PipelineResult<TranscodeOutcome> {
    config.validate()?;
    ensure_dir(&config.processed_dir).await?;
    debug!("Received optimize_image request for '{}'", filename);

    let transcoder = Transcoder::new(config.clone());
    tokio::time::timeout(config.file_timeout(), transcoder.ensure_processed(filename))
        .await
        .map_err(|_| PipelineError::timeout(format!(
            "'{}' not processed within {}s", filename, config.file_timeout_secs
        )))?
}

/// Runs the whole transcode batch.
///
/// With `shutdown`, flipping the watched value to `true` abandons in-flight
/// files and returns what completed.
pub async fn optimize_images(
    config: &PipelineConfig,
    shutdown: Option<watch::Receiver<bool>>,
) -> PipelineResult<BatchSummary> {
    let processor = BatchProcessor::new(config.clone())?;
    match shutdown {
        Some(rx) => processor.preprocess_all_until(rx).await,
        None => processor.preprocess_all().await,
    }
}

/// Runs the fidelity audit over the configured directory pair.
pub async fn audit_images(config: &PipelineConfig) -> PipelineResult<AuditReport> {
    FidelityAuditor::new(config.clone())?.audit_all().await
}
