use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::core::{BatchSummary, FileOutcome, ImageTask, PipelineConfig, TranscodeOutcome};
use crate::processing::Transcoder;
use crate::utils::{
    PipelineError, PipelineResult, ensure_dir, get_file_size, is_supported_image, list_file_names,
    sweep_stale_temps,
};
use crate::worker::WorkerPool;

/// Drives `ensure_processed` over a whole source directory.
///
/// Best effort: a failing file is recorded and logged, the rest of the batch
/// carries on. Only directory-level failures abort the run.
#[derive(Clone)]
pub struct BatchProcessor {
    transcoder: Transcoder,
    pool: WorkerPool,
}

impl BatchProcessor {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let pool = WorkerPool::from_config(&config);
        debug!("Creating BatchProcessor with {} workers", pool.worker_count());
        Ok(Self {
            transcoder: Transcoder::new(config),
            pool,
        })
    }

    /// Processes every supported image in the source directory.
    pub async fn preprocess_all(&self) -> PipelineResult<BatchSummary> {
        self.run(None).await
    }

    /// Like [`preprocess_all`](Self::preprocess_all), stopping early when
    /// `shutdown` flips to `true`. Abandoned files leave no output behind.
    pub async fn preprocess_all_until(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> PipelineResult<BatchSummary> {
        self.run(Some(shutdown)).await
    }

    async fn run(&self, shutdown: Option<watch::Receiver<bool>>) -> PipelineResult<BatchSummary> {
        let config = self.transcoder.config();
        info!("Starting preprocessing of all images in {}", config.source_dir.display());

        if let Err(e) = ensure_dir(&config.processed_dir).await {
            error!("Cannot prepare output directory: {}", e);
            return Err(e);
        }
        match sweep_stale_temps(&config.processed_dir, config.file_timeout()).await {
            Ok(0) => {}
            Ok(n) => info!("Removed {} abandoned temporary files", n),
            Err(e) => warn!("Could not sweep abandoned temporary files: {}", e),
        }
        let names: Vec<String> = match list_file_names(&config.source_dir).await {
            Ok(names) => names.into_iter().filter(|n| is_supported_image(n)).collect(),
            Err(e) => {
                error!("Preprocessing aborted: {}", e);
                return Err(e);
            }
        };
        info!("Found {} images to check", names.len());

        let transcoder = self.transcoder.clone();
        let run = self
            .pool
            .run_all(
                names,
                move |name| {
                    let transcoder = transcoder.clone();
                    async move { process_one(&transcoder, &name).await }
                },
                shutdown,
            )
            .await;

        let outcomes: Vec<FileOutcome> = run
            .results
            .into_iter()
            .map(|(filename, result)| {
                match result.map_err(PipelineError::from).and_then(|r| r) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Skipping '{}': {}", filename, e);
                        FileOutcome::Failed { filename, error: e.to_string() }
                    }
                }
            })
            .collect();

        let mut summary = BatchSummary::from_outcomes(&outcomes);
        summary.cancelled = run.cancelled;

        for line in summary.to_string().lines() {
            info!("{}", line);
        }
        if summary.failed.is_empty() && !summary.cancelled {
            info!("Preprocessing complete");
        } else {
            warn!(
                "Preprocessing finished with {} failed files{}",
                summary.failed_count(),
                if summary.cancelled { " after a shutdown request" } else { "" }
            );
        }
        Ok(summary)
    }
}

/// One unit of batch work: transcode, or measure the existing output.
async fn process_one(transcoder: &Transcoder, filename: &str) -> PipelineResult<FileOutcome> {
    match transcoder.ensure_processed(filename).await? {
        TranscodeOutcome::Processed(report) => Ok(FileOutcome::Processed(report)),
        TranscodeOutcome::Skipped { filename } => {
            let task = ImageTask::new(transcoder.config(), &filename)?;
            let original_size = get_file_size(&task.input_path).await?;
            let processed_size = get_file_size(&task.output_path).await?;
            Ok(FileOutcome::Skipped { filename, original_size, processed_size })
        }
    }
}
