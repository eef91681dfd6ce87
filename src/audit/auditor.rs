use std::fmt;
use std::sync::Arc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::{ImageTask, PairScore, PipelineConfig};
use crate::utils::{
    PipelineError, PipelineResult, file_exists, is_supported_image, list_file_names, read_with_retry,
};
use crate::worker::WorkerPool;

use super::ssim::{prepare_image, ssim};

/// Aggregate of an audit pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AuditOutcome {
    /// Mean over every successfully scored pair
    Mean(f64),
    /// No source image had a comparable processed counterpart
    NothingToCompare,
}

impl AuditOutcome {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            Self::NothingToCompare
        } else {
            Self::Mean(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Mean(mean) => Some(*mean),
            Self::NothingToCompare => None,
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean(mean) => write!(f, "Average SSIM across all images: {mean:.4}"),
            Self::NothingToCompare => write!(f, "No images could be compared"),
        }
    }
}

/// Everything an audit pass found.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    /// Per-pair scores, in source listing order
    pub scores: Vec<PairScore>,
    /// Source files with no processed counterpart or an undecodable pair
    pub not_comparable: Vec<String>,
    pub outcome: AuditOutcome,
}

enum PairResult {
    Scored(f64),
    Missing,
}

/// Scores processed images against their originals.
#[derive(Clone)]
pub struct FidelityAuditor {
    config: Arc<PipelineConfig>,
    pool: WorkerPool,
}

impl FidelityAuditor {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;
        let pool = WorkerPool::from_config(&config);
        Ok(Self {
            config: Arc::new(config),
            pool,
        })
    }

    /// SSIM between `source/<filename>` and `processed/<filename>`.
    ///
    /// `Ok(None)` when the processed counterpart does not exist yet.
    pub async fn compare_pair(&self, filename: &str) -> PipelineResult<Option<f64>> {
        match compare(&self.config, filename).await? {
            PairResult::Scored(score) => Ok(Some(score)),
            PairResult::Missing => Ok(None),
        }
    }

    /// Scores every supported source image that has a processed counterpart.
    ///
    /// Only a missing or unreadable source directory fails the pass.
    pub async fn audit_all(&self) -> PipelineResult<AuditReport> {
        info!("Auditing processed images against {}", self.config.source_dir.display());
        let names: Vec<String> = match list_file_names(&self.config.source_dir).await {
            Ok(names) => names.into_iter().filter(|n| is_supported_image(n)).collect(),
            Err(e) => {
                error!("Audit aborted: {}", e);
                return Err(e);
            }
        };

        let config = self.config.clone();
        let run = self
            .pool
            .run_all(
                names,
                move |name| {
                    let config = config.clone();
                    async move { compare(&config, &name).await }
                },
                None,
            )
            .await;

        let mut scores = Vec::new();
        let mut not_comparable = Vec::new();
        for (filename, result) in run.results {
            match result.map_err(PipelineError::from).and_then(|r| r) {
                Ok(PairResult::Scored(score)) => {
                    info!("{}: SSIM score = {:.4}", filename, score);
                    scores.push(PairScore { filename, score });
                }
                Ok(PairResult::Missing) => {
                    warn!("{}: processed file not found, not comparable", filename);
                    not_comparable.push(filename);
                }
                Err(e) => {
                    warn!("{}: comparison failed, not comparable: {}", filename, e);
                    not_comparable.push(filename);
                }
            }
        }

        let values: Vec<f64> = scores.iter().map(|s| s.score).collect();
        let outcome = AuditOutcome::from_scores(&values);
        info!("{}", outcome);

        Ok(AuditReport {
            scores,
            not_comparable,
            outcome,
        })
    }
}

async fn compare(config: &PipelineConfig, filename: &str) -> PipelineResult<PairResult> {
    let task = ImageTask::new(config, filename)?;
    if !file_exists(&task.output_path).await {
        return Ok(PairResult::Missing);
    }

    let original = read_with_retry(&task.input_path, config.io_retries).await?;
    let processed = read_with_retry(&task.output_path, config.io_retries).await?;
    let size = config.audit_size;

    let score = tokio::task::spawn_blocking(move || -> PipelineResult<f64> {
        let a = prepare_image(&original, size)?;
        let b = prepare_image(&processed, size)?;
        ssim(&a, &b)
    })
    .await
    .map_err(|e| PipelineError::worker(format!("SSIM task for '{filename}' panicked: {e}")))??;

    debug!("Compared '{}' at {}x{}", filename, size, size);
    Ok(PairResult::Scored(score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_three_scores() {
        let outcome = AuditOutcome::from_scores(&[0.90, 0.80, 0.70]);
        let mean = outcome.mean().unwrap();
        assert!((mean - 0.80).abs() < 1e-12);
        assert_eq!(outcome.to_string(), "Average SSIM across all images: 0.8000");
    }

    #[test]
    fn no_scores_is_not_a_zero_mean() {
        let outcome = AuditOutcome::from_scores(&[]);
        assert_eq!(outcome, AuditOutcome::NothingToCompare);
        assert_eq!(outcome.mean(), None);
    }
}
