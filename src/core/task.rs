//! Image task definition and creation.

use std::path::{Component, Path, PathBuf};
use serde::Serialize;
use crate::core::PipelineConfig;
use crate::utils::{PipelineError, PipelineResult};

/// Represents a single unit of pipeline work.
///
/// Input and output share the same file name; only the directory differs.
#[derive(Debug, Clone, Serialize)]
pub struct ImageTask {
    /// File name relative to both directories
    pub filename: String,
    /// Path to the source image file
    pub input_path: PathBuf,
    /// Path where the processed image is (or will be) written
    pub output_path: PathBuf,
}

impl ImageTask {
    /// Builds the task for `filename` under the configured directory pair.
    ///
    /// Rejects names that would escape the directories (separators, `..`).
    pub fn new(config: &PipelineConfig, filename: &str) -> PipelineResult<Self> {
        let mut components = Path::new(filename).components();
        let is_plain_name = matches!(components.next(), Some(Component::Normal(n)) if n == filename)
            && components.next().is_none();
        if !is_plain_name {
            return Err(PipelineError::io(format!("Not a plain file name: {filename:?}")));
        }

        Ok(Self {
            filename: filename.to_string(),
            input_path: config.source_path(filename),
            output_path: config.processed_path(filename),
        })
    }
}
