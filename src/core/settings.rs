//! Pipeline configuration.
//!
//! Every entry point takes a [`PipelineConfig`] explicitly, so tests can point
//! the pipeline at temporary directories and vary encoder parameters.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::utils::{PipelineError, PipelineResult};

const ENV_PREFIX: &str = "IMGPIPE";
const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Directory names under a storage root.
pub const SOURCE_DIR_NAME: &str = "source";
pub const PROCESSED_DIR_NAME: &str = "processed";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Read-only input directory
    pub source_dir: PathBuf,
    /// Output directory; created if absent
    pub processed_dir: PathBuf,
    /// JPEG quality factor (1-100)
    pub jpeg_quality: u8,
    /// Reduce PNG output to an indexed palette
    pub png_palette: bool,
    /// NeuQuant sample factor (1 = best quality, 30 = fastest)
    pub png_quant_speed: i32,
    /// Files processed concurrently per batch
    pub concurrency: usize,
    /// Deadline for a single file, in seconds
    pub file_timeout_secs: u64,
    /// Extra attempts for transient source read failures
    pub io_retries: u32,
    /// Side of the square grayscale raster SSIM is computed on
    pub audit_size: u32,
    /// Base URL the asset listings point at
    pub public_base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("storage/images"),
            processed_dir: PathBuf::from("storage/processed"),
            jpeg_quality: 70,
            png_palette: true,
            png_quant_speed: 10,
            concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            file_timeout_secs: 60,
            io_retries: 2,
            audit_size: 256,
            public_base_url: "http://localhost:4000".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration using `<root>/source` and `<root>/processed`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            source_dir: root.join(SOURCE_DIR_NAME),
            processed_dir: root.join(PROCESSED_DIR_NAME),
            ..Self::default()
        }
    }

    /// Loads configuration from an optional file layered under `IMGPIPE_*`
    /// environment variables. Without an explicit path, `config/default.*` is
    /// read when present.
    pub fn load(path: Option<&str>) -> PipelineResult<Self> {
        let mut settings = config::Config::builder();
        if let Some(p) = path {
            settings = settings.add_source(config::File::with_name(p));
        } else {
            settings = settings.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }
        settings = settings.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: Self = settings.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(PipelineError::config(format!(
                "Invalid JPEG quality: {}. Must be between 1 and 100", self.jpeg_quality
            )));
        }
        if !(1..=30).contains(&self.png_quant_speed) {
            return Err(PipelineError::config(format!(
                "Invalid PNG quantisation speed: {}. Must be between 1 and 30", self.png_quant_speed
            )));
        }
        if self.concurrency == 0 {
            return Err(PipelineError::config("Concurrency cannot be 0"));
        }
        if self.audit_size == 0 {
            return Err(PipelineError::config("Audit size cannot be 0"));
        }
        if self.file_timeout_secs == 0 {
            return Err(PipelineError::config("File timeout cannot be 0"));
        }
        Ok(())
    }

    pub fn file_timeout(&self) -> Duration {
        Duration::from_secs(self.file_timeout_secs)
    }

    pub fn source_path(&self, filename: &str) -> PathBuf {
        self.source_dir.join(filename)
    }

    pub fn processed_path(&self, filename: &str) -> PathBuf {
        self.processed_dir.join(filename)
    }
}
