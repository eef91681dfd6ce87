//! Core pipeline types and configuration.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`PipelineConfig`]: Directory pair and encoder parameters
//! - [`ImageTask`]: One file's input/output paths
//! - [`ImageAsset`] / [`ProcessedAsset`]: Source and re-encoded bytes
//! - [`CompressionReport`] / [`BatchSummary`]: Size-reduction reporting

mod settings;
mod report;
mod task;
mod types;

pub use settings::{PipelineConfig, PROCESSED_DIR_NAME, SOURCE_DIR_NAME};
pub use report::{BatchSummary, CompressionReport, reduction_percent};
pub use task::ImageTask;
pub use types::{AssetEntry, FileOutcome, ImageAsset, PairScore, ProcessedAsset, TranscodeOutcome};
