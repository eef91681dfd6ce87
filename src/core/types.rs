//! Core types for the transcode pipeline and the fidelity audit.

use serde::{Deserialize, Serialize};
use crate::core::CompressionReport;
use crate::utils::ImageFormat;

/// A source image loaded for processing.
///
/// The byte buffer lives only as long as the file is being worked on.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    /// File name relative to the source directory
    pub filename: String,
    /// Format recognised from the extension; `None` for pass-through files
    pub format: Option<ImageFormat>,
    pub bytes: Vec<u8>,
}

impl ImageAsset {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let format = ImageFormat::from_filename(&filename);
        Self { filename, format, bytes }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// The re-encoded counterpart of an [`ImageAsset`].
///
/// Always carries its source's file name; that name is the completion marker
/// in the output directory and the join key for the audit.
#[derive(Debug, Clone)]
pub struct ProcessedAsset {
    pub filename: String,
    pub format: Option<ImageFormat>,
    pub bytes: Vec<u8>,
}

impl ProcessedAsset {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Result of a single `ensure_processed` call.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscodeOutcome {
    /// Output already existed; nothing was read, encoded or written
    Skipped { filename: String },
    /// Output was encoded and written
    Processed(CompressionReport),
}

/// Tagged result of one unit of batch work.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Processed(CompressionReport),
    /// Already processed earlier; sizes come from the files on disk
    Skipped {
        filename: String,
        original_size: u64,
        processed_size: u64,
    },
    Failed { filename: String, error: String },
}

impl FileOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Processed(report) => &report.filename,
            Self::Skipped { filename, .. } | Self::Failed { filename, .. } => filename,
        }
    }
}

/// One entry of an asset listing, shaped for the HTTP listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// `<name>-<index>`
    pub key: String,
    pub name: String,
    /// Public URL of the file
    pub path: String,
}

/// Similarity of one (original, processed) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairScore {
    pub filename: String,
    pub score: f64,
}
