// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod worker;
pub mod processing;
pub mod audit;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{BatchSummary, CompressionReport, PipelineConfig, TranscodeOutcome};
pub use utils::{PipelineError, PipelineResult};
pub use processing::{BatchProcessor, Transcoder};
pub use audit::{AuditOutcome, AuditReport, FidelityAuditor};
pub use commands::*;

// This library file is used as a public API for consuming this crate as a library.
// The command-line entry point is in main.rs.
