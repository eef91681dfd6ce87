//! Fidelity audit: SSIM between each source image and its processed counterpart.

mod auditor;
pub mod ssim;

pub use auditor::{AuditOutcome, AuditReport, FidelityAuditor};
pub use ssim::{prepare_image, ssim};
