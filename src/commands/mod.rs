//! Entry points for front ends.
//!
//! - [`optimize_image`]: Process one image on demand
//! - [`optimize_images`]: Run the transcode batch
//! - [`audit_images`]: Run the fidelity audit
//! - [`list_original_images`] / [`list_processed_images`]: Asset listings

mod pipeline;
mod listing;

pub use pipeline::*;
pub use listing::{ORIGINALS_PREFIX, PROCESSED_PREFIX, list_original_images, list_processed_images};
