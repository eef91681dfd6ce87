//! Asset listings backing the two HTTP listing endpoints.

use tracing::warn;
use crate::core::{AssetEntry, PipelineConfig};
use crate::utils::{PipelineError, PipelineResult, is_supported_image, list_file_names};

/// URL prefix originals are served under.
pub const ORIGINALS_PREFIX: &str = "/uploads";
/// URL prefix processed files are served under.
pub const PROCESSED_PREFIX: &str = "/processed";

/// Supported source images, naturally ordered.
pub async fn list_original_images(config: &PipelineConfig) -> PipelineResult<Vec<AssetEntry>> {
    let names = list_file_names(&config.source_dir).await.map_err(|e| {
        warn!("Listing originals failed: {}", e);
        PipelineError::listing("Could not retrieve original image list.")
    })?;
    let names = names.into_iter().filter(|n| is_supported_image(n));
    Ok(to_entries(names, &config.public_base_url, ORIGINALS_PREFIX))
}

/// Every processed file, naturally ordered.
pub async fn list_processed_images(config: &PipelineConfig) -> PipelineResult<Vec<AssetEntry>> {
    let names = list_file_names(&config.processed_dir).await.map_err(|e| {
        warn!("Listing processed images failed: {}", e);
        PipelineError::listing("Could not retrieve processed image list.")
    })?;
    Ok(to_entries(names, &config.public_base_url, PROCESSED_PREFIX))
}

fn to_entries(
    names: impl IntoIterator<Item = String>,
    base_url: &str,
    prefix: &str,
) -> Vec<AssetEntry> {
    let base_url = base_url.trim_end_matches('/');
    names
        .into_iter()
        .enumerate()
        .map(|(index, name)| AssetEntry {
            key: format!("{name}-{index}"),
            path: format!("{base_url}{prefix}/{name}"),
            name,
        })
        .collect()
}
