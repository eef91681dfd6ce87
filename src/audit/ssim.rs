//! Structural similarity between two grayscale rasters.
//!
//! Scoring is delegated to `image-compare`'s mean SSIM: local statistics over
//! 8×8 windows, the standard SSIM value per window, averaged over windows.

use image::imageops::FilterType;
use image::GrayImage;
use image_compare::Algorithm;
use crate::utils::{PipelineError, PipelineResult};

/// Decodes `bytes` and normalises them to a `size`×`size` grayscale raster.
///
/// The resize crops to fill, so differing aspect ratios are centre-cropped
/// rather than stretched.
pub fn prepare_image(bytes: &[u8], size: u32) -> PipelineResult<GrayImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| PipelineError::decode(format!("Cannot decode image for comparison: {e}")))?;
    Ok(image.resize_to_fill(size, size, FilterType::Lanczos3).to_luma8())
}

/// SSIM of two equally sized rasters, in `[0, 1]`.
///
/// Symmetric in its arguments; 1.0 for identical rasters. Raw SSIM goes
/// negative for anti-correlated content and is clamped.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> PipelineResult<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(PipelineError::format(format!(
            "Cannot compare {}x{} with {}x{}",
            a.width(), a.height(), b.width(), b.height()
        )));
    }
    if a.width() == 0 || a.height() == 0 {
        return Err(PipelineError::format("Cannot compare empty images"));
    }

    let similarity = image_compare::gray_similarity_structure(&Algorithm::MSSIMSimple, a, b)
        .map_err(|e| PipelineError::format(format!("SSIM comparison failed: {e}")))?;
    Ok(similarity.score.clamp(0.0, 1.0))
}
