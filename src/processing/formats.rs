//! Format-specific re-encoding.
//!
//! JPEG-family files are re-encoded lossily at a fixed quality, PNG files at
//! maximum compression effort with optional palette reduction, and anything
//! else is passed through byte-for-byte.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ColorType, DynamicImage};
use jpeg_encoder::{ColorType as JpegColor, Encoder as JpegWriter};
use crate::core::{ImageAsset, PipelineConfig, ProcessedAsset};
use crate::utils::{ImageFormat, PipelineError, PipelineResult};

use super::palette::encode_indexed_png;

/// Encoder parameters, copied out of [`PipelineConfig`] so they can move
/// onto a blocking thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub jpeg_quality: u8,
    pub png_palette: bool,
    pub png_quant_speed: i32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for EncoderSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            png_palette: config.png_palette,
            png_quant_speed: config.png_quant_speed,
        }
    }
}

/// Encodes `image` as JPEG at `quality` with optimised Huffman tables.
///
/// JPEG carries no alpha, so alpha channels are discarded; grayscale input
/// stays single-channel. No metadata is written.
pub fn save_jpeg(image: &DynamicImage, quality: u8) -> PipelineResult<Vec<u8>> {
    let (width, height) = match (u16::try_from(image.width()), u16::try_from(image.height())) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(PipelineError::encode(format!(
                "JPEG save failed: {}x{} exceeds the 65535 pixel limit",
                image.width(),
                image.height()
            )));
        }
    };

    let (pixels, color) = match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => {
            (image.to_luma8().into_raw(), JpegColor::Luma)
        }
        _ => (image.to_rgb8().into_raw(), JpegColor::Rgb),
    };

    let mut buf = Vec::new();
    let mut encoder = JpegWriter::new(&mut buf, quality);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(&pixels, width, height, color)
        .map_err(|e| PipelineError::encode(format!("JPEG save failed: {e}")))?;
    Ok(buf)
}

/// Encodes `image` as PNG with the strongest deflate setting.
///
/// With `palette` the image is reduced to at most 256 colours; otherwise the
/// pixels are kept exactly.
pub fn save_png(image: &DynamicImage, settings: &EncoderSettings) -> PipelineResult<Vec<u8>> {
    if settings.png_palette {
        return encode_indexed_png(image, settings.png_quant_speed);
    }

    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, FilterType::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| PipelineError::encode(format!("PNG save failed: {e}")))?;
    Ok(buf)
}

/// Re-encodes `asset` according to its extension.
pub fn encode_asset(asset: &ImageAsset, settings: &EncoderSettings) -> PipelineResult<ProcessedAsset> {
    let bytes = match asset.format {
        None => asset.bytes.clone(),
        Some(format) => {
            let image = image::load_from_memory(&asset.bytes).map_err(|e| {
                PipelineError::decode(format!("Failed to decode '{}': {e}", asset.filename))
            })?;
            match format {
                ImageFormat::JPEG => save_jpeg(&image, settings.jpeg_quality)?,
                ImageFormat::PNG => save_png(&image, settings)?,
            }
        }
    };

    Ok(ProcessedAsset {
        filename: asset.filename.clone(),
        format: asset.format,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn unknown_extension_passes_bytes_through() {
        let asset = ImageAsset::new("anim.gif", b"GIF89a not really".to_vec());
        let out = encode_asset(&asset, &EncoderSettings::default()).unwrap();
        assert_eq!(out.bytes, asset.bytes);
        assert_eq!(out.filename, "anim.gif");
    }

    #[test]
    fn jpeg_drops_alpha_and_keeps_dimensions() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([10, 20, 30, 128])));
        let bytes = save_jpeg(&rgba, 70).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn grayscale_jpeg_stays_single_channel() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_fn(33, 17, |x, y| {
            image::Luma([((x * 7 + y * 3) % 256) as u8])
        }));
        let decoded = image::load_from_memory(&save_jpeg(&gray, 70).unwrap()).unwrap();
        assert_eq!(decoded.color(), ColorType::L8);
        assert_eq!((decoded.width(), decoded.height()), (33, 17));
    }

    #[test]
    fn optimised_jpeg_is_no_larger_than_baseline() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(256, 192, |x, y| {
            let texture = ((x * 31) ^ (y * 17)) % 23;
            Rgb([
                (x * 255 / 256 + texture) as u8,
                (y * 255 / 192) as u8,
                (((x + y) * 2) % 200 + texture) as u8,
            ])
        }));

        let mut baseline = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut baseline, 70)
            .encode_image(&image.to_rgb8())
            .unwrap();
        let optimised = save_jpeg(&image, 70).unwrap();

        assert!(
            optimised.len() <= baseline.len(),
            "optimised {} bytes, baseline {} bytes",
            optimised.len(),
            baseline.len()
        );
    }

    #[test]
    fn lossless_png_round_trips_pixels() {
        let image = gradient(64, 48);
        let settings = EncoderSettings { png_palette: false, ..EncoderSettings::default() };
        let bytes = save_png(&image, &settings).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgb8(), image.to_rgb8());
    }

    #[test]
    fn corrupt_source_is_a_decode_error() {
        let asset = ImageAsset::new("broken.png", b"definitely not a png".to_vec());
        let err = encode_asset(&asset, &EncoderSettings::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Decode(_)));
    }
}
