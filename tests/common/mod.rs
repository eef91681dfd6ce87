#![allow(dead_code)]

use std::fs;
use std::path::Path;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use image_pipeline_lib::PipelineConfig;
use tempfile::TempDir;

/// Temporary storage root with an empty `source/` directory.
pub fn storage() -> (TempDir, PipelineConfig) {
    let root = tempfile::tempdir().unwrap();
    let mut config = PipelineConfig::with_root(root.path());
    config.concurrency = 2;
    config.file_timeout_secs = 30;
    fs::create_dir_all(&config.source_dir).unwrap();
    (root, config)
}

/// Smooth colour field with fine texture, rich enough that no encoder
/// reproduces it byte-for-byte.
pub fn photo(width: u32, height: u32, seed: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let texture = (x.wrapping_mul(31) ^ y.wrapping_mul(17) ^ seed) % 23;
        Rgb([
            (x * 255 / width + texture) as u8,
            (y * 255 / height + seed % 40) as u8,
            (((x + y) * 2) % 200 + texture) as u8,
        ])
    }))
}

pub fn write_jpeg(path: &Path, image: &DynamicImage) {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, 100)
        .encode_image(&image.to_rgb8())
        .unwrap();
    fs::write(path, bytes).unwrap();
}

pub fn write_png(path: &Path, image: &DynamicImage) {
    image.save_with_format(path, image::ImageFormat::Png).unwrap();
}

pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
