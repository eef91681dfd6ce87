//! Palette reduction for PNG output.
//!
//! Images with at most 256 distinct RGBA colours get an exact palette and stay
//! lossless. Anything richer is quantised with NeuQuant. Indices are packed at
//! the smallest bit depth that holds the palette.

use std::collections::HashMap;
use color_quant::NeuQuant;
use image::DynamicImage;
use tracing::debug;
use crate::utils::PipelineResult;

const MAX_PALETTE: usize = 256;

/// An indexed image: one palette index per pixel, row-major.
struct Indexed {
    palette: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

/// Encodes `image` as an indexed-colour PNG at maximum compression.
pub fn encode_indexed_png(image: &DynamicImage, quant_speed: i32) -> PipelineResult<Vec<u8>> {
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();

    let indexed = match exact_palette(rgba.as_raw()) {
        Some(indexed) => indexed,
        None => {
            debug!("{}x{} image exceeds {} colours, quantising", width, height, MAX_PALETTE);
            quantize(rgba.as_raw(), quant_speed)
        }
    };

    let depth = bit_depth_for(indexed.palette.len());
    let data = pack_rows(&indexed.indices, width as usize, depth);

    let rgb: Vec<u8> = indexed.palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let mut alpha: Vec<u8> = indexed.palette.iter().map(|c| c[3]).collect();
    // tRNS may omit trailing fully-opaque entries
    while alpha.last() == Some(&255) {
        alpha.pop();
    }

    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_palette(rgb);
        if !alpha.is_empty() {
            encoder.set_trns(alpha);
        }
        encoder.set_compression(png::Compression::Best);
        encoder.set_filter(png::FilterType::NoFilter);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
    }
    Ok(buf)
}

fn exact_palette(pixels: &[u8]) -> Option<Indexed> {
    let mut lookup: HashMap<[u8; 4], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let color = [px[0], px[1], px[2], px[3]];
        let index = match lookup.get(&color) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push(color);
                lookup.insert(color, i);
                i
            }
        };
        indices.push(index);
    }

    Some(Indexed { palette, indices })
}

fn quantize(pixels: &[u8], quant_speed: i32) -> Indexed {
    let nq = NeuQuant::new(quant_speed, MAX_PALETTE, pixels);
    let palette = nq
        .color_map_rgba()
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect();
    let indices = pixels
        .chunks_exact(4)
        .map(|px| nq.index_of(px) as u8)
        .collect();
    Indexed { palette, indices }
}

fn bit_depth_for(palette_len: usize) -> png::BitDepth {
    match palette_len {
        0..=2 => png::BitDepth::One,
        3..=4 => png::BitDepth::Two,
        5..=16 => png::BitDepth::Four,
        _ => png::BitDepth::Eight,
    }
}

/// Packs one index per pixel into rows of `depth` bits, MSB first, each row
/// padded to a whole byte.
fn pack_rows(indices: &[u8], width: usize, depth: png::BitDepth) -> Vec<u8> {
    let bits = depth as usize;
    if bits == 8 || width == 0 {
        return indices.to_vec();
    }

    let per_byte = 8 / bits;
    let row_bytes = width.div_ceil(per_byte);
    let mut out = Vec::with_capacity(row_bytes * (indices.len() / width));

    for row in indices.chunks(width) {
        for group in row.chunks(per_byte) {
            let mut byte = 0u8;
            for (i, &index) in group.iter().enumerate() {
                byte |= index << (8 - bits * (i + 1));
            }
            out.push(byte);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn few_colours_stay_lossless() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_fn(17, 9, |x, y| {
            if (x + y) % 3 == 0 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 100]) }
        }));

        let bytes = encode_indexed_png(&image, 10).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8(), image.to_rgba8());
    }

    #[test]
    fn rich_images_are_quantised_to_same_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x * y) % 256) as u8])
        }));

        let bytes = encode_indexed_png(&image, 10).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 64));
    }

    #[test]
    fn packs_sub_byte_rows_with_padding() {
        // 3 pixels at 2 bits: 0b01_10_11_00
        let packed = pack_rows(&[1, 2, 3, 3, 2, 1], 3, png::BitDepth::Two);
        assert_eq!(packed, vec![0b0110_1100, 0b1110_0100]);
    }

    #[test]
    fn depth_tracks_palette_size() {
        assert_eq!(bit_depth_for(2) as u8, 1);
        assert_eq!(bit_depth_for(16) as u8, 4);
        assert_eq!(bit_depth_for(17) as u8, 8);
    }
}
