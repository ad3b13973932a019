//! PNG encoding for RGBA map images.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the map has ≤256 unique colors.
//! - **RGBA PNG (color type 6)**: fallback for images with >256 colors.
//!
//! Text metadata (the map caption) is written as `tEXt` chunks ahead of the
//! image data.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, Result};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Encode RGBA pixels, choosing indexed or RGBA output.
///
/// `text` holds `(keyword, value)` pairs written as `tEXt` chunks.
pub fn create_png_auto(
    pixels: &[u8],
    width: usize,
    height: usize,
    text: &[(&str, &str)],
) -> Result<Vec<u8>> {
    check_dimensions(pixels, width, height)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices, text),
        None => create_png(pixels, width, height, text),
    }
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<(u8, u8, u8, u8)>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<(u8, u8, u8, u8)> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);

        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
    text: &[(&str, &str)],
) -> Result<Vec<u8>> {
    if indices.len() != width * height {
        return Err(RenderError::Encode(format!(
            "{} indices for a {width}x{height} image",
            indices.len()
        )));
    }
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let mut plte_data = Vec::with_capacity(palette.len() * 3);
    for (r, g, b, _) in palette {
        plte_data.extend_from_slice(&[*r, *g, *b]);
    }
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS only if any palette entry is not fully opaque
    if palette.iter().any(|(_, _, _, a)| *a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|(_, _, _, a)| *a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    write_text_chunks(&mut png, text)?;

    let idat_data = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize, text: &[(&str, &str)]) -> Result<Vec<u8>> {
    check_dimensions(pixels, width, height)?;
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);

    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 6));
    write_text_chunks(&mut png, text)?;

    let idat_data = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 || pixels.len() != width * height * 4 {
        return Err(RenderError::Encode(format!(
            "{} bytes for a {width}x{height} RGBA image",
            pixels.len()
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Write `tEXt` chunks. Keywords are 1-79 Latin-1 characters; values are
/// written as-is with non-Latin-1 characters replaced by `?`.
fn write_text_chunks(png: &mut Vec<u8>, text: &[(&str, &str)]) -> Result<()> {
    for (keyword, value) in text {
        if keyword.is_empty() || keyword.len() > 79 || !keyword.is_ascii() {
            return Err(RenderError::Encode(format!("invalid tEXt keyword '{keyword}'")));
        }
        let mut data = Vec::with_capacity(keyword.len() + 1 + value.len());
        data.extend_from_slice(keyword.as_bytes());
        data.push(0);
        data.extend(value.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')));
        write_chunk(png, b"tEXt", &data);
    }
    Ok(())
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each `row_bytes`-long scanline with filter byte 0 and deflate.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&uncompressed)
        .and_then(|_| encoder.finish())
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {e}")))
}

/// `(keyword, text)` pairs of every `tEXt` chunk in a PNG.
pub fn text_chunks(png: &[u8]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if !png.starts_with(&PNG_SIGNATURE) {
        return out;
    }
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= png.len() {
        let len = u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
        let kind = &png[pos + 4..pos + 8];
        let start = pos + 8;
        let end = start + len;
        if end + 4 > png.len() {
            break;
        }
        if kind == b"tEXt" {
            let data = &png[start..end];
            if let Some(nul) = data.iter().position(|&b| b == 0) {
                let keyword = data[..nul].iter().map(|&b| b as char).collect();
                let value = data[nul + 1..].iter().map(|&b| b as char).collect();
                out.push((keyword, value));
            }
        }
        pos = end + 4;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];

        let (palette, indices) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices.len(), 4);
        assert_eq!(indices[0], indices[3]);
    }

    #[test]
    fn test_extract_palette_with_transparency() {
        let pixels = [
            255, 0, 0, 255, // red, opaque
            0, 0, 0, 0, // transparent
        ];

        let (palette, _) = extract_palette(&pixels).unwrap();
        assert_eq!(palette.len(), 2);
        assert!(palette.iter().any(|(_, _, _, a)| *a == 0));
    }

    #[test]
    fn test_too_many_colors_for_palette() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7, 255])
            .collect();
        assert!(extract_palette(&pixels).is_none());
    }

    #[test]
    fn test_text_chunk_is_latin1() {
        let mut png = Vec::new();
        write_text_chunks(&mut png, &[("Title", "Zone ≥ 1")]).unwrap();
        // length + type + "Title\0Zone ? 1" + crc
        assert_eq!(&png[4..8], b"tEXt");
        assert_eq!(&png[8..22], b"Title\0Zone ? 1");
        assert!(write_text_chunks(&mut Vec::new(), &[("", "x")]).is_err());
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            create_png(&[0, 0, 0, 255], 2, 2, &[]),
            Err(RenderError::Encode(_))
        ));
    }
}
