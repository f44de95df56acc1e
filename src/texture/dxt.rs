//! DXT1/3/5 block decompression.
//!
//! Only the color sub-block is decoded. DXT3/5 alpha sub-blocks are
//! stepped over, so those textures come out with color-derived alpha
//! (opaque except DXT1 punch-through).

use bytes::Buf;
use tracing::debug;

use crate::common::error::{BlpError, BlpResult};
use crate::texture::header::{BlpHeader, DxtVariant};
use crate::texture::image::RgbaImage;

const BLOCK_DIM: u32 = 4;
const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Decode every 4×4 block of mip 0, stopping at the first block that
/// is not fully present in the buffer.
///
/// A non-empty image with no complete block at the data offset is a
/// format error.
pub fn decode_dxt(data: &[u8], header: &BlpHeader, variant: DxtVariant) -> BlpResult<RgbaImage> {
    let block_size = variant.block_size();
    let mut offset = header.data_offset as usize;
    if header.pixel_count() > 0 && data.len().saturating_sub(offset) < block_size {
        return Err(BlpError::format(format!(
            "no DXT block at offset {}: need {} bytes, file is {} bytes",
            offset,
            block_size,
            data.len()
        )));
    }

    let mut image = RgbaImage::new(header.width, header.height);
    let blocks_wide = header.width.div_ceil(BLOCK_DIM).max(1);
    let blocks_high = header.height.div_ceil(BLOCK_DIM).max(1);

    'rows: for by in 0..blocks_high {
        for bx in 0..blocks_wide {
            let Some(block) = data.get(offset..offset + block_size) else {
                debug!(
                    "DXT data ends at block ({}, {}) of {}x{}",
                    bx, by, blocks_wide, blocks_high
                );
                break 'rows;
            };
            decode_block(block, variant, &mut image, bx * BLOCK_DIM, by * BLOCK_DIM);
            offset += block_size;
        }
    }

    Ok(image)
}

/// Decode one block into the image at pixel position `(x, y)`.
pub fn decode_block(block: &[u8], variant: DxtVariant, image: &mut RgbaImage, x: u32, y: u32) {
    let mut buf = if variant.has_alpha_block() {
        &block[8..16]
    } else {
        &block[..8]
    };
    let c0 = buf.get_u16_le();
    let c1 = buf.get_u16_le();
    let bits = buf.get_u32_le();

    let colors = block_palette(c0, c1, variant);

    for py in 0..BLOCK_DIM {
        for px in 0..BLOCK_DIM {
            let index = (bits >> (2 * (4 * py + px))) & 3;
            image.put_pixel(x + px, y + py, colors[index as usize]);
        }
    }
}

/// The four colors a block's 2-bit indices select from.
///
/// DXT1 blocks with `c0 <= c1` use punch-through mode: slot 2 is the
/// midpoint and slot 3 is transparent black.
pub fn block_palette(c0: u16, c1: u16, variant: DxtVariant) -> [[u8; 4]; 4] {
    let a = expand_565(c0);
    let b = expand_565(c1);

    if c0 > c1 || variant != DxtVariant::Dxt1 {
        [a, b, mix(a, b, 2, 1), mix(a, b, 1, 2)]
    } else {
        [a, b, mix(a, b, 1, 1), TRANSPARENT]
    }
}

/// Expand a 565 color to opaque RGBA8.
pub fn expand_565(value: u16) -> [u8; 4] {
    let r = (value >> 11) & 0x1f;
    let g = (value >> 5) & 0x3f;
    let b = value & 0x1f;
    [scale(r, 31), scale(g, 63), scale(b, 31), 255]
}

/// `round(v * 255 / max)` in integers.
fn scale(v: u16, max: u32) -> u8 {
    ((2 * u32::from(v) * 255 + max) / (2 * max)) as u8
}

/// Weighted average `(wa·a + wb·b) / (wa + wb)` per channel, rounded, opaque.
fn mix(a: [u8; 4], b: [u8; 4], wa: u32, wb: u32) -> [u8; 4] {
    let total = wa + wb;
    let channel = |i: usize| {
        let sum = wa * u32::from(a[i]) + wb * u32::from(b[i]);
        ((2 * sum + total) / (2 * total)) as u8
    };
    [channel(0), channel(1), channel(2), 255]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(c0: u16, c1: u16, bits: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(8);
        data.extend_from_slice(&c0.to_le_bytes());
        data.extend_from_slice(&c1.to_le_bytes());
        data.extend_from_slice(&bits.to_le_bytes());
        data
    }

    #[test]
    fn test_expand_565_extremes() {
        assert_eq!(expand_565(0xffff), [255, 255, 255, 255]);
        assert_eq!(expand_565(0x0000), [0, 0, 0, 255]);
        assert_eq!(expand_565(0xf800), [255, 0, 0, 255]);
        assert_eq!(expand_565(0x07e0), [0, 255, 0, 255]);
        assert_eq!(expand_565(0x001f), [0, 0, 255, 255]);
    }

    #[test]
    fn test_expand_565_rounds_to_nearest() {
        // 16 * 255 / 31 = 131.6 -> 132; 32 * 255 / 63 = 129.5.. -> 130
        assert_eq!(expand_565(16 << 11)[0], 132);
        assert_eq!(expand_565(32 << 5)[1], 130);
        // 1 * 255 / 31 = 8.2 -> 8
        assert_eq!(expand_565(1)[2], 8);
    }

    #[test]
    fn test_four_color_palette() {
        // White over black: thirds interpolate to 170 and 85.
        let colors = block_palette(0xffff, 0x0000, DxtVariant::Dxt1);
        assert_eq!(colors[0], [255, 255, 255, 255]);
        assert_eq!(colors[1], [0, 0, 0, 255]);
        assert_eq!(colors[2], [170, 170, 170, 255]);
        assert_eq!(colors[3], [85, 85, 85, 255]);
    }

    #[test]
    fn test_punch_through_palette() {
        let colors = block_palette(0x0000, 0xffff, DxtVariant::Dxt1);
        assert_eq!(colors[2], [128, 128, 128, 255]);
        assert_eq!(colors[3], [0, 0, 0, 0]);

        // Equal endpoints also select punch-through for DXT1.
        assert_eq!(block_palette(0x1234, 0x1234, DxtVariant::Dxt1)[3], [0, 0, 0, 0]);
    }

    #[test]
    fn test_dxt3_and_dxt5_never_punch_through() {
        for variant in [DxtVariant::Dxt3, DxtVariant::Dxt5] {
            let colors = block_palette(0x0000, 0xffff, variant);
            assert_eq!(colors[2], [85, 85, 85, 255]);
            assert_eq!(colors[3], [170, 170, 170, 255]);
        }
    }

    #[test]
    fn test_block_index_layout() {
        // Pixel (px, py) uses bits 2*(4*py+px): give pixel (1, 0) index 1
        // and pixel (0, 1) index 2, everything else index 0.
        let bits = (1 << 2) | (2 << 8);
        let mut image = RgbaImage::new(4, 4);
        decode_block(&block(0xf800, 0x001f, bits), DxtVariant::Dxt1, &mut image, 0, 0);

        assert_eq!(image.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(image.pixel(1, 0), Some([0, 0, 255, 255]));
        assert_eq!(image.pixel(0, 1), Some([170, 0, 85, 255]));
        assert_eq!(image.pixel(3, 3), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_alpha_sub_block_is_skipped() {
        let mut data = vec![0xaa; 8];
        data.extend(block(0x07e0, 0x0000, 0));
        let mut image = RgbaImage::new(4, 4);
        decode_block(&data, DxtVariant::Dxt5, &mut image, 0, 0);
        assert!(image.pixels.chunks(4).all(|px| px == [0, 255, 0, 255]));
    }

    #[test]
    fn test_edge_block_clips_to_image() {
        let mut image = RgbaImage::new(2, 3);
        decode_block(&block(0xffff, 0x0000, 0), DxtVariant::Dxt1, &mut image, 0, 0);
        assert_eq!(image.pixels.len(), 2 * 3 * 4);
        assert!(image.pixels.iter().all(|&b| b == 255));
    }
}
