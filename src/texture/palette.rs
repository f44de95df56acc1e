//! 256-color palette decoding.

use crate::common::error::{BlpError, BlpResult};
use crate::texture::header::{BlpHeader, PALETTE_LEN, PALETTE_OFFSET};
use crate::texture::image::RgbaImage;

/// Decode a palette-indexed mip 0.
///
/// Palette entries are BGRA. Every decoded pixel is forced fully opaque,
/// the palette's own alpha byte is ignored. Pixels beyond the declared
/// mip size stay transparent black.
pub fn decode_palette(data: &[u8], header: &BlpHeader) -> BlpResult<RgbaImage> {
    let palette = data
        .get(PALETTE_OFFSET..PALETTE_OFFSET + PALETTE_LEN)
        .ok_or_else(|| {
            BlpError::format(format!(
                "palette truncated: need {} bytes, got {}",
                PALETTE_OFFSET + PALETTE_LEN,
                data.len()
            ))
        })?;

    let count = header.pixel_count().min(header.data_size as usize);
    let start = header.data_offset as usize;
    let indices = start
        .checked_add(count)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| {
            BlpError::format(format!(
                "pixel data truncated: need {} bytes at offset {}, file is {} bytes",
                count,
                start,
                data.len()
            ))
        })?;

    let mut image = RgbaImage::new(header.width, header.height);
    for (px, &index) in image.pixels.chunks_exact_mut(4).zip(indices) {
        let entry = &palette[index as usize * 4..index as usize * 4 + 4];
        px.copy_from_slice(&[entry[2], entry[1], entry[0], 255]);
    }
    Ok(image)
}
