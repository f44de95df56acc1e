//! PNG output for decoded textures.

use crate::common::error::{BlpError, BlpResult};
use crate::texture::image::RgbaImage;

/// Encode an RGBA raster as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> BlpResult<Vec<u8>> {
    if image.is_empty() {
        return Err(BlpError::format(format!(
            "cannot encode an empty {}x{} image",
            image.width, image.height
        )));
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width, image.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&image.pixels)?;
        writer.finish()?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_decodes_back() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, [10, 20, 30, 255]);
        image.put_pixel(1, 0, [0, 0, 0, 0]);

        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (2, 1));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(&buf[..info.buffer_size()], image.pixels.as_slice());
    }

    #[test]
    fn test_empty_image_rejected() {
        assert!(matches!(
            encode_png(&RgbaImage::new(0, 0)),
            Err(BlpError::Format { .. })
        ));
    }
}
