//! BLP2 header layout and parsing.

use bytes::Buf;

use crate::common::error::{BlpError, BlpResult};

pub const MAGIC: &[u8; 4] = b"BLP2";

// Byte offsets into the file, all multi-byte fields little-endian.
pub const MAGIC_OFFSET: usize = 0;
pub const TYPE_OFFSET: usize = 4;
pub const ENCODING_OFFSET: usize = 5;
pub const ALPHA_DEPTH_OFFSET: usize = 6;
pub const ALPHA_ENCODING_OFFSET: usize = 7;
pub const HAS_MIPS_OFFSET: usize = 8;
pub const WIDTH_OFFSET: usize = 12;
pub const HEIGHT_OFFSET: usize = 16;
pub const MIP0_OFFSET_OFFSET: usize = 28;
pub const MIP0_SIZE_OFFSET: usize = 92;
pub const PALETTE_OFFSET: usize = 148;

/// 256 BGRA entries.
pub const PALETTE_LEN: usize = 256 * 4;

/// Bytes needed to read every fixed header field.
pub const HEADER_LEN: usize = MIP0_SIZE_OFFSET + 4;

/// Largest width or height accepted. The raster for a header at the cap
/// is 64 MiB; DXT input must also hold at least one complete block
/// before it is allocated.
pub const MAX_DIMENSION: u32 = 4096;

/// Content type byte.
pub mod content_kind {
    pub const JPEG: u8 = 0;
    pub const DIRECT: u8 = 1;
}

/// Encoding byte for direct content.
pub mod encoding_kind {
    pub const PALETTE: u8 = 1;
    pub const DXT: u8 = 2;
    pub const UNCOMPRESSED_ALPHA: u8 = 3;
}

/// DXT block format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxtVariant {
    Dxt1,
    Dxt3,
    Dxt5,
}

impl DxtVariant {
    /// DXT1 without alpha bits; otherwise the alpha encoding picks 3 or 5.
    pub fn from_alpha(alpha_depth: u8, alpha_encoding: u8) -> Self {
        match (alpha_depth, alpha_encoding) {
            (0, _) => Self::Dxt1,
            (_, 1) => Self::Dxt3,
            _ => Self::Dxt5,
        }
    }

    pub fn block_size(self) -> usize {
        match self {
            Self::Dxt1 => 8,
            Self::Dxt3 | Self::Dxt5 => 16,
        }
    }

    /// DXT3/5 blocks carry an 8-byte alpha sub-block before the colors.
    pub fn has_alpha_block(self) -> bool {
        self != Self::Dxt1
    }
}

/// How the mip-0 pixel data is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Palette,
    Dxt(DxtVariant),
}

/// Decoded fixed header of a BLP2 file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlpHeader {
    pub content: u8,
    pub encoding: u8,
    pub alpha_depth: u8,
    pub alpha_encoding: u8,
    pub has_mips: bool,
    pub width: u32,
    pub height: u32,
    /// Absolute file offset of the mip-0 pixel data.
    pub data_offset: u32,
    /// Size in bytes of the mip-0 pixel data.
    pub data_size: u32,
}

impl BlpHeader {
    /// Parse and sanity-check the header.
    ///
    /// Content/encoding is classified before the full header length is
    /// required, so a short JPEG-backed file still reports as unsupported.
    pub fn parse(data: &[u8]) -> BlpResult<Self> {
        if data.len() < 4 {
            return Err(BlpError::format(format!(
                "need at least 4 bytes, got {}",
                data.len()
            )));
        }

        let magic = &data[MAGIC_OFFSET..MAGIC_OFFSET + 4];
        if magic != MAGIC {
            return Err(BlpError::format(format!(
                "not a BLP2 file (got: {})",
                String::from_utf8_lossy(magic)
            )));
        }

        if data.len() <= ENCODING_OFFSET {
            return Err(BlpError::format("header truncated before encoding"));
        }
        classify(data[TYPE_OFFSET], data[ENCODING_OFFSET])?;

        if data.len() < HEADER_LEN {
            return Err(BlpError::format(format!(
                "header truncated: need {} bytes, got {}",
                HEADER_LEN,
                data.len()
            )));
        }

        let mut buf = &data[TYPE_OFFSET..];
        let content = buf.get_u8();
        let encoding = buf.get_u8();
        let alpha_depth = buf.get_u8();
        let alpha_encoding = buf.get_u8();
        let has_mips = data[HAS_MIPS_OFFSET] != 0;

        let width = read_u32(data, WIDTH_OFFSET);
        let height = read_u32(data, HEIGHT_OFFSET);
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(BlpError::format(format!(
                "image dimensions {}x{} exceed {}",
                width, height, MAX_DIMENSION
            )));
        }

        Ok(Self {
            content,
            encoding,
            alpha_depth,
            alpha_encoding,
            has_mips,
            width,
            height,
            data_offset: read_u32(data, MIP0_OFFSET_OFFSET),
            data_size: read_u32(data, MIP0_SIZE_OFFSET),
        })
    }

    pub fn compression(&self) -> BlpResult<Compression> {
        match classify(self.content, self.encoding)? {
            Compression::Dxt(_) => Ok(Compression::Dxt(DxtVariant::from_alpha(
                self.alpha_depth,
                self.alpha_encoding,
            ))),
            palette => Ok(palette),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut buf = &data[offset..offset + 4];
    buf.get_u32_le()
}

/// Map the content/encoding pair onto a supported compression.
///
/// The DXT variant is refined from the alpha fields by the caller.
fn classify(content: u8, encoding: u8) -> BlpResult<Compression> {
    match (content, encoding) {
        (content_kind::DIRECT, encoding_kind::PALETTE) => Ok(Compression::Palette),
        (content_kind::DIRECT, encoding_kind::DXT) => Ok(Compression::Dxt(DxtVariant::Dxt1)),
        (content_kind::JPEG, _) => Err(BlpError::UnsupportedVariant {
            kind: content,
            encoding,
            name: "JPEG",
        }),
        (content_kind::DIRECT, encoding_kind::UNCOMPRESSED_ALPHA) => Err(BlpError::UnsupportedVariant {
            kind: content,
            encoding,
            name: "uncompressed with alpha",
        }),
        _ => Err(BlpError::format(format!(
            "unknown BLP encoding: type={}, encoding={}",
            content, encoding
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(content: u8, encoding: u8, width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data[..4].copy_from_slice(MAGIC);
        data[TYPE_OFFSET] = content;
        data[ENCODING_OFFSET] = encoding;
        data[HAS_MIPS_OFFSET] = 1;
        data[WIDTH_OFFSET..WIDTH_OFFSET + 4].copy_from_slice(&width.to_le_bytes());
        data[HEIGHT_OFFSET..HEIGHT_OFFSET + 4].copy_from_slice(&height.to_le_bytes());
        data[MIP0_OFFSET_OFFSET..MIP0_OFFSET_OFFSET + 4].copy_from_slice(&1172u32.to_le_bytes());
        data[MIP0_SIZE_OFFSET..MIP0_SIZE_OFFSET + 4].copy_from_slice(&4096u32.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_fields() {
        let header = BlpHeader::parse(&header_bytes(1, 1, 64, 32)).unwrap();
        assert_eq!(header.width, 64);
        assert_eq!(header.height, 32);
        assert!(header.has_mips);
        assert_eq!(header.data_offset, 1172);
        assert_eq!(header.data_size, 4096);
        assert_eq!(header.pixel_count(), 2048);
        assert_eq!(header.compression().unwrap(), Compression::Palette);
    }

    #[test]
    fn test_short_buffer_is_format_error() {
        assert!(matches!(BlpHeader::parse(b"BL"), Err(BlpError::Format { .. })));
        assert!(matches!(BlpHeader::parse(b""), Err(BlpError::Format { .. })));
    }

    #[test]
    fn test_wrong_magic_is_format_error() {
        let mut data = header_bytes(1, 1, 1, 1);
        data[..4].copy_from_slice(b"BLP1");
        let err = BlpHeader::parse(&data).unwrap_err();
        assert!(matches!(err, BlpError::Format { .. }));
        assert!(err.to_string().contains("BLP1"));
    }

    #[test]
    fn test_truncated_header_is_format_error() {
        let data = header_bytes(1, 2, 4, 4);
        assert!(matches!(
            BlpHeader::parse(&data[..40]),
            Err(BlpError::Format { .. })
        ));
    }

    #[test]
    fn test_jpeg_is_unsupported_variant() {
        let data = header_bytes(0, 1, 4, 4);
        assert!(matches!(
            BlpHeader::parse(&data),
            Err(BlpError::UnsupportedVariant { kind: 0, .. })
        ));
        // Even when the rest of the header is missing.
        assert!(matches!(
            BlpHeader::parse(&data[..8]),
            Err(BlpError::UnsupportedVariant { kind: 0, .. })
        ));
    }

    #[test]
    fn test_uncompressed_alpha_is_unsupported_variant() {
        assert!(matches!(
            BlpHeader::parse(&header_bytes(1, 3, 4, 4)),
            Err(BlpError::UnsupportedVariant { encoding: 3, .. })
        ));
    }

    #[test]
    fn test_unknown_combination_is_format_error() {
        assert!(matches!(
            BlpHeader::parse(&header_bytes(1, 9, 4, 4)),
            Err(BlpError::Format { .. })
        ));
        assert!(matches!(
            BlpHeader::parse(&header_bytes(7, 1, 4, 4)),
            Err(BlpError::Format { .. })
        ));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        assert!(matches!(
            BlpHeader::parse(&header_bytes(1, 1, MAX_DIMENSION + 1, 1)),
            Err(BlpError::Format { .. })
        ));
    }

    #[test]
    fn test_dxt_variant_selection() {
        let mut data = header_bytes(1, 2, 4, 4);
        let header = BlpHeader::parse(&data).unwrap();
        assert_eq!(header.compression().unwrap(), Compression::Dxt(DxtVariant::Dxt1));

        data[ALPHA_DEPTH_OFFSET] = 8;
        data[ALPHA_ENCODING_OFFSET] = 1;
        let header = BlpHeader::parse(&data).unwrap();
        assert_eq!(header.compression().unwrap(), Compression::Dxt(DxtVariant::Dxt3));

        data[ALPHA_ENCODING_OFFSET] = 7;
        let header = BlpHeader::parse(&data).unwrap();
        assert_eq!(header.compression().unwrap(), Compression::Dxt(DxtVariant::Dxt5));
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(DxtVariant::Dxt1.block_size(), 8);
        assert_eq!(DxtVariant::Dxt3.block_size(), 16);
        assert_eq!(DxtVariant::Dxt5.block_size(), 16);
        assert!(!DxtVariant::Dxt1.has_alpha_block());
    }
}
