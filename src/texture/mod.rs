//! BLP2 texture decoding and PNG conversion.
//!
//! Supports the two DirectX-content encodings found in item and spell
//! icons: 8-bit palette and DXT1/3/5. JPEG-backed and uncompressed-alpha
//! files are reported as unsupported variants.

pub mod batch;
pub mod dxt;
pub mod encode;
pub mod header;
pub mod image;
pub mod palette;

pub use batch::convert_directory;
pub use encode::encode_png;
pub use header::{BlpHeader, Compression};
pub use image::RgbaImage;

use tracing::trace;

use crate::common::error::BlpResult;

/// Decode mip 0 of a BLP2 file into an RGBA raster.
pub fn decode(data: &[u8]) -> BlpResult<RgbaImage> {
    let header = BlpHeader::parse(data)?;
    let compression = header.compression()?;
    trace!(
        "Decoding {}x{} BLP ({:?}, {} bytes at {}, mips: {})",
        header.width,
        header.height,
        compression,
        header.data_size,
        header.data_offset,
        header.has_mips
    );

    match compression {
        Compression::Palette => palette::decode_palette(data, &header),
        Compression::Dxt(variant) => dxt::decode_dxt(data, &header, variant),
    }
}

/// Decode a BLP2 file and re-encode it as PNG.
pub fn blp_to_png(data: &[u8]) -> BlpResult<Vec<u8>> {
    encode_png(&decode(data)?)
}
