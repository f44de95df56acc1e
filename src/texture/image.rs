//! Flat RGBA raster produced by the decoders.

/// Row-major RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// A fully transparent black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = self.offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[off..off + 4]);
        Some(px)
    }

    /// Write a pixel; coordinates outside the image are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let off = self.offset(x, y);
        self.pixels[off..off + 4].copy_from_slice(&rgba);
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}
