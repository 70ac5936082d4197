//! RGBA pixel buffer that charts rasterize into.

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Row-major RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    /// Four bytes per pixel: [R, G, B, A].
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Create a transparent framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if either side is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let len = (width as usize) * (height as usize) * 4;
        Ok(Self { width, height, pixels: vec![0; len] })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill every pixel with `color`.
    pub fn clear(&mut self, color: Rgba) {
        let px = color.to_array();
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Fill a rectangle, clipped to the buffer.
    pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Rgba) {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        let px = color.to_array();
        for row in y..y_end {
            for col in x..x_end {
                let i = self.index(col, row);
                self.pixels[i..i + 4].copy_from_slice(&px);
            }
        }
    }

    /// Read a pixel, or `None` outside the buffer.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        let p = &self.pixels[i..i + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    /// Overwrite a pixel. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i..i + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Alpha-blend `color` over a pixel. Signed coordinates so callers can
    /// draw shapes that cross the edge.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(dst) = self.get_pixel(x, y) {
            self.set_pixel(x, y, color.over(dst));
        }
    }

    /// Number of pixels that differ from `background`.
    #[must_use]
    pub fn ink_count(&self, background: Rgba) -> usize {
        let bg = background.to_array();
        self.pixels.chunks_exact(4).filter(|p| *p != bg).count()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}
