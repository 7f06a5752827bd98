//! Raster buffers as produced by the plan editor.
//!
//! Rows are stored bottom-up: row 0 is the bottom of the picture, matching
//! the way the editor writes textures. [`Raster::from_image`] and
//! [`Raster::to_image`] flip to and from the top-down row order of
//! `image::RgbImage`.

use image::{Rgb as ImageRgb, RgbImage};

use crate::color::Rgb;

#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl Raster {
    pub fn filled(width: usize, height: usize, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, bottom-up row `row`.
    pub fn pixel(&self, x: usize, row: usize) -> Option<Rgb> {
        (x < self.width && row < self.height).then(|| self.pixels[row * self.width + x])
    }

    /// Pixel with both indices clamped into range. `None` only for an empty raster.
    pub fn pixel_clamped(&self, x: i64, row: i64) -> Option<Rgb> {
        if self.is_empty() {
            return None;
        }
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let row = row.clamp(0, self.height as i64 - 1) as usize;
        Some(self.pixels[row * self.width + x])
    }

    pub fn set_pixel(&mut self, x: usize, row: usize, color: Rgb) -> bool {
        if x < self.width && row < self.height {
            self.pixels[row * self.width + x] = color;
            true
        } else {
            false
        }
    }

    /// Convert from a top-down image, flipping rows.
    pub fn from_image(image: &RgbImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let mut raster = Self::filled(w, h, Rgb::new(0.0, 0.0, 0.0));
        for (x, y, p) in image.enumerate_pixels() {
            raster.set_pixel(x as usize, h - 1 - y as usize, Rgb::from_bytes(p.0));
        }
        raster
    }

    /// Convert to a top-down image, flipping rows.
    pub fn to_image(&self) -> RgbImage {
        let h = self.height;
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.pixels[(h - 1 - y as usize) * self.width + x as usize];
            ImageRgb(c.to_bytes())
        })
    }
}
