//! Immutable RGBA snapshots of the drawing surface

use image::{Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Error type for building a [`PixelBuffer`]
#[derive(Debug, Error)]
pub enum BufferError {
    /// Raw byte length does not match `width * height * 4`
    #[error("pixel data has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    LengthMismatch { width: u32, height: u32, expected: usize, actual: usize },
    /// Image could not be opened or decoded
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}

/// A rectangular grid of RGBA8 pixels.
///
/// Captured once from the rendering surface and never mutated afterwards.
/// Pixels are stored row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, as returned by a canvas `getImageData` call.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferError> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        if actual != expected {
            return Err(BufferError::LengthMismatch { width, height, expected, actual });
        }
        RgbaImage::from_raw(width, height, data)
            .map(Self::from)
            .ok_or(BufferError::LengthMismatch { width, height, expected, actual })
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, pixel) }
    }

    /// A fully transparent buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    /// Decode any image format supported by the `image` crate into RGBA8.
    pub fn open(path: &Path) -> Result<Self, BufferError> {
        Ok(Self::from(image::open(path)?.to_rgba8()))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of pixels in the buffer.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Pixel at (x, y), or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.image.into_raw()
    }

    /// Iterate over non-transparent pixels as (x, y, pixel).
    pub fn opaque_pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba<u8>)> + '_ {
        self.image.enumerate_pixels().filter(|(_, _, p)| p[3] != 0).map(|(x, y, p)| (x, y, *p))
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}
