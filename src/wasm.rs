//! WASM API module for browser/JS interop
//!
//! Exposes the bucket fill to a browser canvas. The caller passes the bytes
//! from `getImageData` and gets back either raw RGBA or a PNG data URI it can
//! load straight into an image layer.

use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::fill::{FillRequest, FillResult, DEFAULT_TOLERANCE};
use crate::output::to_data_url;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Result of a fill as raw RGBA pixels.
#[wasm_bindgen]
pub struct FillOutput {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    filled: u32,
}

#[wasm_bindgen]
impl FillOutput {
    /// Width of the fill layer in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the fill layer in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA pixel data (4 bytes per pixel)
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Number of pixels in the filled region
    #[wasm_bindgen(getter)]
    pub fn filled(&self) -> u32 {
        self.filled
    }
}

/// Map a JS tolerance argument onto the engine's range.
///
/// `undefined` and NaN fall back to the default; anything else is clamped
/// to `0..=255` before the fractional part is dropped.
fn resolve_tolerance(tolerance: Option<f64>) -> u8 {
    match tolerance {
        Some(t) if !t.is_nan() => t.clamp(0.0, 255.0) as u8,
        _ => DEFAULT_TOLERANCE,
    }
}

fn run(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    x: f64,
    y: f64,
    color: &str,
    tolerance: Option<f64>,
) -> Option<FillResult> {
    let snapshot = PixelBuffer::from_raw(width, height, pixels).ok()?;
    let request =
        FillRequest::new(x, y, color).ok()?.with_tolerance(resolve_tolerance(tolerance));
    crate::fill::fill_request(&snapshot, &request).ok()
}

/// Flood fill and return the layer as RGBA pixels.
///
/// Returns `undefined` if the color, seed or buffer is invalid. Leaving out
/// `tolerance` uses the default of 30.
#[wasm_bindgen]
pub fn fill_pixels(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    x: f64,
    y: f64,
    color: &str,
    tolerance: Option<f64>,
) -> Option<FillOutput> {
    let result = run(pixels, width, height, x, y, color, tolerance)?;
    Some(FillOutput {
        width: result.image.width(),
        height: result.image.height(),
        filled: u32::try_from(result.filled).unwrap_or(u32::MAX),
        pixels: result.image.into_raw(),
    })
}

/// Flood fill and return the layer as a `data:image/png;base64,...` URI.
///
/// Returns `undefined` if the color, seed or buffer is invalid.
#[wasm_bindgen]
pub fn fill_to_data_url(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    x: f64,
    y: f64,
    color: &str,
    tolerance: Option<f64>,
) -> Option<String> {
    let result = run(pixels, width, height, x, y, color, tolerance)?;
    to_data_url(&result.image).ok()
}
