//! PNG and data-URI output for fill layers

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Prefix of every data URI produced by [`to_data_url`].
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode a buffer as PNG bytes.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, OutputError> {
    let mut png_data = Vec::new();
    PngEncoder::new(&mut png_data).write_image(
        buffer.as_raw(),
        buffer.width(),
        buffer.height(),
        ColorType::Rgba8,
    )?;
    Ok(png_data)
}

/// Encode a buffer as a self-contained `data:image/png;base64,...` URI,
/// the form a canvas image layer can load without touching the filesystem.
pub fn to_data_url(buffer: &PixelBuffer) -> Result<String, OutputError> {
    let png = encode_png(buffer)?;
    Ok(format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(png)))
}

/// Save a buffer to a PNG file.
///
/// Parent directories are created if they don't exist.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    buffer.as_image().save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Generate the output path for a fill layer.
///
/// | Scenario | Output |
/// |----------|--------|
/// | Single seed, no `-o` | `{input}_fill.png` |
/// | Seed `i` of several, no `-o` | `{input}_fill_{i}.png` |
/// | `-o out.png`, single seed | `out.png` |
/// | `-o out.png`, seed `i` of several | `out_{i}.png` |
/// | `-o dir/` | `dir/fill.png` or `dir/fill_{i}.png` |
///
/// `index` is `None` when only one seed was given.
pub fn fill_output_path(input: &Path, output_arg: Option<&Path>, index: Option<usize>) -> PathBuf {
    let layer_name = match index {
        Some(i) => format!("fill_{}", i),
        None => "fill".to_string(),
    };

    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(format!("{}.png", layer_name))
            } else if let Some(i) = index {
                let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                sibling(output, format!("{}_{}.png", stem, i))
            } else {
                output.to_path_buf()
            }
        }
        None => {
            let input_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
            sibling(input, format!("{}_{}.png", input_stem, layer_name))
        }
    }
}

/// `name` placed in the same directory as `path`.
fn sibling(path: &Path, name: String) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new(""));
    if parent.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        parent.join(name)
    }
}
