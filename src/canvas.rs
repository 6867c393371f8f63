//! Canvas items and the ordered drawing they form
//!
//! A drawing is a sequence of strokes and fill layers. Items are never edited
//! after they are appended; a failed fill leaves the drawing untouched.
//! The JSON shape matches what the canvas front end stores:
//!
//! ```json
//! [
//!   {"type": "line", "tool": "brush", "points": [1.0, 2.0], "strokeColor": "#000000", "strokeWidth": 5.0},
//!   {"type": "fill", "image": "data:image/png;base64,...", "x": 0, "y": 0, "opacity": 0.5}
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::color::Rgb;
use crate::fill::{fill_request, FillError, FillRequest, FillResult};
use crate::output::{to_data_url, OutputError};

/// Error type for drawing operations
#[derive(Debug, Error)]
pub enum DrawingError {
    /// The fill itself failed; nothing was appended.
    #[error(transparent)]
    Fill(#[from] FillError),
    /// The fill result could not be encoded as an image resource.
    #[error(transparent)]
    Output(#[from] OutputError),
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Drawing file is not valid JSON
    #[error("invalid drawing file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which tool produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Brush,
    Eraser,
}

/// A freehand line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub tool: StrokeTool,
    /// Flattened `[x0, y0, x1, y1, ...]`.
    pub points: Vec<f32>,
    pub stroke_color: Rgb,
    pub stroke_width: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl Stroke {
    pub fn brush(color: Rgb, width: f32) -> Self {
        Self {
            tool: StrokeTool::Brush,
            points: Vec::new(),
            stroke_color: color,
            stroke_width: width,
            opacity: None,
        }
    }

    /// Erasing paints the white page color over whatever is underneath.
    pub fn eraser(width: f32) -> Self {
        Self { tool: StrokeTool::Eraser, ..Self::brush(Rgb::WHITE, width) }
    }
}

/// A rasterized fill layer placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillLayer {
    /// PNG data URI of the fill result.
    pub image: String,
    pub x: i32,
    pub y: i32,
    /// Render-time opacity; never baked into `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
}

impl FillLayer {
    /// Wrap a fill result as a layer at the origin.
    ///
    /// `opacity` is clamped to `[0, 1]`; NaN is treated as fully opaque.
    pub fn from_result(result: &FillResult, opacity: f32) -> Result<Self, OutputError> {
        let opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
        Ok(Self { image: to_data_url(&result.image)?, x: 0, y: 0, opacity: Some(opacity) })
    }

    /// Opacity used when rendering; absent means fully opaque.
    pub fn effective_opacity(&self) -> f32 {
        self.opacity.unwrap_or(1.0)
    }
}

/// One drawable element of a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CanvasItem {
    Line(Stroke),
    Fill(FillLayer),
}

/// The ordered sequence of canvas items making up a drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drawing {
    items: Vec<CanvasItem>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a drawing from a JSON file. A missing file is an empty drawing.
    pub fn load(path: &Path) -> Result<Self, DrawingError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write the drawing as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), DrawingError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: CanvasItem) {
        self.items.push(item);
    }

    /// Append an already computed fill result as a layer.
    pub fn push_fill(&mut self, result: &FillResult, opacity: f32) -> Result<(), DrawingError> {
        let layer = FillLayer::from_result(result, opacity)?;
        self.items.push(CanvasItem::Fill(layer));
        Ok(())
    }

    /// Run a fill against `snapshot` and append the result as a layer.
    ///
    /// On any failure the drawing is left exactly as it was.
    pub fn apply_fill(
        &mut self,
        snapshot: &PixelBuffer,
        request: &FillRequest,
        opacity: f32,
    ) -> Result<FillResult, DrawingError> {
        let result = fill_request(snapshot, request)?;
        self.push_fill(&result, opacity)?;
        Ok(result)
    }

    /// Fill layers in drawing order.
    pub fn fill_layers(&self) -> impl Iterator<Item = &FillLayer> {
        self.items.iter().filter_map(|item| match item {
            CanvasItem::Fill(layer) => Some(layer),
            CanvasItem::Line(_) => None,
        })
    }
}
