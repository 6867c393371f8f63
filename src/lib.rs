//! Bucketfill - tolerance-based flood fill for canvas snapshots
//!
//! This library provides functionality to:
//! - Flood fill an RGBA snapshot from a seed point into a transparent fill layer
//! - Encode fill layers as PNG files or data URIs
//! - Record fills as canvas items in an ordered drawing
//! - Load `bfill.toml` configuration and log failed fills

pub mod buffer;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod config;
pub mod fill;
pub mod output;
pub mod telemetry;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::PixelBuffer;
pub use color::Rgb;
pub use fill::{fill, fill_request, FillError, FillLimits, FillPoll, FillRequest, FillResult};
