//! Region flood fill for the bucket tool.
//!
//! Computes the 4-connected region of pixels whose color is within a
//! per-channel tolerance of the seed pixel, and returns a new transparent
//! image containing only that region painted in the fill color.
//!
//! The source snapshot is only borrowed. Each call owns its own output and
//! visited marker, so independent calls can run on separate threads.

use crate::buffer::PixelBuffer;
use crate::color::{parse_color, ColorError, Rgb};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Tolerance used when the caller does not pick one.
pub const DEFAULT_TOLERANCE: u8 = 30;

/// How many work-list pops happen between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 4096;

/// Why a fill gave up before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The region grew past the pixel cap.
    PixelLimit { limit: u64 },
    /// The fill ran longer than the time budget.
    Timeout { limit: Duration },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::PixelLimit { limit } => {
                write!(f, "region exceeds {} pixels", limit)
            }
            AbortReason::Timeout { limit } => {
                write!(f, "fill took longer than {}ms", limit.as_millis())
            }
        }
    }
}

/// Error type for fill operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    /// Fill color could not be parsed.
    #[error("invalid fill color: {0}")]
    InvalidColor(#[from] ColorError),
    /// Source buffer has zero width or height.
    #[error("cannot fill an empty {width}x{height} buffer")]
    EmptyBuffer { width: u32, height: u32 },
    /// Seed lies outside the buffer after truncation.
    #[error("seed ({x}, {y}) out of bounds for {width}x{height} buffer")]
    OutOfBounds { x: f64, y: f64, width: u32, height: u32 },
    /// A caller-imposed cap was exceeded.
    #[error("fill aborted: {0}")]
    FillAborted(AbortReason),
}

impl FillError {
    /// Stable snake_case name, used for error telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            FillError::InvalidColor(_) => "invalid_color",
            FillError::EmptyBuffer { .. } => "empty_buffer",
            FillError::OutOfBounds { .. } => "out_of_bounds",
            FillError::FillAborted(_) => "fill_aborted",
        }
    }

    /// A short hint for fixing the input, when one exists.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            FillError::InvalidColor(_) => Some("use a 6-digit hex color like #FF6B6B".to_string()),
            FillError::EmptyBuffer { .. } => None,
            FillError::OutOfBounds { width, height, .. } => Some(format!(
                "seed must lie within 0..{} horizontally and 0..{} vertically",
                width, height
            )),
            FillError::FillAborted(AbortReason::PixelLimit { .. }) => {
                Some("raise fill.max_pixels or pick a smaller region".to_string())
            }
            FillError::FillAborted(AbortReason::Timeout { .. }) => {
                Some("raise fill.timeout_ms".to_string())
            }
        }
    }
}

/// Optional caps that turn a runaway fill into [`FillError::FillAborted`].
///
/// The default is unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillLimits {
    /// Maximum number of pixels the region may contain.
    pub max_pixels: Option<u64>,
    /// Wall-clock budget for a single fill.
    pub timeout: Option<Duration>,
}

impl FillLimits {
    pub fn unlimited() -> Self {
        Self::default()
    }
}

/// Everything needed to run one fill against a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRequest {
    /// Seed x, possibly fractional (pointer position). Floored before use.
    pub x: f64,
    /// Seed y, possibly fractional (pointer position). Floored before use.
    pub y: f64,
    pub color: Rgb,
    pub tolerance: u8,
    pub limits: FillLimits,
}

impl FillRequest {
    /// Build a request from a `#RRGGBB` string with the default tolerance.
    pub fn new(x: f64, y: f64, color_hex: &str) -> Result<Self, FillError> {
        Ok(Self::with_color(x, y, parse_color(color_hex)?))
    }

    /// Build a request from an already parsed color.
    pub fn with_color(x: f64, y: f64, color: Rgb) -> Self {
        Self { x, y, color, tolerance: DEFAULT_TOLERANCE, limits: FillLimits::default() }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_limits(mut self, limits: FillLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Bounding rectangle of a filled region, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Output of a successful fill.
#[derive(Debug, Clone, PartialEq)]
pub struct FillResult {
    /// Same size as the source; the region in the fill color at alpha 255,
    /// fully transparent elsewhere.
    pub image: PixelBuffer,
    /// Number of pixels in the region.
    pub filled: u64,
    /// Integer seed actually used.
    pub seed: (u32, u32),
    pub color: Rgb,
    /// Bounding box of the region. Never empty, the seed always matches itself.
    pub bounds: FillBounds,
}

/// Flood fill `buffer` from `(x, y)` with a `#RRGGBB` color.
///
/// # Examples
///
/// ```
/// use bucketfill::buffer::PixelBuffer;
/// use bucketfill::fill::fill;
/// use image::Rgba;
///
/// let canvas = PixelBuffer::filled(4, 4, Rgba([255, 255, 255, 255]));
/// let result = fill(&canvas, 1.5, 2.0, "#FF0000", 30).unwrap();
/// assert_eq!(result.filled, 16);
/// assert_eq!(result.image.get(0, 0), Some(Rgba([255, 0, 0, 255])));
/// ```
///
/// # Errors
///
/// `InvalidColor` if the color does not parse, `EmptyBuffer` for a zero-area
/// buffer, `OutOfBounds` if the floored seed is outside the buffer.
pub fn fill(
    buffer: &PixelBuffer,
    x: f64,
    y: f64,
    color_hex: &str,
    tolerance: u8,
) -> Result<FillResult, FillError> {
    let request = FillRequest::new(x, y, color_hex)?.with_tolerance(tolerance);
    fill_request(buffer, &request)
}

/// Run a prepared [`FillRequest`], honouring its limits.
pub fn fill_request(buffer: &PixelBuffer, request: &FillRequest) -> Result<FillResult, FillError> {
    let (width, height) = buffer.dimensions();
    if buffer.is_empty() {
        return Err(FillError::EmptyBuffer { width, height });
    }

    let (sx, sy) = resolve_seed(request.x, request.y, width, height).ok_or(
        FillError::OutOfBounds { x: request.x, y: request.y, width, height },
    )?;

    let source = buffer.as_image();
    let reference = *source.get_pixel(sx, sy);
    let paint = request.color.opaque();
    let tolerance = request.tolerance;
    let limits = request.limits;

    let mut output = RgbaImage::new(width, height);
    let mut visited = vec![false; width as usize * height as usize];
    let mut stack: Vec<(u32, u32)> = vec![(sx, sy)];

    let started = Instant::now();
    let mut pops: u64 = 0;
    let mut filled: u64 = 0;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (sx, sy, sx, sy);

    while let Some((cx, cy)) = stack.pop() {
        pops += 1;
        if let Some(timeout) = limits.timeout {
            if pops % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() > timeout {
                return Err(FillError::FillAborted(AbortReason::Timeout { limit: timeout }));
            }
        }

        let idx = cy as usize * width as usize + cx as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if !within_tolerance(*source.get_pixel(cx, cy), reference, tolerance) {
            // Boundary pixel: neither painted nor expanded
            continue;
        }

        output.put_pixel(cx, cy, paint);
        filled += 1;
        if let Some(limit) = limits.max_pixels {
            if filled > limit {
                return Err(FillError::FillAborted(AbortReason::PixelLimit { limit }));
            }
        }

        min_x = min_x.min(cx);
        min_y = min_y.min(cy);
        max_x = max_x.max(cx);
        max_y = max_y.max(cy);

        // 4-connected neighbors: right, left, down, up
        if cx + 1 < width && !visited[idx + 1] {
            stack.push((cx + 1, cy));
        }
        if cx > 0 && !visited[idx - 1] {
            stack.push((cx - 1, cy));
        }
        if cy + 1 < height && !visited[idx + width as usize] {
            stack.push((cx, cy + 1));
        }
        if cy > 0 && !visited[idx - width as usize] {
            stack.push((cx, cy - 1));
        }
    }

    Ok(FillResult {
        image: PixelBuffer::from(output),
        filled,
        seed: (sx, sy),
        color: request.color,
        bounds: FillBounds {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        },
    })
}

/// Run several independent fills against the same snapshot in parallel.
///
/// Results come back in request order.
pub fn fill_many(
    buffer: &PixelBuffer,
    requests: &[FillRequest],
) -> Vec<Result<FillResult, FillError>> {
    requests.par_iter().map(|request| fill_request(buffer, request)).collect()
}

/// A fill running on a worker thread.
///
/// Dropping it abandons the result; the worker finishes on its own and its
/// output is discarded.
pub struct PendingFill {
    receiver: Receiver<Result<FillResult, FillError>>,
    handle: Option<JoinHandle<()>>,
}

/// State of a [`PendingFill`] when polled.
#[derive(Debug)]
pub enum FillPoll {
    /// The worker has not reported yet.
    Running,
    /// The worker finished; this is the only time the result is handed out.
    Ready(Result<FillResult, FillError>),
    /// No result will ever arrive: it was already taken, or the worker died.
    Gone,
}

impl PendingFill {
    /// Take the result if the worker has finished.
    ///
    /// Keep polling only while this returns [`FillPoll::Running`].
    pub fn try_result(&mut self) -> FillPoll {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.reap();
                FillPoll::Ready(result)
            }
            Err(TryRecvError::Empty) => FillPoll::Running,
            Err(TryRecvError::Disconnected) => {
                self.reap();
                FillPoll::Gone
            }
        }
    }

    /// Block until the worker finishes.
    ///
    /// Returns `None` only if the worker died without reporting.
    pub fn wait(mut self) -> Option<Result<FillResult, FillError>> {
        let result = self.receiver.recv().ok();
        self.reap();
        result
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Run a fill on a background thread so an interactive caller stays
/// responsive. The snapshot is moved to the worker.
pub fn spawn_fill(buffer: PixelBuffer, request: FillRequest) -> PendingFill {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        // Receiver may already be gone if the caller abandoned the fill
        let _ = sender.send(fill_request(&buffer, &request));
    });
    PendingFill { receiver, handle: Some(handle) }
}

/// Floor a possibly fractional seed and check it against the buffer.
fn resolve_seed(x: f64, y: f64, width: u32, height: u32) -> Option<(u32, u32)> {
    let fx = x.floor();
    let fy = y.floor();
    if !fx.is_finite() || !fy.is_finite() || fx < 0.0 || fy < 0.0 {
        return None;
    }
    if fx >= width as f64 || fy >= height as f64 {
        return None;
    }
    Some((fx as u32, fy as u32))
}

/// Per-channel match: every channel, alpha included, within `tolerance`.
fn within_tolerance(pixel: Rgba<u8>, reference: Rgba<u8>, tolerance: u8) -> bool {
    pixel.0.iter().zip(reference.0.iter()).all(|(a, b)| a.abs_diff(*b) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    /// Build a buffer from rows of characters: '.' white, '#' black,
    /// ' ' transparent.
    fn canvas(rows: &[&str]) -> PixelBuffer {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut img = RgbaImage::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let p = match c {
                    '.' => WHITE,
                    '#' => BLACK,
                    _ => CLEAR,
                };
                img.put_pixel(x as u32, y as u32, p);
            }
        }
        PixelBuffer::from(img)
    }

    fn painted(result: &FillResult) -> Vec<(u32, u32)> {
        result.image.opaque_pixels().map(|(x, y, _)| (x, y)).collect()
    }

    #[test]
    fn test_fill_enclosed_region() {
        let buf = canvas(&[
            "...#.", //
            "...#.", //
            "...#.", //
            "####.", //
            ".....",
        ]);
        let result = fill(&buf, 0.0, 0.0, "#FF0000", 30).unwrap();

        assert_eq!(result.filled, 9);
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(result.image.get(x, y), Some(RED), "({},{}) should be red", x, y);
            }
        }
        // Wall and the region behind it stay transparent
        assert_eq!(result.image.get(3, 0), Some(CLEAR));
        assert_eq!(result.image.get(4, 0), Some(CLEAR));
        assert_eq!(result.image.get(0, 4), Some(CLEAR));
        assert_eq!(result.bounds, FillBounds { x: 0, y: 0, width: 3, height: 3 });
    }

    #[test]
    fn test_output_has_only_two_pixel_values() {
        let buf = canvas(&[
            "..#..", //
            ".#.#.", //
            "#...#", //
            ".#.#.", //
            "..#..",
        ]);
        let result = fill(&buf, 2.0, 2.0, "#4ECDC4", 30).unwrap();
        let fill_px = Rgba([0x4E, 0xCD, 0xC4, 255]);
        for (_, _, p) in result.image.as_image().enumerate_pixels() {
            assert!(*p == fill_px || p[3] == 0, "unexpected pixel {:?}", p);
        }
    }

    #[test]
    fn test_no_diagonal_leak() {
        let buf = canvas(&[
            ".#.", //
            "#.#", //
            ".#.",
        ]);
        let result = fill(&buf, 1.0, 1.0, "#FF0000", 30).unwrap();
        assert_eq!(painted(&result), vec![(1, 1)]);
    }

    #[test]
    fn test_single_pixel_region() {
        let mut img = RgbaImage::from_pixel(3, 3, BLACK);
        img.put_pixel(1, 1, WHITE);
        let buf = PixelBuffer::from(img);

        let result = fill(&buf, 1.0, 1.0, "#00FF00", 30).unwrap();
        assert_eq!(result.filled, 1);
        assert_eq!(painted(&result), vec![(1, 1)]);
        assert_eq!(result.image.get(1, 1), Some(Rgba([0, 255, 0, 255])));
    }

    #[test]
    fn test_full_canvas_fill_any_tolerance() {
        for tolerance in [0u8, 1, 30, 255] {
            let buf = PixelBuffer::filled(5, 5, Rgba([10, 20, 30, 40]));
            let result = fill(&buf, 4.0, 0.0, "#123456", tolerance).unwrap();
            assert_eq!(result.filled, 25, "tolerance {}", tolerance);
            assert_eq!(result.image.opaque_pixels().count(), 25);
        }
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let mut img = RgbaImage::from_pixel(3, 1, Rgba([100, 100, 100, 255]));
        img.put_pixel(1, 0, Rgba([130, 70, 130, 225])); // every channel exactly 30 away
        img.put_pixel(2, 0, Rgba([131, 100, 100, 255])); // one channel 31 away
        let buf = PixelBuffer::from(img);

        let result = fill(&buf, 0.0, 0.0, "#000000", 30).unwrap();
        assert_eq!(painted(&result), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_channels_compared_independently() {
        // Small differences on every channel add up to more than the tolerance
        // in Euclidean terms but still match per channel
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([50, 50, 50, 255]));
        img.put_pixel(1, 0, Rgba([60, 40, 60, 245]));
        let buf = PixelBuffer::from(img);

        let result = fill(&buf, 0.0, 0.0, "#FFFFFF", 10).unwrap();
        assert_eq!(result.filled, 2);
    }

    #[test]
    fn test_alpha_channel_is_matched() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        let buf = PixelBuffer::from(img);

        let result = fill(&buf, 0.0, 0.0, "#FFFFFF", 30).unwrap();
        assert_eq!(painted(&result), vec![(0, 0)]);
    }

    #[test]
    fn test_transparent_seed_fills_transparent_region() {
        let buf = canvas(&[
            "  #  ", //
            "  #  ", //
            "  #  ",
        ]);
        let result = fill(&buf, 0.0, 0.0, "#FF0000", 30).unwrap();
        assert_eq!(result.filled, 6);
        assert_eq!(result.image.get(1, 2), Some(RED));
        assert_eq!(result.image.get(3, 0), Some(CLEAR));
    }

    #[test]
    fn test_seed_already_fill_color_still_fills() {
        let buf = PixelBuffer::filled(3, 2, RED);
        let result = fill(&buf, 0.0, 0.0, "#FF0000", 30).unwrap();
        assert_eq!(result.filled, 6);
        assert_eq!(result.image.get(2, 1), Some(RED));
    }

    #[test]
    fn test_fractional_seed_is_floored() {
        let buf = canvas(&[
            ".#.", //
            ".#.",
        ]);
        let result = fill(&buf, 2.9, 1.99, "#FF0000", 0).unwrap();
        assert_eq!(result.seed, (2, 1));
        assert_eq!(painted(&result), vec![(2, 0), (2, 1)]);
    }

    #[test]
    fn test_invalid_color_rejected() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        let err = fill(&buf, 1.0, 1.0, "notacolor", 30).unwrap_err();
        assert!(matches!(err, FillError::InvalidColor(_)));
        assert_eq!(err.kind(), "invalid_color");
    }

    #[test]
    fn test_invalid_color_checked_before_bounds() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        let err = fill(&buf, 50.0, 50.0, "#12345", 30).unwrap_err();
        assert!(matches!(err, FillError::InvalidColor(ColorError::InvalidLength(5))));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        let err = fill(&buf, 15.0, 5.0, "#FF0000", 30).unwrap_err();
        match err {
            FillError::OutOfBounds { width, height, .. } => assert_eq!((width, height), (10, 10)),
            other => panic!("Expected OutOfBounds, got: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_bounds_edges() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        for (x, y) in [(10.0, 0.0), (0.0, 10.0), (-0.5, 0.0), (0.0, -1.0), (f64::NAN, 0.0)] {
            let err = fill(&buf, x, y, "#FF0000", 30).unwrap_err();
            assert!(matches!(err, FillError::OutOfBounds { .. }), "({}, {})", x, y);
        }
        assert!(fill(&buf, 9.99, 9.99, "#FF0000", 30).is_ok());
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let buf = PixelBuffer::transparent(0, 4);
        let err = fill(&buf, 0.0, 0.0, "#FF0000", 30).unwrap_err();
        assert_eq!(err, FillError::EmptyBuffer { width: 0, height: 4 });
    }

    #[test]
    fn test_source_not_mutated() {
        let buf = canvas(&[
            "..#", //
            ".#.", //
            "#..",
        ]);
        let before = buf.clone();
        let _ = fill(&buf, 0.0, 0.0, "#FF0000", 30);
        let _ = fill(&buf, 7.0, 0.0, "#FF0000", 30);
        let _ = fill(&buf, 0.0, 0.0, "bogus", 30);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_region_is_connected_and_respects_boundary() {
        let buf = canvas(&[
            "....#....", //
            ".##.#.##.", //
            ".#..#..#.", //
            ".#.###.#.", //
            "...#.#...", //
            "####.####",
        ]);
        let result = fill(&buf, 0.0, 0.0, "#FF0000", 30).unwrap();
        let reference = buf.get(0, 0).unwrap();
        let (w, h) = buf.dimensions();
        let inside = |x: u32, y: u32| result.image.get(x, y).map(|p| p[3] != 0).unwrap_or(false);

        for (x, y, _) in result.image.opaque_pixels() {
            // Every painted pixel matches the seed color in the source
            assert!(within_tolerance(buf.get(x, y).unwrap(), reference, 30));

            // Every matching neighbor of a painted pixel is painted too
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx < w && ny < h && within_tolerance(buf.get(nx, ny).unwrap(), reference, 30) {
                    assert!(inside(nx, ny), "({},{}) should be filled", nx, ny);
                }
            }
        }
        // Pocket enclosed by the centre wall is unreachable
        assert!(!inside(4, 4));
    }

    #[test]
    fn test_pixel_limit_aborts() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        let request = FillRequest::new(0.0, 0.0, "#FF0000")
            .unwrap()
            .with_limits(FillLimits { max_pixels: Some(50), timeout: None });
        let err = fill_request(&buf, &request).unwrap_err();
        assert_eq!(err, FillError::FillAborted(AbortReason::PixelLimit { limit: 50 }));
        assert_eq!(err.kind(), "fill_aborted");
    }

    #[test]
    fn test_pixel_limit_equal_to_region_succeeds() {
        let buf = PixelBuffer::filled(10, 10, WHITE);
        let request = FillRequest::new(0.0, 0.0, "#FF0000")
            .unwrap()
            .with_limits(FillLimits { max_pixels: Some(100), timeout: None });
        assert_eq!(fill_request(&buf, &request).unwrap().filled, 100);
    }

    #[test]
    fn test_zero_timeout_aborts_large_fill() {
        let buf = PixelBuffer::filled(200, 200, WHITE);
        let request = FillRequest::new(0.0, 0.0, "#FF0000")
            .unwrap()
            .with_limits(FillLimits { max_pixels: None, timeout: Some(Duration::ZERO) });
        let err = fill_request(&buf, &request).unwrap_err();
        assert!(matches!(err, FillError::FillAborted(AbortReason::Timeout { .. })));
    }

    #[test]
    fn test_large_region_does_not_overflow_stack() {
        let buf = PixelBuffer::filled(1000, 1000, WHITE);
        let result = fill(&buf, 500.0, 500.0, "#000000", 0).unwrap();
        assert_eq!(result.filled, 1_000_000);
    }

    #[test]
    fn test_fill_many_preserves_order() {
        let buf = canvas(&[
            "..#..", //
            "..#..",
        ]);
        let requests = vec![
            FillRequest::new(0.0, 0.0, "#FF0000").unwrap(),
            FillRequest::new(9.0, 0.0, "#FF0000").unwrap(),
            FillRequest::new(4.0, 1.0, "#0000FF").unwrap(),
        ];
        let results = fill_many(&buf, &requests);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().bounds.x, 0);
        assert!(matches!(results[1], Err(FillError::OutOfBounds { .. })));
        let right = results[2].as_ref().unwrap();
        assert_eq!(right.bounds, FillBounds { x: 3, y: 0, width: 2, height: 2 });
        assert_eq!(right.color, Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_spawn_fill_matches_inline() {
        let buf = canvas(&[
            "...#", //
            "...#", //
            "####",
        ]);
        let request = FillRequest::new(1.0, 1.0, "#FF0000").unwrap();
        let inline = fill_request(&buf, &request).unwrap();
        let background = spawn_fill(buf, request).wait().unwrap().unwrap();
        assert_eq!(background, inline);
    }

    #[test]
    fn test_spawn_fill_reports_errors() {
        let buf = PixelBuffer::transparent(2, 2);
        let request = FillRequest::new(5.0, 5.0, "#FF0000").unwrap();
        let result = spawn_fill(buf, request).wait().unwrap();
        assert!(matches!(result, Err(FillError::OutOfBounds { .. })));
    }

    #[test]
    fn test_pending_fill_result_taken_once() {
        let buf = PixelBuffer::filled(2, 2, WHITE);
        let mut pending = spawn_fill(buf, FillRequest::new(0.0, 0.0, "#FF0000").unwrap());
        let result = loop {
            match pending.try_result() {
                FillPoll::Running => thread::yield_now(),
                FillPoll::Ready(result) => break result,
                FillPoll::Gone => panic!("worker exited without a result"),
            }
        };
        assert_eq!(result.unwrap().filled, 4);
        assert!(matches!(pending.try_result(), FillPoll::Gone));
    }

    #[test]
    fn test_pending_fill_dead_worker_is_gone() {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || drop(sender));
        let mut pending = PendingFill { receiver, handle: Some(handle) };

        // The sender is dropped without sending, like a worker that panicked
        let mut polled = pending.try_result();
        while matches!(polled, FillPoll::Running) {
            thread::yield_now();
            polled = pending.try_result();
        }
        assert!(matches!(polled, FillPoll::Gone));
    }
}
