//! CLI dispatch for the `bfill fill` command.
//!
//! Loads the snapshot and configuration, runs one fill per seed, and writes
//! each result as a PNG layer, a data URI, or a drawing entry.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::buffer::PixelBuffer;
use crate::canvas::Drawing;
use crate::color::parse_color;
use crate::config::{find_config, load_config, merge_cli_overrides, resolve_path, CliOverrides};
use crate::fill::{fill_many, fill_request, FillError, FillRequest, FillResult};
use crate::output::{fill_output_path, save_png, to_data_url};
use crate::telemetry::{ErrorCollector, ErrorEntry};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

const COMMAND: &str = "fill";

/// Parse a `X,Y` seed argument. Fractional values are allowed.
pub(crate) fn parse_seed(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x coordinate '{}'", x.trim()))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y coordinate '{}'", y.trim()))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("coordinates must be finite, got '{}'", s));
    }
    Ok((x, y))
}

/// Execute the fill command.
pub fn run_fill(
    input: &Path,
    seeds: &[String],
    color: &str,
    tolerance: Option<u8>,
    opacity: Option<f32>,
    max_pixels: Option<u64>,
    timeout_ms: Option<u64>,
    output: Option<&Path>,
    drawing_path: Option<&Path>,
    data_url: bool,
    collect_errors: bool,
    config_arg: Option<&Path>,
) -> ExitCode {
    // Configuration: file, then CLI overrides
    let config_path: Option<PathBuf> = config_arg.map(Path::to_path_buf).or_else(find_config);
    let mut config = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let overrides = CliOverrides {
        tolerance,
        opacity,
        max_pixels,
        timeout_ms,
        collect_errors: collect_errors.then_some(true),
    };
    if let Err(e) = merge_cli_overrides(&mut config, &overrides) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let collector = ErrorCollector::new(
        resolve_path(config_path.as_deref(), &config.telemetry.error_log),
        config.telemetry.collect_errors,
    );
    let input_display = input.display().to_string();

    let mut points = Vec::with_capacity(seeds.len());
    for seed in seeds {
        match parse_seed(seed) {
            Ok(p) => points.push(p),
            Err(msg) => {
                eprintln!("Error: --at {}", msg);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let fill_color = match parse_color(color) {
        Ok(c) => c,
        Err(e) => {
            let err = FillError::from(e);
            report_fill_error(&collector, &input_display, &err);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let snapshot = match PixelBuffer::open(input) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", input_display, e);
            let entry = ErrorEntry::new(COMMAND, "io_error", e.to_string());
            log_entry(&collector, entry.with_file(&input_display));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let limits = config.fill.limits();
    let requests: Vec<FillRequest> = points
        .iter()
        .map(|&(x, y)| {
            FillRequest::with_color(x, y, fill_color)
                .with_tolerance(config.fill.tolerance)
                .with_limits(limits)
        })
        .collect();

    let results = if requests.len() == 1 {
        vec![fill_request(&snapshot, &requests[0])]
    } else {
        fill_many(&snapshot, &requests)
    };

    let mut drawing = match drawing_path {
        Some(path) => match Drawing::load(path) {
            Ok(d) => Some(d),
            Err(e) => {
                eprintln!("Error: cannot load drawing '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
        None => None,
    };

    let multiple = results.len() > 1;
    let mut failed = false;
    for (i, result) in results.into_iter().enumerate() {
        let result = match result {
            Ok(r) => r,
            Err(e) => {
                report_fill_error(&collector, &input_display, &e);
                failed = true;
                continue;
            }
        };

        eprintln!(
            "Filled {} pixels from ({}, {}) with {}",
            result.filled, result.seed.0, result.seed.1, result.color
        );

        let index = multiple.then_some(i);
        if let Err(msg) = emit_layer(&result, input, output, index, data_url) {
            eprintln!("Error: {}", msg);
            let entry = ErrorEntry::new(COMMAND, "output_error", msg);
            log_entry(&collector, entry.with_file(&input_display));
            failed = true;
            continue;
        }

        if let Some(ref mut d) = drawing {
            if let Err(e) = d.push_fill(&result, config.layer.opacity) {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    if let (Some(path), Some(d)) = (drawing_path, drawing.as_ref()) {
        match d.save(path) {
            Ok(()) => eprintln!("Wrote: {} ({} items)", path.display(), d.len()),
            Err(e) => {
                eprintln!("Error: cannot write drawing '{}': {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Write one fill result either to stdout as a data URI or to a PNG file.
fn emit_layer(
    result: &FillResult,
    input: &Path,
    output: Option<&Path>,
    index: Option<usize>,
    data_url: bool,
) -> Result<(), String> {
    if data_url {
        let url = to_data_url(&result.image).map_err(|e| e.to_string())?;
        println!("{}", url);
        return Ok(());
    }

    let target = fill_output_path(input, output, index);
    save_png(&result.image, &target)
        .map_err(|e| format!("cannot write '{}': {}", target.display(), e))?;
    eprintln!("Wrote: {}", target.display());
    Ok(())
}

fn report_fill_error(collector: &ErrorCollector, file: &str, err: &FillError) {
    eprintln!("Error: {}", err);
    if let Some(hint) = err.suggestion() {
        eprintln!("Hint: {}", hint);
    }
    log_entry(collector, ErrorEntry::from_fill_error(COMMAND, err).with_file(file));
}

fn log_entry(collector: &ErrorCollector, entry: ErrorEntry) {
    if let Err(e) = collector.log(&entry) {
        eprintln!("Warning: cannot write error log '{}': {}", collector.path().display(), e);
    }
}
