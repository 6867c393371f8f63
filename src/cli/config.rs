//! CLI dispatch for the `bfill config` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{find_config, load_config};

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Print the effective configuration as TOML.
pub fn run_config(config_arg: Option<&Path>) -> ExitCode {
    let config_path: Option<PathBuf> = config_arg.map(Path::to_path_buf).or_else(find_config);

    let config = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    match &config_path {
        Some(p) => eprintln!("# Loaded from {}", p.display()),
        None => eprintln!("# No bfill.toml found, using defaults"),
    }

    match toml::to_string_pretty(&config) {
        Ok(s) => {
            print!("{}", s);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
