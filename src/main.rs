//! Bucketfill - command-line flood fill for canvas snapshots

use std::process::ExitCode;

use bucketfill::cli;

fn main() -> ExitCode {
    cli::run()
}
