//! Assetpipe - command-line front-end asset builder and dev server

use std::process::ExitCode;

use assetpipe::cli;

fn main() -> ExitCode {
    cli::run()
}
