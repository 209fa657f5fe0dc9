//! Watch command implementation

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::build::BuildContext;

/// Run the dev server until interrupted.
pub fn run_watch(context: BuildContext) -> ExitCode {
    let watch = &context.config().watch;
    println!("Starting watch mode on http://{}:{}", watch.host, watch.port);
    println!("Press Ctrl+C to stop");
    println!();

    match crate::watch::watch(context) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Watch error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
