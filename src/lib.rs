//! Assetpipe - front-end asset build pipeline
//!
//! This library provides functionality to:
//! - Compile SCSS, minify CSS and JS, copy HTML and fonts, optimize images
//! - Run those stages as a sequential build over a configurable source tree
//! - Serve the source tree with live reload while recompiling styles on change

pub mod build;
pub mod cli;
pub mod config;
pub mod logging;
pub mod transform;
pub mod watch;
