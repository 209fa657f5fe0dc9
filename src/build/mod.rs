//! Build stages and the sequential build pipeline.
//!
//! # Overview
//!
//! The build consists of:
//! - **Discovery**: find source files using the glob patterns from config
//! - **Stages**: one select → transform → write operation per asset class
//! - **Pipeline**: run the build stages in a fixed order, halting on failure
//!
//! # Example
//!
//! ```ignore
//! use assetpipe::build::{BuildContext, Pipeline};
//! use assetpipe::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root);
//! let result = Pipeline::from_context(context).run()?;
//! println!("{}", result.summary());
//! ```

pub mod context;
pub mod discovery;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod result;
pub mod stage;
pub mod stages;

pub use context::*;
pub use discovery::*;
pub use error::*;
pub use events::*;
pub use pipeline::*;
pub use result::*;
pub use stage::*;
pub use stages::*;
