//! Structured logging setup.
//!
//! Installs a `tracing` subscriber writing to stderr. `RUST_LOG` takes
//! precedence over the level passed in; the HTTP stack is kept at `warn`
//! unless `RUST_LOG` says otherwise.

use std::env;
use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Parse a level name such as `info` or `DEBUG`.
pub fn parse_level(name: &str) -> Option<Level> {
    Level::from_str(name.trim()).ok()
}

/// Level from the command-line flags: explicit `--log-level` wins, then
/// `--verbose` (debug), else info.
pub fn level_from_flags(log_level: Option<&str>, verbose: bool) -> Level {
    match log_level.and_then(parse_level) {
        Some(level) => level,
        None if verbose => Level::DEBUG,
        None => Level::INFO,
    }
}

fn directive(s: &str) -> Option<tracing_subscriber::filter::Directive> {
    s.parse().ok()
}

/// Initialize logging once; later calls are ignored.
pub fn init(level: Level) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            let lowercase = level.to_string().to_lowercase();
            for d in [
                format!("assetpipe={}", lowercase),
                "warp=warn".to_string(),
                "hyper=warn".to_string(),
            ] {
                if let Some(d) = directive(&d) {
                    filter = filter.add_directive(d);
                }
            }
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init();
    });
}
