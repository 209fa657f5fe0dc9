//! Watch mode: dev server with live reload.
//!
//! Serves the source tree over HTTP, recompiles styles when SCSS changes and
//! reloads connected browsers when pages, scripts or compiled styles change.
//!
//! Everything except the style compiler runs on one current-thread tokio
//! runtime. Style runs go to the blocking pool behind a [`SingleFlight`]
//! guard so a burst of saves produces at most one extra compile.

mod flight;
mod reload;
mod router;
mod server;

pub use flight::SingleFlight;
pub use reload::{inject_reload_script, ReloadNotifier, Reloader, RELOAD_PATH, RELOAD_SCRIPT};
pub use router::{WatchAction, WatchRouter};
pub use server::routes;

use crate::build::{BuildContext, LogObserver, Observers, Stage, StageRunner};
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Error during watch mode.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Source directory not found
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// A watch glob does not parse
    #[error("Invalid watch pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch path: {0}")]
    WatchPath(#[source] notify::Error),
    /// Invalid `host:port`
    #[error("Invalid server address '{0}'")]
    Address(String),
    /// Failed to bind the HTTP server
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: warp::Error,
    },
    /// Failed to start the async runtime
    #[error("Failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    Channel(String),
}

/// The reactive half of watch mode: routes changes to stages and reloads.
///
/// Usable without the HTTP server or file watcher; feed it changed paths
/// with [`WatchSession::handle_changes`].
#[derive(Debug, Clone)]
pub struct WatchSession {
    runner: Arc<StageRunner>,
    router: Arc<WatchRouter>,
    style_flight: Arc<SingleFlight>,
    reloader: Reloader,
}

impl WatchSession {
    /// Create a session over `runner`.
    ///
    /// The runner's observer is replaced by one that logs stage events and
    /// reloads browsers through `reloader`; `extra` is notified as well.
    pub fn new(runner: StageRunner, reloader: Reloader, extra: Observers) -> Result<Self, WatchError> {
        let context = runner.context();
        let config = context.config();
        let router =
            WatchRouter::new(&context.src_dir(), &config.watch, &config.paths.styles_sass.src)?;

        let observers = extra
            .with(Arc::new(LogObserver))
            .with(Arc::new(ReloadNotifier::new(reloader.clone())));
        let runner = runner.with_observer(Arc::new(observers));

        Ok(Self {
            runner: Arc::new(runner),
            router: Arc::new(router),
            style_flight: Arc::new(SingleFlight::new()),
            reloader,
        })
    }

    /// The reload broadcaster.
    pub fn reloader(&self) -> &Reloader {
        &self.reloader
    }

    /// The style stage's single-flight guard.
    pub fn style_flight(&self) -> &SingleFlight {
        &self.style_flight
    }

    /// Route a batch of changed paths and act on them.
    ///
    /// Must be called from within a tokio runtime. Returns the handle of
    /// the style run it started, if any.
    pub fn handle_changes<'a, I>(&self, paths: I) -> Option<JoinHandle<()>>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut handle = None;
        for action in self.router.route_all(paths) {
            match action {
                WatchAction::RecompileStyles => handle = self.trigger_style(),
                WatchAction::Reload => {
                    self.reloader.reload();
                }
            }
        }
        handle
    }

    /// Run the style stage on the blocking pool unless a run is in flight.
    ///
    /// A trigger during a run queues exactly one follow-up run. Compile
    /// errors are logged by the session's observer and otherwise ignored.
    pub fn trigger_style(&self) -> Option<JoinHandle<()>> {
        if !self.style_flight.begin() {
            tracing::debug!("style run in flight, queued one more");
            return None;
        }

        let runner = Arc::clone(&self.runner);
        let flight = Arc::clone(&self.style_flight);
        Some(tokio::task::spawn_blocking(move || loop {
            if let Err(e) = runner.run(Stage::Style) {
                tracing::debug!("style run failed: {}", e);
            }
            if !flight.finish() {
                break;
            }
        }))
    }
}

fn server_addr(host: &str, port: u16) -> Result<SocketAddr, WatchError> {
    let addr = if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    };
    addr.parse().map_err(|_| WatchError::Address(addr))
}

/// Serve the source tree and react to changes until Ctrl+C.
///
/// This function blocks on a current-thread runtime it creates.
pub fn watch(context: BuildContext) -> Result<(), WatchError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WatchError::Runtime)?;

    runtime.block_on(serve(context))
}

async fn serve(context: BuildContext) -> Result<(), WatchError> {
    let src_dir = context.src_dir();
    if !src_dir.is_dir() {
        return Err(WatchError::SourceNotFound(src_dir));
    }

    let config = context.config().watch.clone();
    let reloader = Reloader::default();
    let session = WatchSession::new(StageRunner::new(context), reloader.clone(), Observers::new())?;

    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();
    let debounce = Duration::from_millis(u64::from(config.debounce_ms));
    let mut debouncer = new_debouncer(debounce, move |result: DebounceEventResult| {
        let _ = tx.send(result);
    })
    .map_err(WatchError::WatcherInit)?;
    debouncer
        .watcher()
        .watch(&src_dir, RecursiveMode::Recursive)
        .map_err(WatchError::WatchPath)?;

    let addr = server_addr(&config.host, config.port)?;
    let (bound, server) = warp::serve(routes(src_dir.clone(), reloader))
        .try_bind_ephemeral(addr)
        .map_err(|source| WatchError::Bind { addr: addr.to_string(), source })?;
    tokio::spawn(server);

    tracing::info!("Serving {} at http://{}", src_dir.display(), bound);
    session.trigger_style();
    tracing::info!("Watching {} for changes...", src_dir.display());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(Ok(events)) => {
                    let changed: Vec<&Path> = events
                        .iter()
                        .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                        .map(|e| e.path.as_path())
                        .collect();
                    for path in &changed {
                        tracing::debug!("Changed: {}", path.display());
                    }
                    session.handle_changes(changed);
                }
                Some(Err(error)) => {
                    tracing::warn!("Watch error: {:?}", error);
                }
                None => return Err(WatchError::Channel("watcher stopped".to_string())),
            },
            _ = &mut shutdown => {
                tracing::info!("Stopping watch mode");
                break;
            }
        }
    }

    drop(debouncer);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr() {
        assert_eq!(server_addr("127.0.0.1", 3000).unwrap().port(), 3000);
        assert!(server_addr("::1", 8080).unwrap().is_ipv6());
        assert!(matches!(server_addr("not a host", 1), Err(WatchError::Address(_))));
    }

    #[test]
    fn test_watch_missing_source_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let context = BuildContext::new(crate::config::default_config(), temp.path().to_path_buf());
        assert!(matches!(watch(context), Err(WatchError::SourceNotFound(_))));
    }
}
