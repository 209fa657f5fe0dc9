//! Live reload: broadcast channel, stage observer and client script.

use crate::build::{StageEvent, StageObserver};
use tokio::sync::broadcast;

/// Path of the Server-Sent Events endpoint the client script listens on.
pub const RELOAD_PATH: &str = "/__assetpipe/reload";

/// Client injected into served HTML pages.
pub const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var source = new EventSource("/__assetpipe/reload");
  source.addEventListener("reload", function () { window.location.reload(); });
})();
</script>"#;

/// Sender side of the reload broadcast.
#[derive(Debug, Clone)]
pub struct Reloader {
    tx: broadcast::Sender<()>,
}

impl Default for Reloader {
    fn default() -> Self {
        Self::new(16)
    }
}

impl Reloader {
    /// Create a reloader buffering up to `capacity` pending reloads per client.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Tell every connected client to reload. Returns the number of clients.
    pub fn reload(&self) -> usize {
        let clients = self.tx.send(()).unwrap_or(0);
        tracing::info!("Reloading {} client(s)", clients);
        clients
    }

    /// Subscribe a new client.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Stage observer that reloads browsers when an output-producing stage completes.
#[derive(Debug, Clone)]
pub struct ReloadNotifier {
    reloader: Reloader,
}

impl ReloadNotifier {
    pub fn new(reloader: Reloader) -> Self {
        Self { reloader }
    }
}

impl StageObserver for ReloadNotifier {
    fn on_event(&self, event: &StageEvent) {
        if let StageEvent::Completed { stage, .. } = event {
            if stage.triggers_reload() {
                self.reloader.reload();
            }
        }
    }
}

/// Insert [`RELOAD_SCRIPT`] before the last `</body>`, or append it.
pub fn inject_reload_script(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(idx) => format!("{}{}\n{}", &html[..idx], RELOAD_SCRIPT, &html[idx..]),
        None => format!("{}\n{}", html, RELOAD_SCRIPT),
    }
}
