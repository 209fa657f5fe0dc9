//! Development HTTP server.
//!
//! Serves the source tree as-is, injects the live-reload client into HTML
//! pages and streams reload events over SSE.

use super::reload::{inject_reload_script, Reloader};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use warp::filters::path::FullPath;
use warp::sse::Event;
use warp::{Filter, Rejection, Reply};

/// All dev-server routes for `root`.
pub fn routes(
    root: PathBuf,
    reloader: Reloader,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    reload_events(reloader).or(html_pages(root.clone())).or(warp::fs::dir(root))
}

/// `GET /__assetpipe/reload`: one `reload` event per broadcast.
fn reload_events(
    reloader: Reloader,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("__assetpipe" / "reload")
        .and(warp::get())
        .and(warp::any().map(move || reloader.clone()))
        .map(|reloader: Reloader| {
            let receiver = reloader.subscribe();
            tracing::debug!("live-reload client connected ({} total)", reloader.client_count());
            let events = BroadcastStream::new(receiver)
                .map(|_| Ok::<Event, Infallible>(Event::default().event("reload").data("reload")));
            warp::sse::reply(warp::sse::keep_alive().stream(events))
        })
}

/// HTML pages from `root` with the reload client injected.
fn html_pages(root: PathBuf) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let root = Arc::new(root);
    warp::get()
        .and(warp::path::full())
        .and(warp::any().map(move || root.clone()))
        .and_then(serve_html)
}

async fn serve_html(path: FullPath, root: Arc<PathBuf>) -> Result<warp::reply::Html<String>, Rejection> {
    let relative = percent_decode_str(path.as_str().trim_start_matches('/'))
        .decode_utf8()
        .map_err(|_| warp::reject::not_found())?;
    let relative: &str = &relative;
    if relative.split('/').any(|segment| segment == ".." || segment.contains('\\')) {
        return Err(warp::reject::not_found());
    }

    let mut file = root.join(relative);
    if relative.is_empty() || relative.ends_with('/') {
        file = file.join("index.html");
    }

    let is_html = file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);
    if !is_html {
        return Err(warp::reject::not_found());
    }

    match tokio::fs::read_to_string(&file).await {
        Ok(body) => Ok(warp::reply::html(inject_reload_script(&body))),
        Err(_) => Err(warp::reject::not_found()),
    }
}
