//! JavaScript minification with `minify-js`.

use super::JsMinifier;
use minify_js::{minify, Session, TopLevelMode};

/// JS minifier backed by the `minify-js` parser and printer.
///
/// Sources are treated as classic scripts: top-level names stay as they
/// are, since other scripts on the page may refer to them.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinifyJs;

impl JsMinifier for MinifyJs {
    fn minify(&self, source: &str) -> Result<String, String> {
        let session = Session::new();
        let mut out = Vec::new();
        minify(&session, TopLevelMode::Global, source.as_bytes(), &mut out)
            .map_err(|e| format!("syntax error: {:?}", e))?;
        String::from_utf8(out).map_err(|e| e.to_string())
    }
}
