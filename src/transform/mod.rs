//! Adapters around the external transformations used by the stages.
//!
//! Each transformation sits behind a small trait so stages only depend on
//! its contract. [`Transforms::default`] wires the bundled implementations:
//!
//! - SCSS: `grass`, with an optional inline source map printed by `lightningcss`
//! - CSS: `lightningcss`
//! - JS: `minify-js`
//! - Images: `image` codecs for gif/jpeg/png and a `roxmltree`-based SVG cleaner

mod css;
mod raster;
mod js;
mod style;
pub mod svg;

pub use self::css::LightningCss;
pub use self::raster::ImageCodecs;
pub use self::js::MinifyJs;
pub use self::style::{inline_source_map, GrassCompiler};

use crate::config::{ImagesConfig, OutputStyle};
use std::path::Path;
use std::sync::Arc;

/// Compiles an SCSS entry point to CSS.
pub trait StyleCompiler: Send + Sync {
    /// Compile `entry`, resolving imports relative to it.
    fn compile(&self, entry: &Path, style: OutputStyle) -> Result<String, String>;
}

/// Minifies a CSS document.
pub trait CssMinifier: Send + Sync {
    /// Minify `source`; `filename` is only used in error messages.
    fn minify(&self, source: &str, filename: &str) -> Result<String, String>;
}

/// Minifies a JavaScript source.
pub trait JsMinifier: Send + Sync {
    /// Minify `source`.
    fn minify(&self, source: &str) -> Result<String, String>;
}

/// Compresses an image.
pub trait ImageOptimizer: Send + Sync {
    /// Optimize `bytes` read from `path`.
    ///
    /// Returns `Ok(None)` for formats the optimizer does not handle; the
    /// caller copies those unchanged.
    fn optimize(&self, path: &Path, bytes: &[u8]) -> Result<Option<Vec<u8>>, String>;
}

/// The set of transformations a stage runner uses.
#[derive(Clone)]
pub struct Transforms {
    pub style: Arc<dyn StyleCompiler>,
    pub css: Arc<dyn CssMinifier>,
    pub js: Arc<dyn JsMinifier>,
    pub images: Arc<dyn ImageOptimizer>,
}

impl Transforms {
    /// Bundled implementations, with image settings from configuration.
    pub fn new(images: &ImagesConfig) -> Self {
        Self {
            style: Arc::new(GrassCompiler),
            css: Arc::new(LightningCss),
            js: Arc::new(MinifyJs),
            images: Arc::new(ImageCodecs::new(images.clone())),
        }
    }

    /// Replace the style compiler.
    pub fn with_style(mut self, style: Arc<dyn StyleCompiler>) -> Self {
        self.style = style;
        self
    }

    /// Replace the CSS minifier.
    pub fn with_css(mut self, css: Arc<dyn CssMinifier>) -> Self {
        self.css = css;
        self
    }

    /// Replace the JS minifier.
    pub fn with_js(mut self, js: Arc<dyn JsMinifier>) -> Self {
        self.js = js;
        self
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::new(&ImagesConfig::default())
    }
}

impl std::fmt::Debug for Transforms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transforms").finish_non_exhaustive()
    }
}
