//! Configuration schema types for `assetpipe.toml`
//!
//! Defines the structure and validation rules for asset pipeline configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logical asset classes handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Top-level HTML pages
    Html,
    /// Plain CSS sources (minified and concatenated)
    StylesCss,
    /// SCSS sources (compiled in place)
    StylesSass,
    /// JavaScript entry point
    Js,
    /// Font files
    Fonts,
    /// Images
    Images,
}

impl AssetClass {
    /// All asset classes, in declaration order.
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Html,
        AssetClass::StylesCss,
        AssetClass::StylesSass,
        AssetClass::Js,
        AssetClass::Fonts,
        AssetClass::Images,
    ];

    /// Key used for this class in the `[paths]` table.
    pub fn key(&self) -> &'static str {
        match self {
            AssetClass::Html => "html",
            AssetClass::StylesCss => "styles_css",
            AssetClass::StylesSass => "styles_sass",
            AssetClass::Js => "js",
            AssetClass::Fonts => "fonts",
            AssetClass::Images => "images",
        }
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Source root (served by `watch`)
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Build output root
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), src: default_src(), out: default_out() }
    }
}

fn default_name() -> String {
    "site".to_string()
}

fn default_src() -> PathBuf {
    PathBuf::from("app")
}

fn default_out() -> PathBuf {
    PathBuf::from("build")
}

/// Source patterns and destination for one asset class.
///
/// Patterns are relative to the source root. `out` is relative to the output
/// root, except for [`AssetClass::StylesSass`] whose compiled CSS stays
/// inside the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    /// Glob patterns selecting source files
    pub src: Vec<String>,
    /// Output directory
    #[serde(default)]
    pub out: PathBuf,
}

impl AssetPaths {
    fn new(src: &[&str], out: &str) -> Self {
        Self { src: src.iter().map(|s| s.to_string()).collect(), out: PathBuf::from(out) }
    }
}

/// Mapping from asset class to source patterns and output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_html_paths")]
    pub html: AssetPaths,
    #[serde(default = "default_styles_css_paths")]
    pub styles_css: AssetPaths,
    #[serde(default = "default_styles_sass_paths")]
    pub styles_sass: AssetPaths,
    #[serde(default = "default_js_paths")]
    pub js: AssetPaths,
    #[serde(default = "default_fonts_paths")]
    pub fonts: AssetPaths,
    #[serde(default = "default_images_paths")]
    pub images: AssetPaths,
}

impl PathConfig {
    /// Look up the paths configured for an asset class.
    pub fn get(&self, class: AssetClass) -> &AssetPaths {
        match class {
            AssetClass::Html => &self.html,
            AssetClass::StylesCss => &self.styles_css,
            AssetClass::StylesSass => &self.styles_sass,
            AssetClass::Js => &self.js,
            AssetClass::Fonts => &self.fonts,
            AssetClass::Images => &self.images,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            html: default_html_paths(),
            styles_css: default_styles_css_paths(),
            styles_sass: default_styles_sass_paths(),
            js: default_js_paths(),
            fonts: default_fonts_paths(),
            images: default_images_paths(),
        }
    }
}

fn default_html_paths() -> AssetPaths {
    AssetPaths::new(&["*.html"], "")
}

fn default_styles_css_paths() -> AssetPaths {
    AssetPaths::new(&["styles/CSS/**/*.css"], "styles")
}

fn default_styles_sass_paths() -> AssetPaths {
    AssetPaths::new(&["styles/SASS/**/*.scss"], "styles/CSS")
}

fn default_js_paths() -> AssetPaths {
    AssetPaths::new(&["js/main.js"], "js")
}

fn default_fonts_paths() -> AssetPaths {
    AssetPaths::new(&["fonts/**/*"], "fonts")
}

fn default_images_paths() -> AssetPaths {
    AssetPaths::new(&["img/**/*"], "img")
}

/// Output style of the SCSS compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    /// Human-readable CSS
    #[default]
    Expanded,
    /// Whitespace-free CSS
    Compressed,
}

/// Style (SCSS) stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// SCSS entry point, relative to the source root
    #[serde(default = "default_style_entry")]
    pub entry: PathBuf,
    /// Append an inline source map to the compiled CSS
    #[serde(default = "default_true")]
    pub source_map: bool,
    /// Compiler output style
    #[serde(default)]
    pub output_style: OutputStyle,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            entry: default_style_entry(),
            source_map: true,
            output_style: OutputStyle::default(),
        }
    }
}

fn default_style_entry() -> PathBuf {
    PathBuf::from("styles/SASS/main.scss")
}

fn default_true() -> bool {
    true
}

/// Image optimizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Request interlaced GIF output
    #[serde(default = "default_true")]
    pub gif_interlaced: bool,
    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Request progressive JPEG output
    #[serde(default = "default_true")]
    pub jpeg_progressive: bool,
    /// PNG optimization level (0-7)
    #[serde(default = "default_png_level")]
    pub png_optimization_level: u8,
    /// Drop `viewBox` when it duplicates width/height
    #[serde(default = "default_true")]
    pub svg_remove_view_box: bool,
    /// Strip unreferenced `id` attributes
    #[serde(default)]
    pub svg_cleanup_ids: bool,
    /// Log per-file savings
    #[serde(default = "default_true")]
    pub verbose: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            gif_interlaced: true,
            jpeg_quality: default_jpeg_quality(),
            jpeg_progressive: true,
            png_optimization_level: default_png_level(),
            svg_remove_view_box: true,
            svg_cleanup_ids: false,
            verbose: true,
        }
    }
}

fn default_jpeg_quality() -> u8 {
    75
}

fn default_png_level() -> u8 {
    5
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Address the dev server binds to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the dev server binds to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Pattern whose changes recompile styles
    #[serde(default = "default_watch_styles")]
    pub styles: String,
    /// Pattern whose changes reload the browser
    #[serde(default = "default_watch_html")]
    pub html: String,
    /// Pattern whose changes reload the browser
    #[serde(default = "default_watch_js")]
    pub js: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_debounce_ms() -> u32 {
    100
}

fn default_watch_styles() -> String {
    "styles/**/*.scss".to_string()
}

fn default_watch_html() -> String {
    "*.html".to_string()
}

fn default_watch_js() -> String {
    "js/**/*.js".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            styles: default_watch_styles(),
            html: default_watch_html(),
            js: default_watch_js(),
        }
    }
}

/// Complete assetpipe.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
    /// Per-class source patterns and outputs
    #[serde(default)]
    pub paths: PathConfig,
    /// SCSS stage settings
    #[serde(default)]
    pub style: StyleConfig,
    /// Image optimizer settings
    #[serde(default)]
    pub images: ImagesConfig,
    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "paths.fonts.src")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "assetpipe.toml: '{}' {}", self.field, self.message)
    }
}

impl AssetConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for class in AssetClass::ALL {
            let paths = self.paths.get(class);
            if paths.src.is_empty() || paths.src.iter().any(|p| p.trim().is_empty()) {
                errors.push(ConfigValidationError {
                    field: format!("paths.{}.src", class.key()),
                    message: "must contain at least one non-empty glob pattern".to_string(),
                });
            }
        }

        if self.style.entry.as_os_str().is_empty() {
            errors.push(ConfigValidationError {
                field: "style.entry".to_string(),
                message: "must be a non-empty path".to_string(),
            });
        }

        if !(1..=100).contains(&self.images.jpeg_quality) {
            errors.push(ConfigValidationError {
                field: "images.jpeg_quality".to_string(),
                message: "must be between 1 and 100".to_string(),
            });
        }

        if self.images.png_optimization_level > 7 {
            errors.push(ConfigValidationError {
                field: "images.png_optimization_level".to_string(),
                message: "must be between 0 and 7".to_string(),
            });
        }

        if self.watch.port == 0 {
            errors.push(ConfigValidationError {
                field: "watch.port".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AssetConfig = toml::from_str("").unwrap();
        assert_eq!(config.project.src, PathBuf::from("app"));
        assert_eq!(config.project.out, PathBuf::from("build"));
        assert_eq!(config.paths, PathConfig::default());
        assert_eq!(config.style.entry, PathBuf::from("styles/SASS/main.scss"));
        assert!(config.style.source_map);
        assert_eq!(config.watch.port, 3000);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_paths_match_layout() {
        let paths = PathConfig::default();
        assert_eq!(paths.get(AssetClass::Html).src, vec!["*.html"]);
        assert_eq!(paths.get(AssetClass::Html).out, PathBuf::from(""));
        assert_eq!(paths.get(AssetClass::StylesCss).out, PathBuf::from("styles"));
        assert_eq!(paths.get(AssetClass::Js).src, vec!["js/main.js"]);
        assert_eq!(paths.get(AssetClass::Fonts).src, vec!["fonts/**/*"]);
        assert_eq!(paths.get(AssetClass::Images).out, PathBuf::from("img"));
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[project]
name = "landing"
src = "site"
out = "dist"

[paths.fonts]
src = ["fonts/**/*.woff2", "vendor/fonts/*.ttf"]
out = "assets/fonts"

[style]
entry = "scss/app.scss"
source_map = false
output_style = "compressed"

[images]
jpeg_quality = 60
png_optimization_level = 2
svg_cleanup_ids = true

[watch]
port = 8080
debounce_ms = 250
html = "**/*.html"
"#;
        let config: AssetConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.project.name, "landing");
        assert_eq!(config.project.src, PathBuf::from("site"));
        assert_eq!(config.paths.fonts.src.len(), 2);
        assert_eq!(config.paths.fonts.out, PathBuf::from("assets/fonts"));
        // Untouched classes keep their defaults
        assert_eq!(config.paths.js.src, vec!["js/main.js"]);
        assert_eq!(config.style.output_style, OutputStyle::Compressed);
        assert!(!config.style.source_map);
        assert_eq!(config.images.jpeg_quality, 60);
        assert!(config.images.svg_remove_view_box);
        assert!(config.images.svg_cleanup_ids);
        assert_eq!(config.watch.port, 8080);
        assert_eq!(config.watch.html, "**/*.html");
        assert_eq!(config.watch.styles, "styles/**/*.scss");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = AssetConfig::default();
        config.paths.images.src.clear();
        config.images.jpeg_quality = 0;
        config.images.png_optimization_level = 9;
        config.watch.port = 0;

        let errors = config.validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "paths.images.src",
                "images.jpeg_quality",
                "images.png_optimization_level",
                "watch.port"
            ]
        );
    }

    #[test]
    fn test_validation_error_display() {
        let error = ConfigValidationError {
            field: "watch.port".to_string(),
            message: "must be a positive integer".to_string(),
        };
        assert_eq!(error.to_string(), "assetpipe.toml: 'watch.port' must be a positive integer");
    }

    #[test]
    fn test_asset_class_keys() {
        let keys: Vec<String> = AssetClass::ALL.iter().map(|c| c.to_string()).collect();
        assert_eq!(keys, vec!["html", "styles_css", "styles_sass", "js", "fonts", "images"]);
    }
}
