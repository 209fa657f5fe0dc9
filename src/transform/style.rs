//! SCSS compilation with grass, plus inline source maps.

use super::StyleCompiler;
use crate::config::OutputStyle;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use super::css::parse_stylesheet;
use lightningcss::stylesheet::PrinterOptions;
use parcel_sourcemap::SourceMap;
use std::path::Path;

/// SCSS compiler backed by `grass`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn compile(&self, entry: &Path, style: OutputStyle) -> Result<String, String> {
        let output_style = match style {
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let options = grass::Options::default().style(output_style);
        grass::from_path(entry, &options).map_err(|e| e.to_string())
    }
}

/// Re-print compiled CSS with an inline base64 source map appended.
///
/// The map's single source is named after `source_name` and embeds the
/// compiled CSS as its content.
pub fn inline_source_map(css: &str, source_name: &str, minify: bool) -> Result<String, String> {
    let sheet = parse_stylesheet(css, source_name)?;

    let mut map = SourceMap::new("/");
    map.add_source(source_name);
    map.set_source_content(0, css).map_err(|e| e.to_string())?;

    let printed = sheet
        .to_css(PrinterOptions { minify, source_map: Some(&mut map), ..PrinterOptions::default() })
        .map_err(|e| e.to_string())?;

    let json = map.to_json(None).map_err(|e| e.to_string())?;
    let mut code = printed.code;
    if !code.ends_with('\n') {
        code.push('\n');
    }
    code.push_str(&format!(
        "/*# sourceMappingURL=data:application/json;base64,{} */\n",
        STANDARD.encode(json)
    ));
    Ok(code)
}
