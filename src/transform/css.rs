//! CSS minification with lightningcss.

use super::CssMinifier;
use lightningcss::error::ParserError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use std::sync::{Arc, RwLock};

/// CSS minifier backed by `lightningcss`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightningCss;

impl CssMinifier for LightningCss {
    fn minify(&self, source: &str, filename: &str) -> Result<String, String> {
        let mut sheet = parse_stylesheet(source, filename)?;

        sheet.minify(MinifyOptions::default()).map_err(|e| e.to_string())?;

        let printed = sheet
            .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
            .map_err(|e| e.to_string())?;

        Ok(printed.code)
    }
}

/// Parse a stylesheet, skipping declarations lightningcss does not understand.
///
/// Legacy hacks such as `*zoom: 1` are dropped with a warning. A rule whose
/// selector does not parse would be lost entirely, so that is an error.
pub(crate) fn parse_stylesheet<'i>(
    source: &'i str,
    filename: &str,
) -> Result<StyleSheet<'i>, String> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let sheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            error_recovery: true,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    let recovered = warnings.read().map_err(|e| e.to_string())?;
    for warning in recovered.iter() {
        if matches!(warning.kind, ParserError::SelectorError(_)) {
            return Err(warning.to_string());
        }
        tracing::warn!("{}: skipped invalid CSS: {}", filename, warning);
    }
    drop(recovered);

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_strips_whitespace_and_comments() {
        let source = "/* header */\nbody {\n    color: #ff0000;\n    margin: 0px;\n}\n";
        let minified = LightningCss.minify(source, "a.css").unwrap();
        assert!(!minified.contains("header"));
        assert!(!minified.contains('\n'));
        assert!(minified.starts_with("body{"));
        assert!(minified.len() < source.len());
    }

    #[test]
    fn test_minify_is_deterministic() {
        let source = ".a { padding: 1px 1px 1px 1px } .b { color: blue }";
        let first = LightningCss.minify(source, "a.css").unwrap();
        let second = LightningCss.minify(source, "a.css").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_minify_skips_legacy_hacks() {
        let source = ".clearfix {\n  *zoom: 1;\n  background: red;\n}\n.b { color: blue }\n";
        let minified = LightningCss.minify(source, "legacy.css").unwrap();
        assert!(minified.contains(".clearfix{background:red}"));
        assert!(minified.contains(".b{color:"));
        assert!(!minified.contains("zoom"));
    }

    #[test]
    fn test_minify_only_hack_keeps_rule_empty() {
        let minified = LightningCss.minify(".clearfix { *zoom: 1; }", "x.css");
        assert!(minified.is_ok());
    }

    #[test]
    fn test_minify_reports_selector_errors() {
        let result = LightningCss.minify("h1(>h1) { color: red; }", "broken.css");
        let message = result.unwrap_err();
        assert!(message.contains("broken.css"));
    }
}
