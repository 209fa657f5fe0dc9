//! Lossless SVG cleanup.
//!
//! The document is parsed with `roxmltree` and re-emitted from the source
//! text with spans cut out: the prolog, comments, processing instructions,
//! `<metadata>` and whitespace-only text between tags. Whitespace inside
//! text content, styles and scripts is kept. Optionally drops a redundant
//! root `viewBox` and unreferenced `id` attributes.

use roxmltree::{Document, Node, ParsingOptions};
use std::ops::Range;

/// Cleanup switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgOptions {
    /// Remove the root `viewBox` when it equals `0 0 width height`
    pub remove_view_box: bool,
    /// Remove `id` attributes nothing references
    pub cleanup_ids: bool,
}

/// Elements whose whitespace-only text is content.
const SPACE_SENSITIVE: &[&str] = &["text", "tspan", "textPath", "style", "script", "title", "desc"];

/// Clean an SVG document.
pub fn clean_svg(source: &str, options: &SvgOptions) -> Result<String, String> {
    let parse_options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
    let doc = Document::parse_with_options(source, parse_options).map_err(|e| e.to_string())?;
    let root = doc.root_element();

    let mut cuts = Vec::new();
    collect_cuts(root, false, &mut cuts);

    if options.remove_view_box {
        if let Some(span) = redundant_view_box(source, root) {
            cuts.push(span);
        }
    }
    if options.cleanup_ids {
        for node in root.descendants().filter(Node::is_element) {
            let Some(id) = node.attribute("id") else { continue };
            if source.contains(&format!("#{}", id)) {
                continue;
            }
            if let Some(span) = attribute_span(source, node, "id", id) {
                cuts.push(span);
            }
        }
    }
    cuts.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(source.len());

    // Entity declarations in an internal subset are still needed by the body
    let prolog = &source[..root.range().start];
    if prolog.contains("<!ENTITY") {
        out.push_str(prolog.trim());
    }

    let mut pos = root.range().start;
    for cut in cuts {
        if cut.start >= pos {
            out.push_str(&source[pos..cut.start]);
            pos = cut.end;
        }
    }
    out.push_str(&source[pos..root.range().end]);

    Ok(out)
}

fn collect_cuts(node: Node, keep_space: bool, cuts: &mut Vec<Range<usize>>) {
    for child in node.children() {
        if child.is_comment() || child.is_pi() {
            cuts.push(child.range());
        } else if child.is_text() {
            let blank = child.text().map_or(true, |t| t.trim().is_empty());
            if blank && !keep_space {
                cuts.push(child.range());
            }
        } else if child.is_element() {
            let name = child.tag_name().name();
            if name == "metadata" {
                cuts.push(child.range());
            } else {
                collect_cuts(child, keep_space || SPACE_SENSITIVE.contains(&name), cuts);
            }
        }
    }
}

/// Span of ` name="value"` (leading whitespace included) in `node`'s start tag.
fn attribute_span(source: &str, node: Node, name: &str, value: &str) -> Option<Range<usize>> {
    let start = node.range().start;
    let tag = &source[start..start + source[start..].find('>')?];

    for quote in ['"', '\''] {
        let needle = format!("{}={}{}{}", name, quote, value, quote);
        for (pos, _) in tag.match_indices(&needle) {
            let before = &tag[..pos];
            if before.ends_with(char::is_whitespace) {
                return Some(start + before.trim_end().len()..start + pos + needle.len());
            }
        }
    }
    None
}

fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").parse().ok()
}

fn redundant_view_box(source: &str, root: Node) -> Option<Range<usize>> {
    let width = parse_length(root.attribute("width")?)?;
    let height = parse_length(root.attribute("height")?)?;
    let view_box = root.attribute("viewBox")?;

    let parts: Vec<f64> = view_box
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .filter_map(|p| p.parse().ok())
        .collect();

    match parts.as_slice() {
        [x, y, w, h] if *x == 0.0 && *y == 0.0 && *w == width && *h == height => {
            attribute_span(source, root, "viewBox", view_box)
        }
        _ => None,
    }
}
