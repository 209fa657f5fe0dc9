//! Source file discovery for the build stages.
//!
//! Expands the glob patterns of a [`PathConfig`](crate::config::PathConfig)
//! entry against the source root.

use crate::build::StageError;
use glob::{glob_with, MatchOptions, Pattern};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A matched source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path relative to the glob base of the pattern that matched it
    pub relative: PathBuf,
}

/// Leading directories of a pattern that contain no wildcard.
///
/// A pattern without any wildcard names a single file, so its base is the
/// parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let is_magic = |s: &str| s.contains(&['*', '?', '[', '{'][..]);
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty() && *c != ".").collect();

    match components.iter().position(|c| is_magic(c)) {
        Some(idx) => components[..idx].iter().collect(),
        None => {
            let mut base: PathBuf = components.iter().collect();
            base.pop();
            base
        }
    }
}

/// Discover files matching `pattern` below `base_dir`.
///
/// Directories are skipped and the result is sorted. A pattern that matches
/// nothing yields an empty list.
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, StageError> {
    let full_pattern =
        format!("{}/{}", Pattern::escape(&base_dir.to_string_lossy()), pattern.trim_start_matches("./"));

    let options = MatchOptions { require_literal_leading_dot: true, ..MatchOptions::new() };
    let paths = glob_with(&full_pattern, options).map_err(|e| StageError::InvalidPattern {
        pattern: pattern.to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("error reading path: {}", e);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Discover all sources for a set of patterns, de-duplicated and in pattern order.
pub fn discover_sources(src_root: &Path, patterns: &[String]) -> Result<Vec<SourceFile>, StageError> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for pattern in patterns {
        let base = src_root.join(glob_base(pattern));
        for path in discover_files(src_root, pattern)? {
            if !seen.insert(path.clone()) {
                continue;
            }
            let relative = path
                .strip_prefix(&base)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());
            sources.push(SourceFile { path, relative });
        }
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("*.html"), PathBuf::new());
        assert_eq!(glob_base("./fonts/**/*"), PathBuf::from("fonts"));
        assert_eq!(glob_base("styles/CSS/**/*.css"), PathBuf::from("styles/CSS"));
        assert_eq!(glob_base("js/main.js"), PathBuf::from("js"));
        assert_eq!(glob_base("img/{a,b}/*.png"), PathBuf::from("img"));
    }

    #[test]
    fn test_discover_files_sorted_and_files_only() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "fonts/b.woff");
        touch(temp.path(), "fonts/a.woff");
        touch(temp.path(), "fonts/nested/c.ttf");

        let files = discover_files(temp.path(), "fonts/**/*").unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf()).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("fonts/a.woff"),
                PathBuf::from("fonts/b.woff"),
                PathBuf::from("fonts/nested/c.ttf"),
            ]
        );
    }

    #[test]
    fn test_discover_files_no_match_is_empty() {
        let temp = TempDir::new().unwrap();
        let files = discover_files(temp.path(), "fonts/**/*").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_discover_files_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let result = discover_files(temp.path(), "img/[*.png");
        assert!(matches!(result, Err(StageError::InvalidPattern { .. })));
    }

    #[test]
    fn test_discover_sources_relative_to_base() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "fonts/nested/c.ttf");
        touch(temp.path(), "index.html");

        let fonts = discover_sources(temp.path(), &["fonts/**/*".to_string()]).unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].relative, PathBuf::from("nested/c.ttf"));

        let html = discover_sources(temp.path(), &["*.html".to_string()]).unwrap();
        assert_eq!(html[0].relative, PathBuf::from("index.html"));
    }

    #[test]
    fn test_discover_sources_deduplicates() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "js/main.js");

        let patterns = vec!["js/*.js".to_string(), "js/main.js".to_string()];
        let sources = discover_sources(temp.path(), &patterns).unwrap();
        assert_eq!(sources.len(), 1);
    }
}
