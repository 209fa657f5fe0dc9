//! Routing of changed paths to watch actions.

use super::WatchError;
use crate::config::WatchConfig;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// What a file change should cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchAction {
    /// Re-run the style stage; its completion reloads the browser
    RecompileStyles,
    /// Reload connected browsers directly
    Reload,
}

/// Maps changed paths below the source root to [`WatchAction`]s.
#[derive(Debug, Clone)]
pub struct WatchRouter {
    roots: Vec<PathBuf>,
    styles: Vec<Pattern>,
    html: Pattern,
    js: Pattern,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn compile(pattern: &str) -> Result<Pattern, WatchError> {
    Pattern::new(pattern.trim_start_matches("./"))
        .map_err(|source| WatchError::Pattern { pattern: pattern.to_string(), source })
}

impl WatchRouter {
    /// Build a router for `src_root` from the configured watch globs.
    ///
    /// Changes matching `config.styles` or any of the SCSS source globs
    /// (`paths.styles_sass.src`) recompile styles.
    pub fn new(
        src_root: &Path,
        config: &WatchConfig,
        sass_sources: &[String],
    ) -> Result<Self, WatchError> {
        let mut roots = vec![src_root.to_path_buf()];
        // Watchers report canonical paths on some platforms.
        if let Ok(canonical) = src_root.canonicalize() {
            if canonical != src_root {
                roots.push(canonical);
            }
        }

        let styles = std::iter::once(&config.styles)
            .chain(sass_sources)
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            roots,
            styles,
            html: compile(&config.html)?,
            js: compile(&config.js)?,
        })
    }

    fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        self.roots.iter().find_map(|root| path.strip_prefix(root).ok())
    }

    /// Action for one changed path, if any rule matches.
    pub fn route(&self, path: &Path) -> Option<WatchAction> {
        let relative = self.relative(path)?;

        if self.styles.iter().any(|p| p.matches_path_with(relative, MATCH_OPTIONS)) {
            Some(WatchAction::RecompileStyles)
        } else if self.html.matches_path_with(relative, MATCH_OPTIONS)
            || self.js.matches_path_with(relative, MATCH_OPTIONS)
        {
            Some(WatchAction::Reload)
        } else {
            None
        }
    }

    /// De-duplicated actions for a batch of changes, in first-seen order.
    pub fn route_all<'a, I>(&self, paths: I) -> Vec<WatchAction>
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut actions = Vec::new();
        for path in paths {
            if let Some(action) = self.route(path) {
                if !actions.contains(&action) {
                    actions.push(action);
                }
            }
        }
        actions
    }
}
