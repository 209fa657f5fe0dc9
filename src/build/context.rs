//! Build context containing configuration and resolved paths for a build.

use crate::config::{AssetClass, AssetConfig, AssetPaths};
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// Constructed once per process and handed by reference to every stage.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: AssetConfig,
    /// Project root directory (where assetpipe.toml is located)
    project_root: PathBuf,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl BuildContext {
    /// Create a new build context.
    pub fn new(config: AssetConfig, project_root: PathBuf) -> Self {
        Self { config, project_root, verbose: false }
    }

    /// Get the configuration.
    pub fn config(&self) -> &AssetConfig {
        &self.config
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the source root (resolved to absolute path).
    pub fn src_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.src)
    }

    /// Get the output root (resolved to absolute path).
    pub fn out_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.project.out)
    }

    /// Source patterns and output directory for an asset class.
    pub fn paths(&self, class: AssetClass) -> &AssetPaths {
        self.config.paths.get(class)
    }

    /// Resolved output directory for an asset class.
    ///
    /// Compiled SCSS lands inside the source tree; every other class writes
    /// below the output root.
    pub fn class_out_dir(&self, class: AssetClass) -> PathBuf {
        let out = &self.paths(class).out;
        match class {
            AssetClass::StylesSass => self.src_dir().join(out),
            _ => self.out_dir().join(out),
        }
    }

    /// Resolved SCSS entry point.
    pub fn style_entry(&self) -> PathBuf {
        self.src_dir().join(&self.config.style.entry)
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve a path relative to the project root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        crate::config::loader::resolve_path(&self.project_root, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_config;

    fn context() -> BuildContext {
        BuildContext::new(default_config(), PathBuf::from("/project"))
    }

    #[test]
    fn test_build_context_new() {
        let ctx = context();
        assert_eq!(ctx.project_root(), Path::new("/project"));
        assert!(!ctx.is_verbose());
        assert!(ctx.with_verbose(true).is_verbose());
    }

    #[test]
    fn test_build_context_roots() {
        let ctx = context();
        assert_eq!(ctx.src_dir(), PathBuf::from("/project/app"));
        assert_eq!(ctx.out_dir(), PathBuf::from("/project/build"));
    }

    #[test]
    fn test_class_out_dir() {
        let ctx = context();
        assert_eq!(ctx.class_out_dir(AssetClass::Html), PathBuf::from("/project/build/"));
        assert_eq!(ctx.class_out_dir(AssetClass::StylesCss), PathBuf::from("/project/build/styles"));
        assert_eq!(ctx.class_out_dir(AssetClass::Js), PathBuf::from("/project/build/js"));
        assert_eq!(
            ctx.class_out_dir(AssetClass::StylesSass),
            PathBuf::from("/project/app/styles/CSS")
        );
    }

    #[test]
    fn test_style_entry() {
        let ctx = context();
        assert_eq!(ctx.style_entry(), PathBuf::from("/project/app/styles/SASS/main.scss"));
    }

    #[test]
    fn test_resolve_path_absolute() {
        let ctx = context();
        assert_eq!(ctx.resolve_path(Path::new("/other")), PathBuf::from("/other"));
    }
}
