//! Configuration loading and discovery for `assetpipe.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::AssetConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "assetpipe.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse assetpipe.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override source root
    pub src: Option<PathBuf>,
    /// Override output root
    pub out: Option<PathBuf>,
    /// Override dev server host
    pub host: Option<String>,
    /// Override dev server port
    pub port: Option<u16>,
}

/// Find assetpipe.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for assetpipe.toml
/// 2. Check XDG_CONFIG_HOME/assetpipe/assetpipe.toml (or ~/.config/assetpipe/assetpipe.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find assetpipe.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("assetpipe").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find assetpipe.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an assetpipe.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
pub fn load_config(path: Option<&Path>) -> Result<AssetConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<AssetConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: AssetConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Create a default configuration when no assetpipe.toml is found.
///
/// The project name is taken from the current directory name.
pub fn default_config() -> AssetConfig {
    let mut config = AssetConfig::default();
    if let Some(name) = env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
    {
        config.project.name = name;
    }
    config
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut AssetConfig, overrides: &CliOverrides) {
    if let Some(ref src) = overrides.src {
        config.project.src = src.clone();
    }

    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }

    if let Some(ref host) = overrides.host {
        config.watch.host = host.clone();
    }

    if let Some(port) = overrides.port {
        config.watch.port = port;
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[project]\nname = \"test\"")
            .expect("should write config content");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"[project]\nname = \"test\"")
            .expect("should write config content");

        let subdir = temp.path().join("app").join("styles");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(
                br#"
[project]
name = "test-project"
out = "dist"

[paths.js]
src = ["js/app.js"]
out = "scripts"
"#,
            )
            .expect("should write config content");

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.project.name, "test-project");
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.paths.js.src, vec!["js/app.js"]);
        assert_eq!(config.paths.js.out, PathBuf::from("scripts"));
    }

    #[test]
    fn test_load_config_missing_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("nonexistent.toml");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(b"this is not valid toml {{{")
            .expect("should write invalid config");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(
                br#"
[images]
jpeg_quality = 0

[watch]
debounce_ms = 0
"#,
            )
            .expect("should write invalid config");

        let result = load_config(Some(&config_path));
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = default_config();
        let overrides = CliOverrides {
            src: Some(PathBuf::from("site")),
            out: Some(PathBuf::from("public")),
            port: Some(4000),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.project.src, PathBuf::from("site"));
        assert_eq!(config.project.out, PathBuf::from("public"));
        assert_eq!(config.watch.port, 4000);
        assert_eq!(config.watch.host, "127.0.0.1");
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
        assert_eq!(resolve_path(root, Path::new("app")), PathBuf::from("/project/app"));
    }

    #[test]
    fn test_project_root() {
        let config_path = Path::new("/project/assetpipe.toml");
        assert_eq!(project_root(config_path), Some(Path::new("/project")));
    }

    #[test]
    #[serial]
    fn test_load_config_discovers_from_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let mut file = File::create(temp.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[project]\nout = \"dist\"").unwrap();

        let original_dir = env::current_dir().unwrap();
        env::set_current_dir(temp.path()).unwrap();
        let result = load_config(None);
        env::set_current_dir(original_dir).unwrap();

        let config = result.unwrap();
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.project.src, PathBuf::from("app"));
    }
}
