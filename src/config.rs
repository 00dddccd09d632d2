//! Configuration file handling for termlayer.
//!
//! Loads configuration from `~/.config/termlayer/config.toml` or a custom path.

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cache::ImageCache;
use crate::canvas::Painter;

/// Default upper bound for the image cache, in megabytes.
pub const DEFAULT_CACHE_MAX_MB: u64 = 64;

/// Configuration file structure for termlayer.
/// Loaded from ~/.config/termlayer/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub layer: LayerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Send stderr to /dev/null once started
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub output: Painter,
    #[serde(default)]
    pub invert: bool,
    #[serde(default)]
    pub no_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_cache_max_mb")]
    pub max_size_mb: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_size_mb: DEFAULT_CACHE_MAX_MB,
        }
    }
}

impl CacheConfig {
    /// Configured cache directory, or the per-user default.
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(ImageCache::default_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: None,
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.level.clone()))
    }
}

fn default_cache_max_mb() -> u64 {
    DEFAULT_CACHE_MAX_MB
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            source: e,
        })?;
        config.log.level_filter()?;
        Ok(config)
    }

    /// Render as TOML, as printed by `config show`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    InvalidLogLevel(String),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("termlayer").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/termlayer/config.toml")
        })
}

/// Commented template written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# termlayer configuration

[layer]
# Redirect stderr to /dev/null while running
silent = false
# Cell painter: halfblock, ascii, braille
output = "halfblock"
# Invert brightness (for light themes)
invert = false
# Decode every image from scratch instead of using the cache
no_cache = false

[cache]
# Cache directory (default: the per-user cache dir)
# dir = "/tmp/termlayer-cache"
# Maximum cache size before oldest entries are removed
max_size_mb = 64

[log]
# off, error, warn, info, debug, trace
level = "info"
# Log file (default: termlayer_<user>.log in the temp directory)
# path = "/tmp/termlayer.log"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache.max_size_mb, 64);
        assert_eq!(config.log.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config("[layer]\noutput = \"braille\"\n");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.layer.output, Painter::Braille);
        assert!(!config.layer.silent);
        assert_eq!(config.cache.max_size_mb, DEFAULT_CACHE_MAX_MB);
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
[layer]
silent = true
output = "ascii"
invert = true
no_cache = true

[cache]
dir = "/var/tmp/tl"
max_size_mb = 8

[log]
level = "debug"
path = "/var/tmp/tl.log"
"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.layer.silent);
        assert_eq!(config.layer.output, Painter::Ascii);
        assert!(config.layer.invert);
        assert!(config.layer.no_cache);
        assert_eq!(config.cache.resolved_dir(), PathBuf::from("/var/tmp/tl"));
        assert_eq!(config.cache.max_size_mb, 8);
        assert_eq!(config.log.level_filter().unwrap(), LevelFilter::Debug);
        assert_eq!(config.log.path, Some(PathBuf::from("/var/tmp/tl.log")));
    }

    #[test]
    fn test_broken_file_is_error() {
        let file = write_config("[layer\nsilent = ");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_output_is_error() {
        let file = write_config("[layer]\noutput = \"sixel\"\n");
        assert!(matches!(
            Config::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_log_level_is_error() {
        let file = write_config("[log]\nlevel = \"loud\"\n");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(ref l) if l == "loud"));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_to_toml_roundtrips() {
        let mut config = Config::default();
        config.layer.output = Painter::Braille;
        let text = config.to_toml().unwrap();
        assert!(text.contains("output = \"braille\""));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("termlayer/config.toml"));
    }
}
