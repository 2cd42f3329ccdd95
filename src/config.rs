//! Configuration module for the endpoint validator.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides (applied by the caller)
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `CODEINTEL_` and use double
//! underscores to separate nested levels:
//! - `CODEINTEL_SCAN__PARALLEL_THREADS=8` sets `scan.parallel_threads`
//! - `CODEINTEL_VALIDATION__FAIL_ON=warning` sets `validation.fail_on`
//! - `CODEINTEL_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parsing::Language;
use crate::validate::Severity;

/// Directory holding the settings file, searched upwards from the cwd.
pub const CONFIG_DIR: &str = ".codeintel";
pub const CONFIG_FILE: &str = "settings.toml";
pub const IGNORE_FILE: &str = ".codeintelignore";
const ENV_PREFIX: &str = "CODEINTEL_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    #[error("Configuration file already exists at {0}. Use --force to overwrite")]
    AlreadyExists(PathBuf),

    #[error("Cannot write configuration to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    /// Language-specific settings keyed by `Language::config_key`
    #[serde(default = "default_languages")]
    pub languages: HashMap<String, LanguageConfig>,

    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Log levels: `default` applies everywhere, `modules` overrides per target.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,

    #[serde(default)]
    pub modules: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScanConfig {
    /// Number of worker threads used to parse source files
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Glob patterns (gitignore syntax) excluded from scanning
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Files above this size in bytes are skipped
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default)]
    pub follow_links: bool,

    /// Scan test files (`tests/`, `*_test.go`, `test_*.py`, `*.spec.ts`, ...)
    #[serde(default = "default_true")]
    pub include_tests: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValidationConfig {
    /// Lowest severity that makes the run fail
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,

    /// Report schema operations that no code endpoint implements
    #[serde(default = "default_true")]
    pub report_unimplemented: bool,

    /// Run schema security checks (authentication, transport, sensitive params)
    #[serde(default = "default_true")]
    pub security_checks: bool,

    /// Prefixes removed from code routes before matching (e.g. "/api")
    #[serde(default)]
    pub strip_prefixes: Vec<String>,

    /// Rule ids to suppress
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_true() -> bool {
    true
}
fn default_max_file_size() -> u64 {
    1024 * 1024
}
fn default_fail_on() -> Severity {
    Severity::Error
}
fn default_ignore_patterns() -> Vec<String> {
    [
        "node_modules/**",
        "target/**",
        ".git/**",
        "venv/**",
        ".venv/**",
        "__pycache__/**",
        "vendor/**",
        "dist/**",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    Language::ALL
        .into_iter()
        .map(|lang| {
            (
                lang.config_key().to_string(),
                LanguageConfig {
                    enabled: true,
                    extensions: lang
                        .default_extensions()
                        .iter()
                        .map(|e| e.to_string())
                        .collect(),
                },
            )
        })
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            logging: LoggingConfig::default(),
            scan: ScanConfig::default(),
            languages: default_languages(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: default_ignore_patterns(),
            max_file_size: default_max_file_size(),
            follow_links: false,
            include_tests: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_on: default_fail_on(),
            report_unimplemented: true,
            security_checks: true,
            strip_prefixes: Vec::new(),
            disabled_rules: Vec::new(),
        }
    }
}

impl Settings {
    /// Load configuration from defaults, the workspace settings file and env.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file (missing files fall back to defaults).
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Find `.codeintel/settings.toml` from the current directory up to root.
    pub fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .map(|dir| dir.join(CONFIG_DIR))
            .find(|dir| dir.is_dir())
            .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string).map_err(io_err)
    }

    /// Create a default settings file and ignore file under `root`.
    pub fn init_config_file(root: &Path, force: bool) -> Result<PathBuf, ConfigError> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err(ConfigError::AlreadyExists(config_path));
        }

        Settings::default().save(&config_path)?;

        let ignore_path = root.join(IGNORE_FILE);
        if force || !ignore_path.exists() {
            std::fs::write(&ignore_path, DEFAULT_IGNORE_CONTENT).map_err(|source| {
                ConfigError::Io {
                    path: ignore_path.clone(),
                    source,
                }
            })?;
        }

        Ok(config_path)
    }

    /// Language for `path` if its extension belongs to an enabled language.
    pub fn language_for(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Language::ALL.into_iter().find(|lang| {
            self.languages
                .get(lang.config_key())
                .is_some_and(|cfg| cfg.enabled && cfg.extensions.iter().any(|e| *e == ext))
        })
    }

    pub fn enabled_languages(&self) -> Vec<Language> {
        Language::ALL
            .into_iter()
            .filter(|lang| {
                self.languages
                    .get(lang.config_key())
                    .is_some_and(|cfg| cfg.enabled)
            })
            .collect()
    }
}

const DEFAULT_IGNORE_CONTENT: &str = r#"# Files excluded from endpoint scanning (gitignore syntax)
# https://git-scm.com/docs/gitignore

# Build output
target/
build/
dist/

# Dependencies
node_modules/
vendor/
.venv/
venv/
__pycache__/

# Generated clients usually mirror the schema rather than implement it
*.generated.*
*_pb2.py
*.pb.go

# Tests (uncomment to exclude test fixtures that declare routes)
# tests/
# *_test.go
# *.spec.ts
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.logging.default, "warn");
        assert!(settings.scan.parallel_threads > 0);
        assert_eq!(settings.validation.fail_on, Severity::Error);
        assert_eq!(settings.enabled_languages().len(), Language::ALL.len());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2

[scan]
parallel_threads = 4
ignore_patterns = ["generated/**"]

[validation]
fail_on = "warning"
strip_prefixes = ["/api"]

[languages.go]
enabled = false
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.scan.parallel_threads, 4);
        assert_eq!(settings.scan.ignore_patterns, vec!["generated/**"]);
        assert_eq!(settings.validation.fail_on, Severity::Warning);
        assert_eq!(settings.validation.strip_prefixes, vec!["/api"]);
        assert!(!settings.languages["go"].enabled);
        // Untouched languages keep their defaults
        assert!(settings.languages["python"].enabled);
        assert!(!settings.enabled_languages().contains(&Language::Go));
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.scan.parallel_threads = 2;
        settings.validation.report_unimplemented = false;
        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.scan.parallel_threads, 2);
        assert!(!loaded.validation.report_unimplemented);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();

        let path = Settings::init_config_file(temp_dir.path(), false).unwrap();
        assert!(path.exists());
        assert!(temp_dir.path().join(IGNORE_FILE).exists());

        let err = Settings::init_config_file(temp_dir.path(), false).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));

        assert!(Settings::init_config_file(temp_dir.path(), true).is_ok());
    }

    #[test]
    fn test_language_for_respects_extensions() {
        let mut settings = Settings::default();
        assert_eq!(settings.language_for(Path::new("app.py")), Some(Language::Python));
        assert_eq!(settings.language_for(Path::new("App.TSX")), Some(Language::TypeScript));
        assert_eq!(settings.language_for(Path::new("README.md")), None);

        settings.languages.get_mut("python").unwrap().enabled = false;
        assert_eq!(settings.language_for(Path::new("app.py")), None);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[validation]\nfail_on = \"catastrophic\"\n").unwrap();

        assert!(matches!(
            Settings::load_from(&config_path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
