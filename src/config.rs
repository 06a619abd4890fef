//! Layered configuration: defaults, YAML file, environment, command line.

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the user config dir holding `config.yaml`
pub const CONFIG_DIR_NAME: &str = "campus-console";
pub const ENV_DB_PATH: &str = "CAMPUS_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CAMPUS_LOG_LEVEL";

/// Database connection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file, or `:memory:`
    pub path: Option<String>,
    /// DuckDB memory limit, e.g. "1GB"
    pub memory_limit: Option<String>,
}

/// Interactive console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Attempts per prompt before the action is abandoned
    pub max_retries: u32,
    /// Rows fetched by "show table"
    pub select_limit: usize,
    /// Rows printed before the listing is cut short
    pub display_rows: usize,
    /// Keep line history between sessions
    pub history: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            select_limit: 500,
            display_rows: 50,
            history: true,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub console: ConsoleConfig,
    /// off, error, warn, info, debug or trace
    pub log_level: String,
    pub format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            console: ConsoleConfig::default(),
            log_level: "warn".to_string(),
            format: OutputFormat::Table,
        }
    }
}

impl AppConfig {
    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content)
            .map_err(|e| Error::Connection(format!("invalid configuration: {}", e)))
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Connection(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::Connection(msg) => Error::Connection(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// `config.yaml` under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join("config.yaml"))
    }

    /// Load the explicit file, else the default file if it exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Apply environment overrides; `lookup` is `std::env::var` outside tests
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            self.database.path = Some(path);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level;
        }
    }

    /// Apply command-line overrides
    pub fn apply_cli(&mut self, db: Option<String>, log_level: Option<String>) {
        if let Some(path) = db {
            self.database.path = Some(path);
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
    }

    /// Full precedence chain: defaults < file < environment < flags
    pub fn resolve(
        explicit: Option<&Path>,
        db: Option<String>,
        log_level: Option<String>,
    ) -> Result<Self> {
        let mut config = Self::discover(explicit)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(db, log_level);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.console.max_retries, 3);
        assert_eq!(config.console.select_limit, 500);
        assert_eq!(config.console.display_rows, 50);
        assert!(config.console.history);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
database:
  path: campus.duckdb
console:
  max_retries: 5
format: json
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database.path.as_deref(), Some("campus.duckdb"));
        assert_eq!(config.console.max_retries, 5);
        assert_eq!(config.console.select_limit, 500);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("\n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = AppConfig::from_yaml("database:\n  host: localhost\n").unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
        assert!(err.to_string().starts_with("could not connect to database"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level: debug").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load(Path::new("/no/such/config.yaml")).unwrap_err();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_precedence() {
        let mut config = AppConfig::from_yaml("database:\n  path: from-file.duckdb\n").unwrap();

        let env: HashMap<&str, &str> = [(ENV_DB_PATH, "from-env.duckdb"), (ENV_LOG_LEVEL, "")]
            .into_iter()
            .collect();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.database.path.as_deref(), Some("from-env.duckdb"));
        assert_eq!(config.log_level, "warn");

        config.apply_cli(Some("from-flag.duckdb".to_string()), Some("info".to_string()));
        assert_eq!(config.database.path.as_deref(), Some("from-flag.duckdb"));
        assert_eq!(config.log_level, "info");

        config.apply_cli(None, None);
        assert_eq!(config.database.path.as_deref(), Some("from-flag.duckdb"));
    }
}
