use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::MAX_RELATED_POSTINGS;
use crate::error::{AnalyticsError, Result};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Runtime configuration, read from TOML and overridden by environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub tables: TableConfig,
    pub analysis: AnalysisSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/job_insights.db"),
        }
    }
}

/// Names of the two posting tables: the full history and the currently open subset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub complete: String,
    pub latest: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            complete: "jobs_complete".to_string(),
            latest: "jobs_latest".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Related postings attached to each ranked row
    pub related_limit: usize,
    /// Postings created within this many days count as recent
    pub recent_window_days: i64,
    /// Outer bound of the comparison window for trending skills
    pub history_window_days: i64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            related_limit: MAX_RELATED_POSTINGS,
            recent_window_days: 180,
            history_window_days: 365,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from `config.toml` when it exists.
    /// Missing sections fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AnalyticsError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(db) = std::env::var("JOB_INSIGHTS_DB") {
            if !db.trim().is_empty() {
                self.database.path = PathBuf::from(db);
            }
        }
        if let Ok(dir) = std::env::var("JOB_INSIGHTS_LOG_DIR") {
            if !dir.trim().is_empty() {
                self.logging.directory = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        for name in [&self.tables.complete, &self.tables.latest] {
            if !is_identifier(name) {
                return Err(AnalyticsError::Config(format!(
                    "table name '{}' is not a valid SQL identifier",
                    name
                )));
            }
        }
        if self.analysis.related_limit > MAX_RELATED_POSTINGS {
            return Err(AnalyticsError::Config(format!(
                "related_limit must be at most {}",
                MAX_RELATED_POSTINGS
            )));
        }
        if self.analysis.recent_window_days <= 0
            || self.analysis.history_window_days <= self.analysis.recent_window_days
        {
            return Err(AnalyticsError::Config(
                "history_window_days must exceed a positive recent_window_days".to_string(),
            ));
        }
        Ok(())
    }
}

/// Plain ASCII identifier check used for anything interpolated into SQL.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [tables]
            complete = "postings_history"

            [analysis]
            related_limit = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.tables.complete, "postings_history");
        assert_eq!(config.tables.latest, "jobs_latest");
        assert_eq!(config.analysis.related_limit, 3);
        assert_eq!(config.analysis.recent_window_days, 180);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unsafe_table_names() {
        let mut config = AppConfig::default();
        config.tables.latest = "jobs; DROP TABLE x".to_string();
        assert!(matches!(config.validate(), Err(AnalyticsError::Config(_))));
    }

    #[test]
    fn rejects_oversized_related_limit() {
        let mut config = AppConfig::default();
        config.analysis.related_limit = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn identifier_check() {
        assert!(is_identifier("jobs_latest"));
        assert!(is_identifier("_t1"));
        assert!(!is_identifier("1jobs"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("jobs-latest"));
    }
}
