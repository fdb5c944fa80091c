use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(String),

    #[error("Invalid posting on line {line}: {source}")]
    InvalidPosting {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("No input postings for analysis '{analysis}'")]
    NoInput { analysis: String },

    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
