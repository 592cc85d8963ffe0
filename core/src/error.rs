use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot read {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Data integrity violation in '{report}': {skipped} order(s) reference missing entities")]
    DataIntegrity { report: String, skipped: usize },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Report '{name}' not found")]
    UnknownReport { name: String },

    #[error("Invalid {table} record {id}: {reason}")]
    InvalidRecord { table: &'static str, id: i64, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
