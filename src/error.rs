use thiserror::Error;

#[derive(Error, Debug)]
pub enum BonusError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{file}: could not find a header row containing {anchor}")]
    HeaderNotFound { file: String, anchor: String },

    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("Invalid leave category upload: {0}")]
    InvalidCategoryUpload(String),

    #[error("Unknown disposition '{0}' (expected grants_bonus, requires_decision or blocks_bonus)")]
    UnknownDisposition(String),

    #[error("Leave category not found: {0}")]
    CategoryNotFound(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BonusError>;
