use thiserror::Error;

/// Main error type for the experiment driver
#[derive(Error, Debug)]
pub enum RlcostError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error("Unknown algorithm: {0} (expected one of: pg, impala, ppo)")]
    UnknownAlgorithm(String),

    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    // Training result errors
    #[error("Missing field in training result: {path}")]
    MissingField { path: String },

    #[error("Invalid field in training result: {path} ({reason})")]
    InvalidField { path: String, reason: String },

    // Training backend errors
    #[error("Training backend error: {0}")]
    Backend(String),

    // State errors
    #[error("Invalid state: {0}")]
    InvalidState(String),

    // Reporting errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Plot rendering error: {0}")]
    Plot(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RlcostError {
    pub fn missing(path: impl Into<String>) -> Self {
        RlcostError::MissingField { path: path.into() }
    }

    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RlcostError::InvalidField {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for RlcostError
pub type Result<T> = std::result::Result<T, RlcostError>;
