use thiserror::Error;

#[derive(Debug, Error)]
pub enum KamusError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KamusError {
    /// Returns `true` for errors caused by what the user submitted rather
    /// than by the environment (disk, network, config).
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, KamusError>;
