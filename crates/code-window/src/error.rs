use thiserror::Error;

/// Result type for window operations
pub type Result<T> = std::result::Result<T, WindowError>;

/// Errors raised while configuring or building windows
#[derive(Error, Debug)]
pub enum WindowError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl WindowError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
