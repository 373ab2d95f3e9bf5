use thiserror::Error;

pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Error, Debug)]
pub enum RetrievalError {
    /// A host capability failed
    #[error("Host error: {0}")]
    Host(String),

    /// The file no longer exists
    #[error("File not found: {0}")]
    NotFound(String),

    /// Go-to-definition or find-references failed
    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Syntax error: {0}")]
    Syntax(#[from] context_syntax::SyntaxError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An `.ipynb` file is not valid notebook JSON
    #[error("Notebook decode error: {0}")]
    Notebook(#[from] serde_json::Error),

    /// A newer request started before this one reached its join point
    #[error("Request superseded (generation {generation})")]
    Superseded { generation: u64 },
}

impl RetrievalError {
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Whether the error means "no such file" rather than a failure
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<context_search::SearchError> for RetrievalError {
    fn from(err: context_search::SearchError) -> Self {
        match err {
            context_search::SearchError::InvalidConfig(msg) => Self::InvalidConfig(msg),
        }
    }
}
