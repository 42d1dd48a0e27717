use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhxError {
    #[error("gh error: {0}")]
    Tool(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("query rejected: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed gh output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GhxError>;
