use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Dimension mismatch: {0}")]
    Dimension(String),

    #[error("Problem is not convex: {0}")]
    NotConvex(String),

    #[error("Unsupported problem: {0}")]
    Unsupported(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for CheckError {
    fn from(err: std::io::Error) -> Self {
        CheckError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
