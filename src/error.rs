//! Error types for grid construction and stepping.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GridError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid {axis} dimension: {value} (must be at least 1)")]
    InvalidDimension { axis: &'static str, value: i32 },

    #[error("grid of {width}x{height}x{depth} cells is too large")]
    TooLarge { width: i32, height: i32, depth: i32 },

    #[error("a generation step is already in progress")]
    StepInProgress,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Config(err.to_string())
    }
}
