use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum JumpcutError {
    #[error("Error running command - {operation}: {detail}")]
    CommandFailed { operation: String, detail: String },

    #[error("{tool} not found: {detail}")]
    ToolNotFound { tool: String, detail: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Segment file already exists: {}", .0.display())]
    SegmentExists(PathBuf),

    #[error("Invalid speed factor: {0}")]
    InvalidSpeed(f64),

    #[error("Invalid video duration: {0}")]
    InvalidDuration(f64),

    #[error("Too many segments: {0} (file names only sort correctly below 10000)")]
    TooManySegments(usize),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Pipeline cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JumpcutError {
    pub fn command(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        JumpcutError::CommandFailed {
            operation: operation.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, JumpcutError>;
