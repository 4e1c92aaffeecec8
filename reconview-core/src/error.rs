//! Error types for reconview

use thiserror::Error;

/// Main error type for reconview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("Invalid data: {0}")]
    InvalidData(String),
    
    #[error("GPU error: {0}")]
    Gpu(String),
    
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for reconview operations
pub type Result<T> = std::result::Result<T, Error>;
