//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },
    
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },
    
    #[error("OBJ error: {0}")]
    Obj(#[from] obj::ObjError),
    
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for reconview_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => reconview_core::Error::Io(e),
            IoError::FileNotFound { path } => reconview_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )),
            other => reconview_core::Error::InvalidData(other.to_string()),
        }
    }
}
