//! Error types for loading message queue credentials.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for secrets operations.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Errors that can occur while reading a secrets directory.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The secrets directory does not exist.
    #[error("Secrets directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The secrets directory exists but could not be listed.
    #[error("Cannot list secrets directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A credential file name is not valid UTF-8 and cannot be used as a key.
    #[error("Secret file name is not valid UTF-8: {}", path.display())]
    InvalidName { path: PathBuf },

    /// A credential file could not be read.
    #[error("Cannot read secret file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SecretsError {
    /// Path of the directory or file the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound { path }
            | Self::InvalidName { path }
            | Self::ReadDir { path, .. }
            | Self::Read { path, .. } => path,
        }
    }
}
