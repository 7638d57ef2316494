//! Error types for archive handling

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for archive operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on a specific path
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// I/O error while streaming archive data
    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),

    /// The source archive does not exist
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    /// Archive checksum does not match the expected value
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    Integrity {
        /// Archive path
        path: PathBuf,
        /// Expected MD5 (lowercase hex)
        expected: String,
        /// Actual MD5 (lowercase hex)
        actual: String,
    },

    /// Extracting the archive into the workspace failed
    #[error("Failed to extract {archive}: {source}")]
    Extraction {
        /// Archive being extracted
        archive: PathBuf,
        /// What went wrong
        #[source]
        source: Box<Error>,
    },

    /// Invalid or corrupted ZIP structure
    #[error("Invalid ZIP format: {0}")]
    InvalidFormat(String),

    /// ZIP feature outside the supported subset
    #[error("Unsupported ZIP feature: {0}")]
    Unsupported(String),

    /// Entry data does not match its recorded CRC-32
    #[error("CRC mismatch for {entry}: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch {
        /// Entry name
        entry: String,
        /// CRC from the central directory
        expected: u32,
        /// CRC of the decompressed data
        actual: u32,
    },

    /// Archive entry name would escape the extraction root
    #[error("Unsafe entry name '{name}': {reason}")]
    UnsafeEntryName {
        /// Entry name as stored
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Workspace-relative path would resolve outside the workspace
    #[error("Path '{path}' escapes the workspace: {reason}")]
    PathEscapesWorkspace {
        /// Requested relative path
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Expected a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No per-user cache directory could be determined
    #[error("Could not determine a cache directory for workspaces")]
    NoCacheDirectory,

    /// Walking the workspace failed
    #[error("Failed to walk workspace: {0}")]
    Walk(#[from] walkdir::Error),

    /// Structured file or recipe error
    #[error(transparent)]
    Data(#[from] modjar_data::Error),
}

impl Error {
    /// Create an I/O error carrying the path
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new InvalidFormat error
    pub fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a new Unsupported error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Wrap an error raised while extracting `archive`
    pub fn extraction<P: Into<PathBuf>>(archive: P, source: Self) -> Self {
        Self::Extraction {
            archive: archive.into(),
            source: Box::new(source),
        }
    }

    /// Check if this error indicates the archive itself is corrupted
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::InvalidFormat(_) | Self::CrcMismatch { .. } | Self::UnsafeEntryName { .. } => {
                true
            }
            Self::Extraction { source, .. } => source.is_corruption(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::invalid_format("missing end of central directory");
        assert_eq!(
            err.to_string(),
            "Invalid ZIP format: missing end of central directory"
        );

        let err = Error::Integrity {
            path: PathBuf::from("a.jar"),
            expected: "00".repeat(16),
            actual: "ff".repeat(16),
        };
        assert!(err.to_string().starts_with("Checksum mismatch for a.jar"));
    }

    #[test]
    fn test_error_classification() {
        let crc = Error::CrcMismatch {
            entry: "pack.mcmeta".to_string(),
            expected: 0x1234_5678,
            actual: 0x8765_4321,
        };
        assert!(crc.is_corruption());

        let wrapped = Error::extraction("a.jar", crc);
        assert!(wrapped.is_corruption());
        assert!(!Error::NotFound(PathBuf::from("a.jar")).is_corruption());
    }
}
