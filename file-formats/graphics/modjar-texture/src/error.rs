//! Error types for texture operations

use image::ImageError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for texture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while recoloring textures
#[derive(Debug, Error)]
pub enum Error {
    /// The requested palette version is not registered
    #[error("Unknown palette version '{name}' (known: {})", known.join(", "))]
    UnknownPalette {
        /// Requested version
        name: String,
        /// Registered versions, in registration order
        known: Vec<String>,
    },

    /// Palette parameters cannot produce a valid gradient position
    #[error("Invalid palette '{name}': {reason}")]
    InvalidPalette {
        /// Palette name
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Decoding or encoding the image failed
    #[error("Image error for {path}: {source}")]
    Image {
        /// Image file
        path: PathBuf,
        /// Underlying error
        source: ImageError,
    },

    /// Filesystem error
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid palette error
    pub fn invalid_palette<S: Into<String>>(name: S, reason: impl Into<String>) -> Self {
        Self::InvalidPalette {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an image error with the path it concerns
    pub fn image<P: Into<PathBuf>>(path: P, source: ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_palette_lists_known_versions() {
        let err = Error::UnknownPalette {
            name: "v9".to_string(),
            known: vec!["v2".to_string(), "v7".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Unknown palette version 'v9' (known: v2, v7)"
        );
    }
}
