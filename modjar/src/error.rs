//! Error types for manifests, scripts and the patch pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for patching operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for patching operations
#[derive(Error, Debug)]
pub enum Error {
    /// Archive file name is not in the registry
    #[error("No patch registered for archive '{0}'")]
    UnknownArchive(String),

    /// Script id is not defined in the manifest
    #[error("Unknown patch script '{0}'")]
    UnknownScript(String),

    /// Manifest file could not be parsed
    #[error("Failed to parse manifest {path}: {source}")]
    ManifestSyntax {
        /// Manifest path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// Manifest parsed but is inconsistent
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A script step failed
    #[error("Step {index} ({op}) failed: {source}")]
    Step {
        /// Zero-based step index
        index: usize,
        /// Step operation name
        op: &'static str,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// I/O error outside the workspace
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Invalid archive search pattern
    #[error("Invalid search pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Archive, integrity or workspace error
    #[error(transparent)]
    Archive(#[from] modjar_archive::Error),

    /// Structured file or recipe error
    #[error(transparent)]
    Data(#[from] modjar_data::Error),

    /// Texture recolor error
    #[error(transparent)]
    Texture(#[from] modjar_texture::Error),
}

impl Error {
    /// Create a new InvalidManifest error
    pub fn invalid_manifest<S: Into<String>>(msg: S) -> Self {
        Self::InvalidManifest(msg.into())
    }

    /// Create an I/O error carrying the path
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Innermost error, looking through step wrappers
    pub fn root(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the source archive failed its checksum
    pub fn is_integrity(&self) -> bool {
        matches!(
            self.root(),
            Self::Archive(modjar_archive::Error::Integrity { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_error_root() {
        let inner = Error::Archive(modjar_archive::Error::Integrity {
            path: PathBuf::from("a.jar"),
            expected: "0".repeat(32),
            actual: "1".repeat(32),
        });
        let err = Error::Step {
            index: 2,
            op: "set_json",
            source: Box::new(inner),
        };
        assert!(err.to_string().starts_with("Step 2 (set_json) failed"));
        assert!(err.is_integrity());
        assert!(!Error::UnknownArchive("x.jar".into()).is_integrity());
    }
}
