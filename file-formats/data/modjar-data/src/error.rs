//! Error types for structured data handling

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for data file operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for data file operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading or writing a data file
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The file is not valid JSON
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// JSON value could not be rendered
    #[error("Failed to serialize JSON: {0}")]
    JsonSerialize(#[source] serde_json::Error),

    /// The file is not valid TOML
    #[error("Invalid TOML in {}: {source}", path.display())]
    TomlDe {
        /// File that failed to parse
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: toml::de::Error,
    },

    /// TOML document could not be rendered
    #[error("Failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A recipe symbol is both updated and removed in the same patch
    #[error("Recipe {document}: symbols {symbols:?} are both updated and removed")]
    Conflict {
        /// Recipe being patched
        document: String,
        /// Offending symbols
        symbols: Vec<String>,
    },

    /// A recipe update value is not a string
    #[error("Recipe {document}: binding for '{symbol}' must be a string like 'minecraft:foo' or '#namespace:tag', got {value}")]
    InvalidBinding {
        /// Recipe being patched
        document: String,
        /// Symbol whose binding was rejected
        symbol: String,
        /// The rejected value rendered as JSON
        value: String,
    },

    /// Pattern symbols and key bindings disagree after an edit
    #[error("Recipe {document}: pattern and key disagree (unbound symbols {unbound:?}, unused bindings {unused:?})")]
    SchemaConsistency {
        /// Recipe being patched
        document: String,
        /// Symbols used in the pattern with no binding in `key`
        unbound: Vec<String>,
        /// Bindings in `key` never used by the pattern
        unused: Vec<String>,
    },

    /// Recipe document lacks the keyed grid structure
    #[error("Recipe {document} is malformed: {reason}")]
    MalformedRecipe {
        /// Recipe being patched
        document: String,
        /// What is wrong with it
        reason: String,
    },

    /// A JSON pointer could not be applied to a document
    #[error("Cannot apply JSON pointer '{pointer}': {reason}")]
    InvalidPointer {
        /// The pointer expression
        pointer: String,
        /// Why it could not be applied
        reason: String,
    },

    /// A translation entry cannot be written as a `key=value` line
    #[error("Cannot write lang entry {key:?}: {reason}")]
    InvalidLangEntry {
        /// Offending key
        key: String,
        /// Why the entry would not read back unchanged
        reason: &'static str,
    },

    /// A TOML table-array element does not exist
    #[error("TOML array of tables '{array}' has no element {index}")]
    MissingTableArrayElement {
        /// Array name
        array: String,
        /// Requested element
        index: usize,
    },
}

impl Error {
    /// Create an I/O error tagged with the file path
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a MalformedRecipe error
    pub fn malformed_recipe<D: Into<String>, R: Into<String>>(document: D, reason: R) -> Self {
        Error::MalformedRecipe {
            document: document.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is a violation of the recipe editing rules
    ///
    /// These are caller data problems: re-running the same patch will fail
    /// the same way.
    pub fn is_recipe_violation(&self) -> bool {
        matches!(
            self,
            Error::Conflict { .. }
                | Error::InvalidBinding { .. }
                | Error::SchemaConsistency { .. }
                | Error::MalformedRecipe { .. }
        )
    }
}
