//! Modjar library
//!
//! Manifest-driven patching of Minecraft mod archives: the archive
//! registry, data-driven patch scripts, the single-archive pipeline and
//! batch processing, plus the command implementations of the `modjar`
//! binary.

pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod script;
pub mod utils;

pub use config::{ArchiveEntry, ArchiveRegistry};
pub use error::{Error, Result};
pub use pipeline::{PatchRequest, apply, apply_registered};
pub use script::{PatchScript, ScriptSpec, Step};
