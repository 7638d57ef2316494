//! # modjar_archive - patching workspace for ZIP-format mod archives
//!
//! The archive side of mod patching: check that the input is the exact
//! archive a patch was written for, unpack it into a scratch workspace,
//! let the caller edit files there, and repack the result without ever
//! exposing a partially written archive.
//!
//! ## Features
//!
//! - MD5 integrity gate ([`ChecksumPolicy`])
//! - Scratch [`Workspace`] keyed by the archive path, removed on drop
//! - Traversal-safe entry extraction and workspace-relative file helpers
//! - JSON, TOML and `.lang` accessors plus recipe patching through
//!   [`modjar_data`]
//! - Atomic publish via a synced sibling temporary file
//!
//! ## Examples
//!
//! ```no_run
//! use modjar_archive::{OutputTarget, Workspace, default_cache_root};
//!
//! let workspace = Workspace::prepare("mods/ProjectE-1.12.2.jar", &default_cache_root()?)?;
//! workspace.remove_entries_keeping("assets/projecte/lang", &["en_us.lang", "zh_cn.lang"])?;
//! let output = OutputTarget::Directory("patched".into()).resolve(workspace.source())?;
//! workspace.publish(&output)?;
//! # Ok::<(), modjar_archive::Error>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod integrity;
pub mod path;
pub mod security;
pub mod workspace;
pub mod zip;

pub use error::{Error, Result};
pub use integrity::{ChecksumPolicy, md5_file, verify_checksum};
pub use workspace::{OutputTarget, Workspace, default_cache_root, workspace_dir_name};
