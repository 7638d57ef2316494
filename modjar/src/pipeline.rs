//! Patching a single archive
//!
//! [`apply`] runs the fixed sequence every patch goes through:
//!
//! 1. the source archive must exist,
//! 2. its checksum is verified (unless skipped),
//! 3. it is extracted into a fresh workspace,
//! 4. the script edits the workspace,
//! 5. the workspace is repacked to the output path atomically,
//! 6. the workspace is deleted.
//!
//! Nothing is written to the output path unless every earlier phase
//! succeeds, and the workspace is removed on every exit path.

use crate::config::{ArchiveEntry, ArchiveRegistry};
use crate::error::Result;
use crate::script::PatchScript;
use modjar_archive::{ChecksumPolicy, OutputTarget, Workspace};
use std::path::{Path, PathBuf};

/// Everything needed to patch one archive except the script
#[derive(Debug, Clone)]
pub struct PatchRequest {
    /// Source archive
    pub archive: PathBuf,
    /// Checksum gate
    pub checksum: ChecksumPolicy,
    /// Where the patched archive goes
    pub output: OutputTarget,
    /// Directory workspaces are created under
    pub cache_root: PathBuf,
}

impl PatchRequest {
    /// Request for a registered archive, verifying against its recorded MD5
    pub fn for_entry(
        archive: impl Into<PathBuf>,
        entry: &ArchiveEntry,
        verify: bool,
        output: OutputTarget,
        cache_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            archive: archive.into(),
            checksum: if verify {
                ChecksumPolicy::Verify(entry.md5.clone())
            } else {
                ChecksumPolicy::Skip
            },
            output,
            cache_root: cache_root.into(),
        }
    }
}

/// Patch one archive, returning the path of the written archive
pub fn apply(request: &PatchRequest, script: &dyn PatchScript) -> Result<PathBuf> {
    let archive = request.archive.as_path();
    if !archive.is_file() {
        return Err(modjar_archive::Error::NotFound(archive.to_path_buf()).into());
    }

    request.checksum.enforce(archive)?;
    log::info!("Patching {}", archive.display());

    let mut workspace = Workspace::prepare(archive, &request.cache_root)?;
    script.run(&mut workspace)?;

    let output = request.output.resolve(workspace.source())?;
    let entries = workspace.publish(&output)?;
    workspace.discard()?;

    log::info!("Patched {} ({entries} entries)", output.display());
    Ok(output)
}

/// Look up `archive` in the registry and patch it with its script
pub fn apply_registered(
    registry: &ArchiveRegistry,
    archive: &Path,
    verify: bool,
    output: OutputTarget,
    cache_root: &Path,
) -> Result<PathBuf> {
    let entry = registry.lookup_path(archive)?;
    let script = registry.script(&entry.script)?;
    log::debug!(
        "{} belongs to {} (script {})",
        archive.display(),
        entry.family,
        entry.script
    );
    let request = PatchRequest::for_entry(archive, entry, verify, output, cache_root);
    apply(&request, &*script)
}
