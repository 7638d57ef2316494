//! `modjar apply`

use super::CacheArgs;
use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args};
use console::style;
use crate::config::ArchiveRegistry;
use crate::pipeline::{self, PatchRequest};
use modjar_archive::{ChecksumPolicy, OutputTarget};
use std::path::PathBuf;

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["output_dir", "in_place"])))]
pub struct ApplyArgs {
    /// Archive to patch
    pub archive: PathBuf,

    /// Patch manifest
    #[arg(short, long, env = "MODJAR_MANIFEST")]
    pub manifest: PathBuf,

    /// Write the patched archive into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Replace the source archive
    #[arg(long)]
    pub in_place: bool,

    /// Run this script instead of the one registered for the archive
    #[arg(long)]
    pub script: Option<String>,

    /// Do not verify the archive checksum
    #[arg(long)]
    pub skip_checksum: bool,

    #[command(flatten)]
    pub cache: CacheArgs,
}

pub fn execute(args: ApplyArgs) -> Result<()> {
    let registry = ArchiveRegistry::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;
    let cache_root = args.cache.cache_root()?;
    let output = match args.output_dir {
        Some(dir) => OutputTarget::Directory(dir),
        None => OutputTarget::InPlace,
    };

    let written = match &args.script {
        Some(id) => {
            let script = registry.script(id)?;
            let checksum = if args.skip_checksum {
                ChecksumPolicy::Skip
            } else {
                match registry.lookup_path(&args.archive) {
                    Ok(entry) => ChecksumPolicy::Verify(entry.md5.clone()),
                    Err(_) => bail!(
                        "{} is not registered, pass --skip-checksum to patch it with '{id}'",
                        args.archive.display()
                    ),
                }
            };
            let request = PatchRequest {
                archive: args.archive.clone(),
                checksum,
                output,
                cache_root,
            };
            pipeline::apply(&request, &*script)
        }
        None => pipeline::apply_registered(
            &registry,
            &args.archive,
            !args.skip_checksum,
            output,
            &cache_root,
        ),
    }
    .with_context(|| format!("Failed to patch {}", args.archive.display()))?;

    println!("{} {}", style("Patched").green().bold(), written.display());
    Ok(())
}
