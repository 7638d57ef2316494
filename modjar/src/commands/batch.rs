//! `modjar batch`

use super::CacheArgs;
use crate::batch::{self, BatchOptions, Outcome};
use crate::config::ArchiveRegistry;
use crate::utils::create_progress_bar;
use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use std::path::PathBuf;

#[derive(Args)]
pub struct BatchArgs {
    /// Directory containing the archives to patch
    pub source_dir: PathBuf,

    /// Patch manifest
    #[arg(short, long, env = "MODJAR_MANIFEST")]
    pub manifest: PathBuf,

    /// Output directory; archives are written to <OUTPUT_DIR>/<family>/
    #[arg(short, long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Only patch archives of this family
    #[arg(short, long)]
    pub family: Option<String>,

    /// Do not verify archive checksums
    #[arg(long)]
    pub skip_checksum: bool,

    #[command(flatten)]
    pub cache: CacheArgs,
}

pub fn execute(args: BatchArgs, quiet: bool) -> Result<()> {
    let registry = ArchiveRegistry::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest {}", args.manifest.display()))?;

    if let Some(family) = &args.family {
        if !registry.families().contains(family.as_str()) {
            let known: Vec<_> = registry.families().into_iter().collect();
            bail!("Unknown family '{family}' (known: {})", known.join(", "));
        }
    }

    let options = BatchOptions {
        source_dir: args.source_dir.clone(),
        output_dir: args.output_dir.clone(),
        family: args.family.clone(),
        verify: !args.skip_checksum,
        cache_root: args.cache.cache_root()?,
    };

    let total = batch::find_archives(&options.source_dir)?.len();
    let pb = create_progress_bar(total as u64, "Patching", quiet);
    let report = batch::run(&registry, &options, |archive, outcome| {
        let name = archive
            .file_name()
            .map_or_else(|| archive.display().to_string(), |n| n.to_string_lossy().into_owned());
        match outcome {
            Outcome::Patched(output) => {
                pb.println(format!("{} {name} -> {}", style("✓").green(), output.display()));
            }
            Outcome::Skipped(reason) => {
                pb.println(format!("{} {name}: {reason}", style("-").dim()));
            }
            Outcome::Failed(e) => {
                pb.println(format!("{} {name}: {e}", style("✗").red()));
            }
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if !quiet {
        println!("\n📊 Results:");
        println!("  Patched: {}", report.succeeded());
        println!("  Skipped: {}", report.skipped());
        println!("  Failed:  {}", report.failed());
    }

    if report.failed() > 0 {
        bail!("{} archives failed to patch", report.failed());
    }
    if report.succeeded() == 0 {
        bail!("No archives were patched in {}", args.source_dir.display());
    }
    Ok(())
}
