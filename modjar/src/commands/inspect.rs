//! `modjar inspect`

use crate::config::ArchiveRegistry;
use crate::utils::{add_table_row, create_table, format_bytes, format_compression_ratio};
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use modjar_archive::md5_file;
use modjar_archive::zip::ZipReader;
use std::fs;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// Archive to inspect
    pub archive: PathBuf,

    /// Manifest to look the archive up in
    #[arg(short, long, env = "MODJAR_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// List every entry
    #[arg(short, long)]
    pub entries: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let path = &args.archive;
    let size = fs::metadata(path)
        .with_context(|| format!("Cannot read {}", path.display()))?
        .len();
    let digest = md5_file(path)?;
    let reader = ZipReader::open(path)
        .with_context(|| format!("Failed to read archive {}", path.display()))?;

    let files: Vec<_> = reader.entries().iter().filter(|e| !e.is_dir()).collect();
    let packed: u64 = files.iter().map(|e| u64::from(e.compressed_size)).sum();
    let unpacked: u64 = files.iter().map(|e| u64::from(e.uncompressed_size)).sum();

    println!("\n{}", style("Archive Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Size: {}", format_bytes(size));
    println!("MD5: {digest}");
    println!(
        "Entries: {} files ({} unpacked, {} saved)",
        files.len(),
        format_bytes(unpacked),
        format_compression_ratio(unpacked, packed)
    );

    if let Some(manifest) = &args.manifest {
        let registry = ArchiveRegistry::load(manifest)
            .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
        println!("\n{}", style("Registry").bold().underlined());
        match registry.lookup_path(path) {
            Ok(entry) => {
                let verdict = if entry.md5 == digest {
                    style("matches").green()
                } else {
                    style("differs").red()
                };
                println!("Family: {}", style(&entry.family).yellow());
                println!("Script: {}", entry.script);
                println!("Checksum: {verdict} (expected {})", entry.md5);
                let script = registry.script(&entry.script)?;
                if let Some(description) = &script.description {
                    println!("Description: {description}");
                }
                for (index, step) in script.steps.iter().enumerate() {
                    println!("  {index:>3}. {}", step.op());
                }
            }
            Err(e) => println!("{}", style(e).dim()),
        }
    }

    if args.entries {
        let mut table = create_table(&["Name", "Size", "Packed", "Saved"]);
        for entry in &files {
            let size = u64::from(entry.uncompressed_size);
            let packed = u64::from(entry.compressed_size);
            add_table_row(
                &mut table,
                &[
                    entry.name.clone(),
                    format_bytes(size),
                    format_bytes(packed),
                    format_compression_ratio(size, packed),
                ],
            );
        }
        println!();
        table.printstd();
    }
    Ok(())
}
