//! `modjar checksum`

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use modjar_archive::md5_file;
use std::path::PathBuf;

#[derive(Args)]
pub struct ChecksumArgs {
    /// Files to hash
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Expected MD5; fails if any file differs
    #[arg(short, long)]
    pub expect: Option<String>,
}

pub fn execute(args: ChecksumArgs) -> Result<()> {
    let expected = args.expect.as_deref().map(|e| e.trim().to_ascii_lowercase());
    let mut mismatches = 0;

    for file in &args.files {
        let digest = md5_file(file).with_context(|| format!("Failed to hash {}", file.display()))?;
        match &expected {
            Some(expected) if &digest != expected => {
                mismatches += 1;
                println!("{digest}  {} {}", file.display(), style("MISMATCH").red().bold());
            }
            Some(_) => println!("{digest}  {} {}", file.display(), style("OK").green()),
            None => println!("{digest}  {}", file.display()),
        }
    }

    if mismatches > 0 {
        bail!("{mismatches} of {} files did not match", args.files.len());
    }
    Ok(())
}
