//! `modjar recolor`

use crate::config::ArchiveRegistry;
use anyhow::{Context, Result};
use clap::Args;
use modjar_texture::{PaletteRegistry, recolor_file};
use std::path::PathBuf;

#[derive(Args)]
pub struct RecolorArgs {
    /// Image to recolor
    pub input: PathBuf,

    /// Where to write the result [default: overwrite INPUT]
    pub output: Option<PathBuf>,

    /// Palette version
    #[arg(short, long, default_value = "v7")]
    pub palette: String,

    /// Manifest declaring additional palettes
    #[arg(short, long, env = "MODJAR_MANIFEST")]
    pub manifest: Option<PathBuf>,
}

pub fn execute(args: RecolorArgs) -> Result<()> {
    let registry = match &args.manifest {
        Some(path) => ArchiveRegistry::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display()))?
            .palettes()
            .clone(),
        None => PaletteRegistry::builtin(),
    };
    let palette = registry.get(&args.palette)?;
    let output = args.output.as_ref().unwrap_or(&args.input);

    let stats = recolor_file(&args.input, output, palette)
        .with_context(|| format!("Failed to recolor {}", args.input.display()))?;

    println!(
        "Recolored {} of {} pixels with {} -> {}",
        stats.recolored,
        stats.pixels,
        palette.name(),
        output.display()
    );
    Ok(())
}
