//! Root CLI structure for modjar

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "modjar")]
#[command(about = "Verify, patch and repack Minecraft mod archives", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Patch one archive with its registered script
    Apply(crate::commands::apply::ApplyArgs),

    /// Patch every registered archive in a directory
    Batch(crate::commands::batch::BatchArgs),

    /// Print or verify MD5 checksums
    Checksum(crate::commands::checksum::ChecksumArgs),

    /// Recolor an image through a palette
    Recolor(crate::commands::recolor::RecolorArgs),

    /// Show an archive's contents and registry status
    Inspect(crate::commands::inspect::InspectArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
