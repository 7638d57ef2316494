//! Command implementations

pub mod apply;
pub mod batch;
pub mod checksum;
pub mod inspect;
pub mod recolor;

use anyhow::{Context, Result};
use clap::Args;
use modjar_archive::default_cache_root;
use std::path::PathBuf;

/// Workspace location shared by patching commands
#[derive(Args, Debug, Clone, Default)]
pub struct CacheArgs {
    /// Directory for extraction workspaces [default: per-user cache]
    #[arg(long, env = "MODJAR_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl CacheArgs {
    /// The configured cache root, or the per-user default
    pub fn cache_root(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_root().context("Pass --cache-dir or set MODJAR_CACHE_DIR"),
        }
    }
}
