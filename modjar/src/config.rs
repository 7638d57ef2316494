//! Patch manifest and archive registry
//!
//! A manifest is a TOML file naming the archives the tool knows how to
//! patch and the scripts that patch them:
//!
//! ```toml
//! [[archives]]
//! file = "immersive_aircraft-1.4.0+1.20.1-forge.jar"
//! family = "immersive_aircraft"
//! md5 = "f49ff767f611a95f9bd29a0e9977d9d5"
//! script = "immersive_aircraft_1201"
//!
//! [scripts.immersive_aircraft_1201]
//! description = "Block-tier recipes"
//!
//! [[scripts.immersive_aircraft_1201.steps]]
//! op = "modify_recipe"
//! path = "data/immersive_aircraft/recipes/hull.json"
//! update = { I = "minecraft:iron_block" }
//! ```
//!
//! Custom palettes may be declared under `[palettes.<name>]` and are
//! available to `recolor` steps alongside the built-in versions.
//!
//! The loaded [`ArchiveRegistry`] is immutable.

use crate::error::{Error, Result};
use crate::script::{ScriptContext, ScriptSpec};
use indexmap::IndexMap;
use modjar_texture::palette::STOP_COUNT;
use modjar_texture::{Palette, PaletteRegistry, Rgb};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One archive the registry knows how to patch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchiveEntry {
    /// Archive file name, without directories
    pub file: String,
    /// Mod family, used to filter batch runs
    pub family: String,
    /// Expected MD5 of the unmodified archive, lowercase hex
    pub md5: String,
    /// Id of the script that patches it
    pub script: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PaletteSpec {
    stops: [Rgb; STOP_COUNT],
    scale: f64,
    bias: f64,
    gamma: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    archives: Vec<ArchiveEntry>,
    #[serde(default)]
    scripts: IndexMap<String, ScriptSpec>,
    #[serde(default)]
    palettes: IndexMap<String, PaletteSpec>,
}

/// Immutable lookup table from archive file names to patch scripts
#[derive(Debug, Clone)]
pub struct ArchiveRegistry {
    base_dir: PathBuf,
    archives: IndexMap<String, ArchiveEntry>,
    scripts: IndexMap<String, Arc<ScriptSpec>>,
    palettes: Arc<PaletteRegistry>,
}

impl ArchiveRegistry {
    /// Load a manifest file
    ///
    /// Asset paths in scripts resolve against the manifest's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let manifest: ManifestFile = toml::from_str(&text).map_err(|source| Error::ManifestSyntax {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::build(manifest, base_dir)?;
        log::info!(
            "Loaded manifest {} ({} archives, {} scripts)",
            path.display(),
            registry.archives.len(),
            registry.scripts.len()
        );
        Ok(registry)
    }

    /// Parse a manifest held in memory
    pub fn from_toml_str<P: Into<PathBuf>>(text: &str, base_dir: P) -> Result<Self> {
        let manifest: ManifestFile = toml::from_str(text).map_err(|source| Error::ManifestSyntax {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::build(manifest, base_dir.into())
    }

    fn build(manifest: ManifestFile, base_dir: PathBuf) -> Result<Self> {
        let mut palettes = PaletteRegistry::builtin();
        for (name, spec) in manifest.palettes {
            palettes.register(Palette::new(name, spec.stops, spec.scale, spec.bias, spec.gamma)?);
        }
        let palettes = Arc::new(palettes);

        let mut scripts = IndexMap::with_capacity(manifest.scripts.len());
        for (id, mut script) in manifest.scripts {
            script.validate(&id, &palettes)?;
            script.context = ScriptContext::new(base_dir.clone(), Arc::clone(&palettes));
            scripts.insert(id, Arc::new(script));
        }

        let mut archives = IndexMap::with_capacity(manifest.archives.len());
        for mut entry in manifest.archives {
            if entry.file.is_empty() || entry.file.contains(['/', '\\']) {
                return Err(Error::invalid_manifest(format!(
                    "archive file '{}' must be a bare file name",
                    entry.file
                )));
            }
            if entry.md5.len() != 32 || !entry.md5.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::invalid_manifest(format!(
                    "archive '{}' has an invalid md5 '{}'",
                    entry.file, entry.md5
                )));
            }
            if !scripts.contains_key(&entry.script) {
                return Err(Error::invalid_manifest(format!(
                    "archive '{}' refers to undefined script '{}'",
                    entry.file, entry.script
                )));
            }
            entry.md5.make_ascii_lowercase();
            if archives.contains_key(&entry.file) {
                return Err(Error::invalid_manifest(format!(
                    "archive '{}' is listed twice",
                    entry.file
                )));
            }
            archives.insert(entry.file.clone(), entry);
        }

        Ok(Self {
            base_dir,
            archives,
            scripts,
            palettes,
        })
    }

    /// Directory that script asset paths are relative to
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Registered archives in manifest order
    pub fn archives(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.archives.values()
    }

    /// Distinct families, sorted
    pub fn families(&self) -> BTreeSet<&str> {
        self.archives.values().map(|a| a.family.as_str()).collect()
    }

    /// Look up an archive by its file name
    pub fn lookup(&self, file_name: &str) -> Result<&ArchiveEntry> {
        self.archives
            .get(file_name)
            .ok_or_else(|| Error::UnknownArchive(file_name.to_string()))
    }

    /// Look up the registry entry for an archive path
    pub fn lookup_path(&self, archive: &Path) -> Result<&ArchiveEntry> {
        let name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::UnknownArchive(archive.display().to_string()))?;
        self.lookup(name)
    }

    /// Script by id
    pub fn script(&self, id: &str) -> Result<Arc<ScriptSpec>> {
        self.scripts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownScript(id.to_string()))
    }

    /// Script ids in manifest order
    pub fn script_ids(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }

    /// Palettes available to recolor steps
    pub fn palettes(&self) -> &PaletteRegistry {
        &self.palettes
    }
}
