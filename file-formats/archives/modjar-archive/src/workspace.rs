//! Scratch workspace for patching one archive
//!
//! A [`Workspace`] is a private directory holding the extracted contents of
//! one archive. Its location is derived from the archive's absolute path,
//! so repeated runs on the same archive reuse the same directory, but it is
//! always cleared before extraction. Dropping the workspace deletes it.
//!
//! All file helpers take `/`-separated paths relative to the workspace root
//! and refuse anything that would resolve outside it.

use crate::error::{Error, Result};
use crate::path::entry_name_from_path;
use crate::security::check_relative_path;
use crate::zip::{ZipReader, ZipWriter};
use directories::ProjectDirs;
use modjar_data::RecipePatch;
use modjar_data::store::{self, JsonStyle, LangTable};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Hex characters of the path digest used as the workspace directory name
pub const WORKSPACE_NAME_LEN: usize = 16;

/// The per-user cache directory workspaces are created under
pub fn default_cache_root() -> Result<PathBuf> {
    ProjectDirs::from("", "", "modjar")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or(Error::NoCacheDirectory)
}

/// Stable directory name for an archive's workspace
///
/// The first 16 hex characters of the SHA-256 of the absolute path.
pub fn workspace_dir_name(archive: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(archive.as_os_str().as_encoded_bytes());
    let mut name = hex::encode(hasher.finalize());
    name.truncate(WORKSPACE_NAME_LEN);
    name
}

/// Where a patched archive is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Atomically replace the source archive
    InPlace,
    /// Write a file with the source's name into this directory
    Directory(PathBuf),
}

impl OutputTarget {
    /// The output path for a given source archive
    pub fn resolve(&self, source: &Path) -> Result<PathBuf> {
        match self {
            Self::InPlace => Ok(source.to_path_buf()),
            Self::Directory(dir) => source
                .file_name()
                .map(|name| dir.join(name))
                .ok_or_else(|| Error::NotFound(source.to_path_buf())),
        }
    }
}

/// Extracted archive contents under the cache root
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    source: PathBuf,
    json_style: JsonStyle,
    discarded: bool,
}

impl Workspace {
    /// Create a fresh workspace for `archive` and extract it
    ///
    /// Any leftover directory from an earlier run is removed first. On
    /// failure the workspace directory is removed again.
    pub fn prepare<P: AsRef<Path>>(archive: P, cache_root: &Path) -> Result<Self> {
        let archive = archive.as_ref();
        let source = fs::canonicalize(archive).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(archive.to_path_buf())
            } else {
                Error::io(archive, e)
            }
        })?;
        let root = cache_root.join(workspace_dir_name(&source));

        if root.exists() {
            log::debug!("Clearing stale workspace {}", root.display());
            fs::remove_dir_all(&root).map_err(|e| Error::io(&root, e))?;
        }
        fs::create_dir_all(&root).map_err(|e| Error::io(&root, e))?;

        let workspace = Self {
            root,
            source,
            json_style: JsonStyle::default(),
            discarded: false,
        };

        let files = ZipReader::open(&workspace.source)
            .and_then(|mut reader| reader.extract_all(&workspace.root))
            .map_err(|e| Error::extraction(&workspace.source, e))?;

        log::info!(
            "Extracted {files} files from {} into {}",
            workspace.source.display(),
            workspace.root.display()
        );
        Ok(workspace)
    }

    /// Workspace directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical path of the source archive
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// JSON style used by [`write_json`](Self::write_json) and recipe edits
    pub fn json_style(&self) -> JsonStyle {
        self.json_style
    }

    /// Change the JSON style for subsequent writes
    pub fn set_json_style(&mut self, style: JsonStyle) {
        self.json_style = style;
    }

    /// Absolute path of a workspace-relative path
    pub fn resolve(&self, rel: &str) -> Result<PathBuf> {
        check_relative_path(rel)
            .map(|path| self.root.join(path))
            .map_err(|reason| Error::PathEscapesWorkspace {
                path: rel.to_string(),
                reason,
            })
    }

    /// Whether a workspace-relative path exists
    pub fn exists(&self, rel: &str) -> Result<bool> {
        Ok(self.resolve(rel)?.exists())
    }

    fn resolve_for_write(&self, rel: &str) -> Result<PathBuf> {
        let path = self.resolve(rel)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        Ok(path)
    }

    /// Read a JSON document
    pub fn read_json(&self, rel: &str) -> Result<Value> {
        Ok(store::read_json(self.resolve(rel)?)?)
    }

    /// Write a JSON document with the workspace style
    pub fn write_json(&self, rel: &str, value: &Value) -> Result<()> {
        self.write_json_with(rel, value, self.json_style)
    }

    /// Write a JSON document with an explicit style
    pub fn write_json_with(&self, rel: &str, value: &Value, style: JsonStyle) -> Result<()> {
        Ok(store::write_json(self.resolve_for_write(rel)?, value, style)?)
    }

    /// Read a TOML document
    pub fn read_toml(&self, rel: &str) -> Result<toml::Table> {
        Ok(store::read_toml(self.resolve(rel)?)?)
    }

    /// Write a TOML document
    pub fn write_toml(&self, rel: &str, doc: &toml::Table) -> Result<()> {
        Ok(store::write_toml(self.resolve_for_write(rel)?, doc)?)
    }

    /// Read a `.lang` table
    pub fn read_lang(&self, rel: &str) -> Result<LangTable> {
        Ok(store::read_lang(self.resolve(rel)?)?)
    }

    /// Write a `.lang` table
    pub fn write_lang(&self, rel: &str, table: &LangTable) -> Result<()> {
        Ok(store::write_lang(self.resolve_for_write(rel)?, table)?)
    }

    /// Apply a recipe patch to a recipe file
    ///
    /// The file is left untouched unless the patched recipe validates.
    pub fn modify_recipe(&self, rel: &str, patch: &RecipePatch) -> Result<()> {
        let path = self.resolve(rel)?;
        let recipe = store::read_json(&path)?;
        let patched = patch.apply(rel, &recipe)?;
        store::write_json(&path, &patched, self.json_style)?;
        log::debug!("Patched recipe {rel}");
        Ok(())
    }

    /// Delete regular files directly inside `dir` whose name is not in `keep`
    pub fn remove_entries_keeping<S: AsRef<str>>(&self, dir: &str, keep: &[S]) -> Result<usize> {
        self.remove_files_where(dir, |name| !keep.iter().any(|k| k.as_ref() == name))
    }

    /// Delete regular files directly inside `dir` whose name is in `delete`
    pub fn remove_entries_matching<S: AsRef<str>>(
        &self,
        dir: &str,
        delete: &[S],
    ) -> Result<usize> {
        self.remove_files_where(dir, |name| delete.iter().any(|d| d.as_ref() == name))
    }

    fn remove_files_where<F: Fn(&str) -> bool>(&self, dir: &str, doomed: F) -> Result<usize> {
        let path = self.resolve(dir)?;
        if !path.is_dir() {
            return Err(Error::NotADirectory(path));
        }

        let mut removed = 0;
        for entry in fs::read_dir(&path).map_err(|e| Error::io(&path, e))? {
            let entry = entry.map_err(|e| Error::io(&path, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| Error::io(entry.path(), e))?
                .is_file();
            if !is_file {
                continue;
            }
            let name = entry.file_name();
            if doomed(&name.to_string_lossy()) {
                fs::remove_file(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
                removed += 1;
            }
        }

        log::debug!("Removed {removed} files from {dir}");
        Ok(removed)
    }

    /// Delete a file or directory tree; returns whether anything was removed
    pub fn remove_subtree(&self, rel: &str) -> Result<bool> {
        let path = self.resolve(rel)?;
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        match result {
            Ok(()) => {
                log::debug!("Removed {rel}");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Read a file's raw bytes
    pub fn read_bytes(&self, rel: &str) -> Result<Vec<u8>> {
        let path = self.resolve(rel)?;
        fs::read(&path).map_err(|e| Error::io(path, e))
    }

    /// Write raw bytes, creating parent directories
    pub fn write_bytes(&self, rel: &str, data: &[u8]) -> Result<()> {
        let path = self.resolve_for_write(rel)?;
        fs::write(&path, data).map_err(|e| Error::io(path, e))
    }

    /// Copy an external file into the workspace
    pub fn copy_in<P: AsRef<Path>>(&self, external: P, rel: &str) -> Result<u64> {
        let external = external.as_ref();
        let path = self.resolve_for_write(rel)?;
        fs::copy(external, &path).map_err(|e| Error::io(external, e))
    }

    /// Entry names of all regular files, sorted
    pub fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            names.push(self.entry_name(entry.path())?);
        }
        Ok(names)
    }

    fn entry_name(&self, path: &Path) -> Result<String> {
        path.strip_prefix(&self.root)
            .ok()
            .and_then(entry_name_from_path)
            .ok_or_else(|| {
                Error::invalid_format(format!("cannot name archive entry for {}", path.display()))
            })
    }

    /// Repack the workspace into `output`, returning the number of entries
    ///
    /// The archive is written to a temporary file next to `output`, synced,
    /// and renamed over it, so `output` either keeps its old contents or
    /// holds the complete new archive. The output carries the source
    /// archive's permissions. The parent directory is created if needed.
    pub fn publish<P: AsRef<Path>>(&self, output: P) -> Result<usize> {
        let output = output.as_ref();
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
        let count = {
            let mut writer = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
            for entry in WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
            {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = self.entry_name(entry.path())?;
                let data = fs::read(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
                writer.add_file(&name, &data)?;
            }
            let count = writer.len();
            writer.finish()?;
            count
        };
        // Temp files are created owner-only; the patched archive takes the source's mode
        let permissions = fs::metadata(&self.source)
            .map_err(|e| Error::io(&self.source, e))?
            .permissions();
        temp.as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(temp.path(), e))?;

        if output == self.source {
            log::info!("Replacing {} in place", output.display());
        }
        temp.persist(output)
            .map_err(|e| Error::io(output, e.error))?;

        log::info!("Wrote {count} entries to {}", output.display());
        Ok(count)
    }

    /// Delete the workspace directory
    pub fn discard(mut self) -> Result<()> {
        self.discarded = true;
        self.remove_root()
    }

    fn remove_root(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                log::debug!("Discarded workspace {}", self.root.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(&self.root, e)),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.discarded {
            if let Err(e) = self.remove_root() {
                log::warn!("Failed to remove workspace: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn jar(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("test.jar");
        let mut writer = ZipWriter::new(fs::File::create(&path).unwrap());
        for (name, data) in files {
            writer.add_file(name, data).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_dir_name_is_stable() {
        let a = workspace_dir_name(Path::new("/mods/a.jar"));
        assert_eq!(a.len(), WORKSPACE_NAME_LEN);
        assert_eq!(a, workspace_dir_name(Path::new("/mods/a.jar")));
        assert_ne!(a, workspace_dir_name(Path::new("/mods/b.jar")));
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_output_target() {
        let source = Path::new("/mods/a.jar");
        assert_eq!(OutputTarget::InPlace.resolve(source).unwrap(), source);
        assert_eq!(
            OutputTarget::Directory(PathBuf::from("/out"))
                .resolve(source)
                .unwrap(),
            Path::new("/out").join("a.jar")
        );
    }

    #[test]
    fn test_prepare_extracts_and_drop_discards() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let path = jar(dir.path(), &[("a/b.txt", b"x"), ("pack.mcmeta", b"{}")]);

        let root = {
            let ws = Workspace::prepare(&path, cache.path()).unwrap();
            assert_eq!(ws.entries().unwrap(), vec!["a/b.txt", "pack.mcmeta"]);
            assert_eq!(ws.read_bytes("a/b.txt").unwrap(), b"x");
            ws.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn test_prepare_clears_stale_content() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let path = jar(dir.path(), &[("a.txt", b"x")]);

        let stale = cache
            .path()
            .join(workspace_dir_name(&fs::canonicalize(&path).unwrap()));
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.txt"), b"old").unwrap();

        let ws = Workspace::prepare(&path, cache.path()).unwrap();
        assert_eq!(ws.root(), stale);
        assert_eq!(ws.entries().unwrap(), vec!["a.txt"]);
        ws.discard().unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_prepare_missing_archive() {
        let cache = TempDir::new().unwrap();
        let err = Workspace::prepare(cache.path().join("nope.jar"), cache.path()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let path = dir.path().join("garbage.jar");
        fs::write(&path, b"this is not a zip archive at all").unwrap();

        let err = Workspace::prepare(&path, cache.path()).unwrap_err();
        assert!(matches!(err, Error::Extraction { .. }));
        assert!(err.is_corruption());
        // The failed workspace is removed again
        assert_eq!(fs::read_dir(cache.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let ws = Workspace::prepare(jar(dir.path(), &[("a.txt", b"x")]), cache.path()).unwrap();

        for bad in ["../a.txt", "/etc/passwd", "x/../../y", ""] {
            assert!(
                matches!(ws.resolve(bad), Err(Error::PathEscapesWorkspace { .. })),
                "accepted {bad:?}"
            );
        }
        assert_eq!(ws.resolve("a.txt").unwrap(), ws.root().join("a.txt"));
    }

    #[test]
    fn test_remove_entries() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let path = jar(
            dir.path(),
            &[
                ("r/a.json", b"{}"),
                ("r/b.json", b"{}"),
                ("r/c.json", b"{}"),
                ("r/sub/d.json", b"{}"),
            ],
        );
        let ws = Workspace::prepare(&path, cache.path()).unwrap();

        assert_eq!(ws.remove_entries_keeping("r", &["a.json", "b.json"]).unwrap(), 1);
        assert_eq!(ws.remove_entries_matching("r", &["b.json", "zzz.json"]).unwrap(), 1);
        assert_eq!(ws.entries().unwrap(), vec!["r/a.json", "r/sub/d.json"]);

        assert!(matches!(
            ws.remove_entries_keeping("r/a.json", &["a.json"]),
            Err(Error::NotADirectory(_))
        ));

        assert!(ws.remove_subtree("r/sub").unwrap());
        assert!(!ws.remove_subtree("r/sub").unwrap());
        assert_eq!(ws.entries().unwrap(), vec!["r/a.json"]);
    }

    #[test]
    fn test_structured_helpers() {
        let dir = TempDir::new().unwrap();
        let cache = TempDir::new().unwrap();
        let ws = Workspace::prepare(jar(dir.path(), &[("a.txt", b"x")]), cache.path()).unwrap();

        let value = json!({ "pe.emc.name": "Coins" });
        ws.write_json("assets/pe/lang/en_us.json", &value).unwrap();
        assert_eq!(ws.read_json("assets/pe/lang/en_us.json").unwrap(), value);

        let mut lang = LangTable::new();
        lang.insert("k".to_string(), "v=w".to_string());
        ws.write_lang("assets/pe/lang/en_US.lang", &lang).unwrap();
        assert_eq!(ws.read_lang("assets/pe/lang/en_US.lang").unwrap(), lang);

        let mut toml_doc = toml::Table::new();
        toml_doc.insert("modLoader".into(), toml::Value::String("javafml".into()));
        ws.write_toml("META-INF/mods.toml", &toml_doc).unwrap();
        assert_eq!(ws.read_toml("META-INF/mods.toml").unwrap(), toml_doc);

        let external = dir.path().join("gui.png");
        fs::write(&external, b"\x89PNG").unwrap();
        assert_eq!(ws.copy_in(&external, "assets/pe/textures/gui.png").unwrap(), 4);
        assert!(ws.exists("assets/pe/textures/gui.png").unwrap());
    }
}
