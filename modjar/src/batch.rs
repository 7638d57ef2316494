//! Patching every known archive in a directory

use crate::config::ArchiveRegistry;
use crate::error::{Error, Result};
use crate::pipeline::apply_registered;
use glob::{Pattern, glob};
use modjar_archive::OutputTarget;
use std::path::{Path, PathBuf};

/// Batch run settings
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory scanned for `*.jar` files (not recursive)
    pub source_dir: PathBuf,
    /// Patched archives are written to `<output_dir>/<family>/<file>`
    pub output_dir: PathBuf,
    /// Only patch archives of this family
    pub family: Option<String>,
    /// Verify each archive's MD5 before patching
    pub verify: bool,
    /// Directory workspaces are created under
    pub cache_root: PathBuf,
}

/// What happened to one archive
#[derive(Debug)]
pub enum Outcome {
    /// Written to this path
    Patched(PathBuf),
    /// Not patched, for this reason
    Skipped(String),
    /// Patching failed
    Failed(Error),
}

/// Per-archive results of a batch run, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Archive path and outcome
    pub outcomes: Vec<(PathBuf, Outcome)>,
}

impl BatchReport {
    /// Archives patched successfully
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Patched(_)))
    }

    /// Archives not in the registry or outside the selected family
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Archives that failed
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// True when nothing failed and at least one archive was patched
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.succeeded() > 0
    }

    fn count<F: Fn(&Outcome) -> bool>(&self, pred: F) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// `*.jar` files directly inside `dir`, sorted by path
pub fn find_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(modjar_archive::Error::NotADirectory(dir.to_path_buf()).into());
    }
    let pattern = format!("{}/*.jar", Pattern::escape(&dir.to_string_lossy()));

    let mut archives = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry.map_err(|e| Error::io(e.path().to_path_buf(), e.into_error()))?;
        if path.is_file() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Patch every registered archive in `options.source_dir`
///
/// Failures are recorded and the run continues with the next archive.
/// `on_outcome` is called after each archive.
pub fn run<F>(registry: &ArchiveRegistry, options: &BatchOptions, mut on_outcome: F) -> Result<BatchReport>
where
    F: FnMut(&Path, &Outcome),
{
    let archives = find_archives(&options.source_dir)?;
    log::info!(
        "Found {} archives in {}",
        archives.len(),
        options.source_dir.display()
    );

    let mut report = BatchReport::default();
    for archive in archives {
        let outcome = patch_one(registry, options, &archive);
        match &outcome {
            Outcome::Patched(output) => log::info!("Patched {}", output.display()),
            Outcome::Skipped(reason) => log::info!("Skipped {}: {reason}", archive.display()),
            Outcome::Failed(e) => log::error!("Failed {}: {e}", archive.display()),
        }
        on_outcome(&archive, &outcome);
        report.outcomes.push((archive, outcome));
    }
    Ok(report)
}

fn patch_one(registry: &ArchiveRegistry, options: &BatchOptions, archive: &Path) -> Outcome {
    let entry = match registry.lookup_path(archive) {
        Ok(entry) => entry,
        Err(e @ Error::UnknownArchive(_)) => return Outcome::Skipped(e.to_string()),
        Err(e) => return Outcome::Failed(e),
    };
    if let Some(family) = &options.family {
        if &entry.family != family {
            return Outcome::Skipped(format!("belongs to family '{}'", entry.family));
        }
    }

    let output = OutputTarget::Directory(options.output_dir.join(&entry.family));
    match apply_registered(
        registry,
        archive,
        options.verify,
        output,
        &options.cache_root,
    ) {
        Ok(path) => Outcome::Patched(path),
        Err(e) => Outcome::Failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_archives_sorted_and_flat() {
        let dir = TempDir::new().unwrap();
        for name in ["b.jar", "a.jar", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.jar"), b"").unwrap();

        let names: Vec<_> = find_archives(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jar", "b.jar"]);
    }

    #[test]
    fn test_find_archives_escapes_directory_name() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("mods [1.20]");
        fs::create_dir(&odd).unwrap();
        fs::write(odd.join("x.jar"), b"").unwrap();
        assert_eq!(find_archives(&odd).unwrap().len(), 1);
    }

    #[test]
    fn test_find_archives_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(find_archives(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_report_success_rules() {
        let mut report = BatchReport::default();
        assert!(!report.is_success());

        report
            .outcomes
            .push(("a.jar".into(), Outcome::Skipped("unknown".into())));
        assert!(!report.is_success());

        report
            .outcomes
            .push(("b.jar".into(), Outcome::Patched("out/b.jar".into())));
        assert!(report.is_success());

        report.outcomes.push((
            "c.jar".into(),
            Outcome::Failed(Error::UnknownScript("x".into())),
        ));
        assert!(!report.is_success());
        assert_eq!(
            (report.succeeded(), report.skipped(), report.failed()),
            (1, 1, 1)
        );
    }
}
