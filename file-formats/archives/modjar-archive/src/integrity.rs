//! Archive checksum gate
//!
//! Patching only ever starts from a known-good archive. The MD5 of the
//! exact file bytes is compared against the value recorded for that
//! archive; a mismatch stops the pipeline before anything is extracted.

use crate::error::{Error, Result};
use md5::{Digest, Md5};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size for hashing
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Whether to check the source archive before patching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumPolicy {
    /// Require the archive MD5 to equal this hex digest (case-insensitive)
    Verify(String),
    /// Skip the check
    Skip,
}

impl ChecksumPolicy {
    /// Apply the policy to an archive
    pub fn enforce<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match self {
            Self::Verify(expected) => verify_checksum(path, expected),
            Self::Skip => {
                log::debug!("Skipping checksum for {}", path.as_ref().display());
                Ok(())
            }
        }
    }
}

/// MD5 of everything readable from `reader`, as lowercase hex
pub fn md5_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// MD5 of a file, as lowercase hex
pub fn md5_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::io(path, e)
        }
    })?;
    md5_reader(file).map_err(|e| Error::io(path, e))
}

/// Fail with [`Error::Integrity`] unless the file's MD5 equals `expected`
pub fn verify_checksum<P: AsRef<Path>>(path: P, expected: &str) -> Result<()> {
    let path = path.as_ref();
    let expected = expected.trim().to_ascii_lowercase();
    let actual = md5_file(path)?;
    if actual == expected {
        log::debug!("Checksum ok for {}: {actual}", path.display());
        Ok(())
    } else {
        Err(Error::Integrity {
            path: path.to_path_buf(),
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // md5("hello world")
    const HELLO: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    fn hello_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_md5_empty_and_known() {
        assert_eq!(
            md5_reader(&b""[..]).unwrap(),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(md5_file(hello_file().path()).unwrap(), HELLO);
    }

    #[test]
    fn test_md5_spans_chunks() {
        let data = vec![0xABu8; CHUNK_SIZE * 2 + 17];
        let mut hasher = Md5::new();
        hasher.update(&data);
        assert_eq!(
            md5_reader(&data[..]).unwrap(),
            hex::encode(hasher.finalize())
        );
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let file = hello_file();
        verify_checksum(file.path(), HELLO).unwrap();
        verify_checksum(file.path(), &format!("  {}\n", HELLO.to_uppercase())).unwrap();
    }

    #[test]
    fn test_mismatch_reports_both_digests() {
        let file = hello_file();
        match verify_checksum(file.path(), &"0".repeat(32)).unwrap_err() {
            Error::Integrity {
                expected, actual, ..
            } => {
                assert_eq!(expected, "0".repeat(32));
                assert_eq!(actual, HELLO);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_policy() {
        let file = hello_file();
        ChecksumPolicy::Skip.enforce(file.path()).unwrap();
        ChecksumPolicy::Verify(HELLO.into()).enforce(file.path()).unwrap();
        assert!(
            ChecksumPolicy::Verify("bad".into())
                .enforce(file.path())
                .is_err()
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = md5_file(dir.path().join("missing.jar")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
