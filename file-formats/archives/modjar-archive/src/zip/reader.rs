//! Reading ZIP archives

use super::header::{
    CentralDirectoryEntry, CompressionMethod, EndOfCentralDirectory, skip_local_header,
};
use crate::security::validate_entry_name;
use crate::{Error, Result};
use flate2::read::DeflateDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access reader over a ZIP archive
#[derive(Debug)]
pub struct ZipReader<R> {
    reader: R,
    entries: Vec<CentralDirectoryEntry>,
}

impl ZipReader<BufReader<File>> {
    /// Open an archive file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipReader<R> {
    /// Read the central directory of an archive
    pub fn new(mut reader: R) -> Result<Self> {
        let (eocd, _) = EndOfCentralDirectory::find(&mut reader)?;
        reader.seek(SeekFrom::Start(u64::from(eocd.directory_offset)))?;

        let mut directory = vec![0u8; eocd.directory_size as usize];
        reader.read_exact(&mut directory)?;
        let mut cursor = directory.as_slice();

        let mut entries = Vec::with_capacity(usize::from(eocd.entry_count));
        for _ in 0..eocd.entry_count {
            entries.push(CentralDirectoryEntry::read(&mut cursor)?);
        }
        log::debug!("Read central directory with {} entries", entries.len());

        Ok(Self { reader, entries })
    }

    /// Central directory entries in archive order
    pub fn entries(&self) -> &[CentralDirectoryEntry] {
        &self.entries
    }

    /// Read and verify the data of one entry
    pub fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(index)
            .ok_or_else(|| Error::invalid_format(format!("no entry at index {index}")))?
            .clone();

        if entry.is_encrypted() {
            return Err(Error::unsupported(format!("encrypted entry '{}'", entry.name)));
        }
        let method = CompressionMethod::from_raw(entry.method).ok_or_else(|| {
            Error::unsupported(format!(
                "compression method {} for '{}'",
                entry.method, entry.name
            ))
        })?;

        // Sizes come from the central directory so entries written with
        // data descriptors read correctly.
        self.reader
            .seek(SeekFrom::Start(u64::from(entry.local_header_offset)))?;
        skip_local_header(&mut self.reader)?;
        let mut raw = (&mut self.reader).take(u64::from(entry.compressed_size));

        let mut data = Vec::with_capacity(entry.uncompressed_size as usize);
        match method {
            CompressionMethod::Stored => {
                raw.read_to_end(&mut data)?;
            }
            CompressionMethod::Deflate => {
                DeflateDecoder::new(raw)
                    .read_to_end(&mut data)
                    .map_err(|e| {
                        Error::invalid_format(format!("corrupt DEFLATE data in '{}': {e}", entry.name))
                    })?;
            }
        }

        if data.len() as u64 != u64::from(entry.uncompressed_size) {
            return Err(Error::invalid_format(format!(
                "'{}' decompressed to {} bytes, expected {}",
                entry.name,
                data.len(),
                entry.uncompressed_size
            )));
        }
        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            return Err(Error::CrcMismatch {
                entry: entry.name,
                expected: entry.crc32,
                actual,
            });
        }
        Ok(data)
    }

    /// Extract every entry below `dest`, returning the number of files written
    ///
    /// Entry names are validated before anything is written for them.
    pub fn extract_all(&mut self, dest: &Path) -> Result<usize> {
        let mut files = 0;
        for index in 0..self.entries.len() {
            let name = self.entries[index].name.clone();
            let target = dest.join(validate_entry_name(&name)?);

            if self.entries[index].is_dir() {
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                continue;
            }

            let data = self.read_entry(index)?;
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
            fs::write(&target, data).map_err(|e| Error::io(&target, e))?;
            log::trace!("Extracted {name}");
            files += 1;
        }
        Ok(files)
    }
}
