//! Writing ZIP archives

use super::header::{
    CentralDirectoryEntry, CompressionMethod, DOS_EPOCH_DATE, EndOfCentralDirectory, FLAG_UTF8,
};
use crate::{Error, Result};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

/// Sequential ZIP writer producing DEFLATE entries
///
/// Every entry is compressed in memory before its local header is written,
/// so no data descriptors are needed and the sink never has to seek. All
/// entries carry the DOS epoch as their timestamp, which keeps repacked
/// archives byte-for-byte reproducible.
#[derive(Debug)]
pub struct ZipWriter<W: Write> {
    writer: W,
    entries: Vec<CentralDirectoryEntry>,
    offset: u64,
    level: Compression,
}

impl<W: Write> ZipWriter<W> {
    /// Create a writer with the default compression level
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            entries: Vec::new(),
            offset: 0,
            level: Compression::default(),
        }
    }

    /// Set the DEFLATE compression level (0-9)
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(9));
        self
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been written
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a file entry
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        if name.is_empty() || name.ends_with('/') {
            return Err(Error::invalid_format(format!("invalid file entry name '{name}'")));
        }
        if self.entries.len() >= usize::from(u16::MAX) - 1 {
            return Err(Error::unsupported("more than 65534 entries (ZIP64)"));
        }

        let mut encoder = DeflateEncoder::new(Vec::new(), self.level);
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let entry = CentralDirectoryEntry {
            name: name.to_string(),
            flags: if name.is_ascii() { 0 } else { FLAG_UTF8 },
            method: CompressionMethod::Deflate.to_raw(),
            mod_time: 0,
            mod_date: DOS_EPOCH_DATE,
            crc32: crc32fast::hash(data),
            compressed_size: zip32(compressed.len() as u64, name)?,
            uncompressed_size: zip32(data.len() as u64, name)?,
            local_header_offset: zip32(self.offset, name)?,
        };

        let mut header = Vec::with_capacity(30 + name.len());
        entry.write_local_header(&mut header)?;
        self.writer.write_all(&header)?;
        self.writer.write_all(&compressed)?;
        self.offset += header.len() as u64 + compressed.len() as u64;

        log::trace!(
            "Added {name}: {} -> {} bytes",
            data.len(),
            compressed.len()
        );
        self.entries.push(entry);
        Ok(())
    }

    /// Write the central directory and end record, returning the sink
    pub fn finish(mut self) -> Result<W> {
        let directory_offset = zip32(self.offset, "central directory")?;
        let mut directory_size = 0u64;
        for entry in &self.entries {
            entry.write(&mut self.writer)?;
            directory_size += entry.written_size();
        }

        EndOfCentralDirectory {
            entry_count: u16::try_from(self.entries.len())
                .map_err(|_| Error::unsupported("too many entries (ZIP64)"))?,
            directory_size: zip32(directory_size, "central directory")?,
            directory_offset,
        }
        .write(&mut self.writer)?;

        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn zip32(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value)
        .ok()
        .filter(|&v| v != u32::MAX)
        .ok_or_else(|| Error::unsupported(format!("'{what}' exceeds 4 GiB (ZIP64)")))
}
