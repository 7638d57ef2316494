//! ZIP record structures and parsing

use crate::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};

/// Local file header signature ('PK\x03\x04')
pub const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;

/// Central directory header signature ('PK\x01\x02')
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;

/// End of central directory signature ('PK\x05\x06')
pub const EOCD_SIGNATURE: u32 = 0x0605_4B50;

/// ZIP64 end of central directory locator signature ('PK\x06\x07')
pub const ZIP64_LOCATOR_SIGNATURE: u32 = 0x0706_4B50;

/// Fixed size of a local file header
pub const LOCAL_HEADER_SIZE: u64 = 30;

/// Fixed size of a central directory header
pub const CENTRAL_HEADER_SIZE: u64 = 46;

/// Fixed size of the end of central directory record
pub const EOCD_SIZE: u64 = 22;

/// Maximum archive comment length, bounding the EOCD search
const MAX_COMMENT_LEN: u64 = u16::MAX as u64;

/// Version needed to extract: 2.0 (DEFLATE)
pub const VERSION_DEFLATE: u16 = 20;

/// General purpose flag: entry is encrypted
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// General purpose flag: name is UTF-8
pub const FLAG_UTF8: u16 = 0x0800;

/// DOS date for 1980-01-01, the earliest representable date
pub const DOS_EPOCH_DATE: u16 = (1 << 5) | 1;

/// Entry compression method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Uncompressed
    Stored,
    /// Raw DEFLATE
    Deflate,
}

impl CompressionMethod {
    /// Create from raw method id
    pub fn from_raw(raw: u16) -> Option<Self> {
        match raw {
            0 => Some(Self::Stored),
            8 => Some(Self::Deflate),
            _ => None,
        }
    }

    /// Raw method id
    pub fn to_raw(self) -> u16 {
        match self {
            Self::Stored => 0,
            Self::Deflate => 8,
        }
    }
}

/// End of central directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectory {
    /// Number of central directory entries
    pub entry_count: u16,
    /// Size of the central directory in bytes
    pub directory_size: u32,
    /// Offset of the central directory from the start of the archive
    pub directory_offset: u32,
}

impl EndOfCentralDirectory {
    /// Locate and read the record by scanning backwards from the end
    pub fn find<R: Read + Seek>(reader: &mut R) -> Result<(Self, u64)> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        if file_len < EOCD_SIZE {
            return Err(Error::invalid_format("file too small to be a ZIP archive"));
        }

        let window = file_len.min(EOCD_SIZE + MAX_COMMENT_LEN);
        let start = file_len - window;
        reader.seek(SeekFrom::Start(start))?;
        let mut tail = vec![0u8; window as usize];
        reader.read_exact(&mut tail)?;

        let sig = EOCD_SIGNATURE.to_le_bytes();
        let pos = (0..=tail.len() - EOCD_SIZE as usize)
            .rev()
            .find(|&i| tail[i..i + 4] == sig)
            .ok_or_else(|| Error::invalid_format("end of central directory not found"))?;
        let eocd_offset = start + pos as u64;

        let mut cursor = &tail[pos + 4..];
        let disk = cursor.read_u16::<LittleEndian>()?;
        let directory_disk = cursor.read_u16::<LittleEndian>()?;
        let disk_entries = cursor.read_u16::<LittleEndian>()?;
        let entry_count = cursor.read_u16::<LittleEndian>()?;
        let directory_size = cursor.read_u32::<LittleEndian>()?;
        let directory_offset = cursor.read_u32::<LittleEndian>()?;

        if disk != 0 || directory_disk != 0 || disk_entries != entry_count {
            return Err(Error::unsupported("multi-disk archives"));
        }
        if entry_count == u16::MAX || directory_size == u32::MAX || directory_offset == u32::MAX {
            return Err(Error::unsupported("ZIP64 archives"));
        }
        if eocd_offset >= 20 {
            reader.seek(SeekFrom::Start(eocd_offset - 20))?;
            if reader.read_u32::<LittleEndian>()? == ZIP64_LOCATOR_SIGNATURE {
                return Err(Error::unsupported("ZIP64 archives"));
            }
        }
        if u64::from(directory_offset) + u64::from(directory_size) > eocd_offset {
            return Err(Error::invalid_format(
                "central directory extends past its end record",
            ));
        }

        Ok((
            Self {
                entry_count,
                directory_size,
                directory_offset,
            },
            eocd_offset,
        ))
    }

    /// Write the record with an empty comment
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(EOCD_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(self.entry_count)?;
        writer.write_u16::<LittleEndian>(self.entry_count)?;
        writer.write_u32::<LittleEndian>(self.directory_size)?;
        writer.write_u32::<LittleEndian>(self.directory_offset)?;
        writer.write_u16::<LittleEndian>(0)?;
        Ok(())
    }
}

/// One central directory record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryEntry {
    /// Entry name, `/`-separated
    pub name: String,
    /// General purpose flags
    pub flags: u16,
    /// Raw compression method id
    pub method: u16,
    /// DOS modification time
    pub mod_time: u16,
    /// DOS modification date
    pub mod_date: u16,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Stored size
    pub compressed_size: u32,
    /// Size after decompression
    pub uncompressed_size: u32,
    /// Offset of the local header
    pub local_header_offset: u32,
}

impl CentralDirectoryEntry {
    /// Read one record at the current position
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let signature = reader.read_u32::<LittleEndian>()?;
        if signature != CENTRAL_HEADER_SIGNATURE {
            return Err(Error::invalid_format(format!(
                "bad central directory signature {signature:08x}"
            )));
        }

        let _version_made_by = reader.read_u16::<LittleEndian>()?;
        let _version_needed = reader.read_u16::<LittleEndian>()?;
        let flags = reader.read_u16::<LittleEndian>()?;
        let method = reader.read_u16::<LittleEndian>()?;
        let mod_time = reader.read_u16::<LittleEndian>()?;
        let mod_date = reader.read_u16::<LittleEndian>()?;
        let crc32 = reader.read_u32::<LittleEndian>()?;
        let compressed_size = reader.read_u32::<LittleEndian>()?;
        let uncompressed_size = reader.read_u32::<LittleEndian>()?;
        let name_len = reader.read_u16::<LittleEndian>()?;
        let extra_len = reader.read_u16::<LittleEndian>()?;
        let comment_len = reader.read_u16::<LittleEndian>()?;
        let _disk_start = reader.read_u16::<LittleEndian>()?;
        let _internal_attrs = reader.read_u16::<LittleEndian>()?;
        let _external_attrs = reader.read_u32::<LittleEndian>()?;
        let local_header_offset = reader.read_u32::<LittleEndian>()?;

        let mut name = vec![0u8; usize::from(name_len)];
        reader.read_exact(&mut name)?;
        let mut skip = vec![0u8; usize::from(extra_len) + usize::from(comment_len)];
        reader.read_exact(&mut skip)?;

        let name = String::from_utf8(name)
            .map_err(|_| Error::invalid_format("entry name is not valid UTF-8"))?;

        if compressed_size == u32::MAX
            || uncompressed_size == u32::MAX
            || local_header_offset == u32::MAX
        {
            return Err(Error::unsupported(format!("ZIP64 entry '{name}'")));
        }

        Ok(Self {
            name,
            flags,
            method,
            mod_time,
            mod_date,
            crc32,
            compressed_size,
            uncompressed_size,
            local_header_offset,
        })
    }

    /// Write this record
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION_DEFLATE)?;
        writer.write_u16::<LittleEndian>(VERSION_DEFLATE)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.method)?;
        writer.write_u16::<LittleEndian>(self.mod_time)?;
        writer.write_u16::<LittleEndian>(self.mod_date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u16::<LittleEndian>(name_len(&self.name)?)?;
        writer.write_u16::<LittleEndian>(0)?; // extra
        writer.write_u16::<LittleEndian>(0)?; // comment
        writer.write_u16::<LittleEndian>(0)?; // disk start
        writer.write_u16::<LittleEndian>(0)?; // internal attributes
        writer.write_u32::<LittleEndian>(0)?; // external attributes
        writer.write_u32::<LittleEndian>(self.local_header_offset)?;
        writer.write_all(self.name.as_bytes())?;
        Ok(())
    }

    /// Write the matching local file header
    pub fn write_local_header<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(VERSION_DEFLATE)?;
        writer.write_u16::<LittleEndian>(self.flags)?;
        writer.write_u16::<LittleEndian>(self.method)?;
        writer.write_u16::<LittleEndian>(self.mod_time)?;
        writer.write_u16::<LittleEndian>(self.mod_date)?;
        writer.write_u32::<LittleEndian>(self.crc32)?;
        writer.write_u32::<LittleEndian>(self.compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u16::<LittleEndian>(name_len(&self.name)?)?;
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_all(self.name.as_bytes())?;
        Ok(())
    }

    /// Size of the central record as written
    pub fn written_size(&self) -> u64 {
        CENTRAL_HEADER_SIZE + self.name.len() as u64
    }

    /// Whether this entry is a directory
    pub fn is_dir(&self) -> bool {
        crate::path::is_directory_entry(&self.name)
    }

    /// Whether the entry data is encrypted
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

fn name_len(name: &str) -> Result<u16> {
    u16::try_from(name.len())
        .map_err(|_| Error::invalid_format(format!("entry name too long: {name}")))
}

/// Skip a local header at the current position, returning its total size
pub fn skip_local_header<R: Read>(reader: &mut R) -> Result<u64> {
    let signature = reader.read_u32::<LittleEndian>()?;
    if signature != LOCAL_HEADER_SIGNATURE {
        return Err(Error::invalid_format(format!(
            "bad local header signature {signature:08x}"
        )));
    }
    let mut fixed = [0u8; 22];
    reader.read_exact(&mut fixed)?;
    let name_len = reader.read_u16::<LittleEndian>()?;
    let extra_len = reader.read_u16::<LittleEndian>()?;
    let variable = u64::from(name_len) + u64::from(extra_len);
    std::io::copy(&mut reader.by_ref().take(variable), &mut std::io::sink())?;
    Ok(LOCAL_HEADER_SIZE + variable)
}
