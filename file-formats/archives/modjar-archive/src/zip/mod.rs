//! The ZIP subset used by mod archives
//!
//! Reading supports stored and DEFLATE entries with CRC-32 verification,
//! including entries written with data descriptors. Writing always emits
//! DEFLATE entries followed by the central directory. ZIP64, encryption and
//! multi-disk archives are rejected as unsupported.
//!
//! ```no_run
//! use modjar_archive::zip::{ZipReader, ZipWriter};
//!
//! let mut reader = ZipReader::open("mod.jar")?;
//! let mut writer = ZipWriter::new(std::fs::File::create("copy.jar")?);
//! for index in 0..reader.entries().len() {
//!     let name = reader.entries()[index].name.clone();
//!     if !name.ends_with('/') {
//!         writer.add_file(&name, &reader.read_entry(index)?)?;
//!     }
//! }
//! writer.finish()?;
//! # Ok::<(), modjar_archive::Error>(())
//! ```

pub mod header;
mod reader;
mod writer;

pub use header::{CentralDirectoryEntry, CompressionMethod};
pub use reader::ZipReader;
pub use writer::ZipWriter;
