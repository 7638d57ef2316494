//! Palette-driven recoloring of mod textures.
//!
//! Red, pink and magenta pixels are remapped onto a five-stop gradient
//! chosen by palette version; the gradient position comes from each
//! pixel's luminance, so shading survives the recolor. Other pixels and
//! fully transparent pixels pass through untouched, and alpha is always
//! preserved.
//!
//! # Examples
//!
//! ```no_run
//! use modjar_texture::{PaletteRegistry, recolor_file};
//!
//! let registry = PaletteRegistry::builtin();
//! let stats = recolor_file(
//!     "assets/projecte/textures/gui/transmute.png",
//!     "assets/projecte/textures/gui/transmute.png",
//!     registry.get("v7")?,
//! )?;
//! assert!(stats.recolored <= stats.pixels);
//! # Ok::<(), modjar_texture::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod classify;
pub mod error;
pub mod gradient;
pub mod palette;
pub mod recolor;

pub use error::{Error, Result};
pub use palette::{Palette, PaletteRegistry, Rgb};
pub use recolor::{RecolorStats, recolor, recolor_file, recolor_pixel, recolored};
