//! # modjar_data - structured files inside mod archives
//!
//! Reading and writing the data files that mod patching touches, plus the
//! shaped-recipe patch DSL.
//!
//! ## Features
//!
//! - JSON with stable key order, 2- or 4-space indentation and optional
//!   `\uXXXX` escaping of non-ASCII text
//! - TOML metadata with array-of-tables field edits
//! - Legacy `.lang` translation files
//! - Left-to-right override merge for translation and value tables
//! - Recipe patching with symbol/pattern consistency checking
//!
//! ## Examples
//!
//! ```no_run
//! use modjar_data::recipe::RecipePatch;
//! use modjar_data::store::JsonStyle;
//!
//! # fn main() -> Result<(), modjar_data::Error> {
//! RecipePatch::new()
//!     .update("C", "minecraft:copper_block")
//!     .update("W", "minecraft:water_bucket")
//!     .pattern(["CCC", "CWC", "CFC"])
//!     .apply_to_file("data/immersive_aircraft/recipes/boiler.json", JsonStyle::default())?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod recipe;
pub mod store;

pub use error::{Error, Result};
pub use recipe::RecipePatch;
pub use store::{AsciiMode, JsonIndent, JsonStyle, LangTable};
