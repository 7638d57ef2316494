//! Typed access to the structured files found inside mod archives
//!
//! - [`json`]: data packs, recipes, translations (1.13+)
//! - [`toml_doc`]: loader metadata (`META-INF/mods.toml`)
//! - [`lang`]: legacy `key=value` translations (1.12 and older)
//! - [`merge`]: left-to-right override merge used to combine tables

pub mod json;
pub mod lang;
pub mod merge;
pub mod toml_doc;

pub use json::{
    AsciiMode, JsonIndent, JsonStyle, parse_json, read_json, remove_pointer, set_pointer,
    to_json_string, write_json,
};
pub use lang::{LangTable, parse_lang, read_lang, render_lang, write_lang};
pub use merge::{merge_json_tables, merge_lang_tables, override_json};
pub use toml_doc::{parse_toml, read_toml, set_table_array_field, write_toml};
