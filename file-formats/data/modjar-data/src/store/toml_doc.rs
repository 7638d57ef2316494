//! TOML metadata files (`mods.toml`, `neoforge.mods.toml`)

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use toml::{Table, Value};

/// Parse TOML text into an order-preserving table
pub fn parse_toml(text: &str) -> std::result::Result<Table, toml::de::Error> {
    text.parse::<Table>()
}

/// Read a TOML file
pub fn read_toml<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_toml(&text).map_err(|source| Error::TomlDe {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a TOML table to a file
pub fn write_toml<P: AsRef<Path>>(path: P, doc: &Table) -> Result<()> {
    let path = path.as_ref();
    let text = toml::to_string(doc)?;
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

/// Overwrite `field` inside element `index` of the array of tables `array`
///
/// This is the `mods[0].displayName = "..."` edit done on mod metadata.
/// The field is inserted if the element does not have it yet.
pub fn set_table_array_field(
    doc: &mut Table,
    array: &str,
    index: usize,
    field: &str,
    value: Value,
) -> Result<()> {
    let missing = || Error::MissingTableArrayElement {
        array: array.to_string(),
        index,
    };

    let element = doc
        .get_mut(array)
        .and_then(Value::as_array_mut)
        .and_then(|items| items.get_mut(index))
        .and_then(Value::as_table_mut)
        .ok_or_else(missing)?;

    log::debug!("Setting {array}[{index}].{field}");
    element.insert(field.to_string(), value);
    Ok(())
}
