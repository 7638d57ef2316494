//! JSON files with selectable indentation and non-ASCII escaping
//!
//! Mod loaders disagree on what they expect inside data files: some read
//! UTF-8 verbatim, others were written by tools that escape everything
//! outside ASCII. The style is therefore chosen per write.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::Path;

/// Indentation used when writing JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonIndent {
    /// Two spaces per level
    Two,
    /// Four spaces per level
    #[default]
    Four,
}

impl JsonIndent {
    /// Create from a number of spaces
    pub fn from_spaces(spaces: u8) -> Option<Self> {
        match spaces {
            2 => Some(JsonIndent::Two),
            4 => Some(JsonIndent::Four),
            _ => None,
        }
    }

    fn as_bytes(self) -> &'static [u8] {
        match self {
            JsonIndent::Two => b"  ",
            JsonIndent::Four => b"    ",
        }
    }
}

/// Handling of characters outside ASCII when writing JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsciiMode {
    /// Write UTF-8 verbatim
    #[default]
    Preserve,
    /// Write `\uXXXX` escapes (surrogate pairs above the BMP)
    Escape,
}

/// Output style for a JSON write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonStyle {
    /// Indentation per nesting level
    pub indent: JsonIndent,
    /// Non-ASCII handling
    pub ascii: AsciiMode,
}

impl JsonStyle {
    /// Create a style from its parts
    pub const fn new(indent: JsonIndent, ascii: AsciiMode) -> Self {
        Self { indent, ascii }
    }

    /// Same style with a different indentation
    pub const fn with_indent(mut self, indent: JsonIndent) -> Self {
        self.indent = indent;
        self
    }

    /// Same style with non-ASCII characters escaped
    pub const fn escaped(mut self) -> Self {
        self.ascii = AsciiMode::Escape;
        self
    }
}

/// Pretty formatter that escapes every non-ASCII character
struct AsciiFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

/// Render a JSON value in the given style
pub fn to_json_string(value: &Value, style: JsonStyle) -> Result<String> {
    let mut buf = Vec::with_capacity(256);
    let pretty = PrettyFormatter::with_indent(style.indent.as_bytes());

    match style.ascii {
        AsciiMode::Preserve => {
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, pretty);
            value.serialize(&mut ser).map_err(Error::JsonSerialize)?;
        }
        AsciiMode::Escape => {
            let formatter = AsciiFormatter { inner: pretty };
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut ser).map_err(Error::JsonSerialize)?;
        }
    }

    // The serializer only ever emits valid UTF-8
    Ok(String::from_utf8(buf)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Parse JSON text, tolerating a leading byte order mark
pub fn parse_json(text: &str) -> serde_json::Result<Value> {
    serde_json::from_str(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Read a JSON file into an order-preserving value
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_json(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON value to a file in the given style
pub fn write_json<P: AsRef<Path>>(path: P, value: &Value, style: JsonStyle) -> Result<()> {
    let path = path.as_ref();
    let text = to_json_string(value, style)?;
    log::trace!("Writing {} bytes of JSON to {}", text.len(), path.display());
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

/// Set the value addressed by an RFC 6901 JSON pointer
///
/// Missing intermediate members are created as objects, so
/// `/values/before/minecraft:elytra` works on a document that has no
/// `before` table yet. Array elements must already exist.
pub fn set_pointer(doc: &mut Value, pointer: &str, value: Value) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidPointer {
        pointer: pointer.to_string(),
        reason: reason.to_string(),
    };

    if pointer.is_empty() {
        *doc = value;
        return Ok(());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(invalid("pointer must start with '/'"));
    };

    let tokens: Vec<String> = rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect();
    let (last, parents) = tokens
        .split_last()
        .ok_or_else(|| invalid("empty pointer"))?;

    let mut current = doc;
    for token in parents {
        current = match current {
            Value::Object(map) => map
                .entry(token.clone())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(items) => {
                let index: usize = token
                    .parse()
                    .map_err(|_| invalid("array index is not a number"))?;
                items
                    .get_mut(index)
                    .ok_or_else(|| invalid("array index out of bounds"))?
            }
            _ => return Err(invalid("path goes through a scalar value")),
        };
    }

    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index: usize = last
                .parse()
                .map_err(|_| invalid("array index is not a number"))?;
            let slot = items
                .get_mut(index)
                .ok_or_else(|| invalid("array index out of bounds"))?;
            *slot = value;
            Ok(())
        }
        _ => Err(invalid("parent is a scalar value")),
    }
}

/// Remove the member or element addressed by a JSON pointer, returning it
///
/// Pointing at something that does not exist removes nothing and returns
/// `None`.
pub fn remove_pointer(doc: &mut Value, pointer: &str) -> Result<Option<Value>> {
    let invalid = |reason: &str| Error::InvalidPointer {
        pointer: pointer.to_string(),
        reason: reason.to_string(),
    };

    if pointer.is_empty() {
        return Err(invalid("cannot remove the whole document"));
    }
    if !pointer.starts_with('/') {
        return Err(invalid("pointer must start with '/'"));
    }
    let Some((parent, last)) = pointer.rsplit_once('/') else {
        return Err(invalid("pointer must start with '/'"));
    };
    let last = last.replace("~1", "/").replace("~0", "~");

    match doc.pointer_mut(parent) {
        Some(Value::Object(map)) => Ok(map.shift_remove(&last)),
        Some(Value::Array(items)) => {
            let index: usize = last
                .parse()
                .map_err(|_| invalid("array index is not a number"))?;
            Ok((index < items.len()).then(|| items.remove(index)))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_indentation() {
        let value = json!({"a": [1, 2]});

        let two = to_json_string(&value, JsonStyle::default().with_indent(JsonIndent::Two)).unwrap();
        assert_eq!(two, "{\n  \"a\": [\n    1,\n    2\n  ]\n}");

        let four = to_json_string(&value, JsonStyle::default()).unwrap();
        assert_eq!(four, "{\n    \"a\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn test_non_ascii_modes() {
        let value = json!({"name": "沉浸式飞机 ✈"});

        let preserved = to_json_string(&value, JsonStyle::default()).unwrap();
        assert!(preserved.contains("沉浸式飞机 ✈"));

        let escaped = to_json_string(&value, JsonStyle::default().escaped()).unwrap();
        assert!(escaped.is_ascii());
        assert!(escaped.contains("\\u6c89\\u6d78\\u5f0f\\u98de\\u673a \\u2708"));
        assert_eq!(parse_json(&escaped).unwrap(), value);
    }

    #[test]
    fn test_escape_outside_bmp_uses_surrogates() {
        let value = json!("😀");
        let escaped = to_json_string(&value, JsonStyle::default().escaped()).unwrap();
        assert_eq!(escaped, "\"\\ud83d\\ude00\"");
    }

    #[test]
    fn test_escape_keeps_control_escapes() {
        let value = json!("line\n\"quoted\"");
        let escaped = to_json_string(&value, JsonStyle::default().escaped()).unwrap();
        assert_eq!(escaped, "\"line\\n\\\"quoted\\\"\"");
    }

    #[test]
    fn test_key_order_preserved() {
        let text = r#"{"zeta": 1, "alpha": 2, "mid": 3}"#;
        let value = parse_json(text).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_with_bom() {
        let value = parse_json("\u{feff}{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_set_pointer_creates_parents() {
        let mut doc = json!({"values": {}});
        set_pointer(&mut doc, "/values/before/minecraft:elytra", json!(65536)).unwrap();
        assert_eq!(doc, json!({"values": {"before": {"minecraft:elytra": 65536}}}));
    }

    #[test]
    fn test_set_pointer_escaped_tokens() {
        let mut doc = json!({});
        set_pointer(&mut doc, "/a~1b/c~0d", json!(true)).unwrap();
        assert_eq!(doc, json!({"a/b": {"c~d": true}}));
    }

    #[test]
    fn test_set_pointer_array_and_errors() {
        let mut doc = json!([{"name": "old"}]);
        set_pointer(&mut doc, "/0/name", json!("new")).unwrap();
        assert_eq!(doc, json!([{"name": "new"}]));

        assert!(set_pointer(&mut doc, "/5/name", json!("x")).is_err());
        assert!(set_pointer(&mut doc, "no-slash", json!("x")).is_err());
        assert!(set_pointer(&mut doc, "/0/name/deeper", json!("x")).is_err());
    }

    #[test]
    fn test_remove_pointer() {
        let mut doc = json!({
            "values": { "before": { "#forge:gems/emerald": 16384, "minecraft:dirt": 1 } },
            "list": [1, 2, 3]
        });

        assert_eq!(
            remove_pointer(&mut doc, "/values/before/#forge:gems~1emerald").unwrap(),
            Some(json!(16384))
        );
        // Unescaped '/' addresses a nested member that does not exist
        assert_eq!(
            remove_pointer(&mut doc, "/values/before/#forge:gems/emerald").unwrap(),
            None
        );
        assert_eq!(doc["values"]["before"], json!({ "minecraft:dirt": 1 }));

        let mut escaped = json!({ "a/b": 1, "c": 2 });
        assert_eq!(remove_pointer(&mut escaped, "/a~1b").unwrap(), Some(json!(1)));
        assert_eq!(escaped, json!({ "c": 2 }));

        assert_eq!(remove_pointer(&mut doc, "/list/1").unwrap(), Some(json!(2)));
        assert_eq!(doc["list"], json!([1, 3]));
        assert_eq!(remove_pointer(&mut doc, "/list/9").unwrap(), None);
        assert_eq!(remove_pointer(&mut doc, "/missing/deep").unwrap(), None);
        assert!(remove_pointer(&mut doc, "").is_err());
        assert!(remove_pointer(&mut doc, "values").is_err());
    }
}
