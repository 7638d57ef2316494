//! Legacy `.lang` translation files
//!
//! Pre-1.13 Minecraft stores translations as `key=value` lines. Values are
//! written back verbatim: no escaping, non-ASCII text stays UTF-8.

use crate::{Error, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Ordered translation table
pub type LangTable = IndexMap<String, String>;

/// Parse `.lang` text
///
/// Blank lines and lines starting with `#` are skipped. Each remaining line
/// is split on its first `=`. A repeated key keeps its first position and
/// takes the last value.
pub fn parse_lang(text: &str) -> LangTable {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut table = LangTable::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                table.insert(key.to_string(), value.to_string());
            }
            _ => log::debug!("Skipping lang line {} without a key: {line:?}", number + 1),
        }
    }

    table
}

/// Render a table as `.lang` text, one `key=value` line per entry
///
/// Entries that [`parse_lang`] would read back differently are rejected:
/// empty keys, keys that look like comments or contain `=`, and line breaks
/// anywhere.
pub fn render_lang(table: &LangTable) -> Result<String> {
    let mut out = String::with_capacity(table.len() * 32);
    for (key, value) in table {
        check_entry(key, value)?;
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    Ok(out)
}

fn check_entry(key: &str, value: &str) -> Result<()> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key.trim_start().starts_with('#') {
        "key starts with '#'"
    } else if key.starts_with('\u{feff}') {
        "key starts with a byte order mark"
    } else if key.contains('=') {
        "key contains '='"
    } else if key.contains(['\r', '\n']) {
        "key contains a line break"
    } else if value.contains(['\r', '\n']) {
        "value contains a line break"
    } else {
        return Ok(());
    };
    Err(Error::InvalidLangEntry {
        key: key.to_string(),
        reason,
    })
}

/// Read a `.lang` file
pub fn read_lang<P: AsRef<Path>>(path: P) -> Result<LangTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Ok(parse_lang(&text))
}

/// Write a `.lang` file
pub fn write_lang<P: AsRef<Path>>(path: P, table: &LangTable) -> Result<()> {
    let path = path.as_ref();
    let text = render_lang(table)?;
    fs::write(path, text).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn table(entries: &[(&str, &str)]) -> LangTable {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn rejected_reason(entries: &[(&str, &str)]) -> &'static str {
        match render_lang(&table(entries)) {
            Err(Error::InvalidLangEntry { reason, .. }) => reason,
            other => panic!("expected InvalidLangEntry, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_lang() {
        let text = "# comment\n\
                    tile.pe_transmutation_stone.name=Transmutation Table\r\n\
                    \n\
                    pe.emc.rate=EMC/s\n\
                    pe.formula=a=b\n\
                    garbage line\n";
        let table = parse_lang(text);

        assert_eq!(table.len(), 3);
        assert_eq!(table["tile.pe_transmutation_stone.name"], "Transmutation Table");
        assert_eq!(table["pe.emc.rate"], "EMC/s");
        assert_eq!(table["pe.formula"], "a=b");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let table = parse_lang("a=1\nb=2\na=3\n");
        let entries: Vec<(&str, &str)> = table
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(entries, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_render_keeps_non_ascii() {
        let mut table = LangTable::new();
        table.insert("item.pe_transmutation_tablet.name".to_string(), "交易终端".to_string());
        table.insert("pe.emc.name".to_string(), "Coins".to_string());

        let text = render_lang(&table).unwrap();
        assert_eq!(text, "item.pe_transmutation_tablet.name=交易终端\npe.emc.name=Coins\n");
        assert_eq!(parse_lang(&text), table);
    }

    #[test]
    fn test_render_rejects_comment_key() {
        assert_eq!(rejected_reason(&[("#comment.like", "x")]), "key starts with '#'");
        assert_eq!(rejected_reason(&[("  #indented", "x")]), "key starts with '#'");
    }

    #[test]
    fn test_render_rejects_key_with_equals() {
        assert_eq!(rejected_reason(&[("a=b", "c")]), "key contains '='");
    }

    #[test]
    fn test_render_rejects_empty_key() {
        assert_eq!(rejected_reason(&[("", "orphan")]), "key is empty");
    }

    #[test]
    fn test_render_rejects_line_breaks() {
        assert_eq!(
            rejected_reason(&[("multi", "line1\nline2")]),
            "value contains a line break"
        );
        assert_eq!(
            rejected_reason(&[("multi", "line1\r")]),
            "value contains a line break"
        );
        assert_eq!(
            rejected_reason(&[("split\nkey", "v")]),
            "key contains a line break"
        );
    }

    #[test]
    fn test_write_rejects_without_touching_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("en_US.lang");
        fs::write(&path, "pe.emc.name=Coins\n").unwrap();

        let err = write_lang(&path, &table(&[("ok", "1"), ("a=b", "c")])).unwrap_err();
        assert!(matches!(err, Error::InvalidLangEntry { ref key, .. } if key == "a=b"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "pe.emc.name=Coins\n");
    }

    proptest! {
        #[test]
        fn prop_render_then_parse_is_identity(
            entries in proptest::collection::vec(
                ("[a-z][a-z0-9_.]{0,15}", "[^\r\n]{0,20}"),
                0..12,
            )
        ) {
            let table: LangTable = entries.into_iter().collect();
            let text = render_lang(&table).unwrap();
            prop_assert_eq!(parse_lang(&text), table);
        }
    }
}
