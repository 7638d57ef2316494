//! Ordered override merge of translation and value tables
//!
//! Tables are combined left to right: a later table replaces the value of a
//! key already present (which keeps its original position) and appends keys
//! it introduces. The merge is shallow; nested objects are replaced whole.

use crate::store::LangTable;
use serde_json::{Map, Value};

/// Merge JSON objects left to right, later tables winning per key
pub fn merge_json_tables<I>(tables: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut merged = Map::new();
    for table in tables {
        override_json(&mut merged, table);
    }
    merged
}

/// Apply `overlay` on top of `base` in place
pub fn override_json(base: &mut Map<String, Value>, overlay: Map<String, Value>) {
    for (key, value) in overlay {
        base.insert(key, value);
    }
}

/// Merge `.lang` tables left to right, later tables winning per key
pub fn merge_lang_tables<I>(tables: I) -> LangTable
where
    I: IntoIterator<Item = LangTable>,
{
    let mut merged = LangTable::new();
    for table in tables {
        merged.extend(table);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_later_tables_win() {
        let original = object(json!({"a": "orig-a", "b": "orig-b", "c": "orig-c"}));
        let remain = object(json!({"b": "remain-b", "d": "remain-d"}));
        let emc = object(json!({"c": "emc-c", "d": "emc-d"}));

        let merged = merge_json_tables([original, remain, emc]);

        let entries: Vec<(&str, &Value)> = merged.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(
            entries,
            [
                ("a", &json!("orig-a")),
                ("b", &json!("remain-b")),
                ("c", &json!("emc-c")),
                ("d", &json!("emc-d")),
            ]
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        let base = object(json!({"nested": {"x": 1, "y": 2}}));
        let overlay = object(json!({"nested": {"x": 5}}));

        let merged = merge_json_tables([base, overlay]);
        assert_eq!(Value::Object(merged), json!({"nested": {"x": 5}}));
    }

    #[test]
    fn test_merge_lang_tables() {
        let mut first = LangTable::new();
        first.insert("pe.emc.name".into(), "EMC".into());
        first.insert("pe.emc.rate".into(), "EMC/s".into());
        let mut second = LangTable::new();
        second.insert("pe.emc.name".into(), "Coins".into());
        second.insert("pe.transmutation.transmute".into(), "交易台".into());

        let merged = merge_lang_tables([first, second]);
        let keys: Vec<&String> = merged.keys().collect();
        assert_eq!(keys, ["pe.emc.name", "pe.emc.rate", "pe.transmutation.transmute"]);
        assert_eq!(merged["pe.emc.name"], "Coins");
    }
}
