//! Declarative patching of shaped crafting recipes
//!
//! A shaped recipe binds single-character symbols to an item or tag and lays
//! them out in a grid:
//!
//! ```json
//! {
//!   "type": "minecraft:crafting_shaped",
//!   "key": { "W": [{ "item": "minecraft:oak_planks" }] },
//!   "pattern": ["WWW", "W W", "WWW"],
//!   "result": { "item": "immersive_aircraft:hull" }
//! }
//! ```
//!
//! A [`RecipePatch`] rebinds symbols, drops symbols and optionally swaps the
//! pattern. Every patch ends with a consistency check: the symbols used by
//! the pattern (ignoring spaces) must be exactly the bound symbols. A patch
//! that would leave a recipe uncraftable or with dangling bindings fails and
//! nothing is written.
//!
//! # Examples
//!
//! ```
//! use modjar_data::recipe::RecipePatch;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), modjar_data::Error> {
//! let recipe = json!({
//!     "key": { "W": [{ "item": "minecraft:oak_planks" }] },
//!     "pattern": ["WWW", "W W", "WWW"]
//! });
//!
//! let patched = RecipePatch::new()
//!     .update("W", "#minecraft:planks")
//!     .apply("hull.json", &recipe)?;
//!
//! assert_eq!(patched["key"]["W"], json!([{ "tag": "minecraft:planks" }]));
//! # Ok(())
//! # }
//! ```

use crate::store::{JsonStyle, read_json, write_json};
use crate::{Error, Result};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::path::Path;

/// Filler character for empty grid cells
pub const FILLER: char = ' ';

/// A set of edits to apply to a shaped recipe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    updates: Vec<(String, Value)>,
    removals: Option<Vec<String>>,
    pattern: Option<Vec<String>>,
}

impl RecipePatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `symbol` to an item (`"minecraft:iron_block"`) or a tag
    /// (`"#minecraft:wool_carpets"`)
    ///
    /// The value is taken as JSON so that bindings coming from data files are
    /// checked here; anything other than a string is rejected on apply.
    pub fn update<S: Into<String>, V: Into<Value>>(mut self, symbol: S, binding: V) -> Self {
        self.updates.push((symbol.into(), binding.into()));
        self
    }

    /// Remove the binding of `symbol`
    pub fn remove<S: Into<String>>(mut self, symbol: S) -> Self {
        self.removals.get_or_insert_with(Vec::new).push(symbol.into());
        self
    }

    /// Replace the crafting grid
    pub fn pattern<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pattern = Some(rows.into_iter().map(Into::into).collect());
        self
    }

    /// Symbols rebound by this patch, in insertion order
    pub fn updated_symbols(&self) -> impl Iterator<Item = &str> {
        self.updates.iter().map(|(symbol, _)| symbol.as_str())
    }

    /// Symbols removed by this patch
    pub fn removed_symbols(&self) -> impl Iterator<Item = &str> {
        self.removals.iter().flatten().map(String::as_str)
    }

    /// Whether the patch replaces the pattern
    pub fn replaces_pattern(&self) -> bool {
        self.pattern.is_some()
    }

    /// Apply the patch to a recipe, returning the patched copy
    ///
    /// `document` names the recipe in errors and log output. The input is
    /// never modified, so a failed patch leaves the caller's value intact.
    pub fn apply(&self, document: &str, recipe: &Value) -> Result<Value> {
        self.check_conflicts(document)?;

        let normalized = self
            .updates
            .iter()
            .map(|(symbol, value)| {
                normalize_binding(document, symbol, value).map(|b| (symbol.clone(), b))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut patched = recipe.clone();
        let key = key_mut(document, &mut patched)?;

        for symbol in self.removed_symbols() {
            if key.shift_remove(symbol).is_none() {
                log::warn!("Recipe {document}: cannot remove key '{symbol}', it does not exist");
            }
        }

        for (symbol, binding) in normalized {
            key.insert(symbol, binding);
        }

        if let Some(rows) = &self.pattern {
            let object = patched
                .as_object_mut()
                .ok_or_else(|| Error::malformed_recipe(document, "document is not an object"))?;
            object.insert("pattern".to_string(), json!(rows));
        }

        validate(document, &patched)?;
        Ok(patched)
    }

    /// Patch a recipe file in place
    ///
    /// The file is only rewritten when the patched recipe validates.
    pub fn apply_to_file<P: AsRef<Path>>(&self, path: P, style: JsonStyle) -> Result<()> {
        let path = path.as_ref();
        let document = path.display().to_string();

        // Fail on conflicting edits before touching the file at all
        self.check_conflicts(&document)?;

        let recipe = read_json(path)?;
        let patched = self.apply(&document, &recipe)?;
        log::debug!(
            "Patched recipe {document}: {} updated, {} removed, pattern {}",
            self.updates.len(),
            self.removed_symbols().count(),
            if self.replaces_pattern() { "replaced" } else { "kept" }
        );
        write_json(path, &patched, style)
    }

    fn check_conflicts(&self, document: &str) -> Result<()> {
        let removed: BTreeSet<&str> = self.removed_symbols().collect();
        let conflicts: BTreeSet<&str> = self
            .updated_symbols()
            .filter(|symbol| removed.contains(symbol))
            .collect();

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(Error::Conflict {
                document: document.to_string(),
                symbols: conflicts.into_iter().map(str::to_string).collect(),
            })
        }
    }
}

/// Turn a binding string into the single-element binding list of a recipe
///
/// `"#ns:tag"` becomes `[{"tag": "ns:tag"}]`, anything else
/// `[{"item": value}]`. Surrounding whitespace is trimmed.
pub fn normalize_binding(document: &str, symbol: &str, value: &Value) -> Result<Value> {
    let Value::String(raw) = value else {
        return Err(Error::InvalidBinding {
            document: document.to_string(),
            symbol: symbol.to_string(),
            value: value.to_string(),
        });
    };

    let raw = raw.trim();
    Ok(match raw.strip_prefix('#') {
        Some(tag) => json!([{ "tag": tag }]),
        None => json!([{ "item": raw }]),
    })
}

/// Check that the pattern symbols and the key bindings agree
pub fn validate(document: &str, recipe: &Value) -> Result<()> {
    let key = recipe
        .get("key")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed_recipe(document, "missing object field 'key'"))?;
    let rows = pattern_rows(document, recipe)?;

    if rows.is_empty() {
        return Err(Error::malformed_recipe(document, "pattern has no rows"));
    }
    let width = rows[0].chars().count();
    if rows.iter().any(|row| row.chars().count() != width) {
        return Err(Error::malformed_recipe(
            document,
            format!("pattern rows have unequal widths: {rows:?}"),
        ));
    }

    let used: BTreeSet<String> = rows
        .iter()
        .flat_map(|row| row.chars())
        .filter(|&c| c != FILLER)
        .map(String::from)
        .collect();
    let bound: BTreeSet<String> = key.keys().cloned().collect();

    if used == bound {
        return Ok(());
    }

    Err(Error::SchemaConsistency {
        document: document.to_string(),
        unbound: used.difference(&bound).cloned().collect(),
        unused: bound.difference(&used).cloned().collect(),
    })
}

fn key_mut<'a>(document: &str, recipe: &'a mut Value) -> Result<&'a mut Map<String, Value>> {
    recipe
        .get_mut("key")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| Error::malformed_recipe(document, "missing object field 'key'"))
}

fn pattern_rows<'a>(document: &str, recipe: &'a Value) -> Result<Vec<&'a str>> {
    let rows = recipe
        .get("pattern")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::malformed_recipe(document, "missing array field 'pattern'"))?;

    rows.iter()
        .map(|row| {
            row.as_str()
                .ok_or_else(|| Error::malformed_recipe(document, "pattern rows must be strings"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hull() -> Value {
        json!({
            "type": "minecraft:crafting_shaped",
            "key": {
                "I": [{ "item": "immersive_aircraft:sturdy_pipes" }],
                "W": [{ "tag": "minecraft:planks" }]
            },
            "pattern": ["WIW", "W W", "WIW"],
            "result": { "item": "immersive_aircraft:hull" }
        })
    }

    #[test]
    fn test_binding_normalization() {
        assert_eq!(
            normalize_binding("r", "W", &json!("#minecraft:planks")).unwrap(),
            json!([{ "tag": "minecraft:planks" }])
        );
        assert_eq!(
            normalize_binding("r", "C", &json!("minecraft:crossbow")).unwrap(),
            json!([{ "item": "minecraft:crossbow" }])
        );
        assert_eq!(
            normalize_binding("r", "C", &json!("  minecraft:lead \n")).unwrap(),
            json!([{ "item": "minecraft:lead" }])
        );
    }

    #[test]
    fn test_non_string_binding_rejected() {
        let patch = RecipePatch::new().update("I", 42);
        let err = patch.apply("hull.json", &hull()).unwrap_err();
        assert!(matches!(err, Error::InvalidBinding { ref symbol, .. } if symbol == "I"));
    }

    #[test]
    fn test_update_keeps_other_fields() {
        let patched = RecipePatch::new()
            .update("I", "minecraft:iron_block")
            .apply("hull.json", &hull())
            .unwrap();

        assert_eq!(patched["key"]["I"], json!([{ "item": "minecraft:iron_block" }]));
        assert_eq!(patched["key"]["W"], json!([{ "tag": "minecraft:planks" }]));
        assert_eq!(patched["pattern"], hull()["pattern"]);
        assert_eq!(patched["result"], hull()["result"]);

        let fields: Vec<&String> = patched.as_object().unwrap().keys().collect();
        assert_eq!(fields, ["type", "key", "pattern", "result"]);
    }

    #[test]
    fn test_conflict_rejected_before_mutation() {
        let patch = RecipePatch::new()
            .update("I", "minecraft:iron_block")
            .update("W", "minecraft:oak_log")
            .remove("W");
        let err = patch.apply("hull.json", &hull()).unwrap_err();
        match err {
            Error::Conflict { symbols, .. } => assert_eq!(symbols, ["W"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_remove_with_new_pattern() {
        let recipe = json!({
            "key": {
                "C": [{ "item": "immersive_aircraft:boiler" }],
                "R": [{ "item": "minecraft:redstone" }],
                "N": [{ "item": "minecraft:nether_brick" }],
                "E": [{ "item": "immersive_aircraft:engine" }]
            },
            "pattern": ["CRC", "NEN", "CRC"]
        });

        let patched = RecipePatch::new()
            .update("G", "minecraft:gold_block")
            .update("P", "minecraft:sticky_piston")
            .update("B", "minecraft:bricks")
            .remove("C")
            .remove("R")
            .remove("N")
            .pattern(["BGB", "PEP", "GBG"])
            .apply("eco_engine.json", &recipe)
            .unwrap();

        let keys: BTreeSet<&String> = patched["key"].as_object().unwrap().keys().collect();
        assert_eq!(keys.into_iter().collect::<Vec<_>>(), ["B", "E", "G", "P"]);
        assert_eq!(patched["pattern"], json!(["BGB", "PEP", "GBG"]));
    }

    #[test]
    fn test_removing_used_symbol_is_inconsistent() {
        let err = RecipePatch::new()
            .remove("I")
            .apply("hull.json", &hull())
            .unwrap_err();
        match err {
            Error::SchemaConsistency { unbound, unused, .. } => {
                assert_eq!(unbound, ["I"]);
                assert!(unused.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unused_binding_is_inconsistent() {
        let err = RecipePatch::new()
            .update("X", "minecraft:stone")
            .apply("hull.json", &hull())
            .unwrap_err();
        match err {
            Error::SchemaConsistency { unbound, unused, .. } => {
                assert!(unbound.is_empty());
                assert_eq!(unused, ["X"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_removal_is_tolerated() {
        let patched = RecipePatch::new()
            .remove("Z")
            .apply("hull.json", &hull())
            .unwrap();
        assert_eq!(patched, hull());
    }

    #[test]
    fn test_malformed_documents() {
        let err = RecipePatch::new()
            .apply("shapeless.json", &json!({"ingredients": []}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecipe { .. }));

        let err = RecipePatch::new()
            .pattern(["II", "I"])
            .apply("hull.json", &json!({"key": {"I": []}, "pattern": ["I"]}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecipe { .. }));
    }

    #[test]
    fn test_object_binding_form_is_accepted() {
        // Older recipes store a bare object instead of a one-element list
        let recipe = json!({
            "key": {
                "D": { "item": "minecraft:diamond" },
                "S": { "item": "minecraft:stone" }
            },
            "pattern": ["DSD", "SDS", "DSD"]
        });
        let patched = RecipePatch::new()
            .update("D", "minecraft:netherite_block")
            .apply("transmutation_tablet.json", &recipe)
            .unwrap();
        assert_eq!(patched["key"]["D"], json!([{ "item": "minecraft:netherite_block" }]));
        assert_eq!(patched["key"]["S"], json!({ "item": "minecraft:stone" }));
    }
}
