//! Patch scripts
//!
//! A script is an ordered list of steps run against an extracted archive.
//! Scripts are usually declared in the manifest and deserialized into a
//! [`ScriptSpec`], but anything implementing [`PatchScript`] can drive the
//! pipeline, including plain closures.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use modjar_archive::Workspace;
use modjar_data::store::{self, JsonIndent, JsonStyle, LangTable};
use modjar_data::RecipePatch;
use modjar_texture::PaletteRegistry;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something that edits an extracted archive
pub trait PatchScript {
    /// Apply the edits
    fn run(&self, workspace: &mut Workspace) -> Result<()>;
}

impl<F> PatchScript for F
where
    F: Fn(&mut Workspace) -> Result<()>,
{
    fn run(&self, workspace: &mut Workspace) -> Result<()> {
        self(workspace)
    }
}

/// One operation of a data-driven script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// Delete files directly inside `dir`, by allow list or deny list
    RemoveFiles {
        /// Directory relative to the archive root
        dir: String,
        /// Keep only these file names
        #[serde(default)]
        keep: Option<Vec<String>>,
        /// Delete only these file names
        #[serde(default)]
        delete: Option<Vec<String>>,
    },

    /// Delete a directory tree or single file
    RemoveDir {
        /// Path relative to the archive root
        path: String,
    },

    /// Patch a keyed grid recipe
    ModifyRecipe {
        /// Recipe file
        path: String,
        /// Symbol bindings to set, `"ns:item"` or `"#ns:tag"`
        #[serde(default)]
        update: IndexMap<String, Value>,
        /// Symbols to unbind
        #[serde(default)]
        remove: Vec<String>,
        /// Replacement pattern rows
        #[serde(default)]
        pattern: Option<Vec<String>>,
    },

    /// Set the value at a JSON pointer
    SetJson {
        /// JSON file
        path: String,
        /// Target pointer, e.g. `/values/before/minecraft:stone`
        pointer: String,
        /// New value
        value: Value,
    },

    /// Remove the value at a JSON pointer
    RemoveJson {
        /// JSON file
        path: String,
        /// Target pointer
        pointer: String,
    },

    /// Override-merge objects into a JSON object
    MergeJson {
        /// JSON file
        path: String,
        /// Object to merge into; the document root when absent
        #[serde(default)]
        pointer: Option<String>,
        /// JSON files next to the manifest, merged first
        #[serde(default)]
        sources: Vec<String>,
        /// Inline tables, merged after `sources`
        #[serde(default)]
        tables: Vec<Map<String, Value>>,
    },

    /// Override-merge tables into a `.lang` file
    MergeLang {
        /// Lang file
        path: String,
        /// Lang files next to the manifest, merged first
        #[serde(default)]
        sources: Vec<String>,
        /// Inline tables, merged after `sources`
        #[serde(default)]
        tables: Vec<LangTable>,
    },

    /// Set a field of one element of a TOML array of tables
    SetToml {
        /// TOML file
        path: String,
        /// Array of tables name, e.g. `mods`
        array: String,
        /// Element index
        #[serde(default)]
        index: usize,
        /// Field to set
        field: String,
        /// New value
        value: toml::Value,
    },

    /// Recolor an image through a palette
    Recolor {
        /// Image to read
        path: String,
        /// Palette name
        palette: String,
        /// Image to write; `path` when absent
        #[serde(default)]
        output: Option<String>,
    },

    /// Copy a file from next to the manifest into the archive
    CopyAsset {
        /// File relative to the manifest directory
        source: String,
        /// Destination inside the archive
        target: String,
    },
}

impl Step {
    /// Operation name as written in the manifest
    pub fn op(&self) -> &'static str {
        match self {
            Self::RemoveFiles { .. } => "remove_files",
            Self::RemoveDir { .. } => "remove_dir",
            Self::ModifyRecipe { .. } => "modify_recipe",
            Self::SetJson { .. } => "set_json",
            Self::RemoveJson { .. } => "remove_json",
            Self::MergeJson { .. } => "merge_json",
            Self::MergeLang { .. } => "merge_lang",
            Self::SetToml { .. } => "set_toml",
            Self::Recolor { .. } => "recolor",
            Self::CopyAsset { .. } => "copy_asset",
        }
    }

    fn validate(&self, palettes: &PaletteRegistry) -> std::result::Result<(), String> {
        match self {
            Self::RemoveFiles { keep, delete, .. } => match (keep, delete) {
                (Some(_), None) | (None, Some(_)) => Ok(()),
                _ => Err("remove_files needs exactly one of 'keep' or 'delete'".to_string()),
            },
            Self::ModifyRecipe {
                update,
                remove,
                pattern,
                ..
            } => {
                if update.is_empty() && remove.is_empty() && pattern.is_none() {
                    Err("modify_recipe changes nothing".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Recolor { palette, .. } => palettes
                .get(palette)
                .map(|_| ())
                .map_err(|e| e.to_string()),
            _ => Ok(()),
        }
    }

    /// Execute the step against a workspace
    pub fn run(&self, workspace: &Workspace, context: &ScriptContext) -> Result<()> {
        match self {
            Self::RemoveFiles { dir, keep, delete } => {
                let removed = match (keep, delete) {
                    (Some(keep), None) => workspace.remove_entries_keeping(dir, keep)?,
                    (None, Some(delete)) => workspace.remove_entries_matching(dir, delete)?,
                    _ => {
                        return Err(Error::invalid_manifest(format!(
                            "remove_files on {dir} needs exactly one of 'keep' or 'delete'"
                        )));
                    }
                };
                log::debug!("Removed {removed} files from {dir}");
            }
            Self::RemoveDir { path } => {
                if !workspace.remove_subtree(path)? {
                    log::warn!("Nothing to remove at {path}");
                }
            }
            Self::ModifyRecipe {
                path,
                update,
                remove,
                pattern,
            } => {
                let mut patch = RecipePatch::new();
                for (symbol, binding) in update {
                    patch = patch.update(symbol.as_str(), binding.clone());
                }
                for symbol in remove {
                    patch = patch.remove(symbol.as_str());
                }
                if let Some(rows) = pattern {
                    patch = patch.pattern(rows.iter().map(String::as_str));
                }
                workspace.modify_recipe(path, &patch)?;
            }
            Self::SetJson {
                path,
                pointer,
                value,
            } => {
                let mut doc = workspace.read_json(path)?;
                store::set_pointer(&mut doc, pointer, value.clone())?;
                workspace.write_json(path, &doc)?;
            }
            Self::RemoveJson { path, pointer } => {
                let mut doc = workspace.read_json(path)?;
                if store::remove_pointer(&mut doc, pointer)?.is_some() {
                    workspace.write_json(path, &doc)?;
                } else {
                    log::warn!("{path}: nothing to remove at {pointer}");
                }
            }
            Self::MergeJson {
                path,
                pointer,
                sources,
                tables,
            } => {
                let mut layers = Vec::with_capacity(sources.len() + tables.len());
                for source in sources {
                    let asset = context.asset(source);
                    match store::read_json(&asset)? {
                        Value::Object(map) => layers.push(map),
                        _ => {
                            return Err(Error::invalid_manifest(format!(
                                "merge source {} is not a JSON object",
                                asset.display()
                            )));
                        }
                    }
                }
                layers.extend(tables.iter().cloned());

                let mut doc = workspace.read_json(path)?;
                let target = object_at(&mut doc, pointer.as_deref().unwrap_or(""))?;
                for layer in layers {
                    store::override_json(target, layer);
                }
                workspace.write_json(path, &doc)?;
            }
            Self::MergeLang {
                path,
                sources,
                tables,
            } => {
                let mut layers = vec![workspace.read_lang(path)?];
                for source in sources {
                    layers.push(store::read_lang(context.asset(source))?);
                }
                layers.extend(tables.iter().cloned());
                workspace.write_lang(path, &store::merge_lang_tables(layers))?;
            }
            Self::SetToml {
                path,
                array,
                index,
                field,
                value,
            } => {
                let mut doc = workspace.read_toml(path)?;
                store::set_table_array_field(&mut doc, array, *index, field, value.clone())?;
                workspace.write_toml(path, &doc)?;
            }
            Self::Recolor {
                path,
                palette,
                output,
            } => {
                let palette = context.palettes.get(palette)?;
                let input = workspace.resolve(path)?;
                let output = workspace.resolve(output.as_deref().unwrap_or(path))?;
                let stats = modjar_texture::recolor_file(&input, &output, palette)?;
                log::debug!(
                    "Recolored {path}: {} of {} pixels",
                    stats.recolored,
                    stats.pixels
                );
            }
            Self::CopyAsset { source, target } => {
                let bytes = workspace.copy_in(context.asset(source), target)?;
                log::debug!("Copied {source} to {target} ({bytes} bytes)");
            }
        }
        Ok(())
    }
}

fn object_at<'a>(doc: &'a mut Value, pointer: &str) -> Result<&'a mut Map<String, Value>> {
    if !pointer.is_empty() && doc.pointer(pointer).is_none() {
        store::set_pointer(doc, pointer, Value::Object(Map::new()))?;
    }
    doc.pointer_mut(pointer)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| {
            Error::Data(modjar_data::Error::InvalidPointer {
                pointer: pointer.to_string(),
                reason: "merge target is not an object".to_string(),
            })
        })
}

/// Where a script finds its assets and palettes
#[derive(Debug, Clone, Default)]
pub struct ScriptContext {
    asset_root: PathBuf,
    palettes: Arc<PaletteRegistry>,
}

impl ScriptContext {
    /// Create a context
    pub fn new(asset_root: PathBuf, palettes: Arc<PaletteRegistry>) -> Self {
        Self {
            asset_root,
            palettes,
        }
    }

    /// Directory asset paths are relative to
    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Resolve an asset path
    pub fn asset(&self, rel: &str) -> PathBuf {
        self.asset_root.join(rel)
    }
}

fn default_indent() -> u8 {
    4
}

/// A script declared in the manifest
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptSpec {
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Spaces of JSON indentation used for every JSON write (2 or 4)
    #[serde(default = "default_indent")]
    pub json_indent: u8,
    /// Escape non-ASCII characters in JSON writes
    #[serde(default)]
    pub escape_non_ascii: bool,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(skip)]
    pub(crate) context: ScriptContext,
}

impl ScriptSpec {
    /// Build a script in code
    pub fn new(steps: Vec<Step>, context: ScriptContext) -> Self {
        Self {
            description: None,
            json_indent: default_indent(),
            escape_non_ascii: false,
            steps,
            context,
        }
    }

    /// JSON style the script writes with
    pub fn json_style(&self) -> JsonStyle {
        let indent = JsonIndent::from_spaces(self.json_indent).unwrap_or_default();
        let style = JsonStyle::default().with_indent(indent);
        if self.escape_non_ascii {
            style.escaped()
        } else {
            style
        }
    }

    /// Asset and palette context
    pub fn context(&self) -> &ScriptContext {
        &self.context
    }

    /// Check the script before any archive is touched
    pub fn validate(&self, id: &str, palettes: &PaletteRegistry) -> Result<()> {
        if JsonIndent::from_spaces(self.json_indent).is_none() {
            return Err(Error::invalid_manifest(format!(
                "script '{id}': json_indent must be 2 or 4, got {}",
                self.json_indent
            )));
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate(palettes).map_err(|reason| {
                Error::invalid_manifest(format!("script '{id}' step {index}: {reason}"))
            })?;
        }
        Ok(())
    }
}

impl PatchScript for ScriptSpec {
    fn run(&self, workspace: &mut Workspace) -> Result<()> {
        workspace.set_json_style(self.json_style());
        for (index, step) in self.steps.iter().enumerate() {
            log::debug!("Step {index}: {}", step.op());
            step.run(workspace, &self.context)
                .map_err(|e| Error::Step {
                    index,
                    op: step.op(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}
