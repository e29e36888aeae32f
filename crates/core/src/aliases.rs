//! Field alias table and the object-to-record field mapper.
//!
//! Each canonical column has an ordered list of alias keys. When mapping an
//! object, the first alias (in list order) that resolves to a non-empty
//! scalar wins. Keys are compared after [`normalize_key`], so `"Item ID"`,
//! `"item_id"` and `"itemId"` are the same alias. An alias may be a dotted
//! path (`buybox_winner.price`) that walks into nested objects.
//!
//! The table is plain data: the built-in [`AliasConfig::default`] can be
//! replaced at startup by a JSON file of the same shape.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::record::{CanonicalField, CanonicalRecord};

/// Leading currency amount in a price string, e.g. `$1,299.00`.
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$?([\d,]*\d(?:\.\d*)?)").expect("valid regex"));

/// Maximum number of segments in a dotted alias path.
pub const MAX_ALIAS_DEPTH: usize = 4;

// ── Config (serialisable) ────────────────────────────────────────────

/// Alias lists per canonical column, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldAliases {
    pub item_id: Vec<String>,
    pub item_name: Vec<String>,
    pub sku: Vec<String>,
    pub description: Vec<String>,
    pub rate: Vec<String>,
}

impl FieldAliases {
    pub fn for_field(&self, field: CanonicalField) -> &[String] {
        match field {
            CanonicalField::ItemId => &self.item_id,
            CanonicalField::ItemName => &self.item_name,
            CanonicalField::Sku => &self.sku,
            CanonicalField::Description => &self.description,
            CanonicalField::Rate => &self.rate,
        }
    }
}

/// The externally configurable alias table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasConfig {
    pub fields: FieldAliases,
    /// Object keys that may hold the list of product records.
    #[serde(default = "default_list_fields")]
    pub list_fields: Vec<String>,
    /// Keys whose object value is overlaid on its parent before mapping
    /// (`{"product": {...}, "offers": {...}}`).
    #[serde(default = "default_wrapper_keys")]
    pub wrapper_keys: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_list_fields() -> Vec<String> {
    strings(&["products", "items", "search_results", "results", "records", "data"])
}

fn default_wrapper_keys() -> Vec<String> {
    strings(&["product"])
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            fields: FieldAliases {
                item_id: strings(&[
                    "item_id",
                    "model_number",
                    "identifiers.product_id",
                    "identifiers.item_id",
                    "id",
                    "product_id",
                ]),
                item_name: strings(&["title", "name", "item_name", "product_name"]),
                sku: strings(&[
                    "model_number",
                    "store_sku",
                    "identifiers.sku",
                    "identifiers.model_number",
                    "sku",
                    "item_sku",
                    "product_sku",
                    "model",
                ]),
                description: strings(&[
                    "description",
                    "item_description",
                    "product_description",
                    "details",
                    "long_description",
                    "snippet",
                    "content_spec.description",
                ]),
                rate: strings(&[
                    "buybox_winner.price",
                    "price",
                    "rate",
                    "item_price",
                    "unit_price",
                    "offers.primary.price",
                ]),
            },
            list_fields: default_list_fields(),
            wrapper_keys: default_wrapper_keys(),
        }
    }
}

// ── Compiled table ───────────────────────────────────────────────────

/// A validated [`AliasConfig`] with every key pre-normalized.
#[derive(Debug, Clone)]
pub struct AliasTable {
    config: AliasConfig,
    /// Normalized alias paths, indexed like [`CanonicalField::ALL`].
    paths: [Vec<Vec<String>>; 5],
    list_fields: Vec<String>,
    wrapper_keys: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(AliasConfig::default()).expect("built-in alias table is valid")
    }
}

impl AliasTable {
    /// Validate and compile a config.
    ///
    /// Every column needs at least one alias; aliases must be non-empty and
    /// at most [`MAX_ALIAS_DEPTH`] segments deep.
    pub fn new(config: AliasConfig) -> Result<Self, CoreError> {
        let mut paths: [Vec<Vec<String>>; 5] = Default::default();

        for (slot, field) in paths.iter_mut().zip(CanonicalField::ALL) {
            let aliases = config.fields.for_field(field);
            if aliases.is_empty() {
                return Err(CoreError::InvalidAliasTable(format!(
                    "column '{field}' has no aliases"
                )));
            }
            for alias in aliases {
                let path = compile_path(alias).ok_or_else(|| {
                    CoreError::InvalidAliasTable(format!(
                        "column '{field}' has an invalid alias '{alias}'"
                    ))
                })?;
                slot.push(path);
            }
        }

        let list_fields = compile_keys(&config.list_fields, "list field")?;
        let wrapper_keys = compile_keys(&config.wrapper_keys, "wrapper key")?;

        Ok(Self {
            config,
            paths,
            list_fields,
            wrapper_keys,
        })
    }

    /// Load a table from a JSON file shaped like [`AliasConfig`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: AliasConfig = serde_json::from_str(&text).map_err(|e| {
            CoreError::InvalidAliasTable(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::new(config)
    }

    /// The config this table was built from.
    pub fn config(&self) -> &AliasConfig {
        &self.config
    }

    /// Map one flat (or shallowly nested) object onto a canonical record.
    ///
    /// Never fails: unmatched columns stay empty and unknown keys are ignored.
    pub fn map_object(&self, object: &Map<String, Value>) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();

        for (paths, field) in self.paths.iter().zip(CanonicalField::ALL) {
            let found = paths.iter().find_map(|path| {
                let value = resolve_path(object, path)?;
                scalar_text(value).map(|text| (value, text))
            });

            if let Some((value, text)) = found {
                // Only free-text prices are cleaned; JSON numbers are already amounts.
                let text = if field == CanonicalField::Rate && value.is_string() {
                    clean_price(&text)
                } else {
                    text
                };
                record.set(field, text);
            }
        }

        record
    }

    /// Whether `key` names a configured list field.
    pub fn is_list_field(&self, key: &str) -> bool {
        let key = normalize_key(key);
        self.list_fields.iter().any(|k| *k == key)
    }

    /// Whether `key` names a configured wrapper key.
    pub fn is_wrapper_key(&self, key: &str) -> bool {
        let key = normalize_key(key);
        self.wrapper_keys.iter().any(|k| *k == key)
    }

    /// List-field names in configured priority order (normalized).
    pub(crate) fn list_fields(&self) -> &[String] {
        &self.list_fields
    }
}

fn compile_path(alias: &str) -> Option<Vec<String>> {
    let segments: Vec<String> = alias.split('.').map(normalize_key).collect();
    if segments.is_empty() || segments.len() > MAX_ALIAS_DEPTH || segments.iter().any(String::is_empty)
    {
        return None;
    }
    Some(segments)
}

fn compile_keys(keys: &[String], what: &str) -> Result<Vec<String>, CoreError> {
    keys.iter()
        .map(|k| {
            let normalized = normalize_key(k);
            if normalized.is_empty() {
                Err(CoreError::InvalidAliasTable(format!("empty {what}")))
            } else {
                Ok(normalized)
            }
        })
        .collect()
}

// ── Key matching ─────────────────────────────────────────────────────

/// Fold a key for comparison: lowercase, drop whitespace, `_` and `-`.
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the entry whose key normalizes to `normalized`.
///
/// A source key already in folded form is found directly. Otherwise, when
/// several source keys fold to the same name, the one that sorts first wins:
/// the map keeps keys in sorted order, not document order.
pub(crate) fn lookup_entry<'a>(
    object: &'a Map<String, Value>,
    normalized: &str,
) -> Option<(&'a str, &'a Value)> {
    if let Some((key, value)) = object.get_key_value(normalized) {
        return Some((key.as_str(), value));
    }
    object
        .iter()
        .find(|(key, _)| normalize_key(key) == normalized)
        .map(|(key, value)| (key.as_str(), value))
}

pub(crate) fn lookup<'a>(object: &'a Map<String, Value>, normalized: &str) -> Option<&'a Value> {
    lookup_entry(object, normalized).map(|(_, value)| value)
}

fn resolve_path<'a>(object: &'a Map<String, Value>, path: &[String]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = object;
    for segment in parents {
        current = lookup(current, segment)?.as_object()?;
    }
    lookup(current, last)
}

/// Text of a scalar JSON value. Null, empty strings and containers yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Pull the numeric amount out of a price string (`"$1,299.00"` -> `1299.00`).
///
/// Strings without digits are returned unchanged.
pub fn clean_price(raw: &str) -> String {
    match PRICE_RE.captures(raw).and_then(|c| c.get(1)) {
        Some(amount) => amount.as_str().replace(',', ""),
        None => raw.to_string(),
    }
}
