//! Shape classification and record extraction for raw JSON documents.
//!
//! A document is classified once into a [`DocumentShape`]; extraction then
//! works off the classified shape instead of probing types as it goes.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::aliases::{lookup_entry, AliasTable};
use crate::record::CanonicalRecord;

/// How deep list discovery descends through nested list fields
/// (`search_results` -> `products`).
pub const MAX_LIST_DEPTH: usize = 4;

/// The classified shape of a raw JSON document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentShape<'a> {
    /// An object with no product list; the object itself is one record.
    SingleObject(&'a Value),
    /// An object holding a product list under `path` (dotted, source key names).
    ObjectWithList { path: String, items: &'a [Value] },
    /// A top-level array; each object element is a record.
    ArrayOfObjects(&'a [Value]),
    /// A scalar document that cannot hold records.
    Invalid { found: &'static str },
}

impl<'a> DocumentShape<'a> {
    /// Classify a parsed document against the table's list-field names.
    pub fn classify(document: &'a Value, table: &AliasTable) -> Self {
        match document {
            Value::Array(items) => Self::ArrayOfObjects(items),
            Value::Object(object) => match find_list(object, table, 1) {
                Some((path, items)) => Self::ObjectWithList { path, items },
                None => Self::SingleObject(document),
            },
            other => Self::Invalid {
                found: json_type_name(other),
            },
        }
    }

    /// Short name of the variant, for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SingleObject(_) => "single_object",
            Self::ObjectWithList { .. } => "object_with_list",
            Self::ArrayOfObjects(_) => "array_of_objects",
            Self::Invalid { .. } => "invalid",
        }
    }

    /// Candidate record values (objects and non-objects alike).
    fn candidates(&self) -> &'a [Value] {
        match self {
            Self::SingleObject(value) => std::slice::from_ref(*value),
            Self::ObjectWithList { items, .. } => *items,
            Self::ArrayOfObjects(items) => *items,
            Self::Invalid { .. } => &[],
        }
    }

    /// Number of list elements that are not objects and will be skipped.
    pub fn non_object_elements(&self) -> usize {
        self.candidates().iter().filter(|v| !v.is_object()).count()
    }

    /// Lazily map every object candidate to a canonical record.
    pub fn records(&self, table: &'a AliasTable) -> impl Iterator<Item = CanonicalRecord> + 'a {
        self.candidates()
            .iter()
            .filter_map(Value::as_object)
            .map(move |object| table.map_object(&unwrap_wrappers(object, table)))
    }
}

/// Classify `document` and map it in one call.
pub fn normalize<'a>(
    document: &'a Value,
    table: &'a AliasTable,
) -> impl Iterator<Item = CanonicalRecord> + 'a {
    let shape = DocumentShape::classify(document, table);
    shape.records(table)
}

/// Search configured list fields, in priority order, for an array value.
///
/// The first list field holding an array wins even when that array is empty
/// or has no objects. Object-valued list fields are searched recursively.
fn find_list<'a>(
    object: &'a Map<String, Value>,
    table: &AliasTable,
    depth: usize,
) -> Option<(String, &'a [Value])> {
    if depth > MAX_LIST_DEPTH {
        return None;
    }

    for name in table.list_fields() {
        let Some((key, value)) = lookup_entry(object, name) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                return Some((key.to_string(), items.as_slice()));
            }
            Value::Object(inner) => {
                if let Some((path, items)) = find_list(inner, table, depth + 1) {
                    return Some((format!("{key}.{path}"), items));
                }
            }
            _ => {}
        }
    }

    None
}

/// Overlay wrapper objects (`{"product": {...}}`) onto their parent.
///
/// The wrapper's own fields win over the parent's on collision; the parent's
/// other fields (`buybox_winner`, `offers`) stay reachable.
fn unwrap_wrappers<'a>(
    object: &'a Map<String, Value>,
    table: &AliasTable,
) -> Cow<'a, Map<String, Value>> {
    let has_wrapper = object
        .iter()
        .any(|(key, value)| value.is_object() && table.is_wrapper_key(key));
    if !has_wrapper {
        return Cow::Borrowed(object);
    }

    let mut merged = Map::new();
    let mut wrapped = Vec::new();
    for (key, value) in object {
        match value {
            Value::Object(inner) if table.is_wrapper_key(key) => wrapped.push(inner),
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    for inner in wrapped {
        for (key, value) in inner {
            merged.insert(key.clone(), value.clone());
        }
    }
    Cow::Owned(merged)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
