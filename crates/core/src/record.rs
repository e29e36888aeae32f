//! The canonical five-column product record.

use serde::{Deserialize, Serialize};

/// CSV header row, in output column order.
pub const CANONICAL_HEADERS: [&str; 5] = ["Item ID", "Item Name", "SKU", "Description", "Rate"];

/// One of the five canonical output columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    ItemId,
    ItemName,
    Sku,
    Description,
    Rate,
}

impl CanonicalField {
    /// All fields in output column order.
    pub const ALL: [CanonicalField; 5] = [
        Self::ItemId,
        Self::ItemName,
        Self::Sku,
        Self::Description,
        Self::Rate,
    ];

    /// Column header used in the CSV output.
    pub fn header(&self) -> &'static str {
        match self {
            Self::ItemId => CANONICAL_HEADERS[0],
            Self::ItemName => CANONICAL_HEADERS[1],
            Self::Sku => CANONICAL_HEADERS[2],
            Self::Description => CANONICAL_HEADERS[3],
            Self::Rate => CANONICAL_HEADERS[4],
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

/// A normalized product row. Missing source fields are empty strings.
///
/// Equality and hashing cover all five columns, which is what the
/// deduplicator keys on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRecord {
    #[serde(rename = "Item ID")]
    pub item_id: String,
    #[serde(rename = "Item Name")]
    pub item_name: String,
    #[serde(rename = "SKU")]
    pub sku: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Rate")]
    pub rate: String,
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::ItemId => &self.item_id,
            CanonicalField::ItemName => &self.item_name,
            CanonicalField::Sku => &self.sku,
            CanonicalField::Description => &self.description,
            CanonicalField::Rate => &self.rate,
        }
    }

    pub(crate) fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::ItemId => &mut self.item_id,
            CanonicalField::ItemName => &mut self.item_name,
            CanonicalField::Sku => &mut self.sku,
            CanonicalField::Description => &mut self.description,
            CanonicalField::Rate => &mut self.rate,
        };
        *slot = value;
    }

    /// True when every column is empty.
    pub fn is_empty(&self) -> bool {
        CanonicalField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Column values in header order.
    pub fn as_row(&self) -> [&str; 5] {
        [
            &self.item_id,
            &self.item_name,
            &self.sku,
            &self.description,
            &self.rate,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_follow_field_order() {
        let headers: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.header()).collect();
        assert_eq!(headers, CANONICAL_HEADERS);
    }

    #[test]
    fn set_and_get_round_trip_each_field() {
        let mut record = CanonicalRecord::default();
        for (i, field) in CanonicalField::ALL.iter().enumerate() {
            record.set(*field, format!("v{i}"));
        }
        assert_eq!(record.as_row(), ["v0", "v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn default_record_is_empty() {
        assert!(CanonicalRecord::default().is_empty());

        let record = CanonicalRecord {
            rate: "1".into(),
            ..Default::default()
        };
        assert!(!record.is_empty());
    }
}
