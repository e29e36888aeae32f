//! Stable, whole-record deduplication.

use std::collections::HashSet;

use crate::record::CanonicalRecord;

/// Result of a dedup pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    /// First occurrence of every distinct record, in first-seen order.
    pub records: Vec<CanonicalRecord>,
    /// How many later copies were dropped.
    pub duplicates_removed: usize,
}

/// Keep the first occurrence of each distinct record.
///
/// Two records are duplicates only when all five columns are equal.
/// Running this on its own output removes nothing.
pub fn dedup<I>(records: I) -> Deduplicated
where
    I: IntoIterator<Item = CanonicalRecord>,
{
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut duplicates_removed = 0;

    for record in records {
        if seen.contains(&record) {
            duplicates_removed += 1;
            continue;
        }
        seen.insert(record.clone());
        kept.push(record);
    }

    Deduplicated {
        records: kept,
        duplicates_removed,
    }
}
