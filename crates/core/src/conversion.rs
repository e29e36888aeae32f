//! The end-to-end conversion pipeline: parse → normalize → dedup → CSV.
//!
//! Failures are isolated per file. A file that cannot be parsed, or whose
//! top-level value cannot hold records, is reported as skipped and the
//! remaining files still convert. Only an overall empty result is an error.

use serde::Serialize;

use crate::aliases::AliasTable;
use crate::csv_writer::{write_csv, CsvOptions, UTF8_BOM};
use crate::dedup::dedup;
use crate::error::CoreError;
use crate::normalizer::DocumentShape;
use crate::record::CanonicalRecord;

/// One uploaded file, in upload order.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ConversionOptions {
    pub csv: CsvOptions,
    /// Discard records whose five columns are all empty.
    pub drop_empty_records: bool,
    /// Skip files whose name does not end in `.json`.
    pub json_extension_only: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            drop_empty_records: false,
            json_extension_only: true,
        }
    }
}

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted {
        /// [`DocumentShape::kind`] of the parsed document.
        shape: &'static str,
        records: usize,
        /// List elements ignored because they were not objects.
        skipped_elements: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }
}

/// Counters and per-file outcomes for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    pub files_received: usize,
    pub files_converted: usize,
    pub files_skipped: usize,
    /// Records produced by the normalizer, before any filtering.
    pub records_extracted: usize,
    pub empty_records_dropped: usize,
    pub duplicates_removed: usize,
    pub records_written: usize,
    pub files: Vec<FileReport>,
}

/// A finished conversion: the CSV bytes plus what went into them.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub csv: Vec<u8>,
    pub records: Vec<CanonicalRecord>,
    pub summary: ConversionSummary,
}

/// Whether `file_name` carries a `.json` extension (case-insensitive).
pub fn has_json_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Convert uploaded documents into one deduplicated CSV.
///
/// Returns [`CoreError::EmptyResult`] when there are no documents or no
/// record survives; the error carries the per-file outcomes.
pub fn convert_documents(
    documents: &[UploadedDocument],
    table: &AliasTable,
    options: ConversionOptions,
) -> Result<Conversion, CoreError> {
    let mut summary = ConversionSummary {
        files_received: documents.len(),
        ..Default::default()
    };
    let mut record_set = Vec::new();

    for document in documents {
        let outcome = match extract(document, table, options) {
            Ok((shape, skipped_elements, records)) => {
                tracing::info!(
                    file = %document.file_name,
                    shape,
                    records = records.len(),
                    skipped_elements,
                    "Normalized file"
                );
                let outcome = FileOutcome::Converted {
                    shape,
                    records: records.len(),
                    skipped_elements,
                };
                record_set.extend(records);
                outcome
            }
            Err(reason) => {
                tracing::warn!(file = %document.file_name, %reason, "Skipping file");
                FileOutcome::Skipped { reason }
            }
        };

        summary.files.push(FileReport {
            file_name: document.file_name.clone(),
            outcome,
        });
    }

    summary.files_skipped = summary.files.iter().filter(|f| f.is_skipped()).count();
    summary.files_converted = summary.files_received - summary.files_skipped;
    summary.records_extracted = record_set.len();

    if options.drop_empty_records {
        record_set.retain(|record: &CanonicalRecord| !record.is_empty());
        summary.empty_records_dropped = summary.records_extracted - record_set.len();
    }

    let deduplicated = dedup(record_set);
    summary.duplicates_removed = deduplicated.duplicates_removed;
    summary.records_written = deduplicated.records.len();

    if deduplicated.records.is_empty() {
        tracing::warn!(
            files_received = summary.files_received,
            files_skipped = summary.files_skipped,
            "Conversion produced no records"
        );
        return Err(CoreError::EmptyResult {
            files: summary.files,
        });
    }

    let csv = write_csv(&deduplicated.records, options.csv)?;

    tracing::info!(
        files_converted = summary.files_converted,
        files_skipped = summary.files_skipped,
        records_written = summary.records_written,
        duplicates_removed = summary.duplicates_removed,
        "Conversion complete"
    );

    Ok(Conversion {
        csv,
        records: deduplicated.records,
        summary,
    })
}

/// Parse and normalize one file. `Err` carries the user-facing skip reason.
fn extract(
    document: &UploadedDocument,
    table: &AliasTable,
    options: ConversionOptions,
) -> Result<(&'static str, usize, Vec<CanonicalRecord>), String> {
    if options.json_extension_only && !has_json_extension(&document.file_name) {
        return Err("not a .json file".to_string());
    }

    let bytes = document
        .bytes
        .strip_prefix(UTF8_BOM)
        .unwrap_or(&document.bytes);
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| format!("invalid JSON: {e}"))?;

    let shape = DocumentShape::classify(&value, table);
    if let DocumentShape::Invalid { found } = &shape {
        return Err(format!("top-level JSON {found} holds no product records"));
    }

    let skipped_elements = shape.non_object_elements();
    let records = shape.records(table).collect();
    Ok((shape.kind(), skipped_elements, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn convert(documents: &[UploadedDocument]) -> Result<Conversion, CoreError> {
        convert_documents(documents, &AliasTable::default(), ConversionOptions::default())
    }

    fn csv_text(conversion: &Conversion) -> &str {
        std::str::from_utf8(&conversion.csv).unwrap()
    }

    const WIDGET: &str = r#"{"item_id":"1","name":"Widget","sku":"W1","rate":"9.99"}"#;

    #[test]
    fn duplicate_list_entries_collapse_to_one_row() {
        let body = format!(r#"{{"products":[{WIDGET},{WIDGET}]}}"#);
        let conversion = convert(&[UploadedDocument::new("a.json", body)]).unwrap();

        assert_eq!(
            csv_text(&conversion),
            "Item ID,Item Name,SKU,Description,Rate\n1,Widget,W1,,9.99\n"
        );
        assert_eq!(conversion.summary.records_extracted, 2);
        assert_eq!(conversion.summary.duplicates_removed, 1);
        assert_eq!(conversion.summary.records_written, 1);
    }

    #[test]
    fn duplicates_across_files_collapse() {
        let conversion = convert(&[
            UploadedDocument::new("a.json", WIDGET),
            UploadedDocument::new("b.json", WIDGET),
        ])
        .unwrap();

        assert_eq!(conversion.records.len(), 1);
        assert_eq!(conversion.summary.files_converted, 2);
    }

    #[test]
    fn invalid_file_is_skipped_and_others_convert() {
        let conversion = convert(&[
            UploadedDocument::new("a.json", r#"[{"sku":"A"}]"#),
            UploadedDocument::new("broken.json", "{ not json"),
            UploadedDocument::new("c.json", r#"{"items":[{"sku":"C"}]}"#),
        ])
        .unwrap();

        let skus: Vec<&str> = conversion.records.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, ["A", "C"]);

        let summary = &conversion.summary;
        assert_eq!(summary.files_received, 3);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files[1].file_name, "broken.json");
        assert_matches!(
            &summary.files[1].outcome,
            FileOutcome::Skipped { reason } if reason.starts_with("invalid JSON")
        );
    }

    #[test]
    fn record_order_follows_upload_order() {
        let conversion = convert(&[
            UploadedDocument::new("b.json", r#"[{"sku":"B1"},{"sku":"B2"}]"#),
            UploadedDocument::new("a.json", r#"[{"sku":"A1"},{"sku":"B1"}]"#),
        ])
        .unwrap();

        let skus: Vec<&str> = conversion.records.iter().map(|r| r.sku.as_str()).collect();
        assert_eq!(skus, ["B1", "B2", "A1"]);
    }

    #[test]
    fn scalar_document_is_skipped() {
        let result = convert(&[UploadedDocument::new("n.json", "42")]);

        assert_matches!(result, Err(CoreError::EmptyResult { files }) => {
            assert_matches!(
                &files[0].outcome,
                FileOutcome::Skipped { reason } if reason.contains("number")
            );
        });
    }

    #[test]
    fn no_documents_is_an_empty_result() {
        assert_matches!(convert(&[]), Err(CoreError::EmptyResult { files }) if files.is_empty());
    }

    #[test]
    fn empty_product_list_is_an_empty_result() {
        let result = convert(&[UploadedDocument::new("empty.json", r#"{"products": []}"#)]);

        assert_matches!(result, Err(CoreError::EmptyResult { files }) => {
            assert_eq!(
                files[0].outcome,
                FileOutcome::Converted {
                    shape: "object_with_list",
                    records: 0,
                    skipped_elements: 0,
                }
            );
        });
    }

    #[test]
    fn all_files_failing_is_an_empty_result() {
        let result = convert(&[
            UploadedDocument::new("a.json", "nope"),
            UploadedDocument::new("b.json", ""),
        ]);
        assert_matches!(result, Err(CoreError::EmptyResult { files }) if files.len() == 2);
    }

    #[test]
    fn non_json_extension_is_skipped_unless_allowed() {
        let documents = [
            UploadedDocument::new("notes.txt", WIDGET),
            UploadedDocument::new("b.JSON", r#"{"sku":"B"}"#),
        ];

        let conversion = convert(&documents).unwrap();
        assert_eq!(conversion.records.len(), 1);
        assert_matches!(
            &conversion.summary.files[0].outcome,
            FileOutcome::Skipped { reason } if reason == "not a .json file"
        );

        let options = ConversionOptions {
            json_extension_only: false,
            ..Default::default()
        };
        let conversion =
            convert_documents(&documents, &AliasTable::default(), options).unwrap();
        assert_eq!(conversion.records.len(), 2);
    }

    #[test]
    fn empty_records_are_kept_by_default_and_droppable() {
        let documents = [UploadedDocument::new(
            "a.json",
            r#"[{"colour":"red"},{"sku":"S"}]"#,
        )];

        let conversion = convert(&documents).unwrap();
        assert_eq!(conversion.records.len(), 2);

        let options = ConversionOptions {
            drop_empty_records: true,
            ..Default::default()
        };
        let conversion = convert_documents(&documents, &AliasTable::default(), options).unwrap();
        assert_eq!(conversion.records.len(), 1);
        assert_eq!(conversion.summary.empty_records_dropped, 1);
    }

    #[test]
    fn leading_byte_order_mark_is_tolerated() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(WIDGET.as_bytes());

        let conversion = convert(&[UploadedDocument::new("bom.json", bytes)]).unwrap();
        assert_eq!(conversion.records[0].item_id, "1");
    }

    #[test]
    fn summary_serializes_file_outcomes_with_status_tag() {
        let conversion = convert(&[
            UploadedDocument::new("a.json", WIDGET),
            UploadedDocument::new("b.json", "[1, 2]"),
            UploadedDocument::new("c.json", "true"),
        ])
        .unwrap();

        let json = serde_json::to_value(&conversion.summary).unwrap();
        assert_eq!(json["files_received"], 3);
        assert_eq!(json["files"][0]["status"], "converted");
        assert_eq!(json["files"][0]["shape"], "single_object");
        assert_eq!(json["files"][1]["records"], 0);
        assert_eq!(json["files"][1]["skipped_elements"], 2);
        assert_eq!(json["files"][2]["status"], "skipped");
        assert_eq!(json["files"][2]["file_name"], "c.json");
    }

    #[test]
    fn has_json_extension_checks_suffix() {
        assert!(has_json_extension("a.json"));
        assert!(has_json_extension("dir/A.Json"));
        assert!(!has_json_extension("json"));
        assert!(!has_json_extension("a.json.txt"));
    }
}
