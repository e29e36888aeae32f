//! CSV serialization of canonical records.
//!
//! Output is UTF-8, comma-delimited, `\n`-terminated, with RFC-4180 quoting
//! (fields holding a comma, quote or line break are quoted; quotes are
//! doubled). The header row is always [`CANONICAL_HEADERS`].

use crate::error::CoreError;
use crate::record::{CanonicalRecord, CANONICAL_HEADERS};

/// UTF-8 byte-order mark, which spreadsheet tools use to detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    /// Prefix the output with [`UTF8_BOM`].
    pub excel_bom: bool,
}

/// Serialize `records` under the fixed header row.
pub fn write_csv(records: &[CanonicalRecord], options: CsvOptions) -> Result<Vec<u8>, CoreError> {
    let mut buffer = Vec::with_capacity(64 * (records.len() + 1));
    if options.excel_bom {
        buffer.extend_from_slice(UTF8_BOM);
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buffer);

    writer.write_record(CANONICAL_HEADERS)?;
    for record in records {
        writer.write_record(record.as_row())?;
    }

    writer.into_inner().map_err(|e| CoreError::Io(e.into_error()))
}
