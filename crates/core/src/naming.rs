use std::path::Path;

use chrono::NaiveDate;

use crate::types::ReceiptType;

/// Date rendering used in the log row (distinct from the filename form).
pub fn date_for_log(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Date rendering used in the synthesized filename.
pub fn date_for_filename(date: NaiveDate) -> String {
    date.format("%d.%m.%y").to_string()
}

/// Compose the storage filename for a processed receipt:
/// `{driver_id},{shorthand},{DD.MM.YY},{type label}` with every space in the
/// composed stem replaced by `_`, then the original file's extension
/// appended unchanged (dot and case preserved). A source file with no
/// extension yields a bare stem.
pub fn receipt_filename(
    driver_id: &str,
    amount_shorthand: &str,
    transaction_date: NaiveDate,
    receipt_type: ReceiptType,
    original_name: &str,
) -> String {
    let stem = format!(
        "{driver_id},{amount_shorthand},{},{receipt_type}",
        date_for_filename(transaction_date)
    )
    .replace(' ', "_");

    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    }
}
