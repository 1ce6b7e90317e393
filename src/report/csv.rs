//! The CSV projection of the transaction list, used by the report download.

use crate::{Error, transaction::Transaction};

/// Render transactions as CSV with a header row.
///
/// Rows are written in the order given. Free-text fields that contain
/// commas, quotes, or newlines are quoted per RFC 4180, so the export can
/// always be re-imported by a spreadsheet.
///
/// # Errors
/// Returns an [Error::CsvError] if a record cannot be written.
pub fn export_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Date", "Type", "Category", "Description", "Amount", "Reconciled"])
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        writer
            .write_record([
                transaction.date.to_string(),
                transaction.kind.to_string(),
                transaction.category.clone(),
                transaction.description.clone(),
                transaction.amount.to_string(),
                if transaction.is_reconciled {
                    "Yes".to_owned()
                } else {
                    "No".to_owned()
                },
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}
