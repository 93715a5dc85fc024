use crate::model::records::{parse_timestamp, TransactionRecord};
use crate::model::Stats;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Lookup column names. Matched against the header row exactly
/// (case-sensitive); column order in the CSV is irrelevant.
pub const DATE_COLUMN: &str = "transaction_date";
pub const FRAUD_COLUMN: &str = "is_fraud";

#[derive(Debug, Error)]
pub enum TransactionsError {
    #[error("CSV Error")]
    Csv(#[from] csv::Error),

    #[error("FS Error")]
    Fs(#[from] std::io::Error),
}

/// Parse CSV text into validated transaction records.
///
/// The first row is the header; the `transaction_date` and `is_fraud` columns
/// are located by name. A missing lookup column is not an error: every row
/// then fails validation and the result is empty. Per-row validation drops
/// (and counts in `Stats`):
///
/// - rows with an empty or absent date field,
/// - rows too short to carry the fraud flag,
/// - rows whose non-empty date fails to parse.
///
/// An `is_fraud` value is fraud only when it is exactly `"1"`; any other
/// present value (including `"0"` and the empty string) is non-fraud. Output
/// order matches input row order. A header-only or empty input yields an
/// empty record set.
pub fn read_records(
    s: &mut Stats,
    csv_text: &str,
) -> Result<Vec<TransactionRecord>, TransactionsError> {
    // Flexible mode lets short rows surface as absent fields instead of
    // aborting the whole load.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?;
    let date_index = headers.iter().position(|name| name == DATE_COLUMN);
    let fraud_index = headers.iter().position(|name| name == FRAUD_COLUMN);

    let mut records = Vec::new();

    debug!("Parsing transaction rows");
    for result in reader.records() {
        let row = result?;
        s.inc_rows_read();

        let date = date_index.and_then(|index| row.get(index));
        let date = match date {
            None | Some("") => {
                debug!("Dropping row with missing date: {row:?}");
                s.inc_dropped_missing_date();
                continue;
            }
            Some(date) => date,
        };

        let Some(fraud) = fraud_index.and_then(|index| row.get(index)) else {
            debug!("Dropping row with missing fraud flag: {row:?}");
            s.inc_dropped_missing_flag();
            continue;
        };

        match parse_timestamp(date) {
            Some(time) => {
                let record = TransactionRecord {
                    time,
                    is_fraud: fraud == "1",
                };
                debug!("Parsed: {record:?}");

                records.push(record);
                s.inc_valid_records();
            }
            None => {
                debug!("Dropping row with unparseable date `{date}`: {row:?}");
                s.inc_dropped_invalid_date();
            }
        }
    }

    Ok(records)
}

/// Read and parse a transaction CSV from a file.
pub fn read_records_path(
    s: &mut Stats,
    path: impl AsRef<Path>,
) -> Result<Vec<TransactionRecord>, TransactionsError> {
    let csv_text = std::fs::read_to_string(path)?;

    read_records(s, &csv_text)
}
