use crate::model::Bucket;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: the bucket series is empty")]
    Empty,

    #[error("CSV Error")]
    Csv(#[from] csv::Error),

    #[error("FS Error")]
    Fs(#[from] std::io::Error),
}

/// Serialize the aggregated bucket sequence to CSV text.
///
/// Header is `time,fraudCount,totalCount`, one row per bucket in sequence
/// order. An empty sequence is rejected with `ExportError::Empty` so callers
/// never hand the user a headers-only file.
pub fn series_to_csv(buckets: &[Bucket]) -> Result<String, ExportError> {
    if buckets.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for bucket in buckets {
        writer.serialize(bucket)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Fs(err.into_error()))?;

    Ok(String::from_utf8(bytes).expect("CSV output is valid UTF-8"))
}

/// Write the aggregated bucket sequence to a CSV file.
///
/// Rejects an empty sequence before creating the file.
pub fn write_series(path: impl AsRef<Path>, buckets: &[Bucket]) -> Result<(), ExportError> {
    if buckets.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut writer = csv::Writer::from_path(path)?;
    for bucket in buckets {
        writer.serialize(bucket)?;
    }
    writer.flush()?;

    Ok(())
}
