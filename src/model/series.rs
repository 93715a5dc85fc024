use crate::model::records::TransactionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GranularityError {
    #[error("Invalid granularity. Try one of: `day`, `hour`, `minute`")]
    Granularity,
}

/// Time bucket resolution used to derive bucket keys from timestamps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Granularity {
    Day,
    Hour,
    Minute,
}

impl TryFrom<String> for Granularity {
    type Error = GranularityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            _ => Err(Self::Error::Granularity),
        }
    }
}

impl Granularity {
    /// Derive the bucket key for a timestamp by truncating it to this
    /// resolution.
    pub fn bucket_key(&self, time: DateTime<Utc>) -> String {
        match self {
            Self::Day => time.format("%F").to_string(),
            Self::Hour => time.format("%FT%H:00").to_string(),
            Self::Minute => time.format("%FT%H:%M").to_string(),
        }
    }
}

/// An aggregation unit keyed by a truncated timestamp, holding fraud and
/// total transaction counts. `fraud_count <= total_count` always holds.
#[cfg_attr(test, derive(serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Bucket {
    #[serde(rename = "time")]
    pub key: String,
    #[serde(rename = "fraudCount")]
    pub fraud_count: u64,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// Reduce a record sequence into buckets at the given granularity.
///
/// Buckets are emitted in first-seen order of their keys, never re-sorted
/// chronologically. Consumers rely on that order. Pure function of its
/// inputs: aggregating the same records twice yields identical sequences.
pub fn aggregate(records: &[TransactionRecord], granularity: Granularity) -> Vec<Bucket> {
    let mut index = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for record in records {
        let key = granularity.bucket_key(record.time);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = buckets.len();
                buckets.push(Bucket {
                    key: key.clone(),
                    fraud_count: 0,
                    total_count: 0,
                });
                index.insert(key, slot);
                slot
            }
        };

        let bucket = &mut buckets[slot];
        bucket.total_count += 1;
        if record.is_fraud {
            bucket.fraud_count += 1;
        }
    }

    buckets
}
