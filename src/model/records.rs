use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A single validated transaction row.
///
/// Records are created once per load and held immutably for the session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransactionRecord {
    pub time: DateTime<Utc>,
    pub is_fraud: bool,
}

/// Parse a raw timestamp field into a UTC instant.
///
/// Accepts RFC 3339, naive date-times with an optional fractional second, and
/// bare dates. Naive forms are interpreted as UTC. Returns `None` for any
/// non-empty string that fails to parse; the caller drops such rows.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }

    for format in ["%FT%T%.f", "%F %T%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%F").ok()?;
    Some(NaiveDateTime::new(date, NaiveTime::default()).and_utc())
}
