use crate::export::{self, ExportError};
use crate::imports::transactions::{read_records, TransactionsError};
use crate::model::{aggregate, Bucket, Granularity, Stats, TransactionRecord};
use tracing::{debug, warn};

/// Monotonically increasing load request id.
///
/// Each load attempt takes a ticket up front; only the result carrying the
/// most recently issued ticket may be applied. This replaces the implicit
/// last-to-resolve-wins race with an explicit rule when loads overlap.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LoadTicket(u64);

#[derive(Debug)]
pub enum LoadOutcome {
    /// The load was applied; records and buckets were replaced.
    Applied(Stats),

    /// The CSV had no data rows after the header; state is untouched.
    EmptyInput,

    /// A newer load ticket had already been issued; state is untouched.
    Superseded,
}

/// Explicit pipeline state: the current record set and its aggregation.
///
/// Records are parsed once per applied load and held immutably. Buckets are
/// fully recomputed (never patched) on every applied load and on every
/// granularity change.
#[derive(Debug)]
pub struct Pipeline {
    records: Vec<TransactionRecord>,
    buckets: Vec<Bucket>,
    granularity: Granularity,
    next_ticket: u64,
}

impl Pipeline {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            records: Vec::new(),
            buckets: Vec::new(),
            granularity,
            next_ticket: 0,
        }
    }

    /// Issue a ticket for a new load attempt, superseding all outstanding
    /// tickets.
    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Apply the CSV text resolved for `ticket`.
    ///
    /// Stale tickets yield `LoadOutcome::Superseded` without touching state.
    /// A parse failure also leaves the previous records and buckets intact.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        csv_text: &str,
    ) -> Result<LoadOutcome, TransactionsError> {
        if ticket.0 + 1 != self.next_ticket {
            warn!("Discarding superseded load result for ticket {}", ticket.0);
            return Ok(LoadOutcome::Superseded);
        }

        let mut stats = Stats::default();
        let records = read_records(&mut stats, csv_text)?;
        if stats.rows_read() == 0 {
            debug!("Load had no data rows; keeping previous state");
            return Ok(LoadOutcome::EmptyInput);
        }
        debug!(
            "Applying load: {valid} records, {dropped} rows dropped",
            valid = stats.valid_records(),
            dropped = stats.dropped(),
        );

        self.records = records;
        self.buckets = aggregate(&self.records, self.granularity);

        Ok(LoadOutcome::Applied(stats))
    }

    /// Change the bucket resolution and re-aggregate the held records.
    ///
    /// Runs over the already-parsed record set; the source is not re-read.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.buckets = aggregate(&self.records, self.granularity);
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// The current bucket sequence, as consumed by a renderer. Read-only;
    /// replaced wholesale on load or granularity change.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        export::series_to_csv(&self.buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use tracing_test::traced_test;

    const EXAMPLE_CSV: &str = "transaction_date,is_fraud\n\
        2024-03-07T14:05:00Z,1\n\
        2024-03-07T14:58:00Z,0\n\
        2024-03-07T15:02:00Z,1\n";

    fn loaded_pipeline(granularity: Granularity) -> Pipeline {
        let mut pipeline = Pipeline::new(granularity);
        let ticket = pipeline.begin_load();
        let outcome = pipeline.apply_load(ticket, EXAMPLE_CSV).unwrap();
        assert!(matches!(outcome, LoadOutcome::Applied(_)));

        pipeline
    }

    #[test]
    #[traced_test]
    fn end_to_end_hourly() {
        let _ = tracing_log::LogTracer::init();

        let pipeline = loaded_pipeline(Granularity::Hour);

        assert_eq!(
            pipeline.buckets(),
            [
                Bucket {
                    key: "2024-03-07T14:00".to_string(),
                    fraud_count: 1,
                    total_count: 2,
                },
                Bucket {
                    key: "2024-03-07T15:00".to_string(),
                    fraud_count: 1,
                    total_count: 1,
                },
            ]
        );
    }

    #[test]
    fn granularity_change_reaggregates_without_reparse() {
        let mut pipeline = loaded_pipeline(Granularity::Hour);
        let records_before: Vec<_> = pipeline.records().to_vec();

        pipeline.set_granularity(Granularity::Day);

        assert_eq!(pipeline.records(), records_before.as_slice());
        assert_eq!(pipeline.buckets().len(), 1);
        assert_eq!(pipeline.buckets()[0].key, "2024-03-07");
        assert_eq!(pipeline.buckets()[0].fraud_count, 2);
        assert_eq!(pipeline.buckets()[0].total_count, 3);

        pipeline.set_granularity(Granularity::Minute);
        assert_eq!(pipeline.buckets().len(), 3);
    }

    #[test]
    fn stale_ticket_is_superseded() {
        let mut pipeline = Pipeline::new(Granularity::Hour);

        let first = pipeline.begin_load();
        let second = pipeline.begin_load();

        // The old ticket resolving after a newer one was issued is ignored.
        let outcome = pipeline
            .apply_load(first, "transaction_date,is_fraud\n2020-01-01T00:00:00Z,1\n")
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::Superseded));
        assert!(pipeline.records().is_empty());
        assert!(pipeline.buckets().is_empty());

        let outcome = pipeline.apply_load(second, EXAMPLE_CSV).unwrap();
        assert!(matches!(outcome, LoadOutcome::Applied(_)));
        assert_eq!(pipeline.records().len(), 3);

        // And the old ticket still cannot clobber the applied result.
        let outcome = pipeline
            .apply_load(first, "transaction_date,is_fraud\n2020-01-01T00:00:00Z,1\n")
            .unwrap();
        assert!(matches!(outcome, LoadOutcome::Superseded));
        assert_eq!(pipeline.records().len(), 3);
    }

    #[test]
    fn empty_input_keeps_previous_state() {
        let mut pipeline = loaded_pipeline(Granularity::Hour);

        let ticket = pipeline.begin_load();
        let outcome = pipeline
            .apply_load(ticket, "transaction_date,is_fraud\n")
            .unwrap();

        assert!(matches!(outcome, LoadOutcome::EmptyInput));
        assert_eq!(pipeline.records().len(), 3);
        assert_eq!(pipeline.buckets().len(), 2);
    }

    #[test]
    fn empty_pipeline_export_rejected() {
        let pipeline = Pipeline::new(Granularity::Hour);

        assert!(matches!(pipeline.export_csv(), Err(ExportError::Empty)));
    }

    #[test]
    fn export_round_trips_counts() {
        let pipeline = loaded_pipeline(Granularity::Hour);

        let csv_text = pipeline.export_csv().unwrap();
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let reparsed: Vec<Bucket> = reader
            .deserialize()
            .collect::<Result<_, csv::Error>>()
            .unwrap();

        assert_eq!(reparsed.as_slice(), pipeline.buckets());
    }
}
