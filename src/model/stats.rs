/// Per-load ingest counters.
///
/// Malformed rows are dropped rather than failing the load, so the counters
/// are the only record of how much input was discarded and why.
#[derive(Debug, Default)]
pub struct Stats {
    n_rows_read: u64,
    n_valid_records: u64,
    n_dropped_missing_date: u64,
    n_dropped_missing_flag: u64,
    n_dropped_invalid_date: u64,
}

impl Stats {
    pub fn inc_rows_read(&mut self) {
        self.n_rows_read += 1;
    }

    pub fn inc_valid_records(&mut self) {
        self.n_valid_records += 1;
    }

    pub fn inc_dropped_missing_date(&mut self) {
        self.n_dropped_missing_date += 1;
    }

    pub fn inc_dropped_missing_flag(&mut self) {
        self.n_dropped_missing_flag += 1;
    }

    pub fn inc_dropped_invalid_date(&mut self) {
        self.n_dropped_invalid_date += 1;
    }

    pub fn rows_read(&self) -> u64 {
        self.n_rows_read
    }

    pub fn valid_records(&self) -> u64 {
        self.n_valid_records
    }

    pub fn dropped(&self) -> u64 {
        self.n_dropped_missing_date + self.n_dropped_missing_flag + self.n_dropped_invalid_date
    }

    pub fn pretty_print(&self) {
        println!("{self:#?}");
        println!();
    }
}
