//! Re-exports of every public error type in the crate.

pub use crate::export::ExportError;
pub use crate::imports::transactions::TransactionsError;
pub use crate::model::GranularityError;
pub use crate::source::SourceError;
