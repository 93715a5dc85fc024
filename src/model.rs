pub use self::{records::*, series::*, stats::*};

pub(crate) mod records;
mod series;
mod stats;
