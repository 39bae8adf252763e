//! Log ingestion
//!
//! Turns a heterogeneous structured log stream into an ordered sequence of
//! memory samples. Lines that are not memory records, or are broken ones,
//! are skipped and counted rather than failing the scan.

mod extractor;
mod store;

#[cfg(test)]
mod tests;

pub use extractor::{RecordExtractor, Rejection};
pub use store::{SampleStore, ScanStats};
