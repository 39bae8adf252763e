//! Ordered sample store assembled from a log source

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use super::extractor::{RecordExtractor, Rejection};
use crate::error::{AnalysisError, Result};
use crate::models::MemorySample;

/// Counters gathered while scanning a log source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub lines_read: usize,
    /// Lines containing the marker token
    pub candidate_lines: usize,
    pub samples_extracted: usize,
    /// Candidate lines that did not yield a sample
    pub lines_rejected: usize,
    /// Samples whose timestamp is earlier than the previous sample's
    pub out_of_order: usize,
}

/// Time-ordered memory samples for one run, in source order
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    samples: Vec<MemorySample>,
    stats: ScanStats,
}

impl SampleStore {
    /// Scan a log file
    ///
    /// A missing or unreadable file is reported as
    /// [`AnalysisError::SourceUnavailable`].
    pub fn load(path: impl AsRef<Path>, extractor: &RecordExtractor) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source: io::Error| AnalysisError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unavailable)?;
        Self::from_reader(BufReader::new(file), extractor).map_err(unavailable)
    }

    /// Scan any buffered reader line by line
    ///
    /// Bytes that are not valid UTF-8 are replaced, never rejected.
    pub fn from_reader<R: BufRead>(mut reader: R, extractor: &RecordExtractor) -> io::Result<Self> {
        let mut store = Self::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            store.stats.lines_read += 1;

            let line = String::from_utf8_lossy(&buf);
            match extractor.try_extract(&line) {
                Ok(sample) => {
                    store.stats.candidate_lines += 1;
                    store.push(sample);
                }
                Err(Rejection::NoMarker) => {}
                Err(reason) => {
                    store.stats.candidate_lines += 1;
                    store.stats.lines_rejected += 1;
                    debug!(
                        line = store.stats.lines_read,
                        reason = %reason,
                        "Skipping memory record"
                    );
                }
            }
        }

        Ok(store)
    }

    /// Build a store from already-extracted samples, keeping their order
    pub fn from_samples(samples: Vec<MemorySample>) -> Self {
        let mut store = Self::default();
        for sample in samples {
            store.push(sample);
        }
        store
    }

    fn push(&mut self, sample: MemorySample) {
        if let Some(prev) = self.samples.last() {
            if sample.timestamp < prev.timestamp {
                self.stats.out_of_order += 1;
            }
        }
        self.stats.samples_extracted += 1;
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[MemorySample] {
        &self.samples
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples, or [`AnalysisError::NoSamples`] when the source had none
    pub fn require_samples(&self) -> Result<&[MemorySample]> {
        if self.samples.is_empty() {
            return Err(AnalysisError::NoSamples);
        }
        Ok(&self.samples)
    }

    pub fn into_samples(self) -> Vec<MemorySample> {
        self.samples
    }
}
