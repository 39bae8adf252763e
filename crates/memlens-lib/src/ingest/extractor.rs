//! Memory sample extraction
//!
//! Telemetry is embedded in a general-purpose structured log stream, so most
//! lines are irrelevant and some relevant-looking ones are broken. Extraction
//! is best-effort: anything that cannot become a valid sample yields `None`.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::config::DEFAULT_MARKER;
use crate::models::MemorySample;

/// Fallback layout for producers that separate date and time with a space
const SPACE_SEPARATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Payload as written by the producer
///
/// Metrics decode leniently: a missing, null or mistyped metric reads as 0
/// instead of discarding a record whose timestamp is fine.
#[derive(Debug, Deserialize)]
struct RawRecord {
    msg: Option<String>,
    time: Option<String>,
    ts: Option<Value>,
    #[serde(default, deserialize_with = "lenient_f64")]
    rss_mb: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    rss_bytes: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    heap_mb: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    heap_alloc_bytes: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    heap_inuse_bytes: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    gc: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    goroutines: u64,
    #[serde(default, deserialize_with = "lenient_list")]
    modules: Vec<Value>,
}

/// Numeric value of a JSON number or numeric string
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value).unwrap_or(0.0))
}

/// Counters: exact integers pass through, whole floats are truncated,
/// negatives and non-numbers become 0
fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    Ok(match as_number(&value) {
        Some(n) if n >= 0.0 && n < u64::MAX as f64 => n as u64,
        _ => 0,
    })
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => Vec::new(),
    })
}

/// Why a line did not produce a sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Line does not mention the marker at all
    NoMarker,
    /// Missing `{` or `}` around the payload
    NoPayload,
    /// Payload is not a valid record
    Malformed(String),
    /// Record kind differs from the marker
    WrongKind(Option<String>),
    /// No parseable timestamp
    BadTimestamp,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NoMarker => write!(f, "marker not present"),
            Rejection::NoPayload => write!(f, "no structured payload"),
            Rejection::Malformed(err) => write!(f, "malformed payload: {}", err),
            Rejection::WrongKind(Some(kind)) => write!(f, "record kind '{}'", kind),
            Rejection::WrongKind(None) => write!(f, "record kind missing"),
            Rejection::BadTimestamp => write!(f, "unparseable timestamp"),
        }
    }
}

/// Turns log lines into memory samples
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    marker: String,
}

impl RecordExtractor {
    /// Create an extractor that accepts records whose kind equals `marker`
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Extract a sample from one line, or `None` if the line is not a valid
    /// memory record
    pub fn extract(&self, line: &str) -> Option<MemorySample> {
        self.try_extract(line).ok()
    }

    /// Like [`extract`](Self::extract) but reports why a line was skipped
    pub fn try_extract(&self, line: &str) -> Result<MemorySample, Rejection> {
        if !line.contains(self.marker.as_str()) {
            return Err(Rejection::NoMarker);
        }

        let payload = payload_slice(line).ok_or(Rejection::NoPayload)?;
        let raw: RawRecord =
            serde_json::from_str(payload).map_err(|e| Rejection::Malformed(e.to_string()))?;

        if raw.msg.as_deref() != Some(self.marker.as_str()) {
            return Err(Rejection::WrongKind(raw.msg));
        }

        let timestamp = resolve_timestamp(&raw).ok_or(Rejection::BadTimestamp)?;

        Ok(MemorySample {
            timestamp,
            rss_mb: raw.rss_mb,
            rss_bytes: raw.rss_bytes,
            heap_mb: raw.heap_mb,
            heap_alloc_bytes: raw.heap_alloc_bytes,
            heap_inuse_bytes: raw.heap_inuse_bytes,
            gc_count: raw.gc,
            goroutine_count: raw.goroutines,
            modules: raw.modules,
        })
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

/// Substring from the first `{` to the last `}`, inclusive
fn payload_slice(line: &str) -> Option<&str> {
    let start = line.find('{')?;
    let end = line.rfind('}')?;
    if end < start {
        return None;
    }
    line.get(start..=end)
}

/// `time` wins when present; `ts` is only consulted when `time` is absent
fn resolve_timestamp(raw: &RawRecord) -> Option<DateTime<FixedOffset>> {
    if let Some(time) = raw.time.as_deref() {
        return parse_instant(time);
    }

    match raw.ts.as_ref()? {
        Value::String(s) => parse_instant(s),
        Value::Number(n) => from_epoch_secs(n.as_f64()?),
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, SPACE_SEPARATED_FORMAT))
        .ok()
}

/// Unix epoch seconds (possibly fractional) as a UTC instant
fn from_epoch_secs(secs: f64) -> Option<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
    FixedOffset::east_opt(0)?
        .timestamp_opt(whole as i64, nanos.min(999_999_999))
        .single()
}
