//! Snapshot reader boundary and in-memory implementation.
//!
//! The engine never performs I/O of its own: everything it consumes comes
//! through the [`SnapshotReader`] trait. `MemorySnapshotStore` is the
//! reference implementation over a bag of already-fetched observations,
//! used by the CLI and the tests; a production caller substitutes a reader
//! backed by its own storage.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use super::types::{DailyClose, PriceObservation};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid observation data: {0}")]
    InvalidData(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only access to market observations.
///
/// All three accessors are side-effect-free. Missing data is expressed as
/// `None` or an empty series, never an error — the engine degrades the
/// affected signal or pair instead of failing.
pub trait SnapshotReader {
    /// The most recent observation for a symbol, if any exists.
    fn latest_observation(&self, symbol: &str) -> Option<PriceObservation>;

    /// Daily closes over the trailing `lookback_days` calendar days,
    /// oldest to newest, one entry per day (latest timestamp wins).
    fn daily_close_series(&self, symbol: &str, lookback_days: i64) -> Vec<DailyClose>;

    /// The closest observation at least 7 days in the past, if any.
    fn week_over_week_observation(&self, symbol: &str) -> Option<PriceObservation>;
}

/// In-memory snapshot store with a fixed reference instant.
///
/// Lookbacks are computed relative to `as_of` rather than the wall clock so
/// results are reproducible for any given input set.
#[derive(Debug, Clone)]
pub struct MemorySnapshotStore {
    by_symbol: HashMap<String, Vec<PriceObservation>>,
    as_of: DateTime<Utc>,
}

impl MemorySnapshotStore {
    /// Create an empty store anchored at `as_of`.
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            by_symbol: HashMap::new(),
            as_of,
        }
    }

    /// Build a store from raw observations, anchored at the newest
    /// timestamp present.
    pub fn from_observations(observations: Vec<PriceObservation>) -> Result<Self, StoreError> {
        let as_of = observations
            .iter()
            .map(|o| o.timestamp)
            .max()
            .ok_or_else(|| StoreError::InvalidData("no observations supplied".to_string()))?;

        let mut store = Self::new(as_of);
        for obs in observations {
            store.insert(obs);
        }
        Ok(store)
    }

    /// Load a store from a JSON file containing an array of observations.
    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::FileNotFound(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let observations: Vec<PriceObservation> = serde_json::from_str(&raw)?;
        Self::from_observations(observations)
    }

    /// Insert one observation, keeping each symbol's history ordered by
    /// timestamp ascending.
    pub fn insert(&mut self, obs: PriceObservation) {
        let series = self.by_symbol.entry(obs.symbol.clone()).or_default();
        let idx = series.partition_point(|o| o.timestamp <= obs.timestamp);
        series.insert(idx, obs);
    }

    /// The reference instant lookbacks are measured from.
    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// All symbols with at least one observation.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<_> = self.by_symbol.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl SnapshotReader for MemorySnapshotStore {
    fn latest_observation(&self, symbol: &str) -> Option<PriceObservation> {
        self.by_symbol
            .get(symbol)
            .and_then(|series| series.last())
            .cloned()
    }

    fn daily_close_series(&self, symbol: &str, lookback_days: i64) -> Vec<DailyClose> {
        let Some(series) = self.by_symbol.get(symbol) else {
            return Vec::new();
        };
        let cutoff = self.as_of - Duration::days(lookback_days);

        // Latest observation per calendar day wins; the series is already
        // timestamp-ascending, so a plain overwrite keeps the last one.
        let mut daily: HashMap<NaiveDate, &PriceObservation> = HashMap::new();
        for obs in series.iter().filter(|o| o.timestamp >= cutoff) {
            daily.insert(obs.timestamp.date_naive(), obs);
        }

        let mut closes: Vec<DailyClose> = daily
            .into_iter()
            .map(|(date, obs)| DailyClose {
                date,
                close: obs.price,
            })
            .collect();
        closes.sort_by_key(|c| c.date);
        closes
    }

    fn week_over_week_observation(&self, symbol: &str) -> Option<PriceObservation> {
        let target = self.as_of - Duration::days(7);
        self.by_symbol
            .get(symbol)?
            .iter()
            .rev()
            .find(|o| o.timestamp <= target)
            .cloned()
    }
}
