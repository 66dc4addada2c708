//! Core data types for the analytics engine.
//!
//! These types represent the raw market inputs (point-in-time observations,
//! daily close series) and the canonical pair key that every pairwise fact
//! is stored under.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single point-in-time price observation for one instrument.
///
/// Produced by the snapshot reader; immutable once read. `percent_change`
/// may be absent, in which case evaluators that need it degrade to neutral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Instrument symbol (e.g., "SPX")
    pub symbol: String,

    /// Last traded price or series level
    pub price: Decimal,

    /// Day-over-day percent change, when the provider supplies one
    #[serde(default)]
    pub percent_change: Option<f64>,

    /// Day-over-day absolute change
    #[serde(default)]
    pub absolute_change: Option<f64>,

    /// Observation time (UTC)
    pub timestamp: DateTime<Utc>,
}

/// One daily closing price.
///
/// A close series for a symbol is an ordered `Vec<DailyClose>`, oldest to
/// newest, with intraday observations already collapsed to the
/// latest-timestamped one per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// One period-over-period percent change, derived from a close series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub pct_change: f64,
}

/// A symbol pair in canonical order (lexicographically smaller first).
///
/// Every stored pairwise fact — baseline expectation, computed correlation,
/// anomaly — is keyed by a `PairKey`, guaranteeing at most one record per
/// unordered pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub a: String,
    pub b: String,
}

impl PairKey {
    /// Build a canonical pair key from two symbols in either order.
    pub fn new(x: &str, y: &str) -> Self {
        if x <= y {
            Self {
                a: x.to_string(),
                b: y.to_string(),
            }
        } else {
            Self {
                a: y.to_string(),
                b: x.to_string(),
            }
        }
    }

    /// Whether the pair contains the given symbol.
    pub fn contains(&self, symbol: &str) -> bool {
        self.a == symbol || self.b == symbol
    }
}

/// Direction of a co-moving group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_canonical_order() {
        assert_eq!(PairKey::new("NDX", "SPX"), PairKey::new("SPX", "NDX"));
        let key = PairKey::new("SPX", "BTC/USD");
        assert_eq!(key.a, "BTC/USD");
        assert_eq!(key.b, "SPX");
    }

    #[test]
    fn test_pair_key_idempotent() {
        let key = PairKey::new("XAU", "DXY");
        let again = PairKey::new(&key.a, &key.b);
        assert_eq!(key, again);
    }

    #[test]
    fn test_pair_key_contains() {
        let key = PairKey::new("SPX", "VIX");
        assert!(key.contains("SPX"));
        assert!(key.contains("VIX"));
        assert!(!key.contains("NDX"));
    }

    #[test]
    fn test_direction_as_str() {
        assert_eq!(Direction::Up.as_str(), "up");
        assert_eq!(Direction::Down.as_str(), "down");
    }
}
