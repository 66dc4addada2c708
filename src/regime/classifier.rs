//! Regime aggregation.
//!
//! Combines the five signal verdicts into one categorical risk-appetite
//! label plus a composite reason string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::SnapshotReader;
use crate::universe::Universe;

use super::signals::{
    eval_credit_spread, eval_currency, eval_safe_haven, eval_trend, eval_volatility,
    RegimeThresholds, Signal, SignalDirection,
};

/// Fallback reason when every signal is neutral.
const INSUFFICIENT_DATA: &str = "Insufficient data for regime classification";

/// Categorical risk-appetite label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimeLabel {
    #[serde(rename = "RISK-ON")]
    RiskOn,
    #[serde(rename = "RISK-OFF")]
    RiskOff,
    #[serde(rename = "MIXED")]
    Mixed,
}

impl RegimeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RiskOn => "RISK-ON",
            Self::RiskOff => "RISK-OFF",
            Self::Mixed => "MIXED",
        }
    }

    /// Description of the label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RiskOn => "Broad appetite for risk assets",
            Self::RiskOff => "Flight from risk assets",
            Self::Mixed => "Conflicting signals or sparse data",
        }
    }
}

/// Full regime classification output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegimeResult {
    pub label: RegimeLabel,
    pub reason: String,
    pub signals: Vec<Signal>,
    pub timestamp: DateTime<Utc>,
}

/// Determine the label from signal directions.
///
/// RISK-OFF needs at least 2 risk-off votes regardless of the risk-on
/// count. RISK-ON needs at least 2 risk-on votes AND zero risk-off.
/// Everything else — conflicts and sparse data — is MIXED.
pub fn aggregate(signals: &[Signal]) -> RegimeLabel {
    let risk_on = signals
        .iter()
        .filter(|s| s.direction == SignalDirection::RiskOn)
        .count();
    let risk_off = signals
        .iter()
        .filter(|s| s.direction == SignalDirection::RiskOff)
        .count();

    debug!(risk_on, risk_off, "aggregating regime signals");

    if risk_off >= 2 {
        RegimeLabel::RiskOff
    } else if risk_on >= 2 && risk_off == 0 {
        RegimeLabel::RiskOn
    } else {
        RegimeLabel::Mixed
    }
}

/// Join non-neutral signal details into a one-line reason, in evaluator
/// order.
pub fn build_reason(signals: &[Signal]) -> String {
    let parts: Vec<&str> = signals
        .iter()
        .filter(|s| s.direction != SignalDirection::Neutral)
        .map(|s| s.detail.as_str())
        .collect();
    if parts.is_empty() {
        return INSUFFICIENT_DATA.to_string();
    }
    parts.join("; ")
}

/// Classify the current market regime from latest snapshots.
///
/// Evaluates the five signals in fixed order (trend, volatility, credit
/// spread, currency, safe haven), aggregates them, and returns a labelled
/// result stamped with the caller-supplied instant.
pub fn classify_regime(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    thresholds: &RegimeThresholds,
    now: DateTime<Utc>,
) -> RegimeResult {
    let signals = vec![
        eval_trend(reader, universe, thresholds),
        eval_volatility(reader, universe, thresholds),
        eval_credit_spread(reader, universe, thresholds),
        eval_currency(reader, universe, thresholds),
        eval_safe_haven(reader, universe, thresholds),
    ];

    let label = aggregate(&signals);
    let reason = build_reason(&signals);
    debug!(label = label.as_str(), "regime classified");

    RegimeResult {
        label,
        reason,
        signals,
        timestamp: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemorySnapshotStore, PriceObservation};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn signal(direction: SignalDirection, detail: &str) -> Signal {
        Signal {
            name: "test".to_string(),
            direction,
            detail: detail.to_string(),
        }
    }

    fn signals(directions: &[SignalDirection]) -> Vec<Signal> {
        directions.iter().map(|&d| signal(d, "")).collect()
    }

    use SignalDirection::{Neutral, RiskOff, RiskOn};

    #[test]
    fn test_two_risk_on_no_risk_off_is_risk_on() {
        let s = signals(&[RiskOn, RiskOn, Neutral, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::RiskOn);
    }

    #[test]
    fn test_risk_on_blocked_by_any_risk_off() {
        let s = signals(&[RiskOn, RiskOn, RiskOff, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::Mixed);
    }

    #[test]
    fn test_two_risk_off_flips_to_risk_off() {
        // One risk-off is MIXED; the second flips the label.
        let s = signals(&[RiskOff, Neutral, Neutral, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::Mixed);
        let s = signals(&[RiskOff, RiskOff, Neutral, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::RiskOff);
    }

    #[test]
    fn test_risk_off_majority_beats_risk_on() {
        let s = signals(&[RiskOff, RiskOff, RiskOn, RiskOn, RiskOn]);
        assert_eq!(aggregate(&s), RegimeLabel::RiskOff);
    }

    #[test]
    fn test_all_neutral_is_mixed() {
        let s = signals(&[Neutral, Neutral, Neutral, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::Mixed);
    }

    #[test]
    fn test_single_risk_on_is_mixed() {
        let s = signals(&[RiskOn, Neutral, Neutral, Neutral, Neutral]);
        assert_eq!(aggregate(&s), RegimeLabel::Mixed);
    }

    #[test]
    fn test_reason_joins_non_neutral_in_order() {
        let s = vec![
            signal(RiskOn, "alpha"),
            signal(Neutral, "beta"),
            signal(RiskOff, "gamma"),
        ];
        assert_eq!(build_reason(&s), "alpha; gamma");
    }

    #[test]
    fn test_reason_all_neutral() {
        let s = vec![signal(Neutral, "x")];
        assert!(build_reason(&s).contains("Insufficient data"));
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&RegimeLabel::RiskOn).unwrap(),
            "\"RISK-ON\""
        );
        assert_eq!(RegimeLabel::RiskOff.as_str(), "RISK-OFF");
    }

    // Full pipeline against an in-memory store.

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 20, 16, 0, 0).unwrap()
    }

    fn obs(symbol: &str, price: Decimal, pct: Option<f64>, ts: DateTime<Utc>) -> PriceObservation {
        PriceObservation {
            symbol: symbol.to_string(),
            price,
            percent_change: pct,
            absolute_change: None,
            timestamp: ts,
        }
    }

    fn seed_benchmark_history(store: &mut MemorySnapshotStore, price: Decimal, days: i64) {
        for i in 1..=days {
            store.insert(obs("SPX", price, None, now() - Duration::days(i)));
        }
    }

    #[test]
    fn test_classify_regime_clear_risk_on() {
        let mut store = MemorySnapshotStore::new(now());
        seed_benchmark_history(&mut store, dec!(5000), 20);
        store.insert(obs("SPX", dec!(5200), Some(0.5), now()));
        store.insert(obs("VIX", dec!(14), Some(-6.0), now()));
        store.insert(obs("BAMLH0A0HYM2", dec!(3.2), None, now()));
        store.insert(obs("DXY", dec!(103), Some(0.2), now()));
        store.insert(obs("XAU", dec!(2050), Some(0.3), now()));

        let result = classify_regime(&store, &Universe::default(), &RegimeThresholds::default(), now());
        assert_eq!(result.label, RegimeLabel::RiskOn);
        assert_eq!(result.signals.len(), 5);
        assert!(result.reason.contains("above"));
        assert_eq!(result.timestamp, now());
    }

    #[test]
    fn test_classify_regime_clear_risk_off() {
        let mut store = MemorySnapshotStore::new(now());
        seed_benchmark_history(&mut store, dec!(5000), 20);
        store.insert(obs(
            "BAMLH0A0HYM2",
            dec!(3.50),
            None,
            now() - Duration::days(8),
        ));
        store.insert(obs("SPX", dec!(4800), Some(-2.0), now()));
        store.insert(obs("VIX", dec!(30), Some(9.0), now()));
        store.insert(obs("BAMLH0A0HYM2", dec!(3.65), None, now()));
        store.insert(obs("DXY", dec!(106), Some(1.5), now()));
        store.insert(obs("XAU", dec!(2100), Some(2.0), now()));

        let result = classify_regime(&store, &Universe::default(), &RegimeThresholds::default(), now());
        assert_eq!(result.label, RegimeLabel::RiskOff);
        assert!(result.reason.contains("below"));
    }

    #[test]
    fn test_classify_regime_conflicting_signals_mixed() {
        // Benchmark above its MA but volatility spiking.
        let mut store = MemorySnapshotStore::new(now());
        seed_benchmark_history(&mut store, dec!(5000), 20);
        store.insert(obs("SPX", dec!(5200), Some(0.5), now()));
        store.insert(obs("VIX", dec!(28), Some(8.0), now()));
        store.insert(obs("BAMLH0A0HYM2", dec!(4.0), None, now()));
        store.insert(obs("DXY", dec!(103), Some(0.2), now()));
        store.insert(obs("XAU", dec!(2050), Some(0.3), now()));

        let result = classify_regime(&store, &Universe::default(), &RegimeThresholds::default(), now());
        assert_eq!(result.label, RegimeLabel::Mixed);
    }

    #[test]
    fn test_classify_regime_empty_store() {
        let store = MemorySnapshotStore::new(now());
        let result = classify_regime(&store, &Universe::default(), &RegimeThresholds::default(), now());
        assert_eq!(result.label, RegimeLabel::Mixed);
        assert!(result.reason.contains("Insufficient data"));
        assert_eq!(result.signals.len(), 5);
    }

    #[test]
    fn test_classify_regime_partial_data() {
        // Only a volatility print; one risk-on vote cannot carry the label.
        let mut store = MemorySnapshotStore::new(now());
        store.insert(obs("VIX", dec!(14), Some(-6.0), now()));

        let result = classify_regime(&store, &Universe::default(), &RegimeThresholds::default(), now());
        assert_eq!(result.label, RegimeLabel::Mixed);
    }
}
