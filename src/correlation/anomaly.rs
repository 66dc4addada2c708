//! Baseline comparison and anomaly detection.
//!
//! Compares realized pairwise behaviour — today's raw directions, or the
//! computed correlation matrix — against the static table of long-run
//! expected correlations, emitting typed anomaly records. A pair may match
//! more than one clause; clauses are independent checks, not branches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{PairKey, PriceObservation};
use crate::universe::{BaselineCorrelations, Universe};

use super::engine::PairCorrelation;
use super::CorrelationConfig;

/// Kind of flagged deviation from expected correlation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Normally uncorrelated instruments moving in lockstep.
    UnexpectedConvergence,
    /// A traditional correlation that has broken down.
    BrokenCorrelation,
    /// A critical-mineral instrument decoupling from broad risk.
    ScarcityDivergence,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnexpectedConvergence => "unexpected_convergence",
            Self::BrokenCorrelation => "broken_correlation",
            Self::ScarcityDivergence => "scarcity_divergence",
        }
    }
}

/// A flagged deviation from expected correlation behaviour.
///
/// `actual` is 0.0 for single-day detections, where no realized
/// correlation exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationAnomaly {
    pub kind: AnomalyKind,
    pub symbols: [String; 2],
    pub expected: f64,
    pub actual: f64,
    pub detail: String,
}

/// A normally strongly-correlated pair moving in opposite directions today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergingPair {
    pub pair: PairKey,
    pub label_a: String,
    pub label_b: String,
    pub change_a: f64,
    pub change_b: f64,
    pub baseline_correlation: f64,
}

fn same_direction(a: f64, b: f64) -> bool {
    (a > 0.0 && b > 0.0) || (a < 0.0 && b < 0.0)
}

/// Detect anomalous co-movement from single-day changes alone.
///
/// For every baseline pair, skips the pair unless at least one member's
/// move clears the minimum-change threshold, then applies three
/// independent clauses against the expected correlation.
pub fn detect_single_day_anomalies(
    snapshots: &BTreeMap<String, PriceObservation>,
    baselines: &BaselineCorrelations,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CorrelationAnomaly> {
    let min_change = cfg.comovement_min_change_pct;
    let mut anomalies = Vec::new();

    for (pair, expected) in baselines.iter() {
        let (Some(snap_a), Some(snap_b)) = (snapshots.get(&pair.a), snapshots.get(&pair.b)) else {
            continue;
        };
        let (Some(pct_a), Some(pct_b)) = (snap_a.percent_change, snap_b.percent_change) else {
            continue;
        };
        if pct_a.abs() < min_change && pct_b.abs() < min_change {
            continue;
        }

        let label_a = universe.label(&pair.a);
        let label_b = universe.label(&pair.b);
        let together = same_direction(pct_a, pct_b);

        // Normally inversely correlated but moving together today.
        if expected < -0.5 && together {
            anomalies.push(CorrelationAnomaly {
                kind: AnomalyKind::BrokenCorrelation,
                symbols: [pair.a.clone(), pair.b.clone()],
                expected,
                actual: 0.0,
                detail: format!(
                    "{label_a} and {label_b} moving in the same direction today ({pct_a:+.1}% and {pct_b:+.1}%)"
                ),
            });
        }

        // Normally uncorrelated but moving in lockstep today.
        if expected.abs() < 0.3 && together && pct_a.abs() >= min_change && pct_b.abs() >= min_change
        {
            anomalies.push(CorrelationAnomaly {
                kind: AnomalyKind::UnexpectedConvergence,
                symbols: [pair.a.clone(), pair.b.clone()],
                expected,
                actual: 0.0,
                detail: format!(
                    "{label_a} and {label_b} moving together today ({pct_a:+.1}% and {pct_b:+.1}%)"
                ),
            });
        }

        // Normally positively correlated but moving opposite today.
        if expected > 0.5
            && !together
            && pct_a.abs() >= min_change
            && pct_b.abs() >= min_change
        {
            anomalies.push(CorrelationAnomaly {
                kind: AnomalyKind::BrokenCorrelation,
                symbols: [pair.a.clone(), pair.b.clone()],
                expected,
                actual: 0.0,
                detail: format!(
                    "{label_a} and {label_b} moving in opposite directions today ({pct_a:+.1}% vs {pct_b:+.1}%)"
                ),
            });
        }
    }

    debug!(count = anomalies.len(), "single-day anomalies detected");
    anomalies
}

/// Flag pairs that are normally near-uncorrelated but now moving together.
pub fn detect_unexpected_convergence(
    matrix: &BTreeMap<PairKey, PairCorrelation>,
    baselines: &BaselineCorrelations,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CorrelationAnomaly> {
    let threshold = cfg.anomaly_deviation_threshold;
    let mut anomalies = Vec::new();
    for (pair, pc) in matrix {
        let Some(expected) = baselines.get(pair) else {
            continue;
        };
        if expected.abs() < 0.3 && pc.correlation > expected + threshold {
            anomalies.push(CorrelationAnomaly {
                kind: AnomalyKind::UnexpectedConvergence,
                symbols: [pair.a.clone(), pair.b.clone()],
                expected,
                actual: pc.correlation,
                detail: format!(
                    "{} and {} are unusually correlated (r={:.2}, normally ~{:.2})",
                    universe.label(&pair.a),
                    universe.label(&pair.b),
                    pc.correlation,
                    expected
                ),
            });
        }
    }
    anomalies
}

/// Flag strongly-correlated pairs whose realized correlation has drifted
/// far from the baseline, in either direction.
pub fn detect_broken_correlations(
    matrix: &BTreeMap<PairKey, PairCorrelation>,
    baselines: &BaselineCorrelations,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CorrelationAnomaly> {
    let threshold = cfg.anomaly_deviation_threshold;
    let mut anomalies = Vec::new();
    for (pair, pc) in matrix {
        let Some(expected) = baselines.get(pair) else {
            continue;
        };
        if expected.abs() >= 0.5 && (pc.correlation - expected).abs() > threshold {
            anomalies.push(CorrelationAnomaly {
                kind: AnomalyKind::BrokenCorrelation,
                symbols: [pair.a.clone(), pair.b.clone()],
                expected,
                actual: pc.correlation,
                detail: format!(
                    "{} and {} correlation has shifted (r={:.2}, normally ~{:.2})",
                    universe.label(&pair.a),
                    universe.label(&pair.b),
                    pc.correlation,
                    expected
                ),
            });
        }
    }
    anomalies
}

/// Flag critical-mineral instruments falling below their expected
/// co-movement with broad risk.
///
/// Asymmetric: only underperformance against the baseline is flagged,
/// never overperformance.
pub fn detect_scarcity_divergence(
    matrix: &BTreeMap<PairKey, PairCorrelation>,
    baselines: &BaselineCorrelations,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CorrelationAnomaly> {
    let threshold = cfg.anomaly_deviation_threshold;
    let mut anomalies = Vec::new();
    for scarcity in &universe.scarcity_symbols {
        for risk in &universe.broad_risk_symbols {
            let pair = PairKey::new(scarcity, risk);
            let (Some(pc), Some(expected)) = (matrix.get(&pair), baselines.get(&pair)) else {
                continue;
            };
            if pc.correlation < expected - threshold {
                anomalies.push(CorrelationAnomaly {
                    kind: AnomalyKind::ScarcityDivergence,
                    symbols: [scarcity.clone(), risk.clone()],
                    expected,
                    actual: pc.correlation,
                    detail: format!(
                        "{} is diverging from {} (r={:.2}, normally ~{:.2})",
                        universe.label(scarcity),
                        universe.label(risk),
                        pc.correlation,
                        expected
                    ),
                });
            }
        }
    }
    anomalies
}

/// Detect normally-correlated pairs moving in opposite directions today.
///
/// Both members must individually clear the minimum-change magnitude;
/// same-direction pairs are never reported regardless of size.
pub fn detect_diverging_pairs(
    snapshots: &BTreeMap<String, PriceObservation>,
    baselines: &BaselineCorrelations,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<DivergingPair> {
    let min_change = cfg.comovement_min_change_pct;
    let mut diverging = Vec::new();

    for (pair, expected) in baselines.iter() {
        if expected < cfg.diverging_baseline_threshold {
            continue;
        }
        let (Some(snap_a), Some(snap_b)) = (snapshots.get(&pair.a), snapshots.get(&pair.b)) else {
            continue;
        };
        let (Some(pct_a), Some(pct_b)) = (snap_a.percent_change, snap_b.percent_change) else {
            continue;
        };
        if pct_a.abs() < min_change || pct_b.abs() < min_change {
            continue;
        }
        if same_direction(pct_a, pct_b) {
            continue;
        }

        diverging.push(DivergingPair {
            pair: pair.clone(),
            label_a: universe.label(&pair.a).to_string(),
            label_b: universe.label(&pair.b).to_string(),
            change_a: pct_a,
            change_b: pct_b,
            baseline_correlation: expected,
        });
    }

    debug!(count = diverging.len(), "diverging pairs detected");
    diverging
}
