//! Co-movement grouping.
//!
//! Two deliberately simple, order-dependent algorithms: magnitude banding
//! over single-day changes, and a greedy first-match merge over
//! correlation-matrix edges for multi-day windows. Both discard singleton
//! groups. The greedy behaviour is part of the observable contract —
//! later, lower-correlation pairs may join a group formed earlier even if
//! their own correlation to some member is weaker.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{Direction, PairKey, PriceObservation, ReturnPoint};
use crate::universe::Universe;

use super::engine::PairCorrelation;
use super::CorrelationConfig;

/// A cluster of instruments moving in the same direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoMovingGroup {
    pub direction: Direction,
    /// Arithmetic mean of member changes, rounded to 2 decimal places.
    pub average_change: f64,
    pub symbols: Vec<String>,
    /// Human-readable names, parallel to `symbols`.
    pub labels: Vec<String>,
}

/// Group instruments by same-day direction and magnitude.
///
/// Instruments moving less than the minimum-change threshold are excluded
/// entirely. Within each direction bucket, instruments are sorted by
/// magnitude descending and greedily banded: a new member joins the open
/// cluster only while its magnitude stays within the band of the cluster's
/// last-added member.
pub fn group_by_comovement(
    snapshots: &BTreeMap<String, PriceObservation>,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CoMovingGroup> {
    let min_change = cfg.comovement_min_change_pct;
    let band = cfg.comovement_magnitude_band;

    let mut up: Vec<(&str, f64)> = Vec::new();
    let mut down: Vec<(&str, f64)> = Vec::new();
    for (symbol, snap) in snapshots {
        let Some(pct) = snap.percent_change else {
            continue;
        };
        if pct >= min_change {
            up.push((symbol, pct));
        } else if pct <= -min_change {
            down.push((symbol, pct));
        }
    }

    let mut groups = Vec::new();
    for (direction, mut bucket) in [(Direction::Up, up), (Direction::Down, down)] {
        if bucket.is_empty() {
            continue;
        }
        // Stable sort: equal magnitudes keep symbol order.
        bucket.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

        let mut clusters: Vec<Vec<(&str, f64)>> = vec![vec![bucket[0]]];
        for &(symbol, pct) in &bucket[1..] {
            let (_, last_pct) = *clusters
                .last()
                .and_then(|c| c.last())
                .expect("open cluster is never empty");
            if (pct.abs() - last_pct.abs()).abs() <= band {
                clusters.last_mut().unwrap().push((symbol, pct));
            } else {
                clusters.push(vec![(symbol, pct)]);
            }
        }

        for cluster in clusters {
            if cluster.len() < 2 {
                continue;
            }
            let avg = cluster.iter().map(|&(_, pct)| pct).sum::<f64>() / cluster.len() as f64;
            let symbols: Vec<String> = cluster.iter().map(|&(s, _)| s.to_string()).collect();
            let labels = symbols.iter().map(|s| universe.label(s).to_string()).collect();
            groups.push(CoMovingGroup {
                direction,
                average_change: round2(avg),
                symbols,
                labels,
            });
        }
    }

    debug!(groups = groups.len(), "single-day co-movement grouping done");
    groups
}

/// Form groups of highly correlated instruments by greedy merging.
///
/// Pairs at or above the correlation threshold are walked in descending
/// correlation order (ties resolve by pair key, since the matrix iterates
/// in key order and the sort is stable). A pair joins the first existing
/// group containing either member, otherwise it starts a new group.
/// Direction comes from the mean of the members' most recent single-period
/// returns; a mean of exactly zero resolves to up.
pub fn group_by_correlation(
    matrix: &BTreeMap<PairKey, PairCorrelation>,
    returns_by_symbol: &HashMap<String, Vec<ReturnPoint>>,
    universe: &Universe,
    cfg: &CorrelationConfig,
) -> Vec<CoMovingGroup> {
    let mut high_pairs: Vec<&PairCorrelation> = matrix
        .values()
        .filter(|pc| pc.correlation >= cfg.correlation_threshold)
        .collect();
    high_pairs.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));

    let mut members: Vec<BTreeSet<String>> = Vec::new();
    for pc in high_pairs {
        let (sym_a, sym_b) = (&pc.pair.a, &pc.pair.b);
        match members
            .iter_mut()
            .find(|group| group.contains(sym_a) || group.contains(sym_b))
        {
            Some(group) => {
                group.insert(sym_a.clone());
                group.insert(sym_b.clone());
            }
            None => {
                members.push(BTreeSet::from([sym_a.clone(), sym_b.clone()]));
            }
        }
    }

    let mut groups = Vec::new();
    for group in members {
        if group.len() < 2 {
            continue;
        }
        let mut sum = 0.0;
        let mut count = 0usize;
        for symbol in &group {
            if let Some(last) = returns_by_symbol.get(symbol).and_then(|r| r.last()) {
                sum += last.pct_change;
                count += 1;
            }
        }
        let avg = if count > 0 { sum / count as f64 } else { 0.0 };

        let symbols: Vec<String> = group.into_iter().collect();
        let labels = symbols.iter().map(|s| universe.label(s).to_string()).collect();
        groups.push(CoMovingGroup {
            direction: if avg >= 0.0 {
                Direction::Up
            } else {
                Direction::Down
            },
            average_change: round2(avg),
            symbols,
            labels,
        });
    }

    debug!(groups = groups.len(), "multi-day correlation grouping done");
    groups
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn snapshot(symbol: &str, pct: Option<f64>) -> (String, PriceObservation) {
        (
            symbol.to_string(),
            PriceObservation {
                symbol: symbol.to_string(),
                price: dec!(100),
                percent_change: pct,
                absolute_change: None,
                timestamp: Utc.with_ymd_and_hms(2026, 3, 20, 16, 0, 0).unwrap(),
            },
        )
    }

    fn snapshots(entries: &[(&str, f64)]) -> BTreeMap<String, PriceObservation> {
        entries
            .iter()
            .map(|&(sym, pct)| snapshot(sym, Some(pct)))
            .collect()
    }

    fn cfg() -> CorrelationConfig {
        CorrelationConfig::default()
    }

    #[test]
    fn test_groups_by_direction() {
        let snaps = snapshots(&[
            ("SPX", 2.0),
            ("NDX", 2.5),
            ("RUT", -1.5),
            ("VIX", -2.0),
        ]);
        let groups = group_by_comovement(&snaps, &Universe::default(), &cfg());

        let up: Vec<_> = groups.iter().filter(|g| g.direction == Direction::Up).collect();
        let down: Vec<_> = groups.iter().filter(|g| g.direction == Direction::Down).collect();
        assert_eq!(up.len(), 1);
        assert_eq!(up[0].symbols, vec!["NDX", "SPX"]); // magnitude descending
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].symbols, vec!["VIX", "RUT"]);
    }

    #[test]
    fn test_flat_instruments_excluded() {
        let snaps = snapshots(&[("SPX", 0.1), ("NDX", 0.05)]);
        assert!(group_by_comovement(&snaps, &Universe::default(), &cfg()).is_empty());
    }

    #[test]
    fn test_magnitude_banding_splits_groups() {
        // ~5% movers and ~1% movers land in separate bands.
        let snaps = snapshots(&[
            ("SPX", 5.0),
            ("NDX", 4.5),
            ("RUT", 1.0),
            ("UKX", 0.8),
        ]);
        let groups = group_by_comovement(&snaps, &Universe::default(), &cfg());
        let up: Vec<_> = groups.iter().filter(|g| g.direction == Direction::Up).collect();
        assert_eq!(up.len(), 2);
    }

    #[test]
    fn test_average_change_rounded() {
        let snaps = snapshots(&[("SPX", 2.0), ("NDX", 2.333)]);
        let groups = group_by_comovement(&snaps, &Universe::default(), &cfg());
        assert_eq!(groups.len(), 1);
        assert!((groups[0].average_change - 2.17).abs() < 1e-9);
    }

    #[test]
    fn test_singleton_direction_discarded() {
        let snaps = snapshots(&[("SPX", 2.0), ("VIX", -1.5)]);
        assert!(group_by_comovement(&snaps, &Universe::default(), &cfg()).is_empty());
    }

    #[test]
    fn test_missing_change_skipped() {
        let mut snaps = BTreeMap::new();
        let (k, v) = snapshot("SPX", None);
        snaps.insert(k, v);
        assert!(group_by_comovement(&snaps, &Universe::default(), &cfg()).is_empty());
    }

    // Multi-day grouping.

    fn pair(a: &str, b: &str, r: f64) -> (PairKey, PairCorrelation) {
        let key = PairKey::new(a, b);
        (
            key.clone(),
            PairCorrelation {
                pair: key,
                correlation: r,
                sample_size: 20,
            },
        )
    }

    fn last_returns(entries: &[(&str, f64)]) -> HashMap<String, Vec<ReturnPoint>> {
        entries
            .iter()
            .map(|&(sym, pct)| {
                (
                    sym.to_string(),
                    vec![ReturnPoint {
                        date: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
                        pct_change: pct,
                    }],
                )
            })
            .collect()
    }

    #[test]
    fn test_forms_group_above_threshold() {
        let matrix = BTreeMap::from([pair("NDX", "SPX", 0.92)]);
        let returns = last_returns(&[("NDX", 1.0), ("SPX", 0.8)]);
        let groups = group_by_correlation(&matrix, &returns, &Universe::default(), &cfg());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbols, vec!["NDX", "SPX"]);
        assert_eq!(groups[0].direction, Direction::Up);
        assert!((groups[0].average_change - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_below_threshold_no_group() {
        let matrix = BTreeMap::from([pair("NDX", "SPX", 0.50)]);
        let returns = last_returns(&[("NDX", 1.0), ("SPX", 0.8)]);
        assert!(group_by_correlation(&matrix, &returns, &Universe::default(), &cfg()).is_empty());
    }

    #[test]
    fn test_greedy_merge_chains_members() {
        // SPX-NDX is strongest; RUT joins through its SPX edge even though
        // it was never compared against NDX.
        let matrix = BTreeMap::from([
            pair("NDX", "SPX", 0.95),
            pair("RUT", "SPX", 0.75),
        ]);
        let returns = last_returns(&[("NDX", 1.0), ("SPX", 0.8), ("RUT", 0.6)]);
        let groups = group_by_correlation(&matrix, &returns, &Universe::default(), &cfg());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].symbols, vec!["NDX", "RUT", "SPX"]);
    }

    #[test]
    fn test_disjoint_pairs_stay_separate() {
        let matrix = BTreeMap::from([
            pair("NDX", "SPX", 0.95),
            pair("UKX", "SX5E", 0.85),
        ]);
        let returns = last_returns(&[("NDX", 1.0), ("SPX", 0.8), ("UKX", -0.5), ("SX5E", -0.7)]);
        let mut groups = group_by_correlation(&matrix, &returns, &Universe::default(), &cfg());
        groups.sort_by(|a, b| a.symbols.cmp(&b.symbols));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].direction, Direction::Up);
        assert_eq!(groups[1].direction, Direction::Down);
    }

    #[test]
    fn test_direction_tie_resolves_up() {
        let matrix = BTreeMap::from([pair("NDX", "SPX", 0.9)]);
        let returns = last_returns(&[("NDX", 1.0), ("SPX", -1.0)]);
        let groups = group_by_correlation(&matrix, &returns, &Universe::default(), &cfg());
        assert_eq!(groups[0].direction, Direction::Up);
        assert_eq!(groups[0].average_change, 0.0);
    }

    #[test]
    fn test_missing_return_series_skipped_in_direction() {
        let matrix = BTreeMap::from([pair("NDX", "SPX", 0.9)]);
        let returns = last_returns(&[("NDX", -2.0)]); // SPX has no series
        let groups = group_by_correlation(&matrix, &returns, &Universe::default(), &cfg());
        assert_eq!(groups[0].direction, Direction::Down);
        assert!((groups[0].average_change + 2.0).abs() < 1e-9);
    }
}
