//! Correlation report orchestration.
//!
//! Two independent paths: the single-day path works directly on latest
//! percent changes; the multi-day path builds return series, the pairwise
//! matrix, and the matrix-driven detectors. Either path degrades to an
//! empty report when the data is too thin — never an error.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::{PriceObservation, ReturnPoint, SnapshotReader};
use crate::series::daily_returns;
use crate::universe::{BaselineCorrelations, Universe};

use super::anomaly::{
    detect_broken_correlations, detect_diverging_pairs, detect_scarcity_divergence,
    detect_single_day_anomalies, detect_unexpected_convergence, CorrelationAnomaly, DivergingPair,
};
use super::engine::{build_correlation_matrix, PairCorrelation};
use super::grouping::{group_by_comovement, group_by_correlation, CoMovingGroup};
use super::CorrelationConfig;

/// Reporting window for correlation detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportPeriod {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl ReportPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::YearToDate => "YTD",
        }
    }

    /// Calendar-day lookback for the window, padded for weekends and
    /// holidays.
    pub fn lookback_days(&self, now: DateTime<Utc>) -> i64 {
        match self {
            Self::OneDay => 2,
            Self::OneWeek => 9,
            Self::OneMonth => 35,
            Self::YearToDate => {
                let jan1 = NaiveDate::from_ymd_opt(now.year(), 1, 1)
                    .expect("January 1st always exists");
                (now.date_naive() - jan1).num_days() + 1
            }
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1D" => Ok(Self::OneDay),
            "1W" => Ok(Self::OneWeek),
            "1M" => Ok(Self::OneMonth),
            "YTD" => Ok(Self::YearToDate),
            other => Err(format!("unknown period: {other} (expected 1D, 1W, 1M or YTD)")),
        }
    }
}

/// Full output of correlation detection for one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub period: ReportPeriod,
    pub timestamp: DateTime<Utc>,
    /// Shortest retained return series; 0 on the single-day path.
    pub sample_size: usize,
    pub groups: Vec<CoMovingGroup>,
    pub anomalies: Vec<CorrelationAnomaly>,
    /// Pairs at or above the correlation threshold, strongest first.
    pub notable_pairs: Vec<PairCorrelation>,
    /// Populated on the single-day path only.
    pub diverging: Vec<DivergingPair>,
}

impl CorrelationReport {
    fn empty(period: ReportPeriod, timestamp: DateTime<Utc>) -> Self {
        Self {
            period,
            timestamp,
            sample_size: 0,
            groups: Vec::new(),
            anomalies: Vec::new(),
            notable_pairs: Vec::new(),
            diverging: Vec::new(),
        }
    }
}

/// Detect cross-asset correlations and anomalies over the given period.
///
/// The single-day path groups instruments by raw direction and magnitude
/// and runs the directional detectors. The multi-day path computes Pearson
/// correlations on daily return series and compares them against the
/// baselines. A symbol with missing or short history drops out of the
/// affected computations without suppressing results for the rest.
pub fn detect_correlations(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    baselines: &BaselineCorrelations,
    cfg: &CorrelationConfig,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> CorrelationReport {
    if period == ReportPeriod::OneDay {
        let snapshots = latest_snapshots(reader, universe);
        info!(symbols = snapshots.len(), "running single-day correlation report");

        let groups = group_by_comovement(&snapshots, universe, cfg);
        let anomalies = detect_single_day_anomalies(&snapshots, baselines, universe, cfg);
        let diverging = detect_diverging_pairs(&snapshots, baselines, universe, cfg);
        return CorrelationReport {
            period,
            timestamp: now,
            sample_size: 0,
            groups,
            anomalies,
            notable_pairs: Vec::new(),
            diverging,
        };
    }

    let days = period.lookback_days(now);
    let mut returns_by_symbol: HashMap<String, Vec<ReturnPoint>> = HashMap::new();
    for symbol in universe.symbols() {
        let closes = reader.daily_close_series(&symbol, days);
        let returns = daily_returns(&closes);
        if returns.len() >= cfg.min_data_points {
            returns_by_symbol.insert(symbol, returns);
        }
    }
    info!(
        period = period.as_str(),
        days,
        symbols = returns_by_symbol.len(),
        "running multi-day correlation report"
    );

    if returns_by_symbol.is_empty() {
        return CorrelationReport::empty(period, now);
    }

    let matrix = build_correlation_matrix(&returns_by_symbol, cfg.min_data_points);
    let groups = group_by_correlation(&matrix, &returns_by_symbol, universe, cfg);

    let mut anomalies = detect_unexpected_convergence(&matrix, baselines, universe, cfg);
    anomalies.extend(detect_broken_correlations(&matrix, baselines, universe, cfg));
    anomalies.extend(detect_scarcity_divergence(&matrix, baselines, universe, cfg));

    let mut notable_pairs: Vec<PairCorrelation> = matrix
        .values()
        .filter(|pc| pc.correlation.abs() >= cfg.correlation_threshold)
        .cloned()
        .collect();
    notable_pairs.sort_by(|a, b| b.correlation.abs().total_cmp(&a.correlation.abs()));

    let sample_size = returns_by_symbol
        .values()
        .map(|r| r.len())
        .min()
        .unwrap_or(0);

    debug!(
        groups = groups.len(),
        anomalies = anomalies.len(),
        notable = notable_pairs.len(),
        "correlation report assembled"
    );

    CorrelationReport {
        period,
        timestamp: now,
        sample_size,
        groups,
        anomalies,
        notable_pairs,
        diverging: Vec::new(),
    }
}

/// Latest observation per tracked symbol, keyed for deterministic
/// iteration.
fn latest_snapshots(
    reader: &dyn SnapshotReader,
    universe: &Universe,
) -> BTreeMap<String, PriceObservation> {
    universe
        .symbols()
        .into_iter()
        .filter_map(|symbol| reader.latest_observation(&symbol).map(|obs| (symbol, obs)))
        .collect()
}
