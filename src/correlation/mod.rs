//! Cross-asset correlation detection and anomaly flagging.
//!
//! Builds pairwise Pearson correlations over aligned daily return series,
//! clusters co-moving instruments, and compares realized behaviour against
//! a static table of long-run baseline correlations.

pub mod anomaly;
pub mod engine;
pub mod grouping;
pub mod report;

use serde::{Deserialize, Serialize};

pub use anomaly::{AnomalyKind, CorrelationAnomaly, DivergingPair};
pub use engine::{align_returns, build_correlation_matrix, pearson_r, PairCorrelation};
pub use grouping::{group_by_comovement, group_by_correlation, CoMovingGroup};
pub use report::{detect_correlations, CorrelationReport, ReportPeriod};

/// Thresholds for correlation, grouping and anomaly detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Minimum aligned sample size below which a correlation is undefined.
    pub min_data_points: usize,
    /// Minimum same-day move magnitude for co-movement and anomaly checks.
    pub comovement_min_change_pct: f64,
    /// Width of a single-day magnitude band, in percentage points.
    pub comovement_magnitude_band: f64,
    /// Minimum correlation for multi-day grouping and notable pairs.
    pub correlation_threshold: f64,
    /// Deviation from baseline beyond which a pair is anomalous.
    pub anomaly_deviation_threshold: f64,
    /// Minimum baseline for the diverging-pair check.
    pub diverging_baseline_threshold: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            min_data_points: 5,
            comovement_min_change_pct: 0.5,
            comovement_magnitude_band: 1.5,
            correlation_threshold: 0.7,
            anomaly_deviation_threshold: 0.4,
            diverging_baseline_threshold: 0.5,
        }
    }
}
