//! Pairwise Pearson correlation over aligned return series.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::data::{PairKey, ReturnPoint};

/// Realized correlation for one symbol pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairCorrelation {
    pub pair: PairKey,
    /// Pearson coefficient, rounded to 4 decimal places.
    pub correlation: f64,
    /// Number of aligned observations behind the coefficient.
    pub sample_size: usize,
}

/// Intersect two return series on shared dates, preserving relative order.
pub fn align_returns(a: &[ReturnPoint], b: &[ReturnPoint]) -> (Vec<f64>, Vec<f64>) {
    let by_date: HashMap<_, _> = b.iter().map(|r| (r.date, r.pct_change)).collect();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for point in a {
        if let Some(&val_b) = by_date.get(&point.date) {
            xs.push(point.pct_change);
            ys.push(val_b);
        }
    }
    (xs, ys)
}

/// Pearson correlation coefficient between two numeric sequences.
///
/// Sequences of unequal length are truncated to the shorter. Returns `None`
/// below `min_points` or when either sequence has zero variance — callers
/// treat an undefined pair as nonexistent, never as zero.
pub fn pearson_r(xs: &[f64], ys: &[f64], min_points: usize) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < min_points {
        return None;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];

    let mean_x = xs.mean();
    let mean_y = ys.mean();

    let var_x: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let var_y: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let cov: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    Some(cov / (var_x * var_y).sqrt())
}

/// Compute Pearson correlations for every unordered symbol pair.
///
/// Each pair is considered exactly once via `PairKey` normalization and
/// computed independently in parallel; pairs with an undefined coefficient
/// are omitted from the output entirely. The result map is ordered by
/// `PairKey` so downstream iteration is deterministic.
pub fn build_correlation_matrix(
    returns_by_symbol: &HashMap<String, Vec<ReturnPoint>>,
    min_points: usize,
) -> BTreeMap<PairKey, PairCorrelation> {
    let mut symbols: Vec<&String> = returns_by_symbol.keys().collect();
    symbols.sort();

    let mut pairs = Vec::new();
    for (i, sym_a) in symbols.iter().enumerate() {
        for sym_b in &symbols[i + 1..] {
            pairs.push((*sym_a, *sym_b));
        }
    }

    let matrix: BTreeMap<PairKey, PairCorrelation> = pairs
        .par_iter()
        .filter_map(|&(sym_a, sym_b)| {
            let (xs, ys) = align_returns(&returns_by_symbol[sym_a], &returns_by_symbol[sym_b]);
            let r = pearson_r(&xs, &ys, min_points)?;
            let pair = PairKey::new(sym_a, sym_b);
            Some((
                pair.clone(),
                PairCorrelation {
                    pair,
                    correlation: round4(r),
                    sample_size: xs.len().min(ys.len()),
                },
            ))
        })
        .collect();

    debug!(
        symbols = symbols.len(),
        pairs = matrix.len(),
        "correlation matrix built"
    );
    matrix
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
