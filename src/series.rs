//! Return-series construction and moving-average helper.

use statrs::statistics::Statistics;

use crate::data::{DailyClose, ReturnPoint};

/// Build period-over-period percent changes from a daily close series.
///
/// Produces `n - 1` entries for `n` closes. An entry whose prior close is
/// zero is dropped rather than producing an infinite change; zero or one
/// close yields an empty series.
pub fn daily_returns(closes: &[DailyClose]) -> Vec<ReturnPoint> {
    let mut returns = Vec::with_capacity(closes.len().saturating_sub(1));
    for window in closes.windows(2) {
        let prev: f64 = window[0].close.try_into().unwrap_or(0.0);
        let curr: f64 = window[1].close.try_into().unwrap_or(0.0);
        if prev == 0.0 {
            continue;
        }
        returns.push(ReturnPoint {
            date: window[1].date,
            pct_change: (curr - prev) / prev * 100.0,
        });
    }
    returns
}

/// Average of the most recent `window` daily closes.
///
/// Returns `None` when fewer than `window` closes exist — callers must
/// treat that as a no-signal condition, not an error.
pub fn moving_average(closes: &[DailyClose], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let recent = &closes[closes.len() - window..];
    let prices: Vec<f64> = recent
        .iter()
        .map(|c| c.close.try_into().unwrap_or(0.0))
        .collect();
    Some(prices.mean())
}
