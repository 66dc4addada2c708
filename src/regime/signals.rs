//! Regime signal evaluators.
//!
//! Five independent rules, each reading the snapshot boundary and emitting
//! a directional verdict with a human-readable justification. An evaluator
//! whose required instrument has no data returns neutral with an
//! "unavailable" detail — it never fails, and never affects its siblings.

use serde::{Deserialize, Serialize};

use crate::data::SnapshotReader;
use crate::series::moving_average;
use crate::universe::Universe;

/// Directional verdict of one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalDirection {
    RiskOn,
    RiskOff,
    Neutral,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RiskOn => "risk_on",
            Self::RiskOff => "risk_off",
            Self::Neutral => "neutral",
        }
    }
}

/// One signal evaluation: rule name, verdict, justification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub name: String,
    pub direction: SignalDirection,
    pub detail: String,
}

impl Signal {
    fn new(name: &str, direction: SignalDirection, detail: String) -> Self {
        Self {
            name: name.to_string(),
            direction,
            detail,
        }
    }

    fn neutral(name: &str, detail: String) -> Self {
        Self::new(name, SignalDirection::Neutral, detail)
    }
}

/// Thresholds and instrument bindings for the five evaluators.
///
/// Everything directional is configuration, not a hard-coded business
/// constant. The volatility thresholds are deliberately asymmetric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeThresholds {
    /// Broad-equity benchmark evaluated for trend.
    pub equity_benchmark: String,
    /// Moving-average window for the trend rule, in trading days.
    pub trend_ma_period: usize,
    /// Calendar days of history requested when building the average.
    pub trend_history_days: i64,

    /// Volatility proxy whose daily percent change is classified.
    pub volatility_proxy: String,
    /// Daily change above this is a volatility spike (risk-off).
    pub volatility_spike_pct: f64,
    /// Daily change below this is volatility collapsing (risk-on).
    pub volatility_drop_pct: f64,

    /// High-yield credit spread series.
    pub credit_spread_symbol: String,
    /// Spread level above this is outright risk-off.
    pub credit_elevated_level: f64,
    /// Spread level below this is risk-on, absent widening.
    pub credit_tight_level: f64,
    /// Week-over-week widening beyond this many bps is risk-off.
    pub credit_widening_bps: f64,

    /// Dollar-strength proxy.
    pub currency_proxy: String,
    /// Daily change above this is a dollar spike (risk-off only).
    pub currency_spike_pct: f64,

    /// Safe-haven instrument compared against the equity benchmark.
    pub safe_haven_symbol: String,
    /// Safe haven must be up at least this much to count as a flight.
    pub safe_haven_min_pct: f64,
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self {
            equity_benchmark: "SPX".to_string(),
            trend_ma_period: 20,
            trend_history_days: 45,
            volatility_proxy: "VIX".to_string(),
            volatility_spike_pct: 5.0,
            volatility_drop_pct: -4.0,
            credit_spread_symbol: "BAMLH0A0HYM2".to_string(),
            credit_elevated_level: 5.0,
            credit_tight_level: 3.5,
            credit_widening_bps: 10.0,
            currency_proxy: "DXY".to_string(),
            currency_spike_pct: 1.0,
            safe_haven_symbol: "XAU".to_string(),
            safe_haven_min_pct: 1.5,
        }
    }
}

const TREND: &str = "trend";
const VOLATILITY: &str = "volatility";
const CREDIT: &str = "credit_spread";
const CURRENCY: &str = "currency";
const SAFE_HAVEN: &str = "safe_haven";

/// Benchmark price versus its N-day moving average.
pub fn eval_trend(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    cfg: &RegimeThresholds,
) -> Signal {
    let label = universe.label(&cfg.equity_benchmark);
    let Some(latest) = reader.latest_observation(&cfg.equity_benchmark) else {
        return Signal::neutral(TREND, format!("{label} data unavailable"));
    };

    let closes = reader.daily_close_series(&cfg.equity_benchmark, cfg.trend_history_days);
    let Some(ma) = moving_average(&closes, cfg.trend_ma_period) else {
        return Signal::neutral(
            TREND,
            format!("insufficient history for {}-day MA", cfg.trend_ma_period),
        );
    };

    let price: f64 = latest.price.try_into().unwrap_or(0.0);
    if price > ma {
        Signal::new(
            TREND,
            SignalDirection::RiskOn,
            format!("{label} above {}-day MA ({price:.0} vs {ma:.0})", cfg.trend_ma_period),
        )
    } else {
        Signal::new(
            TREND,
            SignalDirection::RiskOff,
            format!("{label} below {}-day MA ({price:.0} vs {ma:.0})", cfg.trend_ma_period),
        )
    }
}

/// Volatility-proxy daily move: spiking is risk-off, collapsing is risk-on.
pub fn eval_volatility(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    cfg: &RegimeThresholds,
) -> Signal {
    let label = universe.label(&cfg.volatility_proxy);
    let change = match reader
        .latest_observation(&cfg.volatility_proxy)
        .and_then(|obs| obs.percent_change)
    {
        Some(change) => change,
        None => return Signal::neutral(VOLATILITY, format!("{label} data unavailable")),
    };

    if change > cfg.volatility_spike_pct {
        Signal::new(
            VOLATILITY,
            SignalDirection::RiskOff,
            format!("{label} spiking ({change:+.1}%)"),
        )
    } else if change < cfg.volatility_drop_pct {
        Signal::new(
            VOLATILITY,
            SignalDirection::RiskOn,
            format!("{label} falling ({change:+.1}%)"),
        )
    } else {
        Signal::neutral(VOLATILITY, format!("{label} stable ({change:+.1}%)"))
    }
}

/// Credit spread level and week-over-week trend.
///
/// Priority order: elevated level, then WoW widening, then tight level,
/// then neutral.
pub fn eval_credit_spread(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    cfg: &RegimeThresholds,
) -> Signal {
    let label = universe.label(&cfg.credit_spread_symbol);
    let Some(latest) = reader.latest_observation(&cfg.credit_spread_symbol) else {
        return Signal::neutral(CREDIT, format!("{label} data unavailable"));
    };
    let spread: f64 = latest.price.try_into().unwrap_or(0.0);

    if spread > cfg.credit_elevated_level {
        return Signal::new(
            CREDIT,
            SignalDirection::RiskOff,
            format!("{label} elevated ({spread:.2}%)"),
        );
    }

    if let Some(week_ago) = reader.week_over_week_observation(&cfg.credit_spread_symbol) {
        let prior: f64 = week_ago.price.try_into().unwrap_or(0.0);
        let change_bps = (spread - prior) * 100.0;
        if change_bps > cfg.credit_widening_bps {
            return Signal::new(
                CREDIT,
                SignalDirection::RiskOff,
                format!("{label} widening (+{change_bps:.0} bps WoW)"),
            );
        }
    }

    if spread < cfg.credit_tight_level {
        return Signal::new(
            CREDIT,
            SignalDirection::RiskOn,
            format!("{label} tight ({spread:.2}%)"),
        );
    }

    Signal::neutral(CREDIT, format!("{label} neutral ({spread:.2}%)"))
}

/// Dollar spike detection. Asymmetric: a strong dollar flags risk-off,
/// a weak dollar is never taken as risk-on.
pub fn eval_currency(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    cfg: &RegimeThresholds,
) -> Signal {
    let label = universe.label(&cfg.currency_proxy);
    let change = match reader
        .latest_observation(&cfg.currency_proxy)
        .and_then(|obs| obs.percent_change)
    {
        Some(change) => change,
        None => return Signal::neutral(CURRENCY, format!("{label} data unavailable")),
    };

    if change > cfg.currency_spike_pct {
        Signal::new(
            CURRENCY,
            SignalDirection::RiskOff,
            format!("{label} spiking (+{change:.1}%)"),
        )
    } else {
        Signal::neutral(CURRENCY, format!("{label} stable ({change:+.1}%)"))
    }
}

/// Safe haven outrunning equities. Asymmetric: only flags risk-off.
///
/// Requires the safe haven to be up more than the minimum AND beating the
/// equity benchmark same-day, which filters out noise on flat days.
pub fn eval_safe_haven(
    reader: &dyn SnapshotReader,
    universe: &Universe,
    cfg: &RegimeThresholds,
) -> Signal {
    let haven_label = universe.label(&cfg.safe_haven_symbol);
    let equity_label = universe.label(&cfg.equity_benchmark);

    let haven = reader.latest_observation(&cfg.safe_haven_symbol);
    let equity = reader.latest_observation(&cfg.equity_benchmark);
    let (Some(haven), Some(equity)) = (haven, equity) else {
        return Signal::neutral(
            SAFE_HAVEN,
            format!("{haven_label}/{equity_label} data unavailable"),
        );
    };

    let (Some(haven_pct), Some(equity_pct)) = (haven.percent_change, equity.percent_change) else {
        return Signal::neutral(
            SAFE_HAVEN,
            format!("{haven_label}/{equity_label} change data unavailable"),
        );
    };

    if haven_pct > cfg.safe_haven_min_pct && haven_pct > equity_pct {
        Signal::new(
            SAFE_HAVEN,
            SignalDirection::RiskOff,
            format!("{haven_label} outperforming {equity_label} ({haven_pct:+.1}% vs {equity_pct:+.1}%)"),
        )
    } else {
        Signal::neutral(
            SAFE_HAVEN,
            format!("{haven_label} not outperforming {equity_label}"),
        )
    }
}
