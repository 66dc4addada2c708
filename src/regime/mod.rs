//! Market regime classification module.
//!
//! Five rule-based signals — equity trend, volatility move, credit spread,
//! dollar strength, safe-haven flight — aggregated into a RISK-ON /
//! RISK-OFF / MIXED label with a composite reason.

pub mod classifier;
pub mod signals;

pub use classifier::{aggregate, build_reason, classify_regime, RegimeLabel, RegimeResult};
pub use signals::{RegimeThresholds, Signal, SignalDirection};
