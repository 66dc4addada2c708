//! Instrument universe and baseline correlation table.
//!
//! The universe is static configuration: the tracked cross-asset symbols
//! grouped by asset class with human-readable labels, the scarcity /
//! broad-risk sets used by the divergence check, and the long-run expected
//! correlation per pair. Loaded once and never mutated by the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::PairKey;

/// Asset class grouping for the tracked universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equities,
    International,
    Currencies,
    Commodities,
    CriticalMinerals,
    Crypto,
    Rates,
    Credit,
}

/// One tracked instrument.
#[derive(Debug, Clone)]
pub struct Instrument {
    pub symbol: &'static str,
    pub label: &'static str,
    pub class: AssetClass,
}

const fn instrument(symbol: &'static str, label: &'static str, class: AssetClass) -> Instrument {
    Instrument {
        symbol,
        label,
        class,
    }
}

/// The tracked instrument universe.
#[derive(Debug, Clone)]
pub struct Universe {
    pub instruments: Vec<Instrument>,
    /// Critical-mineral instruments checked for divergence from broad risk.
    pub scarcity_symbols: Vec<String>,
    /// Broad risk-asset instruments the scarcity set is compared against.
    pub broad_risk_symbols: Vec<String>,
}

impl Default for Universe {
    fn default() -> Self {
        use AssetClass::*;
        Self {
            instruments: vec![
                instrument("SPX", "S&P 500", Equities),
                instrument("NDX", "Nasdaq 100", Equities),
                instrument("RUT", "Russell 2000", Equities),
                instrument("VIX", "VIX", Equities),
                instrument("NKY", "Nikkei 225", International),
                instrument("UKX", "FTSE 100", International),
                instrument("SX5E", "Euro Stoxx 50", International),
                instrument("HSI", "Hang Seng", International),
                instrument("DXY", "US Dollar Index", Currencies),
                instrument("WTI", "Crude Oil (WTI)", Commodities),
                instrument("NG", "Natural Gas", Commodities),
                instrument("XAU", "Gold", Commodities),
                instrument("XCU", "Copper", Commodities),
                instrument("URA", "Uranium ETF", CriticalMinerals),
                instrument("LIT", "Lithium ETF", CriticalMinerals),
                instrument("REMX", "Rare Earths ETF", CriticalMinerals),
                instrument("BTC/USD", "Bitcoin", Crypto),
                instrument("ETH/USD", "Ethereum", Crypto),
                instrument("DGS2", "2-Year Treasury Yield", Rates),
                instrument("DGS10", "10-Year Treasury Yield", Rates),
                instrument("SPREAD_2S10S", "2s10s Treasury Spread", Rates),
                instrument("BAMLC0A0CM", "IG Corporate Bond Spread", Credit),
                instrument("BAMLH0A0HYM2", "HY Corporate Bond Spread", Credit),
            ],
            scarcity_symbols: vec!["URA".into(), "LIT".into(), "REMX".into()],
            broad_risk_symbols: vec!["SPX".into(), "NDX".into()],
        }
    }
}

impl Universe {
    /// Human-readable name for a symbol; falls back to the symbol itself.
    pub fn label<'a>(&self, symbol: &'a str) -> &'a str {
        self.instruments
            .iter()
            .find(|i| i.symbol == symbol)
            .map(|i| i.label)
            .unwrap_or(symbol)
    }

    /// Every tracked symbol, in universe order.
    pub fn symbols(&self) -> Vec<String> {
        self.instruments
            .iter()
            .map(|i| i.symbol.to_string())
            .collect()
    }

    /// Symbols belonging to one asset class.
    pub fn symbols_in_class(&self, class: AssetClass) -> Vec<String> {
        self.instruments
            .iter()
            .filter(|i| i.class == class)
            .map(|i| i.symbol.to_string())
            .collect()
    }
}

/// Long-run expected correlations per pair.
///
/// An empirical reference table, not computed state. Pairs absent from the
/// table are never flagged by the baseline-driven detectors.
#[derive(Debug, Clone)]
pub struct BaselineCorrelations {
    entries: BTreeMap<PairKey, f64>,
}

impl BaselineCorrelations {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (&'static str, &'static str, f64)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(a, b, r)| (PairKey::new(a, b), r))
            .collect();
        Self { entries }
    }

    /// Expected correlation for a pair, if tracked.
    pub fn get(&self, pair: &PairKey) -> Option<f64> {
        self.entries.get(pair).copied()
    }

    /// Iterate pairs in canonical (PairKey-ascending) order.
    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn insert(&mut self, pair: PairKey, expected: f64) {
        self.entries.insert(pair, expected);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BaselineCorrelations {
    fn default() -> Self {
        Self::from_pairs([
            // Equity indices move in lockstep.
            ("SPX", "NDX", 0.90),
            ("SPX", "RUT", 0.85),
            ("NDX", "RUT", 0.75),
            ("SPX", "UKX", 0.70),
            ("SPX", "NKY", 0.65),
            ("SX5E", "UKX", 0.85),
            ("HSI", "NKY", 0.60),
            // Volatility is the classic inverse.
            ("SPX", "VIX", -0.80),
            ("NDX", "VIX", -0.75),
            // Dollar strength weighs on risk and gold.
            ("DXY", "SPX", -0.30),
            ("DXY", "XAU", -0.40),
            // Credit stress moves against equities.
            ("BAMLH0A0HYM2", "SPX", -0.60),
            // Commodities.
            ("SPX", "WTI", 0.30),
            ("WTI", "XCU", 0.45),
            ("SPX", "XAU", 0.05),
            // Crypto is historically loosely attached to equities.
            ("BTC/USD", "SPX", 0.15),
            ("BTC/USD", "NDX", 0.20),
            ("BTC/USD", "ETH/USD", 0.80),
            // Critical minerals ride broad risk appetite.
            ("URA", "SPX", 0.30),
            ("URA", "NDX", 0.30),
            ("LIT", "SPX", 0.40),
            ("LIT", "NDX", 0.40),
            ("REMX", "SPX", 0.35),
            ("REMX", "NDX", 0.35),
        ])
    }
}
