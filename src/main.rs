//! # Classify the current market regime from a snapshot file
//! pulse-engine regime --snapshots data/observations.json
//!
//! # Cross-asset correlation report over one month
//! pulse-engine correlations --snapshots data/observations.json --period 1M
//!
//! # Override thresholds from a TOML file
//! pulse-engine regime --snapshots data/observations.json --config config/thresholds.toml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use pulse_engine::{
    CorrelationConfig, EngineConfig, MemorySnapshotStore, RegimeThresholds, ReportPeriod,
};

#[derive(Parser)]
#[command(name = "pulse-engine")]
#[command(about = "Cross-asset market regime and correlation engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML file overriding default thresholds
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the current market regime from latest snapshots
    Regime {
        /// Path to a JSON file of price observations
        #[arg(short, long)]
        snapshots: PathBuf,
    },

    /// Detect cross-asset correlations and anomalies
    Correlations {
        /// Path to a JSON file of price observations
        #[arg(short, long)]
        snapshots: PathBuf,

        /// Reporting window: 1D, 1W, 1M or YTD
        #[arg(short, long, default_value = "1D")]
        period: ReportPeriod,
    },
}

/// Threshold overrides accepted from the config file. Sections are
/// optional; anything omitted keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileOverrides {
    regime: Option<RegimeThresholds>,
    correlation: Option<CorrelationConfig>,
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = EngineConfig::default();
    if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let overrides: FileOverrides =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        if let Some(regime) = overrides.regime {
            config.regime = regime;
        }
        if let Some(correlation) = overrides.correlation {
            config.correlation = correlation;
        }
    }
    Ok(config)
}

fn load_store(path: &Path) -> Result<MemorySnapshotStore> {
    MemorySnapshotStore::load_json(path)
        .with_context(|| format!("loading snapshots from {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Regime { snapshots } => {
            let store = load_store(&snapshots)?;
            let result = config.classify(&store, store.as_of());
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Correlations { snapshots, period } => {
            let store = load_store(&snapshots)?;
            let report = config.correlations(&store, period, store.as_of());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
