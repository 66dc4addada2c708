//! Engine configuration.
//!
//! Everything the engine needs beyond raw observations, loaded once at
//! startup and passed explicitly into the entry points. Nothing here is
//! mutated at runtime.

use chrono::{DateTime, Utc};

use crate::correlation::{detect_correlations, CorrelationConfig, CorrelationReport, ReportPeriod};
use crate::data::SnapshotReader;
use crate::regime::{classify_regime, RegimeResult, RegimeThresholds};
use crate::universe::{BaselineCorrelations, Universe};

/// Immutable configuration for both pipelines.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub universe: Universe,
    pub baselines: BaselineCorrelations,
    pub regime: RegimeThresholds,
    pub correlation: CorrelationConfig,
}

impl EngineConfig {
    /// Run the regime pipeline against a reader.
    pub fn classify(&self, reader: &dyn SnapshotReader, now: DateTime<Utc>) -> RegimeResult {
        classify_regime(reader, &self.universe, &self.regime, now)
    }

    /// Run the correlation pipeline against a reader.
    pub fn correlations(
        &self,
        reader: &dyn SnapshotReader,
        period: ReportPeriod,
        now: DateTime<Utc>,
    ) -> CorrelationReport {
        detect_correlations(
            reader,
            &self.universe,
            &self.baselines,
            &self.correlation,
            period,
            now,
        )
    }
}
