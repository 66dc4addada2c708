pub mod config;
pub mod correlation;
pub mod data;
pub mod regime;
pub mod series;
pub mod universe;

// Re-export commonly used types
pub use config::EngineConfig;
pub use correlation::{
    AnomalyKind, CoMovingGroup, CorrelationAnomaly, CorrelationConfig, CorrelationReport,
    DivergingPair, PairCorrelation, ReportPeriod,
};
pub use data::{
    DailyClose, Direction, MemorySnapshotStore, PairKey, PriceObservation, ReturnPoint,
    SnapshotReader, StoreError,
};
pub use regime::{RegimeLabel, RegimeResult, RegimeThresholds, Signal, SignalDirection};
pub use universe::{AssetClass, BaselineCorrelations, Instrument, Universe};
