//! Market data inputs: observation types and the snapshot reader boundary.

pub mod store;
pub mod types;

pub use store::{MemorySnapshotStore, SnapshotReader, StoreError};
pub use types::{DailyClose, Direction, PairKey, PriceObservation, ReturnPoint};
