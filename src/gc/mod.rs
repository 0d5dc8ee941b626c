//! Mark-and-sweep collector over a fixed heap of two-cell nodes.

mod collector;
mod error;
mod heap;
mod liveness;
mod roots;

pub use collector::{CollectionReport, Collector, GcStats};
pub use error::{GcError, GcResult};
pub use heap::{Address, Heap, MAX_CELLS, NODE_CELLS};
pub use liveness::AddressSet;
pub use roots::RootTable;
