//! cellgc - A mark-and-sweep garbage collector over a simulated heap
//!
//! The collector manages a fixed array of integer cells holding two-cell
//! nodes (a value and a link), reachable only through named root variables.

pub mod config;
pub mod demo;
pub mod gc;

// Re-export commonly used types
pub use config::{CollectorConfig, ConfigError, ConfigFile, ListSpec, ReportFormat};
pub use gc::{Address, CollectionReport, Collector, GcError, GcResult, GcStats};
