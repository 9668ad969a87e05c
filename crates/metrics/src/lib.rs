//! Per-agent invocation statistics for agentdeck.
//!
//! This crate provides:
//! - [`StatEntry`], an immutable snapshot of one agent's counters.
//! - [`StatsStore`], the concurrent map that merges invocations atomically.
//! - [`SnapshotStore`] / [`JsonFileStore`] for crash-safe persistence.
//! - [`StatsService`], which ties the store and persistence together and
//!   answers ranking, summary, and dashboard queries.
//!
//! # Example
//!
//! ```
//! use agentdeck_metrics::StatsService;
//!
//! let stats = StatsService::in_memory();
//! stats.initialize();
//! stats.record_invocation("debugger", true, 120);
//! stats.record_invocation("debugger", false, 80);
//!
//! let entry = stats.get_agent_stats("debugger").unwrap();
//! assert_eq!(entry.invocation_count, 2);
//! assert_eq!(entry.average_response_time_ms, 100.0);
//! ```

#![deny(unsafe_code)]

mod entry;
mod error;
pub mod persistence;
mod report;
mod service;
mod store;

pub use entry::StatEntry;
pub use error::{PersistenceError, StatsError};
pub use persistence::{JsonFileStore, SnapshotStore};
pub use report::{AgentUsageStats, DashboardReport};
pub use service::{LifecycleState, StatsService};
pub use store::{Snapshot, StatsStore};
