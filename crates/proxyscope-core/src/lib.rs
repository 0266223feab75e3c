#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Runtime-agnostic dashboard engine for the proxy scheduler.
//!
//! The crate owns everything between the HTTP gateway and a renderer:
//! snapshot reconciliation, persisted settings, the derived table view,
//! polling and user actions. It never spawns tasks or owns timers; the
//! browser and CLI front-ends drive it from their own executors.

pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod model;
pub mod poller;
pub mod session;
pub mod settings;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

pub use dispatch::{
    ActionDispatcher, ActionFailure, DispatchError, DispatchOutcome, SchedulerAction,
};
pub use error::{RemoteError, RemoteResult};
pub use gateway::SchedulerGateway;
pub use model::{ProxyRecord, SchedulerSnapshot, SchedulerState};
pub use poller::{FetchOutcome, POLL_INTERVAL_MS, Poller, TickReport};
pub use session::{DashboardSession, DashboardView, Notifier, QuietNotifier};
pub use settings::{
    BlockList, BlockListError, KeyValueStore, MemoryStore, SettingsStore, ThreadCount,
};
pub use state::{ActionKind, Resource};
pub use view::display::{ControlState, ProxyRow, TableState};
pub use view::{FilterCounts, FilterSortState, ProxyFilter, SortOrder};
