//! Response reconciliation and busy-action tracking.
//!
//! # Design
//! - Each resource carries a monotonically increasing generation. Fetches take
//!   a [`FetchTicket`] when issued; only the ticket of the most recently
//!   issued fetch may commit, so an older response that resolves late is
//!   discarded instead of overwriting newer data.
//! - After [`Reconciler::teardown`] every result is dropped. In-flight requests
//!   are allowed to finish; their outcome simply has nowhere to go.

use std::collections::BTreeSet;

use crate::model::{ProxyRecord, SchedulerSnapshot};

/// Remote resources fetched by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// Scheduler status.
    Status,
    /// Full proxy list.
    Proxies,
}

impl Resource {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Proxies => "proxies",
        }
    }
}

/// Issue-order token carried by one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    resource: Resource,
    generation: u64,
}

impl FetchTicket {
    /// Resource the fetch targets.
    #[must_use]
    pub const fn resource(self) -> Resource {
        self.resource
    }

    /// Issue order, starting at 1.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Result of offering a response to the [`Reconciler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The response became the current snapshot.
    Applied,
    /// A newer fetch was issued after this one; discarded.
    Stale,
    /// The dashboard was torn down; discarded.
    Unmounted,
}

/// Last committed status and proxy snapshots.
#[derive(Debug, Clone)]
pub struct Reconciler {
    status: Option<SchedulerSnapshot>,
    proxies: Vec<ProxyRecord>,
    proxies_revision: u64,
    status_issued: u64,
    proxies_issued: u64,
    mounted: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Empty, mounted reconciler. Status is unknown until the first commit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: None,
            proxies: Vec::new(),
            proxies_revision: 0,
            status_issued: 0,
            proxies_issued: 0,
            mounted: true,
        }
    }

    /// Register a new fetch for `resource`, superseding any earlier one.
    pub fn issue(&mut self, resource: Resource) -> FetchTicket {
        let counter = match resource {
            Resource::Status => &mut self.status_issued,
            Resource::Proxies => &mut self.proxies_issued,
        };
        *counter += 1;
        FetchTicket {
            resource,
            generation: *counter,
        }
    }

    fn admit(&self, ticket: FetchTicket, expected: Resource) -> ApplyOutcome {
        if !self.mounted {
            return ApplyOutcome::Unmounted;
        }
        let latest = match expected {
            Resource::Status => self.status_issued,
            Resource::Proxies => self.proxies_issued,
        };
        if ticket.resource == expected && ticket.generation == latest {
            ApplyOutcome::Applied
        } else {
            ApplyOutcome::Stale
        }
    }

    /// Commit a status response if `ticket` is still the latest status fetch.
    pub fn apply_status(
        &mut self,
        ticket: FetchTicket,
        snapshot: SchedulerSnapshot,
    ) -> ApplyOutcome {
        let outcome = self.admit(ticket, Resource::Status);
        if outcome == ApplyOutcome::Applied {
            self.status = Some(snapshot);
        }
        outcome
    }

    /// Commit a proxy list if `ticket` is still the latest proxy fetch. The
    /// list replaces the previous snapshot wholesale.
    pub fn apply_proxies(
        &mut self,
        ticket: FetchTicket,
        proxies: Vec<ProxyRecord>,
    ) -> ApplyOutcome {
        let outcome = self.admit(ticket, Resource::Proxies);
        if outcome == ApplyOutcome::Applied {
            self.proxies = proxies;
            self.proxies_revision += 1;
        }
        outcome
    }

    /// Last committed status; `None` until the first status arrives.
    #[must_use]
    pub const fn status(&self) -> Option<&SchedulerSnapshot> {
        self.status.as_ref()
    }

    /// Last committed proxy list.
    #[must_use]
    pub fn proxies(&self) -> &[ProxyRecord] {
        &self.proxies
    }

    /// Bumped on every proxy commit; used as a memoisation key.
    #[must_use]
    pub const fn proxies_revision(&self) -> u64 {
        self.proxies_revision
    }

    /// Whether a periodic tick should refetch proxies.
    #[must_use]
    pub fn proxies_are_live(&self) -> bool {
        self.status.as_ref().is_some_and(|status| status.state.is_active())
    }

    /// Stop accepting results.
    pub fn teardown(&mut self) {
        self.mounted = false;
    }

    /// Whether results are still accepted.
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// Identifies a user-triggered action for busy tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    /// Start the scheduler.
    Start,
    /// Stop the scheduler.
    Stop,
    /// Pause the scheduler.
    Pause,
    /// Resume the scheduler.
    Resume,
    /// Trigger an immediate run.
    Refresh,
    /// Change the run interval.
    SetInterval,
    /// Change the validation worker count.
    SetThreads,
    /// Stop the scheduler and leave the dashboard.
    StopAndExit,
}

impl ActionKind {
    /// Human label used in failure messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start Process",
            Self::Stop => "Stop Process",
            Self::Pause => "Pause Process",
            Self::Resume => "Resume Process",
            Self::Refresh => "Refresh Proxies",
            Self::SetInterval => "Set Interval",
            Self::SetThreads => "Set Threads",
            Self::StopAndExit => "Stop and Exit",
        }
    }
}

/// Actions currently awaiting a response. Absent means idle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PendingActionSet {
    busy: BTreeSet<ActionKind>,
}

impl PendingActionSet {
    /// Mark `kind` busy; `false` when it already was.
    pub fn begin(&mut self, kind: ActionKind) -> bool {
        self.busy.insert(kind)
    }

    /// Clear the busy flag for `kind`.
    pub fn finish(&mut self, kind: ActionKind) {
        self.busy.remove(&kind);
    }

    /// Whether `kind` is awaiting a response.
    #[must_use]
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.busy.contains(&kind)
    }

    /// Whether anything is in flight.
    #[must_use]
    pub fn any_busy(&self) -> bool {
        !self.busy.is_empty()
    }
}
