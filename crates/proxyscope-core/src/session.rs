//! Shared dashboard session: the single owner of snapshots, settings and
//! transient table state.
//!
//! # Design
//! - [`DashboardSession`] is a cheap `Rc` handle; the poller, the dispatcher
//!   and the UI all hold clones of the same state.
//! - No `RefCell` borrow is ever held across an `.await`.
//! - Every change pushes a fresh [`DashboardView`] to subscribers.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use proxyscope_api_models::{ProxyItemResponse, SchedulerStatusResponse};

use crate::dispatch::{ActionDispatcher, ActionFailure};
use crate::error::RemoteError;
use crate::gateway::SchedulerGateway;
use crate::model::{ProxyRecord, SchedulerSnapshot};
use crate::poller::Poller;
use crate::settings::{BlockListError, DEFAULT_INTERVAL_SECS, SettingsStore, ThreadCount};
use crate::state::{ActionKind, ApplyOutcome, FetchTicket, PendingActionSet, Reconciler, Resource};
use crate::view::display::{ControlState, ProxyRow, TableState};
use crate::view::{FilterCounts, FilterSortState, ProxyFilter, SortOrder, ViewCache};

/// Receives user-facing failure notices.
pub trait Notifier {
    /// A user-triggered action failed; `failure` renders the alert text.
    fn action_failed(&self, failure: &ActionFailure) {
        let _ = failure;
    }

    /// A background fetch failed. The dashboard keeps its last snapshot.
    fn poll_failed(&self, resource: Resource, error: &RemoteError) {
        let _ = (resource, error);
    }
}

/// Notifier that relies on the session's own logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuietNotifier;

impl Notifier for QuietNotifier {}

/// Everything a renderer needs, computed from one consistent state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    /// Last known scheduler status.
    pub status: Option<SchedulerSnapshot>,
    /// Table body classification over the raw list.
    pub table: TableState,
    /// Blocked, filtered and sorted rows.
    pub rows: Vec<ProxyRow>,
    /// Filter button counts.
    pub counts: FilterCounts,
    /// Active filter and sort.
    pub filter_sort: FilterSortState,
    /// Control affordances.
    pub controls: ControlState,
    /// Blocked countries in display order.
    pub blocklist: Vec<String>,
    /// Selected validation worker count.
    pub threads: u32,
    /// Selected run interval in seconds.
    pub interval_seconds: u32,
    /// Length of the raw proxy snapshot.
    pub raw_count: usize,
}

impl DashboardView {
    /// The sort toggle only works with rows on screen.
    #[must_use]
    pub fn sort_enabled(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Filters hid every record of a non-empty list.
    #[must_use]
    pub fn shows_no_match(&self) -> bool {
        self.table == TableState::Populated && self.rows.is_empty()
    }
}

struct SessionState {
    reconciler: Reconciler,
    settings: SettingsStore,
    filter_sort: FilterSortState,
    selected_interval: u32,
    pending: PendingActionSet,
    cache: ViewCache,
}

type Listener = Rc<dyn Fn(&DashboardView)>;

/// Handle to the dashboard state.
#[derive(Clone)]
pub struct DashboardSession {
    state: Rc<RefCell<SessionState>>,
    gateway: Rc<dyn SchedulerGateway>,
    notifier: Rc<dyn Notifier>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DashboardSession")
            .field("status", &state.reconciler.status())
            .field("proxies", &state.reconciler.proxies().len())
            .field("settings", &state.settings)
            .field("filter_sort", &state.filter_sort)
            .field("pending", &state.pending)
            .finish_non_exhaustive()
    }
}

impl DashboardSession {
    /// New session with nothing loaded yet.
    pub fn new(
        gateway: Rc<dyn SchedulerGateway>,
        settings: SettingsStore,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            state: Rc::new(RefCell::new(SessionState {
                reconciler: Reconciler::new(),
                settings,
                filter_sort: FilterSortState::default(),
                selected_interval: DEFAULT_INTERVAL_SECS,
                pending: PendingActionSet::default(),
                cache: ViewCache::default(),
            })),
            gateway,
            notifier,
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Poller bound to this session.
    #[must_use]
    pub fn poller(&self) -> Poller {
        Poller::new(self.clone())
    }

    /// Action dispatcher bound to this session.
    #[must_use]
    pub fn dispatcher(&self) -> ActionDispatcher {
        ActionDispatcher::new(self.clone())
    }

    /// Call `listener` with a fresh view after every change.
    pub fn subscribe(&self, listener: impl Fn(&DashboardView) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub(crate) fn gateway(&self) -> &dyn SchedulerGateway {
        self.gateway.as_ref()
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Compute the current view.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let status = state.reconciler.status().cloned();
        let raw_count = state.reconciler.proxies().len();
        let derived = state.cache.get_or_derive(
            state.reconciler.proxies_revision(),
            state.reconciler.proxies(),
            state.settings.blocklist(),
            state.filter_sort,
        );
        DashboardView {
            table: TableState::classify(status.as_ref(), raw_count),
            rows: derived.rows.iter().map(ProxyRow::from).collect(),
            counts: derived.counts,
            filter_sort: state.filter_sort,
            controls: ControlState::derive(status.as_ref(), &state.pending),
            blocklist: state.settings.blocklist().entries().to_vec(),
            threads: state.settings.threads().get(),
            interval_seconds: state.selected_interval,
            raw_count,
            status,
        }
    }

    fn notify(&self) {
        if !self.is_mounted() {
            return;
        }
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        if listeners.is_empty() {
            return;
        }
        let view = self.view();
        for listener in listeners {
            listener(&view);
        }
    }

    /// Last known status.
    #[must_use]
    pub fn status(&self) -> Option<SchedulerSnapshot> {
        self.state.borrow().reconciler.status().cloned()
    }

    /// Last committed proxy list.
    #[must_use]
    pub fn proxies(&self) -> Vec<ProxyRecord> {
        self.state.borrow().reconciler.proxies().to_vec()
    }

    /// Whether periodic ticks should refetch proxies.
    #[must_use]
    pub fn proxies_are_live(&self) -> bool {
        self.state.borrow().reconciler.proxies_are_live()
    }

    /// Stop accepting fetch results and notifying listeners.
    pub fn teardown(&self) {
        self.state.borrow_mut().reconciler.teardown();
        self.listeners.borrow_mut().clear();
    }

    /// Whether the session still accepts results.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state.borrow().reconciler.is_mounted()
    }

    pub(crate) fn issue(&self, resource: Resource) -> FetchTicket {
        self.state.borrow_mut().reconciler.issue(resource)
    }

    /// Commit a status response and adopt the server's interval and thread
    /// count. Zero means "not reported" and is ignored.
    pub(crate) fn commit_status(
        &self,
        ticket: FetchTicket,
        response: SchedulerStatusResponse,
    ) -> ApplyOutcome {
        let snapshot = SchedulerSnapshot::from(response);
        let outcome = {
            let mut state = self.state.borrow_mut();
            let interval = snapshot.interval_seconds;
            let threads = ThreadCount::new(snapshot.validation_threads);
            let outcome = state.reconciler.apply_status(ticket, snapshot);
            if outcome == ApplyOutcome::Applied {
                if interval > 0 {
                    state.selected_interval = interval;
                }
                if let Some(threads) = threads {
                    state.settings.set_threads(threads);
                }
            }
            outcome
        };
        if outcome == ApplyOutcome::Applied {
            self.notify();
        }
        outcome
    }

    pub(crate) fn commit_proxies(
        &self,
        ticket: FetchTicket,
        items: Vec<ProxyItemResponse>,
    ) -> ApplyOutcome {
        let records = items.into_iter().map(ProxyRecord::from).collect();
        let outcome = self.state.borrow_mut().reconciler.apply_proxies(ticket, records);
        if outcome == ApplyOutcome::Applied {
            self.notify();
        }
        outcome
    }

    /// Mark `kind` busy for the lifetime of the returned guard. `None` when
    /// the action is already in flight.
    pub(crate) fn begin_action(&self, kind: ActionKind) -> Option<BusyGuard> {
        let started = self.state.borrow_mut().pending.begin(kind);
        if !started {
            return None;
        }
        self.notify();
        Some(BusyGuard {
            session: self.clone(),
            kind,
        })
    }

    /// Whether `kind` is awaiting a response.
    #[must_use]
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.state.borrow().pending.is_busy(kind)
    }

    /// Current filter and sort.
    #[must_use]
    pub fn filter_sort(&self) -> FilterSortState {
        self.state.borrow().filter_sort
    }

    /// Select a status filter.
    pub fn set_filter(&self, filter: ProxyFilter) {
        self.state.borrow_mut().filter_sort.filter = filter;
        self.notify();
    }

    /// Select a sort order directly.
    pub fn set_sort(&self, sort: SortOrder) {
        self.state.borrow_mut().filter_sort.sort = sort;
        self.notify();
    }

    /// Advance the sort toggle and return the new order.
    pub fn cycle_sort(&self) -> SortOrder {
        let next = {
            let mut state = self.state.borrow_mut();
            state.filter_sort.sort = state.filter_sort.sort.cycle();
            state.filter_sort.sort
        };
        self.notify();
        next
    }

    /// Block a country and persist the list.
    ///
    /// # Errors
    /// Blank or duplicate input; nothing changes.
    pub fn add_blocked(&self, input: &str) -> Result<String, BlockListError> {
        let entry = self.state.borrow_mut().settings.add_blocked(input)?;
        self.notify();
        Ok(entry)
    }

    /// Unblock a country and persist the list.
    pub fn remove_blocked(&self, country: &str) -> bool {
        let removed = self.state.borrow_mut().settings.remove_blocked(country);
        if removed {
            self.notify();
        }
        removed
    }

    /// Blocked countries in display order.
    #[must_use]
    pub fn blocklist(&self) -> Vec<String> {
        self.state.borrow().settings.blocklist().entries().to_vec()
    }

    /// Selected run interval in seconds.
    #[must_use]
    pub fn selected_interval(&self) -> u32 {
        self.state.borrow().selected_interval
    }

    /// Selected validation worker count.
    #[must_use]
    pub fn threads(&self) -> ThreadCount {
        self.state.borrow().settings.threads()
    }

    pub(crate) fn replace_selected_interval(&self, seconds: u32) -> u32 {
        let previous = std::mem::replace(&mut self.state.borrow_mut().selected_interval, seconds);
        self.notify();
        previous
    }

    pub(crate) fn replace_threads(&self, threads: ThreadCount) -> ThreadCount {
        let previous = {
            let mut state = self.state.borrow_mut();
            let previous = state.settings.threads();
            state.settings.set_threads(threads);
            previous
        };
        self.notify();
        previous
    }

    /// Put `previous` back only while the interval still holds `applied`; a
    /// server value committed in the meantime is kept.
    pub(crate) fn restore_selected_interval(&self, applied: u32, previous: u32) -> bool {
        let restored = {
            let mut state = self.state.borrow_mut();
            let current = state.selected_interval == applied;
            if current {
                state.selected_interval = previous;
            }
            current
        };
        if restored {
            self.notify();
        }
        restored
    }

    /// Thread-count counterpart of [`Self::restore_selected_interval`].
    pub(crate) fn restore_threads(&self, applied: ThreadCount, previous: ThreadCount) -> bool {
        let restored = {
            let mut state = self.state.borrow_mut();
            let current = state.settings.threads() == applied;
            if current {
                state.settings.set_threads(previous);
            }
            current
        };
        if restored {
            self.notify();
        }
        restored
    }
}

/// Clears a busy flag when dropped, on success and failure alike.
pub(crate) struct BusyGuard {
    session: DashboardSession,
    kind: ActionKind,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let finished = match self.session.state.try_borrow_mut() {
            Ok(mut state) => {
                state.pending.finish(self.kind);
                true
            }
            Err(err) => {
                tracing::warn!(
                    action = self.kind.label(),
                    error = %err,
                    "session state borrowed while clearing busy flag; action stays busy"
                );
                false
            }
        };
        if finished {
            self.session.notify();
        }
    }
}
