//! User-triggered scheduler mutations.
//!
//! # Design
//! - One dispatch per action kind at a time; re-entry is ignored.
//! - Interval and thread changes apply locally before the request and revert
//!   if it fails, unless a status poll replaced the value in the meantime.
//! - A successful mutation is followed by a forced status fetch, then a forced
//!   proxy fetch. The busy flag clears only after both.

use proxyscope_api_models::ActionAck;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{RemoteError, RemoteResult};
use crate::session::DashboardSession;
use crate::settings::{INTERVAL_OPTIONS_SECS, ThreadCount};
use crate::state::ActionKind;

/// A mutation the operator can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerAction {
    /// Start the scheduler.
    Start,
    /// Stop the scheduler.
    Stop,
    /// Pause a running scheduler.
    Pause,
    /// Resume a paused scheduler.
    Resume,
    /// Trigger an immediate validation run.
    Refresh,
    /// Change the run interval, in seconds.
    SetInterval(u32),
    /// Change the validation worker count.
    SetThreads(u32),
    /// Stop the scheduler before the operator leaves the dashboard.
    StopAndExit,
}

impl SchedulerAction {
    /// Busy-tracking key.
    #[must_use]
    pub const fn kind(self) -> ActionKind {
        match self {
            Self::Start => ActionKind::Start,
            Self::Stop => ActionKind::Stop,
            Self::Pause => ActionKind::Pause,
            Self::Resume => ActionKind::Resume,
            Self::Refresh => ActionKind::Refresh,
            Self::SetInterval(_) => ActionKind::SetInterval,
            Self::SetThreads(_) => ActionKind::SetThreads,
            Self::StopAndExit => ActionKind::StopAndExit,
        }
    }

    fn validate(self) -> Result<(), DispatchError> {
        match self {
            Self::SetInterval(seconds) if !INTERVAL_OPTIONS_SECS.contains(&seconds) => {
                Err(DispatchError::IntervalNotOffered(seconds))
            }
            Self::SetThreads(count)
                if !ThreadCount::new(count).is_some_and(ThreadCount::is_option) =>
            {
                Err(DispatchError::ThreadsNotOffered(count))
            }
            _ => Ok(()),
        }
    }
}

/// Requests rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Interval outside the selectable options.
    #[error("{0} seconds is not a selectable interval")]
    IntervalNotOffered(u32),
    /// Thread count outside the selectable options.
    #[error("{0} is not a selectable thread count")]
    ThreadsNotOffered(u32),
}

/// A mutation the server or network rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error during {}: {error}", .action.label())]
pub struct ActionFailure {
    /// Which action failed.
    pub action: ActionKind,
    /// Why.
    pub error: RemoteError,
}

/// How a dispatch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Server accepted the mutation and the dashboard refreshed.
    Completed(ActionAck),
    /// Server or network rejected it; local state was restored.
    Failed(ActionFailure),
    /// The same action was already in flight.
    Ignored,
}

enum Rollback {
    Interval { applied: u32, previous: u32 },
    Threads { applied: ThreadCount, previous: ThreadCount },
}

/// Executes [`SchedulerAction`]s against the session's gateway.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    session: DashboardSession,
}

impl ActionDispatcher {
    pub(crate) const fn new(session: DashboardSession) -> Self {
        Self { session }
    }

    /// Run one action to completion.
    ///
    /// # Errors
    /// [`DispatchError`] when an interval or thread count is not one of the
    /// selectable options. Remote failures are reported through
    /// [`DispatchOutcome::Failed`] and the session's notifier instead.
    pub async fn dispatch(
        &self,
        action: SchedulerAction,
    ) -> Result<DispatchOutcome, DispatchError> {
        action.validate()?;
        let kind = action.kind();
        let Some(_busy) = self.session.begin_action(kind) else {
            return Ok(DispatchOutcome::Ignored);
        };

        let rollback = self.apply_optimistic(action);
        match self.send(action).await {
            Ok(ack) => {
                info!(action = kind.label(), message = ack.message.as_deref(), "action accepted");
                let poller = self.session.poller();
                poller.refresh_status().await;
                poller.refresh_proxies().await;
                Ok(DispatchOutcome::Completed(ack))
            }
            Err(error) => {
                if let Some(rollback) = rollback {
                    self.restore(rollback);
                }
                let failure = ActionFailure {
                    action: kind,
                    error,
                };
                warn!(action = kind.label(), error = %failure.error, "action failed");
                self.session.notifier().action_failed(&failure);
                Ok(DispatchOutcome::Failed(failure))
            }
        }
    }

    fn apply_optimistic(&self, action: SchedulerAction) -> Option<Rollback> {
        match action {
            SchedulerAction::SetInterval(seconds) => Some(Rollback::Interval {
                applied: seconds,
                previous: self.session.replace_selected_interval(seconds),
            }),
            SchedulerAction::SetThreads(count) => {
                ThreadCount::new(count).map(|threads| Rollback::Threads {
                    applied: threads,
                    previous: self.session.replace_threads(threads),
                })
            }
            _ => None,
        }
    }

    fn restore(&self, rollback: Rollback) {
        let restored = match rollback {
            Rollback::Interval { applied, previous } => {
                self.session.restore_selected_interval(applied, previous)
            }
            Rollback::Threads { applied, previous } => {
                self.session.restore_threads(applied, previous)
            }
        };
        if !restored {
            debug!("server value arrived while the action was in flight; keeping it");
        }
    }

    async fn send(&self, action: SchedulerAction) -> RemoteResult<ActionAck> {
        let gateway = self.session.gateway();
        match action {
            SchedulerAction::Start => gateway.start().await,
            SchedulerAction::Stop | SchedulerAction::StopAndExit => gateway.stop().await,
            SchedulerAction::Pause => gateway.pause().await,
            SchedulerAction::Resume => gateway.resume().await,
            SchedulerAction::Refresh => gateway.refresh().await,
            SchedulerAction::SetInterval(seconds) => gateway.set_interval(seconds).await,
            SchedulerAction::SetThreads(count) => gateway.set_threads(count).await,
        }
    }
}
