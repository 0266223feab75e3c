//! Mount-time fetch and periodic polling.

use tracing::{debug, warn};

use crate::session::DashboardSession;
use crate::state::{ApplyOutcome, Resource};

/// Milliseconds between periodic ticks.
pub const POLL_INTERVAL_MS: u32 = 5_000;

/// What happened to one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Response became the current snapshot.
    Committed,
    /// A newer fetch superseded this one.
    Stale,
    /// The session was torn down first.
    Unmounted,
    /// The request failed; the previous snapshot stays.
    Failed,
}

impl From<ApplyOutcome> for FetchOutcome {
    fn from(value: ApplyOutcome) -> Self {
        match value {
            ApplyOutcome::Applied => Self::Committed,
            ApplyOutcome::Stale => Self::Stale,
            ApplyOutcome::Unmounted => Self::Unmounted,
        }
    }
}

/// Outcome of a mount or tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Status fetch result.
    pub status: FetchOutcome,
    /// Proxy fetch result; `None` when the tick skipped it.
    pub proxies: Option<FetchOutcome>,
}

/// Drives background fetches for a [`DashboardSession`].
///
/// The caller owns the timer: the browser uses an interval callback and the
/// CLI a tokio interval, both calling [`Poller::tick`] every
/// [`POLL_INTERVAL_MS`].
#[derive(Debug, Clone)]
pub struct Poller {
    session: DashboardSession,
}

impl Poller {
    pub(crate) const fn new(session: DashboardSession) -> Self {
        Self { session }
    }

    /// Initial load: status and proxies, unconditionally.
    pub async fn mount(&self) -> TickReport {
        let status = self.refresh_status().await;
        let proxies = self.refresh_proxies().await;
        TickReport {
            status,
            proxies: Some(proxies),
        }
    }

    /// Periodic refresh. Status is always fetched; proxies only when the
    /// status known before this tick was running or validating.
    pub async fn tick(&self) -> TickReport {
        let proxies_live = self.session.proxies_are_live();
        let status = self.refresh_status().await;
        let proxies = if proxies_live {
            Some(self.refresh_proxies().await)
        } else {
            None
        };
        TickReport { status, proxies }
    }

    /// Fetch and commit the scheduler status.
    pub async fn refresh_status(&self) -> FetchOutcome {
        let ticket = self.session.issue(Resource::Status);
        match self.session.gateway().get_status().await {
            Ok(response) => self.settle(
                Resource::Status,
                self.session.commit_status(ticket, response),
            ),
            Err(error) => {
                warn!(resource = Resource::Status.as_str(), error = %error, "poll failed");
                self.session.notifier().poll_failed(Resource::Status, &error);
                FetchOutcome::Failed
            }
        }
    }

    /// Fetch and commit the full proxy list.
    pub async fn refresh_proxies(&self) -> FetchOutcome {
        let ticket = self.session.issue(Resource::Proxies);
        match self.session.gateway().get_proxies().await {
            Ok(items) => {
                let count = items.len();
                let outcome = self.settle(
                    Resource::Proxies,
                    self.session.commit_proxies(ticket, items),
                );
                if outcome == FetchOutcome::Committed {
                    debug!(count, "proxy snapshot committed");
                }
                outcome
            }
            Err(error) => {
                warn!(resource = Resource::Proxies.as_str(), error = %error, "poll failed");
                self.session.notifier().poll_failed(Resource::Proxies, &error);
                FetchOutcome::Failed
            }
        }
    }

    fn settle(&self, resource: Resource, outcome: ApplyOutcome) -> FetchOutcome {
        if outcome != ApplyOutcome::Applied {
            debug!(
                resource = resource.as_str(),
                mounted = self.session.is_mounted(),
                "discarding superseded response"
            );
        }
        outcome.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::model::SchedulerState;
    use crate::testing::{FakeGateway, item, session_over, status};
    use proxyscope_api_models::SchedulerStatusKind;
    use std::rc::Rc;

    #[tokio::test]
    async fn mount_fetches_both_resources() {
        let gateway = Rc::new(FakeGateway::default());
        gateway.set_status(status(SchedulerStatusKind::Stopped, false));
        gateway.set_proxies(vec![item("1.1.1.1", Some("DE"), true)]);
        let session = session_over(&gateway);

        let report = session.poller().mount().await;
        assert_eq!(report.status, FetchOutcome::Committed);
        assert_eq!(report.proxies, Some(FetchOutcome::Committed));
        assert_eq!(gateway.calls(), ["get_status", "get_proxies"]);
        assert_eq!(session.proxies().len(), 1);
    }

    #[tokio::test]
    async fn tick_skips_proxies_unless_last_status_was_active() {
        let gateway = Rc::new(FakeGateway::default());
        gateway.set_status(status(SchedulerStatusKind::Running, false));
        let session = session_over(&gateway);
        let poller = session.poller();

        // Nothing known yet, so the first tick only learns the status.
        let first = poller.tick().await;
        assert_eq!(first.proxies, None);

        let second = poller.tick().await;
        assert_eq!(second.proxies, Some(FetchOutcome::Committed));

        gateway.set_status(status(SchedulerStatusKind::Paused, false));
        let third = poller.tick().await;
        assert_eq!(third.proxies, Some(FetchOutcome::Committed));
        let fourth = poller.tick().await;
        assert_eq!(fourth.proxies, None);
        assert_eq!(session.status().map(|s| s.state), Some(SchedulerState::Paused));
    }

    #[tokio::test]
    async fn failures_keep_the_previous_snapshot() {
        let gateway = Rc::new(FakeGateway::default());
        gateway.set_status(status(SchedulerStatusKind::Running, true));
        let session = session_over(&gateway);
        let poller = session.poller();
        poller.mount().await;

        gateway.fail_status(RemoteError::transport("connection refused"));
        let report = poller.tick().await;
        assert_eq!(report.status, FetchOutcome::Failed);
        let kept = session.status().expect("status kept");
        assert_eq!(kept.state, SchedulerState::Running);
        assert!(kept.validation_in_progress);
    }

    #[tokio::test]
    async fn results_after_teardown_are_discarded() {
        let gateway = Rc::new(FakeGateway::default());
        let session = session_over(&gateway);
        session.teardown();

        let report = session.poller().mount().await;
        assert_eq!(report.status, FetchOutcome::Unmounted);
        assert_eq!(report.proxies, Some(FetchOutcome::Unmounted));
        assert!(session.status().is_none());
    }
}
