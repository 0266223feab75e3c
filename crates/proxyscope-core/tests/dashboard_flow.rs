//! End-to-end dashboard flows over a channel-driven gateway.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use proxyscope_api_models::{
    ActionAck, ProxyItemResponse, SchedulerStatusKind, SchedulerStatusResponse,
};
use proxyscope_core::settings::THREADS_KEY;
use proxyscope_core::{
    ActionFailure, DashboardSession, DispatchOutcome, FetchOutcome, KeyValueStore, MemoryStore,
    Notifier, ProxyFilter, RemoteError, RemoteResult, SchedulerAction, SchedulerGateway,
    SchedulerState, SettingsStore, SortOrder, TableState,
};

type Gate<T> = oneshot::Receiver<RemoteResult<T>>;

/// Answers immediately from scripted values unless a gate is queued, in which
/// case the call waits for the test to release it.
struct ChannelGateway {
    status: RefCell<SchedulerStatusResponse>,
    status_gates: RefCell<VecDeque<Gate<SchedulerStatusResponse>>>,
    proxies: RefCell<Vec<ProxyItemResponse>>,
    action_gates: RefCell<VecDeque<Gate<ActionAck>>>,
    action_error: RefCell<Option<RemoteError>>,
}

impl ChannelGateway {
    fn new(status: SchedulerStatusResponse, proxies: Vec<ProxyItemResponse>) -> Rc<Self> {
        Rc::new(Self {
            status: RefCell::new(status),
            status_gates: RefCell::new(VecDeque::new()),
            proxies: RefCell::new(proxies),
            action_gates: RefCell::new(VecDeque::new()),
            action_error: RefCell::new(None),
        })
    }

    fn gate_status(&self) -> oneshot::Sender<RemoteResult<SchedulerStatusResponse>> {
        let (tx, rx) = oneshot::channel();
        self.status_gates.borrow_mut().push_back(rx);
        tx
    }

    fn gate_action(&self) -> oneshot::Sender<RemoteResult<ActionAck>> {
        let (tx, rx) = oneshot::channel();
        self.action_gates.borrow_mut().push_back(rx);
        tx
    }

    async fn action(&self) -> RemoteResult<ActionAck> {
        let gate = self.action_gates.borrow_mut().pop_front();
        if let Some(gate) = gate {
            return gate
                .await
                .unwrap_or_else(|_| Err(RemoteError::transport("gate dropped")));
        }
        match self.action_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(ActionAck {
                message: Some("ok".into()),
            }),
        }
    }
}

#[async_trait(?Send)]
impl SchedulerGateway for ChannelGateway {
    async fn get_status(&self) -> RemoteResult<SchedulerStatusResponse> {
        let gate = self.status_gates.borrow_mut().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(RemoteError::transport("gate dropped"))),
            None => Ok(self.status.borrow().clone()),
        }
    }

    async fn get_proxies(&self) -> RemoteResult<Vec<ProxyItemResponse>> {
        Ok(self.proxies.borrow().clone())
    }

    async fn start(&self) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn stop(&self) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn pause(&self) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn resume(&self) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn refresh(&self) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn set_interval(&self, _interval_seconds: u32) -> RemoteResult<ActionAck> {
        self.action().await
    }

    async fn set_threads(&self, _validation_threads: u32) -> RemoteResult<ActionAck> {
        self.action().await
    }
}

#[derive(Default)]
struct Alerts(RefCell<Vec<String>>);

impl Notifier for Alerts {
    fn action_failed(&self, failure: &ActionFailure) {
        self.0.borrow_mut().push(failure.to_string());
    }
}

fn status(kind: SchedulerStatusKind, validating: bool) -> SchedulerStatusResponse {
    SchedulerStatusResponse {
        status: kind,
        validation_in_progress: validating,
        interval_seconds: 900,
        validation_threads: 50,
        test_url: "http://httpbin.org/ip".into(),
        last_run_time: Some("2025-01-01T00:00:00".into()),
        next_run_time: None,
        current_proxy_count: 2,
        valid_proxy_count: 2,
    }
}

fn item(ip: &str, country: &str, response_time: Option<f64>, valid: bool) -> ProxyItemResponse {
    ProxyItemResponse {
        ip: ip.into(),
        port: 8080,
        protocol: "http".into(),
        country: Some(country.into()),
        anonymity: Some("elite".into()),
        source: Some("fixture".into()),
        last_checked: None,
        response_time,
        is_valid: valid,
    }
}

fn session(gateway: &Rc<ChannelGateway>) -> (DashboardSession, Rc<Alerts>) {
    let alerts = Rc::new(Alerts::default());
    let session = DashboardSession::new(
        Rc::clone(gateway) as Rc<dyn SchedulerGateway>,
        SettingsStore::load(Box::new(MemoryStore::default())),
        Rc::clone(&alerts) as Rc<dyn Notifier>,
    );
    (session, alerts)
}

#[tokio::test]
async fn blocked_country_is_hidden_and_counts_follow() {
    let gateway = ChannelGateway::new(
        status(SchedulerStatusKind::Running, false),
        vec![
            item("10.0.0.1", "us", Some(40.0), true),
            item("10.0.0.2", "DE", Some(12.5), true),
        ],
    );
    let (session, _) = session(&gateway);
    session.add_blocked("US").expect("block US");
    session.poller().mount().await;

    let view = session.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].country, "DE");
    assert_eq!(view.rows[0].response_time, "12.50 ms");
    assert_eq!(view.counts.all, 1);
    assert_eq!(view.counts.valid, 1);
    assert_eq!(view.raw_count, 2);
}

#[tokio::test]
async fn filters_and_sort_shape_the_rows() {
    let gateway = ChannelGateway::new(
        status(SchedulerStatusKind::Running, false),
        vec![
            item("10.0.0.1", "FR", None, true),
            item("10.0.0.2", "DE", Some(80.0), true),
            item("10.0.0.3", "NL", Some(20.0), false),
            item("10.0.0.4", "IT", Some(5.0), true),
        ],
    );
    let (session, _) = session(&gateway);
    session.poller().mount().await;

    session.cycle_sort();
    let proxies: Vec<String> = session.view().rows.into_iter().map(|row| row.proxy).collect();
    assert_eq!(
        proxies,
        [
            "http://10.0.0.4:8080",
            "http://10.0.0.3:8080",
            "http://10.0.0.2:8080",
            "http://10.0.0.1:8080"
        ]
    );

    session.set_filter(ProxyFilter::Invalid);
    let view = session.view();
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.counts.all, 4);
    assert_eq!(view.counts.invalid, 1);

    session.add_blocked("nl").expect("block NL");
    let view = session.view();
    assert!(view.shows_no_match());
    assert!(!view.sort_enabled());
    assert_eq!(view.filter_sort.sort, SortOrder::ResponseTimeAsc);
}

#[tokio::test]
async fn failing_start_keeps_status_and_clears_busy_flag() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Stopped, false), Vec::new());
    let (session, alerts) = session(&gateway);
    session.poller().mount().await;
    *gateway.action_error.borrow_mut() = Some(RemoteError::http(500, "boom"));
    let before = session.view();

    let outcome = session
        .dispatcher()
        .dispatch(SchedulerAction::Start)
        .await
        .expect("start is always valid");
    assert!(matches!(outcome, DispatchOutcome::Failed(_)));

    let after = session.view();
    assert_eq!(after.status, before.status);
    assert!(after.controls.start.enabled);
    assert_eq!(after.controls.start.label, "Start Process");
    assert_eq!(
        alerts.0.borrow().as_slice(),
        ["Error during Start Process: 500 - boom"]
    );
}

#[tokio::test]
async fn placeholder_states_follow_the_status() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Running, true), Vec::new());
    let (session, _) = session(&gateway);
    assert_eq!(session.view().table, TableState::Loading);

    session.poller().mount().await;
    let view = session.view();
    assert_eq!(view.table, TableState::EmptyFirstValidation);
    assert!(
        view.table
            .message()
            .is_some_and(|message| message.contains("first time"))
    );

    *gateway.status.borrow_mut() = status(SchedulerStatusKind::Stopped, false);
    session.poller().tick().await;
    assert_eq!(session.view().table, TableState::EmptyStopped);
}

#[tokio::test]
async fn late_response_from_an_older_fetch_is_discarded() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Running, false), Vec::new());
    let (session, _) = session(&gateway);
    session.poller().mount().await;

    let release_old = gateway.gate_status();
    *gateway.status.borrow_mut() = status(SchedulerStatusKind::Validating, true);
    let poller = session.poller();
    let dispatcher = session.dispatcher();

    let (tick, refresh) = tokio::join!(poller.tick(), async {
        let outcome = dispatcher.dispatch(SchedulerAction::Refresh).await;
        release_old
            .send(Ok(status(SchedulerStatusKind::Stopped, false)))
            .expect("tick still waiting");
        outcome
    });

    assert!(matches!(refresh, Ok(DispatchOutcome::Completed(_))));
    assert_eq!(tick.status, FetchOutcome::Stale);
    let current = session.status().expect("status loaded");
    assert_eq!(current.state, SchedulerState::Validating);
    assert!(current.validation_in_progress);
}

#[tokio::test]
async fn second_dispatch_while_in_flight_is_ignored() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Stopped, false), Vec::new());
    let (session, _) = session(&gateway);
    session.poller().mount().await;
    let release = gateway.gate_action();
    let dispatcher = session.dispatcher();

    let (first, second) = tokio::join!(dispatcher.dispatch(SchedulerAction::Start), async {
        let view = session.view();
        assert!(!view.controls.start.enabled);
        assert_eq!(view.controls.start.label, "Starting...");
        let second = dispatcher.dispatch(SchedulerAction::Start).await;
        release
            .send(Ok(ActionAck::default()))
            .expect("first dispatch still waiting");
        second
    });

    assert!(matches!(first, Ok(DispatchOutcome::Completed(_))));
    assert_eq!(second, Ok(DispatchOutcome::Ignored));
    assert_eq!(session.view().controls.start.label, "Start Process");
}

#[tokio::test]
async fn teardown_drops_in_flight_results() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Running, false), Vec::new());
    let (session, _) = session(&gateway);
    let release = gateway.gate_status();
    let poller = session.poller();

    let (report, ()) = tokio::join!(poller.refresh_status(), async {
        session.teardown();
        release
            .send(Ok(status(SchedulerStatusKind::Running, false)))
            .expect("fetch still waiting");
    });

    assert_eq!(report, FetchOutcome::Unmounted);
    assert!(session.status().is_none());
}

#[tokio::test]
async fn failed_thread_change_keeps_a_value_polled_mid_flight() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Running, false), Vec::new());
    let backend = Rc::new(MemoryStore::default());
    let alerts = Rc::new(Alerts::default());
    let session = DashboardSession::new(
        Rc::clone(&gateway) as Rc<dyn SchedulerGateway>,
        SettingsStore::load(Box::new(Rc::clone(&backend))),
        Rc::clone(&alerts) as Rc<dyn Notifier>,
    );
    session.poller().mount().await;
    assert_eq!(session.threads().get(), 50);

    let release = gateway.gate_action();
    gateway.status.borrow_mut().validation_threads = 75;
    let poller = session.poller();
    let dispatcher = session.dispatcher();

    let (outcome, ()) = tokio::join!(dispatcher.dispatch(SchedulerAction::SetThreads(100)), async {
        assert_eq!(session.threads().get(), 100);
        poller.tick().await;
        assert_eq!(session.threads().get(), 75);
        release
            .send(Err(RemoteError::http(500, "boom")))
            .expect("thread change still waiting");
    });

    assert!(matches!(outcome, Ok(DispatchOutcome::Failed(_))));
    assert_eq!(session.threads().get(), 75);
    assert_eq!(backend.load(THREADS_KEY).as_deref(), Some("75"));
    assert_eq!(alerts.0.borrow().len(), 1);
}

#[tokio::test]
async fn failed_interval_change_restores_the_previous_value() {
    let gateway = ChannelGateway::new(status(SchedulerStatusKind::Running, false), Vec::new());
    let (session, _) = session(&gateway);
    session.poller().mount().await;
    *gateway.action_error.borrow_mut() = Some(RemoteError::transport("offline"));

    let outcome = session
        .dispatcher()
        .dispatch(SchedulerAction::SetInterval(3600))
        .await;

    assert!(matches!(outcome, Ok(DispatchOutcome::Failed(_))));
    assert_eq!(session.selected_interval(), 900);
}
