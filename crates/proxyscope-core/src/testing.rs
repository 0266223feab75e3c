//! Scripted gateway and helpers for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use proxyscope_api_models::{
    ActionAck, ProxyItemResponse, SchedulerStatusKind, SchedulerStatusResponse,
};

use crate::dispatch::ActionFailure;
use crate::error::{RemoteError, RemoteResult};
use crate::gateway::SchedulerGateway;
use crate::session::{DashboardSession, Notifier, QuietNotifier};
use crate::settings::{MemoryStore, SettingsStore};

pub(crate) fn status(kind: SchedulerStatusKind, validating: bool) -> SchedulerStatusResponse {
    SchedulerStatusResponse {
        status: kind,
        validation_in_progress: validating,
        interval_seconds: 900,
        validation_threads: 50,
        test_url: "http://httpbin.org/ip".into(),
        last_run_time: None,
        next_run_time: None,
        current_proxy_count: 0,
        valid_proxy_count: 0,
    }
}

pub(crate) fn item(ip: &str, country: Option<&str>, valid: bool) -> ProxyItemResponse {
    ProxyItemResponse {
        ip: ip.into(),
        port: 3128,
        protocol: "http".into(),
        country: country.map(str::to_string),
        anonymity: None,
        source: None,
        last_checked: None,
        response_time: None,
        is_valid: valid,
    }
}

/// Answers every call from the currently scripted result and records the
/// call name.
pub(crate) struct FakeGateway {
    status: RefCell<RemoteResult<SchedulerStatusResponse>>,
    proxies: RefCell<RemoteResult<Vec<ProxyItemResponse>>>,
    action_error: RefCell<Option<RemoteError>>,
    calls: RefCell<Vec<String>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            status: RefCell::new(Ok(status(SchedulerStatusKind::Stopped, false))),
            proxies: RefCell::new(Ok(Vec::new())),
            action_error: RefCell::new(None),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeGateway {
    pub(crate) fn set_status(&self, response: SchedulerStatusResponse) {
        *self.status.borrow_mut() = Ok(response);
    }

    pub(crate) fn fail_status(&self, error: RemoteError) {
        *self.status.borrow_mut() = Err(error);
    }

    pub(crate) fn set_proxies(&self, items: Vec<ProxyItemResponse>) {
        *self.proxies.borrow_mut() = Ok(items);
    }

    pub(crate) fn fail_actions(&self, error: RemoteError) {
        *self.action_error.borrow_mut() = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    fn action(&self, call: impl Into<String>) -> RemoteResult<ActionAck> {
        self.record(call);
        match self.action_error.borrow().clone() {
            Some(error) => Err(error),
            None => Ok(ActionAck::default()),
        }
    }
}

#[async_trait(?Send)]
impl SchedulerGateway for FakeGateway {
    async fn get_status(&self) -> RemoteResult<SchedulerStatusResponse> {
        self.record("get_status");
        self.status.borrow().clone()
    }

    async fn get_proxies(&self) -> RemoteResult<Vec<ProxyItemResponse>> {
        self.record("get_proxies");
        self.proxies.borrow().clone()
    }

    async fn start(&self) -> RemoteResult<ActionAck> {
        self.action("start")
    }

    async fn stop(&self) -> RemoteResult<ActionAck> {
        self.action("stop")
    }

    async fn pause(&self) -> RemoteResult<ActionAck> {
        self.action("pause")
    }

    async fn resume(&self) -> RemoteResult<ActionAck> {
        self.action("resume")
    }

    async fn refresh(&self) -> RemoteResult<ActionAck> {
        self.action("refresh")
    }

    async fn set_interval(&self, interval_seconds: u32) -> RemoteResult<ActionAck> {
        self.action(format!("set_interval:{interval_seconds}"))
    }

    async fn set_threads(&self, validation_threads: u32) -> RemoteResult<ActionAck> {
        self.action(format!("set_threads:{validation_threads}"))
    }
}

/// Collects rendered failure messages.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    messages: RefCell<Vec<String>>,
}

impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn action_failed(&self, failure: &ActionFailure) {
        self.messages.borrow_mut().push(failure.to_string());
    }
}

pub(crate) fn session_over(gateway: &Rc<FakeGateway>) -> DashboardSession {
    DashboardSession::new(
        Rc::clone(gateway) as Rc<dyn SchedulerGateway>,
        SettingsStore::load(Box::new(MemoryStore::default())),
        Rc::new(QuietNotifier),
    )
}

pub(crate) fn session_with(
    gateway: &Rc<FakeGateway>,
) -> (DashboardSession, Rc<RecordingNotifier>, Rc<MemoryStore>) {
    let notifier = Rc::new(RecordingNotifier::default());
    let backend = Rc::new(MemoryStore::default());
    let session = DashboardSession::new(
        Rc::clone(gateway) as Rc<dyn SchedulerGateway>,
        SettingsStore::load(Box::new(Rc::clone(&backend))),
        Rc::clone(&notifier) as Rc<dyn Notifier>,
    );
    (session, notifier, backend)
}
