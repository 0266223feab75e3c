//! Shared HTTP client, error types and the reqwest-backed scheduler gateway.

use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use proxyscope_api_models::{
    ActionAck, INTERVAL_PATH, PAUSE_PATH, PROXIES_PATH, ProxyItemResponse, REFRESH_PATH,
    RESUME_PATH, START_PATH, STATUS_PATH, STOP_PATH, SchedulerStatusResponse, SetIntervalRequest,
    SetThreadsRequest, THREADS_PATH,
};
use proxyscope_core::{
    ActionFailure, BlockListError, DashboardSession, DispatchError, FetchOutcome, Notifier,
    RemoteError, RemoteResult, Resource, SchedulerGateway, SettingsStore,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cli::Cli;
use crate::store::JsonFileStore;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<DispatchError> for CliError {
    fn from(error: DispatchError) -> Self {
        Self::validation(error.to_string())
    }
}

impl From<BlockListError> for CliError {
    fn from(error: BlockListError) -> Self {
        Self::validation(error.to_string())
    }
}

impl From<ActionFailure> for CliError {
    fn from(failure: ActionFailure) -> Self {
        Self::failure(anyhow!(failure.to_string()))
    }
}

/// Dependencies constructed from environment flags and CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
}

impl CliDependencies {
    /// Construct a configured HTTP client tagged with the invocation's trace id.
    pub(crate) fn from_env(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) state_file: PathBuf,
}

impl AppContext {
    /// Gateway against the configured API.
    pub(crate) fn gateway(&self) -> ReqwestGateway {
        ReqwestGateway::new(self.client.clone(), self.base_url.clone())
    }

    /// Fresh session backed by the state file.
    pub(crate) fn session(&self) -> CliSession {
        let errors = Rc::new(PollErrors::default());
        let settings = SettingsStore::load(Box::new(JsonFileStore::new(self.state_file.clone())));
        let session = DashboardSession::new(
            Rc::new(self.gateway()) as Rc<dyn SchedulerGateway>,
            settings,
            Rc::clone(&errors) as Rc<dyn Notifier>,
        );
        CliSession { session, errors }
    }
}

/// Session plus the last background failure, so one-shot commands can turn a
/// failed load into an exit code.
pub(crate) struct CliSession {
    pub(crate) session: DashboardSession,
    errors: Rc<PollErrors>,
}

impl CliSession {
    /// Initial load; fails when the status could not be fetched.
    pub(crate) async fn load(&self) -> CliResult<()> {
        let report = self.session.poller().mount().await;
        if report.status == FetchOutcome::Failed {
            let detail = self
                .errors
                .take(Resource::Status)
                .map_or_else(|| "unknown error".to_string(), |err| err.to_string());
            return Err(CliError::failure(anyhow!(
                "failed to fetch scheduler status: {detail}"
            )));
        }
        if report.proxies == Some(FetchOutcome::Failed)
            && let Some(err) = self.errors.take(Resource::Proxies)
        {
            return Err(CliError::failure(anyhow!("failed to fetch proxies: {err}")));
        }
        Ok(())
    }
}

#[derive(Default)]
struct PollErrors {
    status: RefCell<Option<RemoteError>>,
    proxies: RefCell<Option<RemoteError>>,
}

impl PollErrors {
    fn slot(&self, resource: Resource) -> &RefCell<Option<RemoteError>> {
        match resource {
            Resource::Status => &self.status,
            Resource::Proxies => &self.proxies,
        }
    }

    fn take(&self, resource: Resource) -> Option<RemoteError> {
        self.slot(resource).borrow_mut().take()
    }
}

impl Notifier for PollErrors {
    fn poll_failed(&self, resource: Resource, error: &RemoteError) {
        *self.slot(resource).borrow_mut() = Some(error.clone());
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// [`SchedulerGateway`] over reqwest.
#[derive(Clone)]
pub(crate) struct ReqwestGateway {
    client: Client,
    base_url: Url,
}

impl ReqwestGateway {
    pub(crate) const fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    fn endpoint(&self, path: &str) -> RemoteResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| RemoteError::transport(format!("invalid URL for {path}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(|err| RemoteError::transport(format!("request to {path} failed: {err}")))?;
        let (status, body) = read_success(response).await?;
        serde_json::from_str(&body).map_err(|err| RemoteError::decode(status, err))
    }

    async fn post_action<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> RemoteResult<ActionAck> {
        let mut request = self.client.post(self.endpoint(path)?);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|err| RemoteError::transport(format!("request to {path} failed: {err}")))?;
        let (status, body) = read_success(response).await?;
        if body.trim().is_empty() {
            return Ok(ActionAck::default());
        }
        serde_json::from_str(&body).map_err(|err| RemoteError::decode(status, err))
    }
}

async fn read_success(response: Response) -> RemoteResult<(u16, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| RemoteError::transport(format!("failed to read response body: {err}")))?;
    if status.is_success() {
        Ok((status.as_u16(), body))
    } else {
        Err(RemoteError::http(status.as_u16(), &body))
    }
}

#[async_trait(?Send)]
impl SchedulerGateway for ReqwestGateway {
    async fn get_status(&self) -> RemoteResult<SchedulerStatusResponse> {
        self.get_json(STATUS_PATH).await
    }

    async fn get_proxies(&self) -> RemoteResult<Vec<ProxyItemResponse>> {
        self.get_json(PROXIES_PATH).await
    }

    async fn start(&self) -> RemoteResult<ActionAck> {
        self.post_action::<()>(START_PATH, None).await
    }

    async fn stop(&self) -> RemoteResult<ActionAck> {
        self.post_action::<()>(STOP_PATH, None).await
    }

    async fn pause(&self) -> RemoteResult<ActionAck> {
        self.post_action::<()>(PAUSE_PATH, None).await
    }

    async fn resume(&self) -> RemoteResult<ActionAck> {
        self.post_action::<()>(RESUME_PATH, None).await
    }

    async fn refresh(&self) -> RemoteResult<ActionAck> {
        self.post_action::<()>(REFRESH_PATH, None).await
    }

    async fn set_interval(&self, interval_seconds: u32) -> RemoteResult<ActionAck> {
        self.post_action(INTERVAL_PATH, Some(&SetIntervalRequest { interval_seconds }))
            .await
    }

    async fn set_threads(&self, validation_threads: u32) -> RemoteResult<ActionAck> {
        self.post_action(THREADS_PATH, Some(&SetThreadsRequest { validation_threads }))
            .await
    }
}
