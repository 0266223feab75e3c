//! gloo-net backed [`SchedulerGateway`].

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use proxyscope_api_models::{
    ActionAck, INTERVAL_PATH, PAUSE_PATH, PROXIES_PATH, ProxyItemResponse, REFRESH_PATH,
    RESUME_PATH, START_PATH, STATUS_PATH, STOP_PATH, SchedulerStatusResponse, SetIntervalRequest,
    SetThreadsRequest, THREADS_PATH,
};
use proxyscope_core::{RemoteError, RemoteResult, SchedulerGateway};
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Clone, Debug)]
pub(crate) struct HttpGateway {
    base_url: String,
}

impl HttpGateway {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let response = Request::get(&self.url(path))
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
        let request = Request::post(&self.url(path));
        let request = match body {
            Some(body) => request.json(body).map_err(|err| {
                RemoteError::transport(format!("failed to encode request for {path}: {err}"))
            })?,
            None => request,
        };
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
    if response.ok() {
        Ok((status, body))
    } else {
        Err(RemoteError::http(status, &body))
    }
}

#[async_trait(?Send)]
impl SchedulerGateway for HttpGateway {
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
