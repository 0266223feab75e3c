//! Transport-agnostic access to the scheduler API.

use async_trait::async_trait;
use proxyscope_api_models::{ActionAck, ProxyItemResponse, SchedulerStatusResponse};

use crate::error::RemoteResult;

/// Typed calls against the scheduler API.
///
/// Futures are not required to be `Send`: the browser implementation runs on
/// the single-threaded wasm executor. Every non-2xx status, transport failure
/// and undecodable body surfaces as a [`crate::error::RemoteError`].
#[async_trait(?Send)]
pub trait SchedulerGateway {
    /// `GET /scheduler/status`.
    async fn get_status(&self) -> RemoteResult<SchedulerStatusResponse>;
    /// `GET /proxies?only_valid=false`.
    async fn get_proxies(&self) -> RemoteResult<Vec<ProxyItemResponse>>;
    /// `POST /scheduler/start`.
    async fn start(&self) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/stop`.
    async fn stop(&self) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/pause`.
    async fn pause(&self) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/resume`.
    async fn resume(&self) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/refresh`.
    async fn refresh(&self) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/interval`.
    async fn set_interval(&self, interval_seconds: u32) -> RemoteResult<ActionAck>;
    /// `POST /scheduler/threads`.
    async fn set_threads(&self, validation_threads: u32) -> RemoteResult<ActionAck>;
}
