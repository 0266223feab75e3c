//! Domain snapshots produced from the scheduler API payloads.

use proxyscope_api_models::{ProxyItemResponse, SchedulerStatusKind, SchedulerStatusResponse};
use serde::Serialize;

/// Lifecycle state of the remote scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// Idle until started.
    Stopped,
    /// Running validation cycles on its interval.
    Running,
    /// Paused between cycles.
    Paused,
    /// A validation cycle is executing.
    Validating,
    /// A label this client does not recognise.
    Unknown,
}

impl SchedulerState {
    /// Whether the proxy list is expected to change between polls.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::Validating)
    }

    /// Lowercase label used for styling hooks.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Validating => "validating",
            Self::Unknown => "unknown",
        }
    }

    /// Uppercase label used in the status panel.
    #[must_use]
    pub fn display_label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl From<SchedulerStatusKind> for SchedulerState {
    fn from(value: SchedulerStatusKind) -> Self {
        match value {
            SchedulerStatusKind::Stopped => Self::Stopped,
            SchedulerStatusKind::Running => Self::Running,
            SchedulerStatusKind::Paused => Self::Paused,
            SchedulerStatusKind::Validating => Self::Validating,
            SchedulerStatusKind::Unknown => Self::Unknown,
        }
    }
}

/// One proxy as last reported by the scheduler.
///
/// Records carry no identity across polls; [`ProxyRecord::key`] is only used
/// for keyed list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyRecord {
    /// Protocol label.
    pub protocol: String,
    /// Host address.
    pub address: String,
    /// Port.
    pub port: u16,
    /// Country as reported, any casing.
    pub country: Option<String>,
    /// Anonymity level.
    pub anonymity: Option<String>,
    /// Provider label.
    pub source: Option<String>,
    /// ISO-8601 timestamp of the last check.
    pub last_checked: Option<String>,
    /// Response time in milliseconds; `None` means not measured.
    pub response_time_ms: Option<f64>,
    /// Outcome of the last validation.
    pub is_valid: bool,
}

impl ProxyRecord {
    /// Deterministic key built from protocol, address and port.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.protocol, self.address, self.port)
    }

    /// `protocol://address:port`.
    #[must_use]
    pub fn proxy_string(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.address, self.port)
    }

    /// Uppercase country used for blocklist comparison. Blank countries count
    /// as absent.
    #[must_use]
    pub fn country_key(&self) -> Option<String> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_uppercase)
    }
}

impl From<ProxyItemResponse> for ProxyRecord {
    fn from(value: ProxyItemResponse) -> Self {
        Self {
            protocol: value.protocol,
            address: value.ip,
            port: value.port,
            country: value.country,
            anonymity: value.anonymity,
            source: value.source,
            last_checked: value.last_checked,
            response_time_ms: value.response_time,
            is_valid: value.is_valid,
        }
    }
}

/// Scheduler health as last reported.
///
/// `state` and `validation_in_progress` may disagree between cycles; consumers
/// must accept every combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerSnapshot {
    /// Lifecycle state.
    pub state: SchedulerState,
    /// Whether a validation pass is executing.
    pub validation_in_progress: bool,
    /// Seconds between runs; `0` when the server did not report one.
    pub interval_seconds: u32,
    /// Validation worker count; `0` when the server did not report one.
    pub validation_threads: u32,
    /// URL proxies are tested against.
    pub test_url: String,
    /// ISO-8601 timestamp of the previous run.
    pub last_run: Option<String>,
    /// ISO-8601 timestamp of the next run.
    pub next_run: Option<String>,
    /// Proxies tracked by the server.
    pub current_proxy_count: u64,
    /// Tracked proxies that passed validation.
    pub valid_proxy_count: u64,
}

impl From<SchedulerStatusResponse> for SchedulerSnapshot {
    fn from(value: SchedulerStatusResponse) -> Self {
        Self {
            state: value.status.into(),
            validation_in_progress: value.validation_in_progress,
            interval_seconds: value.interval_seconds,
            validation_threads: value.validation_threads,
            test_url: value.test_url,
            last_run: value.last_run_time,
            next_run: value.next_run_time,
            current_proxy_count: value.current_proxy_count,
            valid_proxy_count: value.valid_proxy_count,
        }
    }
}
