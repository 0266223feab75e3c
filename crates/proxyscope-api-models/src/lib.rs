#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
//! Shared HTTP DTOs for the proxy scheduler API.
//!
//! These types are used by both the browser gateway and the CLI gateway so the
//! request/response contract is encoded exactly once. Domain conversions live
//! in `proxyscope-core`; this crate only knows the wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET` scheduler status.
pub const STATUS_PATH: &str = "/scheduler/status";
/// `GET` the full proxy list, valid and invalid.
pub const PROXIES_PATH: &str = "/proxies?only_valid=false";
/// `POST` start the scheduler.
pub const START_PATH: &str = "/scheduler/start";
/// `POST` stop the scheduler.
pub const STOP_PATH: &str = "/scheduler/stop";
/// `POST` pause a running scheduler.
pub const PAUSE_PATH: &str = "/scheduler/pause";
/// `POST` resume a paused scheduler.
pub const RESUME_PATH: &str = "/scheduler/resume";
/// `POST` trigger an immediate validation run.
pub const REFRESH_PATH: &str = "/scheduler/refresh";
/// `POST` change the run interval.
pub const INTERVAL_PATH: &str = "/scheduler/interval";
/// `POST` change the validation worker count.
pub const THREADS_PATH: &str = "/scheduler/threads";

/// Lifecycle label reported by the scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatusKind {
    /// Scheduler is idle and will not run until started.
    #[default]
    Stopped,
    /// Scheduler runs validation cycles on its interval.
    Running,
    /// Scheduler is paused between cycles.
    Paused,
    /// A validation cycle is executing right now.
    Validating,
    /// Any label this client does not know about.
    #[serde(other)]
    Unknown,
}

impl SchedulerStatusKind {
    /// Lowercase wire label.
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
}

/// Response body of [`STATUS_PATH`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchedulerStatusResponse {
    /// Lifecycle label.
    pub status: SchedulerStatusKind,
    /// Whether a validation pass is executing.
    #[serde(default)]
    pub validation_in_progress: bool,
    /// Seconds between scheduled runs.
    #[serde(default)]
    pub interval_seconds: u32,
    /// Worker count used for validation.
    #[serde(default)]
    pub validation_threads: u32,
    /// URL each proxy is tested against.
    #[serde(default)]
    pub test_url: String,
    /// ISO-8601 timestamp of the previous run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_time: Option<String>,
    /// ISO-8601 timestamp of the next scheduled run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run_time: Option<String>,
    /// Number of proxies currently tracked by the server.
    #[serde(default)]
    pub current_proxy_count: u64,
    /// Number of tracked proxies that passed validation.
    #[serde(default)]
    pub valid_proxy_count: u64,
}

/// One element of the [`PROXIES_PATH`] response array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyItemResponse {
    /// Proxy host address.
    pub ip: String,
    /// Proxy port.
    pub port: u16,
    /// Protocol label (`http`, `socks5`, ...).
    pub protocol: String,
    /// Country code or name, any casing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Anonymity level label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymity: Option<String>,
    /// Provider the proxy was scraped from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// ISO-8601 timestamp of the last check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<String>,
    /// Measured response time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    /// Outcome of the last validation.
    #[serde(default)]
    pub is_valid: bool,
}

/// Body of [`INTERVAL_PATH`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetIntervalRequest {
    /// New interval in seconds.
    pub interval_seconds: u32,
}

/// Body of [`THREADS_PATH`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetThreadsRequest {
    /// New validation worker count.
    pub validation_threads: u32,
}

/// Acknowledgement returned by every mutating endpoint.
///
/// The server attaches a status dump under varying keys; only the message is
/// part of the contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ActionAck {
    /// Human-readable result message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error document returned on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ErrorBody {
    /// Either a message string or a structured list of validation failures.
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    /// Render `detail` as text; structured values are emitted as compact JSON.
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(text.trim().to_string()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_accepts_sparse_payloads_and_unknown_labels() {
        let parsed: SchedulerStatusResponse =
            serde_json::from_value(json!({"status": "warming_up"})).unwrap();
        assert_eq!(parsed.status, SchedulerStatusKind::Unknown);
        assert!(!parsed.validation_in_progress);
        assert_eq!(parsed.interval_seconds, 0);
        assert!(parsed.last_run_time.is_none());
    }

    #[test]
    fn status_parses_full_payload() {
        let parsed: SchedulerStatusResponse = serde_json::from_value(json!({
            "status": "validating",
            "validation_in_progress": true,
            "interval_seconds": 900,
            "validation_threads": 75,
            "test_url": "http://httpbin.org/ip",
            "last_run_time": null,
            "next_run_time": "2025-01-01T00:15:00",
            "current_proxy_count": 120,
            "valid_proxy_count": 14
        }))
        .unwrap();
        assert_eq!(parsed.status, SchedulerStatusKind::Validating);
        assert_eq!(parsed.validation_threads, 75);
        assert_eq!(parsed.next_run_time.as_deref(), Some("2025-01-01T00:15:00"));
        assert_eq!(parsed.valid_proxy_count, 14);
    }

    #[test]
    fn proxy_item_tolerates_null_optionals() {
        let parsed: ProxyItemResponse = serde_json::from_value(json!({
            "ip": "10.0.0.1",
            "port": 8080,
            "protocol": "http",
            "country": null,
            "response_time": null,
            "is_valid": true
        }))
        .unwrap();
        assert!(parsed.country.is_none());
        assert!(parsed.response_time.is_none());
        assert!(parsed.is_valid);
    }

    #[test]
    fn request_bodies_use_backend_field_names() {
        let interval = serde_json::to_value(SetIntervalRequest {
            interval_seconds: 600,
        })
        .unwrap();
        assert_eq!(interval, json!({"interval_seconds": 600}));
        let threads = serde_json::to_value(SetThreadsRequest {
            validation_threads: 20,
        })
        .unwrap();
        assert_eq!(threads, json!({"validation_threads": 20}));
    }

    #[test]
    fn error_body_renders_string_and_structured_details() {
        let text: ErrorBody = serde_json::from_value(json!({"detail": " boom "})).unwrap();
        assert_eq!(text.detail_text().as_deref(), Some("boom"));

        let structured: ErrorBody =
            serde_json::from_value(json!({"detail": [{"loc": ["interval_seconds"]}]})).unwrap();
        assert_eq!(
            structured.detail_text().as_deref(),
            Some(r#"[{"loc":["interval_seconds"]}]"#)
        );

        let empty: ErrorBody = serde_json::from_value(json!({})).unwrap();
        assert!(empty.detail_text().is_none());
    }

    #[test]
    fn ack_ignores_extra_status_dump() {
        let ack: ActionAck = serde_json::from_value(json!({
            "message": "Scheduler start initiated.",
            "status": {"status": "running"}
        }))
        .unwrap();
        assert_eq!(ack.message.as_deref(), Some("Scheduler start initiated."));
    }
}
