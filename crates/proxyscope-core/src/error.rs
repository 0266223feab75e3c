//! Error types for remote scheduler calls.

use proxyscope_api_models::ErrorBody;
use thiserror::Error;

/// Uniform failure for every gateway operation.
///
/// Transport failures carry no status; HTTP failures and undecodable bodies
/// keep the status so callers can tell "server said no" from "server
/// unreachable" when they care to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{detail}", status_prefix(.status))]
pub struct RemoteError {
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Human-readable failure detail.
    pub detail: String,
}

#[allow(clippy::ref_option)]
fn status_prefix(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |status| format!("{status} - "))
}

impl RemoteError {
    /// Network-level failure (connection refused, DNS, timeout, CORS).
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            detail: detail.into(),
        }
    }

    /// Non-2xx response. The body is mined for a `detail` field, then used as
    /// plain text, then replaced by a generic status line.
    #[must_use]
    pub fn http(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail_text())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("HTTP error status {status}"));
        Self {
            status: Some(status),
            detail,
        }
    }

    /// Successful status with a body that did not decode.
    pub fn decode(status: u16, detail: impl std::fmt::Display) -> Self {
        Self {
            status: Some(status),
            detail: format!("invalid response body: {detail}"),
        }
    }
}

/// Convenience alias for gateway results.
pub type RemoteResult<T> = Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_json_detail() {
        let err = RemoteError::http(422, r#"{"detail": "interval must be positive"}"#);
        assert_eq!(err.status, Some(422));
        assert_eq!(err.detail, "interval must be positive");
        assert_eq!(err.to_string(), "422 - interval must be positive");
    }

    #[test]
    fn http_error_falls_back_to_text_then_status_line() {
        let text = RemoteError::http(502, "  Bad Gateway\n");
        assert_eq!(text.detail, "Bad Gateway");

        let empty = RemoteError::http(500, "");
        assert_eq!(empty.detail, "HTTP error status 500");

        let json_without_detail = RemoteError::http(404, r#"{"error": "nope"}"#);
        assert_eq!(json_without_detail.detail, r#"{"error": "nope"}"#);
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = RemoteError::transport("connection refused");
        assert!(err.status.is_none());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn decode_error_keeps_status() {
        let err = RemoteError::decode(200, "expected value at line 1");
        assert_eq!(err.status, Some(200));
        assert!(err.detail.starts_with("invalid response body"));
        assert_eq!(
            err.to_string(),
            "200 - invalid response body: expected value at line 1"
        );
    }
}
