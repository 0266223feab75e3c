//! Presentation mapping shared by the browser dashboard and the CLI.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::model::{ProxyRecord, SchedulerSnapshot, SchedulerState};
use crate::state::{ActionKind, PendingActionSet};

/// Placeholder for absent values.
pub const NOT_AVAILABLE: &str = "N/A";
/// Rendered for timestamps that do not parse.
pub const INVALID_DATE: &str = "Invalid Date";
/// Shown in place of the scheduler panel until the first status arrives.
pub const SCHEDULER_LOADING_MESSAGE: &str = "Loading scheduler info...";

/// One table row, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRow {
    /// Stable key for keyed list rendering.
    pub key: String,
    /// `protocol://address:port`.
    pub proxy: String,
    /// Validity flag.
    pub is_valid: bool,
    /// `Valid` or `Invalid`.
    pub status: &'static str,
    /// Anonymity level or `N/A`.
    pub anonymity: String,
    /// Country or `N/A`.
    pub country: String,
    /// `"{ms:.2} ms"` or `N/A`.
    pub response_time: String,
    /// Formatted last check or `N/A`.
    pub last_checked: String,
    /// Provider or `N/A`.
    pub source: String,
}

impl From<&ProxyRecord> for ProxyRow {
    fn from(record: &ProxyRecord) -> Self {
        Self {
            key: record.key(),
            proxy: record.proxy_string(),
            is_valid: record.is_valid,
            status: if record.is_valid { "Valid" } else { "Invalid" },
            anonymity: or_not_available(record.anonymity.as_deref()),
            country: or_not_available(record.country.as_deref()),
            response_time: format_response_time(record.response_time_ms),
            last_checked: record
                .last_checked
                .as_deref()
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_timestamp),
            source: or_not_available(record.source.as_deref()),
        }
    }
}

fn or_not_available(value: Option<&str>) -> String {
    value
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

/// Two-decimal milliseconds. Absent and zero both mean "not measured".
#[must_use]
pub fn format_response_time(value: Option<f64>) -> String {
    match value {
        Some(ms) if ms.is_finite() && ms != 0.0 => format!("{ms:.2} ms"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Render an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// Offset-qualified inputs are normalised to UTC and suffixed; naive inputs
/// are shown as sent.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map_or_else(
            || INVALID_DATE.to_string(),
            |parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}

/// Optional timestamp, `N/A` when absent.
#[must_use]
pub fn format_optional_timestamp(raw: Option<&str>) -> String {
    raw.map_or_else(|| NOT_AVAILABLE.to_string(), format_timestamp)
}

/// Which body the proxy table shows.
///
/// Decided on the raw (unfiltered) list; a populated list that filters down to
/// nothing renders [`NO_MATCH_MESSAGE`] inside the table instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableState {
    /// No status yet.
    #[default]
    Loading,
    /// Scheduler idle with nothing to show.
    EmptyStopped,
    /// First validation pass still running.
    EmptyFirstValidation,
    /// Status known, list empty, and no better explanation.
    EmptyNoResults,
    /// At least one record exists.
    Populated,
}

/// Row shown when filters hide every record of a non-empty list.
pub const NO_MATCH_MESSAGE: &str = "No proxies match current filters.";

impl TableState {
    /// Classify from the last status and the raw list length.
    #[must_use]
    pub fn classify(status: Option<&SchedulerSnapshot>, raw_count: usize) -> Self {
        let Some(status) = status else {
            return Self::Loading;
        };
        if raw_count > 0 {
            return Self::Populated;
        }
        if status.validation_in_progress {
            Self::EmptyFirstValidation
        } else if status.state == SchedulerState::Stopped {
            Self::EmptyStopped
        } else {
            Self::EmptyNoResults
        }
    }

    /// Placeholder text, `None` when populated.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::Loading => Some("Loading scheduler status..."),
            Self::EmptyStopped => Some("Scheduler stopped. Start process."),
            Self::EmptyFirstValidation => Some("Scheduler validating for first time..."),
            Self::EmptyNoResults => Some("No proxies found in last run."),
            Self::Populated => None,
        }
    }
}

/// Enabled flag and caption of one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonState {
    /// Whether the control accepts input.
    pub enabled: bool,
    /// Caption, switched to a progress label while busy.
    pub label: &'static str,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            enabled: false,
            label: "",
        }
    }
}

/// Affordances for every scheduler control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ControlState {
    /// Start button.
    pub start: ButtonState,
    /// Stop button.
    pub stop: ButtonState,
    /// Pause button.
    pub pause: ButtonState,
    /// Resume button.
    pub resume: ButtonState,
    /// Manual refresh button.
    pub refresh: ButtonState,
    /// Stop-and-exit button.
    pub stop_and_exit: ButtonState,
    /// Interval select.
    pub interval_enabled: bool,
    /// Thread count select.
    pub threads_enabled: bool,
}

impl ControlState {
    /// Derive affordances from the last status and in-flight actions.
    ///
    /// With no status yet the buttons stay available so a stalled status
    /// endpoint never locks the operator out; the selects wait for a status.
    #[must_use]
    pub fn derive(status: Option<&SchedulerSnapshot>, pending: &PendingActionSet) -> Self {
        let state = status.map(|snapshot| snapshot.state);
        let busy = |kind| pending.is_busy(kind);
        let button = |kind, idle: &'static str, working: &'static str, allowed: bool| ButtonState {
            enabled: allowed && !busy(kind),
            label: if busy(kind) { working } else { idle },
        };
        let stopped = state == Some(SchedulerState::Stopped);

        Self {
            start: button(
                ActionKind::Start,
                "Start Process",
                "Starting...",
                !matches!(state, Some(SchedulerState::Running | SchedulerState::Validating)),
            ),
            stop: button(ActionKind::Stop, "Stop Process", "Stopping...", !stopped),
            pause: button(
                ActionKind::Pause,
                "Pause",
                "Pausing...",
                !matches!(state, Some(SchedulerState::Stopped | SchedulerState::Paused)),
            ),
            resume: button(
                ActionKind::Resume,
                "Resume",
                "Resuming...",
                state == Some(SchedulerState::Paused),
            ),
            refresh: button(ActionKind::Refresh, "Refresh Now", "Refreshing...", !stopped),
            stop_and_exit: button(
                ActionKind::StopAndExit,
                "Stop Scheduler & Exit UI",
                "Stopping...",
                true,
            ),
            interval_enabled: status.is_some() && !busy(ActionKind::SetInterval),
            threads_enabled: status.is_some() && !busy(ActionKind::SetThreads),
        }
    }

    /// Affordance for an action kind.
    #[must_use]
    pub const fn button(&self, kind: ActionKind) -> Option<ButtonState> {
        match kind {
            ActionKind::Start => Some(self.start),
            ActionKind::Stop => Some(self.stop),
            ActionKind::Pause => Some(self.pause),
            ActionKind::Resume => Some(self.resume),
            ActionKind::Refresh => Some(self.refresh),
            ActionKind::StopAndExit => Some(self.stop_and_exit),
            ActionKind::SetInterval | ActionKind::SetThreads => None,
        }
    }
}

/// Caption for an interval option, e.g. `15 minutes` or `2 hours`.
#[must_use]
pub fn interval_label(seconds: u32) -> String {
    let minutes = seconds / 60;
    match minutes {
        0 => format!("{seconds} seconds"),
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        1 => "1 minute".to_string(),
        m => format!("{m} minutes"),
    }
}
