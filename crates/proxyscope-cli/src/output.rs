//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use proxyscope_core::view::display::{
    NO_MATCH_MESSAGE, SCHEDULER_LOADING_MESSAGE, format_optional_timestamp, interval_label,
};
use proxyscope_core::{DashboardView, ProxyRow, SchedulerSnapshot};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_status(
    status: Option<&SchedulerSnapshot>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            let Some(status) = status else {
                println!("{SCHEDULER_LOADING_MESSAGE}");
                return Ok(());
            };
            for line in status_lines(status) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub(crate) fn status_lines(status: &SchedulerSnapshot) -> Vec<String> {
    vec![
        format!("status: {}", status.state.display_label()),
        format!(
            "validation: {}",
            if status.validation_in_progress {
                "in progress"
            } else {
                "idle"
            }
        ),
        format!("interval: {}", interval_label(status.interval_seconds)),
        format!("threads: {}", status.validation_threads),
        format!("test url: {}", status.test_url),
        format!("last run: {}", format_optional_timestamp(status.last_run.as_deref())),
        format!("next run: {}", format_optional_timestamp(status.next_run.as_deref())),
        format!(
            "proxies: {} tracked, {} valid",
            status.current_proxy_count, status.valid_proxy_count
        ),
    ]
}

#[derive(Serialize)]
struct ProxyListing<'a> {
    all: usize,
    valid: usize,
    invalid: usize,
    rows: &'a [ProxyRow],
}

pub(crate) fn render_proxies(
    view: &DashboardView,
    limit: Option<usize>,
    format: OutputFormat,
) -> CliResult<()> {
    let rows = limit.map_or(view.rows.as_slice(), |limit| {
        &view.rows[..limit.min(view.rows.len())]
    });
    match format {
        OutputFormat::Json => print_json(&ProxyListing {
            all: view.counts.all,
            valid: view.counts.valid,
            invalid: view.counts.invalid,
            rows,
        })?,
        OutputFormat::Table => {
            println!(
                "all: {}  valid: {}  invalid: {}  sort: {}",
                view.counts.all,
                view.counts.valid,
                view.counts.invalid,
                view.filter_sort.sort.label()
            );
            if let Some(message) = view.table.message() {
                println!("{message}");
                return Ok(());
            }
            if view.shows_no_match() {
                println!("{NO_MATCH_MESSAGE}");
                return Ok(());
            }
            println!(
                "{:<30} {:<8} {:<12} {:<10} {:>12} {:<20} SOURCE",
                "PROXY", "STATUS", "ANONYMITY", "COUNTRY", "RESPONSE", "LAST CHECKED"
            );
            for row in rows {
                println!("{}", proxy_line(row));
            }
            if rows.len() < view.rows.len() {
                println!("... {} more", view.rows.len() - rows.len());
            }
        }
    }
    Ok(())
}

pub(crate) fn proxy_line(row: &ProxyRow) -> String {
    format!(
        "{:<30} {:<8} {:<12} {:<10} {:>12} {:<20} {}",
        row.proxy,
        row.status,
        row.anonymity,
        row.country,
        row.response_time,
        row.last_checked,
        row.source
    )
}

pub(crate) fn render_blocklist(entries: &[String], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(entries)?,
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("No countries blocked.");
            }
            for entry in entries {
                println!("{entry}");
            }
        }
    }
    Ok(())
}

/// One summary line per watch tick.
pub(crate) fn watch_line(view: &DashboardView) -> String {
    let state = view
        .status
        .as_ref()
        .map_or_else(|| "UNKNOWN".to_string(), |status| status.state.display_label());
    let validating = view
        .status
        .as_ref()
        .is_some_and(|status| status.validation_in_progress);
    format!(
        "{state:<10} validating={validating} proxies={} shown={} valid={} invalid={}",
        view.raw_count,
        view.rows.len(),
        view.counts.valid,
        view.counts.invalid
    )
}
