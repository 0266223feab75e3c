//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use proxyscope_core::{ProxyFilter, SchedulerAction, SortOrder, POLL_INTERVAL_MS};
use proxyscope_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};
use reqwest::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliDependencies, CliResult, parse_url};
use crate::commands::blocklist::{handle_block_add, handle_block_list, handle_block_remove};
use crate::commands::scheduler::{handle_action, handle_proxies, handle_status};
use crate::commands::watch::handle_watch;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STATE_FILE: &str = "proxyscope-state.json";
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha: option_env!("PROXYSCOPE_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }
    let _context = GlobalContextGuard::new(command_label(&cli.command));

    let trace_id = Uuid::new_v4().to_string();
    let deps = match CliDependencies::from_env(&cli, &trace_id) {
        Ok(deps) => deps,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    match dispatch(cli, &deps).await {
        Ok(()) => 0,
        Err(err) => {
            let message = err.display_message();
            tracing::debug!(error = %message, "command failed");
            eprintln!("error: {message}");
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, deps: &CliDependencies) -> CliResult<()> {
    let ctx = AppContext {
        client: deps.client.clone(),
        base_url: cli.api_url,
        state_file: cli.state_file,
    };

    match cli.command {
        Command::Status => handle_status(&ctx, cli.output).await,
        Command::Proxies(args) => handle_proxies(&ctx, args, cli.output).await,
        Command::Start => handle_action(&ctx, SchedulerAction::Start, cli.output).await,
        Command::Stop => handle_action(&ctx, SchedulerAction::Stop, cli.output).await,
        Command::Pause => handle_action(&ctx, SchedulerAction::Pause, cli.output).await,
        Command::Resume => handle_action(&ctx, SchedulerAction::Resume, cli.output).await,
        Command::Refresh => handle_action(&ctx, SchedulerAction::Refresh, cli.output).await,
        Command::Interval(args) => {
            handle_action(&ctx, SchedulerAction::SetInterval(args.seconds), cli.output).await
        }
        Command::Threads(args) => {
            handle_action(&ctx, SchedulerAction::SetThreads(args.count), cli.output).await
        }
        Command::Block(block) => match block {
            BlockCommand::Add(args) => handle_block_add(&ctx, &args.country),
            BlockCommand::Remove(args) => handle_block_remove(&ctx, &args.country),
            BlockCommand::List => handle_block_list(&ctx, cli.output),
        },
        Command::Watch(args) => handle_watch(&ctx, args).await,
    }
}

#[derive(Parser)]
#[command(name = "proxyscope", about = "Monitor and control a proxy validation scheduler")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "PROXYSCOPE_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "PROXYSCOPE_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "PROXYSCOPE_STATE_FILE",
        default_value = DEFAULT_STATE_FILE,
        help = "File holding the blocklist and thread count"
    )]
    pub(crate) state_file: PathBuf,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "PROXYSCOPE_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, env = "PROXYSCOPE_LOG_FORMAT")]
    pub(crate) log_format: Option<LogFormat>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show the scheduler status.
    Status,
    /// List proxies after blocklist, filter and sort.
    Proxies(ProxiesArgs),
    /// Start the scheduler.
    Start,
    /// Stop the scheduler.
    Stop,
    /// Pause a running scheduler.
    Pause,
    /// Resume a paused scheduler.
    Resume,
    /// Trigger an immediate validation run.
    Refresh,
    /// Change the run interval.
    Interval(IntervalArgs),
    /// Change the validation worker count.
    Threads(ThreadsArgs),
    /// Manage the country blocklist.
    #[command(subcommand)]
    Block(BlockCommand),
    /// Poll continuously and print one line per tick.
    Watch(WatchArgs),
}

#[derive(Subcommand)]
pub(crate) enum BlockCommand {
    /// Hide proxies from a country.
    Add(CountryArgs),
    /// Show proxies from a country again.
    Remove(CountryArgs),
    /// Print the blocklist.
    List,
}

#[derive(Args)]
pub(crate) struct CountryArgs {
    /// Country code or name, any casing.
    pub(crate) country: String,
}

#[derive(Args)]
pub(crate) struct IntervalArgs {
    /// Seconds between runs (300, 600, 900, 1800, 3600 or 7200).
    pub(crate) seconds: u32,
}

#[derive(Args)]
pub(crate) struct ThreadsArgs {
    /// Worker count (10, 20, 30, 40, 50, 75, 100, 150 or 200).
    pub(crate) count: u32,
}

#[derive(Args)]
pub(crate) struct ProxiesArgs {
    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub(crate) filter: FilterArg,
    #[arg(long, value_enum, default_value_t = SortArg::None)]
    pub(crate) sort: SortArg,
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

#[derive(Args)]
pub(crate) struct WatchArgs {
    #[arg(long, default_value_t = u64::from(POLL_INTERVAL_MS))]
    pub(crate) interval_ms: u64,
    /// Stop after this many ticks; runs until interrupted otherwise.
    #[arg(long)]
    pub(crate) ticks: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum FilterArg {
    All,
    Valid,
    Invalid,
}

impl From<FilterArg> for ProxyFilter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Self::All,
            FilterArg::Valid => Self::Valid,
            FilterArg::Invalid => Self::Invalid,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortArg {
    None,
    Fastest,
    Slowest,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::None => Self::None,
            SortArg::Fastest => Self::ResponseTimeAsc,
            SortArg::Slowest => Self::ResponseTimeDesc,
        }
    }
}

pub(crate) const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Status => "status",
        Command::Proxies(_) => "proxies",
        Command::Start => "start",
        Command::Stop => "stop",
        Command::Pause => "pause",
        Command::Resume => "resume",
        Command::Refresh => "refresh",
        Command::Interval(_) => "interval",
        Command::Threads(_) => "threads",
        Command::Block(BlockCommand::Add(_)) => "block_add",
        Command::Block(BlockCommand::Remove(_)) => "block_remove",
        Command::Block(BlockCommand::List) => "block_list",
        Command::Watch(_) => "watch",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_and_subcommands() {
        let cli = Cli::try_parse_from([
            "proxyscope",
            "--api-url",
            "http://scheduler.local:9000",
            "--output",
            "json",
            "proxies",
            "--filter",
            "valid",
            "--sort",
            "slowest",
            "--limit",
            "5",
        ])
        .expect("valid arguments");
        assert_eq!(cli.api_url.as_str(), "http://scheduler.local:9000/");
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Proxies(args) = cli.command else {
            panic!("expected proxies command");
        };
        assert_eq!(ProxyFilter::from(args.filter), ProxyFilter::Valid);
        assert_eq!(SortOrder::from(args.sort), SortOrder::ResponseTimeDesc);
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn watch_defaults_to_the_poll_interval() {
        let cli = Cli::try_parse_from(["proxyscope", "watch"]).expect("valid arguments");
        let Command::Watch(args) = cli.command else {
            panic!("expected watch command");
        };
        assert_eq!(args.interval_ms, 5_000);
        assert!(args.ticks.is_none());
    }

    #[test]
    fn rejects_bad_urls_and_log_formats() {
        assert!(Cli::try_parse_from(["proxyscope", "--api-url", "not a url", "status"]).is_err());
        assert!(Cli::try_parse_from(["proxyscope", "--log-format", "xml", "status"]).is_err());
        let cli = Cli::try_parse_from(["proxyscope", "--log-format", "json", "status"])
            .expect("valid arguments");
        assert_eq!(cli.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn command_labels_are_stable() {
        let cli = Cli::try_parse_from(["proxyscope", "block", "add", "us"]).expect("valid");
        assert_eq!(command_label(&cli.command), "block_add");
        let cli = Cli::try_parse_from(["proxyscope", "threads", "75"]).expect("valid");
        assert_eq!(command_label(&cli.command), "threads");
    }
}
