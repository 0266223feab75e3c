use anyhow::anyhow;
use proxyscope_core::{DispatchOutcome, SchedulerAction};

use crate::cli::{OutputFormat, ProxiesArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_proxies, render_status};

pub(crate) async fn handle_status(ctx: &AppContext, output: OutputFormat) -> CliResult<()> {
    let cli = ctx.session();
    cli.load().await?;
    render_status(cli.session.status().as_ref(), output)
}

pub(crate) async fn handle_proxies(
    ctx: &AppContext,
    args: ProxiesArgs,
    output: OutputFormat,
) -> CliResult<()> {
    let cli = ctx.session();
    cli.session.set_filter(args.filter.into());
    cli.session.set_sort(args.sort.into());
    cli.load().await?;
    render_proxies(&cli.session.view(), args.limit, output)
}

pub(crate) async fn handle_action(
    ctx: &AppContext,
    action: SchedulerAction,
    output: OutputFormat,
) -> CliResult<()> {
    let cli = ctx.session();
    let kind = action.kind();
    match cli.session.dispatcher().dispatch(action).await? {
        DispatchOutcome::Completed(ack) => {
            if output == OutputFormat::Table {
                println!(
                    "{}: {}",
                    kind.label(),
                    ack.message.as_deref().unwrap_or("accepted")
                );
            }
            render_status(cli.session.status().as_ref(), output)
        }
        DispatchOutcome::Failed(failure) => Err(failure.into()),
        DispatchOutcome::Ignored => Err(CliError::failure(anyhow!(
            "{} is already in progress",
            kind.label()
        ))),
    }
}
