use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::cli::WatchArgs;
use crate::client::{AppContext, CliResult};
use crate::output::watch_line;

/// Mounts a session, then ticks until interrupted or `--ticks` runs out.
/// Poll failures are logged by the poller and never end the loop.
pub(crate) async fn handle_watch(ctx: &AppContext, args: WatchArgs) -> CliResult<()> {
    let cli = ctx.session();
    let session = &cli.session;
    session.poller().mount().await;
    println!("{}", watch_line(&session.view()));

    let period = Duration::from_millis(args.interval_ms.max(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut remaining = args.ticks;
    while remaining != Some(0) {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::debug!("interrupt received; stopping watch");
                break;
            }
            _ = ticker.tick() => {
                let report = session.poller().tick().await;
                tracing::trace!(?report, "watch tick");
                println!("{}", watch_line(&session.view()));
                remaining = remaining.map(|left| left - 1);
            }
        }
    }

    session.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;

    use super::*;
    use crate::commands::test_support::{context, mock_proxies, mock_status, status_body};

    #[tokio::test]
    async fn running_scheduler_polls_both_resources_every_tick() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let status = mock_status(&server, status_body("running", 900, 50));
        let proxies = mock_proxies(&server);

        let args = WatchArgs {
            interval_ms: 10,
            ticks: Some(2),
        };
        handle_watch(&context(&server, &dir), args)
            .await
            .expect("watch ends after two ticks");
        status.assert_hits(3);
        proxies.assert_hits(3);
    }

    #[tokio::test]
    async fn stopped_scheduler_only_polls_status() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().expect("tempdir");
        let status = mock_status(&server, status_body("stopped", 900, 50));
        let proxies = mock_proxies(&server);

        let args = WatchArgs {
            interval_ms: 10,
            ticks: Some(2),
        };
        handle_watch(&context(&server, &dir), args)
            .await
            .expect("watch ends after two ticks");
        status.assert_hits(3);
        proxies.assert_hits(1);
    }
}
