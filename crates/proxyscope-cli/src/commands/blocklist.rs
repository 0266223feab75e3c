use proxyscope_core::SettingsStore;

use crate::cli::OutputFormat;
use crate::client::{AppContext, CliResult};
use crate::output::render_blocklist;
use crate::store::JsonFileStore;

fn settings(ctx: &AppContext) -> SettingsStore {
    SettingsStore::load(Box::new(JsonFileStore::new(ctx.state_file.clone())))
}

pub(crate) fn handle_block_add(ctx: &AppContext, country: &str) -> CliResult<()> {
    let entry = settings(ctx).add_blocked(country)?;
    println!("Blocked {entry}");
    Ok(())
}

pub(crate) fn handle_block_remove(ctx: &AppContext, country: &str) -> CliResult<()> {
    if settings(ctx).remove_blocked(country) {
        println!("Unblocked {country}");
    } else {
        println!("{country} was not blocked");
    }
    Ok(())
}

pub(crate) fn handle_block_list(ctx: &AppContext, output: OutputFormat) -> CliResult<()> {
    render_blocklist(settings(ctx).blocklist().entries(), output)
}
