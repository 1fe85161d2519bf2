//! `modstat clean [--stats]`

use modstat_cache::CacheDomain;
use modstat_core::error::ModstatResult;

use super::{CommandContext, CommandOutcome};

pub async fn execute(stats_only: bool, ctx: &CommandContext) -> ModstatResult<CommandOutcome> {
    let store = ctx.store();

    if stats_only {
        if store.remove_domain(CacheDomain::DownloadStats).await? {
            ctx.output.success("Removed cached download statistics");
        } else {
            ctx.output.info("No cached download statistics to remove");
        }
    } else {
        let removed = store.clear().await?;
        ctx.output.success(&format!(
            "Removed {} cache {} from {}",
            removed,
            if removed == 1 { "domain" } else { "domains" },
            store.root_path()
        ));
    }

    Ok(CommandOutcome::Success)
}
