//! `modstat package <name>`

use modstat_core::error::ModstatResult;

use super::summarize::to_pretty_json;
use super::{CommandContext, CommandOutcome};

pub async fn execute(name: &str, ctx: &CommandContext) -> ModstatResult<CommandOutcome> {
    let info = ctx.analyzer()?.analyze_versions(name).await?;
    let summary = info.summarize();

    println!(
        "{}",
        to_pretty_json(&serde_json::json!({ "versions": info, "summary": summary }))?
    );
    Ok(CommandOutcome::Success)
}
