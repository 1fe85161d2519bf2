//! `modstat summarize <author>`

use modstat_core::error::{ModstatError, ModstatResult};

use super::{CommandContext, CommandOutcome};
use crate::output::report;

pub async fn execute(author: &str, top: bool, json: bool, ctx: &CommandContext) -> ModstatResult<CommandOutcome> {
    let report = ctx.summarizer()?.summarize(author).await?;

    if json {
        println!("{}", to_pretty_json(&report)?);
    } else {
        println!("{}", to_pretty_json(&report::summary_view(&report.summary))?);
        if top {
            println!();
            println!("{}", report::render_rankings(&report.summary, &ctx.output.colors));
        }
    }

    for failure in &report.failures {
        ctx.output.error(&ctx.output.errors.format_failure(failure));
    }

    if report.is_complete() {
        Ok(CommandOutcome::Success)
    } else {
        ctx.output.warn(&format!(
            "{} of {} packages could not be analyzed",
            report.failures.len(),
            report.processed
        ));
        Ok(CommandOutcome::PartialFailure)
    }
}

pub(crate) fn to_pretty_json<T: serde::Serialize>(value: &T) -> ModstatResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| ModstatError::Decode {
        url: "stdout".to_string(),
        source: e,
    })
}
