use std::path::PathBuf;

use anyhow::Context;
use docfill_core::FillReport;

use crate::opts::{FillOpts, ValueOpts};

pub async fn run(
    input: PathBuf,
    output: PathBuf,
    values: ValueOpts,
    opts: FillOpts,
    json: bool,
) -> anyhow::Result<()> {
    let lookup = values.load_lookup()?;
    tracing::debug!(values = lookup.len(), "loaded placeholder values");

    let report = docfill_core::fill_with_options(&input, &output, &lookup, &opts.to_options())
        .await
        .with_context(|| format!("filling {} into {}", input.display(), output.display()))?;
    println!("{}", render(&report, json)?);
    Ok(())
}

fn render(report: &FillReport, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let mut out = format!(
        "replaced {} placeholder(s) in {} run(s)",
        report.replaced, report.runs_rewritten
    );
    if !report.unresolved.is_empty() {
        out.push_str(&format!("\nunresolved: {}", report.unresolved.join(", ")));
    }
    Ok(out)
}
