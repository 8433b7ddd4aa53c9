use std::path::PathBuf;

use anyhow::Context;

use crate::opts::FillOpts;

pub async fn run(input: PathBuf, opts: FillOpts, json: bool) -> anyhow::Result<()> {
    let variables = docfill_core::extract_variables_with_options(&input, &opts.to_options())
        .await
        .with_context(|| format!("reading placeholders of {}", input.display()))?;
    println!("{}", render(&variables, json)?);
    Ok(())
}

fn render(variables: &[String], json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(variables)?);
    }
    Ok(variables.join("\n"))
}
