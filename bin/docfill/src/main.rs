pub mod cli;
pub mod fill;
pub mod opts;
pub mod vars;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, Parser};

fn main() -> Result<()> {
    let cli = Cli::parse();
    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let runtime = Cli::create_runtime(cli.worker_threads)?;
    match cli.subcommand {
        Commands::Vars { input, fill, json } => {
            runtime.block_on(async move { vars::run(input, fill, json).await })
        }
        Commands::Fill {
            input,
            output,
            values,
            fill,
            json,
        } => runtime.block_on(async move { fill::run(input, output, values, fill, json).await }),
    }
}
