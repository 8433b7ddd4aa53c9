use std::path::PathBuf;

pub use clap::Parser;
use clap::ValueHint;

use crate::opts::{FillOpts, ValueOpts};

#[derive(Parser, Debug)]
#[clap(
    name = "docfill",
    version,
    about,
    rename_all = "kebab-case",
    rename_all_env = "screaming-snake"
)]
pub struct Cli {
    /// Tokio worker threads (optional override)
    #[arg(long, global = true, env = "DOCFILL_WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Subcommands
    #[clap(subcommand)]
    pub subcommand: Commands,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the placeholder names of a document, in order
    Vars {
        /// Template document (.docx or .ydoc)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        #[clap(flatten)]
        fill: FillOpts,

        /// Print a JSON array instead of one name per line
        #[arg(long)]
        json: bool,
    },
    /// Fill a document's placeholders and write the result
    Fill {
        /// Template document (.docx or .ydoc)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Where the filled document is written
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,

        #[clap(flatten)]
        values: ValueOpts,

        #[clap(flatten)]
        fill: FillOpts,

        /// Print the fill report as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn create_runtime(
        worker_threads: Option<usize>,
    ) -> anyhow::Result<tokio::runtime::Runtime> {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(n) = worker_threads {
            builder.worker_threads(n);
        }
        builder.enable_all().build().map_err(Into::into)
    }
}
