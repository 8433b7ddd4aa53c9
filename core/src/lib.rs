pub mod config;
pub mod document;
pub mod docx;
pub mod editor;
pub mod error;
pub mod fill;
pub mod helper_utils;
pub mod model;

pub use config::{EmptyValuePolicy, FillOptions, ScanScope, SeamSpaces};
pub use document::{Document, DocumentFormat, MemoryDocument, RunDocument};
pub use error::{Error, Result};
pub use fill::{collect_variables, fill_document};
pub use model::{FillReport, Lookup, Replacement, RunEdit, RunId};

use std::path::Path;
use tracing::instrument;

/// 列出 `input` 文檔中所有佔位符名稱，依順序，保留重複
///
/// 不會寫入任何檔案。
#[instrument(skip_all, fields(input = %input.as_ref().display()))]
pub async fn extract_variables(input: impl AsRef<Path>) -> Result<Vec<String>> {
    extract_variables_with_options(input, &FillOptions::default()).await
}

#[instrument(skip_all, fields(input = %input.as_ref().display()))]
pub async fn extract_variables_with_options(
    input: impl AsRef<Path>,
    options: &FillOptions,
) -> Result<Vec<String>> {
    let doc = Document::load(input.as_ref(), options).await?;
    let variables = collect_variables(&doc, options.scope);
    tracing::info!(count = variables.len(), "extracted placeholder names");
    Ok(variables)
}

/// 用 `lookup` 填寫 `input` 文檔並存到 `output`
///
/// 沒有可用值的佔位符原樣保留。
#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub async fn fill(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    lookup: &Lookup,
) -> Result<FillReport> {
    fill_with_options(input, output, lookup, &FillOptions::default()).await
}

#[instrument(skip_all, fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
pub async fn fill_with_options(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    lookup: &Lookup,
    options: &FillOptions,
) -> Result<FillReport> {
    let mut doc = Document::load(input.as_ref(), options).await?;
    let report = fill_document(&mut doc, lookup, options)?;
    doc.save(output.as_ref()).await?;
    tracing::info!(
        replaced = report.replaced,
        runs_rewritten = report.runs_rewritten,
        unresolved = report.unresolved.len(),
        "filled document"
    );
    Ok(report)
}
