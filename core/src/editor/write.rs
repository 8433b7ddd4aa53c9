use std::sync::Arc;

use yrs::types::Attrs;
use yrs::{Any, Doc, Text, Transact};

use super::read::{TextRun, collect_paragraph_runs, measure};
use crate::error::{Error, Result};
use crate::model::RunEdit;

/// 將 run 的新文字寫回 Yrs Doc
///
/// 所有修改在同一個寫入事務中完成，observer 只會收到一次更新。
///
/// # Arguments
/// * `doc` - Yrs Doc 實例
/// * `fragment` - 內容所在的 XML fragment 名稱
/// * `edits` - 每個 run 的新文字
///
/// # Errors
/// - 如果某個 run 不存在，整批修改都不會套用
pub fn rewrite_runs(doc: &Doc, fragment: &str, mut edits: Vec<RunEdit>) -> Result<()> {
    if edits.is_empty() {
        return Ok(());
    }

    let xml_fragment = doc.get_or_insert_xml_fragment(fragment);
    let offset_kind = &doc.options().offset_kind;

    // XmlTextRef 必須在寫入事務內收集
    let mut txn = doc.transact_mut();
    let paragraphs = collect_paragraph_runs(&txn, &xml_fragment, offset_kind);

    for edit in &edits {
        let found = paragraphs
            .get(edit.run.paragraph)
            .is_some_and(|runs| edit.run.run < runs.len());
        if !found {
            return Err(Error::RunNotFound {
                paragraph: edit.run.paragraph,
                run: edit.run.run,
            });
        }
    }

    // 由後往前改，前面 run 的 offset 不受影響
    edits.sort_by(|a, b| b.run.cmp(&a.run));
    for RunEdit { run: id, text } in edits {
        let runs = &paragraphs[id.paragraph];
        let run = &runs[id.run];
        let previous = (run.chunk > 0).then(|| &runs[id.run - 1]);

        run.node
            .remove_range(&mut txn, run.offset, measure(&run.text, offset_kind));
        if !text.is_empty() {
            let attributes = chunk_attributes(previous, run);
            run.node
                .insert_with_attributes(&mut txn, run.offset, &text, attributes);
        }
        tracing::debug!(
            paragraph = id.paragraph,
            run = id.run,
            "rewrote text run: '{}' -> '{}'",
            run.text,
            text
        );
    }

    // 事務在函數結束時提交
    Ok(())
}

/// 讓新文字維持 `run` 原本格式的屬性
///
/// 左側 chunk 的格式會被明確清除，不會被繼承。
fn chunk_attributes(previous: Option<&TextRun>, run: &TextRun) -> Attrs {
    let mut attributes = run.attributes.clone().unwrap_or_default();
    if let Some(inherited) = previous.and_then(|prev| prev.attributes.as_ref()) {
        for key in inherited.keys() {
            attributes
                .entry(Arc::clone(key))
                .or_insert(Any::Null);
        }
    }
    attributes
}
