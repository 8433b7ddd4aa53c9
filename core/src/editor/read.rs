use yrs::types::Attrs;
use yrs::types::text::YChange;
use yrs::types::xml::XmlOut;
use yrs::{Any, Doc, OffsetKind, Out, ReadTxn, Text, Transact, XmlFragment};

// ============================================================================
// Constants: Element Type Definitions
// ============================================================================

/// 區塊級元素列表：每個區塊元素自成一個段落
const BLOCK_ELEMENTS: &[&str] = &[
    "paragraph",
    "heading",
    "code_block",
    "blockquote",
    "list_item",
    "table_cell",
];

// ============================================================================
// Text runs
// ============================================================================

/// 一個文字 run：`XmlText` 內一段格式相同的文字
///
/// y-prosemirror 把 marks 存成 `XmlText` 的格式屬性，所以同一個文字節點可能包含多個 run。
#[derive(Debug, Clone)]
pub struct TextRun {
    pub node: yrs::XmlTextRef,
    /// 此 chunk 在 `node` 所有 chunk 中的位置
    pub chunk: usize,
    /// 在 `node` 內的起點，以文檔的 offset 單位計
    pub offset: u32,
    pub text: String,
    pub attributes: Option<Attrs>,
}

// ============================================================================
// Public API
// ============================================================================

/// 取得文檔所有段落的 run 文字
///
/// # Arguments
/// * `doc` - Yrs Doc 實例
/// * `fragment` - 內容所在的 XML fragment 名稱（通常是 "content"）
pub fn paragraph_texts(doc: &Doc, fragment: &str) -> Vec<Vec<String>> {
    let xml_fragment = doc.get_or_insert_xml_fragment(fragment);
    let txn = doc.transact();
    collect_paragraph_runs(&txn, &xml_fragment, &doc.options().offset_kind)
        .into_iter()
        .map(|runs| runs.into_iter().map(|run| run.text).collect())
        .collect()
}

/// 從 Yrs Doc 中提取純文字內容，段落之間以換行分隔
///
/// 格式屬性不會出現在結果中。
pub fn get_doc_content(doc: &Doc, fragment: &str) -> String {
    paragraph_texts(doc, fragment)
        .into_iter()
        .map(|runs| runs.concat())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 遍歷 fragment，依文檔順序收集每個段落的 run
///
/// 不在任何區塊元素內的文字節點各自成為一個段落。
pub fn collect_paragraph_runs<T: ReadTxn>(
    txn: &T,
    fragment: &yrs::XmlFragmentRef,
    offset_kind: &OffsetKind,
) -> Vec<Vec<TextRun>> {
    let mut paragraphs = Vec::new();
    for i in 0..fragment.len(txn) {
        if let Some(child) = fragment.get(txn, i) {
            collect_from_node(&child, txn, offset_kind, None, &mut paragraphs);
        }
    }
    paragraphs
}

// ============================================================================
// Internal Implementation
// ============================================================================

fn collect_from_node<T: ReadTxn>(
    node: &XmlOut,
    txn: &T,
    offset_kind: &OffsetKind,
    paragraph: Option<usize>,
    out: &mut Vec<Vec<TextRun>>,
) {
    match node {
        XmlOut::Text(text_node) => {
            let paragraph = paragraph.unwrap_or_else(|| {
                out.push(Vec::new());
                out.len() - 1
            });
            out[paragraph].extend(text_runs(text_node, txn, offset_kind));
        }
        XmlOut::Element(element_node) => {
            // 區塊元素開啟新段落，inline 元素（如 link）沿用目前段落
            let paragraph = if is_block_level_element(element_node.tag().as_ref()) {
                out.push(Vec::new());
                Some(out.len() - 1)
            } else {
                paragraph
            };
            for i in 0..element_node.len(txn) {
                if let Some(child) = element_node.get(txn, i) {
                    collect_from_node(&child, txn, offset_kind, paragraph, out);
                }
            }
        }
        XmlOut::Fragment(fragment_node) => {
            for i in 0..fragment_node.len(txn) {
                if let Some(child) = fragment_node.get(txn, i) {
                    collect_from_node(&child, txn, offset_kind, paragraph, out);
                }
            }
        }
    }
}

/// 把文字節點依格式切成 run；嵌入物件只佔位置，不算 run
fn text_runs<T: ReadTxn>(
    text_node: &yrs::XmlTextRef,
    txn: &T,
    offset_kind: &OffsetKind,
) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut offset = 0u32;
    for diff in text_node.diff(txn, YChange::identity) {
        let Out::Any(Any::String(chunk)) = diff.insert else {
            offset += 1;
            continue;
        };
        let text = chunk.to_string();
        let length = measure(&text, offset_kind);
        runs.push(TextRun {
            node: text_node.clone(),
            chunk: runs.len(),
            offset,
            text,
            attributes: diff.attributes.map(|attrs| *attrs),
        });
        offset += length;
    }
    runs
}

/// `text` 以文檔 offset 單位計算的長度
pub(crate) fn measure(text: &str, offset_kind: &OffsetKind) -> u32 {
    let length = match offset_kind {
        OffsetKind::Utf16 => text.encode_utf16().count(),
        _ => text.len(),
    };
    length as u32
}

fn is_block_level_element(tag_name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag_name)
}

// ============================================================================
// Tests
// ============================================================================
