use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 變數名稱 -> 替換值
pub type Lookup = HashMap<String, String>;

/// 已解析的佔位符，以段落座標定位
///
/// `index`/`length` 涵蓋整個佔位符，包含分隔符。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub index: usize,
    pub length: usize,
    pub value: String,
}

impl Replacement {
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// 投影到單一 run 的替換，使用 run 內座標
///
/// 只有包含佔位符結尾的 run，`value` 才不是空字串。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<'a> {
    pub index: usize,
    pub length: usize,
    pub value: &'a str,
}

/// run 的位置：文檔中的段落序號與段落內的 run 序號
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId {
    pub paragraph: usize,
    pub run: usize,
}

/// 一個 run 的新文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEdit {
    pub run: RunId,
    pub text: String,
}

/// 一次填寫的結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    /// 已替換的佔位符數量
    pub replaced: usize,
    /// 文字有改變的 run 數量
    pub runs_rewritten: usize,
    /// 仍留在文檔中的佔位符名稱，依出現順序
    pub unresolved: Vec<String>,
}
