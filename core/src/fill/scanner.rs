use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::EmptyValuePolicy;
use crate::model::{Lookup, Replacement};

/// `$(` + 任何非 `)` 字元 + `)`，不支援巢狀與跳脫
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\(([^)]*)\)").expect("placeholder pattern compiles. qed"));

/// 掃描一個段落的結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    /// 已解析的佔位符，依 index 遞增
    pub replacements: Vec<Replacement>,
    /// 所有佔位符名稱，依出現順序，不論是否解析
    pub variables: Vec<String>,
}

impl Scan {
    /// 沒有產生替換的名稱
    pub fn unresolved(&self, lookup: Option<&Lookup>, policy: EmptyValuePolicy) -> Vec<String> {
        self.variables
            .iter()
            .filter(|name| resolve(lookup, name, policy).is_none())
            .cloned()
            .collect()
    }
}

/// 找出 `text` 中所有佔位符，並用 `lookup` 解析
///
/// 沒有 lookup 時不會解析任何名稱，只做探索。
pub fn scan(text: &str, lookup: Option<&Lookup>, policy: EmptyValuePolicy) -> Scan {
    let mut scan = Scan::default();
    for captures in PLACEHOLDER.captures_iter(text) {
        let (Some(token), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        scan.variables.push(name.as_str().to_owned());
        if let Some(value) = resolve(lookup, name.as_str(), policy) {
            scan.replacements.push(Replacement {
                index: token.start(),
                length: token.len(),
                value: value.to_owned(),
            });
        }
    }
    scan
}

fn resolve<'a>(lookup: Option<&'a Lookup>, name: &str, policy: EmptyValuePolicy) -> Option<&'a str> {
    let value = lookup?.get(name)?;
    match policy {
        EmptyValuePolicy::LeaveToken if value.is_empty() => None,
        _ => Some(value.as_str()),
    }
}
