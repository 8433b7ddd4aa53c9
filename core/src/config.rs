use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 查表值為空字串時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EmptyValuePolicy {
    /// 空值視同缺少，佔位符原樣保留
    #[default]
    LeaveToken,
    /// 只要鍵存在就替換，空字串也算
    Substitute,
}

/// 替換接縫處 U+0020 空白的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SeamSpaces {
    /// 接縫空白轉成 U+00A0，避免被渲染器合併
    #[default]
    NonBreaking,
    Keep,
}

/// 佔位符可以跨越的文字範圍
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ScanScope {
    #[default]
    Paragraph,
    /// 整份文檔視為一段文字，佔位符可以跨段落
    Document,
}

pub const DEFAULT_FRAGMENT: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FillOptions {
    pub empty_values: EmptyValuePolicy,
    pub seam_spaces: SeamSpaces,
    pub scope: ScanScope,
    /// 同時填寫 docx 的頁首、頁尾、註腳與尾註
    pub include_headers_footers: bool,
    /// yrs 文檔內容所在的 XML fragment 名稱
    pub fragment: String,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            empty_values: EmptyValuePolicy::default(),
            seam_spaces: SeamSpaces::default(),
            scope: ScanScope::default(),
            include_headers_footers: false,
            fragment: DEFAULT_FRAGMENT.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_legacy_behaviour() {
        let options = FillOptions::default();
        assert_eq!(options.empty_values, EmptyValuePolicy::LeaveToken);
        assert_eq!(options.seam_spaces, SeamSpaces::NonBreaking);
        assert_eq!(options.scope, ScanScope::Paragraph);
        assert!(!options.include_headers_footers);
        assert_eq!(options.fragment, "content");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options: FillOptions =
            serde_json::from_str(r#"{"empty_values": "substitute", "scope": "document"}"#).unwrap();
        assert_eq!(options.empty_values, EmptyValuePolicy::Substitute);
        assert_eq!(options.scope, ScanScope::Document);
        assert_eq!(options.seam_spaces, SeamSpaces::NonBreaking);
    }

    #[test]
    fn test_parse_from_flag_values() {
        assert_eq!(SeamSpaces::from_str("keep").unwrap(), SeamSpaces::Keep);
        assert_eq!(
            EmptyValuePolicy::from_str("leave-token").unwrap(),
            EmptyValuePolicy::LeaveToken
        );
        assert_eq!(ScanScope::Document.to_string(), "document");
        assert!(ScanScope::from_str("section").is_err());
    }
}
