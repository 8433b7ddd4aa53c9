pub mod read;
pub mod write;

pub use read::{get_doc_content, paragraph_texts};
pub use write::rewrite_runs;

use std::sync::Arc;

use yrs::updates::decoder::Decode;
use yrs::{Doc, ReadTxn, StateVector, Transact, Update};

use crate::document::RunDocument;
use crate::error::{Error, Result};
use crate::model::RunEdit;

/// 富文本存放在單一 XML fragment 的 yrs 文檔
///
/// `Doc` 是共享的，這裡做的修改所有 observer 都會收到。
#[derive(Clone)]
pub struct YrsDocument {
    doc: Arc<Doc>,
    fragment: String,
}

impl YrsDocument {
    pub fn from_doc(doc: Arc<Doc>, fragment: &str) -> Self {
        Self {
            doc,
            fragment: fragment.to_owned(),
        }
    }

    /// 從包含完整狀態的 v1 update 重建文檔
    pub fn from_update(update: &[u8], fragment: &str) -> Result<Self> {
        let update = Update::decode_v1(update).map_err(|e| Error::YrsUpdate(e.to_string()))?;
        let doc = Doc::new();
        doc.transact_mut().apply_update(update);
        Ok(Self::from_doc(Arc::new(doc), fragment))
    }

    /// 以 v1 update 編碼完整狀態
    pub fn encode_update(&self) -> Vec<u8> {
        let txn = self.doc.transact();
        txn.encode_state_as_update_v1(&StateVector::default())
    }

    pub fn doc(&self) -> &Arc<Doc> {
        &self.doc
    }
}

impl RunDocument for YrsDocument {
    fn paragraphs(&self) -> Vec<Vec<String>> {
        paragraph_texts(&self.doc, &self.fragment)
    }

    fn rewrite_runs(&mut self, edits: Vec<RunEdit>) -> Result<()> {
        rewrite_runs(&self.doc, &self.fragment, edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FillOptions, SeamSpaces};
    use crate::fill::fill_document;
    use crate::model::Lookup;
    use yrs::types::xml::XmlElementPrelim;
    use yrs::{OffsetKind, Options, XmlFragment, XmlTextPrelim};

    fn sample_doc() -> Arc<Doc> {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("content");
        {
            let mut txn = doc.transact_mut();
            let para = fragment.insert(&mut txn, 0, XmlElementPrelim::empty("paragraph"));
            para.insert(&mut txn, 0, XmlTextPrelim::new("Dear $(fir"));
            para.insert(&mut txn, 1, XmlTextPrelim::new("st) $(last),"));
            let heading = fragment.insert(&mut txn, 1, XmlElementPrelim::empty("heading"));
            heading.insert(&mut txn, 0, XmlTextPrelim::new("$(missing)"));
        }
        Arc::new(doc)
    }

    #[test]
    fn test_invalid_update_is_rejected() {
        let result = YrsDocument::from_update(&[0xff, 0xff, 0xff], "content");
        assert!(matches!(result, Err(Error::YrsUpdate(_))));
    }

    #[test]
    fn test_update_round_trip() {
        let doc = YrsDocument::from_doc(sample_doc(), "content");
        let restored = YrsDocument::from_update(&doc.encode_update(), "content").unwrap();
        assert_eq!(restored.paragraphs(), doc.paragraphs());
        assert_eq!(
            get_doc_content(restored.doc(), "content"),
            "Dear $(first) $(last),\n$(missing)"
        );
    }

    #[test]
    fn test_fill_shared_doc() {
        let shared = sample_doc();
        let mut doc = YrsDocument::from_doc(Arc::clone(&shared), "content");
        let lookup = Lookup::from([
            ("first".to_string(), "Ada".to_string()),
            ("last".to_string(), "Lovelace".to_string()),
        ]);

        let report = fill_document(&mut doc, &lookup, &FillOptions::default()).unwrap();
        assert_eq!(report.replaced, 2);
        assert_eq!(report.unresolved, vec!["missing"]);
        // 呼叫端持有的 Doc 也看得到修改
        assert_eq!(
            get_doc_content(&shared, "content"),
            "Dear\u{a0}Ada\u{a0}Lovelace,\n$(missing)"
        );
    }

    #[test]
    fn test_fill_utf16_doc() {
        let doc = Doc::with_options(Options {
            offset_kind: OffsetKind::Utf16,
            ..Options::default()
        });
        let fragment = doc.get_or_insert_xml_fragment("content");
        {
            let mut txn = doc.transact_mut();
            let para = fragment.insert(&mut txn, 0, XmlElementPrelim::empty("paragraph"));
            para.insert(&mut txn, 0, XmlTextPrelim::new("héllo 😀 $(na"));
            para.insert(&mut txn, 1, XmlTextPrelim::new("me) ü"));
        }
        let shared = Arc::new(doc);
        let mut doc = YrsDocument::from_doc(Arc::clone(&shared), "content");
        let options = FillOptions {
            seam_spaces: SeamSpaces::Keep,
            ..Default::default()
        };

        let lookup = Lookup::from([("name".to_string(), "Wörld".to_string())]);
        fill_document(&mut doc, &lookup, &options).unwrap();
        assert_eq!(doc.paragraphs(), vec![vec!["héllo 😀 ", "Wörld ü"]]);
        assert_eq!(get_doc_content(&shared, "content"), "héllo 😀 Wörld ü");
    }
}
