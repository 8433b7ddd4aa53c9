use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

// ============================================================================
// WordprocessingML element names
// ============================================================================

const PARAGRAPH: &[u8] = b"w:p";
const TEXT: &[u8] = b"w:t";
const SPACE_ATTR: &[u8] = b"xml:space";
const BOM: &str = "\u{feff}";

// ============================================================================
// Parsed part
// ============================================================================

enum Node {
    /// `w:t` 以外的事件，原樣保留
    Markup(Event<'static>),
    Text(TextElement),
}

/// 一個 `w:t` 元素，即一個 run 的文字
struct TextElement {
    start: BytesStart<'static>,
    /// 開始與結束標籤之間的事件，原樣保留
    inner: Vec<Event<'static>>,
    self_closing: bool,
    text: String,
    rewritten: Option<String>,
}

impl TextElement {
    fn current(&self) -> &str {
        self.rewritten.as_deref().unwrap_or(&self.text)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let Some(text) = &self.rewritten else {
            if self.self_closing {
                writer.write_event(Event::Empty(self.start.borrow()))?;
            } else {
                writer.write_event(Event::Start(self.start.borrow()))?;
                for event in &self.inner {
                    writer.write_event(event.borrow())?;
                }
                writer.write_event(Event::End(self.start.to_end()))?;
            }
            return Ok(());
        };

        if text.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(self.start.borrow()))?;
            return Ok(());
        }
        // 沒有 preserve 時 Word 會裁掉元素兩端的空白
        let mut start = self.start.borrow();
        if !has_space_attribute(&start) {
            start.push_attribute(("xml:space", "preserve"));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(self.start.to_end()))?;
        Ok(())
    }
}

/// docx 套件中的一個 XML part（`word/document.xml`、頁首、頁尾等），切成由 `w:t` run 組成的段落
///
/// 除了被改寫的 `w:t` 元素，其餘內容逐位元組寫回。
pub struct WordXml {
    bom: bool,
    nodes: Vec<Node>,
    /// 每個段落的文字元素在 `nodes` 中的索引
    paragraphs: Vec<Vec<usize>>,
}

impl WordXml {
    pub fn parse(xml: &str) -> Result<Self> {
        let (bom, body) = match xml.strip_prefix(BOM) {
            Some(body) => (true, body),
            None => (false, xml),
        };
        let mut reader = Reader::from_str(body);
        let mut nodes = Vec::new();
        let mut paragraphs: Vec<Vec<usize>> = Vec::new();
        // 文字方塊內會有巢狀段落
        let mut open: Vec<usize> = Vec::new();

        loop {
            let element = match reader.read_event()? {
                Event::Eof => break,
                Event::Start(e) if e.name().as_ref() == PARAGRAPH => {
                    open.push(paragraphs.len());
                    paragraphs.push(Vec::new());
                    nodes.push(Node::Markup(Event::Start(e.into_owned())));
                    continue;
                }
                Event::End(e) if e.name().as_ref() == PARAGRAPH => {
                    open.pop();
                    nodes.push(Node::Markup(Event::End(e.into_owned())));
                    continue;
                }
                Event::Start(e) if e.name().as_ref() == TEXT => {
                    read_text_element(&mut reader, e.into_owned())?
                }
                Event::Empty(e) if e.name().as_ref() == TEXT => TextElement {
                    start: e.into_owned(),
                    inner: Vec::new(),
                    self_closing: true,
                    text: String::new(),
                    rewritten: None,
                },
                event => {
                    nodes.push(Node::Markup(event.into_owned()));
                    continue;
                }
            };

            let index = nodes.len();
            nodes.push(Node::Text(element));
            match open.last() {
                Some(&paragraph) => paragraphs[paragraph].push(index),
                None => paragraphs.push(vec![index]),
            }
        }

        Ok(Self {
            bom,
            nodes,
            paragraphs,
        })
    }

    /// 所有段落的 run 文字，依文檔順序
    pub fn paragraphs(&self) -> Vec<Vec<String>> {
        self.paragraphs
            .iter()
            .map(|runs| {
                runs.iter()
                    .filter_map(|&index| self.text_element(index))
                    .map(|element| element.current().to_owned())
                    .collect()
            })
            .collect()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn set_run_text(&mut self, paragraph: usize, run: usize, text: String) -> Result<()> {
        let index = self
            .paragraphs
            .get(paragraph)
            .and_then(|runs| runs.get(run))
            .copied()
            .ok_or(Error::RunNotFound { paragraph, run })?;
        match self.nodes.get_mut(index) {
            Some(Node::Text(element)) => {
                element.rewritten = Some(text);
                Ok(())
            }
            _ => Err(Error::RunNotFound { paragraph, run }),
        }
    }

    /// 解析後是否有任何 run 被改寫
    pub fn is_dirty(&self) -> bool {
        self.nodes
            .iter()
            .any(|node| matches!(node, Node::Text(element) if element.rewritten.is_some()))
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        if self.bom {
            writer.get_mut().extend_from_slice(BOM.as_bytes());
        }
        for node in &self.nodes {
            match node {
                Node::Markup(event) => writer.write_event(event.borrow())?,
                Node::Text(element) => element.write(&mut writer)?,
            }
        }
        Ok(writer.into_inner())
    }

    fn text_element(&self, index: usize) -> Option<&TextElement> {
        match self.nodes.get(index) {
            Some(Node::Text(element)) => Some(element),
            _ => None,
        }
    }
}

/// 讀到與 `start` 對應的 `w:t` 結束標籤為止，收集反跳脫後的文字
fn read_text_element(reader: &mut Reader<&[u8]>, start: BytesStart<'static>) -> Result<TextElement> {
    let mut inner = Vec::new();
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => {
                tracing::warn!("document part ends inside a w:t element");
                break;
            }
            Event::End(e) if depth == 0 && e.name().as_ref() == TEXT => break,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(t) if depth == 0 => text.push_str(&t.unescape()?),
            Event::CData(c) if depth == 0 => text.push_str(&String::from_utf8_lossy(c)),
            _ => {}
        }
        inner.push(event.into_owned());
    }

    Ok(TextElement {
        start,
        inner,
        self_closing: false,
        text,
        rewritten: None,
    })
}

fn has_space_attribute(start: &BytesStart<'_>) -> bool {
    start
        .attributes()
        .flatten()
        .any(|attr| attr.key.as_ref() == SPACE_ATTR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>Hello </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>$(na</w:t></w:r><w:r><w:t xml:space="preserve">me) &amp; co</w:t></w:r></w:p><w:p/><w:p><w:r><w:t/></w:r><w:r><w:tab/><w:t>second</w:t></w:r></w:p></w:body></w:document>"#;

    #[test]
    fn test_parse_paragraphs_and_runs() {
        let xml = WordXml::parse(SAMPLE).unwrap();
        assert_eq!(
            xml.paragraphs(),
            vec![
                vec!["Hello ".to_string(), "$(na".into(), "me) & co".into()],
                vec!["".to_string(), "second".into()],
            ]
        );
        assert_eq!(xml.paragraph_count(), 2);
    }

    #[test]
    fn test_untouched_part_is_byte_identical() {
        let xml = WordXml::parse(SAMPLE).unwrap();
        assert!(!xml.is_dirty());
        assert_eq!(String::from_utf8(xml.to_xml().unwrap()).unwrap(), SAMPLE);
    }

    #[test]
    fn test_rewritten_run_is_escaped_and_preserved() {
        let mut xml = WordXml::parse(SAMPLE).unwrap();
        xml.set_run_text(0, 0, "Hi ".into()).unwrap();
        xml.set_run_text(0, 2, "A<B> ".into()).unwrap();
        assert!(xml.is_dirty());

        let out = String::from_utf8(xml.to_xml().unwrap()).unwrap();
        assert!(out.contains(r#"<w:t xml:space="preserve">Hi </w:t>"#));
        assert!(out.contains(r#"<w:t xml:space="preserve">A&lt;B&gt; </w:t>"#));
        assert!(!out.contains(r#"xml:space="preserve" xml:space="preserve""#));
        assert!(out.contains("<w:b/></w:rPr><w:t>$(na</w:t>"));

        let reparsed = WordXml::parse(&out).unwrap();
        assert_eq!(reparsed.paragraphs()[0], vec!["Hi ", "$(na", "A<B> "]);
    }

    #[test]
    fn test_self_closing_text_element() {
        let mut xml = WordXml::parse(SAMPLE).unwrap();
        xml.set_run_text(1, 0, "filled".into()).unwrap();
        let out = String::from_utf8(xml.to_xml().unwrap()).unwrap();
        assert!(out.contains(r#"<w:r><w:t xml:space="preserve">filled</w:t></w:r>"#));
    }

    #[test]
    fn test_unknown_run_is_an_error() {
        let mut xml = WordXml::parse(SAMPLE).unwrap();
        assert!(matches!(
            xml.set_run_text(0, 9, String::new()),
            Err(Error::RunNotFound { paragraph: 0, run: 9 })
        ));
        assert!(xml.set_run_text(5, 0, String::new()).is_err());
    }

    #[test]
    fn test_nested_paragraphs_get_their_own_index() {
        let xml = WordXml::parse(
            "<w:p><w:r><w:t>outer </w:t></w:r><w:r><w:txbxContent><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:txbxContent></w:r><w:r><w:t>tail</w:t></w:r></w:p>",
        )
        .unwrap();
        assert_eq!(
            xml.paragraphs(),
            vec![vec!["outer ".to_string(), "tail".into()], vec!["inner".to_string()]]
        );
    }

    #[test]
    fn test_byte_order_mark_survives() {
        let source = format!("{BOM}<w:p><w:r><w:t>x</w:t></w:r></w:p>");
        let mut xml = WordXml::parse(&source).unwrap();
        xml.set_run_text(0, 0, "y".into()).unwrap();
        let out = String::from_utf8(xml.to_xml().unwrap()).unwrap();
        assert!(out.starts_with(BOM));
        assert_eq!(xml.paragraphs(), vec![vec!["y".to_string()]]);
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(WordXml::parse("<w:p><w:r></w:p>").is_err());
    }
}
