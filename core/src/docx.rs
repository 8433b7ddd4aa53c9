use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::document::RunDocument;
use crate::error::{Error, Result};
use crate::helper_utils::WordXml;
use crate::model::RunEdit;

pub const MAIN_PART: &str = "word/document.xml";

const MAX_PREALLOCATION: u64 = 1 << 20;

/// 頁首、頁尾與註腳各自帶有段落
fn is_auxiliary_part(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    let is_xml = file.ends_with(".xml") && !file.contains('/');
    is_xml
        && (file.starts_with("header")
            || file.starts_with("footer")
            || file == "footnotes.xml"
            || file == "endnotes.xml")
}

/// zip header 宣告的大小不可信，預先配置設上限
fn entry_capacity(declared: u64) -> usize {
    declared.min(MAX_PREALLOCATION) as usize
}

struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

struct Part {
    entry: usize,
    xml: WordXml,
}

/// `.docx` 套件：依序保留所有 zip 項目，並解析含文字的部分
pub struct DocxPackage {
    entries: Vec<Entry>,
    parts: Vec<Part>,
    /// 每個段落對應的 `(part, part 內段落)`，主文件排在最前
    paragraph_index: Vec<(usize, usize)>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8], include_auxiliary: bool) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(entry_capacity(file.size()));
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_owned(),
                compression: file.compression(),
                is_dir: file.is_dir(),
                data,
            });
        }

        let main = entries
            .iter()
            .position(|entry| entry.name == MAIN_PART)
            .ok_or_else(|| Error::MissingPart(MAIN_PART.to_owned()))?;
        let mut selected = vec![main];
        if include_auxiliary {
            selected.extend(
                entries
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| is_auxiliary_part(&entry.name))
                    .map(|(i, _)| i),
            );
        }

        let mut parts = Vec::with_capacity(selected.len());
        let mut paragraph_index = Vec::new();
        for entry in selected {
            let Entry { name, data, .. } = &entries[entry];
            let source = std::str::from_utf8(data).map_err(|_| Error::Utf8(name.clone()))?;
            let xml = WordXml::parse(source)?;
            tracing::debug!(part = %name, paragraphs = xml.paragraph_count(), "parsed docx part");
            paragraph_index.extend((0..xml.paragraph_count()).map(|p| (parts.len(), p)));
            parts.push(Part { entry, xml });
        }

        Ok(Self {
            entries,
            parts,
            paragraph_index,
        })
    }

    /// 重新打包；沒有改寫的 part 保留原始位元組
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (i, entry) in self.entries.iter().enumerate() {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                writer.add_directory(entry.name.as_str(), options)?;
                continue;
            }

            writer.start_file(entry.name.as_str(), options)?;
            match self.parts.iter().find(|part| part.entry == i) {
                Some(part) if part.xml.is_dirty() => writer.write_all(&part.xml.to_xml()?)?,
                _ => writer.write_all(&entry.data)?,
            }
        }
        Ok(writer.finish()?.into_inner())
    }

    /// zip 項目名稱，依封存順序
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }
}

impl RunDocument for DocxPackage {
    fn paragraphs(&self) -> Vec<Vec<String>> {
        self.parts
            .iter()
            .flat_map(|part| part.xml.paragraphs())
            .collect()
    }

    fn rewrite_runs(&mut self, edits: Vec<RunEdit>) -> Result<()> {
        for RunEdit { run, text } in edits {
            let &(part, paragraph) =
                self.paragraph_index
                    .get(run.paragraph)
                    .ok_or(Error::RunNotFound {
                        paragraph: run.paragraph,
                        run: run.run,
                    })?;
            self.parts[part]
                .xml
                .set_run_text(paragraph, run.run, text)
                .map_err(|_| Error::RunNotFound {
                    paragraph: run.paragraph,
                    run: run.run,
                })?;
        }
        Ok(())
    }
}
