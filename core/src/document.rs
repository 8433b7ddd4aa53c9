use std::path::{Path, PathBuf};
use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::config::FillOptions;
use crate::docx::DocxPackage;
use crate::editor::YrsDocument;
use crate::error::{Error, Result};
use crate::model::{RunEdit, RunId};

/// 以「段落 → 文字 run」來看待的文檔
///
/// 把一個段落的 run 依序串接，必須逐位元組還原段落的可見文字。
pub trait RunDocument {
    /// 依段落分組的 run 文字，段落與 run 皆依文檔順序
    fn paragraphs(&self) -> Vec<Vec<String>>;

    /// 替換指定 run 的文字，其餘 run 不變
    fn rewrite_runs(&mut self, edits: Vec<RunEdit>) -> Result<()>;
}

// ============================================================================
// In-memory document
// ============================================================================

/// 純記憶體的段落與 run，給自行管理文檔模型的呼叫端使用
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    paragraphs: Vec<Vec<String>>,
    writes: usize,
}

impl MemoryDocument {
    pub fn new<S: Into<String>>(paragraphs: Vec<Vec<S>>) -> Self {
        Self {
            paragraphs: paragraphs
                .into_iter()
                .map(|runs| runs.into_iter().map(Into::into).collect())
                .collect(),
            writes: 0,
        }
    }

    pub fn runs(&self, paragraph: usize) -> Vec<String> {
        self.paragraphs.get(paragraph).cloned().unwrap_or_default()
    }

    pub fn paragraph_text(&self, paragraph: usize) -> String {
        self.runs(paragraph).concat()
    }

    /// 目前為止套用過的 run 改寫次數
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl RunDocument for MemoryDocument {
    fn paragraphs(&self) -> Vec<Vec<String>> {
        self.paragraphs.clone()
    }

    fn rewrite_runs(&mut self, edits: Vec<RunEdit>) -> Result<()> {
        for RunEdit { run, text } in edits {
            let RunId { paragraph, run } = run;
            let slot = self
                .paragraphs
                .get_mut(paragraph)
                .and_then(|runs| runs.get_mut(run))
                .ok_or(Error::RunNotFound { paragraph, run })?;
            *slot = text;
            self.writes += 1;
        }
        Ok(())
    }
}

// ============================================================================
// File formats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DocumentFormat {
    /// WordprocessingML 套件
    Docx,
    /// 內含整份 yrs 文檔的 Yjs v1 update
    #[strum(to_string = "ydoc", serialize = "yrs")]
    Ydoc,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(path.display().to_string()))?;
        Self::from_str(extension).map_err(|_| Error::UnsupportedFormat(extension.to_owned()))
    }
}

/// 已載入的文檔，任何支援的格式
pub enum Document {
    Docx(DocxPackage),
    Ydoc(YrsDocument),
}

impl Document {
    pub fn from_bytes(format: DocumentFormat, bytes: &[u8], options: &FillOptions) -> Result<Self> {
        Ok(match format {
            DocumentFormat::Docx => {
                Self::Docx(DocxPackage::from_bytes(bytes, options.include_headers_footers)?)
            }
            DocumentFormat::Ydoc => Self::Ydoc(YrsDocument::from_update(bytes, &options.fragment)?),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Docx(package) => package.to_bytes(),
            Self::Ydoc(doc) => Ok(doc.encode_update()),
        }
    }

    pub async fn load(path: &Path, options: &FillOptions) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!(path = %path.display(), %format, size = bytes.len(), "loaded document");
        Self::from_bytes(format, &bytes, options)
    }

    /// 先寫入 `path` 旁的暫存檔再改名覆蓋，存檔失敗時不會留下任何檔案
    pub async fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let staging = staging_path(path);
        let written = match tokio::fs::write(&staging, &bytes).await {
            Ok(()) => tokio::fs::rename(&staging, path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&staging).await {
                tracing::debug!(path = %staging.display(), "staging file not removed: {cleanup}");
            }
            return Err(e.into());
        }
        tracing::debug!(path = %path.display(), size = bytes.len(), "saved document");
        Ok(())
    }
}

impl RunDocument for Document {
    fn paragraphs(&self) -> Vec<Vec<String>> {
        match self {
            Self::Docx(package) => package.paragraphs(),
            Self::Ydoc(doc) => doc.paragraphs(),
        }
    }

    fn rewrite_runs(&mut self, edits: Vec<RunEdit>) -> Result<()> {
        match self {
            Self::Docx(package) => package.rewrite_runs(edits),
            Self::Ydoc(doc) => doc.rewrite_runs(edits),
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
