use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid docx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed document xml: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("document part `{0}` is not valid utf-8")]
    Utf8(String),

    #[error("docx package has no `{0}` part")]
    MissingPart(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid yrs update: {0}")]
    YrsUpdate(String),

    #[error("run {run} of paragraph {paragraph} does not exist")]
    RunNotFound { paragraph: usize, run: usize },
}
