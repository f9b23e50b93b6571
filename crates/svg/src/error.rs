use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvgError {
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("XML write error: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("document root is not svg, got {0}")]
    NotSvg(String),
}
