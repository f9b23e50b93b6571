use svglabel_core::TemplateError;
use svglabel_svg::SvgError;
use thiserror::Error;

/// A comprehensive error type for loading, rendering and writing label sheets.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("SVG error: {0}")]
    Svg(#[from] SvgError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
