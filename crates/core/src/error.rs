//! Defines the "bad template" error taxonomy shared by every stage of the engine.

use std::path::PathBuf;

use svglabel_script::ScriptError;
use svglabel_svg::SvgError;
use svglabel_units::UnitError;
use thiserror::Error;

/// The main error enum for template loading, rendering and layout.
///
/// Every variant is fatal: a failing row aborts the whole page.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("No init block (text starting with '{0}') found")]
    MissingInitBlock(String),

    #[error("Found {count} init blocks (text starting with '{marker}'), expected exactly one")]
    MultipleInitBlocks { marker: String, count: usize },

    #[error("The init block does not define 'sheet'")]
    MissingSheet,

    #[error("'sheet' must be a LabelSheet, got {0}")]
    SheetType(String),

    #[error("Invalid LabelSheet: {0}")]
    InvalidSheet(String),

    #[error("Template svg is missing {0}")]
    MissingDimension(&'static str),

    #[error("Unsupported viewBox '{0}': expected four numbers with a zero origin")]
    ViewBox(String),

    #[error("Cannot have {0} command blocks in the same group")]
    AmbiguousCommand(usize),

    #[error("Command block must evaluate to a replacer, got {got}, in '{code}'")]
    ReplacerType { got: String, code: String },

    #[error("{replacer} expects a single rect, got {got:?}")]
    ExpectedSingleRect { replacer: String, got: Vec<String> },

    #[error("Content overflowed its area: {0}")]
    Overflow(String),

    #[error("Table has {rows} rows, more than the {capacity} labels per sheet")]
    PageOverflow { capacity: usize, rows: usize },

    #[error("No matrix encoder registered for '{0}'")]
    MissingEncoder(String),

    #[error("Failed to encode '{data}' as {symbology}: {message}")]
    Encoding {
        symbology: String,
        data: String,
        message: String,
    },

    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Failed to load '{}': {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: SvgError,
    },

    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    #[error("Length error: {0}")]
    Unit(#[from] UnitError),

    #[error("SVG error: {0}")]
    Svg(#[from] SvgError),
}
