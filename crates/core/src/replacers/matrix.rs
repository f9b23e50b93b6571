//! 2D matrix symbologies (QR, DataMatrix) drawn from pluggable encoders.
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

use svglabel_svg::Element;
use svglabel_units::LengthDimension;

use crate::error::TemplateError;
use crate::geometry::{Align, px_string};
use crate::render::RenderContext;
use crate::replacer::{RectArea, RectReplacer};

/// A module matrix, indexed `[row][column]`, where `true` is a dark module.
pub type ModuleMatrix = Vec<Vec<bool>>;

/// Encodes data into a module matrix for one symbology.
///
/// The matrix should not include a quiet zone; replacers add one on request.
pub trait MatrixEncoder {
    fn encode(&self, data: &str) -> Result<ModuleMatrix, String>;
}

/// Encoders keyed by symbology name (`"qr"`, `"datamatrix"`).
#[derive(Default)]
pub struct MatrixEncoders {
    encoders: HashMap<String, Box<dyn MatrixEncoder>>,
}

impl MatrixEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, encoder: Box<dyn MatrixEncoder>) {
        self.encoders.insert(name.into(), encoder);
    }

    pub fn get(&self, name: &str) -> Option<&dyn MatrixEncoder> {
        self.encoders.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.encoders.contains_key(name)
    }
}

impl fmt::Debug for MatrixEncoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.encoders.keys().collect();
        names.sort();
        f.debug_struct("MatrixEncoders").field("encoders", &names).finish()
    }
}

/// The supported matrix symbologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbology {
    Qr,
    DataMatrix,
}

impl Symbology {
    /// The registry key of the encoder for this symbology.
    pub fn encoder_name(self) -> &'static str {
        match self {
            Symbology::Qr => "qr",
            Symbology::DataMatrix => "datamatrix",
        }
    }

    fn replacer_name(self) -> &'static str {
        match self {
            Symbology::Qr => "QrCode",
            Symbology::DataMatrix => "DataMatrix",
        }
    }
}

/// A QR code or DataMatrix, one module per `size`.
#[derive(Debug, Clone)]
pub struct MatrixCode {
    pub symbology: Symbology,
    pub data: String,
    pub size: LengthDimension,
    pub align: Align,
    pub fill: String,
    /// Quiet-zone modules added on every side.
    pub border: usize,
}

impl MatrixCode {
    fn encode(&self, ctx: &RenderContext<'_>) -> Result<ModuleMatrix, TemplateError> {
        let name = self.symbology.encoder_name();
        let encoder = ctx
            .encoders
            .get(name)
            .ok_or_else(|| TemplateError::MissingEncoder(name.to_string()))?;
        encoder.encode(&self.data).map_err(|message| TemplateError::Encoding {
            symbology: self.symbology.replacer_name().to_string(),
            data: self.data.clone(),
            message,
        })
    }
}

/// Path data covering the dark modules, one subpath per horizontal run, in module units.
fn matrix_path(matrix: &ModuleMatrix, border: usize) -> String {
    let mut d = String::new();
    for (y, row) in matrix.iter().enumerate() {
        let mut x = 0;
        while x < row.len() {
            if !row[x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < row.len() && row[x] {
                x += 1;
            }
            let run = x - start;
            let _ = write!(
                d,
                "M{},{}h{}v1h-{}z",
                start + border,
                y + border,
                run,
                run
            );
        }
    }
    d
}

impl RectReplacer for MatrixCode {
    fn name(&self) -> &'static str {
        self.symbology.replacer_name()
    }

    fn process_rect(&self, ctx: &RenderContext<'_>, rect: &RectArea) -> Result<Vec<Element>, TemplateError> {
        let matrix = self.encode(ctx)?;
        let rows = matrix.len() + 2 * self.border;
        let columns = matrix.iter().map(Vec::len).max().unwrap_or(0) + 2 * self.border;

        let symbol = (self.size * columns as f64, self.size * rows as f64);
        if symbol.0 > rect.width || symbol.1 > rect.height {
            return Err(TemplateError::Overflow(format!(
                "{} '{}' with {}x{} matrix needs {} x {}, area is {} x {}",
                self.name(),
                self.data,
                columns,
                rows,
                symbol.0,
                symbol.1,
                rect.width,
                rect.height
            )));
        }

        let (align_x, align_y) = self.align.offset(symbol, rect.size());
        let x = rect.x + align_x;
        let y = rect.y + align_y;
        let path = Element::svg("path")
            .with_attr("d", matrix_path(&matrix, self.border))
            .with_attr(
                "transform",
                format!(
                    "translate({} {}) scale({})",
                    px_string(x.to_px()),
                    px_string(y.to_px()),
                    px_string(self.size.to_px())
                ),
            )
            .with_attr("fill", self.fill.as_str());
        Ok(vec![path])
    }
}
