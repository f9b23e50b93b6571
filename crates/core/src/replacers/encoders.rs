//! The built-in matrix encoders, backed by the `qrcode` and `datamatrix` crates.
use datamatrix::{DataMatrix, SymbolList};
use qrcode::{Color, QrCode};

use super::matrix::{MatrixEncoder, MatrixEncoders, ModuleMatrix};

/// QR codes at error correction level M, in the smallest version that fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl MatrixEncoder for QrEncoder {
    fn encode(&self, data: &str) -> Result<ModuleMatrix, String> {
        let code = QrCode::new(data.as_bytes()).map_err(|e| e.to_string())?;
        let width = code.width();
        let colors = code.to_colors();
        Ok(colors
            .chunks(width)
            .map(|row| row.iter().map(|c| *c == Color::Dark).collect())
            .collect())
    }
}

/// ECC 200 DataMatrix in the smallest square or rectangular symbol that fits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataMatrixEncoder;

impl MatrixEncoder for DataMatrixEncoder {
    fn encode(&self, data: &str) -> Result<ModuleMatrix, String> {
        let code = DataMatrix::encode(data.as_bytes(), SymbolList::default())
            .map_err(|e| format!("{:?}", e))?;
        let bitmap = code.bitmap();
        let mut matrix = vec![vec![false; bitmap.width()]; bitmap.height()];
        for (x, y) in bitmap.pixels() {
            if let Some(module) = matrix.get_mut(y).and_then(|row| row.get_mut(x)) {
                *module = true;
            }
        }
        Ok(matrix)
    }
}

impl MatrixEncoders {
    /// A registry holding the built-in `"qr"` and `"datamatrix"` encoders.
    pub fn with_defaults() -> Self {
        let mut encoders = Self::new();
        encoders.register("qr", Box::new(QrEncoder));
        encoders.register("datamatrix", Box::new(DataMatrixEncoder));
        encoders
    }
}
