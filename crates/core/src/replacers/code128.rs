//! Code 128 linear barcodes.
use svglabel_svg::Element;
use svglabel_units::LengthDimension;

use crate::error::TemplateError;
use crate::geometry::Align;
use crate::render::RenderContext;
use crate::replacer::{RectArea, RectReplacer};

/// Bar and space widths, in modules, for each symbol value.
/// Values 103..=105 are the start codes for sets A, B and C.
const PATTERNS: [[u8; 6]; 106] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3],
    [1, 2, 1, 3, 2, 2], [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2],
    [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3], [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2],
    [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1], [1, 1, 3, 2, 2, 2],
    [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1],
    [3, 1, 1, 2, 2, 2], [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2],
    [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1], [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1],
    [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3], [1, 3, 1, 3, 2, 1],
    [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1],
    [1, 3, 2, 1, 3, 1], [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1],
    [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1], [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3],
    [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3], [3, 1, 1, 3, 2, 1],
    [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4],
    [1, 1, 1, 4, 2, 2], [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2],
    [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4], [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4],
    [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1], [2, 4, 1, 2, 1, 1],
    [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2],
    [1, 2, 4, 1, 1, 2], [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2],
    [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1], [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1],
    [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1], [1, 1, 4, 1, 1, 3],
    [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2],
    [2, 1, 1, 2, 1, 4], [2, 1, 1, 2, 3, 2],
];

const STOP: [u8; 7] = [2, 3, 3, 1, 1, 1, 2];
const START_B: usize = 104;
const START_C: usize = 105;
const QUIET_MODULES: u8 = 10;

/// Encodes `data` into symbol values, start code and checksum included.
///
/// All-digit data of even length uses code set C (two digits per symbol);
/// anything else uses code set B, which covers printable ASCII.
fn encode_values(data: &str) -> Result<Vec<usize>, String> {
    if data.is_empty() {
        return Err("no data to encode".to_string());
    }
    let bytes = data.as_bytes();
    let mut values = if bytes.len() % 2 == 0 && bytes.iter().all(u8::is_ascii_digit) {
        let mut values = vec![START_C];
        values.extend(
            bytes
                .chunks(2)
                .map(|pair| usize::from(pair[0] - b'0') * 10 + usize::from(pair[1] - b'0')),
        );
        values
    } else {
        let mut values = vec![START_B];
        for c in data.chars() {
            match u32::from(c) {
                code @ 32..=127 => values.push(code as usize - 32),
                _ => return Err(format!("character {:?} is not in code set B", c)),
            }
        }
        values
    };

    let checksum = values
        .iter()
        .enumerate()
        .map(|(i, v)| i.max(1) * v)
        .sum::<usize>()
        % 103;
    values.push(checksum);
    Ok(values)
}

/// The alternating bar/space widths of the full symbol, starting with a bar.
pub fn module_widths(data: &str) -> Result<Vec<u8>, String> {
    let values = encode_values(data)?;
    let mut widths: Vec<u8> = values.iter().flat_map(|v| PATTERNS[*v]).collect();
    widths.extend(STOP);
    Ok(widths)
}

#[derive(Debug, Clone)]
pub struct Code128 {
    pub data: String,
    /// Width of one module.
    pub thickness: LengthDimension,
    pub quiet: bool,
    pub fill: String,
    pub align: Align,
}

impl RectReplacer for Code128 {
    fn name(&self) -> &'static str {
        "Code128"
    }

    fn process_rect(&self, _ctx: &RenderContext<'_>, rect: &RectArea) -> Result<Vec<Element>, TemplateError> {
        let mut widths = module_widths(&self.data).map_err(|message| TemplateError::Encoding {
            symbology: self.name().to_string(),
            data: self.data.clone(),
            message,
        })?;
        let quiet = if self.quiet { QUIET_MODULES } else { 0 };

        let modules = widths.iter().map(|w| u32::from(*w)).sum::<u32>() + 2 * u32::from(quiet);
        let total = self.thickness * f64::from(modules);
        if total > rect.width {
            return Err(TemplateError::Overflow(format!(
                "{} '{}' needs {}, area is {}",
                self.name(),
                self.data,
                total,
                rect.width
            )));
        }

        let (align_x, _) = self.align.offset((total, rect.height), rect.size());
        let mut position = rect.x + align_x + self.thickness * f64::from(quiet);
        let mut bars = Vec::with_capacity(widths.len() / 2 + 1);
        for (i, width) in widths.drain(..).enumerate() {
            let width = self.thickness * f64::from(width);
            if i % 2 == 0 {
                bars.push(
                    Element::svg("rect")
                        .with_attr("x", position.to_svg_string())
                        .with_attr("y", rect.y.to_svg_string())
                        .with_attr("width", width.to_svg_string())
                        .with_attr("height", rect.height.to_svg_string())
                        .with_attr("fill", self.fill.as_str()),
                );
            }
            position = position + width;
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svglabel_units::LengthUnit;

    #[test]
    fn test_patterns_are_eleven_modules() {
        for (value, pattern) in PATTERNS.iter().enumerate() {
            assert_eq!(pattern.iter().map(|w| u32::from(*w)).sum::<u32>(), 11, "value {}", value);
        }
        assert_eq!(STOP.iter().map(|w| u32::from(*w)).sum::<u32>(), 13);
    }

    #[test]
    fn test_code_set_b() {
        // start B, 'A' = 33, checksum (104 + 33) % 103 = 34
        assert_eq!(encode_values("A").unwrap(), vec![104, 33, 34]);
        // (104 + 1 * 34 + 2 * 35) % 103 = 2
        assert_eq!(encode_values("BC").unwrap(), vec![104, 34, 35, 2]);
    }

    #[test]
    fn test_code_set_c_for_even_digits() {
        // (105 + 12 + 2 * 34) % 103 = 82
        assert_eq!(encode_values("1234").unwrap(), vec![105, 12, 34, 82]);
        // odd length falls back to set B
        assert_eq!(encode_values("123").unwrap()[0], START_B);
    }

    #[test]
    fn test_rejects_unencodable() {
        assert!(encode_values("").is_err());
        assert!(encode_values("é").is_err());
    }

    #[test]
    fn test_module_widths_length() {
        // start + 1 data + checksum, 6 elements each, plus the 7 element stop
        assert_eq!(module_widths("A").unwrap().len(), 3 * 6 + 7);
    }

    fn area(width: f64) -> RectArea {
        let mm = |v| LengthDimension::new(v, LengthUnit::Millimeter);
        RectArea {
            x: mm(0.0),
            y: mm(0.0),
            width: mm(width),
            height: mm(10.0),
            element: Element::svg("rect"),
        }
    }

    fn code(data: &str) -> Code128 {
        Code128 {
            data: data.to_string(),
            thickness: LengthDimension::new(0.5, LengthUnit::Millimeter),
            quiet: true,
            fill: "#000000".to_string(),
            align: Align::Left,
        }
    }

    fn bars(code: &Code128, width: f64) -> Result<Vec<Element>, TemplateError> {
        let interpreter = svglabel_script::Interpreter::default();
        let markers = crate::config::Markers::default();
        let encoders = crate::replacers::matrix::MatrixEncoders::default();
        let ctx = RenderContext {
            interpreter: &interpreter,
            markers: &markers,
            encoders: &encoders,
            base_dir: std::path::PathBuf::from("."),
        };
        code.process_rect(&ctx, &area(width))
    }

    #[test]
    fn test_draws_one_rect_per_bar() {
        // 3 symbols of 3 bars each, plus 4 bars in the stop pattern
        let bars = bars(&code("A"), 100.0).unwrap();
        assert_eq!(bars.len(), 13);
        // first bar starts after the quiet zone: 10 modules of 0.5mm
        assert_eq!(bars[0].attr("x"), Some("5mm"));
        assert_eq!(bars[0].attr("width"), Some("1mm"));
        assert_eq!(bars[0].attr("height"), Some("10mm"));
        assert_eq!(bars[0].attr("fill"), Some("#000000"));
    }

    #[test]
    fn test_overflow() {
        // 35 symbol modules + 20 quiet modules = 27.5mm
        assert!(bars(&code("A"), 27.5).is_ok());
        assert!(matches!(bars(&code("A"), 27.0), Err(TemplateError::Overflow(_))));
    }
}
