//! The domain objects label scripts can create and pass around.
use svglabel_script::{HostValue, Scope, Value};
use svglabel_units::AreaDimension;

use crate::geometry::{Align, Scaling};
use crate::replacer::Replacer;
use crate::sheet::LabelSheet;

/// Host values of label scripts.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelValue {
    Sheet(LabelSheet),
    Replacer(Replacer),
}

pub type ScriptValue = Value<LabelValue>;
pub type LabelScope = Scope<LabelValue>;

impl HostValue for LabelValue {
    fn type_name(&self) -> &'static str {
        match self {
            LabelValue::Sheet(_) => "LabelSheet",
            LabelValue::Replacer(replacer) => replacer.name(),
        }
    }

    fn attribute(&self, name: &str) -> Option<ScriptValue> {
        let LabelValue::Sheet(sheet) = self else {
            return None;
        };
        let pair = |(a, b): AreaDimension| Value::Tuple(vec![Value::Length(a), Value::Length(b)]);
        match name {
            "page" => Some(pair(sheet.page())),
            "space" => Some(pair(sheet.space())),
            "count" => Some(Value::Tuple(vec![
                Value::Number(sheet.columns() as f64),
                Value::Number(sheet.rows() as f64),
            ])),
            "flip_x" => Some(Value::Bool(sheet.flip_x())),
            "labels_per_sheet" => Some(Value::Number(sheet.labels_per_sheet() as f64)),
            _ => None,
        }
    }
}

impl From<LabelSheet> for ScriptValue {
    fn from(sheet: LabelSheet) -> Self {
        Value::Host(LabelValue::Sheet(sheet))
    }
}

impl From<Replacer> for ScriptValue {
    fn from(replacer: Replacer) -> Self {
        Value::Host(LabelValue::Replacer(replacer))
    }
}

/// A fresh scope with the unit constants plus the `Scaling` and `Align` name tables,
/// so scripts can write `Scaling.FIT` or `Align.TOP_LEFT`.
pub fn prelude() -> LabelScope {
    let mut scope = Scope::with_prelude();
    let scaling = [Scaling::None, Scaling::Fit]
        .into_iter()
        .map(|s| (s.name().to_uppercase(), Value::str(s.name())));
    scope.set("Scaling", named_table(scaling));

    // BOT_LEFT, BOT, BOT_RIGHT alias the BOTTOM_* names
    let align = Align::NAMES.iter().flat_map(|&(name, _)| {
        let short = name.strip_prefix("bottom").map(|rest| format!("BOT{}", rest.to_uppercase()));
        std::iter::once(name.to_uppercase())
            .chain(short)
            .map(move |key| (key, Value::str(name)))
    });
    scope.set("Align", named_table(align));
    scope
}

fn named_table(entries: impl Iterator<Item = (String, ScriptValue)>) -> ScriptValue {
    Value::dict(entries.map(|(k, v)| (Value::Str(k), v)).collect())
}
