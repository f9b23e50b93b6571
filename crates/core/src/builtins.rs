//! Script functions that construct label domain objects: the sheet and the replacers.
use svglabel_script::{Arguments, FunctionRegistry, ScriptError, Value};
use svglabel_units::AreaDimension;

use crate::geometry::{Align, Scaling};
use crate::host::{LabelValue, ScriptValue};
use crate::replacer::Replacer;
use crate::replacers::{
    Code128, Compose, DimensionModifier, Env, Hide, MatrixCode, StyleModifier, Subtemplate,
    SubtemplateArray, SvgImage, Symbology,
};
use crate::sheet::LabelSheet;

type Args = Arguments<LabelValue>;
type ScriptResult = Result<ScriptValue, ScriptError>;

/// Adds the label vocabulary to a script function registry.
pub fn register(functions: &mut FunctionRegistry<LabelValue>) {
    functions.register("LabelSheet", label_sheet);
    functions.register("Code128", code128);
    functions.register("QrCode", qr_code);
    functions.register("DataMatrix", data_matrix);
    functions.register("Svg", svg);
    functions.register("Subtemplate", subtemplate);
    functions.register("SubtemplateArray", subtemplate_array);
    functions.register("StyleModifier", style_modifier);
    functions.register("FillColor", fill_color);
    functions.register("StrokeColor", stroke_color);
    functions.register("TextColor", text_color);
    functions.register("DimensionModifier", dimension_modifier);
    functions.register("Hide", hide);
    functions.register("Compose", compose);
}

// --- Argument conversions ---

fn area(args: &mut Args, name: &str) -> Result<AreaDimension, ScriptError> {
    let value = args.required(name)?;
    let lengths = value
        .as_pair()
        .and_then(|(a, b)| Ok((a.as_length()?, b.as_length()?)));
    lengths.map_err(|e| args.error(format!("argument '{}' must be a pair of lengths: {}", name, e)))
}

fn align_arg(args: &mut Args) -> Result<Align, ScriptError> {
    let name = args.optional_str("align", Align::default().name())?;
    name.parse().map_err(|e: String| args.error(e))
}

fn scaling_arg(args: &mut Args) -> Result<Scaling, ScriptError> {
    let name = args.optional_str("scaling", Scaling::default().name())?;
    name.parse().map_err(|e: String| args.error(e))
}

/// A filename argument that may be `none`.
fn optional_filename(args: &mut Args) -> Result<Option<String>, ScriptError> {
    match args.required("filename")? {
        Value::None => Ok(None),
        Value::Str(s) => Ok(Some(s)),
        other => Err(args.error(format!(
            "argument 'filename' must be a str or none, got {}",
            other.type_name()
        ))),
    }
}

/// Subtemplate variables from a dict with string keys.
fn env_arg(args: &Args, value: &ScriptValue) -> Result<Env, ScriptError> {
    let Value::Dict(entries) = value else {
        return Err(args.error(format!("env must be a dict, got {}", value.type_name())));
    };
    entries
        .iter()
        .map(|(key, value)| match key {
            Value::Str(name) => Ok((name.clone(), value.clone())),
            other => Err(args.error(format!("env keys must be str, got {}", other.type_name()))),
        })
        .collect()
}

fn replacer(args: &Args, value: ScriptValue) -> Result<Replacer, ScriptError> {
    match value {
        Value::Host(LabelValue::Replacer(replacer)) => Ok(replacer),
        other => Err(args.error(format!("expected a replacer, got {}", other.type_name()))),
    }
}

// --- Constructors ---

fn label_sheet(args: &mut Args) -> ScriptResult {
    let page = area(args, "page")?;
    let space = area(args, "space")?;
    let count = args.required("count")?;
    let flip_x = args.optional_bool("flip_x", false);
    args.finish()?;

    let (columns, rows) = count
        .as_pair()
        .and_then(|(c, r)| Ok((c.as_count()?, r.as_count()?)))
        .map_err(|e| args.error(format!("argument 'count': {}", e)))?;
    let sheet = LabelSheet::new(page, space, (columns, rows), flip_x).map_err(|e| args.error(e.to_string()))?;
    Ok(sheet.into())
}

fn code128(args: &mut Args) -> ScriptResult {
    let data = args.required_str("data")?;
    let thickness = args.required_length("thickness")?;
    let quiet = args.optional_bool("quiet", true);
    let fill = args.optional_str("fill", "#000000")?;
    let align = align_arg(args)?;
    args.finish()?;
    Ok(Replacer::rect(Code128 {
        data,
        thickness,
        quiet,
        fill,
        align,
    })
    .into())
}

fn matrix_code(args: &mut Args, symbology: Symbology, default_border: usize) -> ScriptResult {
    let data = args.required_str("data")?;
    let size = args.required_length("size")?;
    let align = align_arg(args)?;
    let fill = args.optional_str("fill", "#000000")?;
    let border = match args.optional("border") {
        Some(value) => value.as_count()?,
        None => default_border,
    };
    args.finish()?;
    Ok(Replacer::rect(MatrixCode {
        symbology,
        data,
        size,
        align,
        fill,
        border,
    })
    .into())
}

fn qr_code(args: &mut Args) -> ScriptResult {
    matrix_code(args, Symbology::Qr, 4)
}

fn data_matrix(args: &mut Args) -> ScriptResult {
    matrix_code(args, Symbology::DataMatrix, 1)
}

fn svg(args: &mut Args) -> ScriptResult {
    let filename = args.required_str("filename")?;
    let scaling = scaling_arg(args)?;
    let align = align_arg(args)?;
    args.finish()?;
    Ok(Replacer::rect(SvgImage {
        filename,
        scaling,
        align,
    })
    .into())
}

fn subtemplate(args: &mut Args) -> ScriptResult {
    let filename = optional_filename(args)?;
    let env = match args.optional("env") {
        Some(value) => env_arg(args, &value)?,
        None => Env::new(),
    };
    let scaling = scaling_arg(args)?;
    let align = align_arg(args)?;
    args.finish()?;
    Ok(Replacer::rect(Subtemplate {
        filename,
        env,
        scaling,
        align,
    })
    .into())
}

fn subtemplate_array(args: &mut Args) -> ScriptResult {
    let filename = optional_filename(args)?;
    let elements = args
        .required("elements")?
        .as_sequence()?
        .iter()
        .map(|element| {
            let (position, element_env) = element.as_pair()?;
            Ok((position.as_number()?, env_arg(args, &element_env)?))
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;
    let vertical = args.optional_bool("vertical", false);
    let scaling = scaling_arg(args)?;
    let align = align_arg(args)?;
    args.finish()?;
    Ok(Replacer::rect(SubtemplateArray {
        filename,
        elements,
        vertical,
        scaling,
        align,
    })
    .into())
}

fn style_modifier(args: &mut Args) -> ScriptResult {
    let property = args.required_str("name")?;
    let value = args.required_str("value")?;
    args.finish()?;
    Ok(Replacer::group(StyleModifier::new(property, value)).into())
}

fn color(args: &mut Args, make: fn(String) -> StyleModifier) -> ScriptResult {
    let color = args.required_str("color")?;
    args.finish()?;
    Ok(Replacer::group(make(color)).into())
}

fn fill_color(args: &mut Args) -> ScriptResult {
    color(args, |c| StyleModifier::fill(c))
}

fn stroke_color(args: &mut Args) -> ScriptResult {
    color(args, |c| StyleModifier::stroke(c))
}

fn text_color(args: &mut Args) -> ScriptResult {
    color(args, |c| StyleModifier::text_color(c))
}

fn dimension_modifier(args: &mut Args) -> ScriptResult {
    let value = args.required("attributes")?;
    args.finish()?;
    let attributes = env_arg(args, &value)?
        .into_iter()
        .map(|(name, length)| Ok((name, length.as_length()?)))
        .collect::<Result<Vec<_>, ScriptError>>()?;
    Ok(Replacer::group(DimensionModifier { attributes }).into())
}

fn hide(args: &mut Args) -> ScriptResult {
    let hidden = args.required("cond")?.is_truthy();
    args.finish()?;
    Ok(Replacer::group(Hide { hidden }).into())
}

fn compose(args: &mut Args) -> ScriptResult {
    let replacers = args
        .rest()
        .into_iter()
        .map(|value| replacer(args, value))
        .collect::<Result<Vec<_>, ScriptError>>()?;
    args.finish()?;
    Ok(Replacer::group(Compose { replacers }).into())
}
