//! Defines the registry and built-in implementations for script functions.
use std::collections::{HashMap, VecDeque};

use log::info;

use crate::error::ScriptError;
use crate::value::{HostValue, Value, generated_len, type_error};

/// The signature for a script function implementation.
pub type ScriptFunction<H> = fn(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError>;

/// The evaluated arguments of one call.
///
/// Parameters are consumed in declaration order with [`Arguments::next`]: a
/// positional argument is used if one is left, otherwise the keyword argument of
/// that name. [`Arguments::finish`] rejects anything not consumed.
#[derive(Debug)]
pub struct Arguments<H: HostValue> {
    function: String,
    positional: VecDeque<Value<H>>,
    keywords: Vec<(String, Value<H>)>,
}

impl<H: HostValue> Arguments<H> {
    pub fn new(
        function: impl Into<String>,
        positional: Vec<Value<H>>,
        keywords: Vec<(String, Value<H>)>,
    ) -> Self {
        Self {
            function: function.into(),
            positional: positional.into(),
            keywords,
        }
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// An error attributed to this call.
    pub fn error(&self, message: impl Into<String>) -> ScriptError {
        ScriptError::Argument {
            function: self.function.clone(),
            message: message.into(),
        }
    }

    /// Takes the next parameter, if given.
    pub fn next(&mut self, name: &str) -> Option<Value<H>> {
        if let Some(value) = self.positional.pop_front() {
            return Some(value);
        }
        let index = self.keywords.iter().position(|(k, _)| k == name)?;
        Some(self.keywords.remove(index).1)
    }

    pub fn required(&mut self, name: &str) -> Result<Value<H>, ScriptError> {
        self.next(name)
            .ok_or_else(|| self.error(format!("missing required argument '{}'", name)))
    }

    /// Takes the next parameter, treating an explicit `none` as absent.
    pub fn optional(&mut self, name: &str) -> Option<Value<H>> {
        self.next(name).filter(|v| !v.is_none())
    }

    /// All remaining positional arguments.
    pub fn rest(&mut self) -> Vec<Value<H>> {
        self.positional.drain(..).collect()
    }

    /// All remaining keyword arguments.
    pub fn rest_keywords(&mut self) -> Vec<(String, Value<H>)> {
        std::mem::take(&mut self.keywords)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Fails if any argument was not consumed.
    pub fn finish(&self) -> Result<(), ScriptError> {
        if let Some((name, _)) = self.keywords.first() {
            return Err(self.error(format!("unexpected keyword argument '{}'", name)));
        }
        if !self.positional.is_empty() {
            return Err(self.error(format!(
                "{} unexpected positional argument(s)",
                self.positional.len()
            )));
        }
        Ok(())
    }

    fn typed<T>(
        &mut self,
        name: &str,
        convert: impl FnOnce(&Value<H>) -> Result<T, ScriptError>,
    ) -> Result<T, ScriptError> {
        let value = self.required(name)?;
        convert(&value).map_err(|e| self.error(format!("argument '{}': {}", name, e)))
    }

    pub fn required_str(&mut self, name: &str) -> Result<String, ScriptError> {
        self.typed(name, |v| v.as_str().map(str::to_string))
    }

    pub fn required_number(&mut self, name: &str) -> Result<f64, ScriptError> {
        self.typed(name, Value::as_number)
    }

    pub fn required_length(&mut self, name: &str) -> Result<svglabel_units::LengthDimension, ScriptError> {
        self.typed(name, Value::as_length)
    }

    pub fn optional_str(&mut self, name: &str, default: &str) -> Result<String, ScriptError> {
        match self.optional(name) {
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .map_err(|e| self.error(format!("argument '{}': {}", name, e))),
            None => Ok(default.to_string()),
        }
    }

    pub fn optional_bool(&mut self, name: &str, default: bool) -> bool {
        self.optional(name).map_or(default, |v| v.is_truthy())
    }
}

/// A registry to hold all functions callable from scripts.
#[derive(Debug, Clone)]
pub struct FunctionRegistry<H: HostValue> {
    functions: HashMap<String, ScriptFunction<H>>,
}

impl<H: HostValue> FunctionRegistry<H> {
    /// Creates a new, empty function registry.
    pub fn new() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Registers a function, replacing any previous one of the same name.
    pub fn register(&mut self, name: &str, func: ScriptFunction<H>) {
        self.functions.insert(name.to_string(), func);
    }

    /// Finds a function by name (case-sensitive).
    pub fn get(&self, name: &str) -> Option<ScriptFunction<H>> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

// --- Built-in Function Implementations ---

fn str_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.next("value").unwrap_or_else(|| Value::str(""));
    args.finish()?;
    Ok(Value::Str(value.to_string()))
}

fn int_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.required("value")?;
    args.finish()?;
    let n = match &value {
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(|n| n as f64)
            .map_err(|_| args.error(format!("invalid literal for int: '{}'", s)))?,
        other => other.as_number()?.trunc(),
    };
    Ok(Value::Number(n))
}

fn float_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.required("value")?;
    args.finish()?;
    let n = match &value {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| args.error(format!("could not convert to float: '{}'", s)))?,
        Value::Length(l) => l.value,
        other => other.as_number()?,
    };
    Ok(Value::Number(n))
}

fn len_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.required("value")?;
    args.finish()?;
    let len = match &value {
        Value::Str(s) => s.chars().count(),
        Value::Tuple(items) => items.len(),
        Value::List(items) => items.borrow().len(),
        Value::Dict(entries) => entries.len(),
        other => return Err(args.error(format!("{} has no len()", other.type_name()))),
    };
    Ok(Value::Number(len as f64))
}

fn upper<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    args.finish()?;
    Ok(Value::Str(s.to_uppercase()))
}

fn lower<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    args.finish()?;
    Ok(Value::Str(s.to_lowercase()))
}

fn strip<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    let chars = args.optional("chars");
    args.finish()?;
    let stripped = match chars {
        Some(chars) => {
            let chars: Vec<char> = chars.as_str()?.chars().collect();
            s.trim_matches(chars.as_slice()).to_string()
        }
        None => s.trim().to_string(),
    };
    Ok(Value::Str(stripped))
}

fn replace<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    let old = args.required_str("old")?;
    let new = args.required_str("new")?;
    args.finish()?;
    Ok(Value::Str(s.replace(&old, &new)))
}

fn startswith<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    let prefix = args.required_str("prefix")?;
    args.finish()?;
    Ok(Value::Bool(s.starts_with(&prefix)))
}

fn endswith<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    let suffix = args.required_str("suffix")?;
    args.finish()?;
    Ok(Value::Bool(s.ends_with(&suffix)))
}

fn contains<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let container = args.required("container")?;
    let item = args.required("item")?;
    args.finish()?;
    let found = match &container {
        Value::Str(s) => s.contains(item.as_str()?),
        Value::Tuple(items) => items.contains(&item),
        Value::List(items) => items.borrow().contains(&item),
        Value::Dict(_) => container.get_item(&item)?.is_some(),
        other => return Err(args.error(format!("{} is not a container", other.type_name()))),
    };
    Ok(Value::Bool(found))
}

fn split<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required_str("s")?;
    let sep = args.optional("sep");
    args.finish()?;
    let parts: Vec<Value<H>> = match sep {
        Some(sep) => {
            let sep = sep.as_str()?;
            if sep.is_empty() {
                return Err(args.error("empty separator"));
            }
            s.split(sep).map(Value::from).collect()
        }
        None => s.split_whitespace().map(Value::from).collect(),
    };
    Ok(Value::list(parts))
}

fn join<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let sep = args.required_str("sep")?;
    let items = args.required("items")?.as_sequence()?;
    args.finish()?;
    let joined = items
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(&sep);
    Ok(Value::Str(joined))
}

fn zfill<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let s = args.required("s")?.to_string();
    let width = args.required("width")?.as_count()?;
    args.finish()?;
    let len = s.chars().count();
    if len >= width {
        return Ok(Value::Str(s));
    }
    let padding = "0".repeat(generated_len((width - len) as f64, "zfill padding")?);
    let filled = match s.strip_prefix(['-', '+']) {
        Some(digits) => format!("{}{}{}", &s[..1], padding, digits),
        None => format!("{}{}", padding, s),
    };
    Ok(Value::Str(filled))
}

/// Arguments to `min`/`max`: either several values or a single sequence.
fn extremum_candidates<H: HostValue>(args: &mut Arguments<H>) -> Result<Vec<Value<H>>, ScriptError> {
    let mut values = args.rest();
    args.finish()?;
    if values.len() == 1 {
        values = values.remove(0).as_sequence()?;
    }
    if values.is_empty() {
        return Err(args.error("expected at least one value"));
    }
    Ok(values)
}

fn min<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let values = extremum_candidates(args)?;
    let mut best = values[0].clone();
    for v in &values[1..] {
        if v.compare(&best)?.is_lt() {
            best = v.clone();
        }
    }
    Ok(best)
}

fn max<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let values = extremum_candidates(args)?;
    let mut best = values[0].clone();
    for v in &values[1..] {
        if v.compare(&best)?.is_gt() {
            best = v.clone();
        }
    }
    Ok(best)
}

fn abs<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.required("x")?;
    args.finish()?;
    match value {
        Value::Number(n) => Ok(Value::Number(n.abs())),
        Value::Length(l) => Ok(Value::Length(svglabel_units::LengthDimension::new(
            l.value.abs(),
            l.unit,
        ))),
        other => Err(type_error("number or length", &other)),
    }
}

fn round<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let value = args.required("x")?;
    let digits = match args.optional("ndigits") {
        Some(d) => d.as_number()? as i32,
        None => 0,
    };
    args.finish()?;
    let factor = 10f64.powi(digits);
    let round_to = |x: f64| (x * factor).round() / factor;
    match value {
        Value::Number(n) => Ok(Value::Number(round_to(n))),
        Value::Length(l) => Ok(Value::Length(svglabel_units::LengthDimension::new(
            round_to(l.value),
            l.unit,
        ))),
        other => Err(type_error("number or length", &other)),
    }
}

fn range<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let first = args.required_number("start")?;
    let second = args.optional("stop").map(|v| v.as_number()).transpose()?;
    let step = match args.optional("step") {
        Some(s) => s.as_number()?,
        None => 1.0,
    };
    args.finish()?;
    let (start, stop) = match second {
        Some(stop) => (first, stop),
        None => (0.0, first),
    };
    if step == 0.0 {
        return Err(args.error("step must not be zero"));
    }
    let count = ((stop - start) / step).ceil();
    let count = if count > 0.0 { generated_len(count, "range")? } else { 0 };
    let items = (0..count)
        .map(|i| Value::Number(start + i as f64 * step))
        .collect();
    Ok(Value::list(items))
}

/// `cond(c, a, b)`: `a` if `c` is truthy, else `b`. Both branches are already evaluated.
fn cond<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let test = args.required("condition")?;
    let if_true = args.required("if_true")?;
    let if_false = args.next("if_false").unwrap_or(Value::None);
    args.finish()?;
    Ok(if test.is_truthy() { if_true } else { if_false })
}

fn get<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let container = args.required("container")?;
    let key = args.required("key")?;
    let default = args.next("default").unwrap_or(Value::None);
    args.finish()?;
    Ok(container.get_item(&key)?.unwrap_or(default))
}

fn list<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let source = args.next("iterable");
    args.finish()?;
    let items = match source {
        None => Vec::new(),
        Some(Value::Str(s)) => s.chars().map(|c| Value::Str(c.to_string())).collect(),
        Some(Value::Dict(entries)) => entries.iter().map(|(k, _)| k.clone()).collect(),
        Some(other) => other.as_sequence()?,
    };
    Ok(Value::list(items))
}

/// `dict(pairs)` or `dict(key=value, ...)`, or both.
fn dict<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let mut entries: Vec<(Value<H>, Value<H>)> = Vec::new();
    let mut insert = |key: Value<H>, value: Value<H>| {
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    };
    // keywords are entries, so only a positional argument can be the pairs
    let keywords = args.rest_keywords();
    let pairs = args.next("pairs");
    args.finish()?;
    if let Some(pairs) = pairs {
        for pair in pairs.as_sequence()? {
            let (k, v) = pair.as_pair()?;
            insert(k, v);
        }
    }
    for (k, v) in keywords {
        insert(Value::Str(k), v);
    }
    Ok(Value::dict(entries))
}

/// Appends in place: every binding of the list sees the new item.
fn append<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let target = args.required("list")?;
    let item = args.required("item")?;
    args.finish()?;
    match target {
        Value::List(items) => {
            items.borrow_mut().push(item);
            Ok(Value::None)
        }
        other => Err(type_error("list", &other)),
    }
}

fn assert_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let test = args.required("condition")?;
    let message = args.next("message").map(|m| m.to_string()).unwrap_or_default();
    args.finish()?;
    if test.is_truthy() {
        Ok(Value::None)
    } else {
        Err(ScriptError::Assertion(message))
    }
}

fn log_fn<H: HostValue>(args: &mut Arguments<H>) -> Result<Value<H>, ScriptError> {
    let parts: Vec<String> = args.rest().iter().map(|v| v.to_string()).collect();
    args.finish()?;
    info!("{}", parts.join(" "));
    Ok(Value::None)
}

impl<H: HostValue> Default for FunctionRegistry<H> {
    /// Creates a new registry populated with all built-in functions.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register("str", str_fn);
        registry.register("int", int_fn);
        registry.register("float", float_fn);
        registry.register("len", len_fn);
        registry.register("upper", upper);
        registry.register("lower", lower);
        registry.register("strip", strip);
        registry.register("replace", replace);
        registry.register("startswith", startswith);
        registry.register("endswith", endswith);
        registry.register("contains", contains);
        registry.register("split", split);
        registry.register("join", join);
        registry.register("zfill", zfill);
        registry.register("min", min);
        registry.register("max", max);
        registry.register("abs", abs);
        registry.register("round", round);
        registry.register("range", range);
        registry.register("cond", cond);
        registry.register("get", get);
        registry.register("list", list);
        registry.register("dict", dict);
        registry.register("append", append);
        registry.register("assert", assert_fn);
        registry.register("log", log_fn);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NoHost;

    type V = Value<NoHost>;

    fn call(name: &str, positional: Vec<V>) -> Result<V, ScriptError> {
        let registry = FunctionRegistry::<NoHost>::default();
        let func = registry.get(name).expect("builtin exists");
        let mut args = Arguments::new(name, positional, vec![]);
        func(&mut args)
    }

    #[test]
    fn test_keyword_arguments_fill_parameters() {
        let mut args: Arguments<NoHost> = Arguments::new(
            "f",
            vec![V::Number(1.0)],
            vec![("c".to_string(), V::Number(3.0))],
        );
        assert_eq!(args.next("a"), Some(V::Number(1.0)));
        assert_eq!(args.next("b"), None);
        assert_eq!(args.next("c"), Some(V::Number(3.0)));
        assert!(args.finish().is_ok());
    }

    #[test]
    fn test_unconsumed_arguments_are_rejected() {
        let err = call("upper", vec![V::str("a"), V::str("b")]).unwrap_err();
        assert!(matches!(err, ScriptError::Argument { ref function, .. } if function == "upper"));
    }

    #[test]
    fn test_string_builtins() {
        assert_eq!(call("upper", vec![V::str("b00")]).unwrap(), V::str("B00"));
        assert_eq!(call("strip", vec![V::str("  a ")]).unwrap(), V::str("a"));
        assert_eq!(
            call("zfill", vec![V::str("42"), V::Number(5.0)]).unwrap(),
            V::str("00042")
        );
        assert_eq!(
            call("zfill", vec![V::Number(-7.0), V::Number(3.0)]).unwrap(),
            V::str("-07")
        );
        assert_eq!(
            call(
                "join",
                vec![
                    V::str("-"),
                    V::list(vec![V::str("a"), V::Number(1.0)])
                ]
            )
            .unwrap(),
            V::str("a-1")
        );
        assert_eq!(
            call("split", vec![V::str("a b  c")]).unwrap().as_sequence().unwrap().len(),
            3
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(call("int", vec![V::str(" 12 ")]).unwrap(), V::Number(12.0));
        assert_eq!(call("int", vec![V::Number(-2.7)]).unwrap(), V::Number(-2.0));
        assert!(call("int", vec![V::str("x")]).is_err());
        assert_eq!(call("float", vec![V::str("0.5")]).unwrap(), V::Number(0.5));
        assert_eq!(call("str", vec![V::Number(3.0)]).unwrap(), V::str("3"));
    }

    #[test]
    fn test_min_max_and_range() {
        assert_eq!(
            call("max", vec![V::Number(1.0), V::Number(3.0), V::Number(2.0)]).unwrap(),
            V::Number(3.0)
        );
        assert_eq!(
            call("min", vec![V::list(vec![V::Number(4.0), V::Number(-1.0)])]).unwrap(),
            V::Number(-1.0)
        );
        assert_eq!(
            call("range", vec![V::Number(3.0)]).unwrap().to_string(),
            "[0, 1, 2]"
        );
        assert_eq!(
            call("range", vec![V::Number(5.0), V::Number(0.0), V::Number(-2.0)])
                .unwrap()
                .to_string(),
            "[5, 3, 1]"
        );
    }

    #[test]
    fn test_get_and_dict() {
        let d = call("dict", vec![V::list(vec![V::Tuple(vec![V::str("k"), V::Number(1.0)])])])
            .unwrap();
        assert_eq!(call("get", vec![d.clone(), V::str("k")]).unwrap(), V::Number(1.0));
        assert_eq!(
            call("get", vec![d, V::str("missing"), V::str("dflt")]).unwrap(),
            V::str("dflt")
        );
    }

    #[test]
    fn test_dict_takes_one_sequence() {
        let pairs = || V::list(vec![V::Tuple(vec![V::str("k"), V::Number(1.0)])]);
        let err = call("dict", vec![pairs(), pairs()]).unwrap_err();
        assert!(matches!(err, ScriptError::Argument { ref function, .. } if function == "dict"));

        let registry = FunctionRegistry::<NoHost>::default();
        let dict = registry.get("dict").unwrap();
        let mut args = Arguments::new("dict", vec![pairs()], vec![("j".to_string(), V::Number(2.0))]);
        let d = dict(&mut args).unwrap();
        assert_eq!(d.to_string(), "{'k': 1, 'j': 2}");
    }

    #[test]
    fn test_oversized_results_are_errors() {
        assert!(matches!(
            call("range", vec![V::Number(1e300)]),
            Err(ScriptError::TypeError(_))
        ));
        assert!(matches!(
            call("range", vec![V::Number(0.0), V::Number(f64::INFINITY)]),
            Err(ScriptError::TypeError(_))
        ));
        assert!(matches!(
            call("zfill", vec![V::str("1"), V::Number(1e15)]),
            Err(ScriptError::TypeError(_))
        ));
        assert_eq!(
            call("range", vec![V::Number(0.0), V::Number(1.0), V::Number(0.25)])
                .unwrap()
                .to_string(),
            "[0, 0.25, 0.5, 0.75]"
        );
        assert_eq!(call("range", vec![V::Number(-1e300)]).unwrap().to_string(), "[]");
    }

    #[test]
    fn test_append_mutates_shared_list() {
        let list = V::list(vec![]);
        call("append", vec![list.clone(), V::Number(1.0)]).unwrap();
        assert_eq!(list.to_string(), "[1]");
    }

    #[test]
    fn test_assert() {
        assert_eq!(
            call("assert", vec![V::Bool(false), V::str("bad row")]),
            Err(ScriptError::Assertion("bad row".to_string()))
        );
        assert_eq!(call("assert", vec![V::Bool(true)]).unwrap(), V::None);
    }
}
