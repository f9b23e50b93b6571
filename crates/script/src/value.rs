//! Runtime values of the label-script language.
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use svglabel_units::LengthDimension;

use crate::error::ScriptError;

/// Domain objects the embedding application exposes to scripts.
///
/// Scripts can bind, pass around and compare host values, but only the host
/// functions registered alongside them know what they are.
pub trait HostValue: Clone + fmt::Debug + PartialEq {
    /// The name shown in type errors, e.g. `LabelSheet`.
    fn type_name(&self) -> &'static str;

    /// Resolves `value.name`. The default has no attributes.
    fn attribute(&self, _name: &str) -> Option<Value<Self>> {
        None
    }
}

/// The longest string or list a single operation may build.
pub const MAX_GENERATED_LEN: usize = 1 << 24;

/// A list shared by reference: every binding of it sees in-place mutation.
pub type SharedList<H> = Rc<RefCell<Vec<Value<H>>>>;

/// An insertion-ordered dictionary. Keys are compared by value.
pub type Dict<H> = Vec<(Value<H>, Value<H>)>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value<H: HostValue> {
    None,
    Bool(bool),
    Number(f64),
    Str(String),
    Length(LengthDimension),
    Tuple(Vec<Value<H>>),
    List(SharedList<H>),
    Dict(Rc<Dict<H>>),
    Host(H),
}

impl<H: HostValue> Value<H> {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn list(items: Vec<Value<H>>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: Dict<H>) -> Self {
        Value::Dict(Rc::new(entries))
    }

    /// Builds a dict with string keys, preserving order.
    pub fn string_dict<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value<H>)>,
    {
        Value::dict(
            entries
                .into_iter()
                .map(|(k, v)| (Value::str(k), v))
                .collect(),
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "str",
            Value::Length(_) => "length",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Host(h) => h.type_name(),
        }
    }

    /// None, false, zero, the empty string and empty collections are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Length(l) => l.value != 0.0,
            Value::Tuple(items) => !items.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(entries) => !entries.is_empty(),
            Value::Host(_) => true,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_str(&self) -> Result<&str, ScriptError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(type_error("str", other)),
        }
    }

    /// Numbers, with booleans counting as 0 and 1.
    pub fn as_number(&self) -> Result<f64, ScriptError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(type_error("number", other)),
        }
    }

    /// A number that must be a whole non-negative count.
    pub fn as_count(&self) -> Result<usize, ScriptError> {
        let n = self.as_number()?;
        if n < 0.0 || n.fract() != 0.0 || n >= usize::MAX as f64 {
            return Err(ScriptError::TypeError(format!(
                "expected a non-negative integer, got {}",
                self
            )));
        }
        Ok(n as usize)
    }

    pub fn as_length(&self) -> Result<LengthDimension, ScriptError> {
        match self {
            Value::Length(l) => Ok(*l),
            other => Err(type_error("length", other)),
        }
    }

    /// The items of a tuple or list, copied out.
    pub fn as_sequence(&self) -> Result<Vec<Value<H>>, ScriptError> {
        match self {
            Value::Tuple(items) => Ok(items.clone()),
            Value::List(items) => Ok(items.borrow().clone()),
            other => Err(type_error("tuple or list", other)),
        }
    }

    /// A two-element tuple or list.
    pub fn as_pair(&self) -> Result<(Value<H>, Value<H>), ScriptError> {
        let items = self.as_sequence()?;
        match <[Value<H>; 2]>::try_from(items) {
            Ok([a, b]) => Ok((a, b)),
            Err(items) => Err(ScriptError::TypeError(format!(
                "expected a pair, got {} items",
                items.len()
            ))),
        }
    }

    /// Looks up a key in a dict.
    pub fn get_item(&self, key: &Value<H>) -> Result<Option<Value<H>>, ScriptError> {
        match self {
            Value::Dict(entries) => Ok(entries
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())),
            other => Err(type_error("dict", other)),
        }
    }

    /// Like `Display`, but strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            other => other.to_string(),
        }
    }

    /// Orders two values of comparable types.
    pub fn compare(&self, other: &Value<H>) -> Result<Ordering, ScriptError> {
        let ordering = match (self, other) {
            (Value::Number(_) | Value::Bool(_), Value::Number(_) | Value::Bool(_)) => {
                self.as_number()?.partial_cmp(&other.as_number()?)
            }
            (Value::Length(a), Value::Length(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Tuple(_) | Value::List(_), Value::Tuple(_) | Value::List(_)) => {
                let (a, b) = (self.as_sequence()?, other.as_sequence()?);
                for (x, y) in a.iter().zip(&b) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        unequal => return Ok(unequal),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => {
                return Err(ScriptError::TypeError(format!(
                    "cannot compare {} with {}",
                    self.type_name(),
                    other.type_name()
                )));
            }
        };
        ordering.ok_or_else(|| ScriptError::TypeError("cannot compare NaN".to_string()))
    }
}

pub(crate) fn type_error<H: HostValue>(expected: &str, got: &Value<H>) -> ScriptError {
    ScriptError::TypeError(format!("expected {}, got {}", expected, got.type_name()))
}

/// Checks the size of a string or list about to be built.
pub(crate) fn generated_len(len: f64, what: &str) -> Result<usize, ScriptError> {
    if len > MAX_GENERATED_LEN as f64 {
        return Err(ScriptError::TypeError(format!(
            "{} of length {} exceeds the limit of {}",
            what,
            format_number(len),
            MAX_GENERATED_LEN
        )));
    }
    Ok(len as usize)
}

/// Formats a number the way scripts expect: integral values have no fraction.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn write_items<H: HostValue>(
    f: &mut fmt::Formatter<'_>,
    items: &[Value<H>],
    open: &str,
    close: &str,
) -> fmt::Result {
    write!(f, "{}", open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item.repr())?;
    }
    write!(f, "{}", close)
}

impl<H: HostValue> fmt::Display for Value<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Length(l) => write!(f, "{}", l.to_svg_string()),
            Value::Tuple(items) if items.len() == 1 => write_items(f, items, "(", ",)"),
            Value::Tuple(items) => write_items(f, items, "(", ")"),
            Value::List(items) => write_items(f, &items.borrow(), "[", "]"),
            Value::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k.repr(), v.repr())?;
                }
                write!(f, "}}")
            }
            Value::Host(h) => write!(f, "<{}>", h.type_name()),
        }
    }
}

impl<H: HostValue> From<&str> for Value<H> {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl<H: HostValue> From<String> for Value<H> {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<H: HostValue> From<f64> for Value<H> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<H: HostValue> From<bool> for Value<H> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<H: HostValue> From<LengthDimension> for Value<H> {
    fn from(l: LengthDimension) -> Self {
        Value::Length(l)
    }
}

/// A host type with no values, for scripts that need no domain objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoHost {}

impl HostValue for NoHost {
    fn type_name(&self) -> &'static str {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svglabel_units::LengthUnit;

    type V = Value<NoHost>;

    #[test]
    fn test_count_bounds() {
        assert_eq!(V::Number(3.0).as_count().unwrap(), 3);
        assert!(V::Number(-1.0).as_count().is_err());
        assert!(V::Number(1.5).as_count().is_err());
        assert!(V::Number(1e300).as_count().is_err());
        assert!(V::Number(f64::INFINITY).as_count().is_err());
        assert!(V::Number(f64::NAN).as_count().is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!V::None.is_truthy());
        assert!(!V::Number(0.0).is_truthy());
        assert!(!V::str("").is_truthy());
        assert!(!V::list(vec![]).is_truthy());
        assert!(V::str("0").is_truthy());
        assert!(V::Tuple(vec![V::None]).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(V::Number(4.0).to_string(), "4");
        assert_eq!(V::Number(-0.5).to_string(), "-0.5");
        assert_eq!(
            V::Length(LengthDimension::new(2.0, LengthUnit::Millimeter)).to_string(),
            "2mm"
        );
        assert_eq!(V::Tuple(vec![V::Number(1.0)]).to_string(), "(1,)");
        assert_eq!(
            V::list(vec![V::str("a"), V::Bool(true)]).to_string(),
            "['a', true]"
        );
        assert_eq!(
            V::string_dict([("k", V::str("it's"))]).to_string(),
            r"{'k': 'it\'s'}"
        );
    }

    #[test]
    fn test_compare() {
        let inch = V::Length(LengthDimension::new(1.0, LengthUnit::Inch));
        let mm = V::Length(LengthDimension::new(1.0, LengthUnit::Millimeter));
        assert_eq!(mm.compare(&inch).unwrap(), Ordering::Less);
        assert_eq!(
            V::Tuple(vec![V::Number(1.0), V::Number(2.0)])
                .compare(&V::Tuple(vec![V::Number(1.0)]))
                .unwrap(),
            Ordering::Greater
        );
        assert!(V::str("a").compare(&V::Number(1.0)).is_err());
    }

    #[test]
    fn test_shared_list_equality_and_mutation() {
        let list = V::list(vec![V::Number(1.0)]);
        let alias = list.clone();
        if let Value::List(items) = &list {
            items.borrow_mut().push(V::Number(2.0));
        }
        assert_eq!(alias.as_sequence().unwrap().len(), 2);
        assert_eq!(list, alias);
    }
}
