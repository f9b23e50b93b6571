//! The tree-walking interpreter for label scripts.
use log::trace;

use crate::ast::{BinaryOperator, Expression, Literal, Script, Statement, TemplatePart, TextTemplate};
use crate::error::ScriptError;
use crate::functions::{Arguments, FunctionRegistry};
use crate::operators;
use crate::parser::{parse_script, parse_text_template};
use crate::scope::Scope;
use crate::value::{HostValue, Value};

/// Evaluates scripts and expressions against a [`Scope`], calling into a fixed
/// set of registered functions.
#[derive(Debug, Clone)]
pub struct Interpreter<H: HostValue> {
    functions: FunctionRegistry<H>,
}

impl<H: HostValue> Default for Interpreter<H> {
    fn default() -> Self {
        Self::new(FunctionRegistry::default())
    }
}

impl<H: HostValue> Interpreter<H> {
    pub fn new(functions: FunctionRegistry<H>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionRegistry<H> {
        &self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry<H> {
        &mut self.functions
    }

    /// Runs each statement in order. Assignments bind into the scope's local layer.
    pub fn execute(&self, script: &Script, scope: &mut Scope<H>) -> Result<(), ScriptError> {
        for statement in &script.statements {
            match statement {
                Statement::Assign { name, value } => {
                    let value = self.evaluate(value, scope)?;
                    scope.set(name.clone(), value);
                }
                Statement::Expression(expr) => {
                    self.evaluate(expr, scope)?;
                }
            }
        }
        Ok(())
    }

    /// Parses and runs a script source in one step.
    pub fn run(&self, source: &str, scope: &mut Scope<H>) -> Result<(), ScriptError> {
        let script = parse_script(source)?;
        self.execute(&script, scope)
    }

    pub fn evaluate(&self, expr: &Expression, scope: &Scope<H>) -> Result<Value<H>, ScriptError> {
        match expr {
            Expression::Literal(literal) => Ok(match literal {
                Literal::None => Value::None,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Number(n) => Value::Number(*n),
                Literal::Length(l) => Value::Length(*l),
                Literal::Str(s) => Value::Str(s.clone()),
            }),
            Expression::FormatString(template) => Ok(Value::Str(self.render(template, scope)?)),
            Expression::Variable(name) => scope
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::UnknownVariable(name.clone())),
            Expression::Tuple(items) => Ok(Value::Tuple(self.evaluate_all(items, scope)?)),
            Expression::List(items) => Ok(Value::list(self.evaluate_all(items, scope)?)),
            Expression::Dict(entries) => {
                let mut evaluated = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    evaluated.push((self.evaluate(k, scope)?, self.evaluate(v, scope)?));
                }
                Ok(Value::dict(evaluated))
            }
            Expression::Index { target, index } => {
                let target = self.evaluate(target, scope)?;
                let index = self.evaluate(index, scope)?;
                index_value(&target, &index)
            }
            Expression::Attribute { target, name } => {
                let target = self.evaluate(target, scope)?;
                attribute_value(&target, name)
            }
            Expression::FunctionCall { name, args, kwargs } => {
                let func = self
                    .functions
                    .get(name)
                    .ok_or_else(|| ScriptError::UnknownFunction(name.clone()))?;
                let positional = self.evaluate_all(args, scope)?;
                let mut keywords = Vec::with_capacity(kwargs.len());
                for (k, v) in kwargs {
                    keywords.push((k.clone(), self.evaluate(v, scope)?));
                }
                let mut arguments = Arguments::new(name.as_str(), positional, keywords);
                func(&mut arguments)
            }
            Expression::BinaryOp { left, op, right } => {
                let left = self.evaluate(left, scope)?;
                match op {
                    // `and`/`or` return one of their operands, evaluating the right only if needed
                    BinaryOperator::And if !left.is_truthy() => Ok(left),
                    BinaryOperator::Or if left.is_truthy() => Ok(left),
                    BinaryOperator::And | BinaryOperator::Or => self.evaluate(right, scope),
                    _ => operators::binary(*op, left, self.evaluate(right, scope)?),
                }
            }
            Expression::UnaryOp { op, expr } => operators::unary(*op, self.evaluate(expr, scope)?),
        }
    }

    fn evaluate_all(&self, exprs: &[Expression], scope: &Scope<H>) -> Result<Vec<Value<H>>, ScriptError> {
        exprs.iter().map(|e| self.evaluate(e, scope)).collect()
    }

    /// Renders a parsed text template, displaying each slot's value.
    pub fn render(&self, template: &TextTemplate, scope: &Scope<H>) -> Result<String, ScriptError> {
        let mut out = String::new();
        for part in &template.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Slot(expr) => out.push_str(&self.evaluate(expr, scope)?.to_string()),
            }
        }
        Ok(out)
    }

    /// Substitutes `{expression}` slots in `text`. Text without `{` is returned unchanged.
    pub fn interpolate(&self, text: &str, scope: &Scope<H>) -> Result<String, ScriptError> {
        if !text.contains('{') {
            return Ok(text.to_string());
        }
        let rendered = self.render(&parse_text_template(text)?, scope)?;
        trace!("Interpolated '{}' -> '{}'", text, rendered);
        Ok(rendered)
    }
}

fn resolve_index(index: &Value<impl HostValue>, len: usize) -> Result<usize, ScriptError> {
    let i = index.as_number()?;
    if i.fract() != 0.0 {
        return Err(ScriptError::Index(format!("index must be an integer, got {}", index)));
    }
    let resolved = if i < 0.0 { len as f64 + i } else { i };
    if resolved < 0.0 || resolved >= len as f64 {
        return Err(ScriptError::Index(format!(
            "index {} out of range for length {}",
            index, len
        )));
    }
    Ok(resolved as usize)
}

fn index_value<H: HostValue>(target: &Value<H>, index: &Value<H>) -> Result<Value<H>, ScriptError> {
    match target {
        Value::Tuple(items) => Ok(items[resolve_index(index, items.len())?].clone()),
        Value::List(items) => {
            let items = items.borrow();
            Ok(items[resolve_index(index, items.len())?].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let c = chars[resolve_index(index, chars.len())?];
            Ok(Value::Str(c.to_string()))
        }
        Value::Dict(_) => target
            .get_item(index)?
            .ok_or_else(|| ScriptError::Index(format!("key {} not found", index.repr()))),
        other => Err(ScriptError::TypeError(format!(
            "{} is not subscriptable",
            other.type_name()
        ))),
    }
}

/// `value.name`: host attributes, string keys of dicts, and the parts of a length.
fn attribute_value<H: HostValue>(target: &Value<H>, name: &str) -> Result<Value<H>, ScriptError> {
    let found = match target {
        Value::Host(host) => host.attribute(name),
        Value::Dict(_) => target.get_item(&Value::str(name))?,
        Value::Length(l) => match name {
            "value" => Some(Value::Number(l.value)),
            "unit" => Some(Value::str(l.unit.script_name())),
            "px" => Some(Value::Number(l.to_px())),
            _ => None,
        },
        _ => None,
    };
    found.ok_or_else(|| ScriptError::UnknownAttribute {
        type_name: target.type_name().to_string(),
        name: name.to_string(),
    })
}
