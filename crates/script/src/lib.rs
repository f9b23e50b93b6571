//! Label script: the small language used in template directive, command and text blocks.
//!
//! Scripts are statements (`name = expr` or a bare `expr`) separated by newlines or
//! `;`. Text blocks are literal text with `{expr}` slots. The interpreter is generic
//! over a [`HostValue`] type, so the embedding application can hand its own objects
//! to scripts through registered functions.

pub mod ast;
pub mod engine;
pub mod error;
pub mod functions;
pub mod operators;
pub mod parser;
pub mod scope;
pub mod value;

pub use ast::{Expression, Script, TextTemplate};
pub use engine::Interpreter;
pub use error::ScriptError;
pub use functions::{Arguments, FunctionRegistry, ScriptFunction};
pub use parser::{parse_expression, parse_script, parse_text_template};
pub use scope::{Bindings, Scope};
pub use value::{Dict, HostValue, NoHost, SharedList, Value, format_number};

/// Whether `name` can be bound as a script variable.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !parser::is_keyword(name)
}
