//! Defines the Abstract Syntax Tree (AST) for label scripts.
use svglabel_units::LengthDimension;

/// A literal written directly in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Number(f64),
    Length(LengthDimension),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// An `f'...'` string, rendered against the current scope.
    FormatString(TextTemplate),
    Variable(String),
    Tuple(Vec<Expression>),
    List(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    Attribute {
        target: Box<Expression>,
        name: String,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        kwargs: Vec<(String, Expression)>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Comparison
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::FloorDivide => "//",
            BinaryOperator::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assign { name: String, value: Expression },
    Expression(Expression),
}

/// A parsed script: statements run in order against one scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(String),
    Slot(Expression),
}

/// Literal text with `{expression}` slots.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextTemplate {
    pub parts: Vec<TemplatePart>,
}

impl TextTemplate {
    /// True if the template has no slots, so rendering returns the text unchanged.
    pub fn is_static(&self) -> bool {
        self.parts
            .iter()
            .all(|p| matches!(p, TemplatePart::Literal(_)))
    }
}
