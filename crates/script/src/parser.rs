//! A `nom`-based parser for label scripts, expressions and interpolated text.
use super::ast::*;
use crate::error::ScriptError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{alpha0, alpha1, char, multispace0, satisfy, space0},
    combinator::{map, not, opt, recognize, value, verify},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, terminated},
};
use svglabel_units::LengthUnit;
use svglabel_units::parser::number;

const KEYWORDS: [&str; 6] = ["and", "or", "not", "true", "false", "none"];

// --- Main Public Parsers ---

/// Parses a whole script: statements separated by newlines or `;`, with `#` comments.
pub fn parse_script(input: &str) -> Result<Script, ScriptError> {
    let mut statements = Vec::new();
    let mut rest = input;
    loop {
        rest = skip_separators(rest);
        if rest.is_empty() {
            break;
        }
        let (after, stmt) = statement(rest).map_err(|e| parse_error(input, e))?;
        let after = skip_comment(after.trim_start_matches([' ', '\t']));
        if !(after.is_empty() || after.starts_with(['\n', '\r', ';'])) {
            return Err(ScriptError::Parse {
                input: input.to_string(),
                message: format!(
                    "unexpected input at '{}'",
                    after.lines().next().unwrap_or_default()
                ),
            });
        }
        statements.push(stmt);
        rest = after;
    }
    Ok(Script { statements })
}

/// Parses a single expression, as used by command blocks.
pub fn parse_expression(input: &str) -> Result<Expression, ScriptError> {
    match ws_nl(expression).parse(input) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(ScriptError::Parse {
            input: input.to_string(),
            message: format!("Parser did not consume all input. Remainder: '{}'", rem),
        }),
        Err(e) => Err(parse_error(input, e)),
    }
}

/// Parses literal text with `{expression}` slots. `{{` and `}}` stand for literal braces;
/// a lone `}` is kept as-is.
pub fn parse_text_template(input: &str) -> Result<TextTemplate, ScriptError> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("{{") {
            literal.push('{');
            rest = &rest[2..];
        } else if rest.starts_with("}}") {
            literal.push('}');
            rest = &rest[2..];
        } else if c == '{' {
            let (after, expr) = ws_nl(expression)
                .parse(&rest[1..])
                .map_err(|e| parse_error(input, e))?;
            let Some(after) = after.strip_prefix('}') else {
                return Err(ScriptError::Parse {
                    input: input.to_string(),
                    message: format!("expected '}}' to close slot, found '{}'", after),
                });
            };
            if !literal.is_empty() {
                parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(TemplatePart::Slot(expr));
            rest = after;
        } else {
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    if !literal.is_empty() {
        parts.push(TemplatePart::Literal(literal));
    }
    Ok(TextTemplate { parts })
}

fn parse_error(input: &str, e: nom::Err<Error<&str>>) -> ScriptError {
    ScriptError::Parse {
        input: input.to_string(),
        message: e.to_string(),
    }
}

fn skip_separators(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if trimmed.starts_with('#') {
            input = skip_comment(trimmed);
        } else {
            return trimmed;
        }
    }
}

fn skip_comment(input: &str) -> &str {
    if !input.starts_with('#') {
        return input;
    }
    match input.find('\n') {
        Some(i) => &input[i..],
        None => "",
    }
}

// --- Combinators & Helpers ---

/// Consumes spaces and tabs around `inner`. Newlines end statements, so they are kept.
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(space0, inner, space0)
}

/// Like `ws`, but also consumes newlines. Used inside brackets.
fn ws_nl<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

/// Whether `word` is reserved and cannot name a variable.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = Error<&'a str>> {
    terminated(tag(kw), not(satisfy(is_ident_char)))
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(alt((alpha1, tag("_"))), take_while(is_ident_char))).parse(input)
}

/// An identifier that is not a reserved word.
fn name(input: &str) -> IResult<&str, &str> {
    verify(identifier, |s: &str| !is_keyword(s)).parse(input)
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Statements ---

fn statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(
            (ws(name), char('='), not(char('=')), expression),
            |(name, _, _, value)| Statement::Assign {
                name: name.to_string(),
                value,
            },
        ),
        map(expression, Statement::Expression),
    ))
    .parse(input)
}

// --- Expression Parsers (in order of precedence) ---

pub(crate) fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(keyword("and"), |_| BinaryOperator::And).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(not_expr, and_op)(input)
}

fn not_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(ws(keyword("not")), not_expr), |expr| {
            Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(expr),
            }
        }),
        comparison_expr,
    ))
    .parse(input)
}

fn comparison_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("=="), |_| BinaryOperator::Equals),
        map(tag("!="), |_| BinaryOperator::NotEquals),
        map(tag("<="), |_| BinaryOperator::LessThanOrEqual),
        map(tag(">="), |_| BinaryOperator::GreaterThanOrEqual),
        map(char('<'), |_| BinaryOperator::LessThan),
        map(char('>'), |_| BinaryOperator::GreaterThan),
    ))
    .parse(input)
}

fn additive_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('+'), |_| BinaryOperator::Plus),
        map(char('-'), |_| BinaryOperator::Minus),
    ))
    .parse(input)
}

fn multiplicative_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(char('*'), |_| BinaryOperator::Multiply),
        map(tag("//"), |_| BinaryOperator::FloorDivide),
        map(char('/'), |_| BinaryOperator::Divide),
        map(char('%'), |_| BinaryOperator::Modulo),
    ))
    .parse(input)
}

fn comparison_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(additive_expr, comparison_op)(input)
}

fn additive_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(multiplicative_expr, additive_op)(input)
}

fn multiplicative_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(unary_expr, multiplicative_op)(input)
}

fn unary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(preceded(ws(char('-')), unary_expr), |expr| {
            Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(expr),
            }
        }),
        postfix_expr,
    ))
    .parse(input)
}

enum Suffix {
    Index(Expression),
    Attribute(String),
}

fn postfix_expr(input: &str) -> IResult<&str, Expression> {
    let (input, base) = primary_expr(input)?;
    let (input, suffixes) = many0(alt((
        map(
            delimited(ws(char('[')), ws_nl(expression), char(']')),
            Suffix::Index,
        ),
        map(preceded(char('.'), identifier), |s| {
            Suffix::Attribute(s.to_string())
        }),
    )))
    .parse(input)?;
    let (input, _) = space0(input)?;

    let expr = suffixes.into_iter().fold(base, |target, suffix| match suffix {
        Suffix::Index(index) => Expression::Index {
            target: Box::new(target),
            index: Box::new(index),
        },
        Suffix::Attribute(name) => Expression::Attribute {
            target: Box::new(target),
            name,
        },
    });
    Ok((input, expr))
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        number_literal,
        map(format_string, Expression::FormatString),
        map(string_literal, |s| Expression::Literal(Literal::Str(s))),
        value(Expression::Literal(Literal::Bool(true)), keyword("true")),
        value(Expression::Literal(Literal::Bool(false)), keyword("false")),
        value(Expression::Literal(Literal::None), keyword("none")),
        function_call,
        map(name, |n| Expression::Variable(n.to_string())),
        paren_expr,
        list_expr,
        dict_expr,
    )))
    .parse(input)
}

// --- Literal Parsers ---

/// A number, optionally followed directly by a unit suffix (`2mm`, `8.5in`).
fn number_literal(input: &str) -> IResult<&str, Expression> {
    let (rest, value) = number(input)?;
    let (rest, suffix) = alpha0(rest)?;
    if suffix.is_empty() {
        return Ok((rest, Expression::Literal(Literal::Number(value))));
    }
    match LengthUnit::from_suffix(suffix) {
        Some(unit) => Ok((
            rest,
            Expression::Literal(Literal::Length(svglabel_units::LengthDimension::new(
                value, unit,
            ))),
        )),
        None => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
    }
}

/// A single- or double-quoted string with `\n`, `\t`, `\\`, `\'` and `\"` escapes.
fn string_literal(input: &str) -> IResult<&str, String> {
    let quote = match input.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(nom::Err::Error(Error::new(input, ErrorKind::Char))),
    };
    let body = &input[1..];
    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, escaped @ ('\\' | '\'' | '"'))) => out.push(escaped),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            c if c == quote => return Ok((&body[i + 1..], out)),
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Char)))
}

fn format_string(input: &str) -> IResult<&str, TextTemplate> {
    let (rest, text) = preceded(char('f'), string_literal).parse(input)?;
    match parse_text_template(&text) {
        Ok(template) => Ok((rest, template)),
        Err(_) => Err(nom::Err::Failure(Error::new(input, ErrorKind::Verify))),
    }
}

// --- Collection Parsers ---

fn comma_list(input: &str) -> IResult<&str, (Vec<Expression>, bool)> {
    let (input, items) = separated_list0(char(','), ws_nl(expression)).parse(input)?;
    let (input, trailing) = opt(char(',')).parse(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (items, trailing.is_some())))
}

/// A parenthesized expression or a tuple: `(a)`, `(a,)`, `(a, b)`, `()`.
fn paren_expr(input: &str) -> IResult<&str, Expression> {
    let (input, (mut items, trailing)) = delimited(char('('), comma_list, char(')')).parse(input)?;
    if items.len() == 1 && !trailing {
        return Ok((input, items.remove(0)));
    }
    Ok((input, Expression::Tuple(items)))
}

fn list_expr(input: &str) -> IResult<&str, Expression> {
    map(delimited(char('['), comma_list, char(']')), |(items, _)| {
        Expression::List(items)
    })
    .parse(input)
}

fn dict_expr(input: &str) -> IResult<&str, Expression> {
    let entry = map(
        (ws_nl(expression), char(':'), ws_nl(expression)),
        |(k, _, v)| (k, v),
    );
    let (input, _) = char('{').parse(input)?;
    let (input, entries) = separated_list0(char(','), entry).parse(input)?;
    let (input, _) = opt(char(',')).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('}').parse(input)?;
    Ok((input, Expression::Dict(entries)))
}

// --- Function Call Parser ---

enum Argument {
    Positional(Expression),
    Keyword(String, Expression),
}

fn argument(input: &str) -> IResult<&str, Argument> {
    alt((
        map(
            (name, space0, char('='), not(char('=')), expression),
            |(name, _, _, _, expr)| Argument::Keyword(name.to_string(), expr),
        ),
        map(expression, Argument::Positional),
    ))
    .parse(input)
}

fn function_call(input: &str) -> IResult<&str, Expression> {
    let start = input;
    let (input, fn_name) = name(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = char('(').parse(input)?;
    let (input, arguments) = separated_list0(char(','), ws_nl(argument)).parse(input)?;
    let (input, _) = opt(char(',')).parse(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char(')').parse(input)?;

    let mut args = Vec::new();
    let mut kwargs = Vec::new();
    for argument in arguments {
        match argument {
            Argument::Positional(expr) => {
                if !kwargs.is_empty() {
                    // positional arguments may not follow keyword arguments
                    return Err(nom::Err::Failure(Error::new(start, ErrorKind::Verify)));
                }
                args.push(expr);
            }
            Argument::Keyword(name, expr) => kwargs.push((name, expr)),
        }
    }

    Ok((
        input,
        Expression::FunctionCall {
            name: fn_name.to_string(),
            args,
            kwargs,
        },
    ))
}
