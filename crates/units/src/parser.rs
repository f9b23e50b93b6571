//! `nom` parsers for numbers and length strings.
use crate::error::UnitError;
use crate::length::{LengthDimension, LengthUnit};
use nom::{
    IResult, Parser,
    branch::alt,
    character::complete::{alpha0, char, digit1, one_of, space0},
    combinator::{map_res, opt, recognize},
    sequence::preceded,
};

/// Parses a plain decimal number with an optional sign (`-2`, `0.50`, `.5`).
///
/// Exponents are not accepted, so a following unit suffix like `em` is never
/// swallowed as part of the number.
pub fn number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((
            opt(one_of("+-")),
            alt((
                recognize((digit1, opt((char('.'), digit1)))),
                recognize((char('.'), digit1)),
            )),
        )),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

/// Parses a length: a number, optional whitespace, and an optional unit suffix.
pub fn length(input: &str) -> IResult<&str, (f64, &str)> {
    (number, preceded(space0, alpha0)).parse(input)
}

/// Parses a full length string such as `"2mm"`, `"0.50 in"` or `"256"`.
///
/// A missing suffix means raw pixels. Anything left over after the suffix is an error.
pub fn parse_length(input: &str) -> Result<LengthDimension, UnitError> {
    match length(input.trim()) {
        Ok(("", (value, suffix))) => {
            let unit = LengthUnit::from_suffix(suffix).ok_or_else(|| UnitError::UnknownUnit {
                input: input.to_string(),
                suffix: suffix.to_string(),
            })?;
            Ok(LengthDimension::new(value, unit))
        }
        Ok((rem, _)) => Err(UnitError::Parse {
            input: input.to_string(),
            message: format!("unexpected trailing input '{}'", rem),
        }),
        Err(e) => Err(UnitError::Parse {
            input: input.to_string(),
            message: e.to_string(),
        }),
    }
}
