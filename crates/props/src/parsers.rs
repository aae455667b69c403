//! nom parsers for specified property values.
//!
//! A specified value is checked against the grammar of its property
//! ([`ValueKind`]) and turned into a [`PropertyValue`].

use crate::property::{PropertyId, ValueKind};
use crate::value::PropertyValue;
use nom::branch::alt;
use nom::bytes::complete::{tag_no_case, take_while1};
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::sequence::{delimited, pair};
use nom::{IResult, Parser};
use quire_types::Color;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyParseError {
    #[error("Invalid value for '{property}': '{value}' (expected {expected})")]
    InvalidValue {
        property: &'static str,
        value: String,
        expected: String,
    },
}

fn digits(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_digit()).parse(input)
}

/// A signed decimal number without exponent: `12`, `-0.5`, `.75`.
pub fn parse_f32(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize((
            opt(alt((char('+'), char('-')))),
            alt((
                recognize(pair(digits, opt(pair(char('.'), opt(digits))))),
                recognize(pair(char('.'), digits)),
            )),
        )),
        |s: &str| s.parse::<f32>(),
    )
    .parse(input)
}

fn unit(input: &str) -> IResult<&str, f32> {
    alt((
        value(1.0, tag_no_case("pt")),
        value(1.0, tag_no_case("px")),
        value(12.0, tag_no_case("pc")),
        value(72.0, tag_no_case("in")),
        value(28.3465, tag_no_case("cm")),
        value(2.83465, tag_no_case("mm")),
    ))
    .parse(input)
}

/// A length in points: `12pt`, `1in`, `10mm`, `0`. A bare number is taken as points.
pub fn parse_length(input: &str) -> IResult<&str, f32> {
    map(pair(parse_f32, opt(unit)), |(v, scale)| v * scale.unwrap_or(1.0)).parse(input)
}

fn trimmed<'a, O>(
    parser: impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
    input: &'a str,
) -> Option<O> {
    all_consuming(delimited(space0, parser, space0))
        .parse(input)
        .ok()
        .map(|(_, out)| out)
}

/// Parses `raw` according to the grammar of `id`.
pub fn parse_value(id: PropertyId, raw: &str) -> Result<PropertyValue, PropertyParseError> {
    let kind = id.value_kind();
    let parsed = match kind {
        ValueKind::Length => trimmed(parse_length, raw).map(PropertyValue::Length),
        ValueKind::LengthOrAuto => trimmed(
            alt((
                value(PropertyValue::Auto, tag_no_case("auto")),
                map(parse_length, PropertyValue::Length),
            )),
            raw,
        ),
        ValueKind::Number => trimmed(parse_f32, raw).map(PropertyValue::Number),
        ValueKind::Color => raw.parse::<Color>().ok().map(PropertyValue::Color),
        ValueKind::Keyword(allowed) => {
            let token = raw.trim();
            allowed
                .iter()
                .find(|k| k.eq_ignore_ascii_case(token))
                .map(|k| PropertyValue::Keyword(k))
        }
        ValueKind::Text => Some(PropertyValue::text(raw.trim())),
    };
    parsed.ok_or_else(|| PropertyParseError::InvalidValue {
        property: id.name(),
        value: raw.to_string(),
        expected: describe(kind),
    })
}

fn describe(kind: ValueKind) -> String {
    match kind {
        ValueKind::Length => "a length".to_string(),
        ValueKind::LengthOrAuto => "a length or 'auto'".to_string(),
        ValueKind::Number => "a number".to_string(),
        ValueKind::Color => "a color".to_string(),
        ValueKind::Keyword(allowed) => format!("one of {}", allowed.join(", ")),
        ValueKind::Text => "text".to_string(),
    }
}
