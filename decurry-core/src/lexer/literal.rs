//! Literal parsing for the JavaScript lexer
//!
//! Literals are kept as raw source slices; nothing downstream needs their
//! numeric or decoded string value, and keeping the raw text means an untouched
//! literal prints exactly as it was written.
//! - Numeric literals: decimal, fractional (`.5`, `1.`), exponent, hexadecimal
//! - String literals: single or double quoted with backslash escapes
//! - Regex literals: `/body/flags`, with `/` allowed inside character classes

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped, is_not, tag},
    character::complete::{alphanumeric0, anychar, char, digit0, digit1, hex_digit1, none_of, one_of},
    combinator::{map, not, opt, peek, recognize},
    multi::{many0, many1},
    sequence::{delimited, pair, tuple},
};

use super::Token;

// Hexadecimal integer: 0x[hex_digits]
fn hexadecimal(input: &str) -> IResult<&str, &str> {
    recognize(pair(alt((tag("0x"), tag("0X"))), hex_digit1))(input)
}

// Exponent: (e|E)[+|-]digits
fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

// Mantissa: digits[.digits] or .digits
fn mantissa(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ))(input)
}

// Numeric literal: hexadecimal, or mantissa with optional exponent.
// Must not run straight into an identifier character (`3in` is not a number).
pub fn parse_number_literal(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(
            alt((hexadecimal, recognize(pair(mantissa, opt(exponent))))),
            not(peek(one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_$"))),
        )),
        |s: &str| Token::NumberLiteral(s.to_string()),
    )(input)
}

fn quoted<'a>(quote: char, forbidden: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    recognize(delimited(
        char(quote),
        opt(escaped(is_not(forbidden), '\\', anychar)),
        char(quote),
    ))
}

// String literal parser, raw text including quotes
// stringlit ::= '"' stringchar* '"' | "'" stringchar* "'"
pub fn parse_string_literal(input: &str) -> IResult<&str, Token> {
    map(alt((quoted('"', "\"\\\n"), quoted('\'', "'\\\n"))), |s: &str| {
        Token::StringLiteral(s.to_string())
    })(input)
}

fn escape_sequence(input: &str) -> IResult<&str, &str> {
    recognize(pair(char('\\'), none_of("\n")))(input)
}

// Character class inside a regex body: `[...]`, where `/` needs no escape
fn regex_class(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('['),
        many0(alt((escape_sequence, recognize(none_of("]\\\n"))))),
        char(']'),
    ))(input)
}

// Regex literal parser, raw text including slashes and flags.
// The caller decides whether a regex may start at this position.
pub fn parse_regex_literal(input: &str) -> IResult<&str, Token> {
    map(
        recognize(tuple((
            char('/'),
            many1(alt((escape_sequence, regex_class, recognize(none_of("/\\[\n"))))),
            char('/'),
            alphanumeric0,
        ))),
        |s: &str| Token::RegexLiteral(s.to_string()),
    )(input)
}
