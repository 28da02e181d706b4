mod literal;
#[cfg(test)]
mod tests;

use crate::ast::Span;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_till, take_until},
    character::complete::{alpha1, alphanumeric1, char, multispace1},
    combinator::{map, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded},
};

use literal::{parse_number_literal, parse_regex_literal, parse_string_literal};

/// Token with source location information
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedToken {
    pub token: Token,
    pub span: Span,
    /// A line terminator separates this token from the previous one.
    /// The parser needs it for automatic semicolon insertion and `return`.
    pub newline_before: bool,
}

impl LocatedToken {
    pub fn new(token: Token, span: Span, newline_before: bool) -> Self {
        LocatedToken {
            token,
            span,
            newline_before,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Throw,
    Try,
    Catch,
    Finally,
    New,
    Typeof,
    Void,
    Delete,
    Instanceof,
    In,
    This,
    Null,
    True,
    False,

    // Identifiers and literals (raw source text)
    Identifier(String),
    NumberLiteral(String),
    StringLiteral(String),
    RegexLiteral(String),

    // Operators
    Operator(String), // + - * / % ** ++ -- == === != !== < > <= >= && || ! ~ & | ^ << >> >>>
    AssignOp(String), // = += -= *= /= %= **= <<= >>= >>>= &= |= ^=
    Arrow,            // =>
    Ellipsis,         // ...
    Dot,
    Question,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Colon,

    // Comments (to be skipped)
    Comment(String),
}

impl Token {
    /// Source text of a keyword token; keywords are valid property names after `.`
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            Token::Var => "var",
            Token::Let => "let",
            Token::Const => "const",
            Token::Function => "function",
            Token::Return => "return",
            Token::If => "if",
            Token::Else => "else",
            Token::For => "for",
            Token::While => "while",
            Token::Do => "do",
            Token::Switch => "switch",
            Token::Case => "case",
            Token::Default => "default",
            Token::Break => "break",
            Token::Continue => "continue",
            Token::Throw => "throw",
            Token::Try => "try",
            Token::Catch => "catch",
            Token::Finally => "finally",
            Token::New => "new",
            Token::Typeof => "typeof",
            Token::Void => "void",
            Token::Delete => "delete",
            Token::Instanceof => "instanceof",
            Token::In => "in",
            Token::This => "this",
            Token::Null => "null",
            Token::True => "true",
            Token::False => "false",
            _ => return None,
        };
        Some(text)
    }

    /// Whether a `/` after this token starts a regex literal rather than a division.
    fn permits_regex(&self) -> bool {
        !matches!(
            self,
            Token::Identifier(_)
                | Token::NumberLiteral(_)
                | Token::StringLiteral(_)
                | Token::RegexLiteral(_)
                | Token::RightParen
                | Token::RightBracket
                | Token::RightBrace
                | Token::This
                | Token::Null
                | Token::True
                | Token::False
        ) && !matches!(self, Token::Operator(op) if op == "++" || op == "--")
    }
}

fn parse_comment(input: &str) -> IResult<&str, Token> {
    alt((
        map(preceded(tag("//"), take_till(|c| c == '\n')), |s: &str| {
            Token::Comment(s.to_string())
        }),
        map(delimited(tag("/*"), take_until("*/"), tag("*/")), |s: &str| {
            Token::Comment(s.to_string())
        }),
    ))(input)
}

fn keyword_or_identifier(word: &str) -> Token {
    match word {
        "var" => Token::Var,
        "let" => Token::Let,
        "const" => Token::Const,
        "function" => Token::Function,
        "return" => Token::Return,
        "if" => Token::If,
        "else" => Token::Else,
        "for" => Token::For,
        "while" => Token::While,
        "do" => Token::Do,
        "switch" => Token::Switch,
        "case" => Token::Case,
        "default" => Token::Default,
        "break" => Token::Break,
        "continue" => Token::Continue,
        "throw" => Token::Throw,
        "try" => Token::Try,
        "catch" => Token::Catch,
        "finally" => Token::Finally,
        "new" => Token::New,
        "typeof" => Token::Typeof,
        "void" => Token::Void,
        "delete" => Token::Delete,
        "instanceof" => Token::Instanceof,
        "in" => Token::In,
        "this" => Token::This,
        "null" => Token::Null,
        "true" => Token::True,
        "false" => Token::False,
        _ => Token::Identifier(word.to_string()),
    }
}

// Identifiers in generated code lean heavily on `$` and `_`: `$elm$core$List$map`, `_List_Nil`
fn parse_word(input: &str) -> IResult<&str, Token> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"), tag("$"))),
            many0(alt((alphanumeric1, tag("_"), tag("$")))),
        )),
        keyword_or_identifier,
    )(input)
}

fn classify_operator(op: &str) -> Token {
    match op {
        "=>" => Token::Arrow,
        "..." => Token::Ellipsis,
        "." => Token::Dot,
        "?" => Token::Question,
        "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "**=" | "<<=" | ">>=" | ">>>=" | "&=" | "|=" | "^=" => {
            Token::AssignOp(op.to_string())
        }
        _ => Token::Operator(op.to_string()),
    }
}

fn parse_operator(input: &str) -> IResult<&str, Token> {
    map(
        alt((
            // Longest operators first
            alt((
                tag(">>>="),
                tag("==="),
                tag("!=="),
                tag("**="),
                tag("<<="),
                tag(">>="),
                tag(">>>"),
                tag("..."),
            )),
            alt((
                tag("=>"),
                tag("=="),
                tag("!="),
                tag("<="),
                tag(">="),
                tag("&&"),
                tag("||"),
                tag("++"),
                tag("--"),
                tag("+="),
                tag("-="),
                tag("*="),
                tag("/="),
                tag("%="),
                tag("&="),
                tag("|="),
                tag("^="),
                tag("**"),
                tag("<<"),
                tag(">>"),
            )),
            alt((
                tag("="),
                tag("<"),
                tag(">"),
                tag("+"),
                tag("-"),
                tag("*"),
                tag("/"),
                tag("%"),
                tag("&"),
                tag("|"),
                tag("^"),
                tag("!"),
                tag("~"),
                tag("?"),
                tag("."),
            )),
        )),
        classify_operator,
    )(input)
}

fn parse_delimiter(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::LeftParen, char('(')),
        value(Token::RightParen, char(')')),
        value(Token::LeftBracket, char('[')),
        value(Token::RightBracket, char(']')),
        value(Token::LeftBrace, char('{')),
        value(Token::RightBrace, char('}')),
        value(Token::Comma, char(',')),
        value(Token::Semicolon, char(';')),
        value(Token::Colon, char(':')),
    ))(input)
}

fn parse_token(input: &str) -> IResult<&str, Token> {
    alt((
        parse_comment,
        parse_string_literal,
        parse_word,
        // Before operators so `.5` is a number rather than a member access
        parse_number_literal,
        parse_delimiter,
        parse_operator,
    ))(input)
}

pub fn tokenize(input: &str) -> Result<Vec<LocatedToken>, String> {
    let mut remaining = input;
    let mut tokens: Vec<LocatedToken> = Vec::new();
    let mut newline_before = false;

    // Build line offset table once for O(log n) span calculations
    let line_offsets = LineOffsets::new(input);

    while !remaining.is_empty() {
        // Check for and skip leading whitespace
        if let Ok((rest, skipped)) = multispace1::<&str, nom::error::Error<&str>>(remaining) {
            newline_before |= skipped.contains('\n');
            remaining = rest;
            continue;
        }

        let regex_allowed = tokens.last().map_or(true, |t| t.token.permits_regex());
        let starts_regex =
            regex_allowed && remaining.starts_with('/') && !remaining.starts_with("//") && !remaining.starts_with("/*");
        let parsed = if starts_regex { parse_regex_literal(remaining) } else { parse_token(remaining) };

        match parsed {
            Ok((rest, token)) => {
                // Skip comments
                if let Token::Comment(text) = &token {
                    newline_before |= text.contains('\n');
                    remaining = rest;
                    continue;
                }

                // Calculate span based on position in original input
                let span = calculate_span(input, &line_offsets, remaining, rest);
                tokens.push(LocatedToken::new(token, span, newline_before));
                remaining = rest;
                newline_before = false;
            }
            Err(_) => {
                let offset = input.len() - remaining.len();
                let (line, col) = line_offsets.offset_to_line_col(offset);
                let snippet: String = remaining.chars().take(20).collect();
                return Err(format!(
                    "Tokenization error at {}:{} near {:?}",
                    line, col, snippet
                ));
            }
        }
    }

    Ok(tokens)
}

/// Precomputed line offset table for efficient offset-to-line-column conversion.
/// Built once per input, then used with binary search for O(log n) lookups.
struct LineOffsets {
    /// Byte offsets where each line starts. line_starts[0] = 0 (line 1 starts at offset 0).
    line_starts: Vec<usize>,
}

impl LineOffsets {
    /// Build a line offset table from the input string. O(n) one-time cost.
    fn new(input: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, ch) in input.char_indices() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
        }
        LineOffsets { line_starts }
    }

    /// Convert byte offset to (line, column) - both 1-indexed. O(log n) per lookup.
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = line_idx + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }
}

/// Calculate the span of a token given the original input and the before/after strings
fn calculate_span(original: &str, line_offsets: &LineOffsets, before: &str, after: &str) -> Span {
    let start_offset = original.len() - before.len();
    let end_offset = original.len() - after.len();

    let (start_line, start_col) = line_offsets.offset_to_line_col(start_offset);
    let (end_line, end_col) = line_offsets.offset_to_line_col(end_offset);

    Span::new(start_line, start_col, end_line, end_col)
}
