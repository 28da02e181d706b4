use super::*;

// Helper to extract just the tokens from LocatedToken for testing
fn tokens_only(input: &str) -> Vec<Token> {
    tokenize(input).unwrap().into_iter().map(|lt| lt.token).collect()
}

fn ident(name: &str) -> Token {
    Token::Identifier(name.to_string())
}

fn op(s: &str) -> Token {
    Token::Operator(s.to_string())
}

#[test]
fn test_tokenize_keywords_and_identifiers() {
    let tokens = tokens_only("var function return instanceof typeof x");
    assert_eq!(
        tokens,
        vec![
            Token::Var,
            Token::Function,
            Token::Return,
            Token::Instanceof,
            Token::Typeof,
            ident("x"),
        ]
    );
}

#[test]
fn test_tokenize_generated_identifiers() {
    let tokens = tokens_only("$elm$core$List$map _List_Nil F2 A3 varName");
    assert_eq!(
        tokens,
        vec![
            ident("$elm$core$List$map"),
            ident("_List_Nil"),
            ident("F2"),
            ident("A3"),
            ident("varName"),
        ]
    );
}

#[test]
fn test_tokenize_numbers_keep_raw_text() {
    let tokens = tokens_only("42 3.14 .5 1e10 2.5E-3 0xFF 1.");
    assert_eq!(
        tokens,
        vec![
            Token::NumberLiteral("42".into()),
            Token::NumberLiteral("3.14".into()),
            Token::NumberLiteral(".5".into()),
            Token::NumberLiteral("1e10".into()),
            Token::NumberLiteral("2.5E-3".into()),
            Token::NumberLiteral("0xFF".into()),
            Token::NumberLiteral("1.".into()),
        ]
    );
}

#[test]
fn test_tokenize_strings_with_escapes() {
    let tokens = tokens_only(r#""a\"b" 'it\'s' "" '\\'"#);
    assert_eq!(
        tokens,
        vec![
            Token::StringLiteral(r#""a\"b""#.into()),
            Token::StringLiteral(r#"'it\'s'"#.into()),
            Token::StringLiteral(r#""""#.into()),
            Token::StringLiteral(r#"'\\'"#.into()),
        ]
    );
}

#[test]
fn test_tokenize_operators_longest_match() {
    let tokens = tokens_only("a === b !== c >>> d >>>= e => ... ++ +=");
    assert_eq!(
        tokens,
        vec![
            ident("a"),
            op("==="),
            ident("b"),
            op("!=="),
            ident("c"),
            op(">>>"),
            ident("d"),
            Token::AssignOp(">>>=".into()),
            ident("e"),
            Token::Arrow,
            Token::Ellipsis,
            op("++"),
            Token::AssignOp("+=".into()),
        ]
    );
}

#[test]
fn test_comments_are_skipped() {
    let tokens = tokens_only("a // line comment\n/* block\ncomment */ b");
    assert_eq!(tokens, vec![ident("a"), ident("b")]);
}

#[test]
fn test_regex_after_assignment() {
    let tokens = tokens_only("var r = /[a-z/]+\\//gi;");
    assert_eq!(
        tokens,
        vec![
            Token::Var,
            ident("r"),
            Token::AssignOp("=".into()),
            Token::RegexLiteral("/[a-z/]+\\//gi".into()),
            Token::Semicolon,
        ]
    );
}

#[test]
fn test_division_after_identifier() {
    let tokens = tokens_only("a / b / c");
    assert_eq!(tokens, vec![ident("a"), op("/"), ident("b"), op("/"), ident("c")]);
}

#[test]
fn test_division_after_paren() {
    let tokens = tokens_only("(a) / 2");
    assert_eq!(
        tokens,
        vec![
            Token::LeftParen,
            ident("a"),
            Token::RightParen,
            op("/"),
            Token::NumberLiteral("2".into()),
        ]
    );
}

#[test]
fn test_newline_before_is_tracked() {
    let tokens = tokenize("return\nx; y").unwrap();
    assert!(!tokens[0].newline_before);
    assert!(tokens[1].newline_before);
    assert!(!tokens[3].newline_before);
}

#[test]
fn test_block_comment_with_newline_counts_as_line_break() {
    let tokens = tokenize("a /*\n*/ b").unwrap();
    assert!(tokens[1].newline_before);
}

#[test]
fn test_spans_are_line_and_column_based() {
    let tokens = tokenize("var a;\n  b").unwrap();
    assert_eq!(tokens[0].span, Span::new(1, 1, 1, 4));
    assert_eq!(tokens[3].span, Span::new(2, 3, 2, 4));
}

#[test]
fn test_unterminated_string_is_an_error() {
    let err = tokenize("var s = \"abc").unwrap_err();
    assert!(err.contains("1:9"), "unexpected message: {}", err);
}

#[test]
fn test_template_literal_is_rejected() {
    assert!(tokenize("`x`").is_err());
}
