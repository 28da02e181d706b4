use crate::ast::{NodeCounter, Program};
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::printer::Printer;

fn parse(source: &str) -> Program {
    let tokens = tokenize(source).expect("tokenize failed");
    let mut nc = NodeCounter::new();
    Parser::new(tokens, &mut nc).parse().expect("parse failed")
}

fn reprint(source: &str) -> String {
    Printer::format_program(&parse(source))
}

/// Printing must be stable: the printed text parses back to the same tree.
fn assert_stable(source: &str) {
    let first = reprint(source);
    let second = reprint(&first);
    assert_eq!(first, second, "printing is not stable for:\n{}", source);
}

#[test]
fn test_print_var_and_call() {
    assert_eq!(reprint("var x=f(a,b)"), "var x = f(a, b);\n");
}

#[test]
fn test_print_function_declaration() {
    assert_eq!(
        reprint("function add(a,b){return a+b}"),
        "function add(a, b) {\n    return a + b;\n}\n"
    );
}

#[test]
fn test_print_anonymous_function_and_empty_body() {
    assert_eq!(reprint("var f = function(){};"), "var f = function () {};\n");
}

#[test]
fn test_nested_function_indentation() {
    let printed = reprint("var f = F2(function (a, b) { if (a) { return b; } return a; });");
    assert_eq!(
        printed,
        "var f = F2(function (a, b) {\n    if (a) {\n        return b;\n    }\n    return a;\n});\n"
    );
}

#[test]
fn test_parens_follow_precedence() {
    assert_eq!(reprint("x = (a + b) * c;"), "x = (a + b) * c;\n");
    assert_eq!(reprint("x = a + (b * c);"), "x = a + b * c;\n");
    assert_eq!(reprint("x = a - (b - c);"), "x = a - (b - c);\n");
    assert_eq!(reprint("x = (a - b) - c;"), "x = a - b - c;\n");
    assert_eq!(reprint("x = (a, b);"), "x = (a, b);\n");
    assert_eq!(reprint("x = (a ? b : c) ? d : e;"), "x = (a ? b : c) ? d : e;\n");
}

#[test]
fn test_exponent_operands() {
    assert_eq!(reprint("x = (-a) ** b;"), "x = (-a) ** b;\n");
    assert_eq!(reprint("x = a ** b ** c;"), "x = a ** b ** c;\n");
    assert_eq!(reprint("x = (a ** b) ** c;"), "x = (a ** b) ** c;\n");
}

#[test]
fn test_unary_operands() {
    assert_eq!(reprint("x = - (-a);"), "x = -(-a);\n");
    assert_eq!(reprint("x = !!a;"), "x = !!a;\n");
    assert_eq!(reprint("x = typeof a === 'string';"), "x = typeof a === 'string';\n");
    assert_eq!(reprint("x = !(a && b);"), "x = !(a && b);\n");
}

#[test]
fn test_statement_starting_with_function_is_wrapped() {
    assert_eq!(
        reprint("(function (scope) { f(); }(this));"),
        "(function (scope) {\n    f();\n}(this));\n"
    );
}

#[test]
fn test_statement_starting_with_object_is_wrapped() {
    assert_eq!(reprint("({ a: 1 }).a;"), "({ a: 1 }.a);\n");
}

#[test]
fn test_arrow_functions() {
    assert_eq!(reprint("var f = (a) => a + 1;"), "var f = a => a + 1;\n");
    assert_eq!(reprint("var f = (a, b) => ({ a: a });"), "var f = (a, b) => ({ a: a });\n");
    assert_eq!(reprint("var f = () => { return 1; };"), "var f = () => {\n    return 1;\n};\n");
    assert_eq!(reprint("g((a => a), b);"), "g(a => a, b);\n");
    assert_eq!(reprint("x = (a => a)(1);"), "x = (a => a)(1);\n");
}

#[test]
fn test_object_and_array_literals() {
    assert_eq!(
        reprint("var o = {$:0,a:[1,2],'b':null,...rest};"),
        "var o = { $: 0, a: [1, 2], 'b': null, ...rest };\n"
    );
    assert_eq!(reprint("var e = {};"), "var e = {};\n");
}

#[test]
fn test_new_expressions() {
    assert_eq!(reprint("throw new Error('x');"), "throw new Error('x');\n");
    assert_eq!(reprint("x = new a.B;"), "x = new a.B();\n");
    assert_eq!(reprint("x = new (f())();"), "x = new (f())();\n");
}

#[test]
fn test_member_on_number_literal() {
    assert_eq!(reprint("x = (1).toString();"), "x = (1).toString();\n");
}

#[test]
fn test_compound_bodies_are_braced() {
    assert_eq!(reprint("if (a) b(); else c();"), "if (a) {\n    b();\n} else {\n    c();\n}\n");
    assert_eq!(reprint("while (a) b();"), "while (a) {\n    b();\n}\n");
}

#[test]
fn test_else_if_chain() {
    assert_eq!(
        reprint("if (a) { x(); } else if (b) { y(); } else { z(); }"),
        "if (a) {\n    x();\n} else if (b) {\n    y();\n} else {\n    z();\n}\n"
    );
}

#[test]
fn test_switch_layout() {
    assert_eq!(
        reprint("switch (x.$) { case 0: return a; default: return b; }"),
        "switch (x.$) {\n    case 0:\n        return a;\n    default:\n        return b;\n}\n"
    );
}

#[test]
fn test_for_loops() {
    assert_eq!(
        reprint("for (var i = 0; i < n; i++) { f(i); }"),
        "for (var i = 0; i < n; i++) {\n    f(i);\n}\n"
    );
    assert_eq!(reprint("for (;;) { break; }"), "for (;;) {\n    break;\n}\n");
    assert_eq!(reprint("for (var k in o) { g(k); }"), "for (var k in o) {\n    g(k);\n}\n");
}

#[test]
fn test_literals_keep_raw_text() {
    assert_eq!(
        reprint("var a = 0xFF, b = 1e3, c = \"q\\\"\", d = /a\\/b/g;"),
        "var a = 0xFF, b = 1e3, c = \"q\\\"\", d = /a\\/b/g;\n"
    );
}

#[test]
fn test_printing_is_stable() {
    assert_stable(
        "var $elm$core$List$foldl = F3(function (func, acc, list) {\n\
         foldl: while (true) {\n\
         if (!list.b) { return acc; } else {\n\
         var x = list.a; var xs = list.b;\n\
         var $temp$acc = A2(func, x, acc), $temp$list = xs;\n\
         acc = $temp$acc; list = $temp$list; continue foldl; } } });",
    );
    assert_stable("try { a(); } catch (e) { throw e; } finally { done = true; }");
    assert_stable("do { i--; } while (i > 0);");
    assert_stable("x = a ? b ? c : d : e;");
    assert_stable("x = (function () { return 1; })();");
    assert_stable("x = { f: function () { return this; } }.f();");
}

#[test]
fn test_empty_program() {
    assert_eq!(reprint(""), "");
}
