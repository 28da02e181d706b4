use crate::ast::{NodeCounter, Program};
use crate::convention::WrapperConvention;
use crate::diags::InlineContext;
use crate::error::CompilerError;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::pipeline::{Pass, PassContext};
use crate::printer::Printer;
use crate::specialize_calls::SpecializeCalls;
use crate::split_decls::SplitDeclarations;

fn parse(source: &str) -> (Program, NodeCounter) {
    let tokens = tokenize(source).expect("tokenize failed");
    let mut nc = NodeCounter::new();
    let program = Parser::new(tokens, &mut nc).parse().expect("parse failed");
    (program, nc)
}

fn try_specialize(source: &str, convention: WrapperConvention) -> Result<(String, InlineContext), CompilerError> {
    let (mut program, nc) = parse(source);
    let mut ctx = PassContext::new(nc);
    SplitDeclarations::new(convention.clone()).run(&mut program, &mut ctx)?;
    SpecializeCalls::new(convention).run(&mut program, &mut ctx)?;
    Ok((Printer::format_program(&program), ctx.inline))
}

fn specialize(source: &str) -> (String, InlineContext) {
    try_specialize(source, WrapperConvention::default()).expect("specialize failed")
}

const ADD: &str = "var add = wrap2(function (a, b) { return a + b; });\n";

#[test]
fn test_matching_arity_is_specialized() {
    let (printed, inline) = specialize(&format!("{}var r = apply2(add, 1, 2);", ADD));
    assert!(printed.contains("var add_raw = function (a, b) {\n    return a + b;\n}"), "{}", printed);
    assert!(printed.contains("add = wrap2(add_raw);"), "{}", printed);
    assert!(printed.contains("var r = add_raw(1, 2);"), "{}", printed);
    assert_eq!(inline.inlined.get("add"), Some(&1));
    assert!(inline.partial_applications.is_empty());
}

#[test]
fn test_arity_mismatch_is_left_alone() {
    let (printed, inline) = specialize(&format!("{}var r = apply3(add, 1, 2, 3);", ADD));
    assert!(printed.contains("var r = apply3(add, 1, 2, 3);"), "{}", printed);
    assert!(inline.inlined.is_empty());
    assert!(inline.partial_applications.contains("add"));
}

#[test]
fn test_unknown_target_is_partial_application() {
    let (printed, inline) = specialize("var r = apply2(g, 1, 2);");
    assert_eq!(printed, "var r = apply2(g, 1, 2);\n");
    assert!(inline.partial_applications.contains("g"));
}

#[test]
fn test_nested_applies() {
    let (printed, inline) = specialize(&format!("{}var r = apply2(add, apply2(add, 1, 2), 3);", ADD));
    assert!(printed.contains("var r = add_raw(add_raw(1, 2), 3);"), "{}", printed);
    assert_eq!(inline.report("a.js").inlined_total(), 2);
}

#[test]
fn test_apply_inside_raw_lambda_is_specialized() {
    let (printed, _) = specialize(
        "var sum3 = wrap3(function (a, b, c) { return apply2(add, a, apply2(add, b, c)); });\n\
         var add = wrap2(function (a, b) { return a + b; });",
    );
    assert!(printed.contains("return add_raw(a, add_raw(b, c));"), "{}", printed);
}

#[test]
fn test_elm_convention() {
    let (printed, inline) = try_specialize(
        "var $author$project$Main$add = F2(function (a, b) { return a + b; });\n\
         var x = A2($author$project$Main$add, 1, 2);",
        WrapperConvention::elm(),
    )
    .unwrap();
    assert!(printed.contains("var x = $author$project$Main$add_raw(1, 2);"), "{}", printed);
    assert_eq!(inline.report("main.js").summary(), "functionInlineTransformer: splitCount=1, partialApplicationCount=0, inlined=1 (1 functions)");
}

#[test]
fn test_non_identifier_target_is_malformed() {
    let err = try_specialize("var r = apply2(f(x), 1, 2);", WrapperConvention::default()).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedApply(_, Some(_))), "{:?}", err);

    let err = try_specialize("var r = apply2();", WrapperConvention::default()).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedApply(..)));
}

#[test]
fn test_argument_count_mismatch_is_malformed() {
    let err = try_specialize(&format!("{}var r = apply2(add, 1);", ADD), WrapperConvention::default()).unwrap_err();
    assert!(err.to_string().contains("expects 2 argument(s) but got 1"), "{}", err);
}

#[test]
fn test_non_wrapper_calls_untouched() {
    let source = "var a = apply(add, 1);\nvar b = applyX(add);\nvar c = apply0(add);\nvar d = obj.apply2(add, 1, 2);\n";
    let (printed, inline) = specialize(source);
    assert_eq!(printed, source);
    assert!(inline.partial_applications.is_empty());
}

#[test]
fn test_specializing_twice_changes_nothing() {
    let (once, _) = specialize(&format!("{}var r = apply2(add, 1, 2);\nvar s = apply2(g, 1, 2);", ADD));
    let (twice, inline) = specialize(&once);
    assert_eq!(once, twice);
    assert!(inline.inlined.is_empty());
}

#[test]
fn test_running_without_registry_fails() {
    let (mut program, nc) = parse("var r = apply2(add, 1, 2);");
    let mut ctx = PassContext::new(nc);
    let err = SpecializeCalls::new(WrapperConvention::default())
        .run(&mut program, &mut ctx)
        .unwrap_err();
    assert!(matches!(err, CompilerError::PipelineError(_)));
}

#[test]
fn test_same_name_split_in_each_function_is_specialized() {
    let (printed, inline) = try_specialize(
        "function a(x) { var go = F2(function (p, q) { return p; }); return A2(go, x, 1); }\n\
         function b(y) { var go = F2(function (p, q) { return q; }); return A2(go, y, 2); }",
        WrapperConvention::elm(),
    )
    .unwrap();
    assert!(printed.contains("return go_raw(x, 1);"), "{}", printed);
    assert!(printed.contains("return go_raw(y, 2);"), "{}", printed);
    assert_eq!(inline.inlined.get("go"), Some(&2));
}

#[test]
fn test_shadowing_parameter_blocks_specialization() {
    let (printed, inline) = try_specialize(
        "function a(x) { var func = F2(function (p, q) { return p; }); return A2(func, x, 1); }\n\
         function b(func, y) { return A2(func, y, 2); }",
        WrapperConvention::elm(),
    )
    .unwrap();
    assert!(printed.contains("return A2(func, x, 1);"), "{}", printed);
    assert!(printed.contains("return A2(func, y, 2);"), "{}", printed);
    assert!(!printed.contains("func_raw(y"), "{}", printed);
    assert!(inline.inlined.is_empty());
    assert!(inline.partial_applications.contains("func"));
}

#[test]
fn test_mixed_arities_block_specialization() {
    let (printed, inline) = try_specialize(
        "function a(x) { var go = F2(function (p, q) { return p; }); return A2(go, x, 1); }\n\
         function b(y) { var go = F3(function (p, q, r) { return r; }); return A3(go, y, 2, 3); }",
        WrapperConvention::elm(),
    )
    .unwrap();
    assert!(printed.contains("return A2(go, x, 1);"), "{}", printed);
    assert!(printed.contains("return A3(go, y, 2, 3);"), "{}", printed);
    assert!(inline.inlined.is_empty());
}
