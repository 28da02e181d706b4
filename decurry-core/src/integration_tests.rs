//! End-to-end tests: source text through the standard pipeline to printed output.

use crate::config::{ObjectUpdateMode, Transforms};
use crate::convention::WrapperConvention;
use crate::error::CompilerError;
use crate::pipeline::Pipeline;
use crate::{Compiler, Printed, transform_source};

const ELM_PROGRAM: &str = r#"(function (scope) {
'use strict';

function F(arity, fun, wrapper) {
    wrapper.a = arity;
    wrapper.f = fun;
    return wrapper;
}

function F2(fun) {
    return F(2, fun, function (a) { return function (b) { return fun(a, b); }; });
}

function A2(fun, a, b) {
    return fun.a === 2 ? fun.f(a, b) : fun(a)(b);
}

var _List_Nil = { $: 0 };
function _List_Cons(hd, tl) { return { $: 1, a: hd, b: tl }; }

var $elm$core$Basics$add = F2(function (a, b) { return a + b; });
var $author$project$Main$sum = F2(function (xs, acc) {
    sum: while (true) {
        if (!xs.b) {
            return acc;
        } else {
            var $temp$xs = xs.b, $temp$acc = A2($elm$core$Basics$add, xs.a, acc);
            xs = $temp$xs;
            acc = $temp$acc;
            continue sum;
        }
    }
});
var $author$project$Main$main = function (model) {
    var unused = 3;
    var step = model.step;
    var xs = _List_fromArray([1, 2, 3]);
    var label = $elm$core$String$fromInt(A2($author$project$Main$sum, xs, 0));
    return _Utils_eq(label, '6') ? xs : _Utils_update(model, { count: A2(step, 1, 2) });
};
_Platform_export({ 'Main': { 'init': $author$project$Main$main } });
}(this));
"#;

fn elm_transforms() -> Transforms {
    Transforms {
        convention: WrapperConvention::elm(),
        ..Transforms::default()
    }
}

fn transform(transforms: &Transforms) -> Printed {
    let _ = env_logger::builder().is_test(true).try_init();
    transform_source(ELM_PROGRAM, "main.js", transforms).expect("transform failed")
}

#[test]
fn test_elm_program_default_passes() {
    let printed = transform(&elm_transforms());
    let code = &printed.code;

    assert!(code.contains("var $elm$core$Basics$add_raw = function (a, b) {"), "{}", code);
    assert!(code.contains("$temp$acc = $elm$core$Basics$add_raw(xs.a, acc);"), "{}", code);
    assert!(
        code.contains("var label = $author$project$Main$sum_raw(xs, 0) + \"\";"),
        "{}",
        code
    );
    assert!(code.contains("return label === '6' ? xs : _Utils_update(model, {"), "{}", code);
    assert!(
        code.contains("var xs = { $: 1, a: 1, b: { $: 1, a: 2, b: { $: 1, a: 3, b: _List_Nil } } };"),
        "{}",
        code
    );
    assert!(code.contains("var _List_Nil = { $: 0, a: null, b: null };"), "{}", code);
    assert!(!code.contains("var unused"), "{}", code);
    // `step` is not a split function, so its call stays indirect
    assert!(code.contains("count: A2(step, 1, 2)"), "{}", code);

    let report = &printed.report;
    assert_eq!(report.file_id, "main.js");
    assert_eq!(report.splits_count, 2);
    assert_eq!(report.inlined_total(), 2);
    assert_eq!(report.partial_applications_count, 1);
    assert_eq!(report.rewrites.get("inline-equality"), Some(&1));
    assert_eq!(report.rewrites.get("number-to-string"), Some(&1));
    assert_eq!(report.rewrites.get("list-literals"), Some(&1));
    assert!(report.rewrites.get("unused-locals").is_some_and(|n| *n >= 1));
}

#[test]
fn test_elm_program_optional_passes() {
    let transforms = Transforms {
        object_update: Some(ObjectUpdateMode::UseSpread),
        arrow_fns: true,
        ..elm_transforms()
    };
    let code = transform(&transforms).code;
    assert!(code.contains("xs : { ...model, count: A2(step, 1, 2) }"), "{}", code);
    assert!(code.contains("var $author$project$Main$main = model => {"), "{}", code);
    assert!(code.contains("var $author$project$Main$sum_raw = (xs, acc) => {"), "{}", code);
}

#[test]
fn test_output_is_deterministic() {
    let first = transform(&elm_transforms());
    let second = transform(&elm_transforms());
    assert_eq!(first, second);
}

#[test]
fn test_no_transforms_only_reprints() {
    let printed = transform(&Transforms::none());
    let reprinted = Compiler::parse(ELM_PROGRAM, "main.js").unwrap().print();
    assert_eq!(printed.code, reprinted);
    assert_eq!(printed.report.rewrites.len(), 0);
    assert_eq!(printed.report.splits_count, 0);
}

#[test]
fn test_transformed_output_parses_again() {
    let printed = transform(&elm_transforms());
    let reparsed = Compiler::parse(&printed.code, "main.js").expect("output does not parse");
    assert_eq!(reparsed.print(), printed.code);
}

#[test]
fn test_wrong_convention_specializes_nothing() {
    let printed = transform(&Transforms::default());
    assert_eq!(printed.report.splits_count, 0);
    assert_eq!(printed.report.inlined_total(), 0);
    assert!(printed.code.contains("A2($author$project$Main$sum, xs, 0)"));
}

#[test]
fn test_registry_is_exposed_after_transform() {
    let mut pipeline = Pipeline::from_transforms(&elm_transforms()).unwrap();
    let transformed = Compiler::parse(ELM_PROGRAM, "main.js")
        .unwrap()
        .transform(&mut pipeline)
        .unwrap();
    let names: Vec<_> = transformed.splits.iter().map(|s| s.raw_lambda_name.as_str()).collect();
    assert_eq!(names, ["$elm$core$Basics$add_raw", "$author$project$Main$sum_raw"]);
}

#[test]
fn test_pipeline_is_reusable_across_files() {
    let mut pipeline = Pipeline::from_transforms(&elm_transforms()).unwrap();
    let a = Compiler::parse("var f = F2(function (a, b) { return a; });\nvar x = A2(f, 1, 2);", "a.js")
        .unwrap()
        .transform(&mut pipeline)
        .unwrap();
    let b = Compiler::parse("var y = A2(f, 1, 2);", "b.js")
        .unwrap()
        .transform(&mut pipeline)
        .unwrap();
    assert_eq!(a.report.inlined_total(), 1);
    // Splits of a.js do not leak into b.js
    assert_eq!(b.report.inlined_total(), 0);
    assert_eq!(b.print().code, "var y = A2(f, 1, 2);\n");
}

#[test]
fn test_errors_carry_their_kind() {
    let err = transform_source("var x = A2(f, 1);", "bad.js", &elm_transforms()).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedApply(..)));

    let err = transform_source("var x = `template`;", "bad.js", &elm_transforms()).unwrap_err();
    assert!(matches!(err, CompilerError::ParseError(..)));
}

#[test]
fn test_local_helpers_and_shadowed_names() {
    let printed = transform_source(
        "function a(x) { var go = F2(function (p, q) { return p; }); return A2(go, x, 1); }\n\
         function b(y) { var go = F2(function (p, q) { return q; }); return A2(go, y, 2); }\n\
         function c(z) { var func = F2(function (p, q) { return p; }); return A2(func, z, 1); }\n\
         function d(func, y) { return A2(func, y, 2); }",
        "helpers.js",
        &elm_transforms(),
    )
    .unwrap();
    assert!(printed.code.contains("return go_raw(x, 1);"), "{}", printed.code);
    assert!(printed.code.contains("return go_raw(y, 2);"), "{}", printed.code);
    assert!(printed.code.contains("return A2(func, y, 2);"), "{}", printed.code);
    assert!(!printed.code.contains("func_raw(y"), "{}", printed.code);
    assert_eq!(printed.report.inlined_total(), 2);
    assert_eq!(printed.report.partial_applications_count, 1);
}
