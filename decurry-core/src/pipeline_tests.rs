use indexmap::IndexMap;

use crate::ast::{NodeCounter, Program};
use crate::config::{ObjectUpdateMode, Transforms};
use crate::convention::WrapperConvention;
use crate::error::{CompilerError, Result};
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::passes::replace_decls::ReplaceDeclarations;
use crate::passes::variant_shapes::VariantShapes;
use crate::pipeline::{Pass, PassContext, Pipeline};
use crate::specialize_calls::SpecializeCalls;
use crate::split_decls::SplitDeclarations;

fn boxed(enabled: bool, pass: impl Pass + 'static) -> (bool, Box<dyn Pass>) {
    (enabled, Box::new(pass))
}

/// Counts how many times it ran.
struct Marker;

impl Pass for Marker {
    fn name(&self) -> &'static str {
        "marker"
    }

    fn run(&mut self, _program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        ctx.inline.count_rewrite("marker");
        Ok(())
    }
}

fn parse(source: &str) -> (Program, NodeCounter) {
    let tokens = tokenize(source).expect("tokenize failed");
    let mut nc = NodeCounter::new();
    let program = Parser::new(tokens, &mut nc).parse().expect("parse failed");
    (program, nc)
}

#[test]
fn test_consumer_without_producer_is_rejected() {
    let err = Pipeline::new(vec![boxed(true, SpecializeCalls::new(WrapperConvention::default()))]).unwrap_err();
    assert!(matches!(err, CompilerError::PipelineError(_)));
}

#[test]
fn test_disabled_producer_does_not_count() {
    let conv = WrapperConvention::default();
    let err = Pipeline::new(vec![
        boxed(false, SplitDeclarations::new(conv.clone())),
        boxed(true, SpecializeCalls::new(conv)),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("specialize-calls"), "{}", err);
}

#[test]
fn test_consumer_before_producer_is_rejected() {
    let conv = WrapperConvention::default();
    let result = Pipeline::new(vec![
        boxed(true, SpecializeCalls::new(conv.clone())),
        boxed(true, SplitDeclarations::new(conv)),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_structural_pass_must_come_first() {
    let replace = ReplaceDeclarations::new(IndexMap::new()).unwrap();
    let err = Pipeline::new(vec![boxed(true, VariantShapes), boxed(true, replace)]).unwrap_err();
    assert!(err.to_string().contains("structural"), "{}", err);

    let replace = ReplaceDeclarations::new(IndexMap::new()).unwrap();
    let pipeline = Pipeline::new(vec![boxed(true, replace), boxed(true, VariantShapes)]).unwrap();
    assert_eq!(pipeline.pass_names(), ["replace-declarations", "variant-shapes"]);
}

#[test]
fn test_disabled_regular_pass_does_not_block_structural() {
    let replace = ReplaceDeclarations::new(IndexMap::new()).unwrap();
    assert!(Pipeline::new(vec![boxed(false, VariantShapes), boxed(true, replace)]).is_ok());
}

#[test]
fn test_default_pass_order() {
    let pipeline = Pipeline::from_transforms(&Transforms::default()).unwrap();
    assert_eq!(
        pipeline.pass_names(),
        [
            "variant-shapes",
            "split-declarations",
            "specialize-calls",
            "inline-equality",
            "number-to-string",
            "list-literals",
            "unused-locals",
        ]
    );
}

#[test]
fn test_every_pass_enabled() {
    let mut transforms = Transforms::default();
    transforms
        .replacements
        .insert("f".to_string(), "function () { return 1; }".to_string());
    transforms.object_update = Some(ObjectUpdateMode::UseAssign);
    transforms.arrow_fns = true;
    let names = Pipeline::from_transforms(&transforms).unwrap().pass_names();
    assert_eq!(names.len(), 10);
    assert_eq!(names[0], "replace-declarations");
    assert_eq!(names[8], "arrow-functions");
}

#[test]
fn test_no_transforms_is_empty() {
    assert!(Pipeline::from_transforms(&Transforms::none()).unwrap().is_empty());
}

#[test]
fn test_inline_functions_toggle_removes_both_halves() {
    let transforms = Transforms {
        inline_functions: false,
        ..Transforms::default()
    };
    let names = Pipeline::from_transforms(&transforms).unwrap().pass_names();
    assert!(!names.contains(&"split-declarations"));
    assert!(!names.contains(&"specialize-calls"));
}

#[test]
fn test_bad_replacement_fails_construction() {
    let mut transforms = Transforms::default();
    transforms.replacements.insert("f".to_string(), "function (".to_string());
    assert!(matches!(
        Pipeline::from_transforms(&transforms),
        Err(CompilerError::ConfigError(_))
    ));
}

#[test]
fn test_failure_aborts_remaining_passes() {
    let conv = WrapperConvention::default();
    let mut pipeline = Pipeline::new(vec![
        boxed(true, Marker),
        boxed(true, SplitDeclarations::new(conv.clone())),
        boxed(true, SpecializeCalls::new(conv)),
        boxed(true, Marker),
    ])
    .unwrap();

    let (mut program, nc) = parse("var r = apply2(f(x), 1, 2);");
    let mut ctx = PassContext::new(nc);
    let err = pipeline.run(&mut program, &mut ctx).unwrap_err();
    assert!(matches!(err, CompilerError::MalformedApply(..)));
    assert_eq!(ctx.inline.rewrite_count("marker"), 1);
}

#[test]
fn test_passes_run_in_order() {
    let conv = WrapperConvention::default();
    let mut pipeline = Pipeline::new(vec![
        boxed(true, SplitDeclarations::new(conv.clone())),
        boxed(true, SpecializeCalls::new(conv)),
        boxed(true, Marker),
    ])
    .unwrap();

    let (mut program, nc) = parse("var add = wrap2(function (a, b) { return a + b; }); add = apply2(add, 1, 2);");
    let mut ctx = PassContext::new(nc);
    pipeline.run(&mut program, &mut ctx).unwrap();
    assert_eq!(ctx.inline.rewrite_count("marker"), 1);
    assert_eq!(ctx.inline.inlined.get("add"), Some(&1));
}
