//! Declaration splitting for curry-wrapped functions.
//!
//! `var add = wrap2(function (a, b) { ... });` becomes
//! `var add_raw = function (a, b) { ... }, add = wrap2(add_raw);`
//! and a [`FuncSplit`] is recorded so that call sites can later reach the raw
//! lambda directly.

use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::ast::*;
use crate::convention::WrapperConvention;
use crate::err_collision_at;
use crate::error::Result;
use crate::pipeline::{Artifact, Pass, PassContext};
use crate::visit_mut::VisitMut;
use crate::visitor::Visitor;

pub const RAW_SUFFIX: &str = "_raw";

/// One split curry-wrapper declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuncSplit {
    pub original_name: String,
    pub raw_lambda_name: String,
    pub arity: usize,
}

/// Splits of one file keyed by original name, in declaration order.
///
/// A name declared in several scopes is split in each of them; the first
/// record is kept, and the registry remembers how many declarations were split
/// and whether they all agreed on the arity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitRegistry {
    splits: IndexMap<String, FuncSplit>,
    declarations: HashMap<String, usize>,
    mixed_arity: HashSet<String>,
}

impl SplitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if `original_name` was already registered; the first record wins.
    pub fn insert(&mut self, split: FuncSplit) -> bool {
        *self.declarations.entry(split.original_name.clone()).or_insert(0) += 1;
        match self.splits.entry(split.original_name.clone()) {
            indexmap::map::Entry::Occupied(first) => {
                if first.get().arity != split.arity {
                    self.mixed_arity.insert(split.original_name);
                }
                false
            }
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(split);
                true
            }
        }
    }

    pub fn get(&self, original_name: &str) -> Option<&FuncSplit> {
        self.splits.get(original_name)
    }

    /// Number of declarations of `original_name` that were split.
    pub fn declarations(&self, original_name: &str) -> usize {
        self.declarations.get(original_name).copied().unwrap_or(0)
    }

    /// The record for `original_name`, if every one of its `bindings`
    /// declarations was split with the same arity, so that the raw name is in
    /// scope wherever the original name resolves.
    pub fn resolve(&self, original_name: &str, bindings: usize) -> Option<&FuncSplit> {
        let split = self.get(original_name)?;
        let uniform = !self.mixed_arity.contains(original_name);
        (uniform && self.declarations(original_name) == bindings).then_some(split)
    }

    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuncSplit> {
        self.splits.values()
    }
}

pub fn raw_lambda_name(original_name: &str) -> String {
    format!("{}{}", original_name, RAW_SUFFIX)
}

/// How many times each name is bound anywhere in the program.
pub fn count_bindings(program: &Program) -> HashMap<String, usize> {
    struct BindingCounter {
        counts: HashMap<String, usize>,
    }

    impl Visitor for BindingCounter {
        type Break = ();

        fn visit_binding(&mut self, name: &str) -> ControlFlow<Self::Break> {
            *self.counts.entry(name.to_string()).or_insert(0) += 1;
            ControlFlow::Continue(())
        }
    }

    let mut counter = BindingCounter { counts: HashMap::new() };
    let _ = counter.visit_program(program);
    counter.counts
}

struct WrappedLambda {
    call: Header,
    wrapper: Box<Expression>,
    lambda: Expression,
    arity: usize,
}

struct DeclarationSplitter<'a, F> {
    convention: &'a WrapperConvention,
    node_counter: &'a mut NodeCounter,
    bound: HashMap<String, usize>,
    record: F,
}

impl<F: FnMut(FuncSplit)> DeclarationSplitter<'_, F> {
    /// Take apart `wrapN(<function literal>)`, or hand the initializer back untouched.
    fn into_wrapped_lambda(&self, init: Expression) -> std::result::Result<WrappedLambda, Expression> {
        match init.kind {
            ExprKind::Call(wrapper, mut args) if args.len() == 1 && matches!(args[0].kind, ExprKind::Function(_)) => {
                match wrapper.kind.as_identifier().and_then(|name| self.convention.curry_arity(name)) {
                    Some(arity) => Ok(WrappedLambda {
                        call: init.h,
                        wrapper,
                        lambda: args.remove(0),
                        arity,
                    }),
                    None => Err(Expression {
                        h: init.h,
                        kind: ExprKind::Call(wrapper, args),
                    }),
                }
            }
            kind => Err(Expression { h: init.h, kind }),
        }
    }

    fn split(&mut self, name: String, span: Span, wrapped: WrappedLambda) -> Result<[Declarator; 2]> {
        let raw_name = raw_lambda_name(&name);
        if self.bound.contains_key(&raw_name) {
            return Err(err_collision_at!(
                span,
                "cannot split {}: {} is already bound in this file",
                name,
                raw_name
            ));
        }

        debug!("split {} into {} (arity {})", name, raw_name, wrapped.arity);
        (self.record)(FuncSplit {
            original_name: name.clone(),
            raw_lambda_name: raw_name.clone(),
            arity: wrapped.arity,
        });

        let raw_ref = self.node_counter.mk_ident(&raw_name, Span::generated());
        let raw = Declarator {
            name: raw_name,
            span,
            init: Some(wrapped.lambda),
        };
        let rewrapped = Declarator {
            name,
            span,
            init: Some(Node {
                h: wrapped.call,
                kind: ExprKind::Call(wrapped.wrapper, vec![raw_ref]),
            }),
        };
        Ok([raw, rewrapped])
    }
}

impl<F: FnMut(FuncSplit)> VisitMut for DeclarationSplitter<'_, F> {
    fn visit_var_decl_mut(&mut self, d: &mut VarDecl) -> Result<()> {
        let mut declarators = Vec::with_capacity(d.declarators.len());
        for mut declarator in std::mem::take(&mut d.declarators) {
            let Some(init) = declarator.init.take() else {
                declarators.push(declarator);
                continue;
            };
            match self.into_wrapped_lambda(init) {
                // The raw lambda's body is not searched for further wrappers
                Ok(wrapped) => declarators.extend(self.split(declarator.name, declarator.span, wrapped)?),
                Err(mut init) => {
                    self.visit_expression_mut(&mut init)?;
                    declarator.init = Some(init);
                    declarators.push(declarator);
                }
            }
        }
        d.declarators = declarators;
        Ok(())
    }
}

/// Split every curry-wrapper declaration in `program`, reporting each split to `record`.
pub fn split_declarations<F: FnMut(FuncSplit)>(
    program: &mut Program,
    convention: &WrapperConvention,
    node_counter: &mut NodeCounter,
    record: F,
) -> Result<()> {
    let mut splitter = DeclarationSplitter {
        convention,
        node_counter,
        bound: count_bindings(program),
        record,
    };
    splitter.visit_program_mut(program)
}

/// Pipeline pass producing the file's [`SplitRegistry`].
pub struct SplitDeclarations {
    convention: WrapperConvention,
}

impl SplitDeclarations {
    pub fn new(convention: WrapperConvention) -> Self {
        SplitDeclarations { convention }
    }
}

impl Pass for SplitDeclarations {
    fn name(&self) -> &'static str {
        "split-declarations"
    }

    fn provides(&self) -> &'static [Artifact] {
        &[Artifact::SplitRegistry]
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut registry = SplitRegistry::new();
        let inline = &mut ctx.inline;
        split_declarations(program, &self.convention, &mut ctx.node_counter, |split| {
            inline.record_split(&split);
            registry.insert(split);
        })?;
        ctx.splits = Some(registry);
        Ok(())
    }
}
