//! Dead local elimination.
//!
//! Removes variable declarators and function declarations inside function
//! bodies whose name is referenced nowhere in the file. A declarator is only
//! dropped when evaluating its initializer cannot have side effects. Removing
//! one declaration can orphan others, so the pass repeats until nothing
//! changes.
//!
//! References are counted by name over the whole file, ignoring scopes: a
//! shadowed name used anywhere keeps every declaration of it alive.

use std::collections::HashMap;
use std::ops::ControlFlow;

use log::debug;

use crate::ast::*;
use crate::convention::WrapperConvention;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_function_mut, walk_statements_mut};
use crate::visitor::Visitor;

const NAME: &str = "unused-locals";

const MAX_ITERS: usize = 8;

#[derive(Default)]
struct ReferenceCounter {
    refs: HashMap<String, usize>,
}

impl Visitor for ReferenceCounter {
    type Break = ();

    fn visit_identifier(&mut self, _id: NodeId, name: &str) -> ControlFlow<Self::Break> {
        *self.refs.entry(name.to_string()).or_insert(0) += 1;
        ControlFlow::Continue(())
    }
}

fn count_references(program: &Program) -> HashMap<String, usize> {
    let mut counter = ReferenceCounter::default();
    let _ = counter.visit_program(program);
    counter.refs
}

/// True if evaluating `expr` cannot be observed apart from its value.
///
/// Property reads count as impure since they may run getters. `in` and
/// `instanceof` throw on non-object operands, so they are impure too. Other
/// operators are assumed not to reach a user `valueOf`/`toString`, which holds
/// for generated code that only applies them to primitives.
fn is_pure(expr: &Expression, convention: &WrapperConvention) -> bool {
    let pure = |e: &Expression| is_pure(e, convention);
    match &expr.kind {
        ExprKind::Identifier(_)
        | ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Regex(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This
        | ExprKind::Function(_) => true,
        ExprKind::Array(items) => items.iter().all(pure),
        ExprKind::Object(props) => props.iter().all(|prop| match prop {
            Property::KeyValue(_, value) => pure(value),
            Property::Spread(_) => false,
        }),
        ExprKind::Unary(op, arg) => op != "delete" && pure(arg),
        ExprKind::Binary(op, left, right) => {
            !matches!(op.as_str(), "in" | "instanceof") && pure(left) && pure(right)
        }
        ExprKind::Conditional(test, consequent, alternate) => pure(test) && pure(consequent) && pure(alternate),
        ExprKind::Sequence(items) => items.iter().all(pure),
        ExprKind::Call(callee, args) => {
            callee
                .kind
                .as_identifier()
                .is_some_and(|name| convention.curry_arity(name).is_some())
                && args.iter().all(pure)
        }
        ExprKind::Spread(_)
        | ExprKind::Member(..)
        | ExprKind::Index(..)
        | ExprKind::New(..)
        | ExprKind::Assign(..)
        | ExprKind::Update { .. } => false,
    }
}

struct Pruner<'a> {
    refs: &'a HashMap<String, usize>,
    convention: &'a WrapperConvention,
    depth: usize,
    removed: usize,
}

impl Pruner<'_> {
    fn unreferenced(&self, name: &str) -> bool {
        !self.refs.contains_key(name)
    }

    /// Drops dead declarators; false if the statement should go entirely.
    fn keep(&mut self, s: &mut Statement) -> bool {
        match &mut s.kind {
            StmtKind::Var(decl) => {
                let before = decl.declarators.len();
                decl.declarators.retain(|d| {
                    let dead = self.unreferenced(&d.name)
                        && d.init.as_ref().map_or(true, |init| is_pure(init, self.convention));
                    if dead {
                        debug!("removing unused local {}", d.name);
                    }
                    !dead
                });
                self.removed += before - decl.declarators.len();
                !decl.declarators.is_empty()
            }
            StmtKind::Function(func) => match &func.name {
                Some(name) if self.unreferenced(name) => {
                    debug!("removing unused function {}", name);
                    self.removed += 1;
                    false
                }
                _ => true,
            },
            _ => true,
        }
    }
}

impl VisitMut for Pruner<'_> {
    fn visit_statements_mut(&mut self, body: &mut Vec<Statement>) -> Result<()> {
        if self.depth > 0 {
            body.retain_mut(|s| self.keep(s));
        }
        walk_statements_mut(self, body)
    }

    fn visit_function_mut(&mut self, f: &mut FunctionLit) -> Result<()> {
        self.depth += 1;
        let result = walk_function_mut(self, f);
        self.depth -= 1;
        result
    }
}

pub struct RemoveUnusedLocals {
    convention: WrapperConvention,
}

impl RemoveUnusedLocals {
    /// Calls to curry wrappers of `convention` are treated as side-effect free.
    pub fn new(convention: WrapperConvention) -> Self {
        RemoveUnusedLocals { convention }
    }
}

impl Pass for RemoveUnusedLocals {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut total = 0;
        for iteration in 1..=MAX_ITERS {
            let refs = count_references(program);
            let mut pruner = Pruner {
                refs: &refs,
                convention: &self.convention,
                depth: 0,
                removed: 0,
            };
            pruner.visit_program_mut(program)?;
            debug!("{}: iteration {} removed {} declaration(s)", NAME, iteration, pruner.removed);
            if pruner.removed == 0 {
                break;
            }
            total += pruner.removed;
        }
        ctx.inline.add_rewrites(NAME, total);
        Ok(())
    }
}
