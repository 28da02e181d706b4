//! Arrow function modernization.
//!
//! An anonymous function expression that never looks at `this` or
//! `arguments` behaves the same as an arrow function. Nested `function`
//! literals bind their own `this`, so they do not count; nested arrows do.

use std::ops::ControlFlow;

use crate::ast::*;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};
use crate::visitor::{Visitor, walk_function, walk_statements};

const NAME: &str = "arrow-functions";

/// Breaks on the first use of the enclosing function's own bindings.
struct ReceiverUse;

impl Visitor for ReceiverUse {
    type Break = ();

    fn visit_function(&mut self, f: &FunctionLit) -> ControlFlow<Self::Break> {
        if f.is_arrow {
            walk_function(self, f)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn visit_identifier(&mut self, _id: NodeId, name: &str) -> ControlFlow<Self::Break> {
        if name == "arguments" {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn visit_this(&mut self, _id: NodeId) -> ControlFlow<Self::Break> {
        ControlFlow::Break(())
    }
}

fn uses_receiver(func: &FunctionLit) -> bool {
    let flow = match &func.body {
        FunctionBody::Block(body) => walk_statements(&mut ReceiverUse, body),
        FunctionBody::Expr(e) => ReceiverUse.visit_expression(e),
    };
    flow.is_break()
}

fn convertible(func: &FunctionLit) -> bool {
    !func.is_arrow && func.name.is_none() && !func.params.iter().any(|p| p == "arguments") && !uses_receiver(func)
}

struct ArrowConverter {
    count: usize,
}

impl VisitMut for ArrowConverter {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)?;
        let ExprKind::Function(func) = &mut e.kind else {
            return Ok(());
        };
        if !convertible(func) {
            return Ok(());
        }

        func.is_arrow = true;
        if let FunctionBody::Block(body) = &mut func.body {
            if let [Node {
                kind: StmtKind::Return(Some(_)),
                ..
            }] = body.as_slice()
            {
                if let Some(Node {
                    kind: StmtKind::Return(Some(value)),
                    ..
                }) = body.pop()
                {
                    func.body = FunctionBody::Expr(Box::new(value));
                }
            }
        }
        self.count += 1;
        Ok(())
    }
}

pub struct ArrowFunctions;

impl Pass for ArrowFunctions {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut converter = ArrowConverter { count: 0 };
        converter.visit_program_mut(program)?;
        ctx.inline.add_rewrites(NAME, converter.count);
        Ok(())
    }
}
