//! Strict equality for comparisons against primitive literals.
//!
//! `_Utils_eq(x, 1)` is structural equality, but when one side is a number,
//! string, boolean or `null` literal it reduces to `x === 1`.

use crate::ast::*;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};

use super::{called_name, is_spread, take_kind};

const NAME: &str = "inline-equality";

const UTILS_EQ: &str = "_Utils_eq";

/// `_Utils_eq(x, y)` with a primitive literal on either side.
fn literal_comparison(expr: &Expression) -> bool {
    if called_name(expr) != Some(UTILS_EQ) {
        return false;
    }
    match &expr.kind {
        ExprKind::Call(_, args) => {
            args.len() == 2
                && !args.iter().any(is_spread)
                && args.iter().any(|arg| arg.kind.is_primitive_literal())
        }
        _ => false,
    }
}

fn into_operands(kind: ExprKind) -> Option<(Expression, Expression)> {
    let ExprKind::Call(_, args) = kind else {
        return None;
    };
    let mut args = args.into_iter();
    Some((args.next()?, args.next()?))
}

struct EqualityInliner {
    count: usize,
}

impl EqualityInliner {
    /// Rewrites `expr` in place into `left <op> right`.
    fn rewrite(&mut self, expr: &mut Expression, call: ExprKind, op: &str) {
        if let Some((left, right)) = into_operands(call) {
            expr.kind = ExprKind::Binary(op.to_string(), Box::new(left), Box::new(right));
            self.count += 1;
        }
    }
}

impl VisitMut for EqualityInliner {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        let negated = matches!(&e.kind, ExprKind::Unary(op, arg) if op == "!" && literal_comparison(arg));
        if negated {
            if let ExprKind::Unary(_, arg) = take_kind(e) {
                self.rewrite(e, arg.kind, "!==");
            }
        } else if literal_comparison(e) {
            let call = take_kind(e);
            self.rewrite(e, call, "===");
        }
        walk_expression_mut(self, e)
    }
}

pub struct InlineEquality;

impl Pass for InlineEquality {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut inliner = EqualityInliner { count: 0 };
        inliner.visit_program_mut(program)?;
        ctx.inline.add_rewrites(NAME, inliner.count);
        Ok(())
    }
}
