//! Rewrite passes beyond curried-call specialization.
//!
//! Each pass matches one runtime idiom of the generated code and rewrites it
//! into a cheaper equivalent, counting its rewrites in the run's
//! [`crate::diags::InlineContext`] under the pass name.

use crate::ast::{ExprKind, Expression};

pub mod arrow_fns;
pub mod inline_equality;
pub mod list_literals;
pub mod number_to_string;
pub mod object_update;
pub mod replace_decls;
pub mod unused_locals;
pub mod variant_shapes;


/// Name of the identifier being called, for `name(...)`.
pub(crate) fn called_name(expr: &Expression) -> Option<&str> {
    match &expr.kind {
        ExprKind::Call(callee, _) => callee.kind.as_identifier(),
        _ => None,
    }
}

/// Move the node's kind out, leaving a placeholder to be overwritten.
pub(crate) fn take_kind(expr: &mut Expression) -> ExprKind {
    std::mem::replace(&mut expr.kind, ExprKind::Null)
}

pub(crate) fn is_spread(expr: &Expression) -> bool {
    matches!(expr.kind, ExprKind::Spread(_))
}
