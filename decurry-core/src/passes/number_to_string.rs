//! Number formatting through string concatenation.
//!
//! `String.fromInt` and `String.fromFloat` are plain `String(n)` calls at
//! runtime, which `n + ""` expresses without the call.

use crate::ast::*;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};

use super::{called_name, is_spread, take_kind};

const NAME: &str = "number-to-string";

const NUMBER_FORMATTERS: [&str; 3] = [
    "$elm$core$String$fromInt",
    "$elm$core$String$fromFloat",
    "_String_fromNumber",
];

struct Concatenator<'a> {
    node_counter: &'a mut NodeCounter,
    count: usize,
}

impl VisitMut for Concatenator<'_> {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)?;
        let is_formatter = called_name(e).is_some_and(|name| NUMBER_FORMATTERS.contains(&name));
        let single_arg = matches!(&e.kind, ExprKind::Call(_, args) if args.len() == 1 && !is_spread(&args[0]));
        if !is_formatter || !single_arg {
            return Ok(());
        }

        if let ExprKind::Call(_, args) = take_kind(e) {
            if let Some(arg) = args.into_iter().next() {
                let empty = self
                    .node_counter
                    .mk_node(ExprKind::String("\"\"".to_string()), Span::generated());
                e.kind = ExprKind::Binary("+".to_string(), Box::new(arg), Box::new(empty));
                self.count += 1;
            }
        }
        Ok(())
    }
}

pub struct NumberToString;

impl Pass for NumberToString {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut concatenator = Concatenator {
            node_counter: &mut ctx.node_counter,
            count: 0,
        };
        concatenator.visit_program_mut(program)?;
        let count = concatenator.count;
        ctx.inline.add_rewrites(NAME, count);
        Ok(())
    }
}
