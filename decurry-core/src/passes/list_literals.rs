//! Inline construction of list literals.
//!
//! `_List_fromArray([a, b])` allocates the array and then walks it to build
//! the cons cells. Building the cells directly skips both steps.

use crate::ast::*;
use crate::config::InlineLists;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};

use super::{called_name, is_spread, take_kind};

const NAME: &str = "list-literals";

const FROM_ARRAY: &str = "_List_fromArray";
const LIST_NIL: &str = "_List_Nil";
const LIST_CONS: &str = "_List_Cons";

/// Tag of a cons cell in the object representation.
const CONS_TAG: &str = "1";

struct ListBuilder<'a> {
    mode: InlineLists,
    node_counter: &'a mut NodeCounter,
    count: usize,
}

impl ListBuilder<'_> {
    fn cons(&mut self, head: Expression, tail: Expression) -> ExprKind {
        match self.mode {
            InlineLists::AsCons => {
                let callee = self.node_counter.mk_ident(LIST_CONS, Span::generated());
                ExprKind::Call(Box::new(callee), vec![head, tail])
            }
            InlineLists::AsObjects => {
                let tag = self
                    .node_counter
                    .mk_node(ExprKind::Number(CONS_TAG.to_string()), Span::generated());
                ExprKind::Object(vec![
                    Property::KeyValue(PropKey::Ident("$".to_string()), tag),
                    Property::KeyValue(PropKey::Ident("a".to_string()), head),
                    Property::KeyValue(PropKey::Ident("b".to_string()), tail),
                ])
            }
        }
    }

    /// Folds the items from the right, starting from `_List_Nil`.
    fn build(&mut self, items: Vec<Expression>, span: Span) -> ExprKind {
        let mut list = self.node_counter.mk_ident(LIST_NIL, span);
        for item in items.into_iter().rev() {
            let cell = self.cons(item, list);
            list = self.node_counter.mk_node(cell, span);
        }
        list.kind
    }
}

/// `_List_fromArray([...])` with no spread elements.
fn literal_items(expr: &Expression) -> bool {
    if called_name(expr) != Some(FROM_ARRAY) {
        return false;
    }
    match &expr.kind {
        ExprKind::Call(_, args) => match args.as_slice() {
            [array] => matches!(&array.kind, ExprKind::Array(items) if !items.iter().any(is_spread)),
            _ => false,
        },
        _ => false,
    }
}

impl VisitMut for ListBuilder<'_> {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)?;
        if !literal_items(e) {
            return Ok(());
        }

        let ExprKind::Call(_, args) = take_kind(e) else {
            return Ok(());
        };
        if let Some(Expression {
            kind: ExprKind::Array(items),
            ..
        }) = args.into_iter().next()
        {
            e.kind = self.build(items, e.h.span);
            self.count += 1;
        }
        Ok(())
    }
}

pub struct ListLiterals {
    mode: InlineLists,
}

impl ListLiterals {
    pub fn new(mode: InlineLists) -> Self {
        ListLiterals { mode }
    }
}

impl Pass for ListLiterals {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut builder = ListBuilder {
            mode: self.mode,
            node_counter: &mut ctx.node_counter,
            count: 0,
        };
        builder.visit_program_mut(program)?;
        let count = builder.count;
        ctx.inline.add_rewrites(NAME, count);
        Ok(())
    }
}
