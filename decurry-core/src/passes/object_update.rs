//! Native record update.
//!
//! `_Utils_update(record, { x: 1 })` copies the record field by field in a
//! loop; object spread or `Object.assign` does the same copy natively.

use crate::ast::*;
use crate::config::ObjectUpdateMode;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};

use super::{called_name, take_kind};

const NAME: &str = "object-update";

const UTILS_UPDATE: &str = "_Utils_update";

fn is_record_update(expr: &Expression) -> bool {
    if called_name(expr) != Some(UTILS_UPDATE) {
        return false;
    }
    match &expr.kind {
        ExprKind::Call(_, args) => match args.as_slice() {
            [record, fields] => {
                !matches!(record.kind, ExprKind::Spread(_)) && matches!(fields.kind, ExprKind::Object(_))
            }
            _ => false,
        },
        _ => false,
    }
}

struct UpdateRewriter<'a> {
    mode: ObjectUpdateMode,
    node_counter: &'a mut NodeCounter,
    count: usize,
}

impl UpdateRewriter<'_> {
    fn rewrite(&mut self, record: Expression, fields: Node<Vec<Property>>, span: Span) -> ExprKind {
        match self.mode {
            ObjectUpdateMode::UseSpread => {
                let mut props = Vec::with_capacity(fields.kind.len() + 1);
                props.push(Property::Spread(record));
                props.extend(fields.kind);
                ExprKind::Object(props)
            }
            ObjectUpdateMode::UseAssign => {
                let object = self.node_counter.mk_ident("Object", span);
                let assign = self
                    .node_counter
                    .mk_node(ExprKind::Member(Box::new(object), "assign".to_string()), span);
                let target = self.node_counter.mk_node(ExprKind::Object(Vec::new()), span);
                let fields = Node {
                    h: fields.h,
                    kind: ExprKind::Object(fields.kind),
                };
                ExprKind::Call(Box::new(assign), vec![target, record, fields])
            }
        }
    }
}

impl VisitMut for UpdateRewriter<'_> {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)?;
        if !is_record_update(e) {
            return Ok(());
        }

        if let ExprKind::Call(_, args) = take_kind(e) {
            let mut args = args.into_iter();
            if let (Some(record), Some(Node { h, kind: ExprKind::Object(props) })) = (args.next(), args.next()) {
                e.kind = self.rewrite(record, Node { h, kind: props }, e.h.span);
                self.count += 1;
            }
        }
        Ok(())
    }
}

pub struct ObjectUpdate {
    mode: ObjectUpdateMode,
}

impl ObjectUpdate {
    pub fn new(mode: ObjectUpdateMode) -> Self {
        ObjectUpdate { mode }
    }
}

impl Pass for ObjectUpdate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut rewriter = UpdateRewriter {
            mode: self.mode,
            node_counter: &mut ctx.node_counter,
            count: 0,
        };
        rewriter.visit_program_mut(program)?;
        let count = rewriter.count;
        ctx.inline.add_rewrites(NAME, count);
        Ok(())
    }
}
