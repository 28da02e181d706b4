//! Uniform object shapes for custom-type values.
//!
//! Variant values are object literals `{ $: tag, a: x, b: y }` whose field
//! count depends on the constructor. Padding every such literal with `null`
//! fields up to the widest one in the file gives all variants a single shape,
//! which keeps property access on them monomorphic in JS engines.

use std::ops::ControlFlow;

use crate::ast::*;
use crate::error::Result;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_expression_mut};
use crate::visitor::{Visitor, walk_expression};

const NAME: &str = "variant-shapes";

const POSITIONAL_FIELDS: &str = "abcdefghijklmnopqrstuvwxyz";

/// Number of positional fields if `props` is `$` followed by `a, b, c, ...` in order.
fn variant_width(props: &[Property]) -> Option<usize> {
    let mut keys = props.iter().map(|p| match p {
        Property::KeyValue(key, _) => key.as_name(),
        Property::Spread(_) => None,
    });
    if keys.next()? != Some("$") {
        return None;
    }
    for (i, key) in keys.enumerate() {
        // More fields than letters: not a variant we understand
        if key? != POSITIONAL_FIELDS.get(i..=i)? {
            return None;
        }
    }
    Some(props.len() - 1)
}

struct WidestVariant {
    width: usize,
}

impl Visitor for WidestVariant {
    type Break = ();

    fn visit_expression(&mut self, e: &Expression) -> ControlFlow<Self::Break> {
        if let ExprKind::Object(props) = &e.kind {
            if let Some(width) = variant_width(props) {
                self.width = self.width.max(width);
            }
        }
        walk_expression(self, e)
    }
}

struct Padder<'a> {
    width: usize,
    node_counter: &'a mut NodeCounter,
    count: usize,
}

impl VisitMut for Padder<'_> {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)?;
        let ExprKind::Object(props) = &mut e.kind else {
            return Ok(());
        };
        let Some(width) = variant_width(props) else {
            return Ok(());
        };
        if width >= self.width {
            return Ok(());
        }
        for field in POSITIONAL_FIELDS.chars().skip(width).take(self.width - width) {
            let null = self.node_counter.mk_node(ExprKind::Null, Span::generated());
            props.push(Property::KeyValue(PropKey::Ident(field.to_string()), null));
        }
        self.count += 1;
        Ok(())
    }
}

pub struct VariantShapes;

impl Pass for VariantShapes {
    fn name(&self) -> &'static str {
        NAME
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut widest = WidestVariant { width: 0 };
        let _ = widest.visit_program(program);
        if widest.width == 0 {
            return Ok(());
        }

        let mut padder = Padder {
            width: widest.width,
            node_counter: &mut ctx.node_counter,
            count: 0,
        };
        padder.visit_program_mut(program)?;
        let count = padder.count;
        ctx.inline.add_rewrites(NAME, count);
        Ok(())
    }
}
