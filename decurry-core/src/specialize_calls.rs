//! Call-site specialization of apply-wrapper calls.
//!
//! With a registry entry `{ add, add_raw, 2 }`, `apply2(add, x, y)` becomes
//! `add_raw(x, y)`. Calls whose target was not split, was split with a
//! different arity, or is also bound somewhere without being split (a
//! parameter, say) are partial applications and stay as they are.

use std::collections::HashMap;

use log::debug;

use crate::ast::*;
use crate::{bail_apply_at, bail_pipeline};
use crate::convention::WrapperConvention;
use crate::diags::InlineContext;
use crate::error::Result;
use crate::pipeline::{Artifact, Pass, PassContext};
use crate::split_decls::{SplitRegistry, count_bindings};
use crate::visit_mut::{VisitMut, walk_expression_mut};

struct CallSpecializer<'a> {
    convention: &'a WrapperConvention,
    registry: &'a SplitRegistry,
    bindings: HashMap<String, usize>,
    inline: &'a mut InlineContext,
}

impl CallSpecializer<'_> {
    fn specialize(&mut self, expr: &mut Expression) -> Result<()> {
        let ExprKind::Call(callee, args) = &mut expr.kind else {
            return Ok(());
        };
        let Some(apply_name) = callee.kind.as_identifier() else {
            return Ok(());
        };
        let Some(arity) = self.convention.apply_arity(apply_name) else {
            return Ok(());
        };

        let Some(target) = args.first().and_then(|a| a.kind.as_identifier()) else {
            bail_apply_at!(
                expr.h.span,
                "first argument of {} call is not an identifier",
                apply_name
            );
        };
        let given = args.len() - 1;
        if given != arity {
            bail_apply_at!(
                expr.h.span,
                "{} call on {} expects {} argument(s) but got {}",
                apply_name,
                target,
                arity,
                given
            );
        }

        let bindings = self.bindings.get(target).copied().unwrap_or(0);
        match self.registry.get(target) {
            Some(split) if split.arity != arity => {
                debug!(
                    "{} is split with arity {} but applied through {}, leaving the call alone",
                    target, split.arity, apply_name
                );
                self.inline.record_partial_application(target);
            }
            Some(_) if self.registry.resolve(target, bindings).is_none() => {
                debug!(
                    "{} has {} binding(s) but only {} were split with one arity, leaving the call alone",
                    target,
                    bindings,
                    self.registry.declarations(target)
                );
                self.inline.record_partial_application(target);
            }
            Some(split) => {
                debug!("specialized {}({}, ..) into {}", apply_name, target, split.raw_lambda_name);
                self.inline.record_inlined(target);
                let raw_span = args[0].h.span;
                callee.kind = ExprKind::Identifier(split.raw_lambda_name.clone());
                callee.h.span = raw_span;
                args.remove(0);
            }
            None => {
                self.inline.record_partial_application(target);
            }
        }
        Ok(())
    }
}

impl VisitMut for CallSpecializer<'_> {
    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        // Arguments first, so nested applies are rewritten before their enclosing call
        walk_expression_mut(self, e)?;
        self.specialize(e)
    }
}

/// Rewrite every apply-wrapper call in `program` whose target is in `registry`.
pub fn specialize_calls(
    program: &mut Program,
    convention: &WrapperConvention,
    registry: &SplitRegistry,
    inline: &mut InlineContext,
) -> Result<()> {
    let mut specializer = CallSpecializer {
        convention,
        registry,
        bindings: count_bindings(program),
        inline,
    };
    specializer.visit_program_mut(program)
}

/// Pipeline pass consuming the [`SplitRegistry`] produced by declaration splitting.
pub struct SpecializeCalls {
    convention: WrapperConvention,
}

impl SpecializeCalls {
    pub fn new(convention: WrapperConvention) -> Self {
        SpecializeCalls { convention }
    }
}

impl Pass for SpecializeCalls {
    fn name(&self) -> &'static str {
        "specialize-calls"
    }

    fn requires(&self) -> &'static [Artifact] {
        &[Artifact::SplitRegistry]
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let Some(registry) = &ctx.splits else {
            bail_pipeline!("{} ran before declarations were split", self.name());
        };
        specialize_calls(program, &self.convention, registry, &mut ctx.inline)
    }
}
