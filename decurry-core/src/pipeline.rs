//! Ordered, toggleable sequence of rewrite passes.
//!
//! Passes share a [`PassContext`] holding cross-pass state. The pipeline does
//! not interpret that state; it only guarantees that a pass runs after every
//! pass whose artifacts it requires, and that structural pre-passes run before
//! everything else. Both are checked when the pipeline is built.

use std::collections::HashSet;

use log::debug;

use crate::ast::{NodeCounter, Program};
use crate::bail_pipeline;
use crate::config::Transforms;
use crate::diags::InlineContext;
use crate::error::Result;
use crate::passes::{
    arrow_fns::ArrowFunctions, inline_equality::InlineEquality, list_literals::ListLiterals,
    number_to_string::NumberToString, object_update::ObjectUpdate, replace_decls::ReplaceDeclarations,
    unused_locals::RemoveUnusedLocals, variant_shapes::VariantShapes,
};
use crate::specialize_calls::SpecializeCalls;
use crate::split_decls::{SplitDeclarations, SplitRegistry};

/// Cross-pass state produced by one pass for the benefit of later ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    SplitRegistry,
}

/// State of one file's pipeline run.
#[derive(Debug)]
pub struct PassContext {
    /// Source of ids for nodes created by passes
    pub node_counter: NodeCounter,
    pub splits: Option<SplitRegistry>,
    pub inline: InlineContext,
}

impl PassContext {
    pub fn new(node_counter: NodeCounter) -> Self {
        PassContext {
            node_counter,
            splits: None,
            inline: InlineContext::new(),
        }
    }
}

pub trait Pass {
    fn name(&self) -> &'static str;

    fn provides(&self) -> &'static [Artifact] {
        &[]
    }

    fn requires(&self) -> &'static [Artifact] {
        &[]
    }

    /// Structural pre-passes replace nodes that later passes match on.
    fn is_structural(&self) -> bool {
        false
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()>;
}

fn entry(enabled: bool, pass: impl Pass + 'static) -> (bool, Box<dyn Pass>) {
    (enabled, Box::new(pass))
}

pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.pass_names()).finish()
    }
}

impl Pipeline {
    /// Build a pipeline from `(enabled, pass)` pairs, dropping disabled ones.
    pub fn new(entries: Vec<(bool, Box<dyn Pass>)>) -> Result<Self> {
        let passes: Vec<Box<dyn Pass>> =
            entries.into_iter().filter_map(|(enabled, pass)| enabled.then_some(pass)).collect();

        let mut provided: HashSet<Artifact> = HashSet::new();
        let mut seen_regular: Option<&'static str> = None;
        for pass in &passes {
            if pass.is_structural() {
                if let Some(earlier) = seen_regular {
                    bail_pipeline!(
                        "structural pass {} must run before every other pass, but is scheduled after {}",
                        pass.name(),
                        earlier
                    );
                }
            } else if seen_regular.is_none() {
                seen_regular = Some(pass.name());
            }

            for artifact in pass.requires() {
                if !provided.contains(artifact) {
                    bail_pipeline!(
                        "{} requires {:?}, which no earlier enabled pass provides",
                        pass.name(),
                        artifact
                    );
                }
            }
            provided.extend(pass.provides().iter().copied());
        }

        Ok(Pipeline { passes })
    }

    /// The standard pass order, with each pass enabled per `transforms`.
    pub fn from_transforms(transforms: &Transforms) -> Result<Self> {
        let convention = transforms.convention.clone();
        Pipeline::new(vec![
            entry(
                !transforms.replacements.is_empty(),
                ReplaceDeclarations::new(transforms.replacements.clone())?,
            ),
            entry(transforms.variant_shapes, VariantShapes),
            entry(transforms.inline_functions, SplitDeclarations::new(convention.clone())),
            entry(transforms.inline_functions, SpecializeCalls::new(convention.clone())),
            entry(transforms.inline_equality, InlineEquality),
            entry(transforms.inline_number_to_string, NumberToString),
            entry(
                transforms.list_literals.is_some(),
                ListLiterals::new(transforms.list_literals.unwrap_or_default()),
            ),
            entry(
                transforms.object_update.is_some(),
                ObjectUpdate::new(transforms.object_update.unwrap_or_default()),
            ),
            entry(transforms.arrow_fns, ArrowFunctions),
            entry(transforms.unused_values, RemoveUnusedLocals::new(convention)),
        ])
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass in order; the first failure aborts the rest.
    pub fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        for pass in &mut self.passes {
            debug!("running pass {}", pass.name());
            pass.run(program, ctx)?;
            debug!("finished pass {}", pass.name());
        }
        Ok(())
    }
}
