pub mod ast;
pub mod batch;
pub mod config;
pub mod convention;
pub mod diags;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod passes;
pub mod pipeline;
pub mod printer;
pub mod specialize_calls;
pub mod split_decls;
pub mod visit_mut;
pub mod visitor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod printer_tests;
#[cfg(test)]
mod specialize_calls_tests;

use std::marker::PhantomData;

use ast::{NodeCounter, Program};
use config::Transforms;
use diags::InlineReport;
use error::Result;
use pipeline::{PassContext, Pipeline};
use split_decls::SplitRegistry;

// =============================================================================
// Generic ID allocation
// =============================================================================

/// Generic counter for generating unique IDs.
///
/// The ID type must implement `From<u32>` to convert the raw counter value.
#[derive(Debug, Clone)]
pub struct IdSource<Id> {
    next_id: u32,
    _phantom: PhantomData<Id>,
}

impl<Id: From<u32>> IdSource<Id> {
    pub fn new() -> Self {
        IdSource {
            next_id: 0,
            _phantom: PhantomData,
        }
    }

    pub fn next(&mut self) -> Id {
        let id = Id::from(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<Id: From<u32>> Default for IdSource<Id> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Typestate pipeline
// =============================================================================
//
// Each struct is one stage of a file's run. Methods consume `self` and return
// the next stage:
//
//   Compiler::parse(source, file_id)   -> Parsed
//     -> .transform(&mut pipeline)     -> Transformed
//       -> .print()                    -> Printed
//
// The node counter created by parsing travels with the tree, so nodes created
// by passes never reuse an id.

/// Entry point. Use `Compiler::parse()` to start a file's run.
pub struct Compiler;

impl Compiler {
    /// Parse one file. `file_id` names the file in its diagnostics report.
    pub fn parse(source: &str, file_id: &str) -> Result<Parsed> {
        let tokens = lexer::tokenize(source).map_err(|e| err_parse!("{}", e))?;
        let mut node_counter = NodeCounter::new();
        let program = parser::Parser::new(tokens, &mut node_counter).parse()?;
        Ok(Parsed {
            program,
            node_counter,
            file_id: file_id.to_string(),
        })
    }
}

/// Source has been parsed into a tree
pub struct Parsed {
    pub program: Program,
    pub node_counter: NodeCounter,
    pub file_id: String,
}

impl Parsed {
    /// Run every enabled pass of `pipeline`; the first failing pass aborts the file.
    pub fn transform(mut self, pipeline: &mut Pipeline) -> Result<Transformed> {
        let mut ctx = PassContext::new(self.node_counter);
        pipeline.run(&mut self.program, &mut ctx)?;
        let report = ctx.inline.report(&self.file_id);
        Ok(Transformed {
            program: self.program,
            splits: ctx.splits.unwrap_or_default(),
            report,
        })
    }

    /// Print the tree as parsed.
    pub fn print(&self) -> String {
        printer::print_program(&self.program)
    }
}

/// All passes have run
pub struct Transformed {
    pub program: Program,
    /// Empty when declaration splitting was disabled
    pub splits: SplitRegistry,
    pub report: InlineReport,
}

impl Transformed {
    pub fn print(self) -> Printed {
        Printed {
            code: printer::print_program(&self.program),
            report: self.report,
        }
    }
}

/// Final output of one file's run
#[derive(Debug, Clone, PartialEq)]
pub struct Printed {
    pub code: String,
    pub report: InlineReport,
}

/// Parse, transform and print one file with the standard pass order.
pub fn transform_source(source: &str, file_id: &str, transforms: &Transforms) -> Result<Printed> {
    let mut pipeline = Pipeline::from_transforms(transforms)?;
    Ok(Compiler::parse(source, file_id)?.transform(&mut pipeline)?.print())
}
