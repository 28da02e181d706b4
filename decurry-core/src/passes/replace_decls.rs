//! Structural replacement of named declarations.
//!
//! Used to swap runtime helpers for better-behaved versions before any other
//! pass looks at the tree. A `var` declarator takes the replacement expression
//! as its new initializer; a function declaration takes the parameters and
//! body of the replacement, which then has to be a function literal.

use indexmap::IndexMap;
use log::debug;

use crate::ast::*;
use crate::err_config;
use crate::error::Result;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::pipeline::{Pass, PassContext};
use crate::visit_mut::{VisitMut, walk_function_mut, walk_statement_mut};

const NAME: &str = "replace-declarations";

fn parse_replacement(name: &str, source: &str, node_counter: &mut NodeCounter) -> Result<Expression> {
    let tokens = tokenize(source).map_err(|e| err_config!("replacement for {}: {}", name, e))?;
    Parser::new(tokens, node_counter)
        .parse_standalone_expression()
        .map_err(|e| err_config!("replacement for {}: {}", name, e))
}

struct Replacer<'a> {
    replacements: &'a IndexMap<String, Expression>,
    count: usize,
}

impl Replacer<'_> {
    fn replace_function(&mut self, func: &mut FunctionLit) -> Result<bool> {
        let Some(name) = &func.name else {
            return Ok(false);
        };
        let Some(replacement) = self.replacements.get(name) else {
            return Ok(false);
        };
        let ExprKind::Function(source) = &replacement.kind else {
            return Err(err_config!(
                "{} is a function declaration, so its replacement must be a function literal",
                name
            ));
        };

        debug!("replacing function declaration {}", name);
        func.params = source.params.clone();
        func.body = match &source.body {
            FunctionBody::Block(body) => FunctionBody::Block(body.clone()),
            FunctionBody::Expr(expr) => FunctionBody::Block(vec![Node {
                h: expr.h.clone(),
                kind: StmtKind::Return(Some((**expr).clone())),
            }]),
        };
        self.count += 1;
        Ok(true)
    }
}

impl VisitMut for Replacer<'_> {
    fn visit_statement_mut(&mut self, s: &mut Statement) -> Result<()> {
        if let StmtKind::Function(func) = &mut s.kind {
            if self.replace_function(func)? {
                return Ok(());
            }
            return walk_function_mut(self, func);
        }
        walk_statement_mut(self, s)
    }

    fn visit_var_decl_mut(&mut self, d: &mut VarDecl) -> Result<()> {
        for declarator in &mut d.declarators {
            match self.replacements.get(&declarator.name) {
                Some(replacement) => {
                    debug!("replacing declaration {}", declarator.name);
                    declarator.init = Some(replacement.clone());
                    self.count += 1;
                }
                None => {
                    if let Some(init) = &mut declarator.init {
                        self.visit_expression_mut(init)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Structural pre-pass replacing declarations by name.
pub struct ReplaceDeclarations {
    sources: IndexMap<String, String>,
}

impl ReplaceDeclarations {
    /// Fails if any replacement source is not a single JavaScript expression.
    pub fn new(sources: IndexMap<String, String>) -> Result<Self> {
        let mut scratch = NodeCounter::new();
        for (name, source) in &sources {
            parse_replacement(name, source, &mut scratch)?;
        }
        Ok(ReplaceDeclarations { sources })
    }
}

impl Pass for ReplaceDeclarations {
    fn name(&self) -> &'static str {
        NAME
    }

    fn is_structural(&self) -> bool {
        true
    }

    fn run(&mut self, program: &mut Program, ctx: &mut PassContext) -> Result<()> {
        let mut replacements = IndexMap::new();
        for (name, source) in &self.sources {
            replacements.insert(name.clone(), parse_replacement(name, source, &mut ctx.node_counter)?);
        }

        let mut replacer = Replacer {
            replacements: &replacements,
            count: 0,
        };
        replacer.visit_program_mut(program)?;
        ctx.inline.add_rewrites(NAME, replacer.count);
        Ok(())
    }
}
