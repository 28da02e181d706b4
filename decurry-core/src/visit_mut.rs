//! Mutable AST traversal for the rewrite passes
//!
//! Same layout as [`crate::visitor`]: every hook defaults to a walk_*_mut
//! function, and a pass overrides the hooks for the node kinds it rewrites.
//! Hooks return `Result` so a pass can abort the file on a violated input
//! invariant.

use crate::ast::*;
use crate::error::Result;

pub trait VisitMut: Sized {
    fn visit_program_mut(&mut self, p: &mut Program) -> Result<()> {
        walk_program_mut(self, p)
    }

    /// A statement list: program body, block, function body, switch case or
    /// try clause. Passes that insert or remove statements override this.
    fn visit_statements_mut(&mut self, body: &mut Vec<Statement>) -> Result<()> {
        walk_statements_mut(self, body)
    }

    fn visit_statement_mut(&mut self, s: &mut Statement) -> Result<()> {
        walk_statement_mut(self, s)
    }

    fn visit_var_decl_mut(&mut self, d: &mut VarDecl) -> Result<()> {
        walk_var_decl_mut(self, d)
    }

    fn visit_expression_mut(&mut self, e: &mut Expression) -> Result<()> {
        walk_expression_mut(self, e)
    }

    fn visit_function_mut(&mut self, f: &mut FunctionLit) -> Result<()> {
        walk_function_mut(self, f)
    }
}

pub fn walk_program_mut<V: VisitMut>(v: &mut V, p: &mut Program) -> Result<()> {
    v.visit_statements_mut(&mut p.body)
}

pub fn walk_statements_mut<V: VisitMut>(v: &mut V, body: &mut Vec<Statement>) -> Result<()> {
    for s in body.iter_mut() {
        v.visit_statement_mut(s)?;
    }
    Ok(())
}

pub fn walk_statement_mut<V: VisitMut>(v: &mut V, s: &mut Statement) -> Result<()> {
    match &mut s.kind {
        StmtKind::Var(decl) => v.visit_var_decl_mut(decl),
        StmtKind::Function(func) => v.visit_function_mut(func),
        StmtKind::Expr(e) | StmtKind::Throw(e) => v.visit_expression_mut(e),
        StmtKind::Return(arg) => match arg {
            Some(e) => v.visit_expression_mut(e),
            None => Ok(()),
        },
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expression_mut(test)?;
            v.visit_statement_mut(consequent)?;
            if let Some(alt) = alternate {
                v.visit_statement_mut(alt)?;
            }
            Ok(())
        }
        StmtKind::Block(body) => v.visit_statements_mut(body),
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            v.visit_expression_mut(test)?;
            v.visit_statement_mut(body)
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => v.visit_var_decl_mut(decl)?,
                Some(ForInit::Expr(e)) => v.visit_expression_mut(e)?,
                None => {}
            }
            if let Some(test) = test {
                v.visit_expression_mut(test)?;
            }
            if let Some(update) = update {
                v.visit_expression_mut(update)?;
            }
            v.visit_statement_mut(body)
        }
        StmtKind::ForIn { object, body, .. } => {
            v.visit_expression_mut(object)?;
            v.visit_statement_mut(body)
        }
        StmtKind::Switch { discriminant, cases } => {
            v.visit_expression_mut(discriminant)?;
            for case in cases {
                if let Some(test) = &mut case.test {
                    v.visit_expression_mut(test)?;
                }
                v.visit_statements_mut(&mut case.body)?;
            }
            Ok(())
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            v.visit_statements_mut(block)?;
            if let Some(handler) = handler {
                v.visit_statements_mut(&mut handler.body)?;
            }
            if let Some(finalizer) = finalizer {
                v.visit_statements_mut(finalizer)?;
            }
            Ok(())
        }
        StmtKind::Labeled(_, body) => v.visit_statement_mut(body),
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => Ok(()),
    }
}

pub fn walk_var_decl_mut<V: VisitMut>(v: &mut V, d: &mut VarDecl) -> Result<()> {
    for declarator in &mut d.declarators {
        if let Some(init) = &mut declarator.init {
            v.visit_expression_mut(init)?;
        }
    }
    Ok(())
}

pub fn walk_function_mut<V: VisitMut>(v: &mut V, f: &mut FunctionLit) -> Result<()> {
    match &mut f.body {
        FunctionBody::Block(body) => v.visit_statements_mut(body),
        FunctionBody::Expr(e) => v.visit_expression_mut(e),
    }
}

pub fn walk_expression_mut<V: VisitMut>(v: &mut V, e: &mut Expression) -> Result<()> {
    match &mut e.kind {
        ExprKind::Identifier(_)
        | ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Regex(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This => Ok(()),
        ExprKind::Array(items) | ExprKind::Sequence(items) => walk_expressions_mut(v, items),
        ExprKind::Object(props) => {
            for prop in props {
                match prop {
                    Property::KeyValue(_, value) => v.visit_expression_mut(value)?,
                    Property::Spread(arg) => v.visit_expression_mut(arg)?,
                }
            }
            Ok(())
        }
        ExprKind::Function(func) => v.visit_function_mut(func),
        ExprKind::Unary(_, arg) | ExprKind::Spread(arg) | ExprKind::Member(arg, _) => v.visit_expression_mut(arg),
        ExprKind::Update { arg, .. } => v.visit_expression_mut(arg),
        ExprKind::Binary(_, left, right) | ExprKind::Assign(_, left, right) | ExprKind::Index(left, right) => {
            v.visit_expression_mut(left)?;
            v.visit_expression_mut(right)
        }
        ExprKind::Conditional(test, consequent, alternate) => {
            v.visit_expression_mut(test)?;
            v.visit_expression_mut(consequent)?;
            v.visit_expression_mut(alternate)
        }
        ExprKind::Call(callee, args) | ExprKind::New(callee, args) => {
            v.visit_expression_mut(callee)?;
            walk_expressions_mut(v, args)
        }
    }
}

pub fn walk_expressions_mut<V: VisitMut>(v: &mut V, items: &mut [Expression]) -> Result<()> {
    for item in items {
        v.visit_expression_mut(item)?;
    }
    Ok(())
}
