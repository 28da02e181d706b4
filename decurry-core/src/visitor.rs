//! Read-only AST visitor for analyses over the JavaScript tree
//!
//! Analyses (binding collection, reference counting, `this` detection) implement
//! the Visitor trait and override only the hooks they need, while the walk_*
//! functions handle the actual tree traversal.

use crate::ast::*;
use std::ops::ControlFlow;

/// Visitor trait for traversing the AST
///
/// All methods have default implementations that delegate to walk_* functions.
/// Implementors can override specific hooks to customize behavior.
///
/// The Break associated type allows visitors to return data when they need to
/// short-circuit traversal.
pub trait Visitor: Sized {
    type Break;

    fn visit_program(&mut self, p: &Program) -> ControlFlow<Self::Break> {
        walk_program(self, p)
    }

    fn visit_statement(&mut self, s: &Statement) -> ControlFlow<Self::Break> {
        walk_statement(self, s)
    }

    fn visit_var_decl(&mut self, d: &VarDecl) -> ControlFlow<Self::Break> {
        walk_var_decl(self, d)
    }

    fn visit_expression(&mut self, e: &Expression) -> ControlFlow<Self::Break> {
        walk_expression(self, e)
    }

    fn visit_function(&mut self, f: &FunctionLit) -> ControlFlow<Self::Break> {
        walk_function(self, f)
    }

    /// A name introduced by a declarator, function name, parameter, catch
    /// parameter or for-in variable.
    fn visit_binding(&mut self, _name: &str) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    /// An identifier in expression position.
    fn visit_identifier(&mut self, _id: NodeId, _name: &str) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_this(&mut self, _id: NodeId) -> ControlFlow<Self::Break> {
        ControlFlow::Continue(())
    }
}

// --- Walk functions ---

pub fn walk_program<V: Visitor>(v: &mut V, p: &Program) -> ControlFlow<V::Break> {
    walk_statements(v, &p.body)
}

pub fn walk_statements<V: Visitor>(v: &mut V, body: &[Statement]) -> ControlFlow<V::Break> {
    for s in body {
        v.visit_statement(s)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_statement<V: Visitor>(v: &mut V, s: &Statement) -> ControlFlow<V::Break> {
    match &s.kind {
        StmtKind::Var(decl) => v.visit_var_decl(decl),
        StmtKind::Function(func) => v.visit_function(func),
        StmtKind::Expr(e) | StmtKind::Throw(e) => v.visit_expression(e),
        StmtKind::Return(arg) => match arg {
            Some(e) => v.visit_expression(e),
            None => ControlFlow::Continue(()),
        },
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            v.visit_expression(test)?;
            v.visit_statement(consequent)?;
            if let Some(alt) = alternate {
                v.visit_statement(alt)?;
            }
            ControlFlow::Continue(())
        }
        StmtKind::Block(body) => walk_statements(v, body),
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            v.visit_expression(test)?;
            v.visit_statement(body)
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => v.visit_var_decl(decl)?,
                Some(ForInit::Expr(e)) => v.visit_expression(e)?,
                None => {}
            }
            if let Some(test) = test {
                v.visit_expression(test)?;
            }
            if let Some(update) = update {
                v.visit_expression(update)?;
            }
            v.visit_statement(body)
        }
        StmtKind::ForIn {
            kind,
            name,
            object,
            body,
        } => {
            if kind.is_some() {
                v.visit_binding(name)?;
            } else {
                v.visit_identifier(s.h.id, name)?;
            }
            v.visit_expression(object)?;
            v.visit_statement(body)
        }
        StmtKind::Switch { discriminant, cases } => {
            v.visit_expression(discriminant)?;
            for case in cases {
                if let Some(test) = &case.test {
                    v.visit_expression(test)?;
                }
                walk_statements(v, &case.body)?;
            }
            ControlFlow::Continue(())
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            walk_statements(v, block)?;
            if let Some(handler) = handler {
                if let Some(param) = &handler.param {
                    v.visit_binding(param)?;
                }
                walk_statements(v, &handler.body)?;
            }
            if let Some(finalizer) = finalizer {
                walk_statements(v, finalizer)?;
            }
            ControlFlow::Continue(())
        }
        StmtKind::Labeled(_, body) => v.visit_statement(body),
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => ControlFlow::Continue(()),
    }
}

pub fn walk_var_decl<V: Visitor>(v: &mut V, d: &VarDecl) -> ControlFlow<V::Break> {
    for declarator in &d.declarators {
        v.visit_binding(&declarator.name)?;
        if let Some(init) = &declarator.init {
            v.visit_expression(init)?;
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_function<V: Visitor>(v: &mut V, f: &FunctionLit) -> ControlFlow<V::Break> {
    if let Some(name) = &f.name {
        v.visit_binding(name)?;
    }
    for param in &f.params {
        v.visit_binding(param)?;
    }
    match &f.body {
        FunctionBody::Block(body) => walk_statements(v, body),
        FunctionBody::Expr(e) => v.visit_expression(e),
    }
}

pub fn walk_expression<V: Visitor>(v: &mut V, e: &Expression) -> ControlFlow<V::Break> {
    match &e.kind {
        ExprKind::Identifier(name) => v.visit_identifier(e.h.id, name),
        ExprKind::This => v.visit_this(e.h.id),
        ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Regex(_)
        | ExprKind::Bool(_)
        | ExprKind::Null => ControlFlow::Continue(()),
        ExprKind::Array(items) | ExprKind::Sequence(items) => walk_expressions(v, items),
        ExprKind::Object(props) => {
            for prop in props {
                match prop {
                    Property::KeyValue(_, value) => v.visit_expression(value)?,
                    Property::Spread(arg) => v.visit_expression(arg)?,
                }
            }
            ControlFlow::Continue(())
        }
        ExprKind::Function(func) => v.visit_function(func),
        ExprKind::Unary(_, arg) | ExprKind::Spread(arg) | ExprKind::Member(arg, _) => v.visit_expression(arg),
        ExprKind::Update { arg, .. } => v.visit_expression(arg),
        ExprKind::Binary(_, left, right) | ExprKind::Assign(_, left, right) | ExprKind::Index(left, right) => {
            v.visit_expression(left)?;
            v.visit_expression(right)
        }
        ExprKind::Conditional(test, consequent, alternate) => {
            v.visit_expression(test)?;
            v.visit_expression(consequent)?;
            v.visit_expression(alternate)
        }
        ExprKind::Call(callee, args) | ExprKind::New(callee, args) => {
            v.visit_expression(callee)?;
            walk_expressions(v, args)
        }
    }
}

pub fn walk_expressions<V: Visitor>(v: &mut V, items: &[Expression]) -> ControlFlow<V::Break> {
    for item in items {
        v.visit_expression(item)?;
    }
    ControlFlow::Continue(())
}
