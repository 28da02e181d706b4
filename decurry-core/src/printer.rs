//! JavaScript code generation from the syntax tree.
//!
//! Output is deterministic: four-space indentation, one statement per line,
//! braces around every compound-statement body and parentheses inserted only
//! where operator precedence requires them. Printing a parsed file therefore
//! normalizes its layout, and printing the same tree twice gives the same text.

use crate::ast::*;
use itertools::Itertools;
use std::fmt::Write;

const INDENT: &str = "    ";

// Binding strength of each expression form; higher binds tighter
const PREC_SEQUENCE: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_CONDITIONAL: u8 = 3;
const PREC_EXPONENT: u8 = 14;
const PREC_UNARY: u8 = 15;
const PREC_UPDATE: u8 = 16;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 19;

fn binary_precedence(op: &str) -> u8 {
    match op {
        "||" => 4,
        "&&" => 5,
        "|" => 6,
        "^" => 7,
        "&" => 8,
        "==" | "!=" | "===" | "!==" => 9,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" => 10,
        "<<" | ">>" | ">>>" => 11,
        "+" | "-" => 12,
        "*" | "/" | "%" => 13,
        "**" => PREC_EXPONENT,
        _ => PREC_CONDITIONAL + 1,
    }
}

fn precedence(expr: &Expression) -> u8 {
    match &expr.kind {
        ExprKind::Sequence(_) => PREC_SEQUENCE,
        ExprKind::Assign(..) | ExprKind::Spread(_) => PREC_ASSIGN,
        ExprKind::Function(func) if func.is_arrow => PREC_ASSIGN,
        ExprKind::Conditional(..) => PREC_CONDITIONAL,
        ExprKind::Binary(op, _, _) => binary_precedence(op),
        ExprKind::Unary(..) => PREC_UNARY,
        ExprKind::Update { prefix: true, .. } => PREC_UNARY,
        ExprKind::Update { prefix: false, .. } => PREC_UPDATE,
        ExprKind::Call(..) | ExprKind::New(..) | ExprKind::Member(..) | ExprKind::Index(..) => PREC_CALL,
        _ => PREC_PRIMARY,
    }
}

/// The sub-expression printed first, which decides how a statement starts.
fn leftmost(expr: &Expression) -> &Expression {
    match &expr.kind {
        ExprKind::Call(callee, _) => leftmost(callee),
        ExprKind::Member(object, _) | ExprKind::Index(object, _) => leftmost(object),
        ExprKind::Binary(_, left, _) | ExprKind::Assign(_, left, _) => leftmost(left),
        ExprKind::Conditional(test, _, _) => leftmost(test),
        ExprKind::Update { prefix: false, arg, .. } => leftmost(arg),
        ExprKind::Sequence(items) => items.first().map(leftmost).unwrap_or(expr),
        _ => expr,
    }
}

fn contains_call(expr: &Expression) -> bool {
    match &expr.kind {
        ExprKind::Call(..) => true,
        ExprKind::Member(object, _) | ExprKind::Index(object, _) => contains_call(object),
        _ => false,
    }
}

/// Formatter producing JavaScript source from the syntax tree.
pub struct Printer {
    output: String,
    indent: usize,
}

impl Printer {
    fn new(indent: usize) -> Self {
        Printer {
            output: String::new(),
            indent,
        }
    }

    /// Format a whole program; the text ends with a newline unless the program is empty.
    pub fn format_program(program: &Program) -> String {
        let mut printer = Printer::new(0);
        printer.write_statements(&program.body);
        printer.output
    }

    /// Format a single expression at top level.
    pub fn format_expression(expr: &Expression) -> String {
        Printer::new(0).expr(expr, PREC_SEQUENCE)
    }

    fn write_line(&mut self, content: &str) {
        let indent = INDENT.repeat(self.indent);
        let _ = writeln!(self.output, "{}{}", indent, content);
    }

    fn write_statements(&mut self, body: &[Statement]) {
        for stmt in body {
            self.write_statement(stmt);
        }
    }

    fn write_nested(&mut self, body: &[Statement]) {
        self.indent += 1;
        self.write_statements(body);
        self.indent -= 1;
    }

    /// Statements of a compound-statement body; a lone statement is printed as if braced.
    fn write_body(&mut self, body: &Statement) {
        match &body.kind {
            StmtKind::Block(stmts) => self.write_nested(stmts),
            _ => self.write_nested(std::slice::from_ref(body)),
        }
    }

    fn write_statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StmtKind::Var(decl) => {
                let line = format!("{};", self.var_decl(decl));
                self.write_line(&line);
            }
            StmtKind::Function(func) => {
                let text = self.function(func);
                self.write_line(&text);
            }
            StmtKind::Expr(expr) => {
                let text = match &leftmost(expr).kind {
                    ExprKind::Function(func) if !func.is_arrow => format!("({})", self.expr(expr, PREC_SEQUENCE)),
                    ExprKind::Object(_) => format!("({})", self.expr(expr, PREC_SEQUENCE)),
                    _ => self.expr(expr, PREC_SEQUENCE),
                };
                self.write_line(&format!("{};", text));
            }
            StmtKind::Return(None) => self.write_line("return;"),
            StmtKind::Return(Some(arg)) => {
                let line = format!("return {};", self.expr(arg, PREC_SEQUENCE));
                self.write_line(&line);
            }
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                self.write_if("", test, consequent, alternate.as_deref());
                self.write_line("}");
            }
            StmtKind::Block(body) => {
                if body.is_empty() {
                    self.write_line("{}");
                } else {
                    self.write_line("{");
                    self.write_nested(body);
                    self.write_line("}");
                }
            }
            StmtKind::While { test, body } => {
                let header = format!("while ({}) {{", self.expr(test, PREC_SEQUENCE));
                self.write_line(&header);
                self.write_body(body);
                self.write_line("}");
            }
            StmtKind::DoWhile { body, test } => {
                self.write_line("do {");
                self.write_body(body);
                let footer = format!("}} while ({});", self.expr(test, PREC_SEQUENCE));
                self.write_line(&footer);
            }
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(ForInit::Var(decl)) => self.var_decl(decl),
                    Some(ForInit::Expr(expr)) => self.expr(expr, PREC_SEQUENCE),
                    None => String::new(),
                };
                let test = test.as_ref().map(|e| format!(" {}", self.expr(e, PREC_SEQUENCE))).unwrap_or_default();
                let update = update.as_ref().map(|e| format!(" {}", self.expr(e, PREC_SEQUENCE))).unwrap_or_default();
                self.write_line(&format!("for ({};{};{}) {{", init, test, update));
                self.write_body(body);
                self.write_line("}");
            }
            StmtKind::ForIn {
                kind,
                name,
                object,
                body,
            } => {
                let binding = match kind {
                    Some(kind) => format!("{} {}", kind.keyword(), name),
                    None => name.clone(),
                };
                let header = format!("for ({} in {}) {{", binding, self.expr(object, PREC_SEQUENCE));
                self.write_line(&header);
                self.write_body(body);
                self.write_line("}");
            }
            StmtKind::Switch { discriminant, cases } => {
                let header = format!("switch ({}) {{", self.expr(discriminant, PREC_SEQUENCE));
                self.write_line(&header);
                self.indent += 1;
                for case in cases {
                    match &case.test {
                        Some(test) => {
                            let label = format!("case {}:", self.expr(test, PREC_SEQUENCE));
                            self.write_line(&label);
                        }
                        None => self.write_line("default:"),
                    }
                    self.write_nested(&case.body);
                }
                self.indent -= 1;
                self.write_line("}");
            }
            StmtKind::Break(label) => match label {
                Some(label) => self.write_line(&format!("break {};", label)),
                None => self.write_line("break;"),
            },
            StmtKind::Continue(label) => match label {
                Some(label) => self.write_line(&format!("continue {};", label)),
                None => self.write_line("continue;"),
            },
            StmtKind::Throw(arg) => {
                let line = format!("throw {};", self.expr(arg, PREC_SEQUENCE));
                self.write_line(&line);
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.write_line("try {");
                self.write_nested(block);
                if let Some(handler) = handler {
                    match &handler.param {
                        Some(param) => self.write_line(&format!("}} catch ({}) {{", param)),
                        None => self.write_line("} catch {"),
                    }
                    self.write_nested(&handler.body);
                }
                if let Some(finalizer) = finalizer {
                    self.write_line("} finally {");
                    self.write_nested(finalizer);
                }
                self.write_line("}");
            }
            StmtKind::Labeled(label, body) => {
                self.write_line(&format!("{}:", label));
                self.write_statement(body);
            }
            StmtKind::Empty => self.write_line(";"),
        }
    }

    /// Writes an if/else-if chain, leaving the final closing brace to the caller.
    fn write_if(&mut self, prefix: &str, test: &Expression, consequent: &Statement, alternate: Option<&Statement>) {
        let header = format!("{}if ({}) {{", prefix, self.expr(test, PREC_SEQUENCE));
        self.write_line(&header);
        self.write_body(consequent);

        match alternate.map(|s| &s.kind) {
            None => {}
            Some(StmtKind::If {
                test,
                consequent,
                alternate,
            }) => self.write_if("} else ", test, consequent, alternate.as_deref()),
            Some(_) => {
                self.write_line("} else {");
                if let Some(alternate) = alternate {
                    self.write_body(alternate);
                }
            }
        }
    }

    fn var_decl(&self, decl: &VarDecl) -> String {
        let declarators = decl
            .declarators
            .iter()
            .map(|d| match &d.init {
                Some(init) => format!("{} = {}", d.name, self.expr(init, PREC_ASSIGN)),
                None => d.name.clone(),
            })
            .join(", ");
        format!("{} {}", decl.kind.keyword(), declarators)
    }

    fn block(&self, body: &[Statement]) -> String {
        if body.is_empty() {
            return "{}".to_string();
        }
        let mut inner = Printer::new(self.indent + 1);
        inner.write_statements(body);
        format!("{{\n{}{}}}", inner.output, INDENT.repeat(self.indent))
    }

    fn function(&self, func: &FunctionLit) -> String {
        let params = func.params.join(", ");
        if func.is_arrow {
            let head = if func.params.len() == 1 { params } else { format!("({})", params) };
            let body = match &func.body {
                FunctionBody::Block(body) => self.block(body),
                FunctionBody::Expr(expr) => {
                    if matches!(leftmost(expr).kind, ExprKind::Object(_)) {
                        format!("({})", self.expr(expr, PREC_SEQUENCE))
                    } else {
                        self.expr(expr, PREC_ASSIGN)
                    }
                }
            };
            return format!("{} => {}", head, body);
        }

        let body = match &func.body {
            FunctionBody::Block(body) => self.block(body),
            FunctionBody::Expr(expr) => self.block(&[Node {
                h: expr.h.clone(),
                kind: StmtKind::Return(Some((**expr).clone())),
            }]),
        };
        match &func.name {
            Some(name) => format!("function {}({}) {}", name, params, body),
            None => format!("function ({}) {}", params, body),
        }
    }

    fn args(&self, args: &[Expression]) -> String {
        args.iter().map(|a| self.expr(a, PREC_ASSIGN)).join(", ")
    }

    fn prop_key(key: &PropKey) -> &str {
        match key {
            PropKey::Ident(name) => name,
            PropKey::String(raw) | PropKey::Number(raw) => raw,
        }
    }

    /// Print `expr`, parenthesized when it binds looser than `min_prec`.
    fn expr(&self, expr: &Expression, min_prec: u8) -> String {
        let text = self.expr_unwrapped(expr);
        if precedence(expr) < min_prec { format!("({})", text) } else { text }
    }

    fn expr_unwrapped(&self, expr: &Expression) -> String {
        match &expr.kind {
            ExprKind::Identifier(name) => name.clone(),
            ExprKind::Number(raw) | ExprKind::String(raw) | ExprKind::Regex(raw) => raw.clone(),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Null => "null".to_string(),
            ExprKind::This => "this".to_string(),
            ExprKind::Array(elements) => format!("[{}]", self.args(elements)),
            ExprKind::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let items = props
                    .iter()
                    .map(|p| match p {
                        Property::KeyValue(key, value) => {
                            format!("{}: {}", Self::prop_key(key), self.expr(value, PREC_ASSIGN))
                        }
                        Property::Spread(arg) => format!("...{}", self.expr(arg, PREC_ASSIGN)),
                    })
                    .join(", ");
                format!("{{ {} }}", items)
            }
            ExprKind::Function(func) => self.function(func),
            ExprKind::Unary(op, arg) => {
                let operand = self.expr(arg, PREC_UNARY);
                if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    format!("{} {}", op, operand)
                } else if (op == "-" || op == "+") && (operand.starts_with('-') || operand.starts_with('+')) {
                    // `- -x` must not print as `--x`
                    format!("{}({})", op, operand)
                } else {
                    format!("{}{}", op, operand)
                }
            }
            ExprKind::Update { op, prefix: true, arg } => format!("{}{}", op, self.expr(arg, PREC_UPDATE)),
            ExprKind::Update { op, prefix: false, arg } => format!("{}{}", self.expr(arg, PREC_CALL), op),
            ExprKind::Binary(op, left, right) => {
                let prec = binary_precedence(op);
                let (left_min, right_min) = if op == "**" {
                    // Unary operands on the left of `**` are a syntax error without parens
                    (PREC_UPDATE, prec)
                } else {
                    (prec, prec + 1)
                };
                format!("{} {} {}", self.expr(left, left_min), op, self.expr(right, right_min))
            }
            ExprKind::Assign(op, target, value) => {
                format!("{} {} {}", self.expr(target, PREC_CALL), op, self.expr(value, PREC_ASSIGN))
            }
            ExprKind::Conditional(test, consequent, alternate) => format!(
                "{} ? {} : {}",
                self.expr(test, PREC_CONDITIONAL + 1),
                self.expr(consequent, PREC_ASSIGN),
                self.expr(alternate, PREC_ASSIGN)
            ),
            ExprKind::Call(callee, args) => format!("{}({})", self.expr(callee, PREC_CALL), self.args(args)),
            ExprKind::New(callee, args) => {
                let callee_text = if contains_call(callee) {
                    format!("({})", self.expr_unwrapped(callee))
                } else {
                    self.expr(callee, PREC_CALL)
                };
                format!("new {}({})", callee_text, self.args(args))
            }
            ExprKind::Member(object, property) => format!("{}.{}", self.member_object(object), property),
            ExprKind::Index(object, index) => {
                format!("{}[{}]", self.member_object(object), self.expr(index, PREC_SEQUENCE))
            }
            ExprKind::Sequence(items) => {
                items.iter().map(|e| self.expr(e, PREC_ASSIGN)).join(", ")
            }
            ExprKind::Spread(arg) => format!("...{}", self.expr(arg, PREC_ASSIGN)),
        }
    }

    fn member_object(&self, object: &Expression) -> String {
        match &object.kind {
            // `1.toString` would lex as a malformed number
            ExprKind::Number(raw) => format!("({})", raw),
            _ => self.expr(object, PREC_CALL),
        }
    }
}

/// Convenience wrapper over [`Printer::format_program`].
pub fn print_program(program: &Program) -> String {
    Printer::format_program(program)
}
