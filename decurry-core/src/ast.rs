//! Syntax tree for the generated JavaScript the rewrite passes operate on.
//!
//! Only the subset of ECMAScript emitted by the Elm compiler is modelled, plus
//! the two ES2015 forms the rewrites introduce (arrow functions and object
//! spread). Literal tokens keep their raw source text so that printing a tree
//! nobody touched reproduces the same literals.

use crate::IdSource;

/// Source location span tracking (line, column) start and end positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Span for nodes synthesized by a pass with no source counterpart.
    pub fn generated() -> Self {
        Span::new(0, 0, 0, 0)
    }

    /// Check if this is a generated span (all zeros)
    pub fn is_generated(&self) -> bool {
        self.start_line == 0 && self.start_col == 0 && self.end_line == 0 && self.end_col == 0
    }

    /// Merge two spans to create a span covering both
    pub fn merge(&self, other: &Span) -> Span {
        if self.is_generated() {
            return *other;
        }
        if other.is_generated() {
            return *self;
        }

        let (start_line, start_col) = if self.start_line < other.start_line
            || (self.start_line == other.start_line && self.start_col <= other.start_col)
        {
            (self.start_line, self.start_col)
        } else {
            (other.start_line, other.start_col)
        };

        let (end_line, end_col) = if self.end_line > other.end_line
            || (self.end_line == other.end_line && self.end_col >= other.end_col)
        {
            (self.end_line, self.end_col)
        } else {
            (other.end_line, other.end_col)
        };

        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.start_line == self.end_line {
            write!(f, "{}:{}..{}", self.start_line, self.start_col, self.end_col)
        } else {
            write!(
                f,
                "{}:{}..{}:{}",
                self.start_line, self.start_col, self.end_line, self.end_col
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

/// Counter for generating unique node IDs within one file's run
pub type NodeCounter = IdSource<NodeId>;

/// Extension trait for NodeCounter to provide tree node creation helpers
pub trait NodeCounterExt {
    fn mk_node<T>(&mut self, kind: T, span: Span) -> Node<T>;

    fn mk_ident(&mut self, name: &str, span: Span) -> Expression {
        self.mk_node(ExprKind::Identifier(name.to_string()), span)
    }
}

impl NodeCounterExt for NodeCounter {
    fn mk_node<T>(&mut self, kind: T, span: Span) -> Node<T> {
        Node {
            h: Header { id: self.next(), span },
            kind,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Header {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Node<T> {
    pub h: Header,
    pub kind: T,
}

// Structural equality: ids and spans never take part in comparisons.
impl<T> PartialEq for Node<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

pub type Expression = Node<ExprKind>;
pub type Statement = Node<StmtKind>;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// `var a = 1, b;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub span: Span,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for the `default:` clause
    pub test: Option<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Var(VarDecl),
    /// Function declaration; the literal always carries a name
    Function(FunctionLit),
    Expr(Expression),
    Return(Option<Expression>),
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
    },
    Block(Vec<Statement>),
    While {
        test: Expression,
        body: Box<Statement>,
    },
    DoWhile {
        body: Box<Statement>,
        test: Expression,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
    },
    ForIn {
        /// Declaration keyword when the loop declares its variable
        kind: Option<VarKind>,
        name: String,
        object: Expression,
        body: Box<Statement>,
    },
    Switch {
        discriminant: Expression,
        cases: Vec<SwitchCase>,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Throw(Expression),
    Try {
        block: Vec<Statement>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Statement>>,
    },
    Labeled(String, Box<Statement>),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Statement>),
    /// Concise arrow body: `x => x + 1`
    Expr(Box<Expression>),
}

/// A function literal, in `function` or arrow form.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLit {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: FunctionBody,
    pub is_arrow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(String),
    /// Raw string literal, quotes included
    String(String),
    /// Raw numeric literal
    Number(String),
}

impl PropKey {
    /// Key name as the runtime sees it, for identifier and simple string keys.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(name) => Some(name),
            PropKey::String(raw) if raw.len() >= 2 && !raw.contains('\\') => Some(&raw[1..raw.len() - 1]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    KeyValue(PropKey, Expression),
    Spread(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Identifier(String),
    /// Raw numeric literal text
    Number(String),
    /// Raw string literal text, quotes included
    String(String),
    /// Raw regex literal text: `/pattern/flags`
    Regex(String),
    Bool(bool),
    Null,
    This,
    Array(Vec<Expression>),
    Object(Vec<Property>),
    Function(FunctionLit),
    /// Prefix operators: `!`, `-`, `+`, `~`, `typeof`, `void`, `delete`
    Unary(String, Box<Expression>),
    Update {
        op: String,
        prefix: bool,
        arg: Box<Expression>,
    },
    /// Arithmetic, comparison, logical, `in` and `instanceof`
    Binary(String, Box<Expression>, Box<Expression>),
    Assign(String, Box<Expression>, Box<Expression>),
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
    Call(Box<Expression>, Vec<Expression>),
    New(Box<Expression>, Vec<Expression>),
    Member(Box<Expression>, String),
    Index(Box<Expression>, Box<Expression>),
    Sequence(Vec<Expression>),
    Spread(Box<Expression>),
}

impl ExprKind {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_primitive_literal(&self) -> bool {
        matches!(
            self,
            ExprKind::Number(_) | ExprKind::String(_) | ExprKind::Bool(_) | ExprKind::Null
        )
    }
}
