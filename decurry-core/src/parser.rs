use crate::ast::*;
use crate::error::Result;
use crate::lexer::{LocatedToken, Token};
use crate::{bail_parse_at, err_parse_at};
use log::trace;


pub struct Parser<'a> {
    tokens: Vec<LocatedToken>,
    current: usize,
    node_counter: &'a mut NodeCounter,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<LocatedToken>, node_counter: &'a mut NodeCounter) -> Self {
        Parser {
            tokens,
            current: 0,
            node_counter,
        }
    }

    /// Get the span of the current token
    fn current_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .map(|t| t.span)
            .unwrap_or(Span::new(0, 0, 0, 0))
    }

    /// Get the span of the previous token
    fn previous_span(&self) -> Span {
        if self.current > 0 {
            self.tokens.get(self.current - 1).map(|t| t.span).unwrap_or(Span::new(0, 0, 0, 0))
        } else {
            Span::new(0, 0, 0, 0)
        }
    }

    pub fn parse(&mut self) -> Result<Program> {
        let mut body = Vec::new();

        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }

        Ok(Program { body })
    }

    /// Parse a lone expression that must consume the whole token stream.
    pub fn parse_standalone_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        if self.check(&Token::Semicolon) {
            self.advance();
        }
        if !self.is_at_end() {
            bail_parse_at!(
                self.current_span(),
                "Unexpected {:?} after expression",
                self.peek()
            );
        }
        Ok(expr)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> Result<Statement> {
        trace!("parse_statement: next token = {:?}", self.peek());
        let start_span = self.current_span();

        let kind = match self.peek() {
            Some(Token::LeftBrace) => StmtKind::Block(self.parse_block()?),
            Some(Token::Var) | Some(Token::Let) | Some(Token::Const) => {
                let decl = self.parse_var_decl()?;
                self.consume_semicolon()?;
                StmtKind::Var(decl)
            }
            Some(Token::Function) => {
                let func = self.parse_function_literal()?;
                if func.name.is_none() {
                    bail_parse_at!(start_span, "Function declaration requires a name");
                }
                StmtKind::Function(func)
            }
            Some(Token::Return) => {
                self.advance();
                let arg = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                StmtKind::Return(arg)
            }
            Some(Token::If) => self.parse_if()?,
            Some(Token::While) => {
                self.advance();
                let test = self.parse_paren_expression()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { test, body }
            }
            Some(Token::Do) => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect(Token::While)?;
                let test = self.parse_paren_expression()?;
                if self.check(&Token::Semicolon) {
                    self.advance();
                }
                StmtKind::DoWhile { body, test }
            }
            Some(Token::For) => self.parse_for()?,
            Some(Token::Switch) => self.parse_switch()?,
            Some(Token::Break) => {
                self.advance();
                let label = self.parse_jump_label();
                self.consume_semicolon()?;
                StmtKind::Break(label)
            }
            Some(Token::Continue) => {
                self.advance();
                let label = self.parse_jump_label();
                self.consume_semicolon()?;
                StmtKind::Continue(label)
            }
            Some(Token::Throw) => {
                self.advance();
                let arg = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Throw(arg)
            }
            Some(Token::Try) => self.parse_try()?,
            Some(Token::Semicolon) => {
                self.advance();
                StmtKind::Empty
            }
            Some(Token::Identifier(name)) if matches!(self.peek2(), Some((_, Token::Colon))) => {
                let label = name.clone();
                self.advance();
                self.advance();
                StmtKind::Labeled(label, Box::new(self.parse_statement()?))
            }
            Some(_) => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                StmtKind::Expr(expr)
            }
            None => bail_parse_at!(start_span, "Unexpected end of input"),
        };

        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(kind, span))
    }

    fn parse_block(&mut self) -> Result<Vec<Statement>> {
        self.expect(Token::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&Token::RightBrace) {
            if self.is_at_end() {
                bail_parse_at!(self.current_span(), "Unclosed block");
            }
            body.push(self.parse_statement()?);
        }
        self.expect(Token::RightBrace)?;
        Ok(body)
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        trace!("parse_var_decl: next token = {:?}", self.peek());
        let keyword_span = self.current_span();
        let kind = match self.advance() {
            Some(Token::Var) => VarKind::Var,
            Some(Token::Let) => VarKind::Let,
            Some(Token::Const) => VarKind::Const,
            _ => bail_parse_at!(keyword_span, "Expected var, let or const"),
        };

        let mut declarators = Vec::new();
        loop {
            let name_span = self.current_span();
            let name = self.expect_identifier()?;
            let init = if self.check_assign("=") {
                self.advance();
                Some(self.parse_assignment()?)
            } else {
                None
            };
            let span = name_span.merge(&self.previous_span());
            declarators.push(Declarator { name, span, init });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(VarDecl { kind, declarators })
    }

    fn parse_if(&mut self) -> Result<StmtKind> {
        self.expect(Token::If)?;
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.check(&Token::Else) {
            self.advance();
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(StmtKind::If {
            test,
            consequent,
            alternate,
        })
    }

    fn parse_for(&mut self) -> Result<StmtKind> {
        self.expect(Token::For)?;
        self.expect(Token::LeftParen)?;

        // for (var key in object) / for (key in object)
        if let Some((kind, name)) = self.for_in_head() {
            self.expect(Token::In)?;
            let object = self.parse_expression()?;
            self.expect(Token::RightParen)?;
            let body = Box::new(self.parse_statement()?);
            return Ok(StmtKind::ForIn {
                kind,
                name,
                object,
                body,
            });
        }

        let init = if self.check(&Token::Semicolon) {
            None
        } else if matches!(self.peek(), Some(Token::Var | Token::Let | Token::Const)) {
            Some(ForInit::Var(self.parse_var_decl()?))
        } else {
            Some(ForInit::Expr(self.parse_expression()?))
        };
        self.expect(Token::Semicolon)?;

        let test = if self.check(&Token::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.expect(Token::Semicolon)?;

        let update = if self.check(&Token::RightParen) { None } else { Some(self.parse_expression()?) };
        self.expect(Token::RightParen)?;

        let body = Box::new(self.parse_statement()?);
        Ok(StmtKind::For {
            init,
            test,
            update,
            body,
        })
    }

    /// Detect a for-in head and consume everything up to the `in` keyword.
    fn for_in_head(&mut self) -> Option<(Option<VarKind>, String)> {
        let kind = match self.peek() {
            Some(Token::Var) => Some(VarKind::Var),
            Some(Token::Let) => Some(VarKind::Let),
            Some(Token::Const) => Some(VarKind::Const),
            _ => None,
        };
        let name_pos = if kind.is_some() { self.current + 1 } else { self.current };
        let name = match self.tokens.get(name_pos).map(|t| &t.token) {
            Some(Token::Identifier(name)) => name.clone(),
            _ => return None,
        };
        if !matches!(self.tokens.get(name_pos + 1).map(|t| &t.token), Some(Token::In)) {
            return None;
        }
        self.current = name_pos + 1;
        Some((kind, name))
    }

    fn parse_switch(&mut self) -> Result<StmtKind> {
        self.expect(Token::Switch)?;
        let discriminant = self.parse_paren_expression()?;
        self.expect(Token::LeftBrace)?;

        let mut cases = Vec::new();
        while !self.check(&Token::RightBrace) {
            let test = match self.peek() {
                Some(Token::Case) => {
                    self.advance();
                    Some(self.parse_expression()?)
                }
                Some(Token::Default) => {
                    self.advance();
                    None
                }
                other => bail_parse_at!(self.current_span(), "Expected case or default, got {:?}", other),
            };
            self.expect(Token::Colon)?;

            let mut body = Vec::new();
            while !matches!(self.peek(), Some(Token::Case | Token::Default | Token::RightBrace) | None) {
                body.push(self.parse_statement()?);
            }
            cases.push(SwitchCase { test, body });
        }
        self.expect(Token::RightBrace)?;

        Ok(StmtKind::Switch { discriminant, cases })
    }

    fn parse_try(&mut self) -> Result<StmtKind> {
        self.expect(Token::Try)?;
        let block = self.parse_block()?;

        let handler = if self.check(&Token::Catch) {
            self.advance();
            let param = if self.check(&Token::LeftParen) {
                self.advance();
                let name = self.expect_identifier()?;
                self.expect(Token::RightParen)?;
                Some(name)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.check(&Token::Finally) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            bail_parse_at!(self.current_span(), "try requires catch or finally");
        }

        Ok(StmtKind::Try {
            block,
            handler,
            finalizer,
        })
    }

    fn parse_jump_label(&mut self) -> Option<String> {
        match self.tokens.get(self.current) {
            Some(LocatedToken {
                token: Token::Identifier(label),
                newline_before: false,
                ..
            }) => {
                let label = label.clone();
                self.advance();
                Some(label)
            }
            _ => None,
        }
    }

    /// `;`, or an inserted one before `}`, end of input or a line break.
    fn consume_semicolon(&mut self) -> Result<()> {
        if self.check(&Token::Semicolon) {
            self.advance();
            return Ok(());
        }
        if self.at_statement_end() {
            return Ok(());
        }
        Err(err_parse_at!(
            self.current_span(),
            "Expected ';', got {:?}",
            self.peek()
        ))
    }

    fn at_statement_end(&self) -> bool {
        match self.tokens.get(self.current) {
            None => true,
            Some(t) => matches!(t.token, Token::Semicolon | Token::RightBrace) || t.newline_before,
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_paren_expression(&mut self) -> Result<Expression> {
        self.expect(Token::LeftParen)?;
        let expr = self.parse_expression()?;
        self.expect(Token::RightParen)?;
        Ok(expr)
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        trace!("parse_expression: next token = {:?}", self.peek());
        let first = self.parse_assignment()?;
        if !self.check(&Token::Comma) {
            return Ok(first);
        }

        let start_span = first.h.span;
        let mut exprs = vec![first];
        while self.check(&Token::Comma) {
            self.advance();
            exprs.push(self.parse_assignment()?);
        }
        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(ExprKind::Sequence(exprs), span))
    }

    fn parse_assignment(&mut self) -> Result<Expression> {
        trace!("parse_assignment: next token = {:?}", self.peek());
        if self.at_arrow_function() {
            return self.parse_arrow_function();
        }

        let target = self.parse_conditional()?;
        let op = match self.peek() {
            Some(Token::AssignOp(op)) => op.clone(),
            _ => return Ok(target),
        };

        if !matches!(
            target.kind,
            ExprKind::Identifier(_) | ExprKind::Member(..) | ExprKind::Index(..)
        ) {
            bail_parse_at!(target.h.span, "Invalid assignment target");
        }

        self.advance();
        let value = self.parse_assignment()?;
        let span = target.h.span.merge(&value.h.span);
        Ok(self
            .node_counter
            .mk_node(ExprKind::Assign(op, Box::new(target), Box::new(value)), span))
    }

    fn parse_conditional(&mut self) -> Result<Expression> {
        let test = self.parse_binary_expression_with_precedence(0)?;
        if !self.check(&Token::Question) {
            return Ok(test);
        }

        self.advance();
        let consequent = self.parse_assignment()?;
        self.expect(Token::Colon)?;
        let alternate = self.parse_assignment()?;
        let span = test.h.span.merge(&alternate.h.span);
        Ok(self.node_counter.mk_node(
            ExprKind::Conditional(Box::new(test), Box::new(consequent), Box::new(alternate)),
            span,
        ))
    }

    fn get_operator_precedence(op: &str) -> Option<(u32, bool)> {
        // Returns (precedence, is_left_associative); higher binds tighter
        match op {
            "||" => Some((1, true)),
            "&&" => Some((2, true)),
            "|" => Some((3, true)),
            "^" => Some((4, true)),
            "&" => Some((5, true)),
            "==" | "!=" | "===" | "!==" => Some((6, true)),
            "<" | ">" | "<=" | ">=" | "instanceof" | "in" => Some((7, true)),
            "<<" | ">>" | ">>>" => Some((8, true)),
            "+" | "-" => Some((9, true)),
            "*" | "/" | "%" => Some((10, true)),
            "**" => Some((11, false)),
            _ => None,
        }
    }

    fn parse_binary_expression_with_precedence(&mut self, dominated_by: u32) -> Result<Expression> {
        let mut left = self.parse_unary_expression()?;

        loop {
            let op_string = match self.peek() {
                Some(Token::Operator(op)) => op.clone(),
                Some(Token::Instanceof) => "instanceof".to_string(),
                Some(Token::In) => "in".to_string(),
                _ => break,
            };

            let (precedence, is_left_assoc) = match Self::get_operator_precedence(&op_string) {
                Some(p) => p,
                None => break,
            };

            if precedence < dominated_by {
                break;
            }

            self.advance();

            let right_dominated_by = if is_left_assoc { precedence + 1 } else { precedence };
            let right = self.parse_binary_expression_with_precedence(right_dominated_by)?;

            let span = left.h.span.merge(&right.h.span);
            left = self.node_counter.mk_node(
                ExprKind::Binary(op_string, Box::new(left), Box::new(right)),
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression> {
        let start_span = self.current_span();
        let op = match self.peek() {
            Some(Token::Operator(op)) if matches!(op.as_str(), "!" | "-" | "+" | "~") => op.clone(),
            Some(Token::Typeof) => "typeof".to_string(),
            Some(Token::Void) => "void".to_string(),
            Some(Token::Delete) => "delete".to_string(),
            Some(Token::Operator(op)) if op == "++" || op == "--" => {
                let op = op.clone();
                self.advance();
                let arg = self.parse_unary_expression()?;
                let span = start_span.merge(&arg.h.span);
                return Ok(self.node_counter.mk_node(
                    ExprKind::Update {
                        op,
                        prefix: true,
                        arg: Box::new(arg),
                    },
                    span,
                ));
            }
            _ => return self.parse_postfix_expression(),
        };

        self.advance();
        let operand = self.parse_unary_expression()?;
        let span = start_span.merge(&operand.h.span);
        Ok(self.node_counter.mk_node(ExprKind::Unary(op, Box::new(operand)), span))
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_call_expression()?;
        match self.tokens.get(self.current) {
            Some(LocatedToken {
                token: Token::Operator(op),
                newline_before: false,
                ..
            }) if op == "++" || op == "--" => {
                let op = op.clone();
                self.advance();
                let span = expr.h.span.merge(&self.previous_span());
                Ok(self.node_counter.mk_node(
                    ExprKind::Update {
                        op,
                        prefix: false,
                        arg: Box::new(expr),
                    },
                    span,
                ))
            }
            _ => Ok(expr),
        }
    }

    fn parse_call_expression(&mut self) -> Result<Expression> {
        let mut expr = if self.check(&Token::New) { self.parse_new_expression()? } else { self.parse_primary_expression()? };

        loop {
            let start_span = expr.h.span;
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let property = self.expect_property_name()?;
                    let span = start_span.merge(&self.previous_span());
                    expr = self.node_counter.mk_node(ExprKind::Member(Box::new(expr), property), span);
                }
                Some(Token::LeftBracket) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RightBracket)?;
                    let span = start_span.merge(&self.previous_span());
                    expr = self
                        .node_counter
                        .mk_node(ExprKind::Index(Box::new(expr), Box::new(index)), span);
                }
                Some(Token::LeftParen) => {
                    let args = self.parse_arguments()?;
                    let span = start_span.merge(&self.previous_span());
                    expr = self.node_counter.mk_node(ExprKind::Call(Box::new(expr), args), span);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// `new Callee(args)`; the callee is a member chain without calls.
    fn parse_new_expression(&mut self) -> Result<Expression> {
        let start_span = self.current_span();
        self.expect(Token::New)?;

        let mut callee = if self.check(&Token::New) { self.parse_new_expression()? } else { self.parse_primary_expression()? };
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.advance();
                    let property = self.expect_property_name()?;
                    let span = callee.h.span.merge(&self.previous_span());
                    callee = self.node_counter.mk_node(ExprKind::Member(Box::new(callee), property), span);
                }
                Some(Token::LeftBracket) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(Token::RightBracket)?;
                    let span = callee.h.span.merge(&self.previous_span());
                    callee = self
                        .node_counter
                        .mk_node(ExprKind::Index(Box::new(callee), Box::new(index)), span);
                }
                _ => break,
            }
        }

        let args = if self.check(&Token::LeftParen) { self.parse_arguments()? } else { vec![] };
        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(ExprKind::New(Box::new(callee), args), span))
    }

    /// Parse `(a, b, ...c)`, allowing a trailing comma
    fn parse_arguments(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LeftParen)?;
        let mut args = Vec::new();

        while !self.check(&Token::RightParen) {
            args.push(self.parse_spread_or_assignment()?);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(Token::RightParen)?;
        Ok(args)
    }

    fn parse_spread_or_assignment(&mut self) -> Result<Expression> {
        if !self.check(&Token::Ellipsis) {
            return self.parse_assignment();
        }
        let start_span = self.current_span();
        self.advance();
        let arg = self.parse_assignment()?;
        let span = start_span.merge(&arg.h.span);
        Ok(self.node_counter.mk_node(ExprKind::Spread(Box::new(arg)), span))
    }

    fn parse_primary_expression(&mut self) -> Result<Expression> {
        trace!("parse_primary_expression: next token = {:?}", self.peek());
        let span = self.current_span();
        let kind = match self.peek() {
            Some(Token::Identifier(name)) => ExprKind::Identifier(name.clone()),
            Some(Token::NumberLiteral(raw)) => ExprKind::Number(raw.clone()),
            Some(Token::StringLiteral(raw)) => ExprKind::String(raw.clone()),
            Some(Token::RegexLiteral(raw)) => ExprKind::Regex(raw.clone()),
            Some(Token::True) => ExprKind::Bool(true),
            Some(Token::False) => ExprKind::Bool(false),
            Some(Token::Null) => ExprKind::Null,
            Some(Token::This) => ExprKind::This,
            Some(Token::LeftParen) => {
                // Grouping parens are not kept; the printer re-derives them from precedence
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                return Ok(expr);
            }
            Some(Token::LeftBracket) => return self.parse_array_literal(),
            Some(Token::LeftBrace) => return self.parse_object_literal(),
            Some(Token::Function) => {
                let func = self.parse_function_literal()?;
                let span = span.merge(&self.previous_span());
                return Ok(self.node_counter.mk_node(ExprKind::Function(func), span));
            }
            other => bail_parse_at!(span, "Unexpected token {:?}", other),
        };
        self.advance();
        Ok(self.node_counter.mk_node(kind, span))
    }

    fn parse_array_literal(&mut self) -> Result<Expression> {
        let start_span = self.current_span();
        self.expect(Token::LeftBracket)?;

        let mut elements = Vec::new();
        while !self.check(&Token::RightBracket) {
            if self.check(&Token::Comma) {
                bail_parse_at!(self.current_span(), "Array holes are not supported");
            }
            elements.push(self.parse_spread_or_assignment()?);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(Token::RightBracket)?;

        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(ExprKind::Array(elements), span))
    }

    fn parse_object_literal(&mut self) -> Result<Expression> {
        let start_span = self.current_span();
        self.expect(Token::LeftBrace)?;

        let mut properties = Vec::new();
        while !self.check(&Token::RightBrace) {
            if self.check(&Token::Ellipsis) {
                self.advance();
                properties.push(Property::Spread(self.parse_assignment()?));
            } else {
                let key_span = self.current_span();
                let key = match self.advance() {
                    Some(Token::Identifier(name)) => PropKey::Ident(name.clone()),
                    Some(Token::StringLiteral(raw)) => PropKey::String(raw.clone()),
                    Some(Token::NumberLiteral(raw)) => PropKey::Number(raw.clone()),
                    Some(token) => match token.keyword_text() {
                        Some(text) => PropKey::Ident(text.to_string()),
                        None => bail_parse_at!(key_span, "Invalid property key {:?}", token),
                    },
                    None => bail_parse_at!(key_span, "Unexpected end of input in object literal"),
                };
                self.expect(Token::Colon)?;
                properties.push(Property::KeyValue(key, self.parse_assignment()?));
            }

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(Token::RightBrace)?;

        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(ExprKind::Object(properties), span))
    }

    /// `function name?(params) { body }`, starting at the `function` keyword
    fn parse_function_literal(&mut self) -> Result<FunctionLit> {
        trace!("parse_function_literal: next token = {:?}", self.peek());
        self.expect(Token::Function)?;
        let name = match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(FunctionLit {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<String>> {
        self.expect(Token::LeftParen)?;
        let mut params = Vec::new();
        while !self.check(&Token::RightParen) {
            params.push(self.expect_identifier()?);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(Token::RightParen)?;
        Ok(params)
    }

    /// At `x =>` or at a parenthesized parameter list followed by `=>`
    fn at_arrow_function(&self) -> bool {
        if let Some((Token::Identifier(_), Token::Arrow)) = self.peek2() {
            return true;
        }
        if !self.check(&Token::LeftParen) {
            return false;
        }

        let mut depth = 0usize;
        for (offset, located) in self.tokens[self.current..].iter().enumerate() {
            match located.token {
                Token::LeftParen => depth += 1,
                Token::RightParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(self.current + offset + 1).map(|t| &t.token),
                            Some(Token::Arrow)
                        );
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn parse_arrow_function(&mut self) -> Result<Expression> {
        let start_span = self.current_span();
        let params = if self.check(&Token::LeftParen) { self.parse_params()? } else { vec![self.expect_identifier()?] };
        self.expect(Token::Arrow)?;

        let body = if self.check(&Token::LeftBrace) {
            FunctionBody::Block(self.parse_block()?)
        } else {
            FunctionBody::Expr(Box::new(self.parse_assignment()?))
        };

        let span = start_span.merge(&self.previous_span());
        Ok(self.node_counter.mk_node(
            ExprKind::Function(FunctionLit {
                name: None,
                params,
                body,
                is_arrow: true,
            }),
            span,
        ))
    }

    // Helper methods
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|lt| &lt.token)
    }

    fn peek2(&self) -> Option<(&Token, &Token)> {
        let first = self.tokens.get(self.current)?;
        let second = self.tokens.get(self.current + 1)?;
        Some((&first.token, &second.token))
    }

    fn advance(&mut self) -> Option<&Token> {
        if !self.is_at_end() {
            self.current += 1;
            self.tokens.get(self.current - 1).map(|lt| &lt.token)
        } else {
            None
        }
    }

    fn check(&self, token: &Token) -> bool {
        if let Some(t) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(token)
        } else {
            false
        }
    }

    fn check_assign(&self, op: &str) -> bool {
        matches!(self.peek(), Some(Token::AssignOp(s)) if s == op)
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if self.check(&token) {
            self.advance();
            Ok(())
        } else {
            let span = self.current_span();
            Err(err_parse_at!(span, "Expected {:?}, got {:?}", token, self.peek()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let span = self.current_span();
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name.clone()),
            other => Err(err_parse_at!(span, "Expected identifier, got {:?}", other)),
        }
    }

    /// Property name after `.`; keywords are allowed here
    fn expect_property_name(&mut self) -> Result<String> {
        let span = self.current_span();
        match self.advance() {
            Some(Token::Identifier(name)) => Ok(name.clone()),
            Some(token) => match token.keyword_text() {
                Some(text) => Ok(text.to_string()),
                None => Err(err_parse_at!(span, "Expected property name, got {:?}", token)),
            },
            None => Err(err_parse_at!(span, "Expected property name, got end of input")),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }
}
