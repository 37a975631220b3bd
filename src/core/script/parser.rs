//! Recursive-descent parser for the script language.
//!
//! Binary operators use precedence climbing; arrow functions are detected by
//! scanning ahead to the matching `)` and checking for `=>`.

use std::rc::Rc;

use super::ast::{
    BinaryOp, DeclKind, Declarator, Element, Expr, ExprKind, ForEachKind, FunctionBody,
    FunctionDef, LogicalOp, Param, Program, Stmt, TemplatePart, UnaryOp, UpdateOp,
};
use super::lexer::Lexer;
use super::token::{Keyword, Punct, RawTemplatePart, Spanned, Token};
use super::value::{format_number, EvalError, EvalResult, SourceSpan};

/// Parse a sequence of statements.
pub fn parse_program(source: &str) -> EvalResult<Program> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(source, tokens);
    let mut body = Vec::new();
    while !parser.at_eof() {
        body.push(parser.parse_statement()?);
    }
    Ok(Program { body })
}

/// Parse a single expression; trailing input is an error.
pub fn parse_expression(source: &str) -> EvalResult<Expr> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser::new(source, tokens);
    if parser.at_eof() {
        return Err(EvalError::syntax("empty expression"));
    }
    let expr = parser.parse_expression()?;
    parser.expect_eof()?;
    Ok(expr)
}

#[derive(Debug, Clone, Copy)]
enum BinKind {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

fn binary_op(token: &Token) -> Option<(u8, BinKind)> {
    let Token::Punct(p) = token else {
        return None;
    };
    Some(match p {
        Punct::QuestionQuestion => (1, BinKind::Logical(LogicalOp::Nullish)),
        Punct::OrOr => (2, BinKind::Logical(LogicalOp::Or)),
        Punct::AndAnd => (3, BinKind::Logical(LogicalOp::And)),
        Punct::Eq => (4, BinKind::Binary(BinaryOp::Eq)),
        Punct::NotEq => (4, BinKind::Binary(BinaryOp::NotEq)),
        Punct::StrictEq => (4, BinKind::Binary(BinaryOp::StrictEq)),
        Punct::StrictNotEq => (4, BinKind::Binary(BinaryOp::StrictNotEq)),
        Punct::Lt => (5, BinKind::Binary(BinaryOp::Lt)),
        Punct::Le => (5, BinKind::Binary(BinaryOp::Le)),
        Punct::Gt => (5, BinKind::Binary(BinaryOp::Gt)),
        Punct::Ge => (5, BinKind::Binary(BinaryOp::Ge)),
        Punct::Plus => (6, BinKind::Binary(BinaryOp::Add)),
        Punct::Minus => (6, BinKind::Binary(BinaryOp::Sub)),
        Punct::Star => (7, BinKind::Binary(BinaryOp::Mul)),
        Punct::Slash => (7, BinKind::Binary(BinaryOp::Div)),
        Punct::Percent => (7, BinKind::Binary(BinaryOp::Rem)),
        Punct::StarStar => (8, BinKind::Binary(BinaryOp::Pow)),
        _ => return None,
    })
}

fn assign_op(token: &Token) -> Option<Option<BinaryOp>> {
    let Token::Punct(p) = token else {
        return None;
    };
    Some(match p {
        Punct::Assign => None,
        Punct::PlusAssign => Some(BinaryOp::Add),
        Punct::MinusAssign => Some(BinaryOp::Sub),
        Punct::StarAssign => Some(BinaryOp::Mul),
        Punct::SlashAssign => Some(BinaryOp::Div),
        Punct::PercentAssign => Some(BinaryOp::Rem),
        Punct::StarStarAssign => Some(BinaryOp::Pow),
        _ => return None,
    })
}

/// Deepest syntactic nesting accepted before parsing gives up.
const MAX_NESTING: usize = 128;

struct Parser<'a> {
    /// The complete source the token spans point into
    root: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    function_depth: usize,
    loop_depth: usize,
    /// Statements, assignments and operator chains currently open
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(root: &'a str, tokens: Vec<Spanned>) -> Self {
        Self {
            root,
            tokens,
            pos: 0,
            function_depth: 0,
            loop_depth: 0,
            nesting: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn current(&self) -> &Spanned {
        // The token list always ends with Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.current().clone();
        if !matches!(tok.token, Token::Eof) {
            self.pos += 1;
        }
        tok
    }

    fn check_punct(&self, p: Punct) -> bool {
        matches!(self.peek(), Token::Punct(q) if *q == p)
    }

    fn eat_punct(&mut self, p: Punct) -> bool {
        if self.check_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.peek(), Token::Keyword(k) if *k == kw)
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: Punct) -> EvalResult<SourceSpan> {
        if self.check_punct(p) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&format!("expected '{}'", p.as_str())))
        }
    }

    fn expect_ident(&mut self) -> EvalResult<(String, SourceSpan)> {
        match self.peek() {
            Token::Ident(name) => {
                let name = name.clone();
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected("expected identifier")),
        }
    }

    fn expect_eof(&self) -> EvalResult<()> {
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.unexpected("expected end of input"))
        }
    }

    fn unexpected(&self, context: &str) -> EvalError {
        let cur = self.current();
        EvalError::syntax(format!("unexpected {} ({})", cur.token.describe(), context))
            .with_span(cur.span)
    }

    fn start(&self) -> usize {
        self.current().span.start
    }

    fn span_from(&self, start: usize) -> SourceSpan {
        let end = if self.pos == 0 {
            start
        } else {
            self.tokens[self.pos - 1].span.end
        };
        SourceSpan::new(start, end.max(start))
    }

    fn source_text(&self, span: SourceSpan) -> String {
        span.extract(self.root).unwrap_or_default().to_string()
    }

    /// Automatic semicolon insertion, restricted to the common cases.
    fn consume_semicolon(&mut self) -> EvalResult<()> {
        if self.eat_punct(Punct::Semi)
            || self.check_punct(Punct::RBrace)
            || self.at_eof()
            || self.current().newline_before
        {
            Ok(())
        } else {
            Err(self.unexpected("expected ';'"))
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        if self.nesting >= MAX_NESTING {
            return Err(EvalError::syntax(format!(
                "nesting deeper than {} levels",
                MAX_NESTING
            ))
            .with_span(self.current().span));
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> EvalResult<Stmt> {
        self.nested(Self::parse_statement_inner)
    }

    fn parse_statement_inner(&mut self) -> EvalResult<Stmt> {
        match self.peek().clone() {
            Token::Punct(Punct::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            Token::Punct(Punct::Semi) => {
                self.advance();
                Ok(Stmt::Empty)
            }
            Token::Keyword(Keyword::Const | Keyword::Let | Keyword::Var) => {
                let stmt = self.parse_declaration(true)?;
                self.consume_semicolon()?;
                Ok(stmt)
            }
            Token::Keyword(Keyword::Function) => {
                let def = self.parse_function(true)?;
                Ok(Stmt::Function(def))
            }
            Token::Keyword(Keyword::If) => self.parse_if(),
            Token::Keyword(Keyword::While) => {
                self.advance();
                self.expect_punct(Punct::LParen)?;
                let cond = self.parse_expression()?;
                self.expect_punct(Punct::RParen)?;
                let body = self.parse_loop_body()?;
                Ok(Stmt::While { cond, body })
            }
            Token::Keyword(Keyword::For) => self.parse_for(),
            Token::Keyword(Keyword::Return) => {
                let span = self.current().span;
                if self.function_depth == 0 {
                    return Err(EvalError::syntax("illegal return statement").with_span(span));
                }
                self.advance();
                let value = if self.check_punct(Punct::Semi)
                    || self.check_punct(Punct::RBrace)
                    || self.at_eof()
                    || self.current().newline_before
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                Ok(Stmt::Return(value, span))
            }
            Token::Keyword(kw @ (Keyword::Break | Keyword::Continue)) => {
                let span = self.current().span;
                if self.loop_depth == 0 {
                    return Err(EvalError::syntax(format!(
                        "illegal {} statement outside of a loop",
                        kw.as_str()
                    ))
                    .with_span(span));
                }
                self.advance();
                self.consume_semicolon()?;
                Ok(if kw == Keyword::Break {
                    Stmt::Break(span)
                } else {
                    Stmt::Continue(span)
                })
            }
            Token::Keyword(Keyword::Throw) => {
                self.advance();
                if self.current().newline_before {
                    return Err(self.unexpected("line break after 'throw'"));
                }
                let value = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Throw(value))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_block(&mut self) -> EvalResult<Vec<Stmt>> {
        self.expect_punct(Punct::LBrace)?;
        let mut body = Vec::new();
        while !self.check_punct(Punct::RBrace) {
            if self.at_eof() {
                return Err(self.unexpected("expected '}'"));
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(body)
    }

    fn parse_loop_body(&mut self) -> EvalResult<Box<Stmt>> {
        self.loop_depth += 1;
        let body = self.parse_statement();
        self.loop_depth -= 1;
        Ok(Box::new(body?))
    }

    fn decl_kind(&self) -> Option<DeclKind> {
        match self.peek() {
            Token::Keyword(Keyword::Const) => Some(DeclKind::Const),
            Token::Keyword(Keyword::Let) => Some(DeclKind::Let),
            Token::Keyword(Keyword::Var) => Some(DeclKind::Var),
            _ => None,
        }
    }

    fn parse_declaration(&mut self, require_const_init: bool) -> EvalResult<Stmt> {
        let kind = self
            .decl_kind()
            .ok_or_else(|| self.unexpected("expected declaration"))?;
        self.advance();
        let mut declarators = Vec::new();
        loop {
            let (name, name_span) = self.expect_ident()?;
            let init = if self.eat_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            if kind == DeclKind::Const && init.is_none() && require_const_init {
                return Err(EvalError::syntax(format!(
                    "missing initializer in const declaration '{}'",
                    name
                ))
                .with_span(name_span));
            }
            let span = self.span_from(name_span.start);
            declarators.push(Declarator { name, init, span });
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        Ok(Stmt::Declare { kind, declarators })
    }

    fn parse_if(&mut self) -> EvalResult<Stmt> {
        self.advance();
        self.expect_punct(Punct::LParen)?;
        let cond = self.parse_expression()?;
        self.expect_punct(Punct::RParen)?;
        let then = Box::new(self.parse_statement()?);
        let otherwise = if self.eat_keyword(Keyword::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then,
            otherwise,
        })
    }

    fn for_each_kind(token: &Token) -> Option<ForEachKind> {
        match token {
            Token::Ident(word) if word == "of" => Some(ForEachKind::Of),
            Token::Keyword(Keyword::In) => Some(ForEachKind::In),
            _ => None,
        }
    }

    fn parse_for(&mut self) -> EvalResult<Stmt> {
        self.advance();
        self.expect_punct(Punct::LParen)?;

        // for (const x of xs) / for (x in obj)
        let decl = self.decl_kind();
        let name_offset = usize::from(decl.is_some());
        if let (Token::Ident(name), Some(over)) = (
            self.peek_at(name_offset),
            Self::for_each_kind(self.peek_at(name_offset + 1)),
        ) {
            let name = name.clone();
            for _ in 0..name_offset + 2 {
                self.advance();
            }
            let iterable = self.parse_expression()?;
            self.expect_punct(Punct::RParen)?;
            let body = self.parse_loop_body()?;
            return Ok(Stmt::ForEach {
                kind: decl,
                name,
                over,
                iterable,
                body,
            });
        }

        let init = if self.check_punct(Punct::Semi) {
            None
        } else if decl.is_some() {
            Some(Box::new(self.parse_declaration(true)?))
        } else {
            Some(Box::new(Stmt::Expr(self.parse_expression()?)))
        };
        self.expect_punct(Punct::Semi)?;
        let cond = if self.check_punct(Punct::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(Punct::Semi)?;
        let update = if self.check_punct(Punct::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(Punct::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    // ------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------

    /// Parse a function body block with fresh loop context.
    fn parse_function_block(&mut self) -> EvalResult<Vec<Stmt>> {
        let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
        self.function_depth += 1;
        let body = self.parse_block();
        self.function_depth -= 1;
        self.loop_depth = saved_loops;
        body
    }

    fn parse_params(&mut self) -> EvalResult<(Vec<Param>, Option<String>)> {
        self.expect_punct(Punct::LParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !self.check_punct(Punct::RParen) {
            if self.eat_punct(Punct::Ellipsis) {
                let (name, _) = self.expect_ident()?;
                rest = Some(name);
                break;
            }
            let (name, _) = self.expect_ident()?;
            let default = if self.eat_punct(Punct::Assign) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param { name, default });
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RParen)?;
        Ok((params, rest))
    }

    fn parse_function(&mut self, declaration: bool) -> EvalResult<Rc<FunctionDef>> {
        let start = self.start();
        self.advance();
        let name = match self.peek() {
            Token::Ident(_) => Some(self.expect_ident()?.0),
            _ if declaration => return Err(self.unexpected("function declarations need a name")),
            _ => None,
        };
        let (params, rest) = self.parse_params()?;
        let body = FunctionBody::Block(self.parse_function_block()?);
        let source = self.source_text(self.span_from(start));
        Ok(Rc::new(FunctionDef {
            name,
            params,
            rest,
            body,
            source,
        }))
    }

    fn is_arrow_ahead(&self) -> bool {
        match self.peek() {
            Token::Ident(_) => matches!(self.peek_at(1), Token::Punct(Punct::Arrow)),
            Token::Punct(Punct::LParen) => {
                let mut depth = 0usize;
                for (offset, spanned) in self.tokens[self.pos..].iter().enumerate() {
                    match spanned.token {
                        Token::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                        Token::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                return matches!(
                                    self.peek_at(offset + 1),
                                    Token::Punct(Punct::Arrow)
                                );
                            }
                        }
                        Token::Eof => return false,
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow(&mut self) -> EvalResult<Expr> {
        let start = self.start();
        let (params, rest) = if matches!(self.peek(), Token::Ident(_)) {
            let (name, _) = self.expect_ident()?;
            (vec![Param { name, default: None }], None)
        } else {
            self.parse_params()?
        };
        self.expect_punct(Punct::Arrow)?;
        let body = if self.check_punct(Punct::LBrace) {
            FunctionBody::Block(self.parse_function_block()?)
        } else {
            let saved_loops = std::mem::replace(&mut self.loop_depth, 0);
            let body = self.parse_assignment();
            self.loop_depth = saved_loops;
            FunctionBody::Expr(body?)
        };
        let span = self.span_from(start);
        let def = FunctionDef {
            name: None,
            params,
            rest,
            body,
            source: self.source_text(span),
        };
        Ok(Expr::new(ExprKind::Function(Rc::new(def)), span))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expression(&mut self) -> EvalResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> EvalResult<Expr> {
        self.nested(Self::parse_assignment_inner)
    }

    fn parse_assignment_inner(&mut self) -> EvalResult<Expr> {
        if self.is_arrow_ahead() {
            return self.parse_arrow();
        }
        let target = self.parse_conditional()?;
        let Some(op) = assign_op(self.peek()) else {
            return Ok(target);
        };
        if !target.is_assignable() {
            return Err(EvalError::syntax("invalid assignment target").with_span(target.span));
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span.to(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_conditional(&mut self) -> EvalResult<Expr> {
        let cond = self.parse_binary(1)?;
        if !self.eat_punct(Punct::Question) {
            return Ok(cond);
        }
        let then = self.parse_assignment()?;
        self.expect_punct(Punct::Colon)?;
        let otherwise = self.parse_assignment()?;
        let span = cond.span.to(otherwise.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> EvalResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((prec, kind)) = binary_op(self.peek()) {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right_assoc = matches!(kind, BinKind::Binary(BinaryOp::Pow));
            let next = if right_assoc { prec } else { prec + 1 };
            let rhs = self.nested(|p| p.parse_binary(next))?;
            let span = lhs.span.to(rhs.span);
            let (lhs_box, rhs_box) = (Box::new(lhs), Box::new(rhs));
            let expr = match kind {
                BinKind::Binary(op) => ExprKind::Binary {
                    op,
                    lhs: lhs_box,
                    rhs: rhs_box,
                },
                BinKind::Logical(op) => ExprKind::Logical {
                    op,
                    lhs: lhs_box,
                    rhs: rhs_box,
                },
            };
            lhs = Expr::new(expr, span);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> EvalResult<Expr> {
        let start = self.start();
        let op = match self.peek() {
            Token::Punct(Punct::Minus) => Some(UnaryOp::Neg),
            Token::Punct(Punct::Plus) => Some(UnaryOp::Pos),
            Token::Punct(Punct::Bang) => Some(UnaryOp::Not),
            Token::Keyword(Keyword::Typeof) => Some(UnaryOp::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.nested(Self::parse_unary)?;
            let span = self.span_from(start);
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }

        let update = match self.peek() {
            Token::Punct(Punct::PlusPlus) => Some(UpdateOp::Inc),
            Token::Punct(Punct::MinusMinus) => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = update {
            self.advance();
            let target = self.nested(Self::parse_unary)?;
            if !target.is_assignable() {
                return Err(EvalError::syntax("invalid update target").with_span(target.span));
            }
            let span = self.span_from(start);
            return Ok(Expr::new(
                ExprKind::Update {
                    op,
                    prefix: true,
                    target: Box::new(target),
                },
                span,
            ));
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> EvalResult<Expr> {
        let expr = self.parse_call_member()?;
        let op = match self.peek() {
            Token::Punct(Punct::PlusPlus) => UpdateOp::Inc,
            Token::Punct(Punct::MinusMinus) => UpdateOp::Dec,
            _ => return Ok(expr),
        };
        if self.current().newline_before {
            return Ok(expr);
        }
        if !expr.is_assignable() {
            return Err(EvalError::syntax("invalid update target").with_span(expr.span));
        }
        self.advance();
        let span = self.span_from(expr.span.start);
        Ok(Expr::new(
            ExprKind::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            },
            span,
        ))
    }

    fn parse_call_member(&mut self) -> EvalResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr.span.start;
            if self.eat_punct(Punct::Dot) {
                let property = match self.peek() {
                    Token::Ident(name) => name.clone(),
                    Token::Keyword(kw) => kw.as_str().to_string(),
                    _ => return Err(self.unexpected("expected property name")),
                };
                self.advance();
                expr = Expr::new(
                    ExprKind::Member {
                        object: Box::new(expr),
                        property,
                    },
                    self.span_from(start),
                );
            } else if self.eat_punct(Punct::LBracket) {
                let index = self.parse_expression()?;
                self.expect_punct(Punct::RBracket)?;
                expr = Expr::new(
                    ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                    self.span_from(start),
                );
            } else if self.check_punct(Punct::LParen) {
                let args = self.parse_elements(Punct::LParen, Punct::RParen)?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    self.span_from(start),
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Comma separated items with optional spreads, e.g. call arguments.
    fn parse_elements(&mut self, open: Punct, close: Punct) -> EvalResult<Vec<Element>> {
        self.expect_punct(open)?;
        let mut items = Vec::new();
        while !self.check_punct(close) {
            if self.eat_punct(Punct::Ellipsis) {
                items.push(Element::Spread(self.parse_assignment()?));
            } else {
                items.push(Element::Item(self.parse_assignment()?));
            }
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> EvalResult<Expr> {
        let start = self.start();
        let kind = match self.peek().clone() {
            Token::Number(n) => {
                self.advance();
                ExprKind::Number(n)
            }
            Token::Str(s) => {
                self.advance();
                ExprKind::Str(s)
            }
            Token::Template(parts) => {
                self.advance();
                ExprKind::Template(self.parse_template(parts)?)
            }
            Token::Ident(name) => {
                self.advance();
                ExprKind::Ident(name)
            }
            Token::Keyword(Keyword::True) => {
                self.advance();
                ExprKind::Bool(true)
            }
            Token::Keyword(Keyword::False) => {
                self.advance();
                ExprKind::Bool(false)
            }
            Token::Keyword(Keyword::Null) => {
                self.advance();
                ExprKind::Null
            }
            Token::Keyword(Keyword::Function) => ExprKind::Function(self.parse_function(false)?),
            Token::Punct(Punct::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect_punct(Punct::RParen)?;
                return Ok(Expr::new(inner.kind, self.span_from(start)));
            }
            Token::Punct(Punct::LBracket) => {
                ExprKind::Array(self.parse_elements(Punct::LBracket, Punct::RBracket)?)
            }
            Token::Punct(Punct::LBrace) => ExprKind::Object(self.parse_object()?),
            _ => return Err(self.unexpected("expected expression")),
        };
        Ok(Expr::new(kind, self.span_from(start)))
    }

    fn parse_object(&mut self) -> EvalResult<Vec<(String, Expr)>> {
        self.expect_punct(Punct::LBrace)?;
        let mut entries = Vec::new();
        while !self.check_punct(Punct::RBrace) {
            let key_span = self.current().span;
            let (key, shorthand_ok) = match self.peek().clone() {
                Token::Ident(name) => (name, true),
                Token::Keyword(kw) => (kw.as_str().to_string(), false),
                Token::Str(s) => (s, false),
                Token::Number(n) => (format_number(n), false),
                _ => return Err(self.unexpected("expected property name")),
            };
            self.advance();
            let value = if self.eat_punct(Punct::Colon) {
                self.parse_assignment()?
            } else if shorthand_ok {
                Expr::new(ExprKind::Ident(key.clone()), key_span)
            } else {
                return Err(self.unexpected("expected ':'"));
            };
            entries.push((key, value));
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RBrace)?;
        Ok(entries)
    }

    fn parse_template(&mut self, parts: Vec<RawTemplatePart>) -> EvalResult<Vec<TemplatePart>> {
        parts
            .into_iter()
            .map(|part| match part {
                RawTemplatePart::Text(text) => Ok(TemplatePart::Text(text)),
                RawTemplatePart::Expr { source, offset } => {
                    let tokens = Lexer::with_offset(&source, offset).tokenize()?;
                    let mut sub = Parser::new(self.root, tokens);
                    sub.nesting = self.nesting;
                    if sub.at_eof() {
                        return Err(EvalError::syntax("empty template interpolation")
                            .with_span(SourceSpan::new(offset, offset)));
                    }
                    let expr = sub.parse_expression()?;
                    sub.expect_eof()?;
                    Ok(TemplatePart::Expr(expr))
                }
            })
            .collect()
    }
}
