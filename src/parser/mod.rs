//! Recursive-descent parser for the supported JavaScript subset.
//!
//! Produces the tagged-variant AST in [`ast`]; every node carries its source
//! location. Constructs the transformer deliberately rejects (classes,
//! templates, spread, optional chaining, `import`/`export`, `with`, ...)
//! are detected here and reported as fatal `not yet implemented`
//! diagnostics naming the construct, rather than leaking into the walker.
//!
//! Automatic semicolon insertion follows the usual rule: a missing `;` is
//! tolerated before `}`, at end of input, and after a line terminator. The
//! restricted productions (`return`/`break`/`continue` arguments, postfix
//! `++`/`--`) honor the no-line-break requirement.

pub mod ast;

use crate::diagnostics::TransformError;
use crate::scanner::{Position, Scanner, Token, TokenKind};
use ast::*;

/// Parse a whole source file.
pub fn parse(source: &str, file: &str) -> Result<Program, TransformError> {
    Parser::new(source, file)?.parse_program()
}

pub struct Parser<'a> {
    source: &'a str,
    file: &'a str,
    scanner: Scanner<'a>,
    cur: Token,
    prev_end: Position,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file: &'a str) -> Result<Self, TransformError> {
        let mut scanner = Scanner::new(source, file);
        let cur = scanner.scan()?;
        Ok(Parser {
            source,
            file,
            scanner,
            cur,
            prev_end: Position { line: 1, col: 0 },
        })
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    fn next(&mut self) -> Result<(), TransformError> {
        self.prev_end = self.cur.end;
        self.cur = self.scanner.scan()?;
        Ok(())
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Result<bool, TransformError> {
        if self.at(kind) {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), TransformError> {
        if self.at(kind) {
            self.next()
        } else {
            Err(self.err(format!("expected {what}")))
        }
    }

    fn raw_cur(&self) -> &'a str {
        &self.source[self.cur.start_offset..self.cur.end_offset]
    }

    /// One token of lookahead; the scanner snapshot makes this cheap.
    fn peek(&self) -> Result<Token, TransformError> {
        let mut scanner = self.scanner.clone();
        scanner.scan()
    }

    /// Two tokens of lookahead, for the `async x =>` arrow head.
    fn peek_second(&self) -> Result<Token, TransformError> {
        let mut scanner = self.scanner.clone();
        scanner.scan()?;
        scanner.scan()
    }

    fn snapshot(&self) -> (Scanner<'a>, Token, Position) {
        (self.scanner.clone(), self.cur, self.prev_end)
    }

    fn restore(&mut self, snap: (Scanner<'a>, Token, Position)) {
        self.scanner = snap.0;
        self.cur = snap.1;
        self.prev_end = snap.2;
    }

    fn finish(&self, start: Position) -> Loc {
        Loc {
            start,
            end: self.prev_end,
        }
    }

    fn err(&self, message: impl Into<String>) -> TransformError {
        TransformError::syntax(self.file, self.cur.start, message)
    }

    fn unsupported(&self, construct: &str) -> TransformError {
        TransformError::unsupported(self.file, self.cur.start, construct)
    }

    /// Automatic semicolon insertion.
    fn expect_semi(&mut self) -> Result<(), TransformError> {
        if self.eat(TokenKind::Semicolon)? {
            return Ok(());
        }
        if self.at(TokenKind::CloseBrace) || self.at(TokenKind::Eof) || self.cur.had_line_break {
            return Ok(());
        }
        Err(self.err("expected ';'"))
    }

    // =========================================================================
    // Program and statements
    // =========================================================================

    pub fn parse_program(&mut self) -> Result<Program, TransformError> {
        let start = Position { line: 1, col: 0 };
        let mut body = Vec::new();
        while !self.at(TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        Ok(Program {
            loc: Loc {
                start,
                end: self.cur.start,
            },
            body,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, TransformError> {
        match self.cur.kind {
            TokenKind::OpenBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::VarKeyword | TokenKind::LetKeyword | TokenKind::ConstKeyword => {
                let decl = self.parse_var_decl(false)?;
                self.expect_semi()?;
                Ok(Stmt::VarDecl(decl))
            }
            TokenKind::FunctionKeyword => {
                let func = self.parse_function(false, true)?;
                Ok(Stmt::FnDecl(Box::new(func)))
            }
            TokenKind::IfKeyword => self.parse_if(),
            TokenKind::WhileKeyword => self.parse_while(),
            TokenKind::DoKeyword => self.parse_do_while(),
            TokenKind::ForKeyword => self.parse_for(),
            TokenKind::SwitchKeyword => self.parse_switch(),
            TokenKind::TryKeyword => self.parse_try(),
            TokenKind::ReturnKeyword => self.parse_return(),
            TokenKind::ThrowKeyword => self.parse_throw(),
            TokenKind::BreakKeyword => self.parse_break(),
            TokenKind::ContinueKeyword => self.parse_continue(),
            TokenKind::DebuggerKeyword => {
                let start = self.cur.start;
                self.next()?;
                self.expect_semi()?;
                Ok(Stmt::Debugger(self.finish(start)))
            }
            TokenKind::Semicolon => {
                let start = self.cur.start;
                self.next()?;
                Ok(Stmt::Empty(self.finish(start)))
            }
            TokenKind::ClassKeyword => Err(self.unsupported("class declaration")),
            TokenKind::ImportKeyword => Err(self.unsupported("import declaration")),
            TokenKind::ExportKeyword => Err(self.unsupported("export declaration")),
            TokenKind::WithKeyword => Err(self.unsupported("with statement")),
            TokenKind::Identifier => {
                if self.raw_cur() == "async" {
                    let peeked = self.peek()?;
                    if peeked.kind == TokenKind::FunctionKeyword && !peeked.had_line_break {
                        self.next()?;
                        let func = self.parse_function(true, true)?;
                        return Ok(Stmt::FnDecl(Box::new(func)));
                    }
                }
                if self.peek()?.kind == TokenKind::Colon {
                    return self.parse_labeled();
                }
                self.parse_expr_stmt()
            }
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_block(&mut self) -> Result<BlockStmt, TransformError> {
        let start = self.cur.start;
        self.expect(TokenKind::OpenBrace, "'{'")?;
        let mut body = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.err("expected '}'"));
            }
            body.push(self.parse_stmt()?);
        }
        self.next()?;
        Ok(BlockStmt {
            loc: self.finish(start),
            body,
        })
    }

    /// Parse `var`/`let`/`const` declarations; the keyword is the current
    /// token. `no_in` suppresses `in` as a binary operator inside
    /// initializers (for-statement heads).
    fn parse_var_decl(&mut self, no_in: bool) -> Result<VarDecl, TransformError> {
        let start = self.cur.start;
        let kind = match self.cur.kind {
            TokenKind::VarKeyword => VarDeclKind::Var,
            TokenKind::LetKeyword => VarDeclKind::Let,
            TokenKind::ConstKeyword => VarDeclKind::Const,
            _ => return Err(self.err("expected variable declaration")),
        };
        self.next()?;

        let mut decls = Vec::new();
        loop {
            let decl_start = self.cur.start;
            let name = self.parse_binding_pat()?;
            let init = if self.eat(TokenKind::Equals)? {
                Some(self.parse_assign(no_in)?)
            } else {
                None
            };
            decls.push(VarDeclarator {
                loc: self.finish(decl_start),
                name,
                init,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        Ok(VarDecl {
            loc: self.finish(start),
            kind,
            decls,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        self.expect(TokenKind::OpenParen, "'('")?;
        let test = self.parse_expression(false)?;
        self.expect(TokenKind::CloseParen, "')'")?;
        let cons = self.parse_stmt()?;
        let alt = if self.eat(TokenKind::ElseKeyword)? {
            Some(self.parse_stmt()?)
        } else {
            None
        };
        Ok(Stmt::If(Box::new(IfStmt {
            loc: self.finish(start),
            test,
            cons,
            alt,
        })))
    }

    fn parse_while(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        self.expect(TokenKind::OpenParen, "'('")?;
        let test = self.parse_expression(false)?;
        self.expect(TokenKind::CloseParen, "')'")?;
        let body = self.parse_stmt()?;
        Ok(Stmt::While(Box::new(WhileStmt {
            loc: self.finish(start),
            test,
            body,
        })))
    }

    fn parse_do_while(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        let body = self.parse_stmt()?;
        self.expect(TokenKind::WhileKeyword, "'while'")?;
        self.expect(TokenKind::OpenParen, "'('")?;
        let test = self.parse_expression(false)?;
        self.expect(TokenKind::CloseParen, "')'")?;
        self.eat(TokenKind::Semicolon)?;
        Ok(Stmt::DoWhile(Box::new(DoWhileStmt {
            loc: self.finish(start),
            body,
            test,
        })))
    }

    fn parse_for(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        self.expect(TokenKind::OpenParen, "'('")?;

        // Disambiguate classic for / for-in / for-of by the head.
        if self.at(TokenKind::Semicolon) {
            self.next()?;
            return self.parse_for_tail(start, None);
        }

        if matches!(
            self.cur.kind,
            TokenKind::VarKeyword | TokenKind::LetKeyword | TokenKind::ConstKeyword
        ) {
            let decl = self.parse_var_decl(true)?;
            if self.at(TokenKind::InKeyword) || self.at_contextual("of") {
                let is_in = self.at(TokenKind::InKeyword);
                if decl.decls.len() != 1 || decl.decls[0].init.is_some() {
                    return Err(self.err(format!(
                        "invalid head for for-{} statement",
                        if is_in { "in" } else { "of" }
                    )));
                }
                self.next()?;
                let right = if is_in {
                    self.parse_expression(false)?
                } else {
                    self.parse_assign(false)?
                };
                self.expect(TokenKind::CloseParen, "')'")?;
                let body = self.parse_stmt()?;
                let loc = self.finish(start);
                let left = ForHead::VarDecl(decl);
                return Ok(if is_in {
                    Stmt::ForIn(Box::new(ForInStmt {
                        loc,
                        left,
                        right,
                        body,
                    }))
                } else {
                    Stmt::ForOf(Box::new(ForOfStmt {
                        loc,
                        left,
                        right,
                        body,
                    }))
                });
            }
            self.expect(TokenKind::Semicolon, "';'")?;
            return self.parse_for_tail(start, Some(ForInit::VarDecl(decl)));
        }

        let head = self.parse_expression(true)?;
        if self.at(TokenKind::InKeyword) || self.at_contextual("of") {
            let is_in = self.at(TokenKind::InKeyword);
            let left = ForHead::Target(self.expr_to_assign_target(head)?);
            self.next()?;
            let right = if is_in {
                self.parse_expression(false)?
            } else {
                self.parse_assign(false)?
            };
            self.expect(TokenKind::CloseParen, "')'")?;
            let body = self.parse_stmt()?;
            let loc = self.finish(start);
            return Ok(if is_in {
                Stmt::ForIn(Box::new(ForInStmt {
                    loc,
                    left,
                    right,
                    body,
                }))
            } else {
                Stmt::ForOf(Box::new(ForOfStmt {
                    loc,
                    left,
                    right,
                    body,
                }))
            });
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        self.parse_for_tail(start, Some(ForInit::Expr(head)))
    }

    fn parse_for_tail(
        &mut self,
        start: Position,
        init: Option<ForInit>,
    ) -> Result<Stmt, TransformError> {
        let test = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        let update = if self.at(TokenKind::CloseParen) {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect(TokenKind::CloseParen, "')'")?;
        let body = self.parse_stmt()?;
        Ok(Stmt::For(Box::new(ForStmt {
            loc: self.finish(start),
            init,
            test,
            update,
            body,
        })))
    }

    fn at_contextual(&self, word: &str) -> bool {
        self.at(TokenKind::Identifier) && self.raw_cur() == word
    }

    fn parse_switch(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        self.expect(TokenKind::OpenParen, "'('")?;
        let disc = self.parse_expression(false)?;
        self.expect(TokenKind::CloseParen, "')'")?;
        self.expect(TokenKind::OpenBrace, "'{'")?;

        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.at(TokenKind::CloseBrace) {
            let case_start = self.cur.start;
            let test = if self.eat(TokenKind::CaseKeyword)? {
                Some(self.parse_expression(false)?)
            } else if self.at(TokenKind::DefaultKeyword) {
                if seen_default {
                    return Err(self.err("multiple default clauses in switch"));
                }
                seen_default = true;
                self.next()?;
                None
            } else {
                return Err(self.err("expected 'case' or 'default'"));
            };
            self.expect(TokenKind::Colon, "':'")?;
            let mut body = Vec::new();
            while !matches!(
                self.cur.kind,
                TokenKind::CaseKeyword | TokenKind::DefaultKeyword | TokenKind::CloseBrace
            ) {
                if self.at(TokenKind::Eof) {
                    return Err(self.err("expected '}'"));
                }
                body.push(self.parse_stmt()?);
            }
            cases.push(SwitchCase {
                loc: self.finish(case_start),
                test,
                body,
            });
        }
        self.next()?;
        Ok(Stmt::Switch(Box::new(SwitchStmt {
            loc: self.finish(start),
            disc,
            cases,
        })))
    }

    fn parse_try(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        let block = self.parse_block()?;
        let handler = if self.at(TokenKind::CatchKeyword) {
            let catch_start = self.cur.start;
            self.next()?;
            let param = if self.eat(TokenKind::OpenParen)? {
                let pat = self.parse_binding_pat()?;
                self.expect(TokenKind::CloseParen, "')'")?;
                Some(pat)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                loc: self.finish(catch_start),
                param,
                body,
            })
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::FinallyKeyword)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.err("missing catch or finally after try"));
        }
        Ok(Stmt::Try(Box::new(TryStmt {
            loc: self.finish(start),
            block,
            handler,
            finalizer,
        })))
    }

    fn parse_return(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        // Restricted production: a line break ends the statement.
        let arg = if self.at(TokenKind::Semicolon)
            || self.at(TokenKind::CloseBrace)
            || self.at(TokenKind::Eof)
            || self.cur.had_line_break
        {
            None
        } else {
            Some(self.parse_expression(false)?)
        };
        self.expect_semi()?;
        Ok(Stmt::Return(ReturnStmt {
            loc: self.finish(start),
            arg,
        }))
    }

    fn parse_throw(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        if self.cur.had_line_break {
            return Err(self.err("newline not allowed after 'throw'"));
        }
        let arg = self.parse_expression(false)?;
        self.expect_semi()?;
        Ok(Stmt::Throw(ThrowStmt {
            loc: self.finish(start),
            arg,
        }))
    }

    fn parse_break(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        let label = self.parse_optional_label()?;
        self.expect_semi()?;
        Ok(Stmt::Break(BreakStmt {
            loc: self.finish(start),
            label,
        }))
    }

    fn parse_continue(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        self.next()?;
        let label = self.parse_optional_label()?;
        self.expect_semi()?;
        Ok(Stmt::Continue(ContinueStmt {
            loc: self.finish(start),
            label,
        }))
    }

    fn parse_optional_label(&mut self) -> Result<Option<Ident>, TransformError> {
        if self.at(TokenKind::Identifier) && !self.cur.had_line_break {
            let ident = self.make_ident();
            self.next()?;
            Ok(Some(ident))
        } else {
            Ok(None)
        }
    }

    fn parse_labeled(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        let label = self.make_ident();
        self.next()?;
        self.next()?; // ':'
        let body = self.parse_stmt()?;
        Ok(Stmt::Labeled(Box::new(LabeledStmt {
            loc: self.finish(start),
            label,
            body,
        })))
    }

    fn parse_expr_stmt(&mut self) -> Result<Stmt, TransformError> {
        let start = self.cur.start;
        let expr = self.parse_expression(false)?;
        self.expect_semi()?;
        Ok(Stmt::Expr(ExprStmt {
            loc: self.finish(start),
            expr,
        }))
    }

    fn make_ident(&self) -> Ident {
        Ident {
            loc: Loc {
                start: self.cur.start,
                end: self.cur.end,
            },
            name: self.raw_cur().to_string(),
        }
    }

    // =========================================================================
    // Binding patterns
    // =========================================================================

    fn parse_binding_pat(&mut self) -> Result<Pat, TransformError> {
        match self.cur.kind {
            TokenKind::Identifier => {
                let ident = self.make_ident();
                self.next()?;
                Ok(Pat::Ident(ident))
            }
            TokenKind::OpenBracket => self.parse_array_pat(),
            TokenKind::OpenBrace => self.parse_object_pat(),
            _ => Err(self.err("expected binding pattern")),
        }
    }

    fn parse_pat_with_default(&mut self) -> Result<Pat, TransformError> {
        let start = self.cur.start;
        let pat = self.parse_binding_pat()?;
        if self.eat(TokenKind::Equals)? {
            let right = self.parse_assign(false)?;
            Ok(Pat::Assign(Box::new(AssignPat {
                loc: self.finish(start),
                left: pat,
                right,
            })))
        } else {
            Ok(pat)
        }
    }

    fn parse_array_pat(&mut self) -> Result<Pat, TransformError> {
        let start = self.cur.start;
        self.next()?; // '['
        let mut elems = Vec::new();
        loop {
            if self.at(TokenKind::CloseBracket) {
                break;
            }
            if self.at(TokenKind::Comma) {
                elems.push(None);
                self.next()?;
                continue;
            }
            if self.at(TokenKind::DotDotDot) {
                let rest_start = self.cur.start;
                self.next()?;
                let arg = self.parse_binding_pat()?;
                elems.push(Some(Pat::Rest(Box::new(RestPat {
                    loc: self.finish(rest_start),
                    arg,
                }))));
                break;
            }
            elems.push(Some(self.parse_pat_with_default()?));
            if !self.at(TokenKind::CloseBracket) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::CloseBracket, "']'")?;
        Ok(Pat::Array(ArrayPat {
            loc: self.finish(start),
            elems,
        }))
    }

    fn parse_object_pat(&mut self) -> Result<Pat, TransformError> {
        let start = self.cur.start;
        self.next()?; // '{'
        let mut props = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            if self.at(TokenKind::DotDotDot) {
                let rest_start = self.cur.start;
                self.next()?;
                let arg = self.parse_binding_pat()?;
                props.push(ObjectPatProp::Rest(RestPat {
                    loc: self.finish(rest_start),
                    arg,
                }));
                break;
            }
            let prop_start = self.cur.start;
            let key = self.parse_prop_key()?;
            if self.eat(TokenKind::Colon)? {
                let value = self.parse_pat_with_default()?;
                props.push(ObjectPatProp::KeyValue {
                    loc: self.finish(prop_start),
                    key,
                    value,
                    shorthand: false,
                });
            } else {
                let PropKey::Ident(ident) = key else {
                    return Err(self.err("expected ':' after property key"));
                };
                let value = if self.eat(TokenKind::Equals)? {
                    let right = self.parse_assign(false)?;
                    Pat::Assign(Box::new(AssignPat {
                        loc: self.finish(prop_start),
                        left: Pat::Ident(ident.clone()),
                        right,
                    }))
                } else {
                    Pat::Ident(ident.clone())
                };
                props.push(ObjectPatProp::KeyValue {
                    loc: self.finish(prop_start),
                    key: PropKey::Ident(ident),
                    value,
                    shorthand: true,
                });
            }
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::CloseBrace, "'}'")?;
        Ok(Pat::Object(ObjectPat {
            loc: self.finish(start),
            props,
        }))
    }

    fn parse_prop_key(&mut self) -> Result<PropKey, TransformError> {
        match self.cur.kind {
            TokenKind::OpenBracket => Err(self.unsupported("computed property key")),
            TokenKind::StringLiteral => {
                let lit = self.make_lit(LitKind::Str);
                self.next()?;
                Ok(PropKey::Str(lit))
            }
            TokenKind::NumberLiteral => {
                let lit = self.make_lit(LitKind::Num);
                self.next()?;
                Ok(PropKey::Num(lit))
            }
            kind if kind == TokenKind::Identifier || is_word_token(kind) => {
                let ident = self.make_ident();
                self.next()?;
                Ok(PropKey::Ident(ident))
            }
            _ => Err(self.err("expected property key")),
        }
    }

    fn make_lit(&self, kind: LitKind) -> Lit {
        Lit {
            loc: Loc {
                start: self.cur.start,
                end: self.cur.end,
            },
            raw: self.raw_cur().to_string(),
            kind,
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self, no_in: bool) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        let first = self.parse_assign(no_in)?;
        if !self.at(TokenKind::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma)? {
            exprs.push(self.parse_assign(no_in)?);
        }
        Ok(Expr::Seq(Box::new(SeqExpr {
            loc: self.finish(start),
            exprs,
        })))
    }

    fn parse_assign(&mut self, no_in: bool) -> Result<Expr, TransformError> {
        // Arrow functions first: `x => ...`, `(params) => ...`, and their
        // `async`-prefixed forms. `async` followed by `(` may also be a
        // plain call, so that form goes through the same speculative parse
        // as other paren heads. A line break after `async` ends the arrow
        // interpretation, as in the grammar.
        if self.at_contextual("async") {
            let peeked = self.peek()?;
            if !peeked.had_line_break {
                if peeked.kind == TokenKind::Identifier
                    && self.peek_second()?.kind == TokenKind::Arrow
                {
                    let start = self.cur.start;
                    self.next()?; // 'async'
                    return self.parse_single_param_arrow(start, true);
                }
                if peeked.kind == TokenKind::OpenParen {
                    let snap = self.snapshot();
                    let start = self.cur.start;
                    self.next()?; // 'async'
                    match self.try_parse_paren_arrow(start, true) {
                        Ok(arrow) => return Ok(arrow),
                        Err(_) => self.restore(snap),
                    }
                }
            }
        }
        if self.at(TokenKind::Identifier) && self.peek()?.kind == TokenKind::Arrow {
            let start = self.cur.start;
            return self.parse_single_param_arrow(start, false);
        }
        if self.at(TokenKind::OpenParen) {
            let snap = self.snapshot();
            let start = self.cur.start;
            match self.try_parse_paren_arrow(start, false) {
                Ok(arrow) => return Ok(arrow),
                Err(_) => self.restore(snap),
            }
        }

        let start = self.cur.start;
        let expr = self.parse_conditional(no_in)?;

        let Some(op) = assign_op(self.cur.kind) else {
            return Ok(expr);
        };
        let target = self.expr_to_assign_target(expr)?;
        self.next()?;
        let value = self.parse_assign(no_in)?;
        Ok(Expr::Assign(Box::new(AssignExpr {
            loc: self.finish(start),
            op,
            target,
            value,
        })))
    }

    fn expr_to_assign_target(&self, expr: Expr) -> Result<AssignTarget, TransformError> {
        match expr {
            Expr::Ident(ident) => Ok(AssignTarget::Ident(ident)),
            Expr::Member(member) => Ok(AssignTarget::Member(member)),
            Expr::Array(a) => Err(TransformError::unsupported(
                self.file,
                a.loc.start,
                "destructuring assignment",
            )),
            Expr::Object(o) => Err(TransformError::unsupported(
                self.file,
                o.loc.start,
                "destructuring assignment",
            )),
            other => Err(TransformError::syntax(
                self.file,
                other.loc().start,
                "invalid assignment target",
            )),
        }
    }

    fn parse_single_param_arrow(
        &mut self,
        start: Position,
        is_async: bool,
    ) -> Result<Expr, TransformError> {
        let param = Pat::Ident(self.make_ident());
        self.next()?; // identifier
        self.next()?; // '=>'
        let body = self.parse_arrow_body()?;
        Ok(Expr::Arrow(Box::new(ArrowFunction {
            loc: self.finish(start),
            params: vec![param],
            body,
            is_async,
        })))
    }

    /// Speculative parse of `(params) => body`; the caller restores the
    /// snapshot on failure and re-parses as a parenthesized expression (or,
    /// for an `async` head, as a plain call).
    fn try_parse_paren_arrow(
        &mut self,
        start: Position,
        is_async: bool,
    ) -> Result<Expr, TransformError> {
        let params = self.parse_param_list()?;
        if !self.at(TokenKind::Arrow) {
            return Err(self.err("not an arrow function"));
        }
        self.next()?;
        let body = self.parse_arrow_body()?;
        Ok(Expr::Arrow(Box::new(ArrowFunction {
            loc: self.finish(start),
            params,
            body,
            is_async,
        })))
    }

    fn parse_arrow_body(&mut self) -> Result<ArrowBody, TransformError> {
        if self.at(TokenKind::OpenBrace) {
            Ok(ArrowBody::Block(self.parse_block()?))
        } else {
            Ok(ArrowBody::Expr(Box::new(self.parse_assign(false)?)))
        }
    }

    fn parse_param_list(&mut self) -> Result<Vec<Pat>, TransformError> {
        self.expect(TokenKind::OpenParen, "'('")?;
        let mut params = Vec::new();
        while !self.at(TokenKind::CloseParen) {
            if self.at(TokenKind::DotDotDot) {
                let rest_start = self.cur.start;
                self.next()?;
                let arg = self.parse_binding_pat()?;
                params.push(Pat::Rest(Box::new(RestPat {
                    loc: self.finish(rest_start),
                    arg,
                })));
                break;
            }
            params.push(self.parse_pat_with_default()?);
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::CloseParen, "')'")?;
        Ok(params)
    }

    fn parse_conditional(&mut self, no_in: bool) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        let test = self.parse_binary(1, no_in)?;
        if !self.eat(TokenKind::Question)? {
            return Ok(test);
        }
        let cons = self.parse_assign(false)?;
        self.expect(TokenKind::Colon, "':'")?;
        let alt = self.parse_assign(no_in)?;
        Ok(Expr::Cond(Box::new(CondExpr {
            loc: self.finish(start),
            test,
            cons,
            alt,
        })))
    }

    fn parse_binary(&mut self, min_prec: u8, no_in: bool) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        let mut left = self.parse_unary()?;
        loop {
            let kind = self.cur.kind;
            if kind == TokenKind::InKeyword && no_in {
                break;
            }
            let Some(prec) = binary_prec(kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.next()?;
            // `**` is right-associative; everything else climbs left.
            let next_min = if kind == TokenKind::AsteriskAsterisk {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary(next_min, no_in)?;
            let loc = self.finish(start);
            left = match logical_op(kind) {
                Some(op) => Expr::Logical(Box::new(LogicalExpr {
                    loc,
                    op,
                    left,
                    right,
                })),
                None => Expr::Binary(Box::new(BinaryExpr {
                    loc,
                    op: binary_op(kind),
                    left,
                    right,
                })),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        let op = match self.cur.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Exclamation => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::TypeofKeyword => Some(UnaryOp::Typeof),
            TokenKind::VoidKeyword => Some(UnaryOp::Void),
            TokenKind::DeleteKeyword => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.next()?;
            let arg = self.parse_unary()?;
            return Ok(Expr::Unary(Box::new(UnaryExpr {
                loc: self.finish(start),
                op,
                arg,
            })));
        }

        if matches!(self.cur.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if self.at(TokenKind::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            self.next()?;
            let arg = self.parse_unary()?;
            self.check_update_target(&arg)?;
            return Ok(Expr::Update(Box::new(UpdateExpr {
                loc: self.finish(start),
                op,
                prefix: true,
                arg,
            })));
        }

        match self.cur.kind {
            TokenKind::YieldKeyword => return Err(self.unsupported("yield expression")),
            TokenKind::AwaitKeyword => return Err(self.unsupported("await expression")),
            _ => {}
        }

        let expr = self.parse_lhs()?;

        // Postfix update: restricted production, no line break before ++/--.
        if matches!(self.cur.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.cur.had_line_break
        {
            let op = if self.at(TokenKind::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            self.next()?;
            self.check_update_target(&expr)?;
            return Ok(Expr::Update(Box::new(UpdateExpr {
                loc: self.finish(start),
                op,
                prefix: false,
                arg: expr,
            })));
        }
        Ok(expr)
    }

    fn check_update_target(&self, arg: &Expr) -> Result<(), TransformError> {
        match arg {
            Expr::Ident(_) | Expr::Member(_) => Ok(()),
            other => Err(TransformError::syntax(
                self.file,
                other.loc().start,
                "invalid increment/decrement target",
            )),
        }
    }

    fn parse_lhs(&mut self) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        let mut expr = if self.at(TokenKind::NewKeyword) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.cur.kind {
                TokenKind::Dot => {
                    self.next()?;
                    let prop = self.parse_member_name()?;
                    expr = Expr::Member(Box::new(MemberExpr {
                        loc: self.finish(start),
                        obj: expr,
                        prop: MemberProp::Ident(prop),
                    }));
                }
                TokenKind::OpenBracket => {
                    self.next()?;
                    let prop = self.parse_expression(false)?;
                    self.expect(TokenKind::CloseBracket, "']'")?;
                    expr = Expr::Member(Box::new(MemberExpr {
                        loc: self.finish(start),
                        obj: expr,
                        prop: MemberProp::Computed(prop),
                    }));
                }
                TokenKind::OpenParen => {
                    let args = self.parse_args()?;
                    expr = Expr::Call(Box::new(CallExpr {
                        loc: self.finish(start),
                        callee: expr,
                        args,
                    }));
                }
                TokenKind::QuestionDot => return Err(self.unsupported("optional chaining")),
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `new Callee(args)` - the callee member chain binds tighter than the
    /// argument list, and `new F` without parens is legal.
    fn parse_new(&mut self) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        self.next()?; // 'new'
        if self.at(TokenKind::Dot) {
            return Err(self.unsupported("meta-property"));
        }
        let mut callee = if self.at(TokenKind::NewKeyword) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            match self.cur.kind {
                TokenKind::Dot => {
                    self.next()?;
                    let prop = self.parse_member_name()?;
                    callee = Expr::Member(Box::new(MemberExpr {
                        loc: self.finish(start),
                        obj: callee,
                        prop: MemberProp::Ident(prop),
                    }));
                }
                TokenKind::OpenBracket => {
                    self.next()?;
                    let prop = self.parse_expression(false)?;
                    self.expect(TokenKind::CloseBracket, "']'")?;
                    callee = Expr::Member(Box::new(MemberExpr {
                        loc: self.finish(start),
                        obj: callee,
                        prop: MemberProp::Computed(prop),
                    }));
                }
                _ => break,
            }
        }
        let args = if self.at(TokenKind::OpenParen) {
            self.parse_args()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(Box::new(NewExpr {
            loc: self.finish(start),
            callee,
            args,
        })))
    }

    /// Property names after `.` may be reserved words (`obj.delete`).
    fn parse_member_name(&mut self) -> Result<Ident, TransformError> {
        if self.at(TokenKind::Identifier) || is_word_token(self.cur.kind) {
            let ident = self.make_ident();
            self.next()?;
            Ok(ident)
        } else {
            Err(self.err("expected property name"))
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, TransformError> {
        self.expect(TokenKind::OpenParen, "'('")?;
        let mut args = Vec::new();
        while !self.at(TokenKind::CloseParen) {
            if self.at(TokenKind::DotDotDot) {
                return Err(self.unsupported("spread element"));
            }
            args.push(self.parse_assign(false)?);
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.next()?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, TransformError> {
        match self.cur.kind {
            TokenKind::Identifier => {
                if self.raw_cur() == "async" {
                    let peeked = self.peek()?;
                    if peeked.kind == TokenKind::FunctionKeyword && !peeked.had_line_break {
                        self.next()?;
                        let func = self.parse_function(true, false)?;
                        return Ok(Expr::Function(Box::new(func)));
                    }
                }
                let ident = self.make_ident();
                self.next()?;
                Ok(Expr::Ident(ident))
            }
            TokenKind::NumberLiteral => self.finish_lit(LitKind::Num),
            TokenKind::BigIntLiteral => self.finish_lit(LitKind::BigInt),
            TokenKind::StringLiteral => self.finish_lit(LitKind::Str),
            TokenKind::TrueKeyword | TokenKind::FalseKeyword => self.finish_lit(LitKind::Bool),
            TokenKind::NullKeyword => self.finish_lit(LitKind::Null),
            TokenKind::Slash | TokenKind::SlashEquals => {
                self.cur = self.scanner.rescan_regex(&self.cur)?;
                self.finish_lit(LitKind::Regex)
            }
            TokenKind::ThisKeyword => {
                let loc = Loc {
                    start: self.cur.start,
                    end: self.cur.end,
                };
                self.next()?;
                Ok(Expr::This(loc))
            }
            TokenKind::OpenParen => {
                self.next()?;
                let expr = self.parse_expression(false)?;
                self.expect(TokenKind::CloseParen, "')'")?;
                Ok(expr)
            }
            TokenKind::OpenBracket => self.parse_array_lit(),
            TokenKind::OpenBrace => self.parse_object_lit(),
            TokenKind::FunctionKeyword => {
                let func = self.parse_function(false, false)?;
                Ok(Expr::Function(Box::new(func)))
            }
            TokenKind::ClassKeyword => Err(self.unsupported("class expression")),
            TokenKind::SuperKeyword => Err(self.unsupported("super")),
            TokenKind::ImportKeyword => Err(self.unsupported("import expression")),
            TokenKind::YieldKeyword => Err(self.unsupported("yield expression")),
            TokenKind::AwaitKeyword => Err(self.unsupported("await expression")),
            _ => Err(self.err(format!("unexpected token '{}'", self.raw_cur()))),
        }
    }

    fn finish_lit(&mut self, kind: LitKind) -> Result<Expr, TransformError> {
        let lit = self.make_lit(kind);
        self.next()?;
        Ok(Expr::Lit(lit))
    }

    fn parse_array_lit(&mut self) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        self.next()?; // '['
        let mut elems = Vec::new();
        loop {
            if self.at(TokenKind::CloseBracket) {
                break;
            }
            if self.at(TokenKind::Comma) {
                elems.push(None);
                self.next()?;
                continue;
            }
            if self.at(TokenKind::DotDotDot) {
                return Err(self.unsupported("spread element"));
            }
            elems.push(Some(self.parse_assign(false)?));
            if !self.at(TokenKind::CloseBracket) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.next()?;
        Ok(Expr::Array(ArrayLit {
            loc: self.finish(start),
            elems,
        }))
    }

    fn parse_object_lit(&mut self) -> Result<Expr, TransformError> {
        let start = self.cur.start;
        self.next()?; // '{'
        let mut props = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            if self.at(TokenKind::DotDotDot) {
                return Err(self.unsupported("spread element"));
            }
            if self.at(TokenKind::OpenBracket) {
                return Err(self.unsupported("computed property key"));
            }
            let prop_start = self.cur.start;

            // `get key() {}` / `set key(v) {}` accessors are out of scope;
            // a bare `get`/`set` as an ordinary key is still fine.
            if self.at(TokenKind::Identifier)
                && matches!(self.raw_cur(), "get" | "set")
                && matches!(
                    self.peek()?.kind,
                    k if k == TokenKind::Identifier
                        || k == TokenKind::StringLiteral
                        || k == TokenKind::NumberLiteral
                        || is_word_token(k)
                )
            {
                return Err(self.unsupported("getter/setter property"));
            }

            let key = self.parse_prop_key()?;
            let (value, shorthand) = if self.eat(TokenKind::Colon)? {
                (self.parse_assign(false)?, false)
            } else if self.at(TokenKind::OpenParen) {
                // Method shorthand desugars to a function-valued property.
                let fn_start = prop_start;
                let params = self.parse_param_list()?;
                let body = self.parse_block()?;
                let name = match &key {
                    PropKey::Ident(ident) => Some(ident.clone()),
                    _ => None,
                };
                (
                    Expr::Function(Box::new(Function {
                        loc: Loc {
                            start: fn_start,
                            end: self.prev_end,
                        },
                        name,
                        params,
                        body,
                        is_async: false,
                        is_generator: false,
                    })),
                    false,
                )
            } else {
                let PropKey::Ident(ident) = &key else {
                    return Err(self.err("expected ':' after property key"));
                };
                (Expr::Ident(ident.clone()), true)
            };
            props.push(ObjectProp {
                loc: self.finish(prop_start),
                key,
                value,
                shorthand,
            });
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.next()?;
        Ok(Expr::Object(ObjectLit {
            loc: self.finish(start),
            props,
        }))
    }

    /// Parse a `function` form; the `function` keyword is the current token.
    /// `require_name` distinguishes declarations from expressions.
    fn parse_function(
        &mut self,
        is_async: bool,
        require_name: bool,
    ) -> Result<Function, TransformError> {
        let start = self.cur.start;
        self.expect(TokenKind::FunctionKeyword, "'function'")?;
        let is_generator = self.eat(TokenKind::Asterisk)?;
        let name = if self.at(TokenKind::Identifier) {
            let ident = self.make_ident();
            self.next()?;
            Some(ident)
        } else if require_name {
            return Err(self.err("expected function name"));
        } else {
            None
        };
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        Ok(Function {
            loc: self.finish(start),
            name,
            params,
            body,
            is_async,
            is_generator,
        })
    }
}

// =============================================================================
// Operator tables
// =============================================================================

fn binary_prec(kind: TokenKind) -> Option<u8> {
    use TokenKind::*;
    Some(match kind {
        QuestionQuestion | BarBar => 1,
        AmpersandAmpersand => 2,
        Bar => 3,
        Caret => 4,
        Ampersand => 5,
        EqualsEquals | ExclamationEquals | EqualsEqualsEquals | ExclamationEqualsEquals => 6,
        LessThan | GreaterThan | LessThanEquals | GreaterThanEquals | InKeyword
        | InstanceofKeyword => 7,
        LessThanLessThan | GreaterThanGreaterThan | GreaterThanGreaterThanGreaterThan => 8,
        Plus | Minus => 9,
        Asterisk | Slash | Percent => 10,
        AsteriskAsterisk => 11,
        _ => return None,
    })
}

fn logical_op(kind: TokenKind) -> Option<LogicalOp> {
    match kind {
        TokenKind::AmpersandAmpersand => Some(LogicalOp::And),
        TokenKind::BarBar => Some(LogicalOp::Or),
        TokenKind::QuestionQuestion => Some(LogicalOp::Nullish),
        _ => None,
    }
}

fn binary_op(kind: TokenKind) -> BinOp {
    use TokenKind::*;
    match kind {
        Plus => BinOp::Add,
        Minus => BinOp::Sub,
        Asterisk => BinOp::Mul,
        Slash => BinOp::Div,
        Percent => BinOp::Rem,
        AsteriskAsterisk => BinOp::Exp,
        EqualsEquals => BinOp::Eq,
        ExclamationEquals => BinOp::NotEq,
        EqualsEqualsEquals => BinOp::StrictEq,
        ExclamationEqualsEquals => BinOp::StrictNotEq,
        LessThan => BinOp::Lt,
        GreaterThan => BinOp::Gt,
        LessThanEquals => BinOp::LtEq,
        GreaterThanEquals => BinOp::GtEq,
        LessThanLessThan => BinOp::Shl,
        GreaterThanGreaterThan => BinOp::Shr,
        GreaterThanGreaterThanGreaterThan => BinOp::UShr,
        Ampersand => BinOp::BitAnd,
        Bar => BinOp::BitOr,
        Caret => BinOp::BitXor,
        InKeyword => BinOp::In,
        InstanceofKeyword => BinOp::Instanceof,
        _ => unreachable!("not a binary operator token"),
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    use TokenKind::*;
    Some(match kind {
        Equals => AssignOp::Assign,
        PlusEquals => AssignOp::Add,
        MinusEquals => AssignOp::Sub,
        AsteriskEquals => AssignOp::Mul,
        SlashEquals => AssignOp::Div,
        PercentEquals => AssignOp::Rem,
        AsteriskAsteriskEquals => AssignOp::Exp,
        LessThanLessThanEquals => AssignOp::Shl,
        GreaterThanGreaterThanEquals => AssignOp::Shr,
        GreaterThanGreaterThanGreaterThanEquals => AssignOp::UShr,
        AmpersandEquals => AssignOp::BitAnd,
        BarEquals => AssignOp::BitOr,
        CaretEquals => AssignOp::BitXor,
        _ => return None,
    })
}

/// Keyword tokens that may serve as property names (`obj.delete`, `{in: 1}`).
fn is_word_token(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        VarKeyword
            | LetKeyword
            | ConstKeyword
            | FunctionKeyword
            | ReturnKeyword
            | IfKeyword
            | ElseKeyword
            | WhileKeyword
            | DoKeyword
            | ForKeyword
            | InKeyword
            | NewKeyword
            | DeleteKeyword
            | TypeofKeyword
            | VoidKeyword
            | InstanceofKeyword
            | ThrowKeyword
            | TryKeyword
            | CatchKeyword
            | FinallyKeyword
            | SwitchKeyword
            | CaseKeyword
            | DefaultKeyword
            | BreakKeyword
            | ContinueKeyword
            | NullKeyword
            | TrueKeyword
            | FalseKeyword
            | ThisKeyword
            | DebuggerKeyword
            | ClassKeyword
            | ImportKeyword
            | ExportKeyword
            | SuperKeyword
            | WithKeyword
            | YieldKeyword
            | AwaitKeyword
    )
}

#[cfg(test)]
mod tests;
