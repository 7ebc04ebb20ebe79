//! Recursive-descent parser for ES5 JavaScript.
//!
//! Call [`parse`] to turn source text into a [`Program`].  The parser pulls
//! tokens from the [`Scanner`] through a one-token push-back buffer.
//! [`TokenKind::NewLine`] tokens are consumed silently; they only set the
//! at-new-line flag that drives Automatic Semicolon Insertion and the
//! restricted productions (`return`, `continue`, `break`, `throw`, postfix
//! `++`/`--`).
//!
//! All errors are fatal to the parse; there is no recovery.

use crate::error::{RotorError, RotorResult};
use crate::parser::ast::*;
use crate::parser::scanner::{Scanner, Token, TokenKind};

/// Parse `source` into a [`Program`].
///
/// # Errors
///
/// Returns the first [`RotorError::Lexical`] or [`RotorError::Syntax`]
/// encountered; no partial AST is produced.
///
/// # Example
///
/// ```
/// use rotor_core::parser::parser::parse;
///
/// let program = parse("var x = 1;").unwrap();
/// assert_eq!(program.body.len(), 1);
/// ```
pub fn parse(source: &str) -> RotorResult<Program> {
    Parser::new(source).parse_program()
}

/// The deepest binary precedence level (`* / %`); see `binary_op`.
const MAX_BINARY_LEVEL: u8 = 10;

/// Map an assignment-operator token to its stored form: `None` for plain
/// `=`, the operator text without the trailing `=` for compound forms.
fn assignment_op(kind: TokenKind) -> Option<Option<&'static str>> {
    match kind {
        TokenKind::Equal => Some(None),
        TokenKind::StarEqual => Some(Some("*")),
        TokenKind::SlashEqual => Some(Some("/")),
        TokenKind::PercentEqual => Some(Some("%")),
        TokenKind::PlusEqual => Some(Some("+")),
        TokenKind::MinusEqual => Some(Some("-")),
        TokenKind::LessLessEqual => Some(Some("<<")),
        TokenKind::GreaterGreaterEqual => Some(Some(">>")),
        TokenKind::GreaterGreaterGreaterEqual => Some(Some(">>>")),
        TokenKind::AmpersandEqual => Some(Some("&")),
        TokenKind::CaretEqual => Some(Some("^")),
        TokenKind::PipeEqual => Some(Some("|")),
        _ => None,
    }
}

/// Map a token to its binary operator text if it belongs to precedence
/// `level` (1 binds loosest, [`MAX_BINARY_LEVEL`] tightest).
fn binary_op(kind: TokenKind, level: u8) -> Option<&'static str> {
    match (level, kind) {
        (1, TokenKind::PipePipe) => Some("||"),
        (2, TokenKind::AmpersandAmpersand) => Some("&&"),
        (3, TokenKind::Pipe) => Some("|"),
        (4, TokenKind::Caret) => Some("^"),
        (5, TokenKind::Ampersand) => Some("&"),
        (6, TokenKind::EqualEqual) => Some("=="),
        (6, TokenKind::BangEqual) => Some("!="),
        (6, TokenKind::EqualEqualEqual) => Some("==="),
        (6, TokenKind::BangEqualEqual) => Some("!=="),
        (7, TokenKind::Less) => Some("<"),
        (7, TokenKind::Greater) => Some(">"),
        (7, TokenKind::LessEqual) => Some("<="),
        (7, TokenKind::GreaterEqual) => Some(">="),
        (7, TokenKind::Instanceof) => Some("instanceof"),
        (7, TokenKind::In) => Some("in"),
        (8, TokenKind::LessLess) => Some("<<"),
        (8, TokenKind::GreaterGreater) => Some(">>"),
        (8, TokenKind::GreaterGreaterGreater) => Some(">>>"),
        (9, TokenKind::Plus) => Some("+"),
        (9, TokenKind::Minus) => Some("-"),
        (10, TokenKind::Star) => Some("*"),
        (10, TokenKind::Slash) => Some("/"),
        (10, TokenKind::Percent) => Some("%"),
        _ => None,
    }
}

/// ES5 recursive-descent parser.
pub struct Parser<'src> {
    scanner: Scanner<'src>,
    /// Push-back buffer: at most one token.
    pushed_back: Option<Token>,
    /// `true` when a line terminator was skipped immediately before the
    /// lookahead token.  Only meaningful right after a peek or a read.
    at_new_line: bool,
    /// `true` while parsing the first clause of a `for` statement, where a
    /// bare `in` must not be consumed as a binary operator.
    in_for_init: bool,
    /// Dense node-id source for this parse.
    next_node_id: NodeId,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            scanner: Scanner::new(source),
            pushed_back: None,
            at_new_line: false,
            in_for_init: false,
            next_node_id: 0,
        }
    }

    /// Parse the whole input as a [`Program`].
    pub fn parse_program(mut self) -> RotorResult<Program> {
        let id = self.node_id();
        let mut body = Vec::new();
        loop {
            let tok = self.next()?;
            if tok.kind == TokenKind::Eof {
                break;
            }
            self.push_back(tok);
            body.push(self.parse_statement()?);
        }
        Ok(Program { id, body })
    }

    // ── Token plumbing ──────────────────────────────────────────────────────

    fn node_id(&mut self) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        id
    }

    /// Return the next significant token, consuming any [`TokenKind::NewLine`]
    /// tokens on the way and recording them in the at-new-line flag.
    fn next(&mut self) -> RotorResult<Token> {
        if let Some(tok) = self.pushed_back.take() {
            return Ok(tok);
        }
        self.at_new_line = false;
        loop {
            let tok = self.scanner.next_token()?;
            if tok.kind == TokenKind::NewLine {
                self.at_new_line = true;
                continue;
            }
            return Ok(tok);
        }
    }

    fn push_back(&mut self, token: Token) {
        debug_assert!(
            self.pushed_back.is_none(),
            "push-back buffer holds at most one token"
        );
        self.pushed_back = Some(token);
    }

    /// Peek at the kind of the next significant token.
    fn peek_kind(&mut self) -> RotorResult<TokenKind> {
        let tok = self.next()?;
        let kind = tok.kind;
        self.push_back(tok);
        Ok(kind)
    }

    /// Consume the next token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> RotorResult<bool> {
        let tok = self.next()?;
        if tok.kind == kind {
            Ok(true)
        } else {
            self.push_back(tok);
            Ok(false)
        }
    }

    /// Consume the next token, requiring the given kind.
    fn expect(&mut self, kind: TokenKind, context: &str) -> RotorResult<Token> {
        let tok = self.next()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(self.unexpected(context, &tok))
        }
    }

    fn unexpected(&self, context: &str, token: &Token) -> RotorError {
        RotorError::Syntax(format!("unexpected token: {context}. {token}"))
    }

    /// Consume a statement terminator: an explicit `;`, or — by Automatic
    /// Semicolon Insertion — a following `}`, end of input, or a newline
    /// before the next token.
    fn consume_statement_semicolon(&mut self) -> RotorResult<()> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Semicolon => Ok(()),
            TokenKind::RightBrace | TokenKind::Eof => {
                self.push_back(tok);
                Ok(())
            }
            _ if self.at_new_line => {
                self.push_back(tok);
                Ok(())
            }
            _ => Err(self.unexpected("expected ';'", &tok)),
        }
    }

    // ── Statements ──────────────────────────────────────────────────────────

    fn parse_statement(&mut self) -> RotorResult<Stmt> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::LeftBrace => {
                self.push_back(tok);
                Ok(Stmt::Block(self.parse_block()?))
            }
            TokenKind::Semicolon => Ok(Stmt::Empty(EmptyStmt { id: self.node_id() })),
            TokenKind::Var => self.parse_var_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Function => self.parse_function_declaration(),
            _ => {
                self.push_back(tok);
                self.parse_expression_statement()
            }
        }
    }

    /// Parse `{ statements }`.
    fn parse_block(&mut self) -> RotorResult<BlockStmt> {
        self.expect(TokenKind::LeftBrace, "expected '{'")?;
        let mut body = Vec::new();
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::RightBrace => break,
                TokenKind::Eof => return Err(self.unexpected("expected '}'", &tok)),
                _ => {
                    self.push_back(tok);
                    body.push(self.parse_statement()?);
                }
            }
        }
        Ok(BlockStmt {
            id: self.node_id(),
            body,
        })
    }

    /// An expression statement, or a labeled statement when the expression
    /// turns out to be a bare identifier followed by `:`.
    fn parse_expression_statement(&mut self) -> RotorResult<Stmt> {
        let expr = self.parse_expression()?;
        if let Expr::Ident(var_use) = &expr
            && self.peek_kind()? == TokenKind::Colon
        {
            let label = var_use.name.clone();
            self.next()?; // ':'
            let body = self.parse_statement()?;
            return Ok(Stmt::Labeled(Box::new(LabeledStmt {
                id: self.node_id(),
                label,
                body,
            })));
        }
        self.consume_statement_semicolon()?;
        Ok(Stmt::Expr(ExprStmt {
            id: self.node_id(),
            expr,
        }))
    }

    /// `var` statement: a declaration list wrapped in an expression
    /// statement.  The `var` keyword has been consumed.
    fn parse_var_statement(&mut self) -> RotorResult<Stmt> {
        let list = self.parse_var_declarations()?;
        self.consume_statement_semicolon()?;
        Ok(Stmt::Expr(ExprStmt {
            id: self.node_id(),
            expr: list,
        }))
    }

    /// Parse the declarators after a consumed `var` keyword.  Does not
    /// consume a statement terminator, so the same path serves `for` heads.
    fn parse_var_declarations(&mut self) -> RotorResult<Expr> {
        let mut declarations = Vec::new();
        loop {
            let name_tok = self.expect(TokenKind::Identifier, "expected a variable name")?;
            let decl = VarDecl {
                id: self.node_id(),
                name: name_tok.value.unwrap_or_default(),
            };
            let init = if self.eat(TokenKind::Equal)? {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(VarInit {
                id: self.node_id(),
                decl,
                init,
            });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        Ok(Expr::VarDecls(VarDeclList {
            id: self.node_id(),
            declarations,
        }))
    }

    fn parse_if_statement(&mut self) -> RotorResult<Stmt> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'if'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after if condition")?;
        let consequent = self.parse_statement()?;
        let alternate = if self.eat(TokenKind::Else)? {
            self.parse_statement()?
        } else {
            Stmt::Empty(EmptyStmt { id: self.node_id() })
        };
        Ok(Stmt::If(Box::new(IfStmt {
            id: self.node_id(),
            test,
            consequent,
            alternate,
        })))
    }

    /// Parse a `for` head and dispatch between the classic and `for-in`
    /// forms on the separator (`;` vs `in`) after the first clause.
    fn parse_for_statement(&mut self) -> RotorResult<Stmt> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'for'")?;
        let first = self.next()?;
        let init = match first.kind {
            TokenKind::Semicolon => None,
            TokenKind::Var => {
                self.in_for_init = true;
                let list = self.parse_var_declarations();
                self.in_for_init = false;
                Some(list?)
            }
            _ => {
                self.push_back(first);
                self.in_for_init = true;
                let expr = self.parse_expression();
                self.in_for_init = false;
                Some(expr?)
            }
        };
        let init = match init {
            // `for (;` — the first ';' is already consumed.
            None => None,
            Some(expr) => {
                let sep = self.next()?;
                match sep.kind {
                    TokenKind::Semicolon => Some(expr),
                    TokenKind::In => return self.parse_for_in_rest(expr),
                    _ => {
                        return Err(self.unexpected("expected ';' or 'in' in for statement", &sep));
                    }
                }
            }
        };
        let test = if self.eat(TokenKind::Semicolon)? {
            Expr::Bool(BoolLit {
                id: self.node_id(),
                value: true,
            })
        } else {
            let test = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "expected ';' after for condition")?;
            test
        };
        let update = if self.peek_kind()? == TokenKind::RightParen {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RightParen, "expected ')' after for clauses")?;
        let body = self.parse_statement()?;
        Ok(Stmt::For(Box::new(ForStmt {
            id: self.node_id(),
            init,
            test,
            update,
            body,
        })))
    }

    /// Finish a `for-in` statement; `left` is the already-parsed first
    /// clause and the `in` keyword has been consumed.
    fn parse_for_in_rest(&mut self, left: Expr) -> RotorResult<Stmt> {
        match &left {
            Expr::VarDecls(list) => {
                if list.declarations.len() != 1 {
                    return Err(RotorError::Syntax(
                        "only a single variable declaration is allowed in a for-in statement"
                            .to_owned(),
                    ));
                }
            }
            Expr::Ident(_) | Expr::Member(_) => {}
            _ => {
                return Err(RotorError::Syntax(
                    "left-hand side of for-in must be a variable or property access".to_owned(),
                ));
            }
        }
        let right = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after for-in object")?;
        let body = self.parse_statement()?;
        Ok(Stmt::ForIn(Box::new(ForInStmt {
            id: self.node_id(),
            left,
            right,
            body,
        })))
    }

    fn parse_while_statement(&mut self) -> RotorResult<Stmt> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after while condition")?;
        let body = self.parse_statement()?;
        Ok(Stmt::While(Box::new(WhileStmt {
            id: self.node_id(),
            test,
            body,
        })))
    }

    fn parse_do_while_statement(&mut self) -> RotorResult<Stmt> {
        let body = self.parse_statement()?;
        self.expect(TokenKind::While, "expected 'while' after do body")?;
        self.expect(TokenKind::LeftParen, "expected '(' after 'while'")?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after do-while condition")?;
        self.consume_statement_semicolon()?;
        Ok(Stmt::DoWhile(Box::new(DoWhileStmt {
            id: self.node_id(),
            body,
            test,
        })))
    }

    /// Restricted production: a newline after `continue` ends the statement.
    fn parse_continue_statement(&mut self) -> RotorResult<Stmt> {
        let label = self.parse_jump_label()?;
        self.consume_statement_semicolon()?;
        Ok(Stmt::Continue(ContinueStmt {
            id: self.node_id(),
            label,
        }))
    }

    /// Restricted production: a newline after `break` ends the statement.
    fn parse_break_statement(&mut self) -> RotorResult<Stmt> {
        let label = self.parse_jump_label()?;
        self.consume_statement_semicolon()?;
        Ok(Stmt::Break(BreakStmt {
            id: self.node_id(),
            label,
        }))
    }

    fn parse_jump_label(&mut self) -> RotorResult<Option<String>> {
        let kind = self.peek_kind()?;
        if kind == TokenKind::Identifier && !self.at_new_line {
            let tok = self.next()?;
            Ok(tok.value)
        } else {
            Ok(None)
        }
    }

    /// Restricted production: a newline after `return` means no value; the
    /// value slot then holds an undefined literal.
    fn parse_return_statement(&mut self) -> RotorResult<Stmt> {
        let kind = self.peek_kind()?;
        let argument = if self.at_new_line
            || matches!(
                kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
            ) {
            Expr::Undefined(UndefinedLit { id: self.node_id() })
        } else {
            self.parse_expression()?
        };
        self.consume_statement_semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            id: self.node_id(),
            argument,
        }))
    }

    fn parse_throw_statement(&mut self) -> RotorResult<Stmt> {
        self.peek_kind()?;
        if self.at_new_line {
            return Err(RotorError::Syntax("illegal newline after 'throw'".to_owned()));
        }
        let argument = self.parse_expression()?;
        self.consume_statement_semicolon()?;
        Ok(Stmt::Throw(ThrowStmt {
            id: self.node_id(),
            argument,
        }))
    }

    fn parse_try_statement(&mut self) -> RotorResult<Stmt> {
        let block = self.parse_block()?;
        let handler = if self.eat(TokenKind::Catch)? {
            self.expect(TokenKind::LeftParen, "expected '(' after 'catch'")?;
            let name_tok =
                self.expect(TokenKind::Identifier, "expected exception parameter name")?;
            let param = Param {
                id: self.node_id(),
                name: name_tok.value.unwrap_or_default(),
            };
            self.expect(TokenKind::RightParen, "expected ')' after exception parameter")?;
            let body = self.parse_block()?;
            Some(CatchClause {
                id: self.node_id(),
                param,
                body,
            })
        } else {
            None
        };
        let finalizer = if self.eat(TokenKind::Finally)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(RotorError::Syntax(
                "'try' statement requires 'catch' or 'finally'".to_owned(),
            ));
        }
        Ok(Stmt::Try(Box::new(TryStmt {
            id: self.node_id(),
            block,
            handler,
            finalizer,
        })))
    }

    fn parse_with_statement(&mut self) -> RotorResult<Stmt> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'with'")?;
        let object = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after with object")?;
        let body = self.parse_statement()?;
        Ok(Stmt::With(Box::new(WithStmt {
            id: self.node_id(),
            object,
            body,
        })))
    }

    fn parse_switch_statement(&mut self) -> RotorResult<Stmt> {
        self.expect(TokenKind::LeftParen, "expected '(' after 'switch'")?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::RightParen, "expected ')' after switch expression")?;
        self.expect(TokenKind::LeftBrace, "expected '{' to open switch body")?;
        let mut cases = Vec::new();
        let mut saw_default = false;
        loop {
            let tok = self.next()?;
            match tok.kind {
                TokenKind::RightBrace => break,
                TokenKind::Case => {
                    let test = self.parse_expression()?;
                    self.expect(TokenKind::Colon, "expected ':' after case expression")?;
                    let body = self.parse_switch_clause_body()?;
                    cases.push(SwitchCase {
                        id: self.node_id(),
                        test: Some(test),
                        body,
                    });
                }
                TokenKind::Default => {
                    if saw_default {
                        return Err(RotorError::Syntax(
                            "'switch' statement has multiple 'default' clauses".to_owned(),
                        ));
                    }
                    saw_default = true;
                    self.expect(TokenKind::Colon, "expected ':' after 'default'")?;
                    let body = self.parse_switch_clause_body()?;
                    cases.push(SwitchCase {
                        id: self.node_id(),
                        test: None,
                        body,
                    });
                }
                _ => {
                    return Err(
                        self.unexpected("expected 'case', 'default', or '}' in switch body", &tok)
                    );
                }
            }
        }
        Ok(Stmt::Switch(Box::new(SwitchStmt {
            id: self.node_id(),
            discriminant,
            cases,
        })))
    }

    /// Statements of one `case`/`default` clause, collected into a block.
    fn parse_switch_clause_body(&mut self) -> RotorResult<BlockStmt> {
        let mut body = Vec::new();
        loop {
            match self.peek_kind()? {
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof => {
                    break;
                }
                _ => body.push(self.parse_statement()?),
            }
        }
        Ok(BlockStmt {
            id: self.node_id(),
            body,
        })
    }

    /// Function declaration; the `function` keyword has been consumed and a
    /// name is required.
    fn parse_function_declaration(&mut self) -> RotorResult<Stmt> {
        let name_tok = self.expect(TokenKind::Identifier, "expected function name")?;
        let name = VarDecl {
            id: self.node_id(),
            name: name_tok.value.unwrap_or_default(),
        };
        let function = self.parse_function_rest()?;
        Ok(Stmt::FnDecl(Box::new(FnDeclStmt {
            id: self.node_id(),
            name,
            function,
        })))
    }

    /// Parameter list and body of a function, after the name (if any).
    fn parse_function_rest(&mut self) -> RotorResult<FnExpr> {
        self.expect(TokenKind::LeftParen, "expected '(' before parameter list")?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::RightParen)? {
            loop {
                let tok = self.expect(TokenKind::Identifier, "expected parameter name")?;
                params.push(Param {
                    id: self.node_id(),
                    name: tok.value.unwrap_or_default(),
                });
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "expected ')' after parameter list")?;
        }
        // A function body is a fresh context for the `in` operator even when
        // the function expression sits inside a for-statement head.
        let saved_in_for_init = self.in_for_init;
        self.in_for_init = false;
        let body = self.parse_block();
        self.in_for_init = saved_in_for_init;
        Ok(FnExpr {
            id: self.node_id(),
            params,
            body: body?,
        })
    }

    // ── Expressions ─────────────────────────────────────────────────────────

    /// Full expression: comma-separated assignment expressions.
    fn parse_expression(&mut self) -> RotorResult<Expr> {
        let first = self.parse_assignment()?;
        if self.peek_kind()? != TokenKind::Comma {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(TokenKind::Comma)? {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expr::Sequence(SequenceExpr {
            id: self.node_id(),
            expressions,
        }))
    }

    /// Right-associative assignment.  The target must be a variable use or a
    /// property access.
    fn parse_assignment(&mut self) -> RotorResult<Expr> {
        let target = self.parse_conditional()?;
        let Some(op) = assignment_op(self.peek_kind()?) else {
            return Ok(target);
        };
        if !matches!(target, Expr::Ident(_) | Expr::Member(_)) {
            return Err(RotorError::Syntax("invalid assignment target".to_owned()));
        }
        self.next()?; // the assignment operator
        let value = self.parse_assignment()?;
        Ok(Expr::Assign(Box::new(AssignExpr {
            id: self.node_id(),
            target,
            op: op.map(str::to_owned),
            value,
        })))
    }

    fn parse_conditional(&mut self) -> RotorResult<Expr> {
        let test = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(TokenKind::Colon, "expected ':' in conditional expression")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional(Box::new(ConditionalExpr {
            id: self.node_id(),
            test,
            consequent,
            alternate,
        })))
    }

    /// Precedence climbing over levels 1..=[`MAX_BINARY_LEVEL`].  All binary
    /// operators are left-associative.
    fn parse_binary(&mut self, level: u8) -> RotorResult<Expr> {
        if level > MAX_BINARY_LEVEL {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level + 1)?;
        loop {
            let kind = self.peek_kind()?;
            let Some(op) = binary_op(kind, level) else {
                break;
            };
            if kind == TokenKind::In && self.in_for_init {
                break;
            }
            self.next()?;
            let right = self.parse_binary(level + 1)?;
            left = Expr::Binary(Box::new(BinaryExpr {
                id: self.node_id(),
                op: op.to_owned(),
                left,
                right,
            }));
        }
        Ok(left)
    }

    /// Prefix operators.  `++ -- + -` are stored with a `prefix` marker so
    /// later passes can tell them apart from their binary forms.
    fn parse_unary(&mut self) -> RotorResult<Expr> {
        let tok = self.next()?;
        let op = match tok.kind {
            TokenKind::Delete => Some("delete"),
            TokenKind::Void => Some("void"),
            TokenKind::Typeof => Some("typeof"),
            TokenKind::Tilde => Some("~"),
            TokenKind::Bang => Some("!"),
            TokenKind::PlusPlus => Some("prefix++"),
            TokenKind::MinusMinus => Some("prefix--"),
            TokenKind::Plus => Some("prefix+"),
            TokenKind::Minus => Some("prefix-"),
            _ => None,
        };
        match op {
            Some(op) => {
                let argument = self.parse_unary()?;
                Ok(Expr::Prefix(Box::new(PrefixExpr {
                    id: self.node_id(),
                    op: op.to_owned(),
                    argument,
                })))
            }
            None => {
                self.push_back(tok);
                self.parse_postfix()
            }
        }
    }

    /// Restricted production: postfix `++`/`--` only attach when no newline
    /// precedes them.
    fn parse_postfix(&mut self) -> RotorResult<Expr> {
        let argument = self.parse_left_hand_side()?;
        let kind = self.peek_kind()?;
        if matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus) && !self.at_new_line {
            self.next()?;
            let op = if kind == TokenKind::PlusPlus { "++" } else { "--" };
            return Ok(Expr::Postfix(Box::new(PostfixExpr {
                id: self.node_id(),
                op: op.to_owned(),
                argument,
            })));
        }
        Ok(argument)
    }

    fn parse_left_hand_side(&mut self) -> RotorResult<Expr> {
        let primary = if self.peek_kind()? == TokenKind::New {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };
        self.parse_access_chain(primary, true)
    }

    /// `new` expression.  Access chains are allowed inside the target; an
    /// argument list binds to the innermost pending `new`, while call parens
    /// beyond that attach to the outermost expression (handled by the
    /// caller's chain).
    fn parse_new_expression(&mut self) -> RotorResult<Expr> {
        self.next()?; // 'new'
        let target = if self.peek_kind()? == TokenKind::New {
            self.parse_new_expression()?
        } else {
            self.parse_primary()?
        };
        let callee = self.parse_access_chain(target, false)?;
        let arguments = if self.peek_kind()? == TokenKind::LeftParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(Box::new(NewExpr {
            id: self.node_id(),
            callee,
            arguments,
        })))
    }

    /// Accumulate `[…]`, `.name`, and (optionally) call suffixes onto `expr`.
    /// `.name` is normalized to a computed access with a quoted string
    /// selector.
    fn parse_access_chain(&mut self, mut expr: Expr, allow_calls: bool) -> RotorResult<Expr> {
        loop {
            match self.peek_kind()? {
                TokenKind::LeftBracket => {
                    self.next()?;
                    let property = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket, "expected ']' after property expression")?;
                    expr = Expr::Member(Box::new(MemberExpr {
                        id: self.node_id(),
                        object: expr,
                        property,
                    }));
                }
                TokenKind::Dot => {
                    self.next()?;
                    let name_tok =
                        self.expect(TokenKind::Identifier, "expected property name after '.'")?;
                    let name = name_tok.value.unwrap_or_default();
                    let property = Expr::Str(StrLit {
                        id: self.node_id(),
                        raw: format!("\"{name}\""),
                    });
                    expr = Expr::Member(Box::new(MemberExpr {
                        id: self.node_id(),
                        object: expr,
                        property,
                    }));
                }
                TokenKind::LeftParen if allow_calls => {
                    let arguments = self.parse_arguments()?;
                    expr = Expr::Call(Box::new(CallExpr {
                        id: self.node_id(),
                        callee: expr,
                        arguments,
                    }));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> RotorResult<Vec<Expr>> {
        self.expect(TokenKind::LeftParen, "expected '(' to open argument list")?;
        let mut arguments = Vec::new();
        if !self.eat(TokenKind::RightParen)? {
            loop {
                arguments.push(self.parse_assignment()?);
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RightParen, "expected ')' after arguments")?;
        }
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> RotorResult<Expr> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Function => {
                if self.peek_kind()? == TokenKind::Identifier {
                    let name_tok = self.next()?;
                    let name = VarDecl {
                        id: self.node_id(),
                        name: name_tok.value.unwrap_or_default(),
                    };
                    let function = self.parse_function_rest()?;
                    Ok(Expr::NamedFn(Box::new(NamedFnExpr {
                        id: self.node_id(),
                        name,
                        function,
                    })))
                } else {
                    Ok(Expr::Fn(Box::new(self.parse_function_rest()?)))
                }
            }
            TokenKind::This => Ok(Expr::This(ThisExpr { id: self.node_id() })),
            TokenKind::Null => Ok(Expr::Null(NullLit { id: self.node_id() })),
            TokenKind::True => Ok(Expr::Bool(BoolLit {
                id: self.node_id(),
                value: true,
            })),
            TokenKind::False => Ok(Expr::Bool(BoolLit {
                id: self.node_id(),
                value: false,
            })),
            TokenKind::NumericLiteral => Ok(Expr::Num(NumLit {
                id: self.node_id(),
                raw: tok.value.unwrap_or_default(),
            })),
            TokenKind::StringLiteral => Ok(Expr::Str(StrLit {
                id: self.node_id(),
                raw: tok.value.unwrap_or_default(),
            })),
            TokenKind::Identifier => Ok(Expr::Ident(VarUse {
                id: self.node_id(),
                name: tok.value.unwrap_or_default(),
            })),
            TokenKind::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(
                    TokenKind::RightParen,
                    "expected ')' after parenthesized expression",
                )?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array_initializer(),
            TokenKind::LeftBrace => self.parse_object_initializer(),
            // A '/' or '/=' token in primary position opens a regular
            // expression: re-lex it from the slash.
            TokenKind::Slash | TokenKind::SlashEqual => {
                let re = self.scanner.lex_regexp(tok.position)?;
                Ok(Expr::Regexp(RegExpLit {
                    id: self.node_id(),
                    raw: re.value.unwrap_or_default(),
                }))
            }
            _ => Err(self.unexpected("expected an expression", &tok)),
        }
    }

    /// Array initializer; the `[` has been consumed.  Every elision comma
    /// opens a slot, so `[,]` has length 2 and `[a,]` has length 1.
    fn parse_array_initializer(&mut self) -> RotorResult<Expr> {
        let mut elements = Vec::new();
        let mut index: u32 = 0;
        let mut after_elision = false;
        let length: u32;
        loop {
            match self.peek_kind()? {
                TokenKind::RightBracket => {
                    self.next()?;
                    length = if after_elision { index + 1 } else { index };
                    break;
                }
                TokenKind::Comma => {
                    self.next()?;
                    index += 1;
                    after_elision = true;
                }
                _ => {
                    let value = self.parse_assignment()?;
                    elements.push(ArrayElement {
                        id: self.node_id(),
                        index,
                        value,
                    });
                    index += 1;
                    after_elision = false;
                    match self.peek_kind()? {
                        TokenKind::Comma => {
                            self.next()?;
                            // A trailing comma right before ']' closes the
                            // array without opening another slot.
                            if self.peek_kind()? == TokenKind::RightBracket {
                                self.next()?;
                                length = index;
                                break;
                            }
                        }
                        TokenKind::RightBracket => {}
                        _ => {
                            let tok = self.next()?;
                            return Err(
                                self.unexpected("expected ',' or ']' in array initializer", &tok)
                            );
                        }
                    }
                }
            }
        }
        Ok(Expr::Array(ArrayLit {
            id: self.node_id(),
            length,
            elements,
        }))
    }

    /// Object initializer; the `{` has been consumed.  Identifier keys are
    /// promoted to quoted string literals.
    fn parse_object_initializer(&mut self) -> RotorResult<Expr> {
        let mut properties = Vec::new();
        if !self.eat(TokenKind::RightBrace)? {
            loop {
                let tok = self.next()?;
                let key = match tok.kind {
                    TokenKind::Identifier => {
                        let name = tok.value.unwrap_or_default();
                        Expr::Str(StrLit {
                            id: self.node_id(),
                            raw: format!("\"{name}\""),
                        })
                    }
                    TokenKind::StringLiteral => Expr::Str(StrLit {
                        id: self.node_id(),
                        raw: tok.value.unwrap_or_default(),
                    }),
                    TokenKind::NumericLiteral => Expr::Num(NumLit {
                        id: self.node_id(),
                        raw: tok.value.unwrap_or_default(),
                    }),
                    _ => return Err(self.unexpected("expected a property name", &tok)),
                };
                self.expect(TokenKind::Colon, "expected ':' after property name")?;
                let value = self.parse_assignment()?;
                properties.push(Property {
                    id: self.node_id(),
                    key,
                    value,
                });
                let sep = self.next()?;
                match sep.kind {
                    TokenKind::Comma => {}
                    TokenKind::RightBrace => break,
                    _ => {
                        return Err(
                            self.unexpected("expected ',' or '}' in object initializer", &sep)
                        );
                    }
                }
            }
        }
        Ok(Expr::Object(ObjectLit {
            id: self.node_id(),
            properties,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_src(src: &str) -> Program {
        parse(src).unwrap()
    }

    fn parse_err(src: &str) -> RotorError {
        parse(src).unwrap_err()
    }

    fn only_stmt(program: &Program) -> &Stmt {
        assert_eq!(program.body.len(), 1, "expected one statement");
        &program.body[0]
    }

    fn stmt_expr(stmt: &Stmt) -> &Expr {
        match stmt {
            Stmt::Expr(e) => &e.expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    // ── Variable declarations ────────────────────────────────────────────────

    #[test]
    fn test_var_statement() {
        let program = parse_src("var x=1;");
        let expr = stmt_expr(only_stmt(&program));
        let Expr::VarDecls(list) = expr else {
            panic!("expected a declaration list, got {expr:?}");
        };
        assert_eq!(list.declarations.len(), 1);
        assert_eq!(list.declarations[0].decl.name, "x");
        let init = list.declarations[0].init.as_ref().unwrap();
        assert!(matches!(init, Expr::Num(n) if n.raw == "1"));
    }

    #[test]
    fn test_var_list_multiple_declarators() {
        let program = parse_src("var a, b = 2;");
        let Expr::VarDecls(list) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a declaration list");
        };
        assert_eq!(list.declarations.len(), 2);
        assert!(list.declarations[0].init.is_none());
        assert!(list.declarations[1].init.is_some());
    }

    // ── If statements ────────────────────────────────────────────────────────

    #[test]
    fn test_if_else() {
        let program = parse_src("if(a)b;else c;");
        let Stmt::If(s) = only_stmt(&program) else {
            panic!("expected an if statement");
        };
        assert!(matches!(&s.test, Expr::Ident(u) if u.name == "a"));
        assert!(matches!(stmt_expr(&s.consequent), Expr::Ident(u) if u.name == "b"));
        assert!(s.has_alternate());
        assert!(matches!(stmt_expr(&s.alternate), Expr::Ident(u) if u.name == "c"));
    }

    #[test]
    fn test_if_without_else() {
        let program = parse_src("if(a)b;");
        let Stmt::If(s) = only_stmt(&program) else {
            panic!("expected an if statement");
        };
        assert!(!s.has_alternate());
        assert!(matches!(s.alternate, Stmt::Empty(_)));
    }

    // ── ASI ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_asi_newline_splits_postfix() {
        // `a=b` then `++c`: the postfix production is restricted, so the
        // newline ends the first statement.
        let program = parse_src("a=b\n++c");
        assert_eq!(program.body.len(), 2);
        assert!(matches!(stmt_expr(&program.body[0]), Expr::Assign(_)));
        let Expr::Prefix(p) = stmt_expr(&program.body[1]) else {
            panic!("expected a prefix increment");
        };
        assert_eq!(p.op, "prefix++");
    }

    #[test]
    fn test_asi_before_rbrace_and_eof() {
        assert_eq!(parse_src("{a}").body.len(), 1);
        assert_eq!(parse_src("a").body.len(), 1);
    }

    #[test]
    fn test_missing_terminator_is_error() {
        let err = parse_err("a b");
        assert!(matches!(err, RotorError::Syntax(_)));
        assert!(err.to_string().contains("unexpected token"));
    }

    // ── Restricted productions ───────────────────────────────────────────────

    #[test]
    fn test_return_forms() {
        let program = parse_src("function f(){return;}");
        let Stmt::FnDecl(f) = only_stmt(&program) else {
            panic!("expected a function declaration");
        };
        let Stmt::Return(r) = &f.function.body.body[0] else {
            panic!("expected a return statement");
        };
        assert!(matches!(r.argument, Expr::Undefined(_)));

        let program = parse_src("function f(){return\nx;}");
        let Stmt::FnDecl(f) = only_stmt(&program) else {
            panic!("expected a function declaration");
        };
        assert_eq!(f.function.body.body.len(), 2);
        let Stmt::Return(r) = &f.function.body.body[0] else {
            panic!("expected a return statement");
        };
        assert!(matches!(r.argument, Expr::Undefined(_)));
    }

    #[test]
    fn test_break_continue_labels() {
        let program = parse_src("lbl: while(a){continue lbl;break;}");
        let Stmt::Labeled(l) = only_stmt(&program) else {
            panic!("expected a labeled statement");
        };
        assert_eq!(l.label, "lbl");
        let Stmt::While(w) = &l.body else {
            panic!("expected a while loop");
        };
        let Stmt::Block(b) = &w.body else {
            panic!("expected a block body");
        };
        assert!(matches!(&b.body[0], Stmt::Continue(c) if c.label.as_deref() == Some("lbl")));
        assert!(matches!(&b.body[1], Stmt::Break(br) if br.label.is_none()));
    }

    #[test]
    fn test_continue_label_dropped_after_newline() {
        let program = parse_src("while(a){continue\nlbl;}");
        let Stmt::While(w) = only_stmt(&program) else {
            panic!("expected a while loop");
        };
        let Stmt::Block(b) = &w.body else {
            panic!("expected a block body");
        };
        assert!(matches!(&b.body[0], Stmt::Continue(c) if c.label.is_none()));
        assert!(matches!(stmt_expr(&b.body[1]), Expr::Ident(u) if u.name == "lbl"));
    }

    #[test]
    fn test_throw_newline_is_error() {
        assert!(matches!(parse_err("throw\nx;"), RotorError::Syntax(_)));
        assert!(parse("throw x;").is_ok());
    }

    // ── Try statements ───────────────────────────────────────────────────────

    #[test]
    fn test_try_requires_catch_or_finally() {
        assert!(matches!(parse_err("try{}"), RotorError::Syntax(_)));
        assert!(parse("try{}finally{}").is_ok());
        let program = parse_src("try{}catch(e){}");
        let Stmt::Try(t) = only_stmt(&program) else {
            panic!("expected a try statement");
        };
        assert_eq!(t.handler.as_ref().unwrap().param.name, "e");
        assert!(t.finalizer.is_none());
    }

    // ── Switch statements ────────────────────────────────────────────────────

    #[test]
    fn test_switch_cases() {
        let program = parse_src("switch(k){case 1: a; case 2: b; default: c;}");
        let Stmt::Switch(s) = only_stmt(&program) else {
            panic!("expected a switch statement");
        };
        assert_eq!(s.cases.len(), 3);
        assert!(s.cases[0].test.is_some());
        assert!(s.cases[2].test.is_none());
        assert_eq!(s.cases[0].body.body.len(), 1);
    }

    #[test]
    fn test_switch_duplicate_default_is_error() {
        let err = parse_err("switch(k){default: a; default: b;}");
        assert!(err.to_string().contains("default"));
    }

    // ── For statements ───────────────────────────────────────────────────────

    #[test]
    fn test_for_classic() {
        let program = parse_src("for(var i=0;i<n;i++)x;");
        let Stmt::For(f) = only_stmt(&program) else {
            panic!("expected a for statement");
        };
        assert!(matches!(f.init.as_ref().unwrap(), Expr::VarDecls(_)));
        assert!(matches!(&f.test, Expr::Binary(b) if b.op == "<"));
        assert!(matches!(f.update.as_ref().unwrap(), Expr::Postfix(p) if p.op == "++"));
    }

    #[test]
    fn test_for_empty_clauses_default_to_true() {
        let program = parse_src("for(;;)x;");
        let Stmt::For(f) = only_stmt(&program) else {
            panic!("expected a for statement");
        };
        assert!(f.init.is_none());
        assert!(matches!(&f.test, Expr::Bool(b) if b.value));
        assert!(f.update.is_none());
    }

    #[test]
    fn test_for_in_variants() {
        let program = parse_src("for(var k in o)x;");
        let Stmt::ForIn(f) = only_stmt(&program) else {
            panic!("expected a for-in statement");
        };
        assert!(matches!(&f.left, Expr::VarDecls(l) if l.declarations.len() == 1));

        let program = parse_src("for(k in o)x;");
        let Stmt::ForIn(f) = only_stmt(&program) else {
            panic!("expected a for-in statement");
        };
        assert!(matches!(&f.left, Expr::Ident(_)));

        let program = parse_src("for(a.b in o)x;");
        let Stmt::ForIn(f) = only_stmt(&program) else {
            panic!("expected a for-in statement");
        };
        assert!(matches!(&f.left, Expr::Member(_)));
    }

    #[test]
    fn test_for_in_multiple_declarations_is_error() {
        let err = parse_err("for(var a,b in o)x;");
        assert!(err.to_string().contains("single variable declaration"));
    }

    #[test]
    fn test_for_in_bad_lhs_is_error() {
        let err = parse_err("for(1 in o)x;");
        assert!(err.to_string().contains("left-hand side"));
    }

    #[test]
    fn test_in_operator_allowed_outside_for_init() {
        let program = parse_src("x = a in b;");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        assert!(matches!(&a.value, Expr::Binary(b) if b.op == "in"));
    }

    #[test]
    fn test_in_operator_allowed_in_function_inside_for_init() {
        // The for-init restriction must not leak into nested function bodies.
        let src = "for(var f = function(){ x = a in b; };;)break;";
        assert!(parse(src).is_ok());
    }

    // ── Expression grammar ───────────────────────────────────────────────────

    #[test]
    fn test_precedence_multiplication_binds_tighter() {
        let program = parse_src("1+2*3;");
        let Expr::Binary(add) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a binary expression");
        };
        assert_eq!(add.op, "+");
        assert!(matches!(&add.right, Expr::Binary(m) if m.op == "*"));
    }

    #[test]
    fn test_precedence_logical() {
        let program = parse_src("a||b&&c;");
        let Expr::Binary(or) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a binary expression");
        };
        assert_eq!(or.op, "||");
        assert!(matches!(&or.right, Expr::Binary(and) if and.op == "&&"));
    }

    #[test]
    fn test_binary_left_associative() {
        let program = parse_src("a-b-c;");
        let Expr::Binary(outer) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a binary expression");
        };
        assert!(matches!(&outer.left, Expr::Binary(inner) if inner.op == "-"));
        assert!(matches!(&outer.right, Expr::Ident(u) if u.name == "c"));
    }

    #[test]
    fn test_assignment_right_associative() {
        let program = parse_src("a = b = c;");
        let Expr::Assign(outer) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        assert!(matches!(&outer.value, Expr::Assign(_)));
    }

    #[test]
    fn test_compound_assignment_drops_trailing_equal() {
        let program = parse_src("x >>>= 1;");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        assert_eq!(a.op.as_deref(), Some(">>>"));

        let program = parse_src("x = 1;");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        assert!(a.op.is_none());
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(matches!(parse_err("1 = 2;"), RotorError::Syntax(_)));
        assert!(matches!(parse_err("f() = 2;"), RotorError::Syntax(_)));
        assert!(parse("a.b = 2;").is_ok());
    }

    #[test]
    fn test_conditional_expression() {
        let program = parse_src("a ? b : c;");
        assert!(matches!(
            stmt_expr(only_stmt(&program)),
            Expr::Conditional(_)
        ));
    }

    #[test]
    fn test_sequence_expression() {
        let program = parse_src("a, b, c;");
        let Expr::Sequence(s) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a sequence");
        };
        assert_eq!(s.expressions.len(), 3);
    }

    #[test]
    fn test_prefix_operators() {
        let cases = [
            ("-x;", "prefix-"),
            ("+x;", "prefix+"),
            ("++x;", "prefix++"),
            ("--x;", "prefix--"),
            ("typeof x;", "typeof"),
            ("void x;", "void"),
            ("delete x.y;", "delete"),
            ("!x;", "!"),
            ("~x;", "~"),
        ];
        for (src, expected) in cases {
            let program = parse_src(src);
            let Expr::Prefix(p) = stmt_expr(only_stmt(&program)) else {
                panic!("expected a prefix expression for {src}");
            };
            assert_eq!(p.op, expected, "for {src}");
        }
    }

    #[test]
    fn test_postfix_operator() {
        let program = parse_src("x--;");
        let Expr::Postfix(p) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a postfix expression");
        };
        assert_eq!(p.op, "--");
    }

    // ── new / call / access ──────────────────────────────────────────────────

    #[test]
    fn test_dot_access_is_normalized_to_string_selector() {
        let program = parse_src("a.b[c]();");
        let Expr::Call(call) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a call");
        };
        assert!(call.arguments.is_empty());
        let Expr::Member(outer) = &call.callee else {
            panic!("expected a member access");
        };
        assert!(matches!(&outer.property, Expr::Ident(u) if u.name == "c"));
        let Expr::Member(inner) = &outer.object else {
            panic!("expected a member access");
        };
        assert!(matches!(&inner.object, Expr::Ident(u) if u.name == "a"));
        assert!(matches!(&inner.property, Expr::Str(s) if s.raw == "\"b\""));
    }

    #[test]
    fn test_new_with_member_target_and_trailing_access() {
        let program = parse_src("new a.b(c).d;");
        let Expr::Member(outer) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a member access");
        };
        assert!(matches!(&outer.property, Expr::Str(s) if s.raw == "\"d\""));
        let Expr::New(new) = &outer.object else {
            panic!("expected a new expression");
        };
        assert_eq!(new.arguments.len(), 1);
        assert!(matches!(&new.callee, Expr::Member(_)));
    }

    #[test]
    fn test_new_without_arguments() {
        let program = parse_src("new F;");
        let Expr::New(new) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a new expression");
        };
        assert!(new.arguments.is_empty());
    }

    #[test]
    fn test_nested_new() {
        let program = parse_src("new new F()();");
        let Expr::New(outer) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a new expression");
        };
        assert!(matches!(&outer.callee, Expr::New(_)));
    }

    // ── Functions ────────────────────────────────────────────────────────────

    #[test]
    fn test_function_declaration() {
        let program = parse_src("function f(x, y) { return x; }");
        let Stmt::FnDecl(f) = only_stmt(&program) else {
            panic!("expected a function declaration");
        };
        assert_eq!(f.name.name, "f");
        let names: Vec<_> = f.function.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_function_declaration_requires_name() {
        assert!(matches!(parse_err("function(){};"), RotorError::Syntax(_)));
    }

    #[test]
    fn test_function_expressions() {
        let program = parse_src("var f = function(){};");
        let Expr::VarDecls(list) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a declaration list");
        };
        assert!(matches!(
            list.declarations[0].init.as_ref().unwrap(),
            Expr::Fn(_)
        ));

        let program = parse_src("var g = function h(){};");
        let Expr::VarDecls(list) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a declaration list");
        };
        assert!(matches!(
            list.declarations[0].init.as_ref().unwrap(),
            Expr::NamedFn(n) if n.name.name == "h"
        ));
    }

    // ── Array initializers ───────────────────────────────────────────────────

    #[test]
    fn test_array_initializer_elisions() {
        let program = parse_src("x = [,];");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        let Expr::Array(arr) = &a.value else {
            panic!("expected an array initializer");
        };
        assert_eq!(arr.length, 2);
        assert!(arr.elements.is_empty());
    }

    #[test]
    fn test_array_initializer_trailing_comma() {
        let program = parse_src("x = [a,];");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        let Expr::Array(arr) = &a.value else {
            panic!("expected an array initializer");
        };
        assert_eq!(arr.length, 1);
        assert_eq!(arr.elements.len(), 1);
        assert_eq!(arr.elements[0].index, 0);
    }

    #[test]
    fn test_array_initializer_interior_elision() {
        let program = parse_src("x = [a,,b];");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        let Expr::Array(arr) = &a.value else {
            panic!("expected an array initializer");
        };
        assert_eq!(arr.length, 3);
        let indices: Vec<_> = arr.elements.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_array_initializer_empty() {
        let program = parse_src("x = [];");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        assert!(matches!(&a.value, Expr::Array(arr) if arr.length == 0));
    }

    // ── Object initializers ──────────────────────────────────────────────────

    #[test]
    fn test_object_initializer_key_forms() {
        let program = parse_src("x = {a: 1, \"b\": 2, 3: c};");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        let Expr::Object(obj) = &a.value else {
            panic!("expected an object initializer");
        };
        assert_eq!(obj.properties.len(), 3);
        // Identifier keys are promoted to quoted strings.
        assert!(matches!(&obj.properties[0].key, Expr::Str(s) if s.raw == "\"a\""));
        assert!(matches!(&obj.properties[1].key, Expr::Str(s) if s.raw == "\"b\""));
        assert!(matches!(&obj.properties[2].key, Expr::Num(n) if n.raw == "3"));
    }

    // ── Regular expressions ──────────────────────────────────────────────────

    #[test]
    fn test_regexp_in_primary_position() {
        let program = parse_src("var r = /ab[/]c/gi;");
        let Expr::VarDecls(list) = stmt_expr(only_stmt(&program)) else {
            panic!("expected a declaration list");
        };
        assert!(matches!(
            list.declarations[0].init.as_ref().unwrap(),
            Expr::Regexp(r) if r.raw == "/ab[/]c/gi"
        ));
    }

    #[test]
    fn test_slash_after_value_is_division() {
        let program = parse_src("x = /a/ / b;");
        let Expr::Assign(a) = stmt_expr(only_stmt(&program)) else {
            panic!("expected an assignment");
        };
        let Expr::Binary(div) = &a.value else {
            panic!("expected a division");
        };
        assert_eq!(div.op, "/");
        assert!(matches!(&div.left, Expr::Regexp(_)));
    }

    // ── Labels and errors ────────────────────────────────────────────────────

    #[test]
    fn test_labeled_statement() {
        let program = parse_src("foo: x;");
        let Stmt::Labeled(l) = only_stmt(&program) else {
            panic!("expected a labeled statement");
        };
        assert_eq!(l.label, "foo");
        assert!(matches!(stmt_expr(&l.body), Expr::Ident(u) if u.name == "x"));
    }

    #[test]
    fn test_parenthesized_expression_unwraps() {
        let program = parse_src("(a);");
        assert!(matches!(stmt_expr(only_stmt(&program)), Expr::Ident(_)));
    }

    #[test]
    fn test_unexpected_token_message_carries_token() {
        let err = parse_err("if(;");
        let msg = err.to_string();
        assert!(msg.contains("unexpected token"), "{msg}");
        assert!(msg.contains("SEMICOLON"), "{msg}");
    }
}
