//! Pretty-printer for parsed programs.
//!
//! The printer walks the AST and appends parenthesized source text to an
//! output buffer, preceded by a `/* Program */` header line.  Compound
//! expressions (calls, operators, assignments, accesses, …) are fully
//! parenthesized so the output re-parses to a structurally equal tree.
//!
//! [`Printer::with_resolution`] builds the resolver-annotating variant: it
//! prints identically but follows every variable reference with `<k>`, where
//! `k` numbers the resolved [`Var`](crate::parser::resolver::Var)s in order
//! of first appearance.  Operator descriptors are never tagged.

use std::collections::HashMap;

use crate::parser::ast::*;
use crate::parser::resolver::{Resolution, VarId};

/// AST pretty-printer; see the module overview.
pub struct Printer<'a> {
    out: String,
    indent: usize,
    resolution: Option<&'a Resolution>,
    /// Printer-local tag index per variable, assigned on first appearance.
    tags: HashMap<VarId, u32>,
}

impl<'a> Printer<'a> {
    /// A plain printer with no resolution tags.
    pub fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
            resolution: None,
            tags: HashMap::new(),
        }
    }

    /// A printer that annotates variable references with their resolved
    /// variable's tag.
    pub fn with_resolution(resolution: &'a Resolution) -> Self {
        Self {
            resolution: Some(resolution),
            ..Self::new()
        }
    }

    /// Render `program` and return the output text.
    pub fn print(mut self, program: &Program) -> String {
        self.out.push_str("/* Program */\n");
        for stmt in &program.body {
            self.print_stmt(stmt);
        }
        self.out
    }

    // ── Layout helpers ──────────────────────────────────────────────────────

    fn newline(&mut self) {
        self.out.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    /// Append a variable reference, tagging it when a resolution is present.
    fn print_var_ref(&mut self, name: &str, node: NodeId) {
        self.out.push_str(name);
        let Some(resolution) = self.resolution else {
            return;
        };
        let Some(&var_id) = resolution.assignments.get(&node) else {
            return;
        };
        if resolution.var(var_id).is_operator {
            return;
        }
        let next = self.tags.len() as u32;
        let tag = *self.tags.entry(var_id).or_insert(next);
        self.out.push_str(&format!("<{tag}>"));
    }

    // ── Statements ──────────────────────────────────────────────────────────

    /// Print a statement on its own line(s) at the current indent.
    fn print_stmt(&mut self, stmt: &Stmt) {
        self.write_indent();
        self.print_stmt_inner(stmt);
        self.newline();
    }

    /// Print the body attached to a statement head (`if (…)`, `while (…)`,
    /// …): blocks (and brace-forced bodies) open on the same line, other
    /// statements go on the next line, indented one level.  Ends without a
    /// trailing newline.
    fn print_body(&mut self, stmt: &Stmt, force_braces: bool) {
        if force_braces || matches!(stmt, Stmt::Block(_)) {
            self.out.push_str(" {");
            self.newline();
            self.indent += 1;
            match stmt {
                Stmt::Block(block) => {
                    for inner in &block.body {
                        self.print_stmt(inner);
                    }
                }
                other => self.print_stmt(other),
            }
            self.indent -= 1;
            self.write_indent();
            self.out.push('}');
        } else {
            self.newline();
            self.indent += 1;
            self.write_indent();
            self.print_stmt_inner(stmt);
            self.indent -= 1;
        }
    }

    /// Print `{ … }` attached to the current line (function bodies, `try`
    /// blocks, …).  Ends without a trailing newline.
    fn print_block(&mut self, block: &BlockStmt) {
        self.out.push_str(" {");
        self.newline();
        self.indent += 1;
        for stmt in &block.body {
            self.print_stmt(stmt);
        }
        self.indent -= 1;
        self.write_indent();
        self.out.push('}');
    }

    fn print_stmt_inner(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                self.out.push('{');
                self.newline();
                self.indent += 1;
                for inner in &block.body {
                    self.print_stmt(inner);
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push('}');
            }
            Stmt::Expr(s) => {
                self.print_expr(&s.expr);
                self.out.push(';');
            }
            Stmt::Empty(_) => self.out.push(';'),
            Stmt::If(s) => {
                self.out.push_str("if (");
                self.print_expr(&s.test);
                self.out.push(')');
                // Brace an if-consequent that is itself an if, so the else
                // below cannot re-attach to it on re-parse.
                let force = s.has_alternate() && matches!(s.consequent, Stmt::If(_));
                self.print_body(&s.consequent, force);
                if s.has_alternate() {
                    self.newline();
                    self.write_indent();
                    self.out.push_str("else");
                    self.print_body(&s.alternate, false);
                }
            }
            Stmt::For(s) => {
                self.out.push_str("for (");
                if let Some(init) = &s.init {
                    self.print_expr(init);
                }
                self.out.push_str("; ");
                self.print_expr(&s.test);
                self.out.push(';');
                if let Some(update) = &s.update {
                    self.out.push(' ');
                    self.print_expr(update);
                }
                self.out.push(')');
                self.print_body(&s.body, false);
            }
            Stmt::ForIn(s) => {
                self.out.push_str("for (");
                self.print_expr(&s.left);
                self.out.push_str(" in ");
                self.print_expr(&s.right);
                self.out.push(')');
                self.print_body(&s.body, false);
            }
            Stmt::While(s) => {
                self.out.push_str("while (");
                self.print_expr(&s.test);
                self.out.push(')');
                self.print_body(&s.body, false);
            }
            Stmt::DoWhile(s) => {
                self.out.push_str("do");
                self.print_body(&s.body, false);
                self.newline();
                self.write_indent();
                self.out.push_str("while (");
                self.print_expr(&s.test);
                self.out.push_str(");");
            }
            Stmt::Continue(s) => {
                self.out.push_str("continue");
                if let Some(label) = &s.label {
                    self.out.push(' ');
                    self.out.push_str(label);
                }
                self.out.push(';');
            }
            Stmt::Break(s) => {
                self.out.push_str("break");
                if let Some(label) = &s.label {
                    self.out.push(' ');
                    self.out.push_str(label);
                }
                self.out.push(';');
            }
            Stmt::Return(s) => {
                self.out.push_str("return ");
                self.print_expr(&s.argument);
                self.out.push(';');
            }
            Stmt::Throw(s) => {
                self.out.push_str("throw ");
                self.print_expr(&s.argument);
                self.out.push(';');
            }
            Stmt::Try(s) => {
                self.out.push_str("try");
                self.print_block(&s.block);
                if let Some(handler) = &s.handler {
                    self.out.push_str(" catch (");
                    self.print_var_ref(&handler.param.name, handler.param.id);
                    self.out.push(')');
                    self.print_block(&handler.body);
                }
                if let Some(finalizer) = &s.finalizer {
                    self.out.push_str(" finally");
                    self.print_block(finalizer);
                }
            }
            Stmt::With(s) => {
                self.out.push_str("with (");
                self.print_expr(&s.object);
                self.out.push(')');
                self.print_body(&s.body, false);
            }
            Stmt::Switch(s) => {
                self.out.push_str("switch (");
                self.print_expr(&s.discriminant);
                self.out.push_str(") {");
                self.newline();
                self.indent += 1;
                for case in &s.cases {
                    self.write_indent();
                    match &case.test {
                        Some(test) => {
                            self.out.push_str("case ");
                            self.print_expr(test);
                            self.out.push(':');
                        }
                        None => self.out.push_str("default:"),
                    }
                    self.newline();
                    self.indent += 1;
                    for inner in &case.body.body {
                        self.print_stmt(inner);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.write_indent();
                self.out.push('}');
            }
            Stmt::FnDecl(s) => {
                self.out.push_str("function ");
                self.print_var_ref(&s.name.name, s.name.id);
                self.out.push('(');
                self.print_params(&s.function.params);
                self.out.push(')');
                self.print_block(&s.function.body);
            }
            Stmt::Labeled(s) => {
                self.out.push_str(&s.label);
                self.out.push_str(": ");
                self.print_stmt_inner(&s.body);
            }
        }
    }

    fn print_params(&mut self, params: &[Param]) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_var_ref(&param.name, param.id);
        }
    }

    // ── Expressions ─────────────────────────────────────────────────────────

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Sequence(e) => {
                self.out.push('(');
                for (i, inner) in e.expressions.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_expr(inner);
                }
                self.out.push(')');
            }
            Expr::VarDecls(list) => {
                self.out.push_str("var ");
                for (i, init) in list.declarations.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_var_ref(&init.decl.name, init.decl.id);
                    if let Some(value) = &init.init {
                        self.out.push_str(" = ");
                        self.print_expr(value);
                    }
                }
            }
            Expr::Assign(e) => {
                self.out.push('(');
                self.print_expr(&e.target);
                self.out.push(' ');
                if let Some(op) = &e.op {
                    self.out.push_str(op);
                }
                self.out.push_str("= ");
                self.print_expr(&e.value);
                self.out.push(')');
            }
            Expr::Conditional(e) => {
                self.out.push('(');
                self.print_expr(&e.test);
                self.out.push_str(" ? ");
                self.print_expr(&e.consequent);
                self.out.push_str(" : ");
                self.print_expr(&e.alternate);
                self.out.push(')');
            }
            Expr::New(e) => {
                self.out.push_str("(new ");
                self.print_expr(&e.callee);
                self.out.push('(');
                self.print_arguments(&e.arguments);
                self.out.push_str("))");
            }
            Expr::Call(e) => {
                self.out.push('(');
                self.print_expr(&e.callee);
                self.out.push('(');
                self.print_arguments(&e.arguments);
                self.out.push_str("))");
            }
            Expr::Binary(e) => {
                self.out.push('(');
                self.print_expr(&e.left);
                self.out.push(' ');
                self.out.push_str(&e.op);
                self.out.push(' ');
                self.print_expr(&e.right);
                self.out.push(')');
            }
            Expr::Prefix(e) => {
                self.out.push('(');
                let op = e.op.strip_prefix("prefix").unwrap_or(&e.op);
                self.out.push_str(op);
                if op.chars().all(|c| c.is_ascii_alphabetic()) {
                    self.out.push(' ');
                }
                self.print_expr(&e.argument);
                self.out.push(')');
            }
            Expr::Postfix(e) => {
                self.out.push('(');
                self.print_expr(&e.argument);
                self.out.push_str(&e.op);
                self.out.push(')');
            }
            Expr::Ident(u) => self.print_var_ref(&u.name, u.id),
            Expr::This(_) => self.out.push_str("this"),
            Expr::Member(e) => {
                self.out.push('(');
                self.print_expr(&e.object);
                self.out.push('[');
                self.print_expr(&e.property);
                self.out.push_str("])");
            }
            Expr::NamedFn(e) => {
                self.out.push_str("(function ");
                self.print_var_ref(&e.name.name, e.name.id);
                self.out.push('(');
                self.print_params(&e.function.params);
                self.out.push(')');
                self.print_block(&e.function.body);
                self.out.push(')');
            }
            Expr::Fn(e) => {
                self.out.push_str("(function(");
                self.print_params(&e.params);
                self.out.push(')');
                self.print_block(&e.body);
                self.out.push(')');
            }
            Expr::Bool(e) => self.out.push_str(if e.value { "true" } else { "false" }),
            Expr::Num(e) => self.out.push_str(&e.raw),
            Expr::Str(e) => self.out.push_str(&e.raw),
            Expr::Null(_) => self.out.push_str("null"),
            Expr::Undefined(_) => self.out.push_str("(void 0)"),
            Expr::Array(e) => {
                self.out.push('[');
                let mut elements = e.elements.iter().peekable();
                for slot in 0..e.length {
                    if slot > 0 {
                        self.out.push_str(", ");
                    }
                    if let Some(element) = elements.next_if(|el| el.index == slot) {
                        self.print_expr(&element.value);
                    }
                }
                self.out.push(']');
            }
            Expr::Object(e) => {
                self.out.push_str("({");
                for (i, property) in e.properties.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_expr(&property.key);
                    self.out.push_str(": ");
                    self.print_expr(&property.value);
                }
                self.out.push_str("})");
            }
            Expr::Regexp(e) => self.out.push_str(&e.raw),
        }
    }

    fn print_arguments(&mut self, arguments: &[Expr]) {
        for (i, argument) in arguments.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_expr(argument);
        }
    }
}

impl Default for Printer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
