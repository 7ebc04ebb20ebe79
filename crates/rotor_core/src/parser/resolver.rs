//! Scope analysis and variable resolution for ES5 JavaScript.
//!
//! # Overview
//!
//! Call [`resolve`] to map every variable reference of a parsed
//! [`Program`] to a [`Var`] descriptor.  Resolution is total: it always
//! succeeds, lazily materializing **implicit globals** for names with no
//! lexical declaration and **interceptors** for names reached through a
//! `with` scope or a scope that calls `eval`.
//!
//! Two passes run over the tree:
//!
//! 1. **Collect** — record the names declared in every scope (`Program`,
//!    named-function expressions, functions, `with` bodies, `catch`
//!    clauses), pre-populate `this`/`arguments` and the operator set, and
//!    flag scopes containing a direct `eval(…)` call.
//! 2. **Resolve** — walk the tree with a scope stack and resolve each
//!    reference innermost-first, inserting implicit globals and interceptors
//!    into the collected maps as they are synthesized.
//!
//! `var` declarations inside `with` bodies and `catch` blocks belong to the
//! enclosing function scope; only the `catch` parameter itself lives in the
//! catch scope, and `with` scopes start out empty.

use std::collections::{HashMap, HashSet};

use crate::parser::ast::{
    BlockStmt, CatchClause, Expr, FnExpr, NamedFnExpr, NodeId, Program, Stmt, TryStmt, WithStmt,
};

// ─────────────────────────────────────────────────────────────────────────────
// Var
// ─────────────────────────────────────────────────────────────────────────────

/// Index of a [`Var`] in the [`Resolution`] arena.
pub type VarId = usize;

/// Why an interceptor [`Var`] exists: the scope node that intercepts the
/// name on its way to the real binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptReason {
    /// The name passes through a `with (obj) { … }` scope.
    WithScope(NodeId),
    /// The name passes through a scope that contains a direct `eval(…)`.
    EvalScope(NodeId),
}

/// The indirection recorded on an interceptor [`Var`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interception {
    /// The variable the name would have resolved to one scope further out.
    pub intercepted: VarId,
    /// The intercepting scope.
    pub reason: InterceptReason,
}

/// A variable descriptor.
///
/// Shared by every reference that resolves to the same binding; stored in
/// the [`Resolution`] arena and addressed by [`VarId`].
#[derive(Debug, Clone)]
pub struct Var {
    /// The variable name (an operator symbol for operator vars).
    pub name: String,
    /// Monotonically assigned identity, also the arena index.
    pub unique_id: u32,
    /// Declared at (or synthesized into) program scope.
    pub is_global: bool,
    /// Synthesized for a name with no lexical declaration.
    pub is_implicit: bool,
    /// A formal parameter, `this`, `arguments`, or a `catch` binding.
    pub is_param: bool,
    /// One of the pre-populated operator descriptors.
    pub is_operator: bool,
    /// Present on interceptors synthesized for `with`/`eval` scopes.
    pub interception: Option<Interception>,
}

impl Var {
    /// A descriptor with every flag cleared; `unique_id` is assigned by the
    /// arena on insertion.
    fn plain(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            unique_id: 0,
            is_global: false,
            is_implicit: false,
            is_param: false,
            is_operator: false,
            interception: None,
        }
    }

    /// Returns `true` for interceptor descriptors.
    pub fn is_interceptor(&self) -> bool {
        self.interception.is_some()
    }
}

/// The operator symbols pre-populated into program scope, in `unique_id`
/// order.  References to these (through `Binary` and `Prefix` op strings)
/// resolve like ordinary names.
const OPERATORS: [&str; 30] = [
    "prefix+",
    "prefix-",
    "prefix++",
    "prefix--",
    "delete",
    "void",
    "typeof",
    "||",
    "&&",
    "|",
    "^",
    "&",
    "==",
    "!=",
    "===",
    "!==",
    "<",
    ">",
    "<=",
    ">=",
    "instanceof",
    "in",
    "<<",
    ">>",
    ">>>",
    "+",
    "-",
    "*",
    "/",
    "%",
];

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// The result of a complete resolution pass over a [`Program`].
#[derive(Debug)]
pub struct Resolution {
    /// All variable descriptors, indexed by [`VarId`] (= `unique_id`).
    pub vars: Vec<Var>,
    /// Resolved variable for each reference node.
    pub assignments: HashMap<NodeId, VarId>,
}

impl Resolution {
    /// Returns the descriptor with the given id.
    pub fn var(&self, id: VarId) -> &Var {
        &self.vars[id]
    }

    /// Returns the resolved variable of a reference node, if the node is one.
    pub fn of(&self, node: NodeId) -> Option<&Var> {
        self.assignments.get(&node).map(|&id| &self.vars[id])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public entry point
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve every variable reference of `program`.
///
/// Never fails; see the module overview for how unknown names are handled.
pub fn resolve(program: &Program) -> Resolution {
    let mut resolver = Resolver::new(program.id);
    resolver.collect_program(program);
    resolver.resolve_program(program);
    Resolution {
        vars: resolver.vars,
        assignments: resolver.assignments,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal resolver
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of a scope on the resolution stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    /// The outermost program scope.
    Program,
    /// The scope holding a named function expression's own name.
    NamedFn,
    /// A function scope (`this`, `arguments`, parameters, `var`s).
    Fn,
    /// A `with (obj) { … }` body.
    With,
    /// A `catch (param) { … }` clause.
    Catch,
}

struct Resolver {
    /// The program node, owner of the outermost scope map.
    program_id: NodeId,
    /// The scope whose map receives declarations during collection; always a
    /// function-like scope (`Program`, `Fn`).
    current: NodeId,
    /// Declared-name maps per scope node.
    declared: HashMap<NodeId, HashMap<String, VarId>>,
    /// Scopes containing a direct `eval(…)` call.
    eval_scopes: HashSet<NodeId>,
    /// Variable arena.
    vars: Vec<Var>,
    /// Reference node → resolved variable.
    assignments: HashMap<NodeId, VarId>,
    /// Active scopes, outermost first; used by the resolve pass.
    stack: Vec<(NodeId, ScopeKind)>,
}

impl Resolver {
    fn new(program_id: NodeId) -> Self {
        Self {
            program_id,
            current: program_id,
            declared: HashMap::new(),
            eval_scopes: HashSet::new(),
            vars: Vec::new(),
            assignments: HashMap::new(),
            stack: Vec::new(),
        }
    }

    /// Insert `var` into the arena, assigning its `unique_id`.
    fn push_var(&mut self, mut var: Var) -> VarId {
        let id = self.vars.len();
        var.unique_id = id as u32;
        self.vars.push(var);
        id
    }

    /// Declare `name` in `scope` unless it is already present (the first
    /// declaration wins; duplicate `var`s share one descriptor).
    fn declare(&mut self, scope: NodeId, name: &str, var: Var) {
        let already_declared = self
            .declared
            .get(&scope)
            .expect("scope map created before declarations")
            .contains_key(name);
        if already_declared {
            return;
        }
        let id = self.push_var(var);
        self.declared
            .get_mut(&scope)
            .expect("scope map created before declarations")
            .insert(name.to_owned(), id);
    }

    // ── Collect pass ────────────────────────────────────────────────────────

    fn collect_program(&mut self, program: &Program) {
        let mut map = HashMap::new();
        for op in OPERATORS {
            let id = self.push_var(Var {
                is_global: true,
                is_operator: true,
                ..Var::plain(op)
            });
            map.insert(op.to_owned(), id);
        }
        self.declared.insert(program.id, map);
        for stmt in &program.body {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(b) => self.collect_block(b),
            Stmt::Expr(s) => self.collect_expr(&s.expr),
            Stmt::Empty(_) | Stmt::Continue(_) | Stmt::Break(_) => {}
            Stmt::If(s) => {
                self.collect_expr(&s.test);
                self.collect_stmt(&s.consequent);
                self.collect_stmt(&s.alternate);
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.collect_expr(init);
                }
                self.collect_expr(&s.test);
                if let Some(update) = &s.update {
                    self.collect_expr(update);
                }
                self.collect_stmt(&s.body);
            }
            Stmt::ForIn(s) => {
                self.collect_expr(&s.left);
                self.collect_expr(&s.right);
                self.collect_stmt(&s.body);
            }
            Stmt::While(s) => {
                self.collect_expr(&s.test);
                self.collect_stmt(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.collect_stmt(&s.body);
                self.collect_expr(&s.test);
            }
            Stmt::Return(s) => self.collect_expr(&s.argument),
            Stmt::Throw(s) => self.collect_expr(&s.argument),
            Stmt::Try(s) => self.collect_try(s),
            Stmt::With(s) => self.collect_with(s),
            Stmt::Switch(s) => {
                self.collect_expr(&s.discriminant);
                for case in &s.cases {
                    if let Some(test) = &case.test {
                        self.collect_expr(test);
                    }
                    self.collect_block(&case.body);
                }
            }
            Stmt::FnDecl(s) => {
                let is_global = self.current == self.program_id;
                self.declare(
                    self.current,
                    &s.name.name,
                    Var {
                        is_global,
                        ..Var::plain(&s.name.name)
                    },
                );
                self.collect_function(&s.function);
            }
            Stmt::Labeled(s) => self.collect_stmt(&s.body),
        }
    }

    fn collect_block(&mut self, block: &BlockStmt) {
        for stmt in &block.body {
            self.collect_stmt(stmt);
        }
    }

    /// The catch scope holds only the exception parameter; `var`s in the
    /// catch body flow to the enclosing function scope, so the body is
    /// collected without switching `current`.
    fn collect_try(&mut self, s: &TryStmt) {
        self.collect_block(&s.block);
        if let Some(handler) = &s.handler {
            self.declared.insert(handler.id, HashMap::new());
            self.declare(
                handler.id,
                &handler.param.name,
                Var {
                    is_param: true,
                    ..Var::plain(&handler.param.name)
                },
            );
            self.collect_block(&handler.body);
        }
        if let Some(finalizer) = &s.finalizer {
            self.collect_block(finalizer);
        }
    }

    /// A `with` scope starts with an empty map (interceptors are inserted
    /// during resolution); the body is collected without switching
    /// `current`.
    fn collect_with(&mut self, s: &WithStmt) {
        self.collect_expr(&s.object);
        self.declared.insert(s.id, HashMap::new());
        self.collect_stmt(&s.body);
    }

    fn collect_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Sequence(e) => {
                for expr in &e.expressions {
                    self.collect_expr(expr);
                }
            }
            Expr::VarDecls(list) => {
                for init in &list.declarations {
                    let is_global = self.current == self.program_id;
                    self.declare(
                        self.current,
                        &init.decl.name,
                        Var {
                            is_global,
                            ..Var::plain(&init.decl.name)
                        },
                    );
                    if let Some(value) = &init.init {
                        self.collect_expr(value);
                    }
                }
            }
            Expr::Assign(e) => {
                self.collect_expr(&e.target);
                self.collect_expr(&e.value);
            }
            Expr::Conditional(e) => {
                self.collect_expr(&e.test);
                self.collect_expr(&e.consequent);
                self.collect_expr(&e.alternate);
            }
            Expr::New(e) => {
                self.collect_expr(&e.callee);
                for arg in &e.arguments {
                    self.collect_expr(arg);
                }
            }
            Expr::Call(e) => {
                // A direct `eval(…)` call contaminates the current scope.
                if let Expr::Ident(callee) = &e.callee
                    && callee.name == "eval"
                {
                    self.eval_scopes.insert(self.current);
                }
                self.collect_expr(&e.callee);
                for arg in &e.arguments {
                    self.collect_expr(arg);
                }
            }
            Expr::Binary(e) => {
                self.collect_expr(&e.left);
                self.collect_expr(&e.right);
            }
            Expr::Prefix(e) => self.collect_expr(&e.argument),
            Expr::Postfix(e) => self.collect_expr(&e.argument),
            Expr::Member(e) => {
                self.collect_expr(&e.object);
                self.collect_expr(&e.property);
            }
            Expr::NamedFn(e) => self.collect_named_fn(e),
            Expr::Fn(e) => self.collect_function(e),
            Expr::Array(e) => {
                for element in &e.elements {
                    self.collect_expr(&element.value);
                }
            }
            Expr::Object(e) => {
                for property in &e.properties {
                    self.collect_expr(&property.value);
                }
            }
            Expr::Ident(_)
            | Expr::This(_)
            | Expr::Bool(_)
            | Expr::Num(_)
            | Expr::Str(_)
            | Expr::Null(_)
            | Expr::Undefined(_)
            | Expr::Regexp(_) => {}
        }
    }

    /// A named function expression introduces a scope holding just the
    /// function's own name (visible only inside the expression) and `this`.
    fn collect_named_fn(&mut self, e: &NamedFnExpr) {
        self.declared.insert(e.id, HashMap::new());
        self.declare(e.id, &e.name.name, Var::plain(&e.name.name));
        self.declare(
            e.id,
            "this",
            Var {
                is_param: true,
                ..Var::plain("this")
            },
        );
        self.collect_function(&e.function);
    }

    /// A function scope pre-populates `this` and `arguments`, then its
    /// parameters, and receives the `var`s of its body.
    fn collect_function(&mut self, f: &FnExpr) {
        self.declared.insert(f.id, HashMap::new());
        self.declare(
            f.id,
            "this",
            Var {
                is_param: true,
                ..Var::plain("this")
            },
        );
        self.declare(
            f.id,
            "arguments",
            Var {
                is_param: true,
                ..Var::plain("arguments")
            },
        );
        for param in &f.params {
            self.declare(
                f.id,
                &param.name,
                Var {
                    is_param: true,
                    ..Var::plain(&param.name)
                },
            );
        }
        let saved = self.current;
        self.current = f.id;
        self.collect_block(&f.body);
        self.current = saved;
    }

    // ── Resolve pass ────────────────────────────────────────────────────────

    fn resolve_program(&mut self, program: &Program) {
        self.stack.push((program.id, ScopeKind::Program));
        for stmt in &program.body {
            self.resolve_stmt(stmt);
        }
        self.stack.pop();
    }

    fn record(&mut self, node: NodeId, var: VarId) {
        self.assignments.insert(node, var);
    }

    /// Resolve `name` against the scope stack, innermost first.
    fn lookup(&mut self, name: &str) -> VarId {
        self.lookup_at(self.stack.len() - 1, name)
    }

    fn lookup_at(&mut self, depth: usize, name: &str) -> VarId {
        let (scope, kind) = self.stack[depth];
        if let Some(&var) = self.declared.get(&scope).and_then(|m| m.get(name)) {
            return var;
        }
        if depth == 0 {
            // Program scope: materialize an implicit global.
            let var = self.push_var(Var {
                is_global: true,
                is_implicit: true,
                ..Var::plain(name)
            });
            self.declared
                .get_mut(&scope)
                .expect("program scope map exists")
                .insert(name.to_owned(), var);
            return var;
        }
        if kind == ScopeKind::With || self.eval_scopes.contains(&scope) {
            // The name escapes through a dynamic scope: resolve it outside,
            // then pin an interceptor here so every later reference through
            // this scope shares it.
            let intercepted = self.lookup_at(depth - 1, name);
            let reason = if kind == ScopeKind::With {
                InterceptReason::WithScope(scope)
            } else {
                InterceptReason::EvalScope(scope)
            };
            let var = self.push_var(Var {
                interception: Some(Interception {
                    intercepted,
                    reason,
                }),
                ..Var::plain(name)
            });
            self.declared
                .get_mut(&scope)
                .expect("collected scope map exists")
                .insert(name.to_owned(), var);
            return var;
        }
        self.lookup_at(depth - 1, name)
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(b) => self.resolve_block(b),
            Stmt::Expr(s) => self.resolve_expr(&s.expr),
            Stmt::Empty(_) | Stmt::Continue(_) | Stmt::Break(_) => {}
            Stmt::If(s) => {
                self.resolve_expr(&s.test);
                self.resolve_stmt(&s.consequent);
                self.resolve_stmt(&s.alternate);
            }
            Stmt::For(s) => {
                if let Some(init) = &s.init {
                    self.resolve_expr(init);
                }
                self.resolve_expr(&s.test);
                if let Some(update) = &s.update {
                    self.resolve_expr(update);
                }
                self.resolve_stmt(&s.body);
            }
            Stmt::ForIn(s) => {
                self.resolve_expr(&s.left);
                self.resolve_expr(&s.right);
                self.resolve_stmt(&s.body);
            }
            Stmt::While(s) => {
                self.resolve_expr(&s.test);
                self.resolve_stmt(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.resolve_stmt(&s.body);
                self.resolve_expr(&s.test);
            }
            Stmt::Return(s) => self.resolve_expr(&s.argument),
            Stmt::Throw(s) => self.resolve_expr(&s.argument),
            Stmt::Try(s) => {
                self.resolve_block(&s.block);
                if let Some(handler) = &s.handler {
                    self.resolve_catch(handler);
                }
                if let Some(finalizer) = &s.finalizer {
                    self.resolve_block(finalizer);
                }
            }
            Stmt::With(s) => {
                // The scope object is evaluated outside the with scope.
                self.resolve_expr(&s.object);
                self.stack.push((s.id, ScopeKind::With));
                self.resolve_stmt(&s.body);
                self.stack.pop();
            }
            Stmt::Switch(s) => {
                self.resolve_expr(&s.discriminant);
                for case in &s.cases {
                    if let Some(test) = &case.test {
                        self.resolve_expr(test);
                    }
                    self.resolve_block(&case.body);
                }
            }
            Stmt::FnDecl(s) => {
                let var = self.lookup(&s.name.name);
                self.record(s.name.id, var);
                self.resolve_function(&s.function);
            }
            Stmt::Labeled(s) => self.resolve_stmt(&s.body),
        }
    }

    fn resolve_block(&mut self, block: &BlockStmt) {
        for stmt in &block.body {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_catch(&mut self, handler: &CatchClause) {
        self.stack.push((handler.id, ScopeKind::Catch));
        let var = self.lookup(&handler.param.name);
        self.record(handler.param.id, var);
        self.resolve_block(&handler.body);
        self.stack.pop();
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(u) => {
                let var = self.lookup(&u.name);
                self.record(u.id, var);
            }
            Expr::This(t) => {
                let var = self.lookup("this");
                self.record(t.id, var);
            }
            Expr::Sequence(e) => {
                for expr in &e.expressions {
                    self.resolve_expr(expr);
                }
            }
            Expr::VarDecls(list) => {
                for init in &list.declarations {
                    let var = self.lookup(&init.decl.name);
                    self.record(init.decl.id, var);
                    if let Some(value) = &init.init {
                        self.resolve_expr(value);
                    }
                }
            }
            Expr::Assign(e) => {
                self.resolve_expr(&e.target);
                self.resolve_expr(&e.value);
            }
            Expr::Conditional(e) => {
                self.resolve_expr(&e.test);
                self.resolve_expr(&e.consequent);
                self.resolve_expr(&e.alternate);
            }
            Expr::New(e) => {
                self.resolve_expr(&e.callee);
                for arg in &e.arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Call(e) => {
                self.resolve_expr(&e.callee);
                for arg in &e.arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Binary(e) => {
                // Operator references resolve like names.
                let var = self.lookup(&e.op);
                self.record(e.id, var);
                self.resolve_expr(&e.left);
                self.resolve_expr(&e.right);
            }
            Expr::Prefix(e) => {
                let var = self.lookup(&e.op);
                self.record(e.id, var);
                self.resolve_expr(&e.argument);
            }
            Expr::Postfix(e) => self.resolve_expr(&e.argument),
            Expr::Member(e) => {
                self.resolve_expr(&e.object);
                self.resolve_expr(&e.property);
            }
            Expr::NamedFn(e) => {
                self.stack.push((e.id, ScopeKind::NamedFn));
                let var = self.lookup(&e.name.name);
                self.record(e.name.id, var);
                self.resolve_function(&e.function);
                self.stack.pop();
            }
            Expr::Fn(e) => self.resolve_function(e),
            Expr::Array(e) => {
                for element in &e.elements {
                    self.resolve_expr(&element.value);
                }
            }
            Expr::Object(e) => {
                for property in &e.properties {
                    self.resolve_expr(&property.value);
                }
            }
            Expr::Bool(_)
            | Expr::Num(_)
            | Expr::Str(_)
            | Expr::Null(_)
            | Expr::Undefined(_)
            | Expr::Regexp(_) => {}
        }
    }

    fn resolve_function(&mut self, f: &FnExpr) {
        self.stack.push((f.id, ScopeKind::Fn));
        for param in &f.params {
            let var = self.lookup(&param.name);
            self.record(param.id, var);
        }
        self.resolve_block(&f.body);
        self.stack.pop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parser::parse;

    fn resolve_src(src: &str) -> (Program, Resolution) {
        let program = parse(src).unwrap();
        let resolution = resolve(&program);
        (program, resolution)
    }

    fn stmt_expr(stmt: &Stmt) -> &Expr {
        match stmt {
            Stmt::Expr(e) => &e.expr,
            other => panic!("expected an expression statement, got {other:?}"),
        }
    }

    /// All (node, var) pairs whose var has the given name.
    fn vars_named<'a>(resolution: &'a Resolution, name: &str) -> Vec<&'a Var> {
        resolution
            .vars
            .iter()
            .filter(|v| v.name == name && !v.is_operator)
            .collect()
    }

    // ── Implicit globals ─────────────────────────────────────────────────────

    #[test]
    fn test_implicit_globals_are_distinct_per_name() {
        let (program, resolution) = resolve_src("if(a)b;else c;");
        let Stmt::If(s) = &program.body[0] else {
            panic!("expected an if statement");
        };
        let a = resolution.of(s.test.id()).unwrap();
        let b = resolution.of(stmt_expr(&s.consequent).id()).unwrap();
        let c = resolution.of(stmt_expr(&s.alternate).id()).unwrap();
        for var in [a, b, c] {
            assert!(var.is_global && var.is_implicit);
        }
        assert_ne!(a.unique_id, b.unique_id);
        assert_ne!(b.unique_id, c.unique_id);
    }

    #[test]
    fn test_implicit_global_created_once_per_name() {
        let (program, resolution) = resolve_src("x; x; x;");
        let ids: Vec<u32> = program
            .body
            .iter()
            .map(|s| resolution.of(stmt_expr(s).id()).unwrap().unique_id)
            .collect();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[1], ids[2]);
        assert_eq!(vars_named(&resolution, "x").len(), 1);
    }

    // ── Declarations ─────────────────────────────────────────────────────────

    #[test]
    fn test_program_var_is_global_not_implicit() {
        let (program, resolution) = resolve_src("var x = 1;");
        let Expr::VarDecls(list) = stmt_expr(&program.body[0]) else {
            panic!("expected a declaration list");
        };
        let var = resolution.of(list.declarations[0].decl.id).unwrap();
        assert!(var.is_global);
        assert!(!var.is_implicit);
        assert!(!var.is_param);
    }

    #[test]
    fn test_duplicate_var_declarations_share_descriptor() {
        let (program, resolution) = resolve_src("var x; var x;");
        let ids: Vec<u32> = program
            .body
            .iter()
            .map(|s| {
                let Expr::VarDecls(list) = stmt_expr(s) else {
                    panic!("expected a declaration list");
                };
                resolution.of(list.declarations[0].decl.id).unwrap().unique_id
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_function_declaration_and_parameters() {
        let (program, resolution) = resolve_src("function f(x){return x+1;}");
        let Stmt::FnDecl(f) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        let f_var = resolution.of(f.name.id).unwrap();
        assert!(f_var.is_global);
        assert!(!f_var.is_implicit);

        let x_param = resolution.of(f.function.params[0].id).unwrap();
        assert!(x_param.is_param);

        // `return x+1;` — the use of x resolves to the parameter, and the
        // `+` resolves to the program-scope operator descriptor.
        let Stmt::Return(ret) = &f.function.body.body[0] else {
            panic!("expected a return statement");
        };
        let Expr::Binary(add) = &ret.argument else {
            panic!("expected a binary expression");
        };
        let x_use = resolution.of(add.left.id()).unwrap();
        assert_eq!(x_use.unique_id, x_param.unique_id);
        let plus = resolution.of(add.id).unwrap();
        assert!(plus.is_operator && plus.is_global);
        assert_eq!(plus.name, "+");
    }

    // ── with interception ────────────────────────────────────────────────────

    #[test]
    fn test_with_synthesizes_shared_interceptor() {
        let (program, resolution) = resolve_src("with(o){x=1;x=2;}");
        let Stmt::With(w) = &program.body[0] else {
            panic!("expected a with statement");
        };
        let Stmt::Block(b) = &w.body else {
            panic!("expected a block body");
        };
        let targets: Vec<&Var> = b
            .body
            .iter()
            .map(|s| {
                let Expr::Assign(a) = stmt_expr(s) else {
                    panic!("expected an assignment");
                };
                resolution.of(a.target.id()).unwrap()
            })
            .collect();

        let first = targets[0];
        assert!(first.is_interceptor());
        let interception = first.interception.unwrap();
        assert_eq!(interception.reason, InterceptReason::WithScope(w.id));
        let intercepted = resolution.var(interception.intercepted);
        assert!(intercepted.is_global && intercepted.is_implicit);
        assert_eq!(intercepted.name, "x");

        // Both uses share the same interceptor.
        assert_eq!(targets[0].unique_id, targets[1].unique_id);
    }

    #[test]
    fn test_with_object_resolved_outside_scope() {
        let (program, resolution) = resolve_src("with(o){}");
        let Stmt::With(w) = &program.body[0] else {
            panic!("expected a with statement");
        };
        let o = resolution.of(w.object.id()).unwrap();
        assert!(o.is_global && o.is_implicit && !o.is_interceptor());
    }

    // ── eval interception ────────────────────────────────────────────────────

    #[test]
    fn test_eval_scope_intercepts_references() {
        let (program, resolution) = resolve_src("function g(){eval(\"\");y;}");
        let Stmt::FnDecl(g) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        let fn_id = g.function.id;
        let y_stmt = &g.function.body.body[1];
        let y = resolution.of(stmt_expr(y_stmt).id()).unwrap();
        assert!(y.is_interceptor());
        let interception = y.interception.unwrap();
        assert_eq!(interception.reason, InterceptReason::EvalScope(fn_id));
        let intercepted = resolution.var(interception.intercepted);
        assert!(intercepted.is_global && intercepted.is_implicit);
        assert_eq!(intercepted.name, "y");
    }

    #[test]
    fn test_program_level_eval_yields_plain_implicit_globals() {
        let (program, resolution) = resolve_src("eval(\"\");q;");
        let q = resolution.of(stmt_expr(&program.body[1]).id()).unwrap();
        assert!(q.is_global && q.is_implicit);
        assert!(!q.is_interceptor());
    }

    // ── catch scoping ────────────────────────────────────────────────────────

    #[test]
    fn test_catch_param_shadows_but_vars_escape() {
        let (program, resolution) = resolve_src("function h(){try{}catch(e){var z;e;}}");
        let Stmt::FnDecl(h) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        let Stmt::Try(t) = &h.function.body.body[0] else {
            panic!("expected a try statement");
        };
        let handler = t.handler.as_ref().unwrap();

        // The catch parameter resolves to the parameter-flagged catch var.
        let e_use = resolution.of(stmt_expr(&handler.body.body[1]).id()).unwrap();
        let e_decl = resolution.of(handler.param.id).unwrap();
        assert!(e_decl.is_param);
        assert_eq!(e_use.unique_id, e_decl.unique_id);

        // `var z` inside the catch body belongs to the enclosing function:
        // not a parameter, not global, not an interceptor.
        let Expr::VarDecls(list) = stmt_expr(&handler.body.body[0]) else {
            panic!("expected a declaration list");
        };
        let z = resolution.of(list.declarations[0].decl.id).unwrap();
        assert!(!z.is_param && !z.is_global && !z.is_interceptor());
    }

    // ── named function expressions ───────────────────────────────────────────

    #[test]
    fn test_named_function_expression_self_reference() {
        let (program, resolution) = resolve_src("var f = function g(){return g;};");
        let Expr::VarDecls(list) = stmt_expr(&program.body[0]) else {
            panic!("expected a declaration list");
        };
        let Expr::NamedFn(named) = list.declarations[0].init.as_ref().unwrap() else {
            panic!("expected a named function expression");
        };
        let Stmt::Return(ret) = &named.function.body.body[0] else {
            panic!("expected a return statement");
        };
        let g_use = resolution.of(ret.argument.id()).unwrap();
        let g_decl = resolution.of(named.name.id).unwrap();
        assert_eq!(g_use.unique_id, g_decl.unique_id);
        assert!(!g_use.is_global);
        // The name never leaks to program scope.
        assert_eq!(vars_named(&resolution, "g").len(), 1);
    }

    // ── this / arguments ─────────────────────────────────────────────────────

    #[test]
    fn test_this_resolves_to_function_scope_entry() {
        let (program, resolution) = resolve_src("function f(){this;}");
        let Stmt::FnDecl(f) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        let this_var = resolution.of(stmt_expr(&f.function.body.body[0]).id()).unwrap();
        assert!(this_var.is_param);
        assert_eq!(this_var.name, "this");
    }

    #[test]
    fn test_arguments_resolves_to_function_scope_entry() {
        let (program, resolution) = resolve_src("function f(){return arguments;}");
        let Stmt::FnDecl(f) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        let Stmt::Return(ret) = &f.function.body.body[0] else {
            panic!("expected a return statement");
        };
        let args = resolution.of(ret.argument.id()).unwrap();
        assert!(args.is_param);
        assert_eq!(args.name, "arguments");
    }

    // ── Operators ────────────────────────────────────────────────────────────

    #[test]
    fn test_operator_references_resolve_to_operator_vars() {
        let (program, resolution) = resolve_src("a||b; a instanceof b; typeof a;");
        for stmt in &program.body {
            let var = resolution.of(stmt_expr(stmt).id()).unwrap();
            assert!(var.is_operator, "expected an operator var for {stmt:?}");
            assert!(var.is_global);
        }
    }

    #[test]
    fn test_operator_preload_count() {
        let (_, resolution) = resolve_src("");
        assert_eq!(resolution.vars.len(), OPERATORS.len());
        assert!(resolution.vars.iter().all(|v| v.is_operator));
    }

    // ── Accounting ───────────────────────────────────────────────────────────

    #[test]
    fn test_arena_accounting() {
        // operators + f + (this + arguments + x) + implicit global q.
        let (_, resolution) = resolve_src("function f(x){q;}");
        assert_eq!(resolution.vars.len(), OPERATORS.len() + 5);
    }

    #[test]
    fn test_every_reference_has_a_resolution() {
        let src = "var a = 1; function f(b){ with(o){ c; } try{}catch(e){e;} return b; } f(a);";
        let (program, resolution) = resolve_src(src);
        // Spot-check a few reference nodes; the full walk is covered by the
        // printer round-trip tests.
        let Stmt::FnDecl(f) = &program.body[1] else {
            panic!("expected a function declaration");
        };
        assert!(resolution.of(f.name.id).is_some());
        assert!(resolution.of(f.function.params[0].id).is_some());
    }
}
