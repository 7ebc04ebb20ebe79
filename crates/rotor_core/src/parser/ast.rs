//! ES5 Abstract Syntax Tree node definitions.
//!
//! Every node struct carries a dense [`NodeId`] assigned at construction by
//! the parser.  Node identity is what the resolver keys its resolution map
//! on, so ids are unique within a single parse; they carry no positional
//! meaning.
//!
//! # Structure
//!
//! - [`Program`] — root node.
//! - [`Stmt`] — statement nodes.
//! - [`Expr`] — expression nodes.
//! - Shared nodes that are neither: [`CatchClause`], [`SwitchCase`],
//!   [`ArrayElement`], [`Property`], [`VarInit`].
//! - Declaration leaves: [`VarDecl`], [`Param`].

/// Dense node identifier, unique within one parsed [`Program`].
pub type NodeId = u32;

// ─────────────────────────────────────────────────────────────────────────────
// Program
// ─────────────────────────────────────────────────────────────────────────────

/// The root node of a parsed JavaScript source file.
#[derive(Debug, Clone)]
pub struct Program {
    /// Node identity (also the program scope key for resolution).
    pub id: NodeId,
    /// Top-level statements.
    pub body: Vec<Stmt>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Declaration leaves
// ─────────────────────────────────────────────────────────────────────────────

/// A declared variable name: the `x` in `var x = …` or in `function x`.
#[derive(Debug, Clone)]
pub struct VarDecl {
    /// Node identity.
    pub id: NodeId,
    /// The declared name; never empty.
    pub name: String,
}

/// A formal function parameter or `catch` parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Node identity.
    pub id: NodeId,
    /// The parameter name; never empty.
    pub name: String,
}

/// A single `decl [= initializer]` entry in a variable declaration list.
#[derive(Debug, Clone)]
pub struct VarInit {
    /// Node identity.
    pub id: NodeId,
    /// The declared name.
    pub decl: VarDecl,
    /// Optional initializer expression.
    pub init: Option<Expr>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────────────

/// A JavaScript statement.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `{ … }` block statement.
    Block(BlockStmt),
    /// Expression statement (`expr ;`), including `var` statements.
    Expr(ExprStmt),
    /// Empty statement `;`.
    Empty(EmptyStmt),
    /// `if (test) consequent else alternate`
    If(Box<IfStmt>),
    /// `for (init; test; update) body`
    For(Box<ForStmt>),
    /// `for (left in right) body`
    ForIn(Box<ForInStmt>),
    /// `while (test) body`
    While(Box<WhileStmt>),
    /// `do body while (test);`
    DoWhile(Box<DoWhileStmt>),
    /// `continue label?;`
    Continue(ContinueStmt),
    /// `break label?;`
    Break(BreakStmt),
    /// `return argument;`
    Return(ReturnStmt),
    /// `throw argument;`
    Throw(ThrowStmt),
    /// `try { … } catch (…) { … } finally { … }`
    Try(Box<TryStmt>),
    /// `with (object) body`
    With(Box<WithStmt>),
    /// `switch (discriminant) { cases }`
    Switch(Box<SwitchStmt>),
    /// `function name(params) { body }` at statement position.
    FnDecl(Box<FnDeclStmt>),
    /// `label: body`
    Labeled(Box<LabeledStmt>),
}

impl Stmt {
    /// Returns the node identity of this statement.
    pub fn id(&self) -> NodeId {
        match self {
            Stmt::Block(s) => s.id,
            Stmt::Expr(s) => s.id,
            Stmt::Empty(s) => s.id,
            Stmt::If(s) => s.id,
            Stmt::For(s) => s.id,
            Stmt::ForIn(s) => s.id,
            Stmt::While(s) => s.id,
            Stmt::DoWhile(s) => s.id,
            Stmt::Continue(s) => s.id,
            Stmt::Break(s) => s.id,
            Stmt::Return(s) => s.id,
            Stmt::Throw(s) => s.id,
            Stmt::Try(s) => s.id,
            Stmt::With(s) => s.id,
            Stmt::Switch(s) => s.id,
            Stmt::FnDecl(s) => s.id,
            Stmt::Labeled(s) => s.id,
        }
    }
}

/// `{ statements }` block statement.
#[derive(Debug, Clone)]
pub struct BlockStmt {
    /// Node identity.
    pub id: NodeId,
    /// Statements in the block.
    pub body: Vec<Stmt>,
}

/// Expression statement: `expr ;`
#[derive(Debug, Clone)]
pub struct ExprStmt {
    /// Node identity.
    pub id: NodeId,
    /// The expression.
    pub expr: Expr,
}

/// Empty statement `;`.
#[derive(Debug, Clone)]
pub struct EmptyStmt {
    /// Node identity.
    pub id: NodeId,
}

/// `if (test) consequent else alternate`
#[derive(Debug, Clone)]
pub struct IfStmt {
    /// Node identity.
    pub id: NodeId,
    /// Condition expression.
    pub test: Expr,
    /// Taken branch.
    pub consequent: Stmt,
    /// Not-taken branch; an [`EmptyStmt`] when the source has no `else`.
    pub alternate: Stmt,
}

impl IfStmt {
    /// Returns `true` when the source carried a real `else` branch.
    pub fn has_alternate(&self) -> bool {
        !matches!(self.alternate, Stmt::Empty(_))
    }
}

/// `for (init; test; update) body`
#[derive(Debug, Clone)]
pub struct ForStmt {
    /// Node identity.
    pub id: NodeId,
    /// Optional initializer; a [`Expr::VarDecls`] for `for (var …; …; …)`.
    pub init: Option<Expr>,
    /// Loop condition; defaults to a `true` literal when the source omits it.
    pub test: Expr,
    /// Optional update expression.
    pub update: Option<Expr>,
    /// Loop body.
    pub body: Stmt,
}

/// `for (left in right) body`
#[derive(Debug, Clone)]
pub struct ForInStmt {
    /// Node identity.
    pub id: NodeId,
    /// A single-entry [`Expr::VarDecls`], an [`Expr::Ident`], or an
    /// [`Expr::Member`].
    pub left: Expr,
    /// The object being enumerated.
    pub right: Expr,
    /// Loop body.
    pub body: Stmt,
}

/// `while (test) body`
#[derive(Debug, Clone)]
pub struct WhileStmt {
    /// Node identity.
    pub id: NodeId,
    /// Loop condition.
    pub test: Expr,
    /// Loop body.
    pub body: Stmt,
}

/// `do body while (test);`
#[derive(Debug, Clone)]
pub struct DoWhileStmt {
    /// Node identity.
    pub id: NodeId,
    /// Loop body.
    pub body: Stmt,
    /// Loop condition.
    pub test: Expr,
}

/// `continue label?;`
#[derive(Debug, Clone)]
pub struct ContinueStmt {
    /// Node identity.
    pub id: NodeId,
    /// Optional target label.
    pub label: Option<String>,
}

/// `break label?;`
#[derive(Debug, Clone)]
pub struct BreakStmt {
    /// Node identity.
    pub id: NodeId,
    /// Optional target label.
    pub label: Option<String>,
}

/// `return argument;` — a value-less `return` stores an
/// [`Expr::Undefined`] literal.
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    /// Node identity.
    pub id: NodeId,
    /// The returned value.
    pub argument: Expr,
}

/// `throw argument;`
#[derive(Debug, Clone)]
pub struct ThrowStmt {
    /// Node identity.
    pub id: NodeId,
    /// The thrown value.
    pub argument: Expr,
}

/// `try { block } catch (param) { … } finally { … }` — at least one of
/// handler/finalizer is present.
#[derive(Debug, Clone)]
pub struct TryStmt {
    /// Node identity.
    pub id: NodeId,
    /// The `try` block.
    pub block: BlockStmt,
    /// Optional `catch` clause.
    pub handler: Option<CatchClause>,
    /// Optional `finally` block.
    pub finalizer: Option<BlockStmt>,
}

/// `catch (param) body`
#[derive(Debug, Clone)]
pub struct CatchClause {
    /// Node identity (also the catch scope key for resolution).
    pub id: NodeId,
    /// The exception binding.
    pub param: Param,
    /// The catch block.
    pub body: BlockStmt,
}

/// `with (object) body`
#[derive(Debug, Clone)]
pub struct WithStmt {
    /// Node identity (also the with scope key for resolution).
    pub id: NodeId,
    /// The scope object.
    pub object: Expr,
    /// The body statement.
    pub body: Stmt,
}

/// `switch (discriminant) { cases }`
#[derive(Debug, Clone)]
pub struct SwitchStmt {
    /// Node identity.
    pub id: NodeId,
    /// The value being switched on.
    pub discriminant: Expr,
    /// The `case` / `default` clauses; at most one default.
    pub cases: Vec<SwitchCase>,
}

/// A single `case expr:` or `default:` clause in a `switch` statement.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// Node identity.
    pub id: NodeId,
    /// `None` for the `default:` clause; `Some(expr)` for `case expr:`.
    pub test: Option<Expr>,
    /// Clause body.
    pub body: BlockStmt,
}

/// `function name(params) { body }` at statement position.
#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    /// Node identity.
    pub id: NodeId,
    /// The declared function name, bound in the enclosing scope.
    pub name: VarDecl,
    /// The function itself.
    pub function: FnExpr,
}

/// `label: body`
#[derive(Debug, Clone)]
pub struct LabeledStmt {
    /// Node identity.
    pub id: NodeId,
    /// The label text.
    pub label: String,
    /// The labeled statement.
    pub body: Stmt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────────────

/// A JavaScript expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Comma expression `(a, b, c)`.
    Sequence(SequenceExpr),
    /// `var a = 1, b` — a declaration list in expression position.
    VarDecls(VarDeclList),
    /// `target = value` or compound `target op= value`.
    Assign(Box<AssignExpr>),
    /// `test ? consequent : alternate`
    Conditional(Box<ConditionalExpr>),
    /// `new callee(arguments)`
    New(Box<NewExpr>),
    /// `callee(arguments)`
    Call(Box<CallExpr>),
    /// Binary operator expression.
    Binary(Box<BinaryExpr>),
    /// Prefix operator expression.
    Prefix(Box<PrefixExpr>),
    /// Postfix `++` / `--`.
    Postfix(Box<PostfixExpr>),
    /// A variable use.
    Ident(VarUse),
    /// `this`
    This(ThisExpr),
    /// Property access `object[property]` (`.x` is normalized to `["x"]`).
    Member(Box<MemberExpr>),
    /// Named function expression.
    NamedFn(Box<NamedFnExpr>),
    /// Anonymous function expression.
    Fn(Box<FnExpr>),
    /// `true` / `false`
    Bool(BoolLit),
    /// Numeric literal (raw source text).
    Num(NumLit),
    /// String literal (raw source text, quotes included).
    Str(StrLit),
    /// `null`
    Null(NullLit),
    /// The undefined value; prints as `(void 0)`.
    Undefined(UndefinedLit),
    /// Array initializer `[a, , b]`.
    Array(ArrayLit),
    /// Object initializer `{key: value}`.
    Object(ObjectLit),
    /// Regular expression literal (raw text including flags).
    Regexp(RegExpLit),
}

impl Expr {
    /// Returns the node identity of this expression.
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Sequence(e) => e.id,
            Expr::VarDecls(e) => e.id,
            Expr::Assign(e) => e.id,
            Expr::Conditional(e) => e.id,
            Expr::New(e) => e.id,
            Expr::Call(e) => e.id,
            Expr::Binary(e) => e.id,
            Expr::Prefix(e) => e.id,
            Expr::Postfix(e) => e.id,
            Expr::Ident(e) => e.id,
            Expr::This(e) => e.id,
            Expr::Member(e) => e.id,
            Expr::NamedFn(e) => e.id,
            Expr::Fn(e) => e.id,
            Expr::Bool(e) => e.id,
            Expr::Num(e) => e.id,
            Expr::Str(e) => e.id,
            Expr::Null(e) => e.id,
            Expr::Undefined(e) => e.id,
            Expr::Array(e) => e.id,
            Expr::Object(e) => e.id,
            Expr::Regexp(e) => e.id,
        }
    }
}

/// Comma expression `(a, b, c)`; always has at least two operands.
#[derive(Debug, Clone)]
pub struct SequenceExpr {
    /// Node identity.
    pub id: NodeId,
    /// The operands, in evaluation order.
    pub expressions: Vec<Expr>,
}

/// `var a = 1, b` — one or more declarators.
#[derive(Debug, Clone)]
pub struct VarDeclList {
    /// Node identity.
    pub id: NodeId,
    /// The declarators, in source order.
    pub declarations: Vec<VarInit>,
}

/// `target = value` / `target op= value`.
#[derive(Debug, Clone)]
pub struct AssignExpr {
    /// Node identity.
    pub id: NodeId,
    /// The assignment target; an [`Expr::Ident`] or [`Expr::Member`].
    pub target: Expr,
    /// `None` for plain `=`; the operator text without the trailing `=`
    /// (`"+"`, `">>>"`, …) for compound assignments.
    pub op: Option<String>,
    /// The assigned value.
    pub value: Expr,
}

/// `test ? consequent : alternate`
#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    /// Node identity.
    pub id: NodeId,
    /// Condition.
    pub test: Expr,
    /// Value when the condition is truthy.
    pub consequent: Expr,
    /// Value when the condition is falsy.
    pub alternate: Expr,
}

/// `new callee(arguments)` — `arguments` is empty for parenless `new`.
#[derive(Debug, Clone)]
pub struct NewExpr {
    /// Node identity.
    pub id: NodeId,
    /// The constructed expression.
    pub callee: Expr,
    /// Constructor arguments.
    pub arguments: Vec<Expr>,
}

/// `callee(arguments)`
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Node identity.
    pub id: NodeId,
    /// The called expression.
    pub callee: Expr,
    /// Call arguments.
    pub arguments: Vec<Expr>,
}

/// Binary operator expression.  `op` is the exact operator text (`"+"`,
/// `"instanceof"`, …); all binary operators are left-associative.
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    /// Node identity.
    pub id: NodeId,
    /// Operator text.
    pub op: String,
    /// Left operand.
    pub left: Expr,
    /// Right operand.
    pub right: Expr,
}

/// Prefix operator expression.  Word operators keep their text (`"delete"`,
/// `"typeof"`, …); `++ -- + -` are spelled `"prefix++"`, `"prefix--"`,
/// `"prefix+"`, `"prefix-"` so later passes can tell them apart from their
/// binary forms.
#[derive(Debug, Clone)]
pub struct PrefixExpr {
    /// Node identity.
    pub id: NodeId,
    /// Operator text.
    pub op: String,
    /// The operand.
    pub argument: Expr,
}

/// Postfix `++` / `--`.
#[derive(Debug, Clone)]
pub struct PostfixExpr {
    /// Node identity.
    pub id: NodeId,
    /// `"++"` or `"--"`.
    pub op: String,
    /// The operand.
    pub argument: Expr,
}

/// A variable use.
#[derive(Debug, Clone)]
pub struct VarUse {
    /// Node identity.
    pub id: NodeId,
    /// The referenced name; never empty.
    pub name: String,
}

/// `this`
#[derive(Debug, Clone)]
pub struct ThisExpr {
    /// Node identity.
    pub id: NodeId,
}

/// Property access `object[property]`.
#[derive(Debug, Clone)]
pub struct MemberExpr {
    /// Node identity.
    pub id: NodeId,
    /// The receiver.
    pub object: Expr,
    /// The selector expression; `.x` selectors become `"x"` string literals.
    pub property: Expr,
}

/// `function name(params) { body }` in expression position.  The name is
/// visible only inside the expression itself.
#[derive(Debug, Clone)]
pub struct NamedFnExpr {
    /// Node identity (also the named-function scope key for resolution).
    pub id: NodeId,
    /// The function's own name.
    pub name: VarDecl,
    /// The function itself.
    pub function: FnExpr,
}

/// `function (params) { body }` — an anonymous function.
#[derive(Debug, Clone)]
pub struct FnExpr {
    /// Node identity (also the function scope key for resolution).
    pub id: NodeId,
    /// Formal parameters.
    pub params: Vec<Param>,
    /// Function body.
    pub body: BlockStmt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────────────

/// `true` / `false`
#[derive(Debug, Clone)]
pub struct BoolLit {
    /// Node identity.
    pub id: NodeId,
    /// The literal value.
    pub value: bool,
}

/// Numeric literal; `raw` is the exact source slice.
#[derive(Debug, Clone)]
pub struct NumLit {
    /// Node identity.
    pub id: NodeId,
    /// Raw source text.
    pub raw: String,
}

/// String literal; `raw` is the exact source slice including quotes.
#[derive(Debug, Clone)]
pub struct StrLit {
    /// Node identity.
    pub id: NodeId,
    /// Raw source text, quotes included.
    pub raw: String,
}

/// `null`
#[derive(Debug, Clone)]
pub struct NullLit {
    /// Node identity.
    pub id: NodeId,
}

/// The undefined value, synthesized for value-less `return` statements.
#[derive(Debug, Clone)]
pub struct UndefinedLit {
    /// Node identity.
    pub id: NodeId,
}

/// Array initializer.  `length` counts every slot including elisions;
/// `elements` holds only the non-elided slots, sorted by ascending index.
#[derive(Debug, Clone)]
pub struct ArrayLit {
    /// Node identity.
    pub id: NodeId,
    /// Total slot count, elisions included.
    pub length: u32,
    /// Non-elided elements in index order.
    pub elements: Vec<ArrayElement>,
}

/// One non-elided slot of an [`ArrayLit`].
#[derive(Debug, Clone)]
pub struct ArrayElement {
    /// Node identity.
    pub id: NodeId,
    /// Zero-based slot index.
    pub index: u32,
    /// The element value.
    pub value: Expr,
}

/// Object initializer.
#[derive(Debug, Clone)]
pub struct ObjectLit {
    /// Node identity.
    pub id: NodeId,
    /// The properties, in source order.
    pub properties: Vec<Property>,
}

/// One `key: value` pair of an [`ObjectLit`].  Identifier keys are promoted
/// to quoted string literals by the parser.
#[derive(Debug, Clone)]
pub struct Property {
    /// Node identity.
    pub id: NodeId,
    /// A string or numeric literal.
    pub key: Expr,
    /// The property value.
    pub value: Expr,
}

/// Regular expression literal; `raw` is the whole literal including
/// delimiters and flags.
#[derive(Debug, Clone)]
pub struct RegExpLit {
    /// Node identity.
    pub id: NodeId,
    /// Raw literal text.
    pub raw: String,
}
