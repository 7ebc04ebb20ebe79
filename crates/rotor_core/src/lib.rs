//! `rotor_core` — the front-end library for the Rotor JavaScript engine.
//!
//! Pipeline: [`parser::scanner`] turns source text into tokens,
//! [`parser::parser`] builds the AST, [`parser::resolver`] maps every
//! variable reference to a descriptor, and [`printer`] renders the tree
//! back to (optionally annotated) source text.
//!
//! # Crate layout
//!
//! - [`error`] — front-end error types and `RotorResult` alias.
//! - [`parser`] — lexer, AST definitions, recursive-descent parser, and
//!   scope resolver.
//! - [`printer`] — parenthesized pretty-printer with optional resolution
//!   tags.

/// Front-end error types and [`error::RotorResult`] alias.
pub mod error;
/// JavaScript parser infrastructure (lexer, AST, parser, resolver).
pub mod parser;
/// Parenthesized pretty-printer with optional resolution tags.
pub mod printer;
