//! A graph-reduction engine for an extended untyped lambda calculus.
//!
//! Terms are parsed into a shared, mutable graph (the [`heap`] arena) and
//! reduced in place by leftmost-outermost [`reduce`]: work done reducing one
//! occurrence of a shared subterm is visible through every other reference
//! to it, rather than being redone. On top of the reducer sit a
//! free-variable predicate ([`free_vars`]), a mark-and-sweep collector
//! (`Heap::collect`), and a canonical alpha-renaming pass ([`canon`]) that
//! lets two alpha-equivalent terms be compared by printing them both with
//! `standard = true` and comparing the resulting text.
//!
//! [`Session`](session::Session) is the single entry point a caller needs:
//! it owns one heap, one symbol table, and the reduction parameters, and
//! exposes `reduce_lambda`, `standardize`, `bind_all_free_vars`, and
//! `free_variables` as the four external operations this crate supports.
//! Everything else -- the parser, the lexer, the printer, the reducer's
//! internal state machine -- is an implementation detail reached only
//! through that handle.

pub mod canon;
pub mod config;
pub mod error;
pub mod free_vars;
pub mod heap;
pub mod ids;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod reduce;
pub mod session;
pub mod symtab;

pub use config::SessionConfig;
pub use error::{EngineError, ErrorCounters, Result};
pub use ids::{NodeId, Symbol, VarId};
pub use reduce::OutputSink;
pub use session::{FreeVariableOutcome, Session};
