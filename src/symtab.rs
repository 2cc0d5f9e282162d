//! Identifier interning.
//!
//! The original hashes a fixed-width, space-padded copy of the name into one
//! of 97 buckets and chains collisions through the symbol-table array
//! itself. We keep the externally visible contract -- `locate` is
//! idempotent, built-in names reserve low indices, overflow past
//! `symbol_table_size` is fatal for the expression being parsed -- but back
//! it with a `HashMap`, which is the ordinary way to intern strings in Rust
//! and needs no hand-rolled bucket chain.

use rustc_hash::FxHashMap;

use crate::error::{EngineError, Result};
use crate::ids::Symbol;

/// A built-in primitive recognized by name at parse time.
///
/// The numeric value is the "key" from the original's symbol-table entries;
/// it has no behavioral meaning beyond grouping unary keys (< 21) against
/// binary ones (>= 21), which [`Builtin::arity`] makes explicit instead of
/// leaving it as an implicit threshold on an integer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Builtin {
    Pred,
    Zero,
    Succ,
    Null,
    Add,
    Sub,
    Mult,
    Div,
    Iota,
    Show,
    More,
    Not,
    True,
    False,
    And,
    Or,
    Map,
    Append,
}

/// Arity class of a built-in, used by the reducer to know how many
/// applications it needs to absorb before the primitive fires.
///
/// `TRUE` and `FALSE` are Church-style selectors here, not inert sentinels:
/// `((TRUE)a)b` reduces to `a` and `((FALSE)a)b` reduces to `b` without
/// forcing the unchosen branch, exactly as `zero`/`null`/the relational
/// operators produce them and `and`/`or`/`not` consume them. That makes
/// them two-argument built-ins, grouped with `and`/`or`/`map`/`append`
/// rather than off on their own.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Arity {
    Unary,
    Binary,
}

impl Builtin {
    pub fn arity(self) -> Arity {
        use Builtin::*;
        match self {
            Pred | Zero | Succ | Null | Add | Sub | Mult | Div | Iota | Show | More | Not => {
                Arity::Unary
            }
            And | Or | Map | Append | True | False => Arity::Binary,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            Pred => "pred",
            Zero => "zero",
            Succ => "succ",
            Null => "null",
            Add => "add",
            Sub => "sub",
            Mult => "mult",
            Div => "div",
            Iota => "iota",
            Show => "show",
            More => "more",
            Not => "not",
            True => "TRUE",
            False => "FALSE",
            And => "and",
            Or => "or",
            Map => "map",
            Append => "append",
        }
    }

    const ALL: &'static [Builtin] = &[
        Builtin::Pred,
        Builtin::Zero,
        Builtin::Succ,
        Builtin::Null,
        Builtin::Add,
        Builtin::Sub,
        Builtin::Mult,
        Builtin::Div,
        Builtin::Iota,
        Builtin::Show,
        Builtin::More,
        Builtin::Not,
        Builtin::True,
        Builtin::False,
        Builtin::And,
        Builtin::Or,
        Builtin::Map,
        Builtin::Append,
    ];
}

struct Entry {
    name: String,
    builtin: Option<Builtin>,
}

/// Hashed interning of identifiers into small integers.
///
/// Built-in names are interned up front so that `locate("true")` and a
/// user's own `true` (if ever parsed) resolve to the same low, reserved
/// index -- matching the original's convention of seeding the table with
/// `pred`, `zero`, ... before any source is read.
pub struct SymbolTable {
    entries: Vec<Entry>,
    by_name: FxHashMap<String, Symbol>,
    limit: usize,
}

impl SymbolTable {
    pub fn new(limit: usize) -> Self {
        let mut table = SymbolTable {
            entries: Vec::with_capacity(limit.min(1024)),
            by_name: FxHashMap::default(),
            limit,
        };
        for &b in Builtin::ALL {
            let sym = table.intern_unchecked(b.name(), Some(b));
            debug_assert!(table.builtin_of(sym) == Some(b));
        }
        table
    }

    fn intern_unchecked(&mut self, name: &str, builtin: Option<Builtin>) -> Symbol {
        let sym = Symbol::new(self.entries.len() as u32 + 1);
        self.entries.push(Entry {
            name: name.to_string(),
            builtin,
        });
        self.by_name.insert(name.to_string(), sym);
        sym
    }

    /// Resolve `name` to a [`Symbol`], allocating a fresh one if unseen.
    pub fn locate(&mut self, name: &str) -> Result<Symbol> {
        if let Some(&sym) = self.by_name.get(name) {
            return Ok(sym);
        }
        if self.entries.len() >= self.limit {
            return Err(EngineError::SymbolTableOverflow { limit: self.limit });
        }
        Ok(self.intern_unchecked(name, None))
    }

    pub fn name(&self, sym: Symbol) -> &str {
        &self.entries[sym.index() - 1].name
    }

    pub fn builtin_of(&self, sym: Symbol) -> Option<Builtin> {
        self.entries[sym.index() - 1].builtin
    }
}
