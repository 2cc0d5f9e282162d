//! Entity references into the heap and symbol table.
//!
//! Nodes and symbols are never addressed through Rust references; both the
//! heap and the symbol table are flat arenas and their entries are named by
//! opaque `u32`-sized indices. This keeps the graph cheap to copy, makes
//! sharing explicit (two edges carrying the same `NodeId` really do point at
//! the same node), and sidesteps the borrow-checker friction that owned
//! pointers into a mutable arena would otherwise cause.

use std::fmt;

/// A reference to a node in the [`Heap`](crate::heap::Heap).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: u32) -> Self {
        NodeId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// A reference to an interned identifier in the [`SymbolTable`](crate::symtab::SymbolTable).
///
/// Symbol indices are always strictly positive so that they can share a
/// numbering scheme with [`VarId::Fresh`] without colliding: user identifiers
/// are positive, reduction-generated ones are distinguished by the `Fresh`
/// variant rather than by sign. See [`VarId`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub(crate) fn new(index: u32) -> Self {
        Symbol(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Identity of a bound or free variable.
///
/// The original interpreter packs this into a single signed integer: a
/// positive value is a symbol-table index (a name the user wrote), a
/// negative one is a counter decremented by the reducer's fresh-name supply
/// during alpha-renaming. We keep that partition, which the reducer's
/// correctness depends on, but make it an explicit sum type instead of
/// relying on the sign of an `int` (see the renaming-prefix note in the
/// design rationale).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum VarId {
    /// A name that occurred in the source text.
    User(Symbol),
    /// A variable synthesized by the reducer during beta-3 renaming.
    /// Distinct `Fresh` values are always distinct variables; the number
    /// itself is only a generation counter.
    Fresh(u32),
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VarId::User(sym) => write!(f, "${}", sym.index()),
            VarId::Fresh(n) => write!(f, "$fresh{n}"),
        }
    }
}
