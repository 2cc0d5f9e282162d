//! Session-wide tunables.
//!
//! These mirror the `parmsLambda` parameter block: every field bounds one of
//! the arenas or traversal stacks the engine uses, so that a session can be
//! sized for an embedding (a web playground wants a small heap and a tight
//! cycle limit; a batch harness wants both generous).

/// Configuration accepted when constructing a [`Session`](crate::session::Session).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of nodes in the heap arena.
    pub heap_size: usize,
    /// Maximum reduction steps per `eval`.
    pub cycle_limit: usize,
    /// Maximum distinct identifiers per session.
    pub symbol_table_size: usize,
    /// Depth bound for the reducer's ancestor path and for the explicit
    /// DFS stacks used by `not_free`, `recurve`, and the canonicalizer.
    pub stack_size: usize,
    /// Maximum identifier length in characters; longer names are truncated
    /// the way the original's fixed-width symbol-table slots were.
    pub name_length: usize,
    /// Character used to prefix canonical bound-variable names
    /// (`standardize`'s `x1`, `x2`, ...).
    pub standard_variable: char,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            heap_size: 100_000,
            cycle_limit: 1_000_000,
            symbol_table_size: 10_000,
            stack_size: 4_096,
            name_length: 32,
            standard_variable: 'x',
        }
    }
}
