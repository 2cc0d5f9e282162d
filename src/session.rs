//! The interpreter container.
//!
//! A `Session` is the single mutable owner of one heap, one symbol table,
//! one configuration, and the running error counters -- replacing the
//! original's file-scope global session pointer with an ordinary struct
//! threaded explicitly through every call. There is exactly one of these
//! per independent interpreter; nothing here is `Sync`, and nothing needs
//! to be, since the whole point of owning the arena exclusively is that no
//! other thread can be touching it at the same time.

use rustc_hash::FxHashMap;

use log::{debug, warn};

use crate::canon::{alpha_standardize, free_vars_list};
use crate::config::SessionConfig;
use crate::error::{EngineError, ErrorCounters, Result};
use crate::heap::{Heap, NodeKind};
use crate::ids::NodeId;
use crate::parser::{self, Command};
use crate::printer::print_node;
use crate::reduce::Reducer;
use crate::symtab::SymbolTable;

/// Resolution of the open question in the design notes: a term can fail to
/// parse, parse closed, or parse with free variables, and those three
/// outcomes are kept distinct rather than collapsing "no free variables"
/// and "didn't parse" onto the same falsy result.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FreeVariableOutcome {
    /// The input did not parse.
    None,
    /// The input parsed and is closed.
    NoFree,
    /// The input parsed and has at least one free variable.
    HasFree,
}

/// A single live interpreter instance: one arena, one symbol table, one set
/// of reduction parameters, and the error counters accumulated over its
/// lifetime.
pub struct Session {
    heap: Heap,
    symtab: SymbolTable,
    cfg: SessionConfig,
    counters: ErrorCounters,
}

impl Session {
    pub fn new(cfg: SessionConfig) -> Self {
        let symtab = SymbolTable::new(cfg.symbol_table_size);
        let heap = Heap::new(cfg.heap_size);
        Session {
            heap,
            symtab,
            cfg,
            counters: ErrorCounters::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn counters(&self) -> &ErrorCounters {
        &self.counters
    }

    pub fn reset_counters(&mut self) {
        self.counters = ErrorCounters::default();
    }

    /// Run the mark-and-sweep collector from `root`, reclaiming everything
    /// else in the arena. Exposed directly rather than wired automatically
    /// into every allocation failure: this crate's allocator reports space
    /// exhaustion immediately rather than retrying after a collection (see
    /// the design notes), so a caller that wants to reclaim garbage between
    /// calls invokes this explicitly.
    pub fn collect(&mut self, root: NodeId) -> Result<()> {
        self.heap.collect(root, self.cfg.stack_size)
    }

    /// Parse `src` as a program of `eval`/`let` commands, reduce every
    /// `eval` to normal form in source order, and return their printed
    /// results concatenated in a single buffer alongside any `show`/`more`
    /// side effects, interleaved in evaluation order.
    ///
    /// Per the error-handling contract, a failure in any single `eval`
    /// aborts the *entire* call: the counters are updated, but no text is
    /// returned, matching the original's "return a null result for the
    /// whole top-level call, not per-eval" behavior.
    pub fn reduce_lambda(&mut self, src: &str) -> Result<String> {
        debug!("reduce_lambda: {} bytes of source", src.len());
        self.heap.release_all();
        let mut lets = FxHashMap::default();
        let commands = parser::parse_program(
            src,
            &mut self.heap,
            &mut self.symtab,
            &mut lets,
            self.cfg.name_length,
            self.cfg.stack_size,
        )
        .map_err(|e| {
            warn!("parse failed: {e}");
            self.counters.record(&e);
            e
        })?;

        let mut out = String::new();
        for command in commands {
            if let Command::Eval(root) = command {
                self.run_eval(root, &mut out)?;
            }
        }
        Ok(out)
    }

    fn run_eval(&mut self, root: NodeId, out: &mut String) -> Result<()> {
        let normalized = {
            let mut reducer = Reducer::new(&mut self.heap, &mut self.symtab, &self.cfg, out);
            reducer.normalize(root, 0)
        };
        let normalized = match normalized {
            Ok(id) => id,
            Err(e) => {
                warn!("eval aborted: {e}");
                self.counters.record(&e);
                return Err(e);
            }
        };
        let text = print_node(
            &self.heap,
            &self.symtab,
            normalized,
            false,
            self.cfg.standard_variable,
            self.cfg.stack_size,
        )
        .map_err(|e| {
            self.counters.record(&e);
            e
        })?;
        out.push_str(&text);
        Ok(())
    }

    /// Parse a single expression, canonicalize it, and print the unique
    /// representative of its alpha-equivalence class.
    pub fn standardize(&mut self, src: &str) -> Result<String> {
        self.heap.release_all();
        let mut lets = FxHashMap::default();
        let root = parser::parse_bare_expr(
            src,
            &mut self.heap,
            &mut self.symtab,
            &mut lets,
            self.cfg.name_length,
            self.cfg.stack_size,
        )?;
        alpha_standardize(&mut self.heap, root, self.cfg.stack_size)?;
        print_node(
            &self.heap,
            &self.symtab,
            root,
            true,
            self.cfg.standard_variable,
            self.cfg.stack_size,
        )
    }

    /// Parse a single expression and prefix it with `\v1.\v2....` over its
    /// free variables in discovered order, producing a closed term.
    pub fn bind_all_free_vars(&mut self, src: &str) -> Result<String> {
        self.heap.release_all();
        let mut lets = FxHashMap::default();
        let root = parser::parse_bare_expr(
            src,
            &mut self.heap,
            &mut self.symtab,
            &mut lets,
            self.cfg.name_length,
            self.cfg.stack_size,
        )?;
        let frees = free_vars_list(&self.heap, root, self.cfg.stack_size)?;
        let mut wrapped = root;
        for v in frees.into_iter().rev() {
            let id = self
                .heap
                .allocate()
                .ok_or(EngineError::SpaceLimit {
                    limit: self.heap.capacity(),
                })?;
            self.heap.set_kind(id, NodeKind::Abs { bound: v, body: wrapped });
            wrapped = id;
        }
        print_node(
            &self.heap,
            &self.symtab,
            wrapped,
            false,
            self.cfg.standard_variable,
            self.cfg.stack_size,
        )
    }

    /// Does the term contain any free variable? Kept tri-valued rather than
    /// collapsing a parse failure onto the same result as "no free
    /// variables found", per the design notes' open question.
    pub fn free_variables(&mut self, src: &str) -> FreeVariableOutcome {
        self.heap.release_all();
        let mut lets = FxHashMap::default();
        let root = match parser::parse_bare_expr(
            src,
            &mut self.heap,
            &mut self.symtab,
            &mut lets,
            self.cfg.name_length,
            self.cfg.stack_size,
        ) {
            Ok(root) => root,
            Err(_) => return FreeVariableOutcome::None,
        };
        match free_vars_list(&self.heap, root, self.cfg.stack_size) {
            Ok(vars) if vars.is_empty() => FreeVariableOutcome::NoFree,
            Ok(_) => FreeVariableOutcome::HasFree,
            Err(_) => FreeVariableOutcome::None,
        }
    }
}
