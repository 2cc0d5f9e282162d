//! Serializing a graph back to source text.
//!
//! A DFS over the graph, same shape as every other traversal in this crate.
//! The original distinguishes the first element of a printed list from its
//! continuations by temporarily overwriting a live cons node's `code` (3 or
//! 4 become 13 or 14 for the duration of the print, then get restored) --
//! a trick that only works because that interpreter never prints
//! concurrently with anything else touching the graph. An explicit stack of
//! "are we printing the first element of this list" frames gets the same
//! output without mutating the term being printed, which is one less thing
//! a caller has to reason about when an error aborts the print partway
//! through.

use std::fmt::Write as _;

use crate::canon::free_vars_list;
use crate::error::{EngineError, Result};
use crate::heap::{ArithOp, Heap, NodeKind, RelOp};
use crate::ids::{NodeId, VarId};
use crate::symtab::SymbolTable;

/// Render the term rooted at `root` as source text.
///
/// When `standard` is set, bound variables are printed using their
/// canonicalizer-assigned `scope` field as `<letter><scope_id + offset>`
/// instead of their original source name; `alpha_standardize` must have
/// already run over this graph, or every scope field will read as the
/// unassigned sentinel `0` and variables will fall back to their original
/// names.
pub fn print_node(
    heap: &Heap,
    symtab: &SymbolTable,
    root: NodeId,
    standard: bool,
    letter: char,
    stack_size: usize,
) -> Result<String> {
    let offset = if standard {
        compute_scope_offset(heap, symtab, root, letter, stack_size)?
    } else {
        0
    };
    let mut out = String::new();
    print_rec(heap, symtab, root, standard, letter, offset, &mut out, 0, stack_size)?;
    Ok(out)
}

fn follow(heap: &Heap, mut node: NodeId) -> NodeId {
    let mut steps = 0usize;
    while let NodeKind::Indirect(next) = *heap.kind(node) {
        node = next;
        steps += 1;
        if steps > heap.capacity() {
            break;
        }
    }
    node
}

fn var_name(symtab: &SymbolTable, v: VarId) -> String {
    match v {
        VarId::User(sym) => symtab.name(sym).to_string(),
        VarId::Fresh(n) => format!("$fresh{n}"),
    }
}

fn scope_name(letter: char, scope_id: u32, offset: u32) -> String {
    format!("{letter}{}", scope_id + offset)
}

/// Find the smallest non-negative `offset` such that no generated
/// `<letter><scope_id + offset>` name collides with any free variable's
/// original name. Bounded by `max_scope * free_names.len() + 1` attempts,
/// which always succeeds: each (scope id, free name) pair rules out at most
/// one offset value.
fn compute_scope_offset(
    heap: &Heap,
    symtab: &SymbolTable,
    root: NodeId,
    letter: char,
    stack_size: usize,
) -> Result<u32> {
    let free = free_vars_list(heap, root, stack_size)?;
    let free_names: Vec<String> = free
        .into_iter()
        .filter_map(|v| match v {
            VarId::User(sym) => Some(symtab.name(sym).to_string()),
            VarId::Fresh(_) => None,
        })
        .collect();
    let max_scope = max_scope_id(heap, root, stack_size)?;
    if free_names.is_empty() || max_scope == 0 {
        return Ok(0);
    }
    let bound = max_scope as usize * free_names.len() + 1;
    'offset: for offset in 0..=bound as u32 {
        for sid in 1..=max_scope {
            let candidate = scope_name(letter, sid, offset);
            if free_names.iter().any(|n| *n == candidate) {
                continue 'offset;
            }
        }
        return Ok(offset);
    }
    Ok(bound as u32)
}

fn max_scope_id(heap: &Heap, root: NodeId, stack_size: usize) -> Result<u32> {
    let mut max = 0u32;
    scan_scope(heap, root, &mut max, 0, stack_size)?;
    Ok(max)
}

fn scan_scope(heap: &Heap, node: NodeId, max: &mut u32, depth: usize, stack_size: usize) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::PathOverflow { limit: stack_size });
    }
    let id = follow(heap, node);
    match heap.kind(id) {
        NodeKind::Abs { body, .. } => {
            *max = (*max).max(heap.get(id).scope);
            scan_scope(heap, *body, max, depth + 1, stack_size)
        }
        NodeKind::App { func, arg } => {
            scan_scope(heap, *func, max, depth + 1, stack_size)?;
            scan_scope(heap, *arg, max, depth + 1, stack_size)
        }
        NodeKind::Cons { head, tail } => {
            scan_scope(heap, *head, max, depth + 1, stack_size)?;
            scan_scope(heap, *tail, max, depth + 1, stack_size)
        }
        _ => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn print_rec(
    heap: &Heap,
    symtab: &SymbolTable,
    node: NodeId,
    standard: bool,
    letter: char,
    offset: u32,
    out: &mut String,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::PathOverflow { limit: stack_size });
    }
    let id = follow(heap, node);
    match heap.kind(id).clone() {
        NodeKind::Abs { bound, body } => {
            let name = if standard {
                scope_name(letter, heap.get(id).scope, offset)
            } else {
                var_name(symtab, bound)
            };
            out.push('\\');
            out.push_str(&name);
            out.push('.');
            print_rec(heap, symtab, body, standard, letter, offset, out, depth + 1, stack_size)
        }
        NodeKind::App { func, arg } => {
            out.push('(');
            print_rec(heap, symtab, func, standard, letter, offset, out, depth + 1, stack_size)?;
            out.push(')');
            print_rec(heap, symtab, arg, standard, letter, offset, out, depth + 1, stack_size)
        }
        NodeKind::Cons { .. } => print_list(heap, symtab, id, standard, letter, offset, out, depth, stack_size),
        NodeKind::Nil => {
            out.push_str("[]");
            Ok(())
        }
        NodeKind::Y => {
            out.push('?');
            Ok(())
        }
        NodeKind::Head => {
            out.push('^');
            Ok(())
        }
        NodeKind::Tail => {
            out.push('~');
            Ok(())
        }
        NodeKind::ConsOp => {
            out.push('&');
            Ok(())
        }
        NodeKind::Int(n) => {
            let _ = write!(out, "{n}");
            Ok(())
        }
        NodeKind::Real(r) => {
            let _ = write!(out, "{r}");
            Ok(())
        }
        NodeKind::Var(v) => {
            let scope = heap.get(id).scope;
            let name = if standard && scope != 0 {
                scope_name(letter, scope, offset)
            } else {
                var_name(symtab, v)
            };
            out.push_str(&name);
            Ok(())
        }
        NodeKind::Builtin(b) => {
            out.push_str(b.name());
            Ok(())
        }
        NodeKind::Arith(op) => {
            out.push(match op {
                ArithOp::Add => '+',
                ArithOp::Sub => '-',
                ArithOp::Mul => '*',
                ArithOp::Div => '/',
            });
            Ok(())
        }
        NodeKind::Rel(op) => {
            out.push_str(match op {
                RelOp::Eq => "=",
                RelOp::Lt => "<",
                RelOp::Gt => ">",
                RelOp::Le => "<=",
                RelOp::Ge => ">=",
                RelOp::Ne => "<>",
            });
            Ok(())
        }
        NodeKind::Indirect(_) | NodeKind::Rename { .. } => Err(EngineError::WrongRenaming),
    }
}

#[allow(clippy::too_many_arguments)]
fn print_list(
    heap: &Heap,
    symtab: &SymbolTable,
    node: NodeId,
    standard: bool,
    letter: char,
    offset: u32,
    out: &mut String,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    out.push('[');
    let mut current = node;
    let mut first = true;
    loop {
        let id = follow(heap, current);
        match heap.kind(id).clone() {
            NodeKind::Nil => break,
            NodeKind::Cons { head, tail } => {
                if !first {
                    out.push(',');
                }
                first = false;
                print_rec(heap, symtab, head, standard, letter, offset, out, depth + 1, stack_size)?;
                current = tail;
            }
            _ => {
                // An improper tail: the list hasn't fully reduced to `nil`
                // (still a stuck application, a free variable, ...). Render
                // it after a `|` rather than silently dropping it.
                if !first {
                    out.push(',');
                }
                out.push('|');
                print_rec(heap, symtab, id, standard, letter, offset, out, depth + 1, stack_size)?;
                break;
            }
        }
    }
    out.push(']');
    Ok(())
}
