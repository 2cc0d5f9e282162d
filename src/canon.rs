//! Canonical alpha-renaming.
//!
//! `alpha_standardize` assigns every abstraction in a term a scope id in DFS
//! order, then records on every bound-variable occurrence which scope binds
//! it. Two alpha-equivalent terms standardize to graphs whose `scope` fields
//! agree node-for-node, which is what lets the printer (with `standard` set)
//! produce byte-identical text for them.
//!
//! `free_vars_list` underlies both `Free_Variables` and
//! `bind_all_free_vars`: a DFS that collects the free [`VarId`]s of a term
//! in first-occurrence order, honoring shadowing via an explicit stack of
//! currently-bound names rather than marking nodes, since nothing here
//! needs to be written back into the graph.
//!
//! Unlike [`not_free`](crate::free_vars::not_free) and
//! [`recurve`](crate::parser::recurve), neither traversal here memoizes
//! visits through the node's `marker` bit: canonicalization is run on
//! already-reduced, normally finite graphs, so revisiting a shared
//! sub-DAG a handful of times is cheap, and a genuine cycle (which would
//! only survive reduction in a non-normalizing term) is caught by the
//! ordinary depth bound instead of silently looping.

use std::collections::HashSet;

use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::heap::{Heap, NodeKind};
use crate::ids::{NodeId, VarId};

/// Assign scope ids to every abstraction reachable from `root`, and tag
/// every bound occurrence with the id of its binder.
pub fn alpha_standardize(heap: &mut Heap, root: NodeId, stack_size: usize) -> Result<()> {
    let mut visited: SmallVec<[NodeId; 32]> = SmallVec::new();
    let mut next_id = 0u32;
    let result = assign(heap, root, &mut next_id, &mut visited, 0, stack_size);
    for id in visited {
        heap.get_mut(id).marker = false;
    }
    result
}

fn assign(
    heap: &mut Heap,
    node: NodeId,
    next_id: &mut u32,
    visited: &mut SmallVec<[NodeId; 32]>,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::PathOverflow { limit: stack_size });
    }
    let id = heap.compress(node);
    if heap.get(id).marker {
        return Ok(());
    }
    heap.get_mut(id).marker = true;
    visited.push(id);

    match heap.kind(id).clone() {
        NodeKind::Abs { bound, body } => {
            *next_id += 1;
            let sid = *next_id;
            heap.get_mut(id).scope = sid;
            scope(heap, bound, body, sid, 0, stack_size)?;
            assign(heap, body, next_id, visited, depth + 1, stack_size)?;
        }
        NodeKind::App { func, arg } => {
            assign(heap, func, next_id, visited, depth + 1, stack_size)?;
            assign(heap, arg, next_id, visited, depth + 1, stack_size)?;
        }
        NodeKind::Cons { head, tail } => {
            assign(heap, head, next_id, visited, depth + 1, stack_size)?;
            assign(heap, tail, next_id, visited, depth + 1, stack_size)?;
        }
        _ => {}
    }
    Ok(())
}

/// Mark every free occurrence of `bound` within `node` with scope id `sid`.
/// Descent stops at any inner abstraction rebinding `bound`.
fn scope(
    heap: &mut Heap,
    bound: VarId,
    node: NodeId,
    sid: u32,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::PathOverflow { limit: stack_size });
    }
    let id = heap.compress(node);
    match heap.kind(id).clone() {
        NodeKind::Var(v) if v == bound => {
            heap.get_mut(id).scope = sid;
        }
        NodeKind::Abs {
            bound: inner,
            body,
        } => {
            if inner == bound {
                return Ok(());
            }
            scope(heap, bound, body, sid, depth + 1, stack_size)?;
        }
        NodeKind::App { func, arg } => {
            scope(heap, bound, func, sid, depth + 1, stack_size)?;
            scope(heap, bound, arg, sid, depth + 1, stack_size)?;
        }
        NodeKind::Cons { head, tail } => {
            scope(heap, bound, head, sid, depth + 1, stack_size)?;
            scope(heap, bound, tail, sid, depth + 1, stack_size)?;
        }
        NodeKind::Rename { .. } => return Err(EngineError::WrongRenaming),
        _ => {}
    }
    Ok(())
}

/// Collect the free variables of the term rooted at `root`, in
/// first-occurrence DFS order, without duplicates.
pub fn free_vars_list(heap: &Heap, root: NodeId, stack_size: usize) -> Result<Vec<VarId>> {
    let mut bound_stack = Vec::new();
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    collect(
        heap,
        root,
        &mut bound_stack,
        &mut seen,
        &mut order,
        0,
        stack_size,
    )?;
    Ok(order)
}

fn collect(
    heap: &Heap,
    node: NodeId,
    bound_stack: &mut Vec<VarId>,
    seen: &mut HashSet<VarId>,
    order: &mut Vec<VarId>,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::NotFreeOverflow { limit: stack_size });
    }
    // free_vars_list never mutates the graph, so it cannot call
    // `Heap::compress` (which requires `&mut`); indirections are instead
    // skipped one hop at a time on each visit.
    let mut id = node;
    let mut steps = 0usize;
    while let NodeKind::Indirect(next) = *heap.kind(id) {
        id = next;
        steps += 1;
        if steps > heap.capacity() {
            break;
        }
    }

    match heap.kind(id).clone() {
        NodeKind::Var(v) => {
            if !bound_stack.contains(&v) && seen.insert(v) {
                order.push(v);
            }
        }
        NodeKind::Abs { bound, body } => {
            bound_stack.push(bound);
            collect(heap, body, bound_stack, seen, order, depth + 1, stack_size)?;
            bound_stack.pop();
        }
        NodeKind::App { func, arg } => {
            collect(heap, func, bound_stack, seen, order, depth + 1, stack_size)?;
            collect(heap, arg, bound_stack, seen, order, depth + 1, stack_size)?;
        }
        NodeKind::Cons { head, tail } => {
            collect(heap, head, bound_stack, seen, order, depth + 1, stack_size)?;
            collect(heap, tail, bound_stack, seen, order, depth + 1, stack_size)?;
        }
        NodeKind::Rename { .. } => return Err(EngineError::WrongRenaming),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::printer::print_node;
    use crate::symtab::SymbolTable;

    /// `\bound.bound`, the identity function under whatever name the caller
    /// picks for the binder.
    fn identity(heap: &mut Heap, symtab: &mut SymbolTable, name: &str) -> NodeId {
        let sym = symtab.locate(name).unwrap();
        let bound = VarId::User(sym);
        let var = heap.allocate().unwrap();
        heap.set_kind(var, NodeKind::Var(bound));
        let abs = heap.allocate().unwrap();
        heap.set_kind(abs, NodeKind::Abs { bound, body: var });
        abs
    }

    #[test]
    fn alpha_equivalent_identities_standardize_identically() {
        let mut heap_a = Heap::new(64);
        let mut symtab_a = SymbolTable::new(64);
        let a = identity(&mut heap_a, &mut symtab_a, "a");
        alpha_standardize(&mut heap_a, a, 64).unwrap();
        let text_a = print_node(&heap_a, &symtab_a, a, true, 'x', 64).unwrap();

        let mut heap_b = Heap::new(64);
        let mut symtab_b = SymbolTable::new(64);
        let b = identity(&mut heap_b, &mut symtab_b, "completely_different_name");
        alpha_standardize(&mut heap_b, b, 64).unwrap();
        let text_b = print_node(&heap_b, &symtab_b, b, true, 'x', 64).unwrap();

        assert_eq!(text_a, text_b);
    }

    #[test]
    fn standardize_is_idempotent() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let root = identity(&mut heap, &mut symtab, "x");
        alpha_standardize(&mut heap, root, 64).unwrap();
        let once = print_node(&heap, &symtab, root, true, 'x', 64).unwrap();
        alpha_standardize(&mut heap, root, 64).unwrap();
        let twice = print_node(&heap, &symtab, root, true, 'x', 64).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn free_vars_list_respects_shadowing() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let root = identity(&mut heap, &mut symtab, "x");
        assert!(free_vars_list(&heap, root, 64).unwrap().is_empty());
    }

    #[test]
    fn free_vars_list_dedupes_repeated_occurrences() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let sym_x = symtab.locate("x").unwrap();
        let vx = VarId::User(sym_x);
        let x1 = heap.allocate().unwrap();
        heap.set_kind(x1, NodeKind::Var(vx));
        let x2 = heap.allocate().unwrap();
        heap.set_kind(x2, NodeKind::Var(vx));
        let app = heap.allocate().unwrap();
        heap.set_kind(app, NodeKind::App { func: x1, arg: x2 });
        let free = free_vars_list(&heap, app, 64).unwrap();
        assert_eq!(free, vec![vx]);
    }
}
