//! The free-variable predicate.
//!
//! `not_free` decides whether a variable occurs free anywhere in a subgraph.
//! The original walks the graph with an explicit stack and a hand-rolled
//! trace array, restoring `marker` bits in a second pass once the first has
//! found its answer. Plain recursion is the idiomatic Rust shape for a
//! bounded-depth tree walk, so the two passes collapse into one recursive
//! search (depth-checked against `stack_size`, mirroring the original's
//! overflow contract) that records which nodes it marked, followed by an
//! unmark pass over exactly that list rather than a second traversal of the
//! graph's shape.
//!
//! Marking by node identity is sound here even though the graph is a DAG,
//! not a tree: whether a variable occurs free under a node depends only on
//! that node's own contents and the binders strictly between it and the
//! query root, never on how it was reached, so a node's first answer can be
//! reused if it is reached again by sharing.

use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::heap::{Heap, NodeKind};
use crate::ids::{NodeId, VarId};

/// Nodes visited (and therefore marked) by one `not_free` call. Most terms
/// this predicate is run against -- a beta-redex's function body, an
/// abstraction's bound occurrences -- are small enough that the traversal
/// never spills past a handful of nodes, so this stays on the stack.
type Visited = SmallVec<[NodeId; 16]>;

/// Returns `true` iff `target` has no free occurrence in the subgraph
/// rooted at `root`.
pub fn not_free(heap: &mut Heap, target: VarId, root: NodeId, stack_size: usize) -> Result<bool> {
    let mut visited = Visited::new();
    let found = search(heap, target, root, &mut visited, 0, stack_size);
    for id in visited {
        heap.get_mut(id).marker = false;
    }
    Ok(!found?)
}

fn search(
    heap: &mut Heap,
    target: VarId,
    node: NodeId,
    visited: &mut Visited,
    depth: usize,
    stack_size: usize,
) -> Result<bool> {
    if depth > stack_size {
        return Err(EngineError::NotFreeOverflow { limit: stack_size });
    }
    let id = heap.compress(node);
    if heap.get(id).marker {
        return Ok(false);
    }

    match heap.kind(id).clone() {
        NodeKind::Var(v) => Ok(v == target),
        NodeKind::Abs { bound, body } => {
            if bound == target {
                return Ok(false);
            }
            heap.get_mut(id).marker = true;
            visited.push(id);
            search(heap, target, body, visited, depth + 1, stack_size)
        }
        NodeKind::App { func, arg } => {
            heap.get_mut(id).marker = true;
            visited.push(id);
            let in_func = search(heap, target, func, visited, depth + 1, stack_size)?;
            if in_func {
                return Ok(true);
            }
            search(heap, target, arg, visited, depth + 1, stack_size)
        }
        NodeKind::Cons { head, tail } => {
            heap.get_mut(id).marker = true;
            visited.push(id);
            let in_head = search(heap, target, head, visited, depth + 1, stack_size)?;
            if in_head {
                return Ok(true);
            }
            search(heap, target, tail, visited, depth + 1, stack_size)
        }
        NodeKind::Rename { .. } => Err(EngineError::WrongRenaming),
        NodeKind::Indirect(_)
        | NodeKind::Nil
        | NodeKind::Y
        | NodeKind::Head
        | NodeKind::Tail
        | NodeKind::ConsOp
        | NodeKind::Int(_)
        | NodeKind::Real(_)
        | NodeKind::Builtin(_)
        | NodeKind::Arith(_)
        | NodeKind::Rel(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::symtab::SymbolTable;

    fn var(heap: &mut Heap, symtab: &mut SymbolTable, name: &str) -> (NodeId, VarId) {
        let sym = symtab.locate(name).unwrap();
        let v = VarId::User(sym);
        let id = heap.allocate().unwrap();
        heap.set_kind(id, NodeKind::Var(v));
        (id, v)
    }

    #[test]
    fn variable_is_free_in_itself() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let (x, vx) = var(&mut heap, &mut symtab, "x");
        assert!(!not_free(&mut heap, vx, x, 64).unwrap());
    }

    #[test]
    fn abstraction_shadows_its_own_binder() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let (x, vx) = var(&mut heap, &mut symtab, "x");
        let abs = heap.allocate().unwrap();
        heap.set_kind(abs, NodeKind::Abs { bound: vx, body: x });
        assert!(not_free(&mut heap, vx, abs, 64).unwrap());
    }

    #[test]
    fn markers_are_restored_after_the_scan() {
        let mut heap = Heap::new(64);
        let mut symtab = SymbolTable::new(64);
        let (x, vx) = var(&mut heap, &mut symtab, "x");
        let (y, _) = var(&mut heap, &mut symtab, "y");
        let app = heap.allocate().unwrap();
        heap.set_kind(app, NodeKind::App { func: x, arg: y });
        not_free(&mut heap, vx, app, 64).unwrap();
        assert!(!heap.get(app).marker);
        assert!(!heap.get(x).marker);
        assert!(!heap.get(y).marker);
    }
}
