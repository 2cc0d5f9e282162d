//! The node arena.
//!
//! A [`Heap`] is a fixed-capacity vector of [`Node`]s addressed by
//! [`NodeId`]. Unused slots are threaded onto a free list; `allocate` pops
//! the list, and the collector rebuilds it during a sweep. The original
//! threads that free list through the very field (`op2`) it uses for live
//! indirection targets, which works in C but conflates two different
//! meanings of the same byte; here the free list is its own `Vec<NodeId>`,
//! which is simpler to reason about and costs nothing extra since the
//! heap's capacity is fixed anyway.

use log::debug;

use crate::error::{EngineError, Result};
use crate::ids::{NodeId, VarId};
use crate::symtab::Builtin;

/// An arithmetic primitive, recognized by node code 15 in the original.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// A relational primitive, recognized by node code 16 in the original.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RelOp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
}

/// The tagged payload of a heap node.
///
/// This is the sum-type re-expression the design notes call for: the
/// original overloads a signed `code` field so that negative values mean
/// "in-flight alpha-renaming prefix, carrying the fresh variable in `op1`
/// and the old one negated into `code` itself". We give that case its own
/// variant, [`NodeKind::Rename`], instead of stealing bits from a shared
/// integer.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// code 0: a transparent forwarding edge to another node.
    Indirect(NodeId),
    /// code 1: `\bound.body`.
    Abs { bound: VarId, body: NodeId },
    /// code 2: `(func)arg`.
    App { func: NodeId, arg: NodeId },
    /// code 3: list cons `[head | tail]`.
    Cons { head: NodeId, tail: NodeId },
    /// code 4: end of list.
    Nil,
    /// code 5: the `?` fixed-point combinator.
    Y,
    /// code 6: `^`, list head.
    Head,
    /// code 7: `~`, list tail.
    Tail,
    /// code 8: `&`, the cons operator.
    ConsOp,
    /// code 9: an integer literal.
    Int(i64),
    /// code 10: a real literal.
    Real(f64),
    /// code 11 with key 0: an occurrence of a bound or free variable.
    Var(VarId),
    /// code 11 with a nonzero key: an occurrence of a built-in name.
    Builtin(Builtin),
    /// code 15: an arithmetic operator used in prefix/curried position.
    Arith(ArithOp),
    /// code 16: a relational operator used in prefix/curried position.
    Rel(RelOp),
    /// negative code: `{fresh/old}` pending alpha-renaming, to be pushed
    /// through `body` lazily as the reducer descends into it.
    Rename {
        fresh: VarId,
        old: VarId,
        body: NodeId,
    },
}

/// A single arena slot: the node's payload plus the two pieces of scratch
/// state traversals attach to it.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Scratch bit used by every marker-based DFS (`not_free`, `recurve`,
    /// `scope`). Every traversal that sets it must clear it again before
    /// returning, including on an aborted pass.
    pub marker: bool,
    /// Sequence number of the enclosing abstraction, assigned by
    /// [`alpha_standardize`](crate::canon::alpha_standardize). Zero means
    /// "not assigned".
    pub scope: u32,
}

impl Node {
    fn placeholder() -> Self {
        Node {
            kind: NodeKind::Indirect(NodeId::new(0)),
            marker: false,
            scope: 0,
        }
    }
}

/// Fixed-capacity arena of tagged nodes with a free list for reuse.
pub struct Heap {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    capacity: usize,
    /// High-water mark of slots ever handed out since the last full
    /// reinitialization; lets [`Session`](crate::session::Session) skip
    /// rescanning the whole arena between `eval`s when no collection ran.
    high_water: usize,
}

impl Heap {
    pub fn new(capacity: usize) -> Self {
        Heap {
            nodes: Vec::new(),
            free: Vec::new(),
            capacity,
            high_water: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Pop a free slot, growing the backing vector lazily up to capacity.
    /// Returns `None` when both the free list and the unused tail of the
    /// arena are exhausted; the caller (the [`Session`](crate::session::Session))
    /// is responsible for invoking the collector and retrying, per the
    /// allocator's reset-policy contract.
    pub fn allocate(&mut self) -> Option<NodeId> {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = Node::placeholder();
            return Some(id);
        }
        if self.nodes.len() < self.capacity {
            let id = NodeId::new(self.nodes.len() as u32);
            self.nodes.push(Node::placeholder());
            self.high_water = self.nodes.len();
            return Some(id);
        }
        None
    }

    /// Release every node back to the free list and forget the high-water
    /// mark, as if the heap had just been constructed. Used when the
    /// collector had to run on the previous `eval`, so live nodes may be
    /// scattered anywhere in the arena.
    pub fn release_all(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.high_water = 0;
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    /// Follow a run of [`NodeKind::Indirect`] nodes to the first
    /// non-indirection descendant, then rewrite every node visited along the
    /// way to point straight at it (path compression, so subsequent
    /// traversals skip the chain instead of re-walking it).
    pub fn compress(&mut self, start: NodeId) -> NodeId {
        let mut id = start;
        let mut chain = Vec::new();
        let mut steps = 0usize;
        while let NodeKind::Indirect(next) = self.nodes[id.index()].kind {
            chain.push(id);
            id = next;
            steps += 1;
            if steps > self.capacity {
                // A cyclic indirection chain can only arise from a bug
                // upstream; break rather than loop forever.
                break;
            }
        }
        for visited in chain {
            self.nodes[visited.index()].kind = NodeKind::Indirect(id);
        }
        id
    }

    fn mark_live(&mut self, root: NodeId, stack_size: usize) -> Result<Vec<bool>> {
        let mut live = vec![false; self.nodes.len()];
        let mut stack = Vec::with_capacity(64);
        stack.push(root);
        while let Some(id) = stack.pop() {
            if live[id.index()] {
                continue;
            }
            live[id.index()] = true;
            if stack.len() > stack_size {
                return Err(EngineError::PathOverflow { limit: stack_size });
            }
            match &self.nodes[id.index()].kind {
                NodeKind::Indirect(t) => stack.push(*t),
                NodeKind::Abs { body, .. } => stack.push(*body),
                NodeKind::App { func, arg } => {
                    stack.push(*func);
                    stack.push(*arg);
                }
                NodeKind::Cons { head, tail } => {
                    stack.push(*head);
                    stack.push(*tail);
                }
                NodeKind::Rename { body, .. } => stack.push(*body),
                NodeKind::Nil
                | NodeKind::Y
                | NodeKind::Head
                | NodeKind::Tail
                | NodeKind::ConsOp
                | NodeKind::Int(_)
                | NodeKind::Real(_)
                | NodeKind::Var(_)
                | NodeKind::Builtin(_)
                | NodeKind::Arith(_)
                | NodeKind::Rel(_) => {}
            }
        }
        Ok(live)
    }

    /// Mark-and-sweep: reachability is computed fresh from `root`, then
    /// every unmarked slot is reclaimed onto the free list in ascending
    /// index order (so successive allocations reuse low indices first,
    /// matching the original's sweep direction).
    pub fn collect(&mut self, root: NodeId, stack_size: usize) -> Result<()> {
        let live = self.mark_live(root, stack_size)?;
        self.free.clear();
        for (idx, is_live) in live.iter().enumerate().rev() {
            if !is_live {
                self.nodes[idx] = Node::placeholder();
                self.free.push(NodeId::new(idx as u32));
            }
        }
        debug!(
            "collect: reclaimed {} of {} nodes",
            self.free.len(),
            self.nodes.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_exhausts_capacity_then_returns_none() {
        let mut heap = Heap::new(2);
        assert!(heap.allocate().is_some());
        assert!(heap.allocate().is_some());
        assert!(heap.allocate().is_none());
    }

    #[test]
    fn freed_slots_are_reused_before_growing() {
        let mut heap = Heap::new(3);
        let a = heap.allocate().unwrap();
        let garbage = heap.allocate().unwrap();
        heap.set_kind(a, NodeKind::Nil);
        heap.set_kind(garbage, NodeKind::Nil);
        // Only `a` is reachable, so the sweep frees `garbage`'s slot.
        heap.collect(a, 64).unwrap();
        // The freed slot is handed back out before the arena grows.
        let reused = heap.allocate().unwrap();
        assert_eq!(reused, garbage);
        // Only one unused slot remains in the capacity-3 arena.
        assert!(heap.allocate().is_some());
        assert!(heap.allocate().is_none());
    }

    #[test]
    fn collect_reclaims_unreachable_nodes() {
        let mut heap = Heap::new(3);
        let root = heap.allocate().unwrap();
        let garbage = heap.allocate().unwrap();
        heap.set_kind(root, NodeKind::Nil);
        heap.set_kind(garbage, NodeKind::Nil);
        heap.collect(root, 64).unwrap();
        // Only `garbage` should have been reclaimed, so exactly one more
        // slot can be allocated before the heap of capacity 3 is full.
        assert!(heap.allocate().is_some());
        assert!(heap.allocate().is_none());
    }

    #[test]
    fn compress_follows_indirection_chains_and_rewrites_them() {
        let mut heap = Heap::new(4);
        let target = heap.allocate().unwrap();
        heap.set_kind(target, NodeKind::Nil);
        let middle = heap.allocate().unwrap();
        heap.set_kind(middle, NodeKind::Indirect(target));
        let start = heap.allocate().unwrap();
        heap.set_kind(start, NodeKind::Indirect(middle));

        let resolved = heap.compress(start);
        assert_eq!(resolved, target);
        assert!(matches!(heap.kind(start), NodeKind::Indirect(t) if *t == target));
    }
}
