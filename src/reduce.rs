//! The normal-order graph reducer.
//!
//! This is the hard part: a state machine over node shapes that performs
//! leftmost-outermost reduction directly on the shared graph, so that work
//! done reducing one occurrence of a shared subterm is visible to every
//! other reference to it. The original encodes this as an explicit `path`
//! array and a `go_back` backtracking routine because C gives it no safe,
//! sufficiently deep call stack for untrusted input. Rust's call stack,
//! paired with an explicit depth counter checked against `stack_size`, plays
//! the same role without the hand-rolled ancestor array: `whnf`'s recursive
//! calls into a function's operand position *are* the path, and the depth
//! counter is `go_back`'s overflow check turned into an ordinary guard.
//!
//! Two traversal shapes recur throughout: driving a node to weak head
//! normal form (`whnf`, reducing only what's needed to discover the
//! outermost shape), and driving a whole term to full normal form
//! (`normalize`, which additionally recurses into the children of whatever
//! `whnf` returns). Every primitive and every beta/gamma rule is expressed
//! as a rewrite of the focus node's `NodeKind` in place, exactly as the
//! original mutates `n1` rather than allocating a fresh result node for
//! sharing-preserving steps.

use crate::canon::alpha_standardize;
use crate::config::SessionConfig;
use crate::error::{EngineError, Result};
use crate::free_vars::not_free;
use crate::heap::{ArithOp, Heap, NodeKind, RelOp};
use crate::ids::{NodeId, VarId};
use crate::printer::print_node;
use crate::symtab::{Arity, Builtin, SymbolTable};

/// Where `show`/`more` write their side-effecting output. Keeping this a
/// trait object (rather than hard-coding `stdout`) is what lets the
/// regression harness and the library's own tests capture output instead of
/// racing the terminal.
pub trait OutputSink {
    fn emit(&mut self, text: &str);
}

impl OutputSink for String {
    fn emit(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// Drives one `eval` to normal form against a shared heap and symbol table.
///
/// A fresh `Reducer` is built per top-level `eval`; `sys_var` (the fresh
/// variable supply for beta-3 renaming) does not need to survive across
/// `eval`s, since each one reduces an independent root.
pub struct Reducer<'a> {
    heap: &'a mut Heap,
    symtab: &'a mut SymbolTable,
    cfg: &'a SessionConfig,
    sink: &'a mut dyn OutputSink,
    cycles: usize,
    next_fresh: u32,
}

impl<'a> Reducer<'a> {
    pub fn new(
        heap: &'a mut Heap,
        symtab: &'a mut SymbolTable,
        cfg: &'a SessionConfig,
        sink: &'a mut dyn OutputSink,
    ) -> Self {
        Reducer {
            heap,
            symtab,
            cfg,
            sink,
            cycles: 0,
            next_fresh: 0,
        }
    }

    fn tick(&mut self) -> Result<()> {
        self.cycles += 1;
        if self.cycles > self.cfg.cycle_limit {
            return Err(EngineError::CycleLimit {
                limit: self.cfg.cycle_limit,
            });
        }
        Ok(())
    }

    fn fresh(&mut self) -> VarId {
        self.next_fresh += 1;
        VarId::Fresh(self.next_fresh)
    }

    fn alloc(&mut self, kind: NodeKind) -> Result<NodeId> {
        if let Some(id) = self.heap.allocate() {
            self.heap.set_kind(id, kind);
            return Ok(id);
        }
        Err(EngineError::SpaceLimit {
            limit: self.heap.capacity(),
        })
    }

    fn not_free(&mut self, v: VarId, root: NodeId) -> Result<bool> {
        not_free(self.heap, v, root, self.cfg.stack_size)
    }

    /// Structurally copy `node`, allocating fresh container nodes so that
    /// the copy can be reduced independently of the original. Leaves are
    /// shared rather than copied since they carry no side effects of their
    /// own; only re-entering a `show`/`more` chain, or re-running `map`
    /// over the same spine, has an observable duplicate effect, and those
    /// all live under fresh `App`/`Cons` nodes this produces.
    fn deep_copy(&mut self, node: NodeId, depth: usize) -> Result<NodeId> {
        if depth > self.cfg.stack_size {
            return Err(EngineError::PathOverflow {
                limit: self.cfg.stack_size,
            });
        }
        let id = self.heap.compress(node);
        match self.heap.kind(id).clone() {
            NodeKind::App { func, arg } => {
                let f = self.deep_copy(func, depth + 1)?;
                let a = self.deep_copy(arg, depth + 1)?;
                self.alloc(NodeKind::App { func: f, arg: a })
            }
            NodeKind::Abs { bound, body } => {
                let b = self.deep_copy(body, depth + 1)?;
                self.alloc(NodeKind::Abs { bound, body: b })
            }
            NodeKind::Cons { head, tail } => {
                let h = self.deep_copy(head, depth + 1)?;
                let t = self.deep_copy(tail, depth + 1)?;
                self.alloc(NodeKind::Cons { head: h, tail: t })
            }
            NodeKind::Rename { fresh, old, body } => {
                let b = self.deep_copy(body, depth + 1)?;
                self.alloc(NodeKind::Rename {
                    fresh,
                    old,
                    body: b,
                })
            }
            _ => Ok(id),
        }
    }

    /// Drive `node` to full normal form: weak head normal form, then
    /// recursively normalize whatever children remain.
    pub fn normalize(&mut self, node: NodeId, depth: usize) -> Result<NodeId> {
        if depth > self.cfg.stack_size {
            return Err(EngineError::PathOverflow {
                limit: self.cfg.stack_size,
            });
        }
        let whnf_id = self.whnf(node, depth)?;
        match self.heap.kind(whnf_id).clone() {
            NodeKind::Abs { bound, body } => {
                let nbody = self.normalize(body, depth + 1)?;
                self.heap.set_kind(whnf_id, NodeKind::Abs { bound, body: nbody });
            }
            NodeKind::App { func, arg } => {
                let nfunc = self.normalize(func, depth + 1)?;
                let narg = self.normalize(arg, depth + 1)?;
                self.heap.set_kind(
                    whnf_id,
                    NodeKind::App {
                        func: nfunc,
                        arg: narg,
                    },
                );
            }
            NodeKind::Cons { head, tail } => {
                let nhead = self.normalize(head, depth + 1)?;
                let ntail = self.normalize(tail, depth + 1)?;
                self.heap.set_kind(
                    whnf_id,
                    NodeKind::Cons {
                        head: nhead,
                        tail: ntail,
                    },
                );
            }
            _ => {}
        }
        Ok(whnf_id)
    }

    /// Reduce `node` until its outermost shape is no longer a redex.
    fn whnf(&mut self, node: NodeId, depth: usize) -> Result<NodeId> {
        if depth > self.cfg.stack_size {
            return Err(EngineError::PathOverflow {
                limit: self.cfg.stack_size,
            });
        }
        let mut focus = self.heap.compress(node);
        loop {
            self.tick()?;
            focus = self.heap.compress(focus);
            match self.heap.kind(focus).clone() {
                NodeKind::Rename { fresh, old, body } => {
                    self.step_alpha(focus, fresh, old, body, depth)?;
                }
                NodeKind::App { func, arg } => {
                    let func_whnf = self.whnf(func, depth + 1)?;
                    if self.step_app(focus, func_whnf, arg, depth)? {
                        // focus rewritten to a non-redex shape (Abs, Cons,
                        // a leaf, or a stuck application); stop.
                        break;
                    }
                    // otherwise focus was rewritten to a new redex; loop.
                }
                _ => break,
            }
        }
        Ok(focus)
    }

    /// Resolve one in-flight alpha-renaming prefix `{fresh/old}` around
    /// `body`, per rules α1-α5.
    fn step_alpha(
        &mut self,
        focus: NodeId,
        fresh: VarId,
        old: VarId,
        body: NodeId,
        depth: usize,
    ) -> Result<()> {
        let body_id = self.heap.compress(body);
        match self.heap.kind(body_id).clone() {
            NodeKind::Var(v) if v == old => {
                // alpha-1
                self.heap.set_kind(focus, NodeKind::Var(fresh));
            }
            _ if self.not_free(old, body_id)? => {
                // alpha-2
                self.heap.set_kind(focus, NodeKind::Indirect(body_id));
            }
            NodeKind::Abs { bound: y, body: b } if y != old => {
                // alpha-3
                let pushed = self.alloc(NodeKind::Rename {
                    fresh,
                    old,
                    body: b,
                })?;
                self.heap.set_kind(focus, NodeKind::Abs { bound: y, body: pushed });
            }
            NodeKind::Abs { .. } => {
                // y == old: old is shadowed below this abstraction, so the
                // renaming prefix has nothing left to rename.
                self.heap.set_kind(focus, NodeKind::Indirect(body_id));
            }
            NodeKind::App { func, arg } => {
                // alpha-4
                let rf = self.fresh_rename(fresh, old, func, depth)?;
                let ra = self.fresh_rename(fresh, old, arg, depth)?;
                self.heap.set_kind(focus, NodeKind::App { func: rf, arg: ra });
            }
            NodeKind::Cons { head, tail } => {
                // alpha-5
                let rh = self.fresh_rename(fresh, old, head, depth)?;
                let rt = self.fresh_rename(fresh, old, tail, depth)?;
                self.heap.set_kind(focus, NodeKind::Cons { head: rh, tail: rt });
            }
            _ => {
                // A leaf can't possibly contain `old` free; not_free already
                // catches this via the alpha-2 arm above, so this is
                // unreachable in practice.
                self.heap.set_kind(focus, NodeKind::Indirect(body_id));
            }
        }
        Ok(())
    }

    fn fresh_rename(&mut self, fresh: VarId, old: VarId, body: NodeId, _depth: usize) -> Result<NodeId> {
        self.alloc(NodeKind::Rename { fresh, old, body })
    }

    /// Resolve `focus = App(func_whnf, arg)` where `func_whnf` is already in
    /// weak head normal form. Returns `Ok(true)` once `focus` holds a
    /// non-redex shape.
    fn step_app(&mut self, focus: NodeId, func_whnf: NodeId, arg: NodeId, depth: usize) -> Result<bool> {
        match self.heap.kind(func_whnf).clone() {
            NodeKind::Abs { bound, body } => {
                self.apply_abs(focus, func_whnf, bound, body, arg, depth)?;
                Ok(false)
            }
            NodeKind::Y => {
                // Y f --> (f)(Y f), built as a genuine cycle: focus becomes
                // its own argument.
                self.heap.set_kind(
                    focus,
                    NodeKind::App {
                        func: arg,
                        arg: focus,
                    },
                );
                Ok(false)
            }
            NodeKind::Head => {
                let target = self.whnf(arg, depth + 1)?;
                match self.heap.kind(target).clone() {
                    NodeKind::Cons { head, .. } => {
                        self.heap.set_kind(focus, NodeKind::Indirect(head));
                        Ok(false)
                    }
                    _ => Err(EngineError::WrongExprForHeadTail),
                }
            }
            NodeKind::Tail => {
                let target = self.whnf(arg, depth + 1)?;
                match self.heap.kind(target).clone() {
                    NodeKind::Cons { tail, .. } => {
                        self.heap.set_kind(focus, NodeKind::Indirect(tail));
                        Ok(false)
                    }
                    _ => Err(EngineError::WrongExprForHeadTail),
                }
            }
            NodeKind::ConsOp | NodeKind::Arith(_) | NodeKind::Rel(_) => Ok(true),
            NodeKind::Builtin(b) => match b.arity() {
                Arity::Unary => self.apply_unary(focus, b, arg, depth),
                Arity::Binary => Ok(true),
            },
            NodeKind::App { func: inner_func, arg: first_arg } => {
                self.step_binary(focus, inner_func, first_arg, arg, depth)
            }
            _ => Ok(true),
        }
    }

    /// β-rules: `focus = (\bound.body) arg`, with `func_whnf` the
    /// abstraction node (reused in place for β3/β4's reconstructed
    /// abstraction).
    fn apply_abs(
        &mut self,
        focus: NodeId,
        abs_id: NodeId,
        bound: VarId,
        body: NodeId,
        arg: NodeId,
        depth: usize,
    ) -> Result<()> {
        let body_id = self.heap.compress(body);
        match self.heap.kind(body_id).clone() {
            NodeKind::Var(v) if v == bound => {
                // beta-1
                self.heap.set_kind(focus, NodeKind::Indirect(arg));
            }
            _ if self.not_free(bound, body_id)? => {
                // beta-2 (and, trivially, gamma-0 when body_id is Nil)
                self.heap.set_kind(focus, NodeKind::Indirect(body_id));
            }
            NodeKind::Abs { bound: y, body: m2 } => {
                // beta-3 / beta-3p
                let (y2, m2p) = if self.not_free(y, arg)? {
                    (y, m2)
                } else {
                    let z = self.fresh();
                    let renamed = self.alloc(NodeKind::Rename {
                        fresh: z,
                        old: y,
                        body: m2,
                    })?;
                    (z, renamed)
                };
                self.heap.set_kind(abs_id, NodeKind::Abs { bound, body: m2p });
                let inner_app = self.alloc(NodeKind::App {
                    func: abs_id,
                    arg,
                })?;
                self.heap.set_kind(
                    focus,
                    NodeKind::Abs {
                        bound: y2,
                        body: inner_app,
                    },
                );
            }
            NodeKind::App { func: p, arg: q } => {
                // beta-4 / beta-4p
                if self.not_free(bound, p)? {
                    self.heap.set_kind(abs_id, NodeKind::Abs { bound, body: q });
                    let inner_app = self.alloc(NodeKind::App { func: abs_id, arg })?;
                    self.heap.set_kind(focus, NodeKind::App { func: p, arg: inner_app });
                } else {
                    let arg2 = self.deep_copy(arg, depth + 1)?;
                    let abs_p = self.alloc(NodeKind::Abs { bound, body: p })?;
                    let abs_q = self.alloc(NodeKind::Abs { bound, body: q })?;
                    let app_p = self.alloc(NodeKind::App { func: abs_p, arg })?;
                    let app_q = self.alloc(NodeKind::App { func: abs_q, arg: arg2 })?;
                    self.heap.set_kind(focus, NodeKind::App { func: app_p, arg: app_q });
                }
            }
            NodeKind::Cons { head: h, tail: t } => {
                // gamma-2, generalized with an argument: distribute `bound`
                // and `arg` into both list elements. Cons elements are
                // symmetric (unlike an application's function/argument
                // split), so there is no push-into-one-side shortcut here.
                let arg2 = self.deep_copy(arg, depth + 1)?;
                let abs_h = self.alloc(NodeKind::Abs { bound, body: h })?;
                let abs_t = self.alloc(NodeKind::Abs { bound, body: t })?;
                let app_h = self.alloc(NodeKind::App { func: abs_h, arg })?;
                let app_t = self.alloc(NodeKind::App { func: abs_t, arg: arg2 })?;
                self.heap.set_kind(focus, NodeKind::Cons { head: app_h, tail: app_t });
            }
            NodeKind::Rename { .. } => return Err(EngineError::WrongRenaming),
            _ => {
                // Every other shape is a leaf incapable of containing
                // `bound` free, so `not_free` above always takes it first.
                unreachable!("not_free should have already handled this leaf shape")
            }
        }
        Ok(())
    }

    fn apply_unary(&mut self, focus: NodeId, b: Builtin, arg: NodeId, depth: usize) -> Result<bool> {
        match b {
            Builtin::Pred | Builtin::Succ => {
                let v = self.whnf(arg, depth + 1)?;
                match self.heap.kind(v).clone() {
                    NodeKind::Int(n) => {
                        let delta = if b == Builtin::Pred { -1 } else { 1 };
                        self.heap.set_kind(focus, NodeKind::Int(n + delta));
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForPredSucc),
                }
            }
            Builtin::Zero => {
                let v = self.whnf(arg, depth + 1)?;
                match self.heap.kind(v).clone() {
                    NodeKind::Int(n) => {
                        self.heap.set_kind(focus, NodeKind::Builtin(bool_builtin(n == 0)));
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForZero),
                }
            }
            Builtin::Null => {
                let v = self.whnf(arg, depth + 1)?;
                match self.heap.kind(v).clone() {
                    NodeKind::Nil => {
                        self.heap.set_kind(focus, NodeKind::Builtin(Builtin::True));
                        Ok(true)
                    }
                    NodeKind::Cons { .. } => {
                        self.heap.set_kind(focus, NodeKind::Builtin(Builtin::False));
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForNull),
                }
            }
            Builtin::Add | Builtin::Sub | Builtin::Mult | Builtin::Div => {
                let op = match b {
                    Builtin::Add => ArithOp::Add,
                    Builtin::Sub => ArithOp::Sub,
                    Builtin::Mult => ArithOp::Mul,
                    Builtin::Div => ArithOp::Div,
                    _ => unreachable!(),
                };
                let start = if matches!(op, ArithOp::Add | ArithOp::Sub) {
                    Num::I(0)
                } else {
                    Num::I(1)
                };
                let list = self.whnf(arg, depth + 1)?;
                let result = self.fold_list_arith(op, start, list, depth + 1)?;
                self.set_num(focus, result);
                Ok(true)
            }
            Builtin::Iota => {
                let v = self.whnf(arg, depth + 1)?;
                match self.heap.kind(v).clone() {
                    NodeKind::Int(n) if n >= 0 => {
                        let list = self.build_iota(n)?;
                        self.heap.set_kind(focus, NodeKind::Indirect(list));
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForIota),
                }
            }
            Builtin::Not => {
                let v = self.whnf(arg, depth + 1)?;
                match self.heap.kind(v).clone() {
                    NodeKind::Builtin(Builtin::True) => {
                        self.heap.set_kind(focus, NodeKind::Builtin(Builtin::False));
                        Ok(true)
                    }
                    NodeKind::Builtin(Builtin::False) => {
                        self.heap.set_kind(focus, NodeKind::Builtin(Builtin::True));
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForNot),
                }
            }
            Builtin::Show | Builtin::More => self.apply_show(focus, arg, depth),
            Builtin::True | Builtin::False | Builtin::And | Builtin::Or | Builtin::Map | Builtin::Append => {
                unreachable!("binary/nullary builtins never reach apply_unary")
            }
        }
    }

    fn apply_show(&mut self, focus: NodeId, arg: NodeId, depth: usize) -> Result<bool> {
        let list = self.whnf(arg, depth + 1)?;
        match self.heap.kind(list).clone() {
            NodeKind::Nil => {
                self.heap.set_kind(focus, NodeKind::Nil);
                Ok(true)
            }
            NodeKind::Cons { head, tail } => {
                let normalized_head = self.normalize(head, depth + 1)?;
                let text = print_node(
                    self.heap,
                    self.symtab,
                    normalized_head,
                    false,
                    self.cfg.standard_variable,
                    self.cfg.stack_size,
                )?;
                self.sink.emit(&text);
                self.sink.emit(" ");
                let more_builtin = self.builtin_node(Builtin::More)?;
                let more_app = self.alloc(NodeKind::App {
                    func: more_builtin,
                    arg: tail,
                })?;
                self.heap.set_kind(focus, NodeKind::Indirect(more_app));
                Ok(false)
            }
            _ => Err(EngineError::WrongExprForSelection),
        }
    }

    fn builtin_node(&mut self, b: Builtin) -> Result<NodeId> {
        self.alloc(NodeKind::Builtin(b))
    }

    /// Resolve the second application of a two-argument primitive:
    /// `focus = App(App(inner_func, first_arg), arg)`.
    fn step_binary(
        &mut self,
        focus: NodeId,
        inner_func: NodeId,
        first_arg: NodeId,
        arg: NodeId,
        depth: usize,
    ) -> Result<bool> {
        let inner = self.heap.compress(inner_func);
        match self.heap.kind(inner).clone() {
            NodeKind::Builtin(Builtin::True) => {
                self.heap.set_kind(focus, NodeKind::Indirect(first_arg));
                Ok(false)
            }
            NodeKind::Builtin(Builtin::False) => {
                self.heap.set_kind(focus, NodeKind::Indirect(arg));
                Ok(false)
            }
            NodeKind::ConsOp => {
                self.heap.set_kind(
                    focus,
                    NodeKind::Cons {
                        head: first_arg,
                        tail: arg,
                    },
                );
                Ok(true)
            }
            NodeKind::Arith(op) => {
                let a = self.whnf(first_arg, depth + 1)?;
                let b = self.whnf(arg, depth + 1)?;
                let na = as_num(self.heap.kind(a)).ok_or(EngineError::WrongOperandForArithmetic("left operand is not numeric"))?;
                let nb = as_num(self.heap.kind(b)).ok_or(EngineError::WrongOperandForArithmetic("right operand is not numeric"))?;
                let result = fold_arith(op, na, nb)?;
                self.set_num(focus, result);
                Ok(true)
            }
            NodeKind::Rel(op) => {
                let a = self.whnf(first_arg, depth + 1)?;
                let b = self.whnf(arg, depth + 1)?;
                let na = as_num(self.heap.kind(a)).ok_or(EngineError::WrongOperandForComparison("left operand is not numeric"))?;
                let nb = as_num(self.heap.kind(b)).ok_or(EngineError::WrongOperandForComparison("right operand is not numeric"))?;
                let truth = fold_rel(op, na, nb);
                self.heap.set_kind(focus, NodeKind::Builtin(bool_builtin(truth)));
                Ok(true)
            }
            NodeKind::Builtin(Builtin::And) | NodeKind::Builtin(Builtin::Or) => {
                let is_and = matches!(self.heap.kind(inner), NodeKind::Builtin(Builtin::And));
                let a = self.whnf(first_arg, depth + 1)?;
                let av = as_bool(self.heap.kind(a)).ok_or(EngineError::WrongFirstOperandForAndOr)?;
                let b = self.whnf(arg, depth + 1)?;
                let bv = as_bool(self.heap.kind(b)).ok_or(EngineError::WrongSecondOperandForAndOr)?;
                let truth = if is_and { av && bv } else { av || bv };
                self.heap.set_kind(focus, NodeKind::Builtin(bool_builtin(truth)));
                Ok(true)
            }
            NodeKind::Builtin(Builtin::Map) => {
                let xs = self.whnf(arg, depth + 1)?;
                match self.heap.kind(xs).clone() {
                    NodeKind::Nil => {
                        self.heap.set_kind(focus, NodeKind::Nil);
                        Ok(true)
                    }
                    NodeKind::Cons { head, tail } => {
                        let mapped_head = self.alloc(NodeKind::App {
                            func: first_arg,
                            arg: head,
                        })?;
                        let map_again = self.alloc(NodeKind::App {
                            func: inner,
                            arg: first_arg,
                        })?;
                        let mapped_tail = self.alloc(NodeKind::App {
                            func: map_again,
                            arg: tail,
                        })?;
                        self.heap.set_kind(
                            focus,
                            NodeKind::Cons {
                                head: mapped_head,
                                tail: mapped_tail,
                            },
                        );
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongArgumentForMap),
                }
            }
            NodeKind::Builtin(Builtin::Append) => {
                let xs = self.whnf(first_arg, depth + 1)?;
                match self.heap.kind(xs).clone() {
                    NodeKind::Nil => {
                        self.heap.set_kind(focus, NodeKind::Indirect(arg));
                        Ok(true)
                    }
                    NodeKind::Cons { head, tail } => {
                        let append_again = self.alloc(NodeKind::App {
                            func: inner,
                            arg: tail,
                        })?;
                        let rest = self.alloc(NodeKind::App {
                            func: append_again,
                            arg,
                        })?;
                        self.heap.set_kind(focus, NodeKind::Cons { head, tail: rest });
                        Ok(true)
                    }
                    _ => Err(EngineError::WrongOperandForAppend),
                }
            }
            _ => Ok(true),
        }
    }

    fn fold_list_arith(&mut self, op: ArithOp, start: Num, list: NodeId, depth: usize) -> Result<Num> {
        if depth > self.cfg.stack_size {
            return Err(EngineError::PathOverflow {
                limit: self.cfg.stack_size,
            });
        }
        match self.heap.kind(list).clone() {
            NodeKind::Nil => Ok(start),
            NodeKind::Cons { head, tail } => {
                let h = self.whnf(head, depth + 1)?;
                let n = as_num(self.heap.kind(h)).ok_or(EngineError::WrongOperandForListArithmetic)?;
                let acc = fold_arith(op, start, n)?;
                let t = self.whnf(tail, depth + 1)?;
                self.fold_list_arith(op, acc, t, depth + 1)
            }
            _ => Err(EngineError::WrongOperandForListArithmetic),
        }
    }

    fn build_iota(&mut self, n: i64) -> Result<NodeId> {
        let mut tail = self.alloc(NodeKind::Nil)?;
        for i in (1..=n).rev() {
            let head = self.alloc(NodeKind::Int(i))?;
            tail = self.alloc(NodeKind::Cons { head, tail })?;
        }
        Ok(tail)
    }

    fn set_num(&mut self, focus: NodeId, n: Num) {
        match n {
            Num::I(i) => self.heap.set_kind(focus, NodeKind::Int(i)),
            Num::R(r) => self.heap.set_kind(focus, NodeKind::Real(r)),
        }
    }

    /// Run `alpha_standardize` over the already-normalized result, the step
    /// `standardize` and `reduce_lambda`-for-printing both need.
    pub fn standardize(&mut self, root: NodeId) -> Result<()> {
        alpha_standardize(self.heap, root, self.cfg.stack_size)
    }
}

#[derive(Copy, Clone)]
enum Num {
    I(i64),
    R(f64),
}

fn as_num(kind: &NodeKind) -> Option<Num> {
    match kind {
        NodeKind::Int(n) => Some(Num::I(*n)),
        NodeKind::Real(r) => Some(Num::R(*r)),
        _ => None,
    }
}

fn as_bool(kind: &NodeKind) -> Option<bool> {
    match kind {
        NodeKind::Builtin(Builtin::True) => Some(true),
        NodeKind::Builtin(Builtin::False) => Some(false),
        _ => None,
    }
}

fn bool_builtin(v: bool) -> Builtin {
    if v {
        Builtin::True
    } else {
        Builtin::False
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::I(i) => i as f64,
        Num::R(r) => r,
    }
}

fn fold_arith(op: ArithOp, a: Num, b: Num) -> Result<Num> {
    Ok(match (a, b) {
        (Num::I(x), Num::I(y)) => Num::I(match op {
            ArithOp::Add => x + y,
            ArithOp::Sub => x - y,
            ArithOp::Mul => x * y,
            ArithOp::Div => {
                if y == 0 {
                    return Err(EngineError::WrongOperandForArithmetic("division by zero"));
                }
                x / y
            }
        }),
        (x, y) => {
            let (fx, fy) = (to_f64(x), to_f64(y));
            Num::R(match op {
                ArithOp::Add => fx + fy,
                ArithOp::Sub => fx - fy,
                ArithOp::Mul => fx * fy,
                ArithOp::Div => fx / fy,
            })
        }
    })
}

fn fold_rel(op: RelOp, a: Num, b: Num) -> bool {
    let (x, y) = (to_f64(a), to_f64(b));
    match op {
        RelOp::Eq => x == y,
        RelOp::Lt => x < y,
        RelOp::Gt => x > y,
        RelOp::Le => x <= y,
        RelOp::Ge => x >= y,
        RelOp::Ne => x != y,
    }
}

