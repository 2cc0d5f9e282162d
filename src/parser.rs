//! Recursive-descent parser.
//!
//! The original is an operator-precedence-free shift/reduce machine over an
//! explicit stack of `(symbol, heap-index)` pairs -- a shape forced by C's
//! lack of a call stack deep enough to trust for untrusted input, and by the
//! absence of a borrow checker to keep recursive helpers honest about which
//! node they are allowed to mutate. Neither constraint applies here: the
//! grammar is a small, genuinely recursive one (an application's function
//! position is itself an `expr`), so a recursive-descent parser over the
//! token stream is the idiomatic shape, with an explicit depth counter
//! standing in for the original's stack-overflow check.
//!
//! Every production allocates its heap nodes as it recognizes them, exactly
//! as the original does; there is no separate AST stage.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{EngineError, Result};
use crate::heap::{ArithOp, Heap, NodeKind, RelOp};
use crate::ids::{NodeId, Symbol, VarId};
use crate::lexer::{Lexer, Token};
use crate::symtab::SymbolTable;

/// One top-level command: an expression to reduce and print, or a named
/// definition that extends the session's sharing environment.
#[derive(Clone, Debug)]
pub enum Command {
    Eval(NodeId),
    Let(Symbol, NodeId),
}

/// Parse a full program (`(command ';')*`), threading allocations through
/// `heap` and identifier interning through `symtab`.
///
/// `lets` carries forward the sharing environment built by earlier `let`
/// commands in the same call, so that an `eval` can reference a definition
/// from a prior source chunk within the same `reduce_lambda` invocation.
pub fn parse_program(
    src: &str,
    heap: &mut Heap,
    symtab: &mut SymbolTable,
    lets: &mut FxHashMap<Symbol, NodeId>,
    name_length: usize,
    stack_size: usize,
) -> Result<Vec<Command>> {
    let mut parser = Parser {
        lexer: Lexer::new(src, name_length),
        lookahead: None,
        heap,
        symtab,
        lets,
        stack_size,
    };
    parser.parse_program()
}

/// Parse a single expression (no `eval`/`let` wrapper, no trailing `;`),
/// for the collaborators that hand the core a bare term: `standardize`,
/// `bind_all_free_vars`, and `Free_Variables` all parse one expression
/// rather than a program of commands.
pub fn parse_bare_expr(
    src: &str,
    heap: &mut Heap,
    symtab: &mut SymbolTable,
    lets: &mut FxHashMap<Symbol, NodeId>,
    name_length: usize,
    stack_size: usize,
) -> Result<NodeId> {
    let mut parser = Parser {
        lexer: Lexer::new(src, name_length),
        lookahead: None,
        heap,
        symtab,
        lets,
        stack_size,
    };
    let expr = parser.parse_expr(0)?;
    if *parser.peek()? != Token::Eof {
        let trailing = parser.bump()?;
        return Err(EngineError::Parse(format!(
            "unexpected {trailing} after expression"
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<Token>,
    heap: &'a mut Heap,
    symtab: &'a mut SymbolTable,
    lets: &'a mut FxHashMap<Symbol, NodeId>,
    stack_size: usize,
}

impl<'a> Parser<'a> {
    fn peek(&mut self) -> Result<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lexer.next_token()?);
        }
        Ok(self.lookahead.as_ref().unwrap())
    }

    fn bump(&mut self) -> Result<Token> {
        self.peek()?;
        Ok(self.lookahead.take().unwrap())
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        let got = self.bump()?;
        if &got == expected {
            Ok(())
        } else {
            Err(EngineError::Parse(format!(
                "expected {expected}, found {got}"
            )))
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> Result<NodeId> {
        let id = self
            .heap
            .allocate()
            .ok_or(EngineError::SpaceLimit { limit: self.heap.capacity() })?;
        self.heap.set_kind(id, kind);
        Ok(id)
    }

    fn parse_program(&mut self) -> Result<Vec<Command>> {
        let mut commands = Vec::new();
        loop {
            if *self.peek()? == Token::Eof {
                break;
            }
            commands.push(self.parse_command()?);
            self.expect(&Token::Semi)?;
        }
        Ok(commands)
    }

    fn parse_command(&mut self) -> Result<Command> {
        match self.bump()? {
            Token::Eval => {
                let expr = self.parse_expr(0)?;
                Ok(Command::Eval(expr))
            }
            Token::Let => {
                let name = self.parse_plain_ident()?;
                let sym = self.symtab.locate(&name)?;
                let underscore = self.parse_plain_ident()?;
                if underscore != "_" {
                    return Err(EngineError::Parse(
                        "expected `_` between `let` binder and definition".to_string(),
                    ));
                }
                let body = self.parse_expr(0)?;
                recurve(self.heap, VarId::User(sym), body, body, self.stack_size)?;
                self.lets.insert(sym, body);
                Ok(Command::Let(sym, body))
            }
            other => Err(EngineError::Parse(format!(
                "expected `eval` or `let`, found {other}"
            ))),
        }
    }

    fn parse_plain_ident(&mut self) -> Result<String> {
        match self.bump()? {
            Token::Ident(s) => Ok(s),
            other => Err(EngineError::Parse(format!("expected identifier, found {other}"))),
        }
    }

    fn parse_expr(&mut self, depth: usize) -> Result<NodeId> {
        if depth > self.stack_size {
            return Err(EngineError::PathOverflow { limit: self.stack_size });
        }
        match self.bump()? {
            Token::Lambda => {
                let name = self.parse_plain_ident()?;
                let sym = self.symtab.locate(&name)?;
                self.expect(&Token::Dot)?;
                let body = self.parse_expr(depth + 1)?;
                self.alloc(NodeKind::Abs {
                    bound: VarId::User(sym),
                    body,
                })
            }
            Token::LParen => {
                let func = self.parse_expr(depth + 1)?;
                self.expect(&Token::RParen)?;
                let arg = self.parse_expr(depth + 1)?;
                self.alloc(NodeKind::App { func, arg })
            }
            Token::LBracket => self.parse_list(depth),
            Token::Int(n) => self.alloc(NodeKind::Int(n)),
            Token::Real(n) => self.alloc(NodeKind::Real(n)),
            Token::Question => self.alloc(NodeKind::Y),
            Token::Caret => self.alloc(NodeKind::Head),
            Token::Tilde => self.alloc(NodeKind::Tail),
            Token::Amp => self.alloc(NodeKind::ConsOp),
            Token::Plus => self.alloc(NodeKind::Arith(ArithOp::Add)),
            Token::Minus => self.alloc(NodeKind::Arith(ArithOp::Sub)),
            Token::Star => self.alloc(NodeKind::Arith(ArithOp::Mul)),
            Token::Slash => self.alloc(NodeKind::Arith(ArithOp::Div)),
            Token::Eq => self.alloc(NodeKind::Rel(RelOp::Eq)),
            Token::Lt => self.alloc(NodeKind::Rel(RelOp::Lt)),
            Token::Gt => self.alloc(NodeKind::Rel(RelOp::Gt)),
            Token::Le => self.alloc(NodeKind::Rel(RelOp::Le)),
            Token::Ge => self.alloc(NodeKind::Rel(RelOp::Ge)),
            Token::Ne => self.alloc(NodeKind::Rel(RelOp::Ne)),
            Token::Ident(name) => self.parse_ident_expr(name),
            other => Err(EngineError::Parse(format!("unexpected {other} in expression"))),
        }
    }

    fn parse_ident_expr(&mut self, name: String) -> Result<NodeId> {
        let sym = self.symtab.locate(&name)?;
        if let Some(&def_root) = self.lets.get(&sym) {
            return self.alloc(NodeKind::Indirect(def_root));
        }
        if let Some(builtin) = self.symtab.builtin_of(sym) {
            return self.alloc(NodeKind::Builtin(builtin));
        }
        self.alloc(NodeKind::Var(VarId::User(sym)))
    }

    fn parse_list(&mut self, depth: usize) -> Result<NodeId> {
        if *self.peek()? == Token::RBracket {
            self.bump()?;
            return self.alloc(NodeKind::Nil);
        }
        let mut elems = vec![self.parse_expr(depth + 1)?];
        while *self.peek()? == Token::Comma {
            self.bump()?;
            elems.push(self.parse_expr(depth + 1)?);
        }
        self.expect(&Token::RBracket)?;
        let mut tail = self.alloc(NodeKind::Nil)?;
        for head in elems.into_iter().rev() {
            tail = self.alloc(NodeKind::Cons { head, tail })?;
        }
        Ok(tail)
    }
}

/// Rewrite every free occurrence of `target` within `body` into a sharing
/// edge back to `def_root`, giving `let name _ expr` direct recursion
/// without requiring the user to spell out a fixed-point combinator.
///
/// Uses the same marker discipline as [`not_free`](crate::free_vars::not_free):
/// abstractions that rebind `target` shadow and stop descent, and a node
/// already rewritten or visited is never revisited.
pub fn recurve(
    heap: &mut Heap,
    target: VarId,
    def_root: NodeId,
    node: NodeId,
    stack_size: usize,
) -> Result<()> {
    let mut visited: SmallVec<[NodeId; 16]> = SmallVec::new();
    let result = recurve_search(heap, target, def_root, node, &mut visited, 0, stack_size);
    for id in visited {
        heap.get_mut(id).marker = false;
    }
    result
}

fn recurve_search(
    heap: &mut Heap,
    target: VarId,
    def_root: NodeId,
    node: NodeId,
    visited: &mut SmallVec<[NodeId; 16]>,
    depth: usize,
    stack_size: usize,
) -> Result<()> {
    if depth > stack_size {
        return Err(EngineError::NotFreeOverflow { limit: stack_size });
    }
    let id = heap.compress(node);
    if heap.get(id).marker {
        return Ok(());
    }

    match heap.kind(id).clone() {
        NodeKind::Var(v) if v == target => {
            heap.set_kind(id, NodeKind::Indirect(def_root));
        }
        NodeKind::Abs { bound, body } => {
            if bound == target {
                return Ok(());
            }
            heap.get_mut(id).marker = true;
            visited.push(id);
            recurve_search(heap, target, def_root, body, visited, depth + 1, stack_size)?;
        }
        NodeKind::App { func, arg } => {
            heap.get_mut(id).marker = true;
            visited.push(id);
            recurve_search(heap, target, def_root, func, visited, depth + 1, stack_size)?;
            recurve_search(heap, target, def_root, arg, visited, depth + 1, stack_size)?;
        }
        NodeKind::Cons { head, tail } => {
            heap.get_mut(id).marker = true;
            visited.push(id);
            recurve_search(heap, target, def_root, head, visited, depth + 1, stack_size)?;
            recurve_search(heap, target, def_root, tail, visited, depth + 1, stack_size)?;
        }
        NodeKind::Rename { .. } => return Err(EngineError::WrongRenaming),
        _ => {}
    }
    Ok(())
}
