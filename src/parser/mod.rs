//! # Parser / Code Generator
//!
//! A single-pass recursive-descent parser that emits instructions directly
//! as it recognizes each grammar production. There is no intermediate
//! syntax tree: every `fn` below both consumes tokens and drives the
//! [`Assembler`], so by the time [`Parser::parse_program`] returns, the
//! instruction buffer *is* the compiled program.
//!
//! ```text
//! program    = block "." .
//! block      = [ "const" ident "=" number {"," ident "=" number} ";" ]
//!              [ "var" ident {"," ident} ";" ]
//!              { "procedure" ident ";" block ";" }
//!              statement .
//! statement  = [ ident ":=" expression
//!              | "call" ident
//!              | "read" ident {"," ident}
//!              | "write" expression {"," expression}
//!              | "begin" statement {";" statement} "end"
//!              | "if" condition "then" statement ["else" statement]
//!              | "while" condition "do" statement ] .
//! condition  = "odd" expression
//!            | expression ("="|"#"|"<"|"<="|">"|">=") expression .
//! expression = ["+"|"-"] term {("+"|"-") term} .
//! term       = factor {("*"|"/") factor} .
//! factor     = ident | number | "(" expression ")" .
//! ```
//!
//! ## Forward procedure calls
//!
//! A `call IDENT` is resolved one of three ways:
//!
//! - `IDENT` already names a procedure with a known entry address: emit a
//!   fully resolved `CAL` directly.
//! - `IDENT` already names a procedure, but its body hasn't finished
//!   compiling yet (a self-recursive call from within its own body): the
//!   level delta is known now, but the entry address isn't yet.
//! - `IDENT` doesn't resolve at all: it may still be declared later, as a
//!   later sibling in the same `{ "procedure" ... }` list the caller is
//!   nested inside. Neither the level delta nor the entry address is known.
//!
//! The latter two both emit a placeholder `CAL` and record
//! `(instruction_index, caller_level)` in [`Parser::forward_calls`], keyed by
//! procedure name. When a `procedure IDENT` declaration finishes compiling
//! its body, every pending call recorded under that name is patched: the
//! level field becomes `caller_level - entry_decl_level`, and the address
//! field becomes the now-known entry address. A name still pending when the
//! whole program has been parsed was never declared — [`parse_program`]
//! reports that as [`CompileErrorKind::UndeclaredProcedure`].
//!
//! [`parse_program`]: Parser::parse_program


use std::collections::HashMap;

use crate::asm::{Assembler, Instruction, Operator};
use crate::error::{CompileError, CompileErrorKind, Span};
use crate::lexer::{Lexer, TokenKind};
use crate::symtab::{DefineError, ScopeChain, Symbol};

/// A `CAL` awaiting its target procedure's level delta and/or entry address,
/// plus the span of the `call` that emitted it (for the eventual
/// `UndeclaredProcedure` diagnostic if the name is never declared).
struct PendingCall {
    addr: usize,
    caller_level: u32,
    span: Span,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    asm: Assembler,
    scopes: ScopeChain,
    /// Pending calls keyed by the procedure name they target.
    forward_calls: HashMap<String, Vec<PendingCall>>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, CompileError> {
        Ok(Self {
            lexer: Lexer::new(source)?,
            asm: Assembler::new(),
            scopes: ScopeChain::new(),
            forward_calls: HashMap::new(),
        })
    }

    /// Parses and compiles a whole program, returning the emitted code.
    pub fn parse_program(mut self) -> Result<Vec<Instruction>, CompileError> {
        self.block(true)?;
        self.lexer.expect(&TokenKind::Dot)?;
        self.lexer.expect(&TokenKind::Eos)?;
        if let Some((name, pending)) = self
            .forward_calls
            .iter()
            .find(|(_, pending)| !pending.is_empty())
        {
            let span = pending[0].span;
            return Err(CompileError::new(
                CompileErrorKind::UndeclaredProcedure,
                format!("undeclared procedure '{name}'"),
                span,
            ));
        }
        Ok(self.asm.into_code())
    }

    fn define(&mut self, symbol: Symbol, span: Span) -> Result<(), CompileError> {
        self.scopes.define(symbol).map_err(|err| match err {
            DefineError::DuplicateSymbol => CompileError::new(
                CompileErrorKind::DuplicateSymbol,
                "a symbol with this name is already declared in this scope",
                span,
            ),
        })
    }

    /// Compiles one block: declarations, then nested procedures, then the
    /// block's own statement. `is_main` controls the leading jump-over and
    /// marks the program's entry point.
    ///
    /// Returns the entry address of this block's own body (the address of
    /// its `INT` instruction).
    fn block(&mut self, is_main: bool) -> Result<usize, CompileError> {
        let skip_jump = if is_main {
            Some(self.asm.emit_jmp(0))
        } else {
            None
        };

        if self.lexer.check(&TokenKind::Const) {
            self.const_decls()?;
        }
        if self.lexer.check(&TokenKind::Var) {
            self.var_decls()?;
        }
        while self.lexer.check(&TokenKind::Procedure) {
            self.procedure_decl()?;
        }

        if let Some(jmp) = skip_jump {
            self.asm.patch(jmp, self.asm.next_addr() as u32);
        }

        let entry_addr = self.asm.next_addr();
        self.asm.emit_int(self.scopes.current_var_count());
        self.statement()?;
        self.asm.emit_opr(Operator::Ret);
        Ok(entry_addr)
    }

    fn const_decls(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Const)?;
        self.const_decl()?;
        while self.lexer.accept(&TokenKind::Comma)?.is_some() {
            self.const_decl()?;
        }
        self.lexer.expect(&TokenKind::Semicolon)?;
        Ok(())
    }

    fn const_decl(&mut self) -> Result<(), CompileError> {
        let (name, span) = self.lexer.expect_identifier()?;
        self.lexer.expect(&TokenKind::Eq)?;
        let (value, _) = self.lexer.expect_number()?;
        self.define(Symbol::Constant { name, value }, span)
    }

    fn var_decls(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Var)?;
        self.var_decl()?;
        while self.lexer.accept(&TokenKind::Comma)?.is_some() {
            self.var_decl()?;
        }
        self.lexer.expect(&TokenKind::Semicolon)?;
        Ok(())
    }

    fn var_decl(&mut self) -> Result<(), CompileError> {
        let (name, span) = self.lexer.expect_identifier()?;
        let level = self.scopes.current_level();
        self.define(
            Symbol::Variable {
                name,
                level,
                index: 0,
            },
            span,
        )
    }

    fn procedure_decl(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Procedure)?;
        let (name, span) = self.lexer.expect_identifier()?;
        let level = self.scopes.current_level();
        self.define(
            Symbol::Procedure {
                name: name.clone(),
                level,
                entry: None,
            },
            span,
        )?;
        self.lexer.expect(&TokenKind::Semicolon)?;

        self.scopes.open_scope();
        let entry_addr = self.block(false);
        self.scopes.close_scope();
        let entry_addr = entry_addr?;

        self.lexer.expect(&TokenKind::Semicolon)?;

        self.scopes.set_procedure_entry(&name, entry_addr);
        for call in self.forward_calls.remove(&name).unwrap_or_default() {
            self.asm.patch_level(call.addr, call.caller_level - level);
            self.asm.patch(call.addr, entry_addr as u32);
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<(), CompileError> {
        if self.lexer.check(&TokenKind::Read) {
            self.read_stmt()
        } else if self.lexer.check(&TokenKind::Write) {
            self.write_stmt()
        } else if self.lexer.check(&TokenKind::Call) {
            self.call_stmt()
        } else if self.lexer.check(&TokenKind::Begin) {
            self.begin_stmt()
        } else if self.lexer.check(&TokenKind::If) {
            self.if_stmt()
        } else if self.lexer.check(&TokenKind::While) {
            self.while_stmt()
        } else if self.lexer.check(&TokenKind::Identifier(String::new())) {
            self.assign_stmt()
        } else {
            // An empty statement is valid PL/0 (e.g. the body of `begin ; end`).
            Ok(())
        }
    }

    fn read_stmt(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Read)?;
        self.read_target()?;
        while self.lexer.accept(&TokenKind::Comma)?.is_some() {
            self.read_target()?;
        }
        Ok(())
    }

    fn read_target(&mut self) -> Result<(), CompileError> {
        let (name, span) = self.lexer.expect_identifier()?;
        let (level, index) = self.resolve_variable(&name, span)?;
        self.asm.emit_opr(Operator::Read);
        self.asm.emit_sto(level, index);
        Ok(())
    }

    fn write_stmt(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Write)?;
        self.expression()?;
        self.asm.emit_opr(Operator::Write);
        while self.lexer.accept(&TokenKind::Comma)?.is_some() {
            self.expression()?;
            self.asm.emit_opr(Operator::Write);
        }
        Ok(())
    }

    fn call_stmt(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Call)?;
        let (name, span) = self.lexer.expect_identifier()?;
        let caller_level = self.scopes.current_level();
        match self.scopes.resolve(&name) {
            Some(Symbol::Procedure { level, entry, .. }) => {
                let proc_level = *level;
                match entry {
                    Some(entry_addr) => {
                        let entry_addr = *entry_addr;
                        self.asm
                            .emit_cal(caller_level - proc_level, entry_addr as u32);
                    }
                    None => {
                        // Self-recursive call: the level delta is known now,
                        // but the entry address isn't until this procedure's
                        // own body finishes compiling.
                        let addr = self.asm.emit_cal(caller_level - proc_level, 0);
                        self.forward_calls.entry(name).or_default().push(PendingCall {
                            addr,
                            caller_level,
                            span,
                        });
                    }
                }
            }
            Some(_) => {
                return Err(CompileError::new(
                    CompileErrorKind::NotCallable,
                    format!("'{name}' is not a procedure"),
                    span,
                ))
            }
            None => {
                // A true forward reference: `name` may still be declared as
                // a later sibling in the procedure list this call is nested
                // inside. Neither the level delta nor the address is known
                // yet; both are patched when (if) that declaration completes.
                let addr = self.asm.emit_cal(0, 0);
                self.forward_calls.entry(name).or_default().push(PendingCall {
                    addr,
                    caller_level,
                    span,
                });
            }
        }
        Ok(())
    }

    fn begin_stmt(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::Begin)?;
        self.statement()?;
        while self.lexer.accept(&TokenKind::Semicolon)?.is_some() {
            self.statement()?;
        }
        self.lexer.expect(&TokenKind::End)?;
        Ok(())
    }

    fn if_stmt(&mut self) -> Result<(), CompileError> {
        self.lexer.expect(&TokenKind::If)?;
        self.condition()?;
        self.lexer.expect(&TokenKind::Then)?;
        let jmp_false = self.asm.emit_jpc(0);
        self.statement()?;
        if self.lexer.accept(&TokenKind::Else)?.is_some() {
            let jmp_end = self.asm.emit_jmp(0);
            self.asm.patch(jmp_false, self.asm.next_addr() as u32);
            self.statement()?;
            self.asm.patch(jmp_end, self.asm.next_addr() as u32);
        } else {
            self.asm.patch(jmp_false, self.asm.next_addr() as u32);
        }
        Ok(())
    }

    fn while_stmt(&mut self) -> Result<(), CompileError> {
        let loop_start = self.asm.next_addr() as u32;
        self.lexer.expect(&TokenKind::While)?;
        self.condition()?;
        self.lexer.expect(&TokenKind::Do)?;
        let jmp_end = self.asm.emit_jpc(0);
        self.statement()?;
        self.asm.emit_jmp(loop_start);
        self.asm.patch(jmp_end, self.asm.next_addr() as u32);
        Ok(())
    }

    fn assign_stmt(&mut self) -> Result<(), CompileError> {
        let (name, span) = self.lexer.expect_identifier()?;
        let (level, index) = self.resolve_variable(&name, span)?;
        self.lexer.expect(&TokenKind::Assign)?;
        self.expression()?;
        self.asm.emit_sto(level, index);
        Ok(())
    }

    /// Resolves `name` as a variable usable as an assignment/read target,
    /// returning its `(level_delta, index)`.
    fn resolve_variable(&self, name: &str, span: Span) -> Result<(u32, u32), CompileError> {
        let caller_level = self.scopes.current_level();
        match self.scopes.resolve(name) {
            Some(Symbol::Variable { level, index, .. }) => Ok((caller_level - level, *index)),
            Some(_) => Err(CompileError::new(
                CompileErrorKind::BadAssignTarget,
                format!("'{name}' is not a variable"),
                span,
            )),
            None => Err(CompileError::new(
                CompileErrorKind::UndeclaredIdentifier,
                format!("undeclared identifier '{name}'"),
                span,
            )),
        }
    }

    fn condition(&mut self) -> Result<(), CompileError> {
        if self.lexer.accept(&TokenKind::Odd)?.is_some() {
            self.expression()?;
            self.asm.emit_opr(Operator::Odd);
            return Ok(());
        }
        self.expression()?;
        let op = self.comparator()?;
        self.expression()?;
        self.asm.emit_opr(op);
        Ok(())
    }

    fn comparator(&mut self) -> Result<Operator, CompileError> {
        let tok = self.lexer.peek();
        let (op, kind) = match &tok.kind {
            TokenKind::Eq => (Operator::Eq, TokenKind::Eq),
            TokenKind::Hash => (Operator::Neq, TokenKind::Hash),
            TokenKind::Lt => (Operator::Lt, TokenKind::Lt),
            TokenKind::Leq => (Operator::Leq, TokenKind::Leq),
            TokenKind::Gt => (Operator::Gt, TokenKind::Gt),
            TokenKind::Geq => (Operator::Geq, TokenKind::Geq),
            _ => {
                return Err(CompileError::new(
                    CompileErrorKind::UnexpectedToken,
                    format!("expected a comparator, found {}", tok.kind.describe()),
                    tok.span,
                ))
            }
        };
        self.lexer.expect(&kind)?;
        Ok(op)
    }

    fn expression(&mut self) -> Result<(), CompileError> {
        if self.lexer.accept(&TokenKind::Minus)?.is_some() {
            self.asm.emit_lit(0);
            self.term()?;
            self.asm.emit_opr(Operator::Sub);
        } else {
            self.lexer.accept(&TokenKind::Plus)?;
            self.term()?;
        }
        loop {
            if self.lexer.accept(&TokenKind::Plus)?.is_some() {
                self.term()?;
                self.asm.emit_opr(Operator::Add);
            } else if self.lexer.accept(&TokenKind::Minus)?.is_some() {
                self.term()?;
                self.asm.emit_opr(Operator::Sub);
            } else {
                break;
            }
        }
        Ok(())
    }

    fn term(&mut self) -> Result<(), CompileError> {
        self.factor()?;
        loop {
            if self.lexer.accept(&TokenKind::Star)?.is_some() {
                self.factor()?;
                self.asm.emit_opr(Operator::Mul);
            } else if self.lexer.accept(&TokenKind::Slash)?.is_some() {
                self.factor()?;
                self.asm.emit_opr(Operator::Div);
            } else {
                break;
            }
        }
        Ok(())
    }

    fn factor(&mut self) -> Result<(), CompileError> {
        if self.lexer.accept(&TokenKind::LParen)?.is_some() {
            self.expression()?;
            self.lexer.expect(&TokenKind::RParen)?;
            return Ok(());
        }
        if self.lexer.check(&TokenKind::Number(0)) {
            let (value, _) = self.lexer.expect_number()?;
            self.asm.emit_lit(value);
            return Ok(());
        }
        let (name, span) = self.lexer.expect_identifier()?;
        let caller_level = self.scopes.current_level();
        match self.scopes.resolve(&name) {
            Some(Symbol::Constant { value, .. }) => {
                self.asm.emit_lit(*value);
                Ok(())
            }
            Some(Symbol::Variable { level, index, .. }) => {
                self.asm.emit_lod(caller_level - level, *index);
                Ok(())
            }
            Some(Symbol::Procedure { .. }) => Err(CompileError::new(
                CompileErrorKind::ExprUsesProcedure,
                format!("'{name}' is a procedure and cannot be used in an expression"),
                span,
            )),
            None => Err(CompileError::new(
                CompileErrorKind::UndeclaredIdentifier,
                format!("undeclared identifier '{name}'"),
                span,
            )),
        }
    }
}

/// Compiles a PL/0 program into a finished instruction sequence.
pub fn parse(source: &str) -> Result<Vec<Instruction>, CompileError> {
    Parser::new(source)?.parse_program()
}
