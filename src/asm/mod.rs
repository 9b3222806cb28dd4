//! # Assembler
//!
//! The append-only instruction buffer the parser emits into. There is no
//! separate code-generation pass: the parser calls straight into this
//! module as it recognizes each grammar production, and the buffer it
//! builds up *is* the compiled program.
//!
//! [`Assembler::patch`] exists because the parser doesn't always know a
//! jump or call target until later in the same pass (an `if`'s else branch,
//! a `while`'s exit, a procedure's own self-recursive call) — it rewrites
//! the address field of a `Jmp`/`Jpc`/`Cal` already in the buffer once that
//! destination becomes known.

pub mod instruction;

#[cfg(test)]
mod tests;

pub use instruction::{Instruction, Operator};

/// The growing buffer of emitted instructions.
#[derive(Debug, Default)]
pub struct Assembler {
    code: Vec<Instruction>,
}

impl Assembler {
    pub fn new() -> Self {
        Self { code: Vec::new() }
    }

    /// The address the *next* emitted instruction will occupy.
    pub fn next_addr(&self) -> usize {
        self.code.len()
    }

    /// The address of the most recently emitted instruction.
    pub fn curr_addr(&self) -> usize {
        self.code.len().saturating_sub(1)
    }

    fn emit(&mut self, inst: Instruction) -> usize {
        let addr = self.next_addr();
        self.code.push(inst);
        addr
    }

    pub fn emit_lit(&mut self, value: i64) -> usize {
        self.emit(Instruction::Lit { value })
    }

    pub fn emit_lod(&mut self, level: u32, address: u32) -> usize {
        self.emit(Instruction::Lod { level, address })
    }

    pub fn emit_sto(&mut self, level: u32, address: u32) -> usize {
        self.emit(Instruction::Sto { level, address })
    }

    pub fn emit_cal(&mut self, level: u32, address: u32) -> usize {
        self.emit(Instruction::Cal { level, address })
    }

    pub fn emit_int(&mut self, locals: u32) -> usize {
        self.emit(Instruction::Int { locals })
    }

    pub fn emit_jmp(&mut self, address: u32) -> usize {
        self.emit(Instruction::Jmp { address })
    }

    pub fn emit_jpc(&mut self, address: u32) -> usize {
        self.emit(Instruction::Jpc { address })
    }

    pub fn emit_opr(&mut self, op: Operator) -> usize {
        self.emit(Instruction::Opr { op })
    }

    /// Rewrites the jump target of the `Jmp`/`Jpc`/`Cal` instruction at
    /// `addr` to `target`. Panics if `addr` doesn't name one of those.
    pub fn patch(&mut self, addr: usize, target: u32) {
        match &mut self.code[addr] {
            Instruction::Jmp { address } | Instruction::Jpc { address } => *address = target,
            Instruction::Cal { address, .. } => *address = target,
            other => panic!("cannot patch address of {other}"),
        }
    }

    /// Rewrites the static-chain `level` field of the `Cal` instruction at
    /// `addr`. Needed for a true forward call: when the call is parsed, the
    /// callee isn't declared yet, so neither its entry address nor the
    /// caller-to-callee level delta is known until the callee's own
    /// `procedure` declaration completes. Panics if `addr` isn't a `Cal`.
    pub fn patch_level(&mut self, addr: usize, level: u32) {
        match &mut self.code[addr] {
            Instruction::Cal { level: slot, .. } => *slot = level,
            other => panic!("cannot patch level of {other}"),
        }
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn into_code(self) -> Vec<Instruction> {
        self.code
    }
}
