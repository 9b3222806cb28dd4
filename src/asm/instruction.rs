//! # Instructions
//!
//! The stack machine's instruction set: four opcodes that move data (`LIT`,
//! `LOD`, `STO`), two that manage activation frames and calls (`CAL`,
//! `INT`), two that transfer control (`JMP`, `JPC`), and one, `OPR`, that
//! multiplexes every arithmetic, comparison, and I/O primitive through its
//! `address` field repurposed as an operator code.
//!
//! [`Instruction`] is a tagged enum rather than the bare `(opcode, level,
//! address)` triple the machine actually executes — each variant names its
//! operands instead of leaving callers to remember which field means what
//! for which opcode. [`Instruction::fields`] recovers the flat ABI view for
//! anything (disassembly, the VM dispatch loop) that wants it.

use std::fmt;

/// Operator codes carried in an `OPR` instruction's `level` field. The
/// numeric values are load-bearing: they are the machine's actual ABI, not
/// an implementation detail, and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Ret = 0,
    Sub = 1,
    Add = 2,
    Div = 3,
    Mul = 4,
    Lt = 5,
    Leq = 6,
    Gt = 7,
    Geq = 8,
    Eq = 9,
    Neq = 10,
    Odd = 11,
    Write = 14,
    Read = 16,
}

impl Operator {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Recovers an `Operator` from its numeric ABI code, if it names one.
    pub fn from_code(code: u32) -> Option<Self> {
        use Operator::*;
        Some(match code {
            0 => Ret,
            1 => Sub,
            2 => Add,
            3 => Div,
            4 => Mul,
            5 => Lt,
            6 => Leq,
            7 => Gt,
            8 => Geq,
            9 => Eq,
            10 => Neq,
            11 => Odd,
            14 => Write,
            16 => Read,
            _ => return None,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Ret => "RET",
            Operator::Sub => "SUB",
            Operator::Add => "ADD",
            Operator::Div => "DIV",
            Operator::Mul => "MUL",
            Operator::Lt => "LT",
            Operator::Leq => "LEQ",
            Operator::Gt => "GT",
            Operator::Geq => "GEQ",
            Operator::Eq => "EQ",
            Operator::Neq => "NEQ",
            Operator::Odd => "ODD",
            Operator::Write => "WRITE",
            Operator::Read => "READ",
        };
        write!(f, "{name}")
    }
}

/// A single stack-machine instruction.
///
/// In [`Instruction::fields`]'s ABI view, `level` is the static-chain hop
/// count for `Lod`/`Sto`/`Cal` and unused (always `0`) otherwise; `address`
/// is a constant for `Lit`, a local index for `Lod`/`Sto`, a code address for
/// `Cal`/`Jmp`/`Jpc`, a frame size for `Int`, and the operator code for `Opr`.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a literal constant.
    Lit { value: i64 },
    /// Load a variable's value, `level` hops up the static chain.
    Lod { level: u32, address: u32 },
    /// Store the top of the evaluation stack into a variable.
    Sto { level: u32, address: u32 },
    /// Call the procedure at `address`, `level` hops up the static chain
    /// from the *caller's* frame to find the new frame's static parent.
    Cal { level: u32, address: u32 },
    /// Reserve `locals + 3` cells for the current frame (the `+3` is the
    /// frame header: return address, dynamic link, static link).
    Int { locals: u32 },
    /// Unconditional jump.
    Jmp { address: u32 },
    /// Pop the evaluation stack; jump if the popped value is zero.
    Jpc { address: u32 },
    /// Perform the arithmetic/comparison/I/O primitive named by `op`.
    Opr { op: Operator },
}

impl Instruction {
    /// The flat 4-field `(opcode, level, address, comment)` ABI view.
    pub fn fields(&self) -> (&'static str, u32, u32) {
        match self {
            Instruction::Lit { value } => ("LIT", 0, *value as u32),
            Instruction::Lod { level, address } => ("LOD", *level, *address),
            Instruction::Sto { level, address } => ("STO", *level, *address),
            Instruction::Cal { level, address } => ("CAL", *level, *address),
            Instruction::Int { locals } => ("INT", 0, locals + 3),
            Instruction::Jmp { address } => ("JMP", 0, *address),
            Instruction::Jpc { address } => ("JPC", 0, *address),
            Instruction::Opr { op } => ("OPR", 0, op.code()),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Lit { value } => write!(f, "LIT 0, {value}"),
            Instruction::Lod { level, address } => write!(f, "LOD {level}, {address}"),
            Instruction::Sto { level, address } => write!(f, "STO {level}, {address}"),
            Instruction::Cal { level, address } => write!(f, "CAL {level}, {address}"),
            Instruction::Int { locals } => write!(f, "INT 0, {}", locals + 3),
            Instruction::Jmp { address } => write!(f, "JMP 0, {address}"),
            Instruction::Jpc { address } => write!(f, "JPC 0, {address}"),
            Instruction::Opr { op } => write!(f, "OPR 0, {}", op.code()),
        }
    }
}
