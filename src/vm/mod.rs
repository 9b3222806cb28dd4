//! # Stack Machine
//!
//! Executes compiled [`Instruction`]s against a stack of activation frames.
//!
//! Each frame owns two things: its `locals` (the variables declared in the
//! block it was entered for) and its own evaluation `stack` — pushing and
//! popping operands never crosses a frame boundary, because `call` is only
//! ever a statement in PL/0, never an expression, so no frame resumes a
//! half-evaluated expression across a nested call.
//!
//! A frame is linked to the rest of the machine two ways:
//! - `dynamic_link`, the frame that called it — where `RET` resumes.
//! - `static_link`, the most recent activation of its *lexically enclosing*
//!   block — what `LOD`/`STO`/`CAL`'s `level` hops across to reach a
//!   non-local variable or sibling procedure.
//!
//! Calls and returns nest strictly (a procedure cannot outlive its caller),
//! so the frame stack is a true LIFO: `frames: Vec<Frame>` with `RET`
//! implemented as `frames.pop()`. `dynamic_link`/`static_link` are kept as
//! indices into that `Vec` rather than pointers — reconstructable, `Copy`,
//! and safe to hold across the `Vec`'s own mutations.


use std::io::{BufRead, Write};

use crate::asm::{Instruction, Operator};
use crate::error::RuntimeError;

struct Frame {
    return_address: usize,
    dynamic_link: Option<usize>,
    static_link: Option<usize>,
    locals: Vec<i64>,
    stack: Vec<i64>,
}

impl Frame {
    fn root(return_address: usize) -> Self {
        Self {
            return_address,
            dynamic_link: None,
            static_link: None,
            locals: Vec::new(),
            stack: Vec::new(),
        }
    }
}

/// The stack machine. Generic over its I/O so tests can run programs
/// against in-memory buffers instead of real stdin/stdout.
pub struct Vm<R, W> {
    code: Vec<Instruction>,
    frames: Vec<Frame>,
    pc: usize,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Vm<R, W> {
    pub fn new(code: Vec<Instruction>, input: R, output: W) -> Self {
        let root = Frame::root(code.len());
        Self {
            code,
            frames: vec![root],
            pc: 0,
            input,
            output,
        }
    }

    /// Runs the program to completion (`RET` unwinding the root frame).
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.pc < self.code.len() {
            let inst = self.code[self.pc].clone();
            self.pc += 1;
            self.step(inst)?;
        }
        Ok(())
    }

    fn step(&mut self, inst: Instruction) -> Result<(), RuntimeError> {
        match inst {
            Instruction::Lit { value } => {
                self.top_mut().stack.push(value);
            }
            Instruction::Lod { level, address } => {
                let frame = self.resolve_frame(level);
                let value = self.frames[frame].locals[address as usize];
                self.top_mut().stack.push(value);
            }
            Instruction::Sto { level, address } => {
                let value = self.pop()?;
                let frame = self.resolve_frame(level);
                self.frames[frame].locals[address as usize] = value;
            }
            Instruction::Cal { level, address } => {
                let static_link = Some(self.resolve_frame(level));
                let dynamic_link = Some(self.frames.len() - 1);
                self.frames.push(Frame {
                    return_address: self.pc,
                    dynamic_link,
                    static_link,
                    locals: Vec::new(),
                    stack: Vec::new(),
                });
                self.pc = address as usize;
            }
            Instruction::Int { locals } => {
                self.top_mut().locals = vec![0; locals as usize];
            }
            Instruction::Jmp { address } => {
                self.pc = address as usize;
            }
            Instruction::Jpc { address } => {
                if self.pop()? == 0 {
                    self.pc = address as usize;
                }
            }
            Instruction::Opr { op } => self.operator(op)?,
        }
        Ok(())
    }

    fn operator(&mut self, op: Operator) -> Result<(), RuntimeError> {
        use Operator::*;
        match op {
            Ret => {
                let frame = self.frames.pop().expect("root frame never returns twice");
                self.pc = frame.return_address;
            }
            Add => self.binary(|lhs, rhs| Ok(lhs.wrapping_add(rhs)))?,
            Sub => self.binary(|lhs, rhs| Ok(lhs.wrapping_sub(rhs)))?,
            Mul => self.binary(|lhs, rhs| Ok(lhs.wrapping_mul(rhs)))?,
            Div => self.binary(|lhs, rhs| {
                if rhs == 0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(lhs / rhs)
                }
            })?,
            Lt => self.binary(|lhs, rhs| Ok((lhs < rhs) as i64))?,
            Leq => self.binary(|lhs, rhs| Ok((lhs <= rhs) as i64))?,
            Gt => self.binary(|lhs, rhs| Ok((lhs > rhs) as i64))?,
            Geq => self.binary(|lhs, rhs| Ok((lhs >= rhs) as i64))?,
            Eq => self.binary(|lhs, rhs| Ok((lhs == rhs) as i64))?,
            Neq => self.binary(|lhs, rhs| Ok((lhs != rhs) as i64))?,
            Odd => {
                let value = self.pop()?;
                self.top_mut().stack.push((value % 2 != 0) as i64);
            }
            Write => {
                let value = self.pop()?;
                writeln!(self.output, "{value}")
                    .map_err(|e| RuntimeError::Io(e.to_string()))?;
            }
            Read => {
                let value = self.read_int()?;
                self.top_mut().stack.push(value);
            }
        }
        Ok(())
    }

    fn binary(
        &mut self,
        f: impl FnOnce(i64, i64) -> Result<i64, RuntimeError>,
    ) -> Result<(), RuntimeError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let result = f(lhs, rhs)?;
        self.top_mut().stack.push(result);
        Ok(())
    }

    fn read_int(&mut self) -> Result<i64, RuntimeError> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .input
                .read_line(&mut line)
                .map_err(|e| RuntimeError::MalformedInput(e.to_string()))?;
            if bytes_read == 0 {
                return Err(RuntimeError::MalformedInput("end of input".into()));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return trimmed
                .parse::<i64>()
                .map_err(|_| RuntimeError::MalformedInput(trimmed.to_string()));
        }
    }

    fn pop(&mut self) -> Result<i64, RuntimeError> {
        self.top_mut().stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("frame stack is never empty while running")
    }

    /// Walks `level` hops up the static chain from the current frame.
    fn resolve_frame(&self, level: u32) -> usize {
        let mut idx = self.frames.len() - 1;
        for _ in 0..level {
            idx = self.frames[idx]
                .static_link
                .expect("static chain shorter than the level encoded in the instruction");
        }
        idx
    }

    /// Consumes the machine, returning the underlying writer (used by tests
    /// to inspect everything `WRITE` produced).
    pub fn into_output(self) -> W {
        self.output
    }
}
