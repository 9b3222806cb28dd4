//! # PL/0 Compiler and Stack-Machine Interpreter
//!
//! A complete toolchain for PL/0: a lexical analyzer, a single-pass
//! recursive-descent parser that emits code directly (no intermediate
//! syntax tree), and a stack machine that executes the result.
//!
//! ## Pipeline
//!
//! 1. **Lexer** ([`lexer`]) — tokenizes source text with one token of
//!    lookahead.
//! 2. **Symbol table** ([`symtab`]) — a chain of nested lexical scopes.
//! 3. **Assembler** ([`asm`]) — the instruction buffer the parser emits
//!    into.
//! 4. **Parser** ([`parser`]) — recursive-descent, compiling straight to
//!    instructions as it recognizes each grammar production.
//! 5. **VM** ([`vm`]) — executes the compiled instructions against a stack
//!    of activation frames linked by dynamic and static chains.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pl0::Program;
//! use std::io::{stdin, stdout, BufReader};
//!
//! let source = std::fs::read_to_string("program.pl0").unwrap();
//! let program = Program::compile(&source).unwrap();
//! program.run(BufReader::new(stdin()), stdout()).unwrap();
//! ```

pub mod asm;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symtab;
pub mod vm;

use std::io::{BufRead, Write};

pub use asm::Instruction;
pub use error::{CompileError, Error, RuntimeError};
pub use vm::Vm;

/// A compiled PL/0 program, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    code: Vec<Instruction>,
}

impl Program {
    /// Lexes, parses, and code-generates `source` in one pass.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Ok(Self {
            code: parser::parse(source)?,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Runs this program against `input`/`output`, consuming it.
    pub fn run<R: BufRead, W: Write>(self, input: R, output: W) -> Result<(), RuntimeError> {
        Vm::new(self.code, input, output).run()
    }
}

/// Compiles and immediately runs `source` against `input`/`output`.
pub fn compile_and_run<R: BufRead, W: Write>(
    source: &str,
    input: R,
    output: W,
) -> Result<(), Error> {
    let program = Program::compile(source)?;
    program.run(input, output)?;
    Ok(())
}
