//! Error types shared by every compilation phase.
//!
//! PL/0 has four distinct fault kinds (lexical, syntactic, semantic,
//! runtime), all of which are fatal at the phase where they occur — there is
//! no local recovery and no continuation past the first fault. `CompileError`
//! covers the first three (they all carry a source [`Span`]); `RuntimeError`
//! covers the fourth (it is a property of the executing machine, not of a
//! source position).

use std::fmt;

/// A source location: 1-based line, 1-based start/end column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Span {
    pub fn new(line: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            line,
            col_start,
            col_end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col_start)
    }
}

/// A fault raised while lexing, parsing, or resolving symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub message: String,
    pub span: Span,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    // --- Lexical ---
    UnexpectedCharacter,
    IntegerOverflow,
    // --- Syntax ---
    UnexpectedToken,
    // --- Semantic ---
    DuplicateSymbol,
    UndeclaredIdentifier,
    UndeclaredProcedure,
    BadAssignTarget,
    ExprUsesProcedure,
    NotCallable,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}: {}", self.span, self.message)
    }
}

impl std::error::Error for CompileError {}

/// A fault raised while the stack machine is executing already-compiled code.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    DivisionByZero,
    MalformedInput(String),
    /// Indicates a compiler bug: an operator fired with too few operands on
    /// the evaluation stack. A well-formed compile never produces this.
    StackUnderflow,
    /// The program's output sink (or input source) failed outright, e.g. a
    /// closed pipe. Carries the underlying `io::Error`'s message since
    /// `io::Error` itself isn't `Clone`/`PartialEq`.
    Io(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::MalformedInput(text) => {
                write!(f, "malformed input for read: {text:?}")
            }
            RuntimeError::StackUnderflow => {
                write!(f, "evaluation stack underflow (compiler bug)")
            }
            RuntimeError::Io(message) => write!(f, "i/o error: {message}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Top-level error returned by the CLI driver, covering every phase plus I/O.
#[derive(Debug)]
pub enum Error {
    Compile(CompileError),
    Runtime(RuntimeError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Compile(e) => write!(f, "{e}"),
            Error::Runtime(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::Compile(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
