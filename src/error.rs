use std::error::Error as StdError;
use std::fmt::Display;

use diag::Report;
use span::Span;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// An error raised while turning source text into a [`crate::Function`].
///
/// Only the first one encountered during a compilation is ever surfaced —
/// see the panic-mode behavior documented on [`crate::compiler::Compiler`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
  pub span: Span,
  pub message: String,
}

impl CompileError {
  pub fn new(span: impl Into<Span>, message: impl Into<String>) -> Self {
    CompileError {
      span: span.into(),
      message: message.into(),
    }
  }
}

/// An error raised by the VM while executing a chunk.
///
/// The VM does not unwind the value stack on error; a `State` that has
/// produced one should be discarded by the host (see spec §7).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeError {
  pub message: String,
}

impl RuntimeError {
  pub fn new(message: impl Into<String>) -> Self {
    RuntimeError {
      message: message.into(),
    }
  }
}

#[derive(Debug)]
pub enum Error {
  Compile(CompileError),
  Runtime(RuntimeError),
}

impl From<CompileError> for Error {
  fn from(value: CompileError) -> Self {
    Error::Compile(value)
  }
}

impl From<RuntimeError> for Error {
  fn from(value: RuntimeError) -> Self {
    Error::Runtime(value)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Compile(e) => write!(f, "{e}"),
      Error::Runtime(e) => write!(f, "{e}"),
    }
  }
}

impl StdError for Error {}

impl Error {
  /// Renders this error the way a host is told to display it: for a
  /// compile error, `<filename>:<line>:<col>: message`; for a runtime
  /// error, `[!] message`. `filename`/`source` are only used for the
  /// compile-error span lookup.
  pub fn report<'a>(&'a self, filename: &'a str, source: &'a str) -> Report<'a> {
    match self {
      Error::Compile(e) => Report::compile(filename, source, e.span, e.message.as_str()),
      Error::Runtime(e) => Report::runtime(e.message.as_str()),
    }
  }
}
