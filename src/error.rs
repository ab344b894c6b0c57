//! Typed errors at the process boundary: file I/O and connectivity parsing.
//!
//! The core simulation assumes a well-formed graph and has no recoverable
//! error path of its own; every error a user can hit is raised here, before
//! a single actor thread is spawned.

use std::io;
use std::path::PathBuf;

/// Top-level CLI error, covering everything between "given a path" and
/// "have a validated connectivity matrix".
#[derive(Debug, thiserror::Error)]
pub enum CliError {
  #[error("wrong test file path: {path}")]
  FileOpen { path: PathBuf, #[source] source: io::Error },

  #[error(transparent)]
  Parse(#[from] ParseError),
}

/// A malformed connectivity file, with enough context to reproduce the
/// reference implementation's line-numbered diagnostics.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
  #[error("format error at line {line}: expected \"N R\" (process count, root id)")]
  Header { line: usize },

  #[error("format error at line {line}: root id {root} out of range 1..={count}")]
  RootOutOfRange { line: usize, root: usize, count: usize },

  #[error("format error at line {line}: expected {expected} integers, found {found}")]
  RowLength { line: usize, expected: usize, found: usize },

  #[error("expected {expected} rows after the header, found {found}")]
  RowCount { expected: usize, found: usize },

  #[error("format error at line {line}: diagonal entry must be -1")]
  DiagonalNotSentinel { line: usize },

  #[error("connectivity matrix is not symmetric between process {a} and process {b}")]
  Asymmetric { a: usize, b: usize },

  #[error("edge weight between process {a} and process {b} must be positive, found {weight}")]
  NonPositiveWeight { a: usize, b: usize, weight: i64 },

  #[error("graph is disconnected: process {unreached} is not reachable from the root")]
  Disconnected { unreached: usize },
}
