//! Process identity.

use std::fmt;
use std::num::NonZeroUsize;

/// A 1-based vertex identifier.
///
/// Kept as a distinct type from the zero-based indices used internally for
/// `Vec` storage so the two numbering schemes can never be confused at a
/// call site.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProcessId(NonZeroUsize);

impl ProcessId {
  /// Construct from a 1-based id. Returns `None` for `0`.
  pub fn new(id: usize) -> Option<Self> {
    NonZeroUsize::new(id).map(ProcessId)
  }

  /// The 1-based id as a plain `usize`.
  pub fn get(self) -> usize {
    self.0.get()
  }

  /// The zero-based index of this process into a `Vec` sized by vertex count.
  pub fn index(self) -> usize {
    self.0.get() - 1
  }

  /// Construct from a zero-based index.
  pub fn from_index(index: usize) -> Self {
    ProcessId(NonZeroUsize::new(index + 1).expect("index + 1 is never zero"))
  }
}

impl fmt::Display for ProcessId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_through_index() {
    for id in 1..=10 {
      let pid = ProcessId::new(id).unwrap();
      assert_eq!(ProcessId::from_index(pid.index()), pid);
    }
  }

  #[test]
  fn rejects_zero() {
    assert!(ProcessId::new(0).is_none());
  }
}
