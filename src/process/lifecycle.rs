//! A tiny local state machine asserting the order an actor's own thread
//! drives it through: `Ready -> Running -> Ended`.
//!
//! This is distinct from [`crate::driver::RoundStatus`], which is the
//! cross-thread cell the driver and the actor use to negotiate rounds.
//! `Lifecycle` only ever has one writer (the actor's own thread) and exists
//! to catch programming errors, not to coordinate with anything else.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Lifecycle {
  Ready,
  Running,
  Ended,
}

impl Lifecycle {
  pub(crate) fn new() -> Self {
    Lifecycle::Ready
  }

  pub(crate) fn run(&mut self) {
    debug_assert_eq!(*self, Lifecycle::Ready);
    *self = Lifecycle::Running;
  }

  pub(crate) fn end(&mut self) {
    debug_assert_eq!(*self, Lifecycle::Running);
    *self = Lifecycle::Ended;
  }
}
