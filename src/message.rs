//! The wire format exchanged between process actors over a
//! [`crate::channel::MessageChannel`].

use std::fmt;

use crate::ids::ProcessId;

/// Monotonically increasing tag an actor attaches to its current outstanding
/// explore wave. Used by the receiving actor to tell a fresh acknowledgement
/// from a stale one.
pub type Epoch = u64;

/// A message in flight on a channel.
///
/// Unlike the reference implementation's single struct with fields that are
/// only meaningful for some variants, each kind carries exactly the fields it
/// needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message {
  /// A distance offer: "I can reach the source in `dist`".
  Explore { sender: ProcessId, epoch: Epoch, dist: f64 },
  /// Affirmative acknowledgement: "I accept you as my parent for `epoch`".
  Parent { sender: ProcessId, epoch: Epoch },
  /// Negative acknowledgement: "I do not accept you as my parent for `epoch`".
  NonParent { sender: ProcessId, epoch: Epoch },
  /// Propagates shutdown down the spanning tree.
  Terminate { sender: ProcessId },
}

impl Message {
  pub fn sender(&self) -> ProcessId {
    match *self {
      Message::Explore { sender, .. }
      | Message::Parent { sender, .. }
      | Message::NonParent { sender, .. }
      | Message::Terminate { sender } => sender,
    }
  }
}

impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match *self {
      Message::Explore { sender, epoch, dist } =>
        write!(f, "explore from proc {sender} (epoch {epoch}): dist = {dist}"),
      Message::Parent { sender, epoch } =>
        write!(f, "parent ack from proc {sender} (epoch {epoch})"),
      Message::NonParent { sender, epoch } =>
        write!(f, "non-parent ack from proc {sender} (epoch {epoch})"),
      Message::Terminate { sender } =>
        write!(f, "terminate from proc {sender}"),
    }
  }
}
