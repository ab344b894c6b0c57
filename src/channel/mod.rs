//! A single undirected edge's bidirectional, delay-simulating message queue.

use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::Rng;

use crate::ids::ProcessId;
use crate::message::Message;

/// One pending message together with the number of further `Receive` polls
/// it must survive before it becomes deliverable.
struct Pending {
  countdown: u32,
  message: Message,
}

/// A bidirectional channel modeling one undirected graph edge.
///
/// Holds two independent FIFO-with-delay queues, one per direction, so a
/// `send` from `a` never contends with a `receive` by `b` or a `send` from
/// `b`. Delivery delay is simulated by drawing a random countdown for every
/// sent message and decrementing it by one on every failed receive poll of
/// its queue, which guarantees that polling always eventually drains the
/// queue even though it may reorder messages within a direction.
pub struct MessageChannel {
  a: ProcessId,
  b: ProcessId,
  weight: f64,
  delay_range: RangeInclusive<u32>,
  // messages flowing a -> b
  to_b: Mutex<VecDeque<Pending>>,
  // messages flowing b -> a
  to_a: Mutex<VecDeque<Pending>>,
}

impl MessageChannel {
  /// Create a channel between `a` and `b` with the given edge weight, using
  /// the default `[1, 15]` delay window.
  pub fn new(a: ProcessId, b: ProcessId, weight: f64) -> Self {
    Self::with_delay_range(a, b, weight, crate::DEFAULT_DELAY_RANGE)
  }

  /// Create a channel with an explicit delay window, primarily useful for
  /// tests that want to shrink or widen the reordering window.
  pub fn with_delay_range(
    a: ProcessId, b: ProcessId, weight: f64, delay_range: RangeInclusive<u32>
  ) -> Self {
    debug_assert!(a != b, "a channel must connect two distinct processes");
    debug_assert!(weight > 0.0, "edge weight must be positive");
    MessageChannel {
      a, b, weight, delay_range,
      to_b: Mutex::new(VecDeque::new()),
      to_a: Mutex::new(VecDeque::new()),
    }
  }

  /// The immutable edge weight.
  pub fn weight(&self) -> f64 {
    self.weight
  }

  /// The other endpoint, given one endpoint of this channel.
  pub fn other(&self, id: ProcessId) -> ProcessId {
    if id == self.a { self.b } else { debug_assert_eq!(id, self.b); self.a }
  }

  /// Enqueue `message` for delivery to whichever endpoint is not `sender`.
  /// Always succeeds and never blocks.
  pub fn send(&self, sender: ProcessId, message: Message) {
    let countdown = rand::rng().random_range(self.delay_range.clone());
    let pending = Pending { countdown, message };
    if sender == self.a {
      self.to_b.lock().unwrap().push_back(pending);
    } else {
      debug_assert_eq!(sender, self.b);
      self.to_a.lock().unwrap().push_back(pending);
    }
  }

  /// Non-blocking poll for a message addressed to `receiver`. Ticks the
  /// countdown of the head-of-queue message on a miss, so repeated polling
  /// always makes progress.
  pub fn try_receive(&self, receiver: ProcessId) -> Option<Message> {
    let queue = if receiver == self.a {
      &self.to_a
    } else {
      debug_assert_eq!(receiver, self.b);
      &self.to_b
    };
    let mut queue = queue.lock().unwrap();
    let head = queue.front_mut()?;
    if head.countdown == 0 {
      Some(queue.pop_front().unwrap().message)
    } else {
      head.countdown -= 1;
      None
    }
  }
}
