//! The per-vertex actor: the state machine described in the algorithm's
//! relaxation / parent-election / acknowledgement / termination protocol.

use std::sync::mpsc;
use std::sync::Arc;

use crate::channel::MessageChannel;
use crate::driver::{ActorResult, RoundStatus, RoundSync};
use crate::ids::ProcessId;
use crate::message::{Epoch, Message};

mod lifecycle;
use lifecycle::Lifecycle;

/// This actor's relationship to one neighbor channel, in the spanning tree
/// being elected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum Relation {
  /// Neither parent nor child: a rejected or not-yet-resolved edge.
  Neighbor,
  /// The channel this actor's current shortest path runs through.
  Parent,
  /// A neighbor that has accepted this actor as its parent.
  Child,
}

/// One graph vertex's independent thread of execution.
pub struct Actor {
  id: ProcessId,
  is_source: bool,
  idx: usize,
  channels: Vec<Arc<MessageChannel>>,
  neighbor_ids: Vec<ProcessId>,
  relation: Vec<Relation>,
  /// `waiting[i]`: have we received this epoch's acknowledgement from
  /// neighbor `i` (or is `i` our parent, which owes us none)?
  waiting: Vec<bool>,
  dist: f64,
  parent_index: Option<usize>,
  parent_id: Option<ProcessId>,
  /// This actor's own monotonically increasing explore-wave tag.
  epoch: Epoch,
  /// The tag carried by the explore message that most recently relaxed us —
  /// i.e. our current parent's own epoch, which we must echo back to it
  /// when we later reject it in favor of someone else.
  curr_parent_epoch: Option<Epoch>,
  exited: bool,
  round: u64,
  /// The last [`RoundSync`] generation this actor has unblocked for.
  generation: u64,
  lifecycle: Lifecycle,
  sync: Arc<RoundSync>,
  result_tx: mpsc::Sender<ActorResult>,
}

impl Actor {
  pub(crate) fn new(
    id: ProcessId,
    is_source: bool,
    idx: usize,
    channels: Vec<Arc<MessageChannel>>,
    sync: Arc<RoundSync>,
    result_tx: mpsc::Sender<ActorResult>,
  ) -> Self {
    let neighbor_count = channels.len();
    let neighbor_ids = channels.iter().map(|c| c.other(id)).collect();
    Actor {
      id,
      is_source,
      idx,
      channels,
      neighbor_ids,
      relation: vec![Relation::Neighbor; neighbor_count],
      waiting: vec![false; neighbor_count],
      dist: if is_source { 0.0 } else { f64::INFINITY },
      parent_index: None,
      parent_id: None,
      epoch: 0,
      curr_parent_epoch: None,
      exited: false,
      round: 0,
      generation: 0,
      lifecycle: Lifecycle::new(),
      sync,
      result_tx,
    }
  }

  /// Drive this actor to completion, reporting round transitions to the
  /// shared [`RoundSync`] and sending its final result once exited.
  pub fn run(mut self) {
    self.lifecycle.run();

    if self.is_source {
      self.initialize_source();
    }

    loop {
      self.generation = self.sync.wait_begin(self.idx, self.generation);
      self.round += 1;
      trace!("round {} proc {} begins", self.round, self.id);

      for i in 0..self.channels.len() {
        if let Some(msg) = self.channels[i].try_receive(self.id) {
          debug!("round {} proc {} receives {}", self.round, self.id, msg);
          self.handle_message(i, msg);
        }
      }

      if !self.exited && self.is_source {
        self.maybe_terminate_as_source();
      }

      if self.exited {
        self.sync.report(self.idx, RoundStatus::Exited);
        self.lifecycle.end();
        self.log_exit();
        break;
      }
      self.sync.report(self.idx, RoundStatus::RoundEnd);
      trace!("round {} proc {} ends", self.round, self.id);
    }

    let result = self.result();
    let _ = self.result_tx.send(result);
  }

  fn log_exit(&self) {
    if self.is_source {
      info!("round {} proc {} receives full converge-cast and exits", self.round, self.id);
    } else {
      info!(
        "round {} proc {} converge-casts to parent proc {} and exits: parent = {} dist = {}",
        self.round,
        self.id,
        self.parent_id.expect("a non-source actor exits only after electing a parent"),
        self.parent_id.expect("checked above"),
        self.dist
      );
    }
  }

  fn result(&self) -> ActorResult {
    ActorResult { id: self.id, is_source: self.is_source, parent: self.parent_id, dist: self.dist }
  }

  fn initialize_source(&mut self) {
    debug_assert!(self.is_source);
    debug_assert_eq!(self.dist, 0.0);
    self.epoch = 1;
    info!("round 0 proc {} sends dist = 0 to all neighbors", self.id);
    for channel in &self.channels {
      channel.send(self.id, Message::Explore { sender: self.id, epoch: self.epoch, dist: 0.0 });
    }
  }

  fn handle_message(&mut self, i: usize, msg: Message) {
    match msg {
      Message::Explore { sender, epoch, dist } => self.handle_explore(i, sender, epoch, dist),
      Message::NonParent { epoch, .. } => {
        if epoch == self.epoch {
          self.waiting[i] = true;
          self.relation[i] = Relation::Neighbor;
        }
      }
      Message::Parent { epoch, .. } => {
        if epoch == self.epoch {
          self.waiting[i] = true;
          self.relation[i] = Relation::Child;
        }
      }
      Message::Terminate { .. } => self.handle_terminate(i),
    }
    self.maybe_ack_parent();
  }

  fn handle_explore(&mut self, i: usize, sender: ProcessId, epoch: Epoch, dist: f64) {
    let candidate = self.channels[i].weight() + dist;
    if candidate < self.dist {
      let prev_parent_index = self.parent_index;
      let prev_parent_epoch = self.curr_parent_epoch;

      self.dist = candidate;
      self.parent_index = Some(i);
      self.parent_id = Some(sender);
      self.curr_parent_epoch = Some(epoch);
      self.relation[i] = Relation::Parent;

      self.epoch += 1;
      for w in self.waiting.iter_mut() {
        *w = false;
      }
      self.waiting[i] = true;

      debug!(
        "round {} proc {} relaxed by proc {}: dist = {}, starts epoch {}",
        self.round, self.id, sender, self.dist, self.epoch
      );
      for (j, channel) in self.channels.iter().enumerate() {
        if j != i {
          channel.send(
            self.id,
            Message::Explore { sender: self.id, epoch: self.epoch, dist: self.dist },
          );
        }
      }

      if let (Some(old_i), Some(old_epoch)) = (prev_parent_index, prev_parent_epoch) {
        if old_i != i {
          debug!(
            "round {} proc {} rejects old parent proc {}",
            self.round, self.id, self.neighbor_ids[old_i]
          );
          self.channels[old_i]
            .send(self.id, Message::NonParent { sender: self.id, epoch: old_epoch });
        }
      }
    } else {
      self.channels[i].send(self.id, Message::NonParent { sender: self.id, epoch });
    }
  }

  fn handle_terminate(&mut self, i: usize) {
    if self.is_source || self.parent_index != Some(i) {
      return;
    }
    for (j, channel) in self.channels.iter().enumerate() {
      if self.relation[j] == Relation::Child {
        channel.send(self.id, Message::Terminate { sender: self.id });
      }
    }
    self.exited = true;
  }

  /// After every message (per the protocol, not just once per round): if
  /// every neighbor has acked the current epoch, tell our parent we accept
  /// it. Safe to call repeatedly; stale duplicates will be epoch-filtered
  /// by whoever receives them.
  fn maybe_ack_parent(&mut self) {
    if self.is_source || !self.waiting.iter().all(|&w| w) {
      return;
    }
    if let (Some(parent_index), Some(epoch)) = (self.parent_index, self.curr_parent_epoch) {
      self.channels[parent_index].send(self.id, Message::Parent { sender: self.id, epoch });
    }
  }

  /// End-of-round check, source only: once every neighbor has acked the
  /// final epoch, the spanning tree is quiescent and shutdown can begin.
  fn maybe_terminate_as_source(&mut self) {
    debug_assert!(self.is_source);
    if !self.waiting.iter().all(|&w| w) {
      return;
    }
    for (j, channel) in self.channels.iter().enumerate() {
      if self.relation[j] == Relation::Child {
        channel.send(self.id, Message::Terminate { sender: self.id });
      }
    }
    self.exited = true;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::mpsc::channel as mpsc_channel;

  fn pid(n: usize) -> ProcessId {
    ProcessId::new(n).unwrap()
  }

  fn harness(
    id: ProcessId, is_source: bool, channels: Vec<Arc<MessageChannel>>
  ) -> (Actor, mpsc::Receiver<ActorResult>) {
    let sync = Arc::new(RoundSync::new(1));
    let (tx, rx) = mpsc_channel();
    (Actor::new(id, is_source, 0, channels, sync, tx), rx)
  }

  #[test]
  fn source_sends_explore_to_every_neighbor_on_init() {
    let source = pid(1);
    let n1 = pid(2);
    let n2 = pid(3);
    let c1 = Arc::new(MessageChannel::with_delay_range(source, n1, 3.0, 0..=0));
    let c2 = Arc::new(MessageChannel::with_delay_range(source, n2, 4.0, 0..=0));
    let (mut actor, _rx) = harness(source, true, vec![Arc::clone(&c1), Arc::clone(&c2)]);

    actor.initialize_source();

    assert_eq!(
      c1.try_receive(n1),
      Some(Message::Explore { sender: source, epoch: 1, dist: 0.0 })
    );
    assert_eq!(
      c2.try_receive(n2),
      Some(Message::Explore { sender: source, epoch: 1, dist: 0.0 })
    );
  }

  #[test]
  fn ties_do_not_cause_reparenting() {
    // two channels offering the same resulting distance: the second offer
    // must be rejected rather than re-electing the parent.
    let me = pid(3);
    let n1 = pid(1);
    let n2 = pid(2);
    let c1 = Arc::new(MessageChannel::new(n1, me, 2.0));
    let c2 = Arc::new(MessageChannel::new(n2, me, 2.0));
    let (mut actor, _rx) = harness(me, false, vec![Arc::clone(&c1), Arc::clone(&c2)]);

    actor.handle_message(0, Message::Explore { sender: n1, epoch: 1, dist: 0.0 });
    assert_eq!(actor.dist, 2.0);
    assert_eq!(actor.parent_id, Some(n1));

    actor.handle_message(1, Message::Explore { sender: n2, epoch: 1, dist: 0.0 });
    // same resulting distance (2.0) must not re-elect n2 as parent
    assert_eq!(actor.parent_id, Some(n1));
    assert_eq!(actor.relation[1], Relation::Neighbor);
  }

  #[test]
  fn relaxation_resets_waiting_and_exempts_new_parent() {
    let me = pid(2);
    let n1 = pid(1);
    let n3 = pid(3);
    let c1 = Arc::new(MessageChannel::new(n1, me, 10.0));
    let c3 = Arc::new(MessageChannel::new(n3, me, 1.0));
    let (mut actor, _rx) = harness(me, false, vec![Arc::clone(&c1), Arc::clone(&c3)]);

    actor.handle_message(0, Message::Explore { sender: n1, epoch: 1, dist: 0.0 });
    assert_eq!(actor.epoch, 1);
    assert_eq!(actor.waiting, vec![true, false]);

    actor.handle_message(1, Message::Explore { sender: n3, epoch: 1, dist: 0.5 });
    assert_eq!(actor.dist, 1.5);
    assert_eq!(actor.epoch, 2);
    assert_eq!(actor.waiting, vec![false, true]);
    assert_eq!(actor.relation[1], Relation::Parent);
  }

  #[test]
  fn old_parent_rejection_carries_old_parents_epoch() {
    let me = pid(2);
    let n1 = pid(1);
    let n3 = pid(3);
    let c1 = Arc::new(MessageChannel::with_delay_range(n1, me, 10.0, 0..=0));
    let c3 = Arc::new(MessageChannel::with_delay_range(n3, me, 1.0, 0..=0));
    let (mut actor, _rx) = harness(me, false, vec![Arc::clone(&c1), Arc::clone(&c3)]);

    actor.handle_message(0, Message::Explore { sender: n1, epoch: 7, dist: 0.0 });
    assert_eq!(actor.parent_id, Some(n1));

    actor.handle_message(1, Message::Explore { sender: n3, epoch: 1, dist: 0.5 });
    assert_eq!(actor.parent_id, Some(n3));

    // n1's channel carries both the new broadcast Explore (it is still a
    // neighbor and gets every relaxation's broadcast) and, after it, the
    // NonParent rejection tagged with epoch 7 -- the tag n1 itself sent,
    // not any epoch of `me`'s own.
    let broadcast = c1.try_receive(n1).expect("old parent still gets the broadcast explore");
    assert!(matches!(broadcast, Message::Explore { .. }));
    let rejection = c1.try_receive(n1).expect("old parent should have been notified");
    assert_eq!(rejection, Message::NonParent { sender: me, epoch: 7 });
  }
}
