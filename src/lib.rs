//! Simulator for the asynchronous distributed Bellman-Ford shortest-path
//! algorithm: one thread per graph vertex, communicating only through
//! per-edge channels with randomized delivery delay.

#[macro_use] extern crate log;

pub mod ids;
pub mod message;
pub mod channel;
pub mod graph;
pub mod process;
pub mod driver;
pub mod parser;
pub mod error;

pub use channel::MessageChannel;
pub use driver::{ActorResult, Driver};
pub use error::{CliError, ParseError};
pub use graph::ConnectivityMatrix;
pub use ids::ProcessId;
pub use message::Message;

/// Default inclusive range for a [`channel::MessageChannel`] send countdown,
/// matching the reference implementation's `[1, 15]` reordering window.
pub const DEFAULT_DELAY_RANGE: std::ops::RangeInclusive<u32> = 1..=15;
