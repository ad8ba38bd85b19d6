//! Composite state and history replay.
//!
//! The composite keeps a snapshot taken before the oldest open transaction
//! and every action received since. Any version of the inner state inside
//! that window can be rebuilt by folding the reducer over the log.

mod composite;
mod operations;

pub use composite::{ensure_state, CompositeState, LogEntry, Stored};
pub use operations::{next_open, replay};
