//! # Optimist
//!
//! An optimistic-update transaction log for pure reducers.
//!
//! ## Core Concepts
//!
//! - **Reducer**: a pure `(state, action) -> state` function, wrapped unchanged
//! - **Transaction**: a speculative action opened by BEGIN and closed by exactly
//!   one COMMIT or REVERT, matched by caller-chosen id
//! - **Composite state**: the latest state, a snapshot from before the oldest
//!   open transaction, and the log of actions since that snapshot
//! - **Replay**: REVERT rebuilds the latest state by folding the reducer over
//!   the log, so unrelated actions keep their effects
//!
//! ## Example
//!
//! ```
//! use optimist::{reducer_fn, wrap, Action};
//!
//! let counter = wrap(reducer_fn(|n: i64, action: &Action<&str>| match action.payload {
//!     "INC" => n + 1,
//!     "DEC" => n - 1,
//!     _ => n,
//! }));
//!
//! let state = counter.reduce(None, Action::begin("INC", 1))?;
//! let state = counter.reduce(Some(&state), Action::plain("INC"))?;
//! assert_eq!(*state.current(), 2);
//!
//! // The server said no: unwind transaction 1, keep the plain INC.
//! let state = counter.reduce(Some(&state), Action::revert("--", 1))?;
//! assert_eq!(*state.current(), 1);
//! assert!(state.history().is_empty());
//! # Ok::<(), optimist::OptimistError>(())
//! ```

pub mod error;
pub mod json;
pub mod manager;
pub mod reducer;
pub mod state;
pub mod types;

// Re-exports
pub use error::{OptimistError, PossibleLeakWarning, Result};
pub use manager::{wrap, wrap_with, Optimist, OptimistConfig};
pub use reducer::{reducer_fn, FnReducer, Reducer};
pub use state::{ensure_state, CompositeState, LogEntry, Stored};
pub use types::*;
