//! History replay.

use crate::reducer::Reducer;
use crate::state::LogEntry;
use crate::types::OptimisticAction;

/// Fold `reducer` over `entries`, starting from `baseline`.
pub fn replay<'a, R, A>(
    reducer: &R,
    baseline: R::State,
    entries: impl IntoIterator<Item = &'a LogEntry<A>>,
) -> R::State
where
    R: Reducer<A>,
    A: 'a,
{
    entries
        .into_iter()
        .fold(baseline, |state, entry| reducer.reduce(state, &entry.action))
}

/// Index of the first entry that still opens a transaction.
pub fn next_open<A: OptimisticAction>(entries: &[LogEntry<A>]) -> Option<usize> {
    entries.iter().position(LogEntry::is_open)
}
