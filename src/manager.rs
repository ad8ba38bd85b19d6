//! The optimistic log manager: BEGIN, COMMIT and REVERT transitions.

use crate::error::{OptimistError, PossibleLeakWarning, Result};
use crate::reducer::Reducer;
use crate::state::{next_open, replay, CompositeState, LogEntry, Stored};
use crate::types::{OptimisticAction, TransactionKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimistConfig {
    /// History length above which a possible leak is logged.
    /// Default: 100
    pub max_history: usize,
}

impl Default for OptimistConfig {
    fn default() -> Self {
        Self { max_history: 100 }
    }
}

impl OptimistConfig {
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }
}

/// Wraps an inner reducer with an optimistic transaction log.
///
/// Holds no state of its own: every call takes the prior composite state and
/// returns a new one, leaving the prior value untouched. One `Optimist` can
/// serve any number of independent store slices.
#[derive(Clone, Debug)]
pub struct Optimist<R> {
    reducer: R,
    config: OptimistConfig,
}

/// Wrap `reducer` with the default configuration.
pub fn wrap<R>(reducer: R) -> Optimist<R> {
    Optimist::new(reducer, OptimistConfig::default())
}

/// Wrap `reducer` with an explicit configuration.
pub fn wrap_with<R>(reducer: R, config: OptimistConfig) -> Optimist<R> {
    Optimist::new(reducer, config)
}

impl<R> Optimist<R> {
    pub fn new(reducer: R, config: OptimistConfig) -> Self {
        Self { reducer, config }
    }

    pub fn reducer(&self) -> &R {
        &self.reducer
    }

    pub fn config(&self) -> &OptimistConfig {
        &self.config
    }

    /// Bootstrap a composite around `prior`, a raw inner state if any.
    pub fn init<A>(&self, prior: Option<R::State>) -> CompositeState<R::State, A>
    where
        R: Reducer<A>,
    {
        CompositeState::settled(self.reducer.init(prior))
    }

    /// Apply one dispatched action.
    ///
    /// `state` is `None` the first time a slice is reduced. A store-init
    /// action re-bootstraps from the prior `current`, dropping any open
    /// transactions. Fails only when a COMMIT or REVERT names a transaction
    /// that is not open, in which case nothing is changed.
    pub fn reduce<A>(
        &self,
        state: Option<&CompositeState<R::State, A>>,
        action: A,
    ) -> Result<CompositeState<R::State, A>>
    where
        R: Reducer<A>,
        A: OptimisticAction + Clone,
    {
        let state = match state {
            Some(state) if !action.is_store_init() => state.clone(),
            prior => self.init(prior.map(|state| state.current().clone())),
        };
        self.transition(state, action)
    }

    /// Like [`reduce`](Self::reduce), for slices that may hold a raw inner
    /// state instead of a composite.
    pub fn reduce_stored<A>(
        &self,
        stored: Option<&Stored<R::State, A>>,
        action: A,
    ) -> Result<CompositeState<R::State, A>>
    where
        R: Reducer<A>,
        A: OptimisticAction + Clone,
    {
        match stored {
            Some(Stored::Composite(state)) => self.reduce(Some(state), action),
            Some(Stored::Raw(raw)) => self.transition(self.init(Some(raw.clone())), action),
            None => self.reduce(None, action),
        }
    }

    fn transition<A>(
        &self,
        state: CompositeState<R::State, A>,
        action: A,
    ) -> Result<CompositeState<R::State, A>>
    where
        R: Reducer<A>,
        A: OptimisticAction,
    {
        match action.optimistic() {
            Some(tx) if tx.kind.is_resolution() => self.resolve(state, action, tx.kind, tx.id),
            Some(tx) if !state.has_open_transaction() => {
                debug!(id = ?tx.id, "opening transaction");
                Ok(self.begin(state, action))
            }
            _ => Ok(self.pass_through(state, action)),
        }
    }

    fn begin<A>(
        &self,
        mut state: CompositeState<R::State, A>,
        action: A,
    ) -> CompositeState<R::State, A>
    where
        R: Reducer<A>,
    {
        state.before_state = Some(state.current.clone());
        state.current = self.reducer.reduce(state.current, &action);
        state.history.push(LogEntry::new(action));
        state
    }

    fn pass_through<A>(
        &self,
        mut state: CompositeState<R::State, A>,
        action: A,
    ) -> CompositeState<R::State, A>
    where
        R: Reducer<A>,
    {
        state.current = self.reducer.reduce(state.current, &action);
        if state.has_open_transaction() {
            state.history.push(LogEntry::new(action));
            self.check_history(state.history.len());
        }
        state
    }

    fn check_history(&self, history_len: usize) {
        if history_len > self.config.max_history {
            let warning = PossibleLeakWarning {
                history_len,
                max_history: self.config.max_history,
            };
            warn!(history_len, max_history = self.config.max_history, "{}", warning);
        }
    }

    fn resolve<A>(
        &self,
        mut state: CompositeState<R::State, A>,
        action: A,
        kind: TransactionKind,
        id: A::Id,
    ) -> Result<CompositeState<R::State, A>>
    where
        R: Reducer<A>,
        A: OptimisticAction,
    {
        let target = state
            .history
            .iter()
            .position(|entry| entry.opens(&id))
            .ok_or_else(|| OptimistError::not_found(kind, &id))?;

        debug!(
            id = ?id,
            %kind,
            index = target,
            history_len = state.history.len(),
            "resolving transaction"
        );

        // The resolution action counts once, like any other action.
        state.current = self.reducer.reduce(state.current, &action);
        state.history.push(LogEntry::resolved(action));

        Ok(match kind {
            TransactionKind::Revert => self.revert(state, target),
            _ => self.commit(state, target),
        })
    }

    fn commit<A>(
        &self,
        mut state: CompositeState<R::State, A>,
        target: usize,
    ) -> CompositeState<R::State, A>
    where
        R: Reducer<A>,
        A: OptimisticAction,
    {
        if target > 0 {
            // Older transactions still need this entry to replay.
            state.history[target].resolved = true;
            return state;
        }

        match next_open(&state.history[1..]).map(|offset| offset + 1) {
            None => {
                trace!("history settled by commit");
                state.history.clear();
                state.before_state = None;
            }
            Some(next) => {
                let baseline = state.baseline().clone();
                let before = replay(&self.reducer, baseline, &state.history[..next]);
                state.history.drain(..next);
                state.before_state = Some(before);
            }
        }
        state
    }

    /// Plain actions logged between a reverted oldest transaction and the
    /// next open one are kept in the new `before_state`, not dropped.
    fn revert<A>(
        &self,
        mut state: CompositeState<R::State, A>,
        target: usize,
    ) -> CompositeState<R::State, A>
    where
        R: Reducer<A>,
        A: OptimisticAction,
    {
        state.history.remove(target);

        if target == 0 {
            let baseline = state.baseline().clone();
            match next_open(&state.history) {
                None => {
                    trace!("history settled by revert");
                    state.current = replay(&self.reducer, baseline, &state.history);
                    state.history.clear();
                    state.before_state = None;
                    return state;
                }
                Some(next) => {
                    // Plain actions between the reverted and the next open
                    // transaction become part of the new snapshot.
                    let before = replay(&self.reducer, baseline, &state.history[..next]);
                    state.history.drain(..next);
                    state.before_state = Some(before);
                }
            }
        }

        state.current = replay(&self.reducer, state.baseline().clone(), &state.history);
        state
    }
}
