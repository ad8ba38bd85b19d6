//! The composite state shape stored in place of the inner state.

use crate::error::OptimistError;
use crate::types::{OptimisticAction, TransactionKind};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One logged action.
///
/// `resolved` marks entries whose transaction is no longer open: committed
/// BEGINs that had to stay in the log, and the COMMIT/REVERT actions
/// themselves. The action is kept exactly as it was dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry<A> {
    pub action: A,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub resolved: bool,
}

impl<A> LogEntry<A> {
    pub fn new(action: A) -> Self {
        Self {
            action,
            resolved: false,
        }
    }

    pub fn resolved(action: A) -> Self {
        Self {
            action,
            resolved: true,
        }
    }
}

impl<A: OptimisticAction> LogEntry<A> {
    /// The id of the transaction this entry opened, if it is still open.
    pub fn open_id(&self) -> Option<A::Id> {
        if self.resolved {
            return None;
        }
        match self.action.optimistic() {
            Some(tx) if tx.kind == TransactionKind::Begin => Some(tx.id),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open_id().is_some()
    }

    pub(crate) fn opens(&self, id: &A::Id) -> bool {
        self.open_id().as_ref() == Some(id)
    }
}

/// Inner state plus the log needed to unwind open transactions.
///
/// `history` is empty exactly when `before_state` is `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "CompositeParts<S, A>",
    bound(
        serialize = "S: Serialize, A: Serialize",
        deserialize = "S: Deserialize<'de>, A: Deserialize<'de>"
    )
)]
pub struct CompositeState<S, A> {
    pub(crate) current: S,
    pub(crate) before_state: Option<S>,
    pub(crate) history: Vec<LogEntry<A>>,
}

/// Unchecked wire form of [`CompositeState`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompositeParts<S, A> {
    current: S,
    before_state: Option<S>,
    history: Vec<LogEntry<A>>,
}

impl<S, A> TryFrom<CompositeParts<S, A>> for CompositeState<S, A> {
    type Error = OptimistError;

    fn try_from(parts: CompositeParts<S, A>) -> Result<Self, Self::Error> {
        match (parts.before_state.is_some(), parts.history.is_empty()) {
            (true, true) => Err(OptimistError::InconsistentState(
                "beforeState is set but history is empty".to_string(),
            )),
            (false, false) => Err(OptimistError::InconsistentState(format!(
                "history holds {} entries but beforeState is missing",
                parts.history.len()
            ))),
            _ => Ok(Self {
                current: parts.current,
                before_state: parts.before_state,
                history: parts.history,
            }),
        }
    }
}

impl<S, A> CompositeState<S, A> {
    /// A composite with nothing to roll back.
    pub fn settled(current: S) -> Self {
        Self {
            current,
            before_state: None,
            history: Vec::new(),
        }
    }

    /// Latest inner state, optimistic actions included.
    pub fn current(&self) -> &S {
        &self.current
    }

    pub fn into_current(self) -> S {
        self.current
    }

    /// Inner state right before the oldest open transaction.
    pub fn before_state(&self) -> Option<&S> {
        self.before_state.as_ref()
    }

    pub fn history(&self) -> &[LogEntry<A>] {
        &self.history
    }

    /// Where a replay of `history` starts.
    pub fn baseline(&self) -> &S {
        self.before_state.as_ref().unwrap_or(&self.current)
    }

    pub fn has_open_transaction(&self) -> bool {
        !self.history.is_empty()
    }
}

impl<S, A: OptimisticAction> CompositeState<S, A> {
    /// Ids of open transactions, oldest first.
    pub fn open_transactions(&self) -> impl Iterator<Item = A::Id> + '_ {
        self.history.iter().filter_map(LogEntry::open_id)
    }
}

/// Whatever a store slice last held: the composite shape, or a raw inner
/// state written by something that does not know about the log.
///
/// On decode, a map whose `history` is an array is always a composite; if it
/// fails to decode as one, that error is returned instead of falling back to
/// `Raw`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Stored<S, A> {
    Composite(CompositeState<S, A>),
    Raw(S),
}

impl<'de, S, A> Deserialize<'de> for Stored<S, A>
where
    S: Deserialize<'de>,
    A: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if matches!(value.get("history"), Some(Value::Array(_))) {
            <CompositeState<S, A> as Deserialize<'de>>::deserialize(value)
                .map(Stored::Composite)
                .map_err(D::Error::custom)
        } else {
            <S as Deserialize<'de>>::deserialize(value)
                .map(Stored::Raw)
                .map_err(D::Error::custom)
        }
    }
}

impl<S, A> Stored<S, A> {
    /// The inner state a plain caller would see.
    pub fn inner(&self) -> &S {
        match self {
            Stored::Composite(state) => state.current(),
            Stored::Raw(state) => state,
        }
    }

    pub fn into_inner(self) -> S {
        match self {
            Stored::Composite(state) => state.into_current(),
            Stored::Raw(state) => state,
        }
    }
}

impl<S, A> From<CompositeState<S, A>> for Stored<S, A> {
    fn from(state: CompositeState<S, A>) -> Self {
        Stored::Composite(state)
    }
}

/// Unwrap a stored slice to its inner state.
///
/// Lets code that mixes wrapped and plain reducers read any slice the same way.
pub fn ensure_state<S, A>(stored: &Stored<S, A>) -> &S {
    stored.inner()
}
