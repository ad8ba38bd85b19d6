//! Core types for the optimistic log: transaction metadata and actions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag for an action that opens a transaction.
pub const BEGIN: &str = "@@optimist/BEGIN";

/// Tag for an action that makes a transaction permanent.
pub const COMMIT: &str = "@@optimist/COMMIT";

/// Tag for an action that unwinds a transaction.
pub const REVERT: &str = "@@optimist/REVERT";

/// Action type the host store dispatches when it (re)initializes.
pub const STORE_INIT: &str = "@@redux/INIT";

/// What a transaction-carrying action does to its transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "@@optimist/BEGIN")]
    Begin,
    #[serde(rename = "@@optimist/COMMIT")]
    Commit,
    #[serde(rename = "@@optimist/REVERT")]
    Revert,
}

impl TransactionKind {
    /// The stable string tag for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Begin => BEGIN,
            TransactionKind::Commit => COMMIT,
            TransactionKind::Revert => REVERT,
        }
    }

    /// True for COMMIT and REVERT.
    pub fn is_resolution(self) -> bool {
        !matches!(self, TransactionKind::Begin)
    }

    pub(crate) fn verb(self) -> &'static str {
        match self {
            TransactionKind::Begin => "begin",
            TransactionKind::Commit => "commit",
            TransactionKind::Revert => "revert",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the transaction tags.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown transaction kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            BEGIN => Ok(TransactionKind::Begin),
            COMMIT => Ok(TransactionKind::Commit),
            REVERT => Ok(TransactionKind::Revert),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Transaction metadata carried by an action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction<I> {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub id: I,
}

impl<I> Transaction<I> {
    pub fn begin(id: I) -> Self {
        Self {
            kind: TransactionKind::Begin,
            id,
        }
    }

    pub fn commit(id: I) -> Self {
        Self {
            kind: TransactionKind::Commit,
            id,
        }
    }

    pub fn revert(id: I) -> Self {
        Self {
            kind: TransactionKind::Revert,
            id,
        }
    }
}

/// An action the optimistic log can inspect for transaction metadata.
///
/// The log never looks inside an action beyond these two questions. Everything
/// else is up to the inner reducer.
pub trait OptimisticAction {
    /// Caller-chosen transaction identifier. Compared by equality only.
    type Id: Clone + PartialEq + fmt::Debug;

    /// Transaction metadata, or `None` for a pass-through action.
    fn optimistic(&self) -> Option<Transaction<Self::Id>>;

    /// Whether this is the host store's initialization marker.
    fn is_store_init(&self) -> bool {
        false
    }
}

/// Ready-made action envelope: an application payload plus optional
/// transaction metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action<P, I = u64> {
    pub payload: P,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic: Option<Transaction<I>>,

    /// Set on the store initialization marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub init: bool,
}

impl<P, I> Action<P, I> {
    /// An action without transaction metadata.
    pub fn plain(payload: P) -> Self {
        Self {
            payload,
            optimistic: None,
            init: false,
        }
    }

    /// An action that opens transaction `id`.
    pub fn begin(payload: P, id: I) -> Self {
        Self::with_transaction(payload, Transaction::begin(id))
    }

    /// An action that commits transaction `id`.
    pub fn commit(payload: P, id: I) -> Self {
        Self::with_transaction(payload, Transaction::commit(id))
    }

    /// An action that reverts transaction `id`.
    pub fn revert(payload: P, id: I) -> Self {
        Self::with_transaction(payload, Transaction::revert(id))
    }

    /// The host store's initialization marker.
    pub fn store_init(payload: P) -> Self {
        Self {
            payload,
            optimistic: None,
            init: true,
        }
    }

    pub fn with_transaction(payload: P, transaction: Transaction<I>) -> Self {
        Self {
            payload,
            optimistic: Some(transaction),
            init: false,
        }
    }
}

impl<P, I> OptimisticAction for Action<P, I>
where
    I: Clone + PartialEq + fmt::Debug,
{
    type Id = I;

    fn optimistic(&self) -> Option<Transaction<I>> {
        self.optimistic.clone()
    }

    fn is_store_init(&self) -> bool {
        self.init
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_roundtrip() {
        for kind in [
            TransactionKind::Begin,
            TransactionKind::Commit,
            TransactionKind::Revert,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>(), Ok(kind));
        }
        assert_eq!(
            "@@optimist/ABORT".parse::<TransactionKind>(),
            Err(UnknownKind("@@optimist/ABORT".to_string()))
        );
    }

    #[test]
    fn test_kind_serializes_as_tag() {
        let json = serde_json::to_string(&TransactionKind::Commit).unwrap();
        assert_eq!(json, "\"@@optimist/COMMIT\"");
    }

    #[test]
    fn test_action_metadata() {
        let plain: Action<&str> = Action::plain("INC");
        assert_eq!(plain.optimistic(), None);
        assert!(!plain.is_store_init());

        let begin = Action::begin("INC", 7u64);
        assert_eq!(begin.optimistic(), Some(Transaction::begin(7)));

        let init: Action<&str> = Action::store_init("INIT");
        assert!(init.is_store_init());
        assert_eq!(init.optimistic(), None);
    }

    #[test]
    fn test_action_json_shape() {
        let action = Action::revert("--".to_string(), 3u64);
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "payload": "--",
                "optimistic": { "type": "@@optimist/REVERT", "id": 3 }
            })
        );
    }
}
