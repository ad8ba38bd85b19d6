//! Untyped interop for callers that keep actions and state as `serde_json::Value`.
//!
//! Actions follow the conventional shape
//! `{"type": ..., "meta": {"optimistic": {"type": <tag>, "id": ...}}}`, and a
//! stored value counts as a composite state when its `history` field is an
//! array, even an empty one.

use crate::types::{OptimisticAction, Transaction, TransactionKind, STORE_INIT};
use serde_json::{json, Value};

impl OptimisticAction for Value {
    type Id = Value;

    /// Reads `meta.optimistic`. Unknown tags and missing or null ids make the
    /// action a plain one.
    fn optimistic(&self) -> Option<Transaction<Value>> {
        let meta = self.get("meta")?.get("optimistic")?;
        let kind = meta.get("type")?.as_str()?.parse::<TransactionKind>().ok()?;
        let id = meta.get("id").filter(|id| !id.is_null())?;
        Some(Transaction {
            kind,
            id: id.clone(),
        })
    }

    fn is_store_init(&self) -> bool {
        self.get("type").and_then(Value::as_str) == Some(STORE_INIT)
    }
}

static NULL: Value = Value::Null;

/// Unwrap a stored value to the inner state a plain caller would see.
pub fn ensure_state(value: &Value) -> &Value {
    match value.get("history") {
        Some(Value::Array(_)) => value.get("current").unwrap_or(&NULL),
        _ => value,
    }
}

/// A plain action with the given `type`.
pub fn action(action_type: &str) -> Value {
    json!({ "type": action_type })
}

/// An action with the given `type` carrying transaction metadata.
pub fn optimistic_action(action_type: &str, kind: TransactionKind, id: impl Into<Value>) -> Value {
    json!({
        "type": action_type,
        "meta": { "optimistic": { "type": kind.as_str(), "id": id.into() } }
    })
}
