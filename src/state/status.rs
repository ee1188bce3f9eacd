//! Piece status effects stored in the shared `status` namespace.
//!
//! Layout: `{ pieceId: { statusName: turnsLeft | null } }`. A `null` counter
//! is permanent until removed.

use serde_json::{Map, Value};

use crate::core::PieceId;

use super::StateStore;

/// Reserved namespace holding every piece's statuses.
pub const STATUS_NAMESPACE: &str = "status";

fn piece_entry<'a>(store: &'a StateStore, piece: &PieceId) -> Option<&'a Map<String, Value>> {
    store
        .get(STATUS_NAMESPACE)?
        .as_object()?
        .get(piece.as_str())?
        .as_object()
}

/// True if `piece` currently carries `status`.
#[must_use]
pub fn has_status(store: &StateStore, piece: &PieceId, status: &str) -> bool {
    piece_entry(store, piece).is_some_and(|entry| entry.contains_key(status))
}

/// Give `piece` a status for `turns` turns (`None` = until removed).
///
/// Re-adding overwrites the counter.
pub fn add_status(store: &mut StateStore, piece: &PieceId, status: &str, turns: Option<u32>) {
    let root = store.get_or_init(STATUS_NAMESPACE, &Value::Object(Map::new()));
    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let Value::Object(pieces) = root else {
        return;
    };
    let entry = pieces
        .entry(piece.as_str().to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(statuses) = entry {
        statuses.insert(
            status.to_string(),
            turns.map_or(Value::Null, Value::from),
        );
    }
}

/// Strip `status` from `piece`. Returns false if it was not present.
pub fn remove_status(store: &mut StateStore, piece: &PieceId, status: &str) -> bool {
    let Some(Value::Object(pieces)) = store.get_mut(STATUS_NAMESPACE) else {
        return false;
    };
    let Some(Value::Object(statuses)) = pieces.get_mut(piece.as_str()) else {
        return false;
    };
    let removed = statuses.remove(status).is_some();
    if statuses.is_empty() {
        pieces.remove(piece.as_str());
    }
    removed
}

/// Count every timed status down by one turn, dropping those that reach zero.
///
/// Returns the `(piece, status)` pairs that expired.
pub fn tick_statuses(store: &mut StateStore) -> Vec<(PieceId, String)> {
    let mut expired = Vec::new();
    let Some(Value::Object(pieces)) = store.get_mut(STATUS_NAMESPACE) else {
        return expired;
    };
    for (piece, statuses) in pieces.iter_mut() {
        let Value::Object(statuses) = statuses else {
            continue;
        };
        statuses.retain(|status, turns| {
            let Some(left) = turns.as_u64() else {
                // Permanent or unreadable counters stay
                return true;
            };
            let left = left.saturating_sub(1);
            if left == 0 {
                expired.push((PieceId::new(piece.as_str()), status.clone()));
                false
            } else {
                *turns = Value::from(left);
                true
            }
        });
    }
    pieces.retain(|_, statuses| statuses.as_object().map_or(true, |s| !s.is_empty()));
    expired
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_add_and_query() {
        let mut store = StateStore::new();
        let pawn = PieceId::new("wp");

        assert!(!has_status(&store, &pawn, "frozen"));
        add_status(&mut store, &pawn, "frozen", Some(2));
        assert!(has_status(&store, &pawn, "frozen"));
        assert!(!has_status(&store, &PieceId::new("bp"), "frozen"));
        assert_eq!(
            store.get(STATUS_NAMESPACE),
            Some(&json!({ "wp": { "frozen": 2 } }))
        );
    }

    #[test]
    fn test_tick_expires_timed_statuses() {
        let mut store = StateStore::new();
        let pawn = PieceId::new("wp");
        add_status(&mut store, &pawn, "frozen", Some(2));
        add_status(&mut store, &pawn, "shielded", None);

        assert!(tick_statuses(&mut store).is_empty());
        assert!(has_status(&store, &pawn, "frozen"));

        let expired = tick_statuses(&mut store);
        assert_eq!(expired, vec![(pawn.clone(), "frozen".to_string())]);
        assert!(!has_status(&store, &pawn, "frozen"));
        assert!(has_status(&store, &pawn, "shielded"));
    }

    #[test]
    fn test_remove_status() {
        let mut store = StateStore::new();
        let pawn = PieceId::new("wp");
        add_status(&mut store, &pawn, "shielded", None);

        assert!(remove_status(&mut store, &pawn, "shielded"));
        assert!(!remove_status(&mut store, &pawn, "shielded"));
        assert_eq!(store.get(STATUS_NAMESPACE), Some(&json!({})));
    }

    #[test]
    fn test_garbage_namespace_is_replaced() {
        let mut store = StateStore::new();
        store.set(STATUS_NAMESPACE, json!("oops"));
        let pawn = PieceId::new("wp");

        assert!(!has_status(&store, &pawn, "frozen"));
        assert!(tick_statuses(&mut store).is_empty());
        add_status(&mut store, &pawn, "frozen", Some(1));
        assert!(has_status(&store, &pawn, "frozen"));
    }
}
