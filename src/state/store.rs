//! The state store.

use std::collections::VecDeque;

use im::OrdMap;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::PersistError;

/// Default number of undo snapshots kept.
pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Namespaced mutable state blobs with a bounded undo stack.
///
/// Slots live in an `im::OrdMap`, so a snapshot for the undo stack is an
/// O(1) clone that later writes cannot affect.
///
/// ## Example
///
/// ```
/// use serde_json::json;
/// use variant_engine::StateStore;
///
/// let mut store = StateStore::new();
/// let template = json!({ "charges": 3 });
///
/// store.get_or_init("rule:bomber", &template)["charges"] = json!(2);
/// store.push_undo();
/// store.get_or_init("rule:bomber", &template)["charges"] = json!(1);
///
/// store.undo();
/// assert_eq!(store.get("rule:bomber"), Some(&json!({ "charges": 2 })));
/// // The template itself is never touched
/// assert_eq!(template, json!({ "charges": 3 }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StateStore {
    slots: OrdMap<String, Value>,
    undo: VecDeque<OrdMap<String, Value>>,
    capacity: usize,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an empty store with the default undo depth.
    #[must_use]
    pub fn new() -> Self {
        Self::with_undo_depth(DEFAULT_UNDO_DEPTH)
    }

    /// Create an empty store keeping at most `depth` undo snapshots.
    #[must_use]
    pub fn with_undo_depth(depth: usize) -> Self {
        Self {
            slots: OrdMap::new(),
            undo: VecDeque::new(),
            capacity: depth,
        }
    }

    /// The slot for `namespace`, created from a deep copy of `template` if absent.
    ///
    /// The first call for a namespace decides its contents; later templates
    /// are ignored.
    pub fn get_or_init(&mut self, namespace: &str, template: &Value) -> &mut Value {
        self.slots
            .entry(namespace.to_string())
            .or_insert_with(|| template.clone())
    }

    /// Read a slot without creating it.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<&Value> {
        self.slots.get(namespace)
    }

    /// Mutable access to an existing slot.
    pub fn get_mut(&mut self, namespace: &str) -> Option<&mut Value> {
        self.slots.get_mut(namespace)
    }

    /// Replace a slot outright.
    pub fn set(&mut self, namespace: &str, value: Value) {
        self.slots.insert(namespace.to_string(), value);
    }

    /// True if the namespace has been initialized.
    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.slots.contains_key(namespace)
    }

    /// Initialized namespaces, in order.
    pub fn namespaces(&self) -> impl Iterator<Item = &String> {
        self.slots.keys()
    }

    /// Snapshot the entire store onto the undo stack.
    ///
    /// Once the stack exceeds its capacity the oldest snapshot is evicted.
    pub fn push_undo(&mut self) {
        self.undo.push_back(self.slots.clone());
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
        debug!(target: "variant::state", depth = self.undo.len(), "undo snapshot pushed");
    }

    /// Restore the most recent snapshot. Returns false if the stack was empty.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop_back() {
            Some(snapshot) => {
                self.slots = snapshot;
                debug!(target: "variant::state", depth = self.undo.len(), "undo snapshot restored");
                true
            }
            None => false,
        }
    }

    /// Number of snapshots on the undo stack.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Maximum number of snapshots kept.
    #[must_use]
    pub fn undo_capacity(&self) -> usize {
        self.capacity
    }

    /// Empty both the store and the undo stack.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.undo.clear();
    }

    /// The live slots (for engine snapshots).
    #[must_use]
    pub fn snapshot(&self) -> OrdMap<String, Value> {
        self.slots.clone()
    }

    /// Replace the live slots. The undo stack is kept.
    pub fn restore(&mut self, slots: OrdMap<String, Value>) {
        self.slots = slots;
    }

    /// Encode the store as one JSON object keyed by namespace.
    pub fn serialize(&self) -> Result<String, PersistError> {
        serde_json::to_string(&self.slots).map_err(|source| PersistError::Encode {
            store: "state",
            source,
        })
    }

    /// Replace the store from JSON.
    ///
    /// A malformed payload is logged and the store is reset to empty. That is
    /// a data-loss path: callers that care should keep their own copy.
    pub fn deserialize(&mut self, payload: &str) -> Result<(), PersistError> {
        match serde_json::from_str::<OrdMap<String, Value>>(payload) {
            Ok(slots) => {
                self.slots = slots;
                Ok(())
            }
            Err(source) => {
                error!(
                    target: "variant::state",
                    error = %source,
                    "malformed state payload, store reset to empty"
                );
                self.slots = OrdMap::new();
                Err(PersistError::Malformed {
                    store: "state",
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_get_or_init_returns_same_slot() {
        let mut store = StateStore::new();
        let template = json!({ "uses": 0 });

        store.get_or_init("ns", &template)["uses"] = json!(4);
        let again = store.get_or_init("ns", &template);

        assert_eq!(again["uses"], json!(4));
    }

    #[test]
    fn test_first_template_wins() {
        let mut store = StateStore::new();
        store.get_or_init("ns", &json!({ "a": 1 }));
        let slot = store.get_or_init("ns", &json!({ "b": 2 }));

        assert_eq!(*slot, json!({ "a": 1 }));
    }

    #[test]
    fn test_template_is_copied() {
        let mut store = StateStore::new();
        let template = json!({ "list": [1, 2] });

        store.get_or_init("one", &template)["list"] = json!([]);
        let second = store.get_or_init("two", &template);

        assert_eq!(second["list"], json!([1, 2]));
        assert_eq!(template["list"], json!([1, 2]));
    }

    #[test]
    fn test_undo_restores_state_before_last_push() {
        let mut store = StateStore::new();
        store.set("ns", json!(1));
        store.push_undo();
        store.set("ns", json!(2));
        store.push_undo();
        store.set("ns", json!(3));

        assert!(store.undo());
        assert_eq!(store.get("ns"), Some(&json!(2)));
        assert!(store.undo());
        assert_eq!(store.get("ns"), Some(&json!(1)));
        assert!(!store.undo());
        assert_eq!(store.get("ns"), Some(&json!(1)));
    }

    #[test]
    fn test_undo_is_whole_store() {
        let mut store = StateStore::new();
        store.set("a", json!("a0"));
        store.push_undo();
        store.set("a", json!("a1"));
        store.set("b", json!("b1"));

        store.undo();
        assert_eq!(store.get("a"), Some(&json!("a0")));
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = StateStore::with_undo_depth(2);
        for value in 0..3 {
            store.set("ns", json!(value));
            store.push_undo();
        }
        assert_eq!(store.undo_depth(), 2);

        store.undo();
        assert_eq!(store.get("ns"), Some(&json!(2)));
        store.undo();
        assert_eq!(store.get("ns"), Some(&json!(1)));
        // Snapshot of 0 was evicted
        assert!(!store.undo());
    }

    #[test]
    fn test_clear() {
        let mut store = StateStore::new();
        store.set("ns", json!(true));
        store.push_undo();
        store.clear();

        assert!(store.get("ns").is_none());
        assert_eq!(store.undo_depth(), 0);
    }

    #[test]
    fn test_serialized_layout() {
        let mut store = StateStore::new();
        store.set("rule:a", json!({ "n": 1 }));
        store.set("rule:b", json!([true]));

        let json: Value = serde_json::from_str(&store.serialize().unwrap()).unwrap();
        assert_eq!(json, json!({ "rule:a": { "n": 1 }, "rule:b": [true] }));
    }

    #[test]
    fn test_round_trip() {
        let mut store = StateStore::new();
        store.set("rule:a", json!({ "nested": { "deep": [1, 2, 3] } }));

        let payload = store.serialize().unwrap();
        let mut restored = StateStore::new();
        restored.deserialize(&payload).unwrap();

        assert_eq!(restored.get("rule:a"), store.get("rule:a"));
    }

    #[test]
    fn test_malformed_payload_resets() {
        let mut store = StateStore::new();
        store.set("ns", json!(1));

        assert!(store.deserialize("[1, 2]").is_err());
        assert!(store.get("ns").is_none());
        assert_eq!(store.namespaces().count(), 0);
    }
}
