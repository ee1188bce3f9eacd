//! Cooldown counters.

use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::core::PieceId;
use crate::error::PersistError;

/// Persisted form of one counter: `[[actor, action], remainingTurns]`.
pub type CooldownRecord = ((PieceId, String), u32);

/// Remaining-turns counters keyed by (actor, action).
///
/// An absent entry and an entry at zero are both ready. Ticking floors at
/// zero and never removes entries.
///
/// ## Example
///
/// ```
/// use variant_engine::{CooldownTracker, PieceId};
///
/// let knight = PieceId::new("wn");
/// let mut cooldowns = CooldownTracker::new();
///
/// cooldowns.set(&knight, "blink", 1);
/// assert!(!cooldowns.is_ready(&knight, "blink"));
///
/// cooldowns.tick_all();
/// assert!(cooldowns.is_ready(&knight, "blink"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CooldownTracker {
    entries: BTreeMap<(PieceId, String), u32>,
}

impl CooldownTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a counter, overwriting any existing value.
    pub fn set(&mut self, actor: &PieceId, action: &str, turns: u32) {
        self.entries
            .insert((actor.clone(), action.to_string()), turns);
    }

    /// True iff no counter exists or the counter is zero.
    #[must_use]
    pub fn is_ready(&self, actor: &PieceId, action: &str) -> bool {
        self.remaining(actor, action) == 0
    }

    /// Remaining turns (zero when absent).
    #[must_use]
    pub fn remaining(&self, actor: &PieceId, action: &str) -> u32 {
        // BTreeMap lookups need an owned tuple key
        self.entries
            .get(&(actor.clone(), action.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Decrement every counter by one, flooring at zero.
    pub fn tick_all(&mut self) {
        for turns in self.entries.values_mut() {
            *turns = turns.saturating_sub(1);
        }
    }

    /// Drop every counter.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored counters (including those at zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no counters are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The full table as an ordered list of records.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CooldownRecord> {
        self.entries
            .iter()
            .map(|(key, turns)| (key.clone(), *turns))
            .collect()
    }

    /// Replace the table with `records`.
    pub fn restore(&mut self, records: Vec<CooldownRecord>) {
        self.entries = records.into_iter().collect();
    }

    /// Encode the table as JSON.
    pub fn serialize(&self) -> Result<String, PersistError> {
        serde_json::to_string(&self.snapshot()).map_err(|source| PersistError::Encode {
            store: "cooldowns",
            source,
        })
    }

    /// Replace the table from JSON.
    ///
    /// A malformed payload is logged and leaves the current table untouched.
    pub fn deserialize(&mut self, payload: &str) -> Result<(), PersistError> {
        match serde_json::from_str::<Vec<CooldownRecord>>(payload) {
            Ok(records) => {
                debug!(target: "variant::cooldown", entries = records.len(), "cooldowns restored");
                self.restore(records);
                Ok(())
            }
            Err(source) => {
                error!(
                    target: "variant::cooldown",
                    error = %source,
                    "malformed cooldown payload, keeping current table"
                );
                Err(PersistError::Malformed {
                    store: "cooldowns",
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> PieceId {
        PieceId::new("wn")
    }

    #[test]
    fn test_absent_and_zero_are_ready() {
        let mut cooldowns = CooldownTracker::new();
        assert!(cooldowns.is_ready(&knight(), "blink"));

        cooldowns.set(&knight(), "blink", 0);
        assert!(cooldowns.is_ready(&knight(), "blink"));
        assert_eq!(cooldowns.len(), 1);
    }

    #[test]
    fn test_positive_blocks() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 2);

        assert!(!cooldowns.is_ready(&knight(), "blink"));
        assert_eq!(cooldowns.remaining(&knight(), "blink"), 2);

        // Other actions and actors are unaffected
        assert!(cooldowns.is_ready(&knight(), "charge"));
        assert!(cooldowns.is_ready(&PieceId::new("bn"), "blink"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 5);
        cooldowns.set(&knight(), "blink", 1);
        assert_eq!(cooldowns.remaining(&knight(), "blink"), 1);
    }

    #[test]
    fn test_tick_floors_at_zero_and_keeps_entries() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 1);

        cooldowns.tick_all();
        assert_eq!(cooldowns.remaining(&knight(), "blink"), 0);

        cooldowns.tick_all();
        cooldowns.tick_all();
        assert_eq!(cooldowns.remaining(&knight(), "blink"), 0);
        assert_eq!(cooldowns.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 3);
        cooldowns.clear();
        assert!(cooldowns.is_empty());
        assert!(cooldowns.is_ready(&knight(), "blink"));
    }

    #[test]
    fn test_serialized_layout() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 2);

        let json = cooldowns.serialize().unwrap();
        assert_eq!(json, r#"[[["wn","blink"],2]]"#);
    }

    #[test]
    fn test_round_trip() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 2);
        cooldowns.set(&PieceId::new("bq"), "freeze", 0);

        let json = cooldowns.serialize().unwrap();
        let mut restored = CooldownTracker::new();
        restored.deserialize(&json).unwrap();

        assert_eq!(restored, cooldowns);
    }

    #[test]
    fn test_malformed_payload_keeps_state() {
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight(), "blink", 2);

        assert!(cooldowns.deserialize("{not json").is_err());
        assert_eq!(cooldowns.remaining(&knight(), "blink"), 2);
    }
}
