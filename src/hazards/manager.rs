//! Hazard lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use smallvec::SmallVec;
use tracing::{debug, error};

use crate::core::Tile;
use crate::engine::ActionStep;
use crate::error::{HazardError, PersistError};

use super::{Hazard, HazardSpec, Resolution, TriggerKind};

/// Owns every live hazard.
///
/// Hazards are kept in spawn order, which is also the order their
/// resolutions are reported in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardManager {
    turn: u32,
    id_counter: u32,
    hazards: Vec<Hazard>,
}

impl HazardManager {
    /// Create a manager with no hazards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns ticked so far.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Create a hazard.
    ///
    /// The tile set is the explicit tile followed by the area, duplicates
    /// dropped. Spawning with an ID that is already live replaces that hazard.
    pub fn spawn(&mut self, spec: HazardSpec) -> Result<&Hazard, HazardError> {
        let mut tiles: SmallVec<[Tile; 4]> = SmallVec::new();
        for tile in spec.tile.into_iter().chain(spec.area) {
            if !tiles.contains(&tile) {
                tiles.push(tile);
            }
        }
        if tiles.is_empty() {
            return Err(HazardError::NoTiles { kind: spec.kind });
        }

        let id = match spec.id {
            Some(id) => id,
            None => {
                self.id_counter += 1;
                format!("{}-{}", spec.kind, self.id_counter)
            }
        };
        self.hazards.retain(|h| h.id != id);

        debug!(
            target: "variant::hazards",
            hazard = %id,
            kind = %spec.kind,
            tiles = tiles.len(),
            ttl = ?spec.ttl,
            "hazard spawned"
        );

        self.hazards.push(Hazard {
            id,
            kind: spec.kind,
            tiles,
            ttl: spec.ttl,
            payload: spec.payload,
            triggers: spec.triggers,
        });
        let index = self.hazards.len() - 1;
        Ok(&self.hazards[index])
    }

    /// Advance one turn.
    ///
    /// Every timed hazard loses one turn of ttl, reports a `tick` resolution
    /// if it has `onTick` effects, and reports `expire` (even with no effects)
    /// and is removed once its ttl reaches zero. Permanent hazards are untouched.
    pub fn tick(&mut self) -> Vec<Resolution> {
        self.turn += 1;
        let mut resolutions = Vec::new();

        self.hazards.retain_mut(|hazard| {
            let Some(ttl) = hazard.ttl.as_mut() else {
                return true;
            };
            *ttl = (*ttl).saturating_sub(1);
            let expired = *ttl <= 0;

            let origin = hazard.anchor().cloned().unwrap_or_default();
            if !hazard.triggers.on_tick.is_empty() {
                resolutions.push(Resolution::new(
                    hazard,
                    TriggerKind::Tick,
                    hazard.triggers.on_tick.clone(),
                    origin.clone(),
                ));
            }
            if expired {
                debug!(target: "variant::hazards", hazard = %hazard.id, "hazard expired");
                resolutions.push(Resolution::new(
                    hazard,
                    TriggerKind::Expire,
                    hazard.triggers.on_expire.clone(),
                    origin,
                ));
            }
            !expired
        });

        resolutions
    }

    /// Resolutions for a piece entering `tile`.
    #[must_use]
    pub fn handle_enter(&self, tile: &Tile) -> Vec<Resolution> {
        self.triggered_at(tile, TriggerKind::Enter)
    }

    /// Resolutions for a piece remaining on `tile`.
    #[must_use]
    pub fn handle_stay(&self, tile: &Tile) -> Vec<Resolution> {
        self.triggered_at(tile, TriggerKind::Stay)
    }

    fn triggered_at(&self, tile: &Tile, kind: TriggerKind) -> Vec<Resolution> {
        self.hazards
            .iter()
            .filter(|hazard| hazard.covers(tile))
            .filter_map(|hazard| {
                let effects = hazard.triggers.for_kind(kind);
                (!effects.is_empty())
                    .then(|| Resolution::new(hazard, kind, effects.to_vec(), tile.clone()))
            })
            .collect()
    }

    /// Detonate and remove a hazard.
    ///
    /// Without `onExplode` effects the resolution carries a single `explode`
    /// action with `{ id, radius }`.
    pub fn explode(&mut self, id: &str, radius: u32) -> Result<Resolution, HazardError> {
        let index = self
            .hazards
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| HazardError::Unknown(id.to_string()))?;
        let hazard = self.hazards.remove(index);

        let effects = if hazard.triggers.on_explode.is_empty() {
            let mut params = Map::new();
            params.insert("id".to_string(), json!(hazard.id));
            params.insert("radius".to_string(), json!(radius));
            vec![ActionStep::new("explode").with_params(params)]
        } else {
            hazard.triggers.on_explode.clone()
        };

        debug!(target: "variant::hazards", hazard = %hazard.id, radius, "hazard exploded");
        let origin = hazard.anchor().cloned().unwrap_or_default();
        Ok(Resolution::new(&hazard, TriggerKind::Explode, effects, origin))
    }

    /// Remove a hazard. Returns it if it was live.
    pub fn remove(&mut self, id: &str) -> Option<Hazard> {
        let index = self.hazards.iter().position(|h| h.id == id)?;
        Some(self.hazards.remove(index))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.id == id)
    }

    /// Hazards covering `tile`, in spawn order.
    pub fn at<'a>(&'a self, tile: &'a Tile) -> impl Iterator<Item = &'a Hazard> + 'a {
        self.hazards.iter().filter(move |h| h.covers(tile))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    /// Drop every hazard and reset the counters.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Encode as `{ turn, idCounter, hazards }`.
    pub fn serialize(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|source| PersistError::Encode {
            store: "hazards",
            source,
        })
    }

    /// Replace every hazard from JSON.
    ///
    /// A malformed payload is logged and leaves the manager untouched.
    pub fn deserialize(&mut self, payload: &str) -> Result<(), PersistError> {
        match serde_json::from_str::<Self>(payload) {
            Ok(restored) => {
                *self = restored;
                Ok(())
            }
            Err(source) => {
                error!(
                    target: "variant::hazards",
                    error = %source,
                    "malformed hazard payload, keeping current hazards"
                );
                Err(PersistError::Malformed {
                    store: "hazards",
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::hazards::HazardTriggers;

    fn capture_target() -> Vec<ActionStep> {
        vec![ActionStep::new("capture")]
    }

    #[test]
    fn test_spawn_requires_tiles() {
        let mut hazards = HazardManager::new();
        let spec = HazardSpec {
            kind: "fire".to_string(),
            ..HazardSpec::default()
        };

        let err = hazards.spawn(spec).unwrap_err();
        assert_eq!(err, HazardError::NoTiles { kind: "fire".to_string() });
        assert!(hazards.is_empty());
    }

    #[test]
    fn test_generated_ids_are_monotonic() {
        let mut hazards = HazardManager::new();
        let first = hazards.spawn(HazardSpec::new("fire", "e4")).unwrap().id.clone();
        let second = hazards.spawn(HazardSpec::new("ice", "d4")).unwrap().id.clone();
        hazards.remove(&first);
        let third = hazards.spawn(HazardSpec::new("fire", "e4")).unwrap().id.clone();

        assert_eq!(first, "fire-1");
        assert_eq!(second, "ice-2");
        assert_eq!(third, "fire-3");
    }

    #[test]
    fn test_tile_set_order_and_dedup() {
        let mut hazards = HazardManager::new();
        let spec = HazardSpec::new("fog", "e4").with_area(vec![
            Tile::new("d4"),
            Tile::new("e4"),
            Tile::new("d4"),
            Tile::new("f4"),
        ]);

        let hazard = hazards.spawn(spec).unwrap();
        let tiles: Vec<&str> = hazard.tiles.iter().map(Tile::as_str).collect();
        assert_eq!(tiles, vec!["e4", "d4", "f4"]);
    }

    #[test]
    fn test_area_only_spawn() {
        let mut hazards = HazardManager::new();
        let spec = HazardSpec {
            kind: "fog".to_string(),
            area: vec![Tile::new("a1")],
            ..HazardSpec::default()
        };
        assert!(hazards.spawn(spec).is_ok());
    }

    #[test]
    fn test_explicit_id_replaces() {
        let mut hazards = HazardManager::new();
        hazards.spawn(HazardSpec::new("fire", "e4").with_id("trap")).unwrap();
        hazards.spawn(HazardSpec::new("ice", "a1").with_id("trap")).unwrap();

        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards.get("trap").map(|h| h.kind.as_str()), Some("ice"));
    }

    #[test]
    fn test_ttl_one_expires_on_first_tick() {
        let mut hazards = HazardManager::new();
        let id = hazards.spawn(HazardSpec::new("fire", "e4").with_ttl(1)).unwrap().id.clone();

        let resolutions = hazards.tick();
        assert_eq!(resolutions.len(), 1);
        assert_eq!(resolutions[0].kind, TriggerKind::Expire);
        assert!(resolutions[0].effects.is_empty());
        assert!(hazards.get(&id).is_none());
        assert_eq!(hazards.turn(), 1);
    }

    #[test]
    fn test_non_positive_ttl_expires_without_overflow() {
        let mut hazards = HazardManager::new();
        hazards
            .spawn(HazardSpec::new("void", "a1").with_id("void").with_ttl(i32::MIN))
            .unwrap();
        hazards
            .spawn(HazardSpec::new("spent", "b1").with_id("spent").with_ttl(0))
            .unwrap();

        let resolutions = hazards.tick();

        assert_eq!(resolutions.len(), 2);
        assert!(resolutions.iter().all(|r| r.kind == TriggerKind::Expire));
        assert!(hazards.is_empty());
    }

    #[test]
    fn test_tick_then_expire_order() {
        let mut hazards = HazardManager::new();
        let triggers = HazardTriggers {
            on_tick: vec![ActionStep::new("playAudio")],
            on_expire: vec![ActionStep::new("explode")],
            ..HazardTriggers::default()
        };
        hazards
            .spawn(HazardSpec::new("bomb", "c3").with_ttl(2).with_triggers(triggers))
            .unwrap();

        let first: Vec<_> = hazards.tick().iter().map(|r| r.kind).collect();
        assert_eq!(first, vec![TriggerKind::Tick]);
        let second: Vec<_> = hazards.tick().iter().map(|r| r.kind).collect();
        assert_eq!(second, vec![TriggerKind::Tick, TriggerKind::Expire]);
        assert!(hazards.is_empty());
    }

    #[test]
    fn test_permanent_hazard_never_ticks() {
        let mut hazards = HazardManager::new();
        let triggers = HazardTriggers {
            on_tick: vec![ActionStep::new("toast")],
            ..HazardTriggers::default()
        };
        hazards
            .spawn(HazardSpec::new("shrine", "d5").with_triggers(triggers))
            .unwrap();

        for _ in 0..5 {
            assert!(hazards.tick().is_empty());
        }
        assert_eq!(hazards.len(), 1);
    }

    #[test]
    fn test_enter_and_stay() {
        let mut hazards = HazardManager::new();
        let triggers = HazardTriggers {
            on_enter: capture_target(),
            ..HazardTriggers::default()
        };
        hazards
            .spawn(
                HazardSpec::new("pit", "e4")
                    .with_area(vec![Tile::new("e5")])
                    .with_triggers(triggers),
            )
            .unwrap();
        hazards.spawn(HazardSpec::new("decor", "e5")).unwrap();

        let entered = hazards.handle_enter(&Tile::new("e5"));
        assert_eq!(entered.len(), 1);
        assert_eq!(entered[0].origin, Tile::new("e5"));
        assert_eq!(entered[0].hazard_type, "pit");

        assert!(hazards.handle_stay(&Tile::new("e5")).is_empty());
        assert!(hazards.handle_enter(&Tile::new("a1")).is_empty());
        assert_eq!(hazards.at(&Tile::new("e5")).count(), 2);
    }

    #[test]
    fn test_explode_default_action() {
        let mut hazards = HazardManager::new();
        let id = hazards.spawn(HazardSpec::new("bomb", "d4")).unwrap().id.clone();

        let resolution = hazards.explode(&id, 1).unwrap();
        assert_eq!(resolution.kind, TriggerKind::Explode);
        assert_eq!(resolution.effects.len(), 1);
        assert_eq!(resolution.effects[0].action, "explode");
        assert_eq!(resolution.effects[0].params.get("radius"), Some(&json!(1)));
        assert_eq!(resolution.effects[0].params.get("id"), Some(&json!(id)));
        assert!(hazards.is_empty());
    }

    #[test]
    fn test_explode_unknown() {
        let mut hazards = HazardManager::new();
        assert_eq!(
            hazards.explode("ghost", 1).unwrap_err(),
            HazardError::Unknown("ghost".to_string())
        );
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut hazards = HazardManager::new();
        assert!(hazards.remove("nothing").is_none());
    }

    #[test]
    fn test_round_trip_and_layout() {
        let mut hazards = HazardManager::new();
        hazards
            .spawn(HazardSpec::new("fire", "e4").with_ttl(3).with_payload(json!({ "heat": 2 })))
            .unwrap();
        hazards.tick();

        let payload = hazards.serialize().unwrap();
        let value: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["turn"], json!(1));
        assert_eq!(value["idCounter"], json!(1));
        assert_eq!(value["hazards"][0]["type"], json!("fire"));
        assert_eq!(value["hazards"][0]["ttl"], json!(2));

        let mut restored = HazardManager::new();
        restored.deserialize(&payload).unwrap();
        assert_eq!(restored, hazards);

        // Counter continues where it left off
        let next = restored.spawn(HazardSpec::new("fire", "a1")).unwrap();
        assert_eq!(next.id, "fire-2");
    }

    #[test]
    fn test_malformed_payload_keeps_state() {
        let mut hazards = HazardManager::new();
        hazards.spawn(HazardSpec::new("fire", "e4")).unwrap();

        assert!(hazards.deserialize(r#"{"turn": "soon"}"#).is_err());
        assert_eq!(hazards.len(), 1);
    }
}
