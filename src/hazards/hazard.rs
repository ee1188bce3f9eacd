//! Hazard data types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;

use crate::core::Tile;
use crate::engine::ActionStep;

/// Effect lists per trigger. Absent triggers are empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HazardTriggers {
    pub on_enter: Vec<ActionStep>,
    pub on_stay: Vec<ActionStep>,
    pub on_expire: Vec<ActionStep>,
    pub on_tick: Vec<ActionStep>,
    pub on_explode: Vec<ActionStep>,
}

impl HazardTriggers {
    /// The effect list for one trigger.
    #[must_use]
    pub fn for_kind(&self, kind: TriggerKind) -> &[ActionStep] {
        match kind {
            TriggerKind::Enter => &self.on_enter,
            TriggerKind::Stay => &self.on_stay,
            TriggerKind::Expire => &self.on_expire,
            TriggerKind::Tick => &self.on_tick,
            TriggerKind::Explode => &self.on_explode,
        }
    }
}

/// Request to spawn a hazard.
///
/// At least one of `tile` and `area` must name a tile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardSpec {
    /// Explicit ID. Generated as `<type>-<n>` when absent.
    #[serde(default)]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub tile: Option<Tile>,

    #[serde(default)]
    pub area: Vec<Tile>,

    /// Turns to live. Absent means permanent.
    #[serde(default)]
    pub ttl: Option<i32>,

    #[serde(default)]
    pub payload: Value,

    #[serde(default)]
    pub triggers: HazardTriggers,
}

impl HazardSpec {
    /// A spec for a single-tile hazard.
    pub fn new(kind: impl Into<String>, tile: impl Into<Tile>) -> Self {
        Self {
            kind: kind.into(),
            tile: Some(tile.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_area(mut self, area: impl IntoIterator<Item = Tile>) -> Self {
        self.area = area.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: i32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    #[must_use]
    pub fn with_triggers(mut self, triggers: HazardTriggers) -> Self {
        self.triggers = triggers;
        self
    }
}

/// A live hazard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hazard {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,

    /// Tiles covered, fixed at spawn.
    pub tiles: SmallVec<[Tile; 4]>,

    /// Remaining turns, `None` for permanent hazards.
    pub ttl: Option<i32>,

    #[serde(default)]
    pub payload: Value,

    #[serde(default)]
    pub triggers: HazardTriggers,
}

impl Hazard {
    /// True if the hazard covers `tile`.
    #[must_use]
    pub fn covers(&self, tile: &Tile) -> bool {
        self.tiles.contains(tile)
    }

    /// First covered tile.
    #[must_use]
    pub fn anchor(&self) -> Option<&Tile> {
        self.tiles.first()
    }

    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.ttl.is_none()
    }
}

/// Which hazard trigger produced a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Tick,
    Expire,
    Enter,
    Stay,
    Explode,
}

impl TriggerKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Expire => "expire",
            Self::Enter => "enter",
            Self::Stay => "stay",
            Self::Explode => "explode",
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effects a caller should run on behalf of a hazard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub hazard_id: String,
    pub hazard_type: String,
    pub kind: TriggerKind,
    pub effects: Vec<ActionStep>,
    /// Tile the trigger fired on: the entered tile for enter/stay, otherwise
    /// the hazard's first tile.
    pub origin: Tile,
    pub tiles: SmallVec<[Tile; 4]>,
    pub payload: Value,
}

impl Resolution {
    pub(crate) fn new(hazard: &Hazard, kind: TriggerKind, effects: Vec<ActionStep>, origin: Tile) -> Self {
        Self {
            hazard_id: hazard.id.clone(),
            hazard_type: hazard.kind.clone(),
            kind,
            effects,
            origin,
            tiles: hazard.tiles.clone(),
            payload: hazard.payload.clone(),
        }
    }
}
