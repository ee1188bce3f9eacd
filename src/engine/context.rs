//! The per-evaluation context handed to every plugin.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cooldown::CooldownTracker;
use crate::core::{Piece, PieceId, RuleRng, Tile};
use crate::error::PluginError;
use crate::hazards::{HazardManager, Resolution};
use crate::host::Host;
use crate::registry::Registry;
use crate::state::StateStore;

use super::rule::{Params, RuleDocument};

/// What happened: the topic plus whoever and wherever it concerns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub topic: String,
    pub actor: Option<PieceId>,
    pub target_tile: Option<Tile>,
    pub target_piece: Option<PieceId>,
    /// Set when the event is a UI action.
    pub ui_action: Option<String>,
    pub payload: Value,
}

impl Event {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Option<&PieceId>) -> Self {
        self.actor = actor.cloned();
        self
    }

    #[must_use]
    pub fn with_target_tile(mut self, tile: Option<&Tile>) -> Self {
        self.target_tile = tile.cloned();
        self
    }

    #[must_use]
    pub fn with_target_piece(mut self, piece: Option<PieceId>) -> Self {
        self.target_piece = piece;
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// JSON form delivered to bus subscribers.
    #[must_use]
    pub fn to_value(&self) -> Value {
        json!({
            "topic": self.topic,
            "actor": self.actor,
            "targetTile": self.target_tile,
            "targetPiece": self.target_piece,
            "uiAction": self.ui_action,
            "payload": self.payload,
        })
    }
}

/// The hazard whose trigger is being resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub origin: Tile,
    pub payload: Value,
}

/// Everything a condition, effect or provider can see and touch.
///
/// Built once per dispatch and re-bound to each rule in turn. The host is
/// borrowed for the lifetime of the context, so plugins cannot re-enter the
/// engine.
pub struct Context<'a> {
    pub event: Event,
    /// Set while hazard trigger effects run.
    pub hazard: Option<HazardRef>,
    pub host: &'a mut dyn Host,
    pub cooldowns: &'a mut CooldownTracker,
    pub state: &'a mut StateStore,
    pub hazards: &'a mut HazardManager,
    pub registry: &'a Registry,
    pub rng: &'a mut RuleRng,
    rule: Option<&'a RuleDocument>,
    namespace: Option<String>,
}

impl<'a> Context<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event: Event,
        host: &'a mut dyn Host,
        cooldowns: &'a mut CooldownTracker,
        state: &'a mut StateStore,
        hazards: &'a mut HazardManager,
        registry: &'a Registry,
        rng: &'a mut RuleRng,
    ) -> Self {
        Self {
            event,
            hazard: None,
            host,
            cooldowns,
            state,
            hazards,
            registry,
            rng,
            rule: None,
            namespace: None,
        }
    }

    /// Bind to `rule`, creating its state slot if needed.
    pub fn bind(&mut self, rule: &'a RuleDocument) {
        let namespace = rule.namespace();
        self.state.get_or_init(&namespace, &rule.initial_state);
        self.namespace = Some(namespace);
        self.rule = Some(rule);
    }

    /// The bound rule.
    #[must_use]
    pub fn rule(&self) -> Option<&'a RuleDocument> {
        self.rule
    }

    #[must_use]
    pub fn rule_id(&self) -> Option<&'a str> {
        self.rule.map(RuleDocument::id)
    }

    /// A declared parameter of the bound rule.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&'a Value> {
        self.rule.and_then(|rule| rule.parameters.get(name))
    }

    /// The bound rule's state slot (read-only).
    #[must_use]
    pub fn rule_state(&self) -> Option<&Value> {
        self.namespace.as_deref().and_then(|ns| self.state.get(ns))
    }

    /// The bound rule's state slot.
    pub fn rule_state_mut(&mut self) -> Result<&mut Value, PluginError> {
        let rule = self.rule.ok_or(PluginError::Unbound)?;
        let namespace = self.namespace.as_deref().ok_or(PluginError::Unbound)?;
        Ok(self.state.get_or_init(namespace, &rule.initial_state))
    }

    /// Key under which cooldowns are tracked for the current action.
    ///
    /// Checked in order: the step's `action` parameter, the rule's `action`
    /// parameter, the UI action being run, the rule ID.
    #[must_use]
    pub fn action_key(&self, params: Option<&Params>) -> Option<String> {
        params
            .and_then(|p| p.get("action"))
            .or_else(|| self.param("action"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.event.ui_action.clone())
            .or_else(|| self.rule_id().map(str::to_string))
    }

    /// The acting piece, if it is still on the board.
    #[must_use]
    pub fn actor_piece(&self) -> Option<Piece> {
        self.event.actor.as_ref().and_then(|id| self.host.piece(id))
    }

    /// The target piece, if it is still on the board.
    #[must_use]
    pub fn target_piece(&self) -> Option<Piece> {
        self.event.target_piece.as_ref().and_then(|id| self.host.piece(id))
    }

    /// Run a hazard resolution's effects.
    ///
    /// While they run the target tile is the resolution's origin, the target
    /// piece is whoever stands there and [`Context::hazard`] is set. All three
    /// are restored afterwards. Returns how many effects succeeded.
    pub fn run_resolution(&mut self, resolution: &Resolution) -> usize {
        let occupant = self.host.piece_at(&resolution.origin).map(|p| p.id);
        let saved_tile = self.event.target_tile.replace(resolution.origin.clone());
        let saved_piece = std::mem::replace(&mut self.event.target_piece, occupant);
        let saved_hazard = self.hazard.replace(HazardRef {
            id: resolution.hazard_id.clone(),
            kind: resolution.hazard_type.clone(),
            origin: resolution.origin.clone(),
            payload: resolution.payload.clone(),
        });

        let registry = self.registry;
        let succeeded = resolution
            .effects
            .iter()
            .filter(|step| registry.run_effect(step, self))
            .count();

        self.event.target_tile = saved_tile;
        self.event.target_piece = saved_piece;
        self.hazard = saved_hazard;
        succeeded
    }
}

impl std::fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("event", &self.event)
            .field("hazard", &self.hazard)
            .field("rule", &self.rule_id())
            .finish_non_exhaustive()
    }
}
