//! The rule engine.

use im::OrdMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cooldown::{CooldownRecord, CooldownTracker};
use crate::core::{EngineConfig, PieceId, RuleRng, RuleRngState, Tile};
use crate::error::{EngineError, PersistError};
use crate::events::{topics, EventBus};
use crate::hazards::{HazardManager, Resolution};
use crate::host::Host;
use crate::registry::{Registry, UnresolvedId};
use crate::state::{tick_statuses, StateStore};

use super::context::{Context, Event};
use super::rule::{RuleDocument, UiActionSpec};

/// What one entry point call did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dispatch {
    pub topic: String,
    /// Rules bound and evaluated.
    pub rules_evaluated: usize,
    /// Steps whose condition held (or handlers that matched).
    pub steps_run: usize,
    /// Effects that ran without error.
    pub effects_run: usize,
    /// Ids of rules stopped by a `blockAction` step, in evaluation order.
    pub blocked: Vec<String>,
    /// Hazard resolutions executed before the rules.
    pub hazard_resolutions: usize,
}

impl Dispatch {
    fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// True if any rule was blocked.
    #[must_use]
    pub fn was_blocked(&self) -> bool {
        !self.blocked.is_empty()
    }
}

/// Everything needed to resume a session: cooldowns, rule state, hazards
/// and the RNG position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub cooldowns: Vec<CooldownRecord>,
    pub state: OrdMap<String, Value>,
    pub hazards: HazardManager,
    pub rng: RuleRngState,
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(|source| PersistError::Encode {
            store: "snapshot",
            source,
        })
    }

    pub fn from_json(payload: &str) -> Result<Self, PersistError> {
        serde_json::from_str(payload).map_err(|source| PersistError::Malformed {
            store: "snapshot",
            source,
        })
    }
}

/// Loads rule documents and runs them against lifecycle and UI events.
///
/// The engine owns the registry, event bus, cooldowns, state store, hazards
/// and RNG of one game session. The host is borrowed per call.
///
/// Every entry point evaluates rules in load order, steps in declaration
/// order and actions in declaration order, then publishes the event topic on
/// the bus. Plugin failures are contained; the only error an entry point
/// returns is a failing bus subscriber.
#[derive(Debug)]
pub struct RuleEngine {
    config: EngineConfig,
    registry: Registry,
    rules: Vec<RuleDocument>,
    ui_actions: FxHashMap<String, UiActionSpec>,
    bus: EventBus,
    cooldowns: CooldownTracker,
    state: StateStore,
    hazards: HazardManager,
    rng: RuleRng,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RuleEngine {
    /// Create an engine with the built-in registry.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            registry: Registry::builtin().with_policy(config.unknown_conditions),
            rules: Vec::new(),
            ui_actions: FxHashMap::default(),
            bus: EventBus::new(),
            cooldowns: CooldownTracker::new(),
            state: StateStore::with_undo_depth(config.undo_depth),
            hazards: HazardManager::new(),
            rng: RuleRng::new(config.seed),
            config,
        }
    }

    /// Replace the registry (builder pattern).
    ///
    /// The configured unknown-condition policy is applied to it.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry.with_policy(self.config.unknown_conditions);
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register host plugins.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Subscribe to engine events.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Active rules, in load order.
    #[must_use]
    pub fn rules(&self) -> &[RuleDocument] {
        &self.rules
    }

    /// The UI action declared under `id`, if any active rule declares it.
    #[must_use]
    pub fn ui_action(&self, id: &str) -> Option<&UiActionSpec> {
        self.ui_actions.get(id)
    }

    #[must_use]
    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn cooldowns_mut(&mut self) -> &mut CooldownTracker {
        &mut self.cooldowns
    }

    #[must_use]
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    #[must_use]
    pub fn hazards(&self) -> &HazardManager {
        &self.hazards
    }

    pub fn hazards_mut(&mut self) -> &mut HazardManager {
        &mut self.hazards
    }

    /// Ids referenced by the active rules that nothing is registered under.
    #[must_use]
    pub fn audit(&self) -> Vec<UnresolvedId> {
        self.registry.audit(&self.rules)
    }

    /// Replace the active rule set.
    ///
    /// Inactive documents are dropped. Each remaining rule's UI actions are
    /// offered to the host and its state slot is initialized. Returns the
    /// number of active rules.
    pub fn load_rules(
        &mut self,
        rules: Vec<RuleDocument>,
        host: &mut dyn Host,
    ) -> Result<usize, EngineError> {
        let offered = rules.len();
        self.rules = rules.into_iter().filter(RuleDocument::is_active).collect();
        self.ui_actions.clear();

        for rule in &self.rules {
            for action in &rule.ui_actions {
                host.register_action(action);
                self.ui_actions.insert(action.id.clone(), action.clone());
            }
            self.state.get_or_init(&rule.namespace(), &rule.initial_state);
        }

        for missing in self.registry.audit(&self.rules) {
            warn!(
                target: "variant::engine",
                rule = %missing.rule,
                kind = %missing.kind,
                id = %missing.id,
                "rule references an unregistered id"
            );
        }

        let loaded = self.rules.len();
        debug!(
            target: "variant::engine",
            loaded,
            inactive = offered - loaded,
            ui_actions = self.ui_actions.len(),
            "rules loaded"
        );

        let ids: Vec<&str> = self.rules.iter().map(RuleDocument::id).collect();
        let payload = json!({ "count": loaded, "rules": ids });
        self.bus.emit(topics::RULES_LOADED, &payload)?;
        Ok(loaded)
    }

    /// A piece finished a move from `from` to `to`.
    pub fn on_move_committed(
        &mut self,
        actor: &PieceId,
        from: &Tile,
        to: &Tile,
        host: &mut dyn Host,
    ) -> Result<Dispatch, EngineError> {
        let event = Event::new(topics::MOVE_COMMITTED)
            .with_actor(Some(actor))
            .with_target_tile(Some(to))
            .with_payload(json!({ "from": from, "to": to }));
        self.run(event, host, Vec::new())
    }

    /// A piece entered `tile`. Hazard `onEnter` effects run before the rules.
    pub fn on_enter_tile(
        &mut self,
        actor: &PieceId,
        tile: &Tile,
        host: &mut dyn Host,
    ) -> Result<Dispatch, EngineError> {
        let resolutions = self.hazards.handle_enter(tile);
        let event = Event::new(topics::ENTER_TILE)
            .with_actor(Some(actor))
            .with_target_tile(Some(tile));
        self.run(event, host, resolutions)
    }

    /// The host undid a move. Pops the state undo stack, then runs the rules.
    pub fn on_undo(&mut self, host: &mut dyn Host) -> Result<Dispatch, EngineError> {
        let restored = self.state.undo();
        let event = Event::new(topics::UNDO).with_payload(json!({ "restored": restored }));
        self.run(event, host, Vec::new())
    }

    /// A piece was promoted to `kind`.
    pub fn on_promote(
        &mut self,
        actor: &PieceId,
        kind: &str,
        host: &mut dyn Host,
    ) -> Result<Dispatch, EngineError> {
        let tile = host.piece(actor).map(|p| p.tile);
        let event = Event::new(topics::PROMOTE)
            .with_actor(Some(actor))
            .with_target_tile(tile.as_ref())
            .with_payload(json!({ "kind": kind }));
        self.run(event, host, Vec::new())
    }

    /// A new turn started.
    ///
    /// In order: cooldowns and statuses tick, hazards tick (their tick and
    /// expire effects run), occupied hazard tiles run `onStay`, then the rules.
    pub fn on_turn_start(&mut self, host: &mut dyn Host) -> Result<Dispatch, EngineError> {
        self.cooldowns.tick_all();
        for (piece, status) in tick_statuses(&mut self.state) {
            debug!(target: "variant::engine", piece = %piece, status = %status, "status expired");
        }

        let mut resolutions = self.hazards.tick();
        let mut occupied: Vec<Tile> = Vec::new();
        for tile in self.hazards.iter().flat_map(|hazard| hazard.tiles.iter()) {
            if !occupied.contains(tile) && !host.is_empty(tile) {
                occupied.push(tile.clone());
            }
        }
        for tile in &occupied {
            resolutions.extend(self.hazards.handle_stay(tile));
        }

        let turn = host.current();
        let event = Event::new(topics::TURN_START)
            .with_payload(json!({ "ply": turn.ply, "side": turn.side }));
        self.run(event, host, resolutions)
    }

    /// The player triggered a rule-declared UI action.
    ///
    /// Unknown action ids toast "Unknown action: <id>" and do nothing else.
    /// A piece standing on the target tile becomes the target piece.
    pub fn run_ui_action(
        &mut self,
        action_id: &str,
        actor: Option<&PieceId>,
        target_tile: Option<&Tile>,
        host: &mut dyn Host,
    ) -> Result<Dispatch, EngineError> {
        let topic = topics::ui(action_id);
        if !self.ui_actions.contains_key(action_id) {
            warn!(target: "variant::engine", action = action_id, "unknown ui action");
            host.toast(&format!("Unknown action: {action_id}"));
            return Ok(Dispatch::new(topic));
        }

        let occupant = target_tile.and_then(|tile| host.piece_at(tile)).map(|p| p.id);
        let mut event = Event::new(topic)
            .with_actor(actor)
            .with_target_tile(target_tile)
            .with_target_piece(occupant);
        event.ui_action = Some(action_id.to_string());
        self.run(event, host, Vec::new())
    }

    /// Run every `handlers` binding for `name`, unconditionally, in load order.
    pub fn on_raw_event(
        &mut self,
        name: &str,
        payload: Value,
        host: &mut dyn Host,
    ) -> Result<Dispatch, EngineError> {
        let event = Event::new(name).with_payload(payload);
        let published = event.to_value();
        let mut report = Dispatch::new(name);
        {
            let (mut ctx, rules) = self.split(event, host);
            let registry = ctx.registry;
            for rule in rules {
                let mut bound = false;
                for handler in rule.handlers.iter().filter(|h| h.event == name) {
                    if !bound {
                        ctx.bind(rule);
                        report.rules_evaluated += 1;
                        bound = true;
                    }
                    report.steps_run += 1;
                    for action in &handler.actions {
                        if registry.run_effect(action, &mut ctx) {
                            report.effects_run += 1;
                        }
                    }
                }
            }
        }
        self.publish(&published, report)
    }

    /// Evaluate the rules against an arbitrary event.
    pub fn dispatch(&mut self, event: Event, host: &mut dyn Host) -> Result<Dispatch, EngineError> {
        self.run(event, host, Vec::new())
    }

    /// Capture the persisted state of the session.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            cooldowns: self.cooldowns.snapshot(),
            state: self.state.snapshot(),
            hazards: self.hazards.clone(),
            rng: self.rng.state(),
        }
    }

    /// Resume from a snapshot. Loaded rules and bus subscribers are kept.
    pub fn restore(&mut self, snapshot: EngineSnapshot) {
        self.cooldowns.restore(snapshot.cooldowns);
        self.state.restore(snapshot.state);
        self.hazards = snapshot.hazards;
        self.rng = RuleRng::from_state(&snapshot.rng);
    }

    fn split<'a>(&'a mut self, event: Event, host: &'a mut dyn Host) -> (Context<'a>, &'a [RuleDocument]) {
        let Self {
            registry,
            rules,
            cooldowns,
            state,
            hazards,
            rng,
            ..
        } = self;
        let rules: &'a [RuleDocument] = rules;
        let ctx = Context::new(event, host, cooldowns, state, hazards, registry, rng);
        (ctx, rules)
    }

    fn run(
        &mut self,
        event: Event,
        host: &mut dyn Host,
        resolutions: Vec<Resolution>,
    ) -> Result<Dispatch, EngineError> {
        let published = event.to_value();
        let mut report = Dispatch::new(event.topic.as_str());
        {
            let (mut ctx, rules) = self.split(event, host);
            for resolution in &resolutions {
                debug!(
                    target: "variant::engine",
                    hazard = %resolution.hazard_id,
                    trigger = %resolution.kind,
                    effects = resolution.effects.len(),
                    "resolving hazard"
                );
                report.effects_run += ctx.run_resolution(resolution);
                report.hazard_resolutions += 1;
            }
            evaluate(&mut ctx, rules, &mut report);
        }
        self.publish(&published, report)
    }

    fn publish(&mut self, payload: &Value, report: Dispatch) -> Result<Dispatch, EngineError> {
        debug!(
            target: "variant::engine",
            topic = %report.topic,
            rules = report.rules_evaluated,
            steps = report.steps_run,
            effects = report.effects_run,
            blocked = report.blocked.len(),
            "dispatch complete"
        );
        for rule in &report.blocked {
            self.bus.emit(
                topics::RULE_BLOCKED,
                &json!({ "rule": rule, "topic": report.topic }),
            )?;
        }
        self.bus.emit(&report.topic, payload)?;
        Ok(report)
    }
}

/// Run every rule's logic against the context's event.
fn evaluate<'a>(ctx: &mut Context<'a>, rules: &'a [RuleDocument], report: &mut Dispatch) {
    let registry = ctx.registry;
    let topic = ctx.event.topic.clone();

    for rule in rules {
        ctx.bind(rule);
        report.rules_evaluated += 1;

        for step in rule.logic.iter().filter(|step| step.matches(&topic)) {
            let holds = step
                .condition
                .as_ref()
                .map_or(true, |condition| registry.run_condition(condition, ctx));

            if !holds {
                if step.blocks_on_fail() {
                    if let Some(message) = &step.message {
                        ctx.host.toast(message);
                    }
                    debug!(
                        target: "variant::engine",
                        rule = rule.id(),
                        step = %step.id,
                        "rule blocked"
                    );
                    report.blocked.push(rule.id().to_string());
                    break;
                }
                continue;
            }

            report.steps_run += 1;
            for action in &step.actions {
                if registry.run_effect(action, ctx) {
                    report.effects_run += 1;
                }
            }
        }
    }
}
