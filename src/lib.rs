//! # variant-engine
//!
//! A rule interpretation runtime for chess variants. Authors describe new
//! piece abilities, traps, status effects and timed hazards as declarative
//! rule documents; the engine executes those documents against a running
//! game without recompiling game code.
//!
//! ## Design Principles
//!
//! 1. **Board-Agnostic**: The board, UI, audio and match controller are host
//!    collaborators reached through the traits in [`host`]. The engine queries
//!    them and never owns them.
//!
//! 2. **Content Fails Soft**: Unknown condition, effect or provider ids and
//!    failing plugin functions are logged and contained. One bad rule document
//!    degrades gracefully instead of halting the game.
//!
//! 3. **Owned, Not Global**: Every registry and store belongs to one
//!    [`RuleEngine`], so several game sessions can share a process.
//!
//! ## Modules
//!
//! - `core`: Tiles, pieces, sides, RNG, engine configuration
//! - `host`: Traits for the external collaborators, plus an in-memory host
//! - `registry`: Condition descriptors, the plugin registry, built-in plugins
//! - `events`: Topic names and the synchronous event bus
//! - `cooldown`: Per-(piece, action) turn counters
//! - `state`: Namespaced rule state with whole-store undo
//! - `hazards`: Tile-bound timed and triggered entities
//! - `engine`: Rule documents, the evaluation context, the rule engine
//!
//! ## Example
//!
//! ```
//! use variant_engine::{EngineConfig, MemoryHost, PieceId, RuleDocument, RuleEngine, Side, Tile};
//!
//! let rule = RuleDocument::from_json(r#"{
//!     "metadata": { "id": "sprint", "name": "Sprint" },
//!     "uiActions": [{ "id": "sprint", "label": "Sprint" }],
//!     "logic": [{
//!         "id": "dash",
//!         "when": "ui.sprint",
//!         "if": ["and", "hasActor", "cooldownReady"],
//!         "do": [
//!             { "action": "moveActor", "params": { "to": "$targetTile" } },
//!             { "action": "setCooldown", "params": { "turns": 2 } }
//!         ],
//!         "onFail": "blockAction",
//!         "message": "Sprint is recharging"
//!     }]
//! }"#).unwrap();
//!
//! let mut host = MemoryHost::new().with_piece("wn", "knight", Side::White, "b1");
//! let mut engine = RuleEngine::new(EngineConfig::default());
//! engine.load_rules(vec![rule], &mut host).unwrap();
//!
//! let knight = PieceId::new("wn");
//! engine.run_ui_action("sprint", Some(&knight), Some(&Tile::new("b4")), &mut host).unwrap();
//! assert_eq!(host.piece_tile(&knight), Some(Tile::new("b4")));
//! assert!(!engine.cooldowns().is_ready(&knight, "sprint"));
//! ```

pub mod core;
pub mod error;
pub mod host;
pub mod registry;
pub mod events;
pub mod cooldown;
pub mod state;
pub mod hazards;
pub mod engine;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, Piece, PieceId, RuleRng, Side, Tile, UnknownConditionPolicy,
};

pub use crate::error::{
    BusError, ConfigError, EngineError, HandlerError, HazardError, HostError, PersistError,
    PluginError,
};

pub use crate::host::{
    Board, CaptureHook, FxSurface, Host, MatchController, MemoryHost, TurnInfo, UiSurface,
};

pub use crate::registry::{
    BuiltinCondition, BuiltinEffect, BuiltinProvider, ConditionDescriptor, PluginKind, Registry,
    UnresolvedId,
};

pub use crate::events::{topics, EventBus, HandlerId};

pub use crate::cooldown::{CooldownRecord, CooldownTracker};

pub use crate::state::{StateStore, DEFAULT_UNDO_DEPTH};

pub use crate::hazards::{
    Hazard, HazardManager, HazardSpec, HazardTriggers, Resolution, TriggerKind,
};

pub use crate::engine::{
    ActionStep, Context, Dispatch, EngineSnapshot, Event, FailMode, HandlerBinding, HazardRef,
    LogicStep, Params, RuleDocument, RuleEngine, RuleMetadata, RuleScope, UiActionSpec,
};
