//! Rule documents and the engine that runs them.
//!
//! The match controller reports lifecycle moments (a move committed, a tile
//! entered, a turn started, a promotion, an undo) and the player triggers
//! UI actions. The [`RuleEngine`] turns each into an [`Event`], builds a
//! [`Context`] and walks every loaded rule's logic against it.
//!
//! ## Key Components
//!
//! - [`RuleDocument`], [`LogicStep`], [`ActionStep`]: authored content
//! - [`Context`]: what plugins see during one evaluation
//! - [`RuleEngine`]: loading, lifecycle entry points, snapshots
//! - [`Dispatch`]: the report every entry point returns
//!
//! ## Step Evaluation
//!
//! For each rule in load order, for each step whose `when` is the event
//! topic or `always`:
//!
//! 1. No `if`, or the condition holds: run the `do` actions in order.
//! 2. The condition fails and `onFail` is `blockAction`: toast the step's
//!    `message` (if any) and skip the rest of this rule.
//! 3. Otherwise skip the step.
//!
//! ## Example Usage
//!
//! ```
//! use variant_engine::{MemoryHost, PieceId, RuleDocument, RuleEngine, Side, Tile};
//!
//! let beacon = RuleDocument::from_json(r#"{
//!     "metadata": { "id": "beacon" },
//!     "scope": { "pieceTypes": ["rook"] },
//!     "logic": [{
//!         "id": "light",
//!         "when": "lifecycle.moveCommitted",
//!         "if": "actorInScope",
//!         "do": { "action": "spawnHazard", "params": {
//!             "type": "beacon", "tile": "$targetTile", "ttl": 2
//!         } }
//!     }]
//! }"#).unwrap();
//!
//! let mut host = MemoryHost::new().with_piece("wr", "rook", Side::White, "a1");
//! let mut engine = RuleEngine::default();
//! engine.load_rules(vec![beacon], &mut host).unwrap();
//!
//! let rook = PieceId::new("wr");
//! let report = engine
//!     .on_move_committed(&rook, &Tile::new("a1"), &Tile::new("a4"), &mut host)
//!     .unwrap();
//! assert_eq!(report.steps_run, 1);
//! assert_eq!(engine.hazards().at(&Tile::new("a4")).count(), 1);
//! ```

mod context;
mod rule;
mod runtime;

pub use context::{Context, Event, HazardRef};
pub use runtime::{Dispatch, EngineSnapshot, RuleEngine};
pub use rule::{
    ActionStep, FailMode, HandlerBinding, LogicStep, Params, RuleDocument, RuleMetadata, RuleScope,
    UiActionSpec,
};
