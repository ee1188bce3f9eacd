//! Event topics and the synchronous event bus.
//!
//! Topics are plain strings. The lifecycle topics the engine raises live in
//! [`topics`]; UI actions use `ui.<actionId>`. Rule logic steps name the
//! topic they react to in their `when` field.
//!
//! ## Example Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use serde_json::json;
//! use variant_engine::{topics, EventBus};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut bus = EventBus::new();
//!
//! let sink = Rc::clone(&seen);
//! bus.on(topics::TURN_START, move |payload| {
//!     sink.borrow_mut().push(payload.clone());
//!     Ok(())
//! });
//!
//! bus.emit(topics::TURN_START, &json!({ "ply": 4 })).unwrap();
//! assert_eq!(seen.borrow().len(), 1);
//! ```

mod bus;

pub use bus::{EventBus, Handler, HandlerId};

/// Well-known topic names.
pub mod topics {
    /// Sentinel `when` value matching every topic.
    pub const ALWAYS: &str = "always";

    /// A move was committed to the board.
    pub const MOVE_COMMITTED: &str = "lifecycle.moveCommitted";

    /// A piece entered a tile (after moving, teleporting or spawning).
    pub const ENTER_TILE: &str = "lifecycle.enterTile";

    /// The player asked to undo.
    pub const UNDO: &str = "lifecycle.undo";

    /// A piece was promoted.
    pub const PROMOTE: &str = "lifecycle.promote";

    /// A new turn started.
    pub const TURN_START: &str = "lifecycle.turnStart";

    /// Emitted on the engine bus after a rule set is loaded.
    pub const RULES_LOADED: &str = "rules.loaded";

    /// Emitted on the engine bus when a `blockAction` step aborts a rule.
    pub const RULE_BLOCKED: &str = "rule.blocked";

    /// Prefix of UI action topics.
    pub const UI_PREFIX: &str = "ui.";

    /// Topic of a UI action: `ui.<actionId>`.
    #[must_use]
    pub fn ui(action_id: &str) -> String {
        format!("{UI_PREFIX}{action_id}")
    }
}
