//! Namespaced rule state with whole-store undo.
//!
//! Each rule keeps its persistent data under its own namespace, lazily
//! created from the rule's `initialState` template. The undo stack snapshots
//! the *whole* store: undo granularity is global, not per rule, and a rule
//! author marks revert points explicitly with the `pushUndo` effect.
//!
//! The reserved [`STATUS_NAMESPACE`] holds piece status effects (frozen,
//! shielded...) shared by every rule.

mod store;
mod status;

pub use store::{StateStore, DEFAULT_UNDO_DEPTH};
pub use status::{add_status, has_status, remove_status, tick_statuses, STATUS_NAMESPACE};
