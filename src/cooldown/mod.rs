//! Per-piece ability cooldowns.
//!
//! A cooldown is a remaining-turns counter keyed by (piece, action). Rules
//! set one after using an ability (`setCooldown`) and check it before the
//! next use (`cooldownReady`); the engine ticks every counter at the start of
//! each turn.

mod tracker;

pub use tracker::{CooldownRecord, CooldownTracker};
