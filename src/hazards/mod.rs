//! Tile-bound hazards: traps, fires, bombs, sanctuaries.
//!
//! A hazard occupies a fixed set of tiles, optionally counts down a
//! time-to-live, and carries effect lists for its triggers. The
//! [`HazardManager`] never runs effects itself: every lifecycle call returns
//! [`Resolution`]s that the engine executes through the registry.
//!
//! ## Key Components
//!
//! - [`HazardSpec`]: what a rule or host asks to spawn
//! - [`Hazard`]: a live hazard
//! - [`HazardManager`]: spawning, ticking, trigger lookup, persistence
//! - [`Resolution`]: effects the caller should run, with their origin
//!
//! ## Example Usage
//!
//! ```
//! use serde_json::json;
//! use variant_engine::{HazardManager, HazardSpec, Tile, TriggerKind};
//!
//! let mut hazards = HazardManager::new();
//! let spec: HazardSpec = serde_json::from_value(json!({
//!     "type": "fire",
//!     "tile": "e4",
//!     "ttl": 1,
//!     "triggers": { "onEnter": [{ "action": "capture", "params": { "piece": "$target" } }] }
//! })).unwrap();
//!
//! let id = hazards.spawn(spec).unwrap().id.clone();
//! assert_eq!(hazards.handle_enter(&Tile::new("e4")).len(), 1);
//!
//! let resolutions = hazards.tick();
//! assert_eq!(resolutions[0].kind, TriggerKind::Expire);
//! assert!(hazards.get(&id).is_none());
//! ```

mod hazard;
mod manager;

pub use hazard::{Hazard, HazardSpec, HazardTriggers, Resolution, TriggerKind};
pub use manager::HazardManager;
