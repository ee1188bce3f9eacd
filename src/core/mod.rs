//! Core types: tiles, pieces, sides, RNG, configuration.
//!
//! These are the vocabulary shared by the host interfaces and the rule
//! runtime. None of them owns board state.

pub mod tile;
pub mod piece;
pub mod rng;
pub mod config;

pub use tile::Tile;
pub use piece::{Piece, PieceId, Side};
pub use rng::{RuleRng, RuleRngState};
pub use config::{EngineConfig, UnknownConditionPolicy};
