//! Error types.
//!
//! The runtime separates errors by who is expected to handle them:
//!
//! - [`PluginError`]: a built-in or host-registered plugin failed. Always
//!   caught and logged at the [`Registry`](crate::registry::Registry) boundary.
//! - [`HazardError`]: a structural mistake by the caller (spawning without
//!   tiles, exploding an unknown hazard). Returned as a hard error.
//! - [`PersistError`]: a snapshot payload could not be encoded or decoded.
//! - [`BusError`]: an [`EventBus`](crate::events::EventBus) subscriber failed.
//!   Propagated to whoever emitted.

use thiserror::Error;

use crate::core::{PieceId, Tile};

/// Errors raised by host collaborators (board, capture hook).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown piece `{0}`")]
    UnknownPiece(PieceId),

    #[error("tile `{0}` is off the board")]
    OffBoard(Tile),

    #[error("tile `{0}` is occupied")]
    Occupied(Tile),

    #[error("host rejected the request: {0}")]
    Rejected(String),
}

/// Errors raised by hazard lifecycle operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HazardError {
    #[error("hazard `{kind}` needs a tile or a non-empty area")]
    NoTiles { kind: String },

    #[error("unknown hazard `{0}`")]
    Unknown(String),
}

/// Errors raised inside plugin functions.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("missing parameter `{0}`")]
    MissingParam(String),

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: String, reason: String },

    #[error("no acting piece in context")]
    NoActor,

    #[error("no target in context")]
    NoTarget,

    #[error("no rule bound to the context")]
    Unbound,

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Hazard(#[from] HazardError),

    #[error("{0}")]
    Failed(String),
}

impl PluginError {
    /// Shorthand for [`PluginError::InvalidParam`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when encoding or decoding persisted state.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("malformed {store} payload: {source}")]
    Malformed {
        store: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {store}: {source}")]
    Encode {
        store: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reported by an event bus subscriber.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised by the event bus.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("subscriber to `{topic}` failed: {source}")]
    Subscriber {
        topic: String,
        #[source]
        source: HandlerError,
    },
}

/// Errors surfaced by [`RuleEngine`](crate::engine::RuleEngine) entry points.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Errors raised when loading an [`EngineConfig`](crate::core::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Toml(#[from] toml::de::Error),
}
