//! Interfaces to the external collaborators.
//!
//! The rule runtime does not own the board, the UI, the audio/VFX layer or
//! the match controller. It reaches them through these traits, bundled as
//! [`Host`] and borrowed for the duration of one dispatch.
//!
//! ## Key Components
//!
//! - [`Board`]: piece queries and mutations
//! - [`UiSurface`]: action buttons and toast messages
//! - [`FxSurface`]: animations and sounds
//! - [`MatchController`]: whose turn it is
//! - [`CaptureHook`]: removing a piece through the game's capture path
//! - [`MemoryHost`]: a complete in-memory host for tests and tooling

mod memory;

pub use memory::MemoryHost;

use serde::{Deserialize, Serialize};

use crate::core::{Piece, PieceId, Side, Tile};
use crate::engine::UiActionSpec;
use crate::error::HostError;

/// Board queries and mutations.
pub trait Board {
    /// Look up a piece by ID.
    fn piece(&self, id: &PieceId) -> Option<Piece>;

    /// The piece standing on `tile`, if any.
    fn piece_at(&self, tile: &Tile) -> Option<Piece>;

    /// Move a piece to `tile` without any chess legality checks.
    fn set_piece_tile(&mut self, id: &PieceId, tile: &Tile) -> Result<(), HostError>;

    /// Create a new piece. Returns the ID the board assigned.
    fn spawn_piece(&mut self, kind: &str, side: Side, tile: &Tile) -> Result<PieceId, HostError>;

    /// Remove a piece silently (no capture bookkeeping).
    fn remove_piece(&mut self, id: &PieceId) -> Result<Piece, HostError>;

    /// Is `tile` part of the board?
    fn within_board(&self, tile: &Tile) -> bool;

    /// Every tile of the board.
    fn tiles(&self) -> Vec<Tile>;

    /// Mark a tile with a decal (scorch mark, ice, rune...).
    fn set_decal(&mut self, tile: &Tile, decal: &str);

    /// Remove a tile's decal.
    fn clear_decal(&mut self, tile: &Tile);

    /// True if no piece stands on `tile`.
    fn is_empty(&self, tile: &Tile) -> bool {
        self.piece_at(tile).is_none()
    }

    /// On-board tiles touching `tile`.
    fn neighbors(&self, tile: &Tile) -> Vec<Tile> {
        tile.adjacent()
            .into_iter()
            .filter(|t| self.within_board(t))
            .collect()
    }
}

/// UI collaborator.
pub trait UiSurface {
    /// Offer an action button declared by a rule.
    fn register_action(&mut self, spec: &UiActionSpec);

    /// Show a short message to the player.
    fn toast(&mut self, message: &str);
}

/// Visual effects and audio collaborator.
pub trait FxSurface {
    fn play_animation(&mut self, name: &str, tile: Option<&Tile>);

    fn play_audio(&mut self, name: &str);
}

/// Current turn as reported by the match controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    /// Half-moves played so far.
    pub ply: u32,
    /// Side to move.
    pub side: Side,
}

/// Match controller collaborator.
pub trait MatchController {
    fn current(&self) -> TurnInfo;

    fn end_turn(&mut self);

    fn set_turn(&mut self, side: Side);
}

/// Capture collaborator. Captures go through the game so it can keep its
/// material count, move history and sounds consistent.
pub trait CaptureHook {
    fn capture_piece(&mut self, id: &PieceId, reason: &str) -> Result<(), HostError>;
}

/// Everything the rule runtime needs from its host.
///
/// Implemented automatically for any type implementing all collaborator
/// traits.
pub trait Host: Board + UiSurface + FxSurface + MatchController + CaptureHook {}

impl<T> Host for T where T: Board + UiSurface + FxSurface + MatchController + CaptureHook + ?Sized {}
