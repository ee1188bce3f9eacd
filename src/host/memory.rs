//! In-memory host.
//!
//! A small but complete implementation of every host trait. The board is a
//! rectangle of `files x ranks` tiles; UI, audio and capture calls are
//! recorded so tests (and rule authoring tools) can inspect what a rule did.

use std::collections::BTreeMap;

use crate::core::{Piece, PieceId, Side, Tile};
use crate::engine::UiActionSpec;
use crate::error::HostError;

use super::{Board, CaptureHook, FxSurface, MatchController, TurnInfo, UiSurface};

/// In-memory board plus recording UI/FX/match collaborators.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    files: u8,
    ranks: u8,
    pieces: BTreeMap<PieceId, Piece>,
    decals: BTreeMap<Tile, String>,
    turn: TurnInfo,
    next_spawn: u32,

    /// UI actions registered by loaded rules, in registration order.
    pub actions: Vec<UiActionSpec>,
    /// Toast messages, oldest first.
    pub toasts: Vec<String>,
    /// Animations played, with the tile they were anchored to.
    pub animations: Vec<(String, Option<Tile>)>,
    /// Sounds played.
    pub sounds: Vec<String>,
    /// Captured pieces and the reason given.
    pub captures: Vec<(Piece, String)>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// An empty 8x8 board with white to move.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(8, 8)
    }

    /// An empty board of the given size (at most 26 files).
    #[must_use]
    pub fn with_size(files: u8, ranks: u8) -> Self {
        Self {
            files: files.min(26),
            ranks,
            pieces: BTreeMap::new(),
            decals: BTreeMap::new(),
            turn: TurnInfo {
                ply: 0,
                side: Side::White,
            },
            next_spawn: 0,
            actions: Vec::new(),
            toasts: Vec::new(),
            animations: Vec::new(),
            sounds: Vec::new(),
            captures: Vec::new(),
        }
    }

    /// Place a piece (builder pattern). Replaces any piece on that tile.
    #[must_use]
    pub fn with_piece(mut self, id: &str, kind: &str, side: Side, tile: &str) -> Self {
        self.place(Piece::new(id, kind, side, tile));
        self
    }

    /// Place a piece, replacing whatever stood on its tile.
    pub fn place(&mut self, piece: Piece) {
        self.pieces.retain(|_, p| p.tile != piece.tile);
        self.pieces.insert(piece.id.clone(), piece);
    }

    /// Current tile of a piece.
    #[must_use]
    pub fn piece_tile(&self, id: &PieceId) -> Option<Tile> {
        self.pieces.get(id).map(|p| p.tile.clone())
    }

    /// Decal on a tile.
    #[must_use]
    pub fn decal(&self, tile: &Tile) -> Option<&str> {
        self.decals.get(tile).map(String::as_str)
    }

    /// Number of pieces on the board.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Iterate all pieces, ordered by ID.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.values()
    }

    fn check_on_board(&self, tile: &Tile) -> Result<(), HostError> {
        if self.within_board(tile) {
            Ok(())
        } else {
            Err(HostError::OffBoard(tile.clone()))
        }
    }
}

impl Board for MemoryHost {
    fn piece(&self, id: &PieceId) -> Option<Piece> {
        self.pieces.get(id).cloned()
    }

    fn piece_at(&self, tile: &Tile) -> Option<Piece> {
        self.pieces.values().find(|p| &p.tile == tile).cloned()
    }

    fn set_piece_tile(&mut self, id: &PieceId, tile: &Tile) -> Result<(), HostError> {
        self.check_on_board(tile)?;
        if let Some(other) = self.piece_at(tile) {
            if &other.id != id {
                return Err(HostError::Occupied(tile.clone()));
            }
        }
        let piece = self
            .pieces
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownPiece(id.clone()))?;
        piece.tile = tile.clone();
        Ok(())
    }

    fn spawn_piece(&mut self, kind: &str, side: Side, tile: &Tile) -> Result<PieceId, HostError> {
        self.check_on_board(tile)?;
        if !self.is_empty(tile) {
            return Err(HostError::Occupied(tile.clone()));
        }
        self.next_spawn += 1;
        let id = PieceId::new(format!("{}-{}", kind, self.next_spawn));
        self.pieces
            .insert(id.clone(), Piece::new(id.clone(), kind, side, tile.clone()));
        Ok(id)
    }

    fn remove_piece(&mut self, id: &PieceId) -> Result<Piece, HostError> {
        self.pieces
            .remove(id)
            .ok_or_else(|| HostError::UnknownPiece(id.clone()))
    }

    fn within_board(&self, tile: &Tile) -> bool {
        tile.coords()
            .is_some_and(|(file, rank)| file < self.files && rank < self.ranks)
    }

    fn tiles(&self) -> Vec<Tile> {
        let mut out = Vec::with_capacity(usize::from(self.files) * usize::from(self.ranks));
        for rank in 0..self.ranks {
            for file in 0..self.files {
                if let Some(tile) = Tile::from_coords(file, rank) {
                    out.push(tile);
                }
            }
        }
        out
    }

    fn set_decal(&mut self, tile: &Tile, decal: &str) {
        self.decals.insert(tile.clone(), decal.to_string());
    }

    fn clear_decal(&mut self, tile: &Tile) {
        self.decals.remove(tile);
    }
}

impl UiSurface for MemoryHost {
    fn register_action(&mut self, spec: &UiActionSpec) {
        self.actions.push(spec.clone());
    }

    fn toast(&mut self, message: &str) {
        self.toasts.push(message.to_string());
    }
}

impl FxSurface for MemoryHost {
    fn play_animation(&mut self, name: &str, tile: Option<&Tile>) {
        self.animations.push((name.to_string(), tile.cloned()));
    }

    fn play_audio(&mut self, name: &str) {
        self.sounds.push(name.to_string());
    }
}

impl MatchController for MemoryHost {
    fn current(&self) -> TurnInfo {
        self.turn
    }

    fn end_turn(&mut self) {
        self.turn.ply += 1;
        self.turn.side = self.turn.side.opponent();
    }

    fn set_turn(&mut self, side: Side) {
        self.turn.side = side;
    }
}

impl CaptureHook for MemoryHost {
    fn capture_piece(&mut self, id: &PieceId, reason: &str) -> Result<(), HostError> {
        let piece = self.remove_piece(id)?;
        self.captures.push((piece, reason.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MemoryHost {
        MemoryHost::new()
            .with_piece("wk", "king", Side::White, "e1")
            .with_piece("bk", "king", Side::Black, "e8")
    }

    #[test]
    fn test_queries() {
        let host = host();
        assert_eq!(host.piece(&PieceId::new("wk")).unwrap().tile, Tile::new("e1"));
        assert_eq!(host.piece_at(&Tile::new("e8")).unwrap().id, PieceId::new("bk"));
        assert!(host.is_empty(&Tile::new("d4")));
        assert_eq!(host.tiles().len(), 64);
    }

    #[test]
    fn test_within_board() {
        let host = MemoryHost::with_size(10, 10);
        assert!(host.within_board(&Tile::new("j10")));
        assert!(!host.within_board(&Tile::new("k1")));
        assert!(!host.within_board(&Tile::new("a11")));
        assert!(!MemoryHost::new().within_board(&Tile::new("i1")));
    }

    #[test]
    fn test_neighbors_respect_bounds() {
        let host = host();
        assert_eq!(host.neighbors(&Tile::new("h8")).len(), 3);
        assert_eq!(host.neighbors(&Tile::new("d4")).len(), 8);
    }

    #[test]
    fn test_set_piece_tile() {
        let mut host = host();
        let wk = PieceId::new("wk");

        host.set_piece_tile(&wk, &Tile::new("e2")).unwrap();
        assert_eq!(host.piece_tile(&wk), Some(Tile::new("e2")));

        let err = host.set_piece_tile(&wk, &Tile::new("e8")).unwrap_err();
        assert_eq!(err, HostError::Occupied(Tile::new("e8")));

        let err = host.set_piece_tile(&wk, &Tile::new("e9")).unwrap_err();
        assert_eq!(err, HostError::OffBoard(Tile::new("e9")));
    }

    #[test]
    fn test_spawn_and_capture() {
        let mut host = host();
        let id = host
            .spawn_piece("pawn", Side::Black, &Tile::new("d5"))
            .unwrap();
        assert_eq!(host.piece_count(), 3);

        host.capture_piece(&id, "explosion").unwrap();
        assert_eq!(host.piece_count(), 2);
        assert_eq!(host.captures.len(), 1);
        assert_eq!(host.captures[0].1, "explosion");

        assert!(host.capture_piece(&id, "again").is_err());
    }

    #[test]
    fn test_turns() {
        let mut host = host();
        assert_eq!(host.current().side, Side::White);
        host.end_turn();
        assert_eq!(host.current(), TurnInfo { ply: 1, side: Side::Black });
        host.set_turn(Side::White);
        assert_eq!(host.current().side, Side::White);
    }
}
