//! Piece identity and sides.
//!
//! The board model belongs to the host. The engine only sees pieces as
//! read-only [`Piece`] values returned by board queries.

use serde::{Deserialize, Serialize};

use super::Tile;

/// Unique identifier of a piece on the host board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(String);

impl PieceId {
    /// Create a new piece ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PieceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PieceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The two sides of a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Parse `white`/`black` (also `w`/`b`), case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "white" | "w" => Some(Side::White),
            "black" | "b" => Some(Side::Black),
            _ => None,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot of one piece as reported by the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    /// Piece type, e.g. `knight`. Variant pieces use their own names.
    pub kind: String,
    pub side: Side,
    pub tile: Tile,
}

impl Piece {
    pub fn new(id: impl Into<PieceId>, kind: impl Into<String>, side: Side, tile: impl Into<Tile>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            side,
            tile: tile.into(),
        }
    }

    /// True if both pieces belong to different sides.
    #[must_use]
    pub fn is_enemy_of(&self, other: &Piece) -> bool {
        self.side != other.side
    }
}

impl From<String> for PieceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("White"), Some(Side::White));
        assert_eq!(Side::parse("b"), Some(Side::Black));
        assert_eq!(Side::parse("red"), None);
        assert_eq!(Side::White.opponent(), Side::Black);
    }

    #[test]
    fn test_enemy_check() {
        let knight = Piece::new("wn", "knight", Side::White, "b1");
        let pawn = Piece::new("bp", "pawn", Side::Black, "b7");
        let rook = Piece::new("wr", "rook", Side::White, "a1");

        assert!(knight.is_enemy_of(&pawn));
        assert!(!knight.is_enemy_of(&rook));
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece::new("wq", "queen", Side::White, "d1");
        let json = serde_json::to_string(&piece).unwrap();
        assert!(json.contains("\"side\":\"white\""));
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(back, piece);
    }
}
