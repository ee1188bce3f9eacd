//! Board coordinates.
//!
//! Tiles use algebraic notation (`a1`, `e4`, `h8`). Files run `a..=z` and
//! ranks start at 1, so boards larger than 8x8 are representable; whether a
//! tile is actually on the board is the host's call
//! (see [`Board::within_board`](crate::host::Board::within_board)).
//!
//! ```
//! use variant_engine::Tile;
//!
//! let e4 = Tile::new("e4");
//! assert_eq!(e4.coords(), Some((4, 3)));
//! assert_eq!(e4.offset(1, 1), Some(Tile::new("f5")));
//! assert_eq!(e4.distance(&Tile::new("g7")), Some(3));
//! assert!(Tile::parse("z0").is_none());
//! ```

use serde::{Deserialize, Serialize};

/// A board square in algebraic notation.
///
/// Deserializing goes through [`Tile::new`], so `"E4"` in a document is the
/// same tile as `e4`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tile(String);

impl Tile {
    /// Create a tile without validating the notation.
    ///
    /// The name is lowercased. Use [`Tile::parse`] for untrusted input.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_ascii_lowercase())
    }

    /// Parse a tile, rejecting anything that is not `<file><rank>`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let tile = Self::new(name);
        tile.coords().map(|_| tile)
    }

    /// Build a tile from zero-based file and rank indices.
    #[must_use]
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file >= 26 {
            return None;
        }
        let letter = char::from(b'a' + file);
        Some(Self(format!("{}{}", letter, u16::from(rank) + 1)))
    }

    /// Zero-based `(file, rank)` indices, or `None` for malformed notation.
    #[must_use]
    pub fn coords(&self) -> Option<(u8, u8)> {
        let bytes = self.0.as_bytes();
        let (&file, rank) = bytes.split_first()?;
        if !file.is_ascii_lowercase() || rank.is_empty() || !rank.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let rank: u16 = self.0[1..].parse().ok()?;
        if rank == 0 || rank > 256 {
            return None;
        }
        Some((file - b'a', (rank - 1) as u8))
    }

    /// The tile `df` files and `dr` ranks away, if it has valid coordinates.
    #[must_use]
    pub fn offset(&self, df: i32, dr: i32) -> Option<Self> {
        let (file, rank) = self.coords()?;
        let file = u8::try_from(i32::from(file) + df).ok()?;
        let rank = u8::try_from(i32::from(rank) + dr).ok()?;
        Self::from_coords(file, rank)
    }

    /// The up to eight tiles touching this one.
    ///
    /// Board bounds are not applied here.
    #[must_use]
    pub fn adjacent(&self) -> Vec<Self> {
        let mut out = Vec::with_capacity(8);
        for dr in -1..=1 {
            for df in -1..=1 {
                if df == 0 && dr == 0 {
                    continue;
                }
                if let Some(tile) = self.offset(df, dr) {
                    out.push(tile);
                }
            }
        }
        out
    }

    /// Chebyshev (king-move) distance to another tile.
    #[must_use]
    pub fn distance(&self, other: &Tile) -> Option<u32> {
        let (f1, r1) = self.coords()?;
        let (f2, r2) = other.coords()?;
        let df = u32::from(f1.abs_diff(f2));
        let dr = u32::from(r1.abs_diff(r2));
        Some(df.max(dr))
    }

    /// The notation as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tile {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Tile {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Tile> for String {
    fn from(tile: Tile) -> Self {
        tile.0
    }
}
