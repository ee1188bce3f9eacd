//! Built-in providers. Tiles and pieces are returned as JSON strings.

use serde_json::Value;

use crate::core::Tile;
use crate::engine::Context;
use crate::error::PluginError;

use super::params::{random_empty_tile, resolve_tile};

/// First argument as a tile, falling back to the target tile.
fn tile_arg(ctx: &mut Context<'_>, args: &[Value]) -> Result<Tile, PluginError> {
    let given = match args.first() {
        Some(value) => resolve_tile(ctx, value, "tile")?,
        None => None,
    };
    given
        .or_else(|| ctx.event.target_tile.clone())
        .ok_or(PluginError::NoTarget)
}

fn tiles_to_values(tiles: impl IntoIterator<Item = Tile>) -> Vec<Value> {
    tiles
        .into_iter()
        .map(|tile| Value::from(tile.as_str()))
        .collect()
}

/// `[tile?]`: on-board tiles adjacent to a tile.
pub(super) fn neighbors(ctx: &mut Context<'_>, args: &[Value]) -> Result<Vec<Value>, PluginError> {
    let tile = tile_arg(ctx, args)?;
    Ok(tiles_to_values(ctx.host.neighbors(&tile)))
}

/// `[tile?]`: empty on-board tiles adjacent to a tile.
pub(super) fn empty_neighbors(ctx: &mut Context<'_>, args: &[Value]) -> Result<Vec<Value>, PluginError> {
    let tile = tile_arg(ctx, args)?;
    let empty: Vec<Tile> = ctx
        .host
        .neighbors(&tile)
        .into_iter()
        .filter(|t| ctx.host.is_empty(t))
        .collect();
    Ok(tiles_to_values(empty))
}

/// `[tile?, radius?]`: ids of pieces within `radius` (default 1) of a tile,
/// the center included.
pub(super) fn pieces_in_radius(ctx: &mut Context<'_>, args: &[Value]) -> Result<Vec<Value>, PluginError> {
    let center = tile_arg(ctx, args)?;
    let radius = match args.get(1) {
        None | Some(Value::Null) => 1,
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| PluginError::invalid("radius", "expected a non-negative integer"))?,
    };
    Ok(ctx
        .host
        .tiles()
        .iter()
        .filter(|tile| tile.distance(&center).is_some_and(|d| d <= radius))
        .filter_map(|tile| ctx.host.piece_at(tile))
        .map(|piece| Value::from(piece.id.as_str()))
        .collect())
}

/// `[tile?]`: ids of hazards covering a tile.
pub(super) fn hazards_at(ctx: &mut Context<'_>, args: &[Value]) -> Result<Vec<Value>, PluginError> {
    let tile = tile_arg(ctx, args)?;
    Ok(ctx
        .hazards
        .at(&tile)
        .map(|hazard| Value::from(hazard.id.as_str()))
        .collect())
}

/// `[]`: one random empty tile, or nothing on a full board.
pub(super) fn random_empty(ctx: &mut Context<'_>, _args: &[Value]) -> Result<Vec<Value>, PluginError> {
    Ok(tiles_to_values(random_empty_tile(ctx)))
}
