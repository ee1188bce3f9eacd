//! Parameter resolution shared by built-in effects and providers.
//!
//! Tile and piece parameters accept literal values or placeholders:
//!
//! | Placeholder   | Tile parameter          | Piece parameter  |
//! |---------------|-------------------------|------------------|
//! | `$actor`      | the actor's tile        | the actor        |
//! | `$actorTile`  | the actor's tile        |                  |
//! | `$target`     | target piece's tile     | the target piece |
//! | `$targetTile` | the target tile         |                  |
//!
//! A tile parameter may also be `{ "provider": id, "args": [...] }`, which
//! takes the first tile the provider returns (or all of them for list
//! parameters).

use serde_json::Value;

use crate::core::{PieceId, Tile};
use crate::engine::{Context, Params};
use crate::error::PluginError;

pub(crate) const ACTOR: &str = "$actor";
pub(crate) const ACTOR_TILE: &str = "$actorTile";
pub(crate) const TARGET: &str = "$target";
pub(crate) const TARGET_TILE: &str = "$targetTile";

fn actor_tile(ctx: &Context<'_>) -> Result<Tile, PluginError> {
    ctx.actor_piece().map(|p| p.tile).ok_or(PluginError::NoActor)
}

fn target_tile(ctx: &Context<'_>) -> Result<Tile, PluginError> {
    ctx.target_piece()
        .map(|p| p.tile)
        .or_else(|| ctx.event.target_tile.clone())
        .ok_or(PluginError::NoTarget)
}

fn provider_results(
    ctx: &mut Context<'_>,
    spec: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<Vec<Value>, PluginError> {
    let id = spec
        .get("provider")
        .and_then(Value::as_str)
        .ok_or_else(|| PluginError::invalid(name, "expected a tile or a provider reference"))?;
    let args = spec
        .get("args")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let registry = ctx.registry;
    Ok(registry.run_provider(id, ctx, &args))
}

/// Resolve one tile value. `Null` resolves to `None`.
pub(crate) fn resolve_tile(
    ctx: &mut Context<'_>,
    value: &Value,
    name: &str,
) -> Result<Option<Tile>, PluginError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => match raw.as_str() {
            ACTOR | ACTOR_TILE => actor_tile(ctx).map(Some),
            TARGET => target_tile(ctx).map(Some),
            TARGET_TILE => ctx
                .event
                .target_tile
                .clone()
                .map(Some)
                .ok_or(PluginError::NoTarget),
            literal => Tile::parse(literal)
                .map(Some)
                .ok_or_else(|| PluginError::invalid(name, format!("`{literal}` is not a tile"))),
        },
        Value::Object(spec) => {
            let results = provider_results(ctx, spec, name)?;
            match results.first() {
                Some(Value::String(tile)) => Tile::parse(tile)
                    .map(Some)
                    .ok_or_else(|| PluginError::invalid(name, "provider returned a non-tile")),
                _ => Err(PluginError::Failed(format!(
                    "provider for `{name}` returned no tile"
                ))),
            }
        }
        _ => Err(PluginError::invalid(name, "expected a tile")),
    }
}

/// Resolve a list of tiles: an array, a single tile or a provider reference.
pub(crate) fn resolve_tiles(
    ctx: &mut Context<'_>,
    value: &Value,
    name: &str,
) -> Result<Vec<Tile>, PluginError> {
    match value {
        Value::Array(items) => {
            let mut tiles = Vec::with_capacity(items.len());
            for item in items {
                tiles.extend(resolve_tile(ctx, item, name)?);
            }
            Ok(tiles)
        }
        Value::Object(spec) => Ok(provider_results(ctx, spec, name)?
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Tile::parse)
            .collect()),
        single => Ok(resolve_tile(ctx, single, name)?.into_iter().collect()),
    }
}

/// Resolve one piece value. `Null` resolves to `None`.
pub(crate) fn resolve_piece(ctx: &Context<'_>, value: &Value, name: &str) -> Result<Option<PieceId>, PluginError> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => match raw.as_str() {
            ACTOR => ctx.event.actor.clone().map(Some).ok_or(PluginError::NoActor),
            TARGET => ctx
                .event
                .target_piece
                .clone()
                .map(Some)
                .ok_or(PluginError::NoTarget),
            literal => Ok(Some(PieceId::new(literal))),
        },
        _ => Err(PluginError::invalid(name, "expected a piece id")),
    }
}

/// Tile parameter `name`, if given.
pub(crate) fn tile_param(
    ctx: &mut Context<'_>,
    params: &Params,
    name: &str,
) -> Result<Option<Tile>, PluginError> {
    match params.get(name) {
        Some(value) => resolve_tile(ctx, value, name),
        None => Ok(None),
    }
}

/// Tile parameter `name`, falling back to the target tile.
pub(crate) fn tile_or_target(
    ctx: &mut Context<'_>,
    params: &Params,
    name: &str,
) -> Result<Tile, PluginError> {
    match tile_param(ctx, params, name)? {
        Some(tile) => Ok(tile),
        None => ctx.event.target_tile.clone().ok_or(PluginError::NoTarget),
    }
}

/// Piece parameter `name`, falling back to the actor.
pub(crate) fn piece_or_actor(ctx: &Context<'_>, params: &Params, name: &str) -> Result<PieceId, PluginError> {
    let given = match params.get(name) {
        Some(value) => resolve_piece(ctx, value, name)?,
        None => None,
    };
    given.or_else(|| ctx.event.actor.clone()).ok_or(PluginError::NoActor)
}

/// Piece parameter `name`, falling back to the target piece.
pub(crate) fn piece_or_target(ctx: &Context<'_>, params: &Params, name: &str) -> Result<PieceId, PluginError> {
    let given = match params.get(name) {
        Some(value) => resolve_piece(ctx, value, name)?,
        None => None,
    };
    given
        .or_else(|| ctx.event.target_piece.clone())
        .ok_or(PluginError::NoTarget)
}

pub(crate) fn str_param<'p>(params: &'p Params, name: &str) -> Result<Option<&'p str>, PluginError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(PluginError::invalid(name, "expected a string")),
    }
}

pub(crate) fn required_str<'p>(params: &'p Params, name: &str) -> Result<&'p str, PluginError> {
    str_param(params, name)?.ok_or_else(|| PluginError::MissingParam(name.to_string()))
}

pub(crate) fn u32_param(params: &Params, name: &str) -> Result<Option<u32>, PluginError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| PluginError::invalid(name, "expected a non-negative integer")),
    }
}

pub(crate) fn bool_param(params: &Params, name: &str) -> Result<bool, PluginError> {
    match params.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(PluginError::invalid(name, "expected a boolean")),
    }
}

/// A uniformly chosen empty on-board tile.
pub(crate) fn random_empty_tile(ctx: &mut Context<'_>) -> Option<Tile> {
    let empty: Vec<Tile> = ctx
        .host
        .tiles()
        .into_iter()
        .filter(|tile| ctx.host.is_empty(tile))
        .collect();
    ctx.rng.choose(&empty).cloned()
}
