//! Built-in effects.

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::Side;
use crate::engine::{Context, Params};
use crate::error::PluginError;
use crate::hazards::{HazardSpec, HazardTriggers};
use crate::state::{add_status, remove_status};

use super::params::{
    bool_param, piece_or_actor, piece_or_target, random_empty_tile, required_str, resolve_tiles,
    str_param, tile_or_target, tile_param, u32_param,
};

pub(super) fn toast(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let message = required_str(params, "message")?;
    ctx.host.toast(message);
    Ok(())
}

/// `{ turns, action?, piece? }`: start a cooldown for the actor.
pub(super) fn set_cooldown(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let turns = u32_param(params, "turns")?
        .ok_or_else(|| PluginError::MissingParam("turns".to_string()))?;
    let piece = piece_or_actor(ctx, params, "piece")?;
    let key = ctx
        .action_key(Some(params))
        .ok_or_else(|| PluginError::MissingParam("action".to_string()))?;
    ctx.cooldowns.set(&piece, &key, turns);
    Ok(())
}

/// `{ piece?, reason? }`: capture through the host, the target by default.
pub(super) fn capture(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let piece = piece_or_target(ctx, params, "piece")?;
    let reason = match str_param(params, "reason")? {
        Some(reason) => reason.to_string(),
        None => ctx.rule_id().unwrap_or("rule").to_string(),
    };
    ctx.host.capture_piece(&piece, &reason)?;
    Ok(())
}

/// `{ to?, piece? }`: move a piece (the actor) to a tile (the target tile).
pub(super) fn move_actor(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let piece = piece_or_actor(ctx, params, "piece")?;
    let to = tile_or_target(ctx, params, "to")?;
    ctx.host.set_piece_tile(&piece, &to)?;
    Ok(())
}

/// `{ piece? }`: move a piece (the actor) to a random empty tile.
pub(super) fn teleport_random(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let piece = piece_or_actor(ctx, params, "piece")?;
    let to = random_empty_tile(ctx)
        .ok_or_else(|| PluginError::Failed("no empty tile to teleport to".to_string()))?;
    ctx.host.set_piece_tile(&piece, &to)?;
    Ok(())
}

/// `{ kind, side?, tile? }`: spawn a piece. `side` defaults to the actor's
/// side and also accepts `opponent`.
pub(super) fn spawn_piece(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let kind = required_str(params, "kind")?;
    let actor_side = ctx.actor_piece().map(|p| p.side);
    let side = match str_param(params, "side")? {
        Some("opponent") => actor_side.map(Side::opponent).ok_or(PluginError::NoActor)?,
        Some(name) => Side::parse(name).ok_or_else(|| PluginError::invalid("side", name))?,
        None => actor_side.ok_or_else(|| PluginError::MissingParam("side".to_string()))?,
    };
    let tile = tile_or_target(ctx, params, "tile")?;
    let id = ctx.host.spawn_piece(kind, side, &tile)?;
    debug!(target: "variant::engine", piece = %id, tile = %tile, "piece spawned");
    Ok(())
}

/// `{ piece? }`: remove a piece without capture bookkeeping.
pub(super) fn remove_piece(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let piece = piece_or_target(ctx, params, "piece")?;
    ctx.host.remove_piece(&piece)?;
    Ok(())
}

/// `{ type, id?, tile?, area?, ttl?, payload?, triggers? }`.
///
/// With neither `tile` nor `area` the hazard goes on the target tile.
pub(super) fn spawn_hazard(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let kind = required_str(params, "type")?.to_string();
    let area = match params.get("area") {
        Some(value) => resolve_tiles(ctx, value, "area")?,
        None => Vec::new(),
    };
    let tile = match tile_param(ctx, params, "tile")? {
        Some(tile) => Some(tile),
        None if area.is_empty() => ctx.event.target_tile.clone(),
        None => None,
    };
    let ttl = match params.get("ttl") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| PluginError::invalid("ttl", "expected an integer"))?,
        ),
    };
    let triggers = match params.get("triggers") {
        Some(value) => serde_json::from_value::<HazardTriggers>(value.clone())
            .map_err(|err| PluginError::invalid("triggers", err.to_string()))?,
        None => HazardTriggers::default(),
    };

    let spec = HazardSpec {
        id: str_param(params, "id")?.map(str::to_string),
        kind,
        tile,
        area,
        ttl,
        payload: params.get("payload").cloned().unwrap_or(Value::Null),
        triggers,
    };
    ctx.hazards.spawn(spec)?;
    Ok(())
}

/// The `id` parameter, falling back to the hazard being resolved.
fn hazard_id(ctx: &Context<'_>, params: &Params) -> Result<String, PluginError> {
    match str_param(params, "id")? {
        Some(id) => Ok(id.to_string()),
        None => ctx
            .hazard
            .as_ref()
            .map(|hazard| hazard.id.clone())
            .ok_or_else(|| PluginError::MissingParam("id".to_string())),
    }
}

/// `{ id?, radius? }`: detonate a hazard and run its explode effects.
pub(super) fn explode_hazard(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let id = hazard_id(ctx, params)?;
    let radius = u32_param(params, "radius")?.unwrap_or(1);
    let resolution = ctx.hazards.explode(&id, radius)?;
    ctx.run_resolution(&resolution);
    Ok(())
}

/// `{ id? }`: remove a hazard. Absent hazards are ignored.
pub(super) fn remove_hazard(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let id = hazard_id(ctx, params)?;
    ctx.hazards.remove(&id);
    Ok(())
}

/// `{ tile?, radius?, reason?, spareActor? }`: capture every piece within
/// `radius` (default 1) of a tile (the target tile).
pub(super) fn explode(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let center = tile_or_target(ctx, params, "tile")?;
    let radius = u32_param(params, "radius")?.unwrap_or(1);
    let reason = str_param(params, "reason")?.unwrap_or("explosion").to_string();
    let spare = if bool_param(params, "spareActor")? {
        ctx.event.actor.clone()
    } else {
        None
    };

    let victims: Vec<_> = ctx
        .host
        .tiles()
        .iter()
        .filter(|tile| tile.distance(&center).is_some_and(|d| d <= radius))
        .filter_map(|tile| ctx.host.piece_at(tile))
        .map(|piece| piece.id)
        .filter(|id| Some(id) != spare.as_ref())
        .collect();

    debug!(
        target: "variant::engine",
        center = %center,
        radius,
        victims = victims.len(),
        "explosion"
    );
    for victim in &victims {
        ctx.host.capture_piece(victim, &reason)?;
    }
    Ok(())
}

/// `{ decal, tile? }`
pub(super) fn set_decal(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let decal = required_str(params, "decal")?;
    let tile = tile_or_target(ctx, params, "tile")?;
    ctx.host.set_decal(&tile, decal);
    Ok(())
}

/// `{ tile? }`
pub(super) fn clear_decal(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let tile = tile_or_target(ctx, params, "tile")?;
    ctx.host.clear_decal(&tile);
    Ok(())
}

/// `{ name, tile? }`
pub(super) fn play_animation(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let name = required_str(params, "name")?;
    let tile = tile_param(ctx, params, "tile")?;
    ctx.host.play_animation(name, tile.as_ref());
    Ok(())
}

/// `{ name }`
pub(super) fn play_audio(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let name = required_str(params, "name")?;
    ctx.host.play_audio(name);
    Ok(())
}

pub(super) fn end_turn(ctx: &mut Context<'_>, _params: &Params) -> Result<(), PluginError> {
    ctx.host.end_turn();
    Ok(())
}

pub(super) fn push_undo(ctx: &mut Context<'_>, _params: &Params) -> Result<(), PluginError> {
    ctx.state.push_undo();
    Ok(())
}

fn state_object<'c>(ctx: &'c mut Context<'_>) -> Result<&'c mut Map<String, Value>, PluginError> {
    ctx.rule_state_mut()?
        .as_object_mut()
        .ok_or_else(|| PluginError::invalid("state", "rule state is not an object"))
}

/// `{ key, value }`: set one key of the rule's state.
pub(super) fn set_state(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let key = required_str(params, "key")?;
    let value = params
        .get("value")
        .cloned()
        .ok_or_else(|| PluginError::MissingParam("value".to_string()))?;
    state_object(ctx)?.insert(key.to_string(), value);
    Ok(())
}

/// `{ key, by? }`: add `by` (default 1) to a numeric state key. A missing
/// key counts as zero.
pub(super) fn increment_state(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let key = required_str(params, "key")?;
    let by = match params.get("by") {
        None => Value::from(1),
        Some(value) if value.is_number() => value.clone(),
        Some(_) => return Err(PluginError::invalid("by", "expected a number")),
    };

    let state = state_object(ctx)?;
    let current = state.get(key).cloned().unwrap_or(Value::from(0));
    let next = match (current.as_i64(), by.as_i64()) {
        (Some(a), Some(b)) => a
            .checked_add(b)
            .map(Value::from)
            .ok_or_else(|| PluginError::invalid("by", "integer overflow"))?,
        _ => match (current.as_f64(), by.as_f64()) {
            (Some(a), Some(b)) => Value::from(a + b),
            _ => return Err(PluginError::invalid(key, "state value is not a number")),
        },
    };
    state.insert(key.to_string(), next);
    Ok(())
}

/// `{ status, turns?, piece? }`: `turns` absent means until removed.
pub(super) fn add_status_effect(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let status = required_str(params, "status")?;
    let turns = u32_param(params, "turns")?;
    let piece = piece_or_target(ctx, params, "piece")?;
    add_status(ctx.state, &piece, status, turns);
    Ok(())
}

/// `{ status, piece? }`
pub(super) fn remove_status_effect(ctx: &mut Context<'_>, params: &Params) -> Result<(), PluginError> {
    let status = required_str(params, "status")?;
    let piece = piece_or_target(ctx, params, "piece")?;
    remove_status(ctx.state, &piece, status);
    Ok(())
}
