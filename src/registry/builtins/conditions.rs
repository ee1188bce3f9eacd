//! Built-in conditions.
//!
//! Conditions read the context and never change it. A condition that cannot
//! answer (no target, unbound rule, missing parameter) returns an error,
//! which the registry logs and treats as false.

use serde_json::Value;

use crate::engine::Context;
use crate::error::PluginError;
use crate::state::has_status;

pub(super) fn has_actor(ctx: &Context<'_>) -> Result<bool, PluginError> {
    Ok(ctx.actor_piece().is_some())
}

pub(super) fn has_target(ctx: &Context<'_>) -> Result<bool, PluginError> {
    Ok(ctx.event.target_piece.is_some() || ctx.event.target_tile.is_some())
}

pub(super) fn target_is_enemy(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let actor = ctx.actor_piece().ok_or(PluginError::NoActor)?;
    Ok(ctx
        .target_piece()
        .is_some_and(|target| target.is_enemy_of(&actor)))
}

pub(super) fn target_is_friendly(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let actor = ctx.actor_piece().ok_or(PluginError::NoActor)?;
    Ok(ctx
        .target_piece()
        .is_some_and(|target| target.side == actor.side && target.id != actor.id))
}

pub(super) fn target_tile_empty(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let tile = ctx.event.target_tile.as_ref().ok_or(PluginError::NoTarget)?;
    Ok(ctx.host.within_board(tile) && ctx.host.is_empty(tile))
}

pub(super) fn target_on_board(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let tile = ctx.event.target_tile.as_ref().ok_or(PluginError::NoTarget)?;
    Ok(ctx.host.within_board(tile))
}

pub(super) fn actor_in_scope(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let rule = ctx.rule().ok_or(PluginError::Unbound)?;
    let actor = ctx.actor_piece().ok_or(PluginError::NoActor)?;
    Ok(rule.scope.includes(&actor.kind, actor.side))
}

pub(super) fn is_actor_turn(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let actor = ctx.actor_piece().ok_or(PluginError::NoActor)?;
    Ok(ctx.host.current().side == actor.side)
}

pub(super) fn cooldown_ready(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let actor = ctx.event.actor.as_ref().ok_or(PluginError::NoActor)?;
    let key = ctx
        .action_key(None)
        .ok_or_else(|| PluginError::MissingParam("action".to_string()))?;
    Ok(ctx.cooldowns.is_ready(actor, &key))
}

/// Any hazard on the target tile, or only hazards of the rule's
/// `hazardType` parameter when declared.
pub(super) fn tile_has_hazard(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let tile = ctx.event.target_tile.as_ref().ok_or(PluginError::NoTarget)?;
    let kind = ctx.param("hazardType").and_then(Value::as_str);
    Ok(ctx
        .hazards
        .at(tile)
        .any(|hazard| kind.map_or(true, |kind| hazard.kind == kind)))
}

fn status_param<'a>(ctx: &Context<'a>) -> Result<&'a str, PluginError> {
    ctx.param("status")
        .and_then(Value::as_str)
        .ok_or_else(|| PluginError::MissingParam("status".to_string()))
}

pub(super) fn actor_has_status(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let status = status_param(ctx)?;
    let actor = ctx.event.actor.as_ref().ok_or(PluginError::NoActor)?;
    Ok(has_status(&*ctx.state, actor, status))
}

pub(super) fn target_has_status(ctx: &Context<'_>) -> Result<bool, PluginError> {
    let status = status_param(ctx)?;
    let target = ctx.event.target_piece.as_ref().ok_or(PluginError::NoTarget)?;
    Ok(has_status(&*ctx.state, target, status))
}
