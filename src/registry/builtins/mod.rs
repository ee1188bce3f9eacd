//! Built-in plugin content.
//!
//! Every built-in id is a variant of [`BuiltinCondition`], [`BuiltinEffect`]
//! or [`BuiltinProvider`], so the default catalog is checked at compile
//! time. The registry tables stay string-keyed and open: hosts register
//! their own plugins next to these, and may replace any of them.

mod conditions;
mod effects;
mod params;
mod providers;

use serde_json::Value;

use crate::engine::{Context, Params};
use crate::error::PluginError;

use super::Registry;

type ConditionPtr = fn(&Context<'_>) -> Result<bool, PluginError>;
type EffectPtr = fn(&mut Context<'_>, &Params) -> Result<(), PluginError>;
type ProviderPtr = fn(&mut Context<'_>, &[Value]) -> Result<Vec<Value>, PluginError>;

/// Built-in conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinCondition {
    HasActor,
    HasTarget,
    TargetIsEnemy,
    TargetIsFriendly,
    TargetTileEmpty,
    TargetOnBoard,
    ActorInScope,
    IsActorTurn,
    CooldownReady,
    TileHasHazard,
    ActorHasStatus,
    TargetHasStatus,
}

impl BuiltinCondition {
    pub const ALL: [Self; 12] = [
        Self::HasActor,
        Self::HasTarget,
        Self::TargetIsEnemy,
        Self::TargetIsFriendly,
        Self::TargetTileEmpty,
        Self::TargetOnBoard,
        Self::ActorInScope,
        Self::IsActorTurn,
        Self::CooldownReady,
        Self::TileHasHazard,
        Self::ActorHasStatus,
        Self::TargetHasStatus,
    ];

    /// The id rule documents use.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::HasActor => "hasActor",
            Self::HasTarget => "hasTarget",
            Self::TargetIsEnemy => "targetIsEnemy",
            Self::TargetIsFriendly => "targetIsFriendly",
            Self::TargetTileEmpty => "targetTileEmpty",
            Self::TargetOnBoard => "targetOnBoard",
            Self::ActorInScope => "actorInScope",
            Self::IsActorTurn => "isActorTurn",
            Self::CooldownReady => "cooldownReady",
            Self::TileHasHazard => "tileHasHazard",
            Self::ActorHasStatus => "actorHasStatus",
            Self::TargetHasStatus => "targetHasStatus",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    fn function(self) -> ConditionPtr {
        match self {
            Self::HasActor => conditions::has_actor,
            Self::HasTarget => conditions::has_target,
            Self::TargetIsEnemy => conditions::target_is_enemy,
            Self::TargetIsFriendly => conditions::target_is_friendly,
            Self::TargetTileEmpty => conditions::target_tile_empty,
            Self::TargetOnBoard => conditions::target_on_board,
            Self::ActorInScope => conditions::actor_in_scope,
            Self::IsActorTurn => conditions::is_actor_turn,
            Self::CooldownReady => conditions::cooldown_ready,
            Self::TileHasHazard => conditions::tile_has_hazard,
            Self::ActorHasStatus => conditions::actor_has_status,
            Self::TargetHasStatus => conditions::target_has_status,
        }
    }
}

/// Built-in effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinEffect {
    Toast,
    SetCooldown,
    Capture,
    MoveActor,
    TeleportRandom,
    SpawnPiece,
    RemovePiece,
    SpawnHazard,
    ExplodeHazard,
    RemoveHazard,
    Explode,
    SetDecal,
    ClearDecal,
    PlayAnimation,
    PlayAudio,
    EndTurn,
    PushUndo,
    SetState,
    IncrementState,
    AddStatus,
    RemoveStatus,
}

impl BuiltinEffect {
    pub const ALL: [Self; 21] = [
        Self::Toast,
        Self::SetCooldown,
        Self::Capture,
        Self::MoveActor,
        Self::TeleportRandom,
        Self::SpawnPiece,
        Self::RemovePiece,
        Self::SpawnHazard,
        Self::ExplodeHazard,
        Self::RemoveHazard,
        Self::Explode,
        Self::SetDecal,
        Self::ClearDecal,
        Self::PlayAnimation,
        Self::PlayAudio,
        Self::EndTurn,
        Self::PushUndo,
        Self::SetState,
        Self::IncrementState,
        Self::AddStatus,
        Self::RemoveStatus,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Toast => "toast",
            Self::SetCooldown => "setCooldown",
            Self::Capture => "capture",
            Self::MoveActor => "moveActor",
            Self::TeleportRandom => "teleportRandom",
            Self::SpawnPiece => "spawnPiece",
            Self::RemovePiece => "removePiece",
            Self::SpawnHazard => "spawnHazard",
            Self::ExplodeHazard => "explodeHazard",
            Self::RemoveHazard => "removeHazard",
            Self::Explode => "explode",
            Self::SetDecal => "setDecal",
            Self::ClearDecal => "clearDecal",
            Self::PlayAnimation => "playAnimation",
            Self::PlayAudio => "playAudio",
            Self::EndTurn => "endTurn",
            Self::PushUndo => "pushUndo",
            Self::SetState => "setState",
            Self::IncrementState => "incrementState",
            Self::AddStatus => "addStatus",
            Self::RemoveStatus => "removeStatus",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.id() == id)
    }

    fn function(self) -> EffectPtr {
        match self {
            Self::Toast => effects::toast,
            Self::SetCooldown => effects::set_cooldown,
            Self::Capture => effects::capture,
            Self::MoveActor => effects::move_actor,
            Self::TeleportRandom => effects::teleport_random,
            Self::SpawnPiece => effects::spawn_piece,
            Self::RemovePiece => effects::remove_piece,
            Self::SpawnHazard => effects::spawn_hazard,
            Self::ExplodeHazard => effects::explode_hazard,
            Self::RemoveHazard => effects::remove_hazard,
            Self::Explode => effects::explode,
            Self::SetDecal => effects::set_decal,
            Self::ClearDecal => effects::clear_decal,
            Self::PlayAnimation => effects::play_animation,
            Self::PlayAudio => effects::play_audio,
            Self::EndTurn => effects::end_turn,
            Self::PushUndo => effects::push_undo,
            Self::SetState => effects::set_state,
            Self::IncrementState => effects::increment_state,
            Self::AddStatus => effects::add_status_effect,
            Self::RemoveStatus => effects::remove_status_effect,
        }
    }
}

/// Built-in providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinProvider {
    Neighbors,
    EmptyNeighbors,
    PiecesInRadius,
    HazardsAt,
    RandomEmptyTile,
}

impl BuiltinProvider {
    pub const ALL: [Self; 5] = [
        Self::Neighbors,
        Self::EmptyNeighbors,
        Self::PiecesInRadius,
        Self::HazardsAt,
        Self::RandomEmptyTile,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Neighbors => "neighbors",
            Self::EmptyNeighbors => "emptyNeighbors",
            Self::PiecesInRadius => "piecesInRadius",
            Self::HazardsAt => "hazardsAt",
            Self::RandomEmptyTile => "randomEmptyTile",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    fn function(self) -> ProviderPtr {
        match self {
            Self::Neighbors => providers::neighbors,
            Self::EmptyNeighbors => providers::empty_neighbors,
            Self::PiecesInRadius => providers::pieces_in_radius,
            Self::HazardsAt => providers::hazards_at,
            Self::RandomEmptyTile => providers::random_empty,
        }
    }
}

/// Register every built-in with `registry`.
pub(super) fn install(registry: &mut Registry) {
    for condition in BuiltinCondition::ALL {
        registry.register_condition(condition.id(), condition.function());
    }
    for effect in BuiltinEffect::ALL {
        registry.register_effect(effect.id(), effect.function());
    }
    for provider in BuiltinProvider::ALL {
        registry.register_provider(provider.id(), provider.function());
    }
}
