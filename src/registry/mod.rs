//! Pluggable rule vocabulary.
//!
//! Rule documents name their conditions, effects and providers by string
//! id. The [`Registry`] maps those ids to functions over a
//! [`Context`](crate::engine::Context) and contains every failure they
//! produce.
//!
//! ## Key Components
//!
//! - [`ConditionDescriptor`]: the condition expression tree
//! - [`Registry`]: the three plugin tables, evaluation and audit
//! - [`BuiltinCondition`], [`BuiltinEffect`], [`BuiltinProvider`]: the
//!   default catalog
//!
//! ## Example Usage
//!
//! ```
//! use variant_engine::{BuiltinEffect, Registry};
//!
//! let mut registry = Registry::builtin();
//! assert!(registry.has_effect(BuiltinEffect::SetCooldown.id()));
//!
//! // Host plugins live next to the built-ins
//! registry.register_condition("isNight", |ctx| Ok(ctx.host.current().ply % 20 >= 10));
//! ```

mod builtins;
mod descriptor;
mod tables;

pub use builtins::{BuiltinCondition, BuiltinEffect, BuiltinProvider};
pub use descriptor::ConditionDescriptor;
pub use tables::{ConditionFn, EffectFn, PluginKind, ProviderFn, Registry, UnresolvedId};
