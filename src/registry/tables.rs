//! The plugin registry.
//!
//! Three open string-keyed tables: conditions, effects and providers. This
//! is the fail-soft boundary of the runtime. Unknown ids and failing plugins
//! are logged here and never reach the caller as errors.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::core::UnknownConditionPolicy;
use crate::engine::{ActionStep, Context, Params, RuleDocument};
use crate::error::PluginError;

use super::builtins;
use super::ConditionDescriptor;

/// A predicate over the context.
pub type ConditionFn = dyn Fn(&Context<'_>) -> Result<bool, PluginError>;

/// A state change, driven by the step's parameters.
pub type EffectFn = dyn Fn(&mut Context<'_>, &Params) -> Result<(), PluginError>;

/// A data source returning a list of JSON values.
pub type ProviderFn = dyn Fn(&mut Context<'_>, &[Value]) -> Result<Vec<Value>, PluginError>;

/// Which table an id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Condition,
    Effect,
    Provider,
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Condition => "condition",
            Self::Effect => "effect",
            Self::Provider => "provider",
        })
    }
}

/// An id referenced by a rule that no plugin answers to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedId {
    pub rule: String,
    pub kind: PluginKind,
    pub id: String,
}

/// Condition, effect and provider tables.
///
/// ## Example
///
/// ```
/// use variant_engine::{ConditionDescriptor, Registry};
///
/// let mut registry = Registry::new();
/// registry.register_condition("always", |_ctx| Ok(true));
/// assert!(registry.has_condition("always"));
/// assert!(!registry.has_condition("never"));
/// ```
pub struct Registry {
    conditions: FxHashMap<String, Box<ConditionFn>>,
    effects: FxHashMap<String, Box<EffectFn>>,
    providers: FxHashMap<String, Box<ProviderFn>>,
    policy: UnknownConditionPolicy,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            conditions: FxHashMap::default(),
            effects: FxHashMap::default(),
            providers: FxHashMap::default(),
            policy: UnknownConditionPolicy::default(),
        }
    }

    /// A registry pre-loaded with every built-in plugin.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        builtins::install(&mut registry);
        registry
    }

    /// Set the verdict for unknown condition ids (builder pattern).
    #[must_use]
    pub fn with_policy(mut self, policy: UnknownConditionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: UnknownConditionPolicy) {
        self.policy = policy;
    }

    #[must_use]
    pub fn policy(&self) -> UnknownConditionPolicy {
        self.policy
    }

    /// Register a condition. Replaces any condition with the same id.
    pub fn register_condition<F>(&mut self, id: impl Into<String>, condition: F)
    where
        F: Fn(&Context<'_>) -> Result<bool, PluginError> + 'static,
    {
        self.conditions.insert(id.into(), Box::new(condition));
    }

    /// Register an effect. Replaces any effect with the same id.
    pub fn register_effect<F>(&mut self, id: impl Into<String>, effect: F)
    where
        F: Fn(&mut Context<'_>, &Params) -> Result<(), PluginError> + 'static,
    {
        self.effects.insert(id.into(), Box::new(effect));
    }

    /// Register a provider. Replaces any provider with the same id.
    pub fn register_provider<F>(&mut self, id: impl Into<String>, provider: F)
    where
        F: Fn(&mut Context<'_>, &[Value]) -> Result<Vec<Value>, PluginError> + 'static,
    {
        self.providers.insert(id.into(), Box::new(provider));
    }

    #[must_use]
    pub fn has_condition(&self, id: &str) -> bool {
        self.conditions.contains_key(id)
    }

    #[must_use]
    pub fn has_effect(&self, id: &str) -> bool {
        self.effects.contains_key(id)
    }

    #[must_use]
    pub fn has_provider(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Evaluate a condition tree.
    ///
    /// Every operand of `and`/`or` is evaluated, without short-circuiting.
    /// Unknown and malformed conditions answer the configured policy verdict
    /// (true by default); a failing predicate answers false.
    pub fn run_condition(&self, descriptor: &ConditionDescriptor, ctx: &Context<'_>) -> bool {
        match descriptor {
            ConditionDescriptor::Leaf(id) => self.run_leaf(id, ctx),
            ConditionDescriptor::Not(inner) => !self.run_condition(inner, ctx),
            ConditionDescriptor::And(operands) => operands
                .iter()
                .fold(true, |acc, operand| self.run_condition(operand, ctx) && acc),
            ConditionDescriptor::Or(operands) => operands
                .iter()
                .fold(false, |acc, operand| self.run_condition(operand, ctx) || acc),
            ConditionDescriptor::Malformed(raw) => {
                warn!(
                    target: "variant::registry",
                    rule = ctx.rule_id().unwrap_or("-"),
                    condition = %raw,
                    verdict = self.policy.verdict(),
                    "malformed condition"
                );
                self.policy.verdict()
            }
        }
    }

    fn run_leaf(&self, id: &str, ctx: &Context<'_>) -> bool {
        let Some(condition) = self.conditions.get(id) else {
            warn!(
                target: "variant::registry",
                rule = ctx.rule_id().unwrap_or("-"),
                condition = id,
                verdict = self.policy.verdict(),
                "unknown condition"
            );
            return self.policy.verdict();
        };
        match condition(ctx) {
            Ok(verdict) => verdict,
            Err(err) => {
                error!(
                    target: "variant::registry",
                    rule = ctx.rule_id().unwrap_or("-"),
                    condition = id,
                    error = %err,
                    "condition failed"
                );
                false
            }
        }
    }

    /// Run one action step. Returns true if the effect ran and succeeded.
    pub fn run_effect(&self, step: &ActionStep, ctx: &mut Context<'_>) -> bool {
        let Some(effect) = self.effects.get(&step.action) else {
            warn!(
                target: "variant::registry",
                rule = ctx.rule_id().unwrap_or("-"),
                effect = %step.action,
                "unknown effect"
            );
            return false;
        };
        match effect(ctx, &step.params) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    target: "variant::registry",
                    rule = ctx.rule_id().unwrap_or("-"),
                    effect = %step.action,
                    error = %err,
                    "effect failed"
                );
                false
            }
        }
    }

    /// Query a provider. Unknown or failing providers yield an empty list.
    pub fn run_provider(&self, id: &str, ctx: &mut Context<'_>, args: &[Value]) -> Vec<Value> {
        let Some(provider) = self.providers.get(id) else {
            warn!(
                target: "variant::registry",
                rule = ctx.rule_id().unwrap_or("-"),
                provider = id,
                "unknown provider"
            );
            return Vec::new();
        };
        provider(ctx, args).unwrap_or_else(|err| {
            error!(
                target: "variant::registry",
                rule = ctx.rule_id().unwrap_or("-"),
                provider = id,
                error = %err,
                "provider failed"
            );
            Vec::new()
        })
    }

    /// Every condition and effect id referenced by `rules` that is not
    /// registered, in document order. Malformed conditions are reported with
    /// their raw JSON as the id.
    #[must_use]
    pub fn audit(&self, rules: &[RuleDocument]) -> Vec<UnresolvedId> {
        let mut missing = Vec::new();
        for rule in rules {
            let mut report = |kind: PluginKind, id: &str| {
                missing.push(UnresolvedId {
                    rule: rule.id().to_string(),
                    kind,
                    id: id.to_string(),
                });
            };

            for step in &rule.logic {
                if let Some(condition) = &step.condition {
                    audit_condition(self, condition, &mut report);
                }
                for action in &step.actions {
                    if !self.has_effect(&action.action) {
                        report(PluginKind::Effect, &action.action);
                    }
                }
            }
            for handler in &rule.handlers {
                for action in &handler.actions {
                    if !self.has_effect(&action.action) {
                        report(PluginKind::Effect, &action.action);
                    }
                }
            }
        }
        missing
    }
}

fn audit_condition(
    registry: &Registry,
    descriptor: &ConditionDescriptor,
    report: &mut impl FnMut(PluginKind, &str),
) {
    match descriptor {
        ConditionDescriptor::Leaf(id) => {
            if !registry.has_condition(id) {
                report(PluginKind::Condition, id);
            }
        }
        ConditionDescriptor::Not(inner) => audit_condition(registry, inner, report),
        ConditionDescriptor::And(operands) | ConditionDescriptor::Or(operands) => {
            for operand in operands {
                audit_condition(registry, operand, report);
            }
        }
        ConditionDescriptor::Malformed(raw) => report(PluginKind::Condition, &raw.to_string()),
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn sorted<'k>(mut keys: Vec<&'k String>) -> Vec<&'k String> {
            keys.sort_unstable();
            keys
        }
        f.debug_struct("Registry")
            .field("conditions", &sorted(self.conditions.keys().collect()))
            .field("effects", &sorted(self.effects.keys().collect()))
            .field("providers", &sorted(self.providers.keys().collect()))
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::cooldown::CooldownTracker;
    use crate::core::RuleRng;
    use crate::engine::{Event, LogicStep};
    use crate::hazards::HazardManager;
    use crate::host::MemoryHost;
    use crate::state::StateStore;

    struct Fixture {
        host: MemoryHost,
        cooldowns: CooldownTracker,
        state: StateStore,
        hazards: HazardManager,
        rng: RuleRng,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                host: MemoryHost::new(),
                cooldowns: CooldownTracker::new(),
                state: StateStore::new(),
                hazards: HazardManager::new(),
                rng: RuleRng::new(1),
            }
        }

        fn context<'a>(&'a mut self, registry: &'a Registry) -> Context<'a> {
            Context::new(
                Event::new("test"),
                &mut self.host,
                &mut self.cooldowns,
                &mut self.state,
                &mut self.hazards,
                registry,
                &mut self.rng,
            )
        }
    }

    fn constants() -> Registry {
        let mut registry = Registry::new();
        registry.register_condition("yes", |_| Ok(true));
        registry.register_condition("no", |_| Ok(false));
        registry.register_condition("broken", |_| Err(PluginError::Failed("boom".into())));
        registry
    }

    fn parse(value: serde_json::Value) -> ConditionDescriptor {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_operators() {
        let registry = constants();
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        let cases = [
            (json!("yes"), true),
            (json!("no"), false),
            (json!(["not", "no"]), true),
            (json!(["and", "yes", "no"]), false),
            (json!(["and", "yes", "yes"]), true),
            (json!(["or", "no", "yes"]), true),
            (json!(["or", "no", "no"]), false),
            (json!(["and"]), true),
            (json!(["or"]), false),
            (json!(["yes", ["not", "no"]]), true),
        ];
        for (raw, expected) in cases {
            assert_eq!(registry.run_condition(&parse(raw.clone()), &ctx), expected, "{raw}");
        }
    }

    #[test]
    fn test_unknown_condition_fails_open() {
        let registry = constants();
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        assert!(registry.run_condition(&parse(json!("ghost")), &ctx));
        assert!(registry.run_condition(&parse(json!(17)), &ctx));
    }

    #[test]
    fn test_deny_policy() {
        let registry = constants().with_policy(UnknownConditionPolicy::Deny);
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        assert!(!registry.run_condition(&parse(json!("ghost")), &ctx));
        assert!(registry.run_condition(&parse(json!(["not", "ghost"])), &ctx));
    }

    #[test]
    fn test_failing_condition_is_false() {
        let registry = constants();
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        assert!(!registry.run_condition(&parse(json!("broken")), &ctx));
        assert!(registry.run_condition(&parse(json!(["not", "broken"])), &ctx));
    }

    #[test]
    fn test_operands_are_not_short_circuited() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut registry = constants();
        registry.register_condition("counted", move |_| {
            counter.set(counter.get() + 1);
            Ok(true)
        });
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        assert!(!registry.run_condition(&parse(json!(["and", "no", "counted"])), &ctx));
        assert!(registry.run_condition(&parse(json!(["or", "yes", "counted"])), &ctx));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_effects_contained() {
        let mut registry = Registry::new();
        registry.register_effect("fail", |_, _| Err(PluginError::NoActor));
        registry.register_effect("toastIt", |ctx, params| {
            let message = params.get("message").and_then(|v| v.as_str()).unwrap_or("hi");
            ctx.host.toast(message);
            Ok(())
        });
        let mut fixture = Fixture::new();
        {
            let mut ctx = fixture.context(&registry);
            assert!(!registry.run_effect(&ActionStep::new("missing"), &mut ctx));
            assert!(!registry.run_effect(&ActionStep::new("fail"), &mut ctx));
            assert!(registry.run_effect(
                &ActionStep::new("toastIt").with_param("message", json!("done")),
                &mut ctx
            ));
        }
        assert_eq!(fixture.host.toasts, vec!["done"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register_condition("flip", |_| Ok(false));
        registry.register_condition("flip", |_| Ok(true));
        let mut fixture = Fixture::new();
        let ctx = fixture.context(&registry);

        assert!(registry.run_condition(&parse(json!("flip")), &ctx));
    }

    #[test]
    fn test_providers() {
        let mut registry = Registry::new();
        registry.register_provider("echo", |_, args| Ok(args.to_vec()));
        registry.register_provider("broken", |_, _| Err(PluginError::NoTarget));
        let mut fixture = Fixture::new();
        let mut ctx = fixture.context(&registry);

        assert_eq!(registry.run_provider("echo", &mut ctx, &[json!(1)]), vec![json!(1)]);
        assert!(registry.run_provider("broken", &mut ctx, &[]).is_empty());
        assert!(registry.run_provider("missing", &mut ctx, &[]).is_empty());
    }

    #[test]
    fn test_audit() {
        let registry = Registry::builtin();
        let rule = RuleDocument::new("typos")
            .with_step(
                LogicStep::new("s", "always")
                    .when_condition(parse(json!(["and", "hasActor", "hasActr", 3])))
                    .then(ActionStep::new("toast"))
                    .then(ActionStep::new("toastt")),
            );

        let missing = registry.audit(&[rule]);
        let found: Vec<_> = missing.iter().map(|m| (m.kind, m.id.as_str())).collect();
        assert_eq!(
            found,
            vec![
                (PluginKind::Condition, "hasActr"),
                (PluginKind::Condition, "3"),
                (PluginKind::Effect, "toastt"),
            ]
        );
        assert!(missing.iter().all(|m| m.rule == "typos"));
    }

    #[test]
    fn test_debug_lists_sorted_ids() {
        let mut registry = Registry::new();
        registry.register_condition("zeta", |_| Ok(true));
        registry.register_condition("alpha", |_| Ok(true));

        let debug = format!("{registry:?}");
        let alpha = debug.find("alpha").unwrap();
        let zeta = debug.find("zeta").unwrap();
        assert!(alpha < zeta);
        assert!(debug.contains("policy"));
    }
}
