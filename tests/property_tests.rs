//! Property tests for the evaluation and bookkeeping invariants.

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::{json, Value};
use variant_engine::{
    ConditionDescriptor, Context, CooldownTracker, Event, HazardManager, MemoryHost, PieceId,
    Registry, RuleRng, StateStore,
};

/// Boolean expression model mirrored into condition JSON.
#[derive(Clone, Debug)]
enum Expr {
    Yes,
    No,
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    fn eval(&self) -> bool {
        match self {
            Expr::Yes => true,
            Expr::No => false,
            Expr::Not(inner) => !inner.eval(),
            Expr::And(items) => items.iter().all(Expr::eval),
            Expr::Or(items) => items.iter().any(Expr::eval),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            Expr::Yes | Expr::No => 1,
            Expr::Not(inner) => inner.leaves(),
            Expr::And(items) | Expr::Or(items) => items.iter().map(Expr::leaves).sum(),
        }
    }

    fn to_json(&self) -> Value {
        let tagged = |op: &str, items: &[Expr]| {
            let mut list = vec![json!(op)];
            list.extend(items.iter().map(Expr::to_json));
            Value::Array(list)
        };
        match self {
            Expr::Yes => json!("yes"),
            Expr::No => json!("no"),
            Expr::Not(inner) => json!(["not", inner.to_json()]),
            Expr::And(items) => tagged("and", items),
            Expr::Or(items) => tagged("or", items),
        }
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![Just(Expr::Yes), Just(Expr::No)];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Expr::And),
            prop::collection::vec(inner, 1..4).prop_map(Expr::Or),
        ]
    })
}

fn counting_registry(calls: &Rc<Cell<usize>>) -> Registry {
    let mut registry = Registry::new();
    let yes = Rc::clone(calls);
    registry.register_condition("yes", move |_| {
        yes.set(yes.get() + 1);
        Ok(true)
    });
    let no = Rc::clone(calls);
    registry.register_condition("no", move |_| {
        no.set(no.get() + 1);
        Ok(false)
    });
    registry
}

proptest! {
    /// Test that condition trees evaluate like boolean logic, every leaf once.
    #[test]
    fn test_condition_trees_follow_boolean_logic(tree in expr()) {
        let calls = Rc::new(Cell::new(0));
        let registry = counting_registry(&calls);
        let mut host = MemoryHost::new();
        let mut cooldowns = CooldownTracker::new();
        let mut state = StateStore::new();
        let mut hazards = HazardManager::new();
        let mut rng = RuleRng::new(0);
        let ctx = Context::new(
            Event::new("test"),
            &mut host,
            &mut cooldowns,
            &mut state,
            &mut hazards,
            &registry,
            &mut rng,
        );

        let descriptor = ConditionDescriptor::from_value(&tree.to_json());
        prop_assert_eq!(registry.run_condition(&descriptor, &ctx), tree.eval());
        // No short-circuiting: every leaf is consulted exactly once
        prop_assert_eq!(calls.get(), tree.leaves());
    }

    /// Test cooldown countdown and the zero floor.
    #[test]
    fn test_cooldowns_count_down_and_floor(turns in 0u32..20, ticks in 0usize..30) {
        let knight = PieceId::new("wn");
        let mut cooldowns = CooldownTracker::new();
        cooldowns.set(&knight, "blink", turns);
        for _ in 0..ticks {
            cooldowns.tick_all();
        }

        let expected = turns.saturating_sub(u32::try_from(ticks).unwrap_or(u32::MAX));
        prop_assert_eq!(cooldowns.remaining(&knight, "blink"), expected);
        prop_assert_eq!(cooldowns.is_ready(&knight, "blink"), expected == 0);
        prop_assert_eq!(cooldowns.len(), 1);
    }

    /// Test undo against a bounded stack.
    #[test]
    fn test_undo_matches_bounded_stack(
        values in prop::collection::vec(0i64..100, 1..20),
        depth in 1usize..6,
    ) {
        let mut store = StateStore::with_undo_depth(depth);
        let mut model: Vec<i64> = Vec::new();

        for value in &values {
            store.set("ns", json!(value));
            store.push_undo();
            model.push(*value);
            if model.len() > depth {
                model.remove(0);
            }
        }
        store.set("ns", json!(-1));

        while let Some(expected) = model.pop() {
            prop_assert!(store.undo());
            prop_assert_eq!(store.get("ns"), Some(&json!(expected)));
        }
        prop_assert!(!store.undo());
    }

    /// Test that a hazard lives exactly ttl turns.
    #[test]
    fn test_hazard_lifetime_equals_ttl(ttl in 1i32..10) {
        let mut hazards = HazardManager::new();
        hazards
            .spawn(variant_engine::HazardSpec::new("smoke", "d4").with_ttl(ttl))
            .unwrap();

        for _ in 1..ttl {
            prop_assert!(hazards.tick().is_empty());
            prop_assert_eq!(hazards.len(), 1);
        }
        let last = hazards.tick();
        prop_assert_eq!(last.len(), 1);
        prop_assert!(hazards.is_empty());
    }
}
