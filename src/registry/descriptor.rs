//! Condition descriptors.
//!
//! In a rule document a condition is either a string naming a registered
//! predicate or a list `[operator, ...operands]`:
//!
//! ```json
//! "hasTarget"
//! ["not", "targetTileEmpty"]
//! ["and", "hasActor", ["or", "targetIsEnemy", "tileHasHazard"]]
//! ["hasActor", "cooldownReady"]
//! ```
//!
//! The last form has no operator and means "all of these". Anything else
//! parses to [`ConditionDescriptor::Malformed`] rather than failing the
//! whole document.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A condition expression tree.
#[derive(Clone, Debug, PartialEq)]
pub enum ConditionDescriptor {
    /// A registered predicate.
    Leaf(String),
    Not(Box<ConditionDescriptor>),
    And(Vec<ConditionDescriptor>),
    Or(Vec<ConditionDescriptor>),
    /// A shape that is not a condition. Kept verbatim for diagnostics.
    Malformed(Value),
}

impl ConditionDescriptor {
    pub fn leaf(id: impl Into<String>) -> Self {
        Self::Leaf(id.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn and(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = Self>) -> Self {
        Self::Or(operands.into_iter().collect())
    }

    /// Build a descriptor from its JSON form.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(id) => Self::Leaf(id.clone()),
            Value::Array(items) => Self::from_list(value, items),
            other => Self::Malformed(other.clone()),
        }
    }

    fn from_list(raw: &Value, items: &[Value]) -> Self {
        let operands = |rest: &[Value]| -> Vec<Self> { rest.iter().map(Self::from_value).collect() };
        match items.split_first() {
            Some((Value::String(op), rest)) => match op.as_str() {
                "not" => match rest {
                    [operand] => Self::not(Self::from_value(operand)),
                    _ => Self::Malformed(raw.clone()),
                },
                "and" => Self::And(operands(rest)),
                "or" => Self::Or(operands(rest)),
                _ => Self::And(operands(items)),
            },
            _ => Self::And(operands(items)),
        }
    }

    /// The JSON form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let tagged = |op: &str, operands: &[Self]| {
            let mut list = Vec::with_capacity(operands.len() + 1);
            list.push(Value::from(op));
            list.extend(operands.iter().map(Self::to_value));
            Value::Array(list)
        };
        match self {
            Self::Leaf(id) => Value::from(id.as_str()),
            Self::Not(inner) => Value::Array(vec![Value::from("not"), inner.to_value()]),
            Self::And(operands) => tagged("and", operands),
            Self::Or(operands) => tagged("or", operands),
            Self::Malformed(raw) => raw.clone(),
        }
    }

    /// Every leaf id in the tree, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Leaf(id) => out.push(id),
            Self::Not(inner) => inner.collect_leaves(out),
            Self::And(operands) | Self::Or(operands) => {
                for operand in operands {
                    operand.collect_leaves(out);
                }
            }
            Self::Malformed(_) => {}
        }
    }

    /// True if any node in the tree is malformed.
    #[must_use]
    pub fn has_malformed(&self) -> bool {
        match self {
            Self::Leaf(_) => false,
            Self::Not(inner) => inner.has_malformed(),
            Self::And(operands) | Self::Or(operands) => operands.iter().any(Self::has_malformed),
            Self::Malformed(_) => true,
        }
    }
}

impl From<&str> for ConditionDescriptor {
    fn from(id: &str) -> Self {
        Self::leaf(id)
    }
}

impl Serialize for ConditionDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConditionDescriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}
