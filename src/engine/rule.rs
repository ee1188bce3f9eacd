//! Rule documents.
//!
//! A rule document is the unit of authored content: metadata, a scope, the
//! UI actions it contributes and an ordered list of logic steps. Documents
//! are plain JSON with camelCase keys and are immutable once loaded.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::core::Side;
use crate::events::topics;
use crate::registry::ConditionDescriptor;

/// Key/value parameter bag passed to effects.
pub type Params = Map<String, Value>;

/// One authored rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDocument {
    pub metadata: RuleMetadata,

    #[serde(default)]
    pub scope: RuleScope,

    #[serde(default)]
    pub ui_actions: Vec<UiActionSpec>,

    #[serde(default)]
    pub logic: Vec<LogicStep>,

    /// State slot name. Defaults to `rule:<id>`.
    #[serde(default)]
    pub state_namespace: Option<String>,

    /// Template the state slot is initialized from.
    #[serde(default = "empty_object")]
    pub initial_state: Value,

    /// Declared parameters, readable by plugins through the context.
    #[serde(default)]
    pub parameters: Params,

    /// Raw event bindings run by [`RuleEngine::on_raw_event`](super::RuleEngine::on_raw_event).
    #[serde(default)]
    pub handlers: Vec<HandlerBinding>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl RuleDocument {
    /// A minimal active rule with no logic.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            metadata: RuleMetadata {
                name: id.clone(),
                id,
                category: None,
                active: true,
            },
            scope: RuleScope::default(),
            ui_actions: Vec::new(),
            logic: Vec::new(),
            state_namespace: None,
            initial_state: empty_object(),
            parameters: Params::new(),
            handlers: Vec::new(),
        }
    }

    /// Parse one document.
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    /// Parse a JSON array of documents.
    pub fn parse_list(source: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(source)
    }

    #[must_use]
    pub fn with_step(mut self, step: LogicStep) -> Self {
        self.logic.push(step);
        self
    }

    #[must_use]
    pub fn with_ui_action(mut self, action: UiActionSpec) -> Self {
        self.ui_actions.push(action);
        self
    }

    #[must_use]
    pub fn with_initial_state(mut self, state: Value) -> Self {
        self.initial_state = state;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_handler(mut self, handler: HandlerBinding) -> Self {
        self.handlers.push(handler);
        self
    }

    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.metadata.active = false;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.metadata.active
    }

    /// The state namespace, falling back to `rule:<id>`.
    #[must_use]
    pub fn namespace(&self) -> String {
        self.state_namespace
            .clone()
            .unwrap_or_else(|| format!("rule:{}", self.metadata.id))
    }
}

/// Identification and activation flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub category: Option<String>,

    /// Inactive rules are dropped at load time.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Which pieces a rule is about. Empty lists mean "any".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleScope {
    #[serde(default)]
    pub piece_types: Vec<String>,

    #[serde(default)]
    pub sides: Vec<Side>,
}

impl RuleScope {
    /// True if a piece of `kind` on `side` falls in scope.
    #[must_use]
    pub fn includes(&self, kind: &str, side: Side) -> bool {
        let kind_ok = self.piece_types.is_empty()
            || self.piece_types.iter().any(|k| k.eq_ignore_ascii_case(kind));
        let side_ok = self.sides.is_empty() || self.sides.contains(&side);
        kind_ok && side_ok
    }
}

/// A button a rule contributes to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiActionSpec {
    pub id: String,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(default)]
    pub requires_target: bool,
}

impl UiActionSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            hint: None,
            icon: None,
            requires_target: false,
        }
    }

    #[must_use]
    pub fn requiring_target(mut self) -> Self {
        self.requires_target = true;
        self
    }

    /// The event topic this action dispatches.
    #[must_use]
    pub fn topic(&self) -> String {
        topics::ui(&self.id)
    }
}

/// What to do when a step's condition fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailMode {
    /// Stop evaluating the rest of the rule for this event.
    BlockAction,
    /// Skip just this step. Unrecognized modes read as this.
    #[default]
    #[serde(other)]
    Skip,
}

/// One guarded block of actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicStep {
    #[serde(default)]
    pub id: String,

    /// Event topic, or `always`.
    pub when: String,

    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionDescriptor>,

    #[serde(rename = "do", default, deserialize_with = "one_or_many")]
    pub actions: Vec<ActionStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_fail: Option<FailMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LogicStep {
    pub fn new(id: impl Into<String>, when: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            when: when.into(),
            condition: None,
            actions: Vec::new(),
            on_fail: None,
            message: None,
        }
    }

    #[must_use]
    pub fn when_condition(mut self, condition: ConditionDescriptor) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn then(mut self, action: ActionStep) -> Self {
        self.actions.push(action);
        self
    }

    /// Block the rest of the rule on failure, optionally toasting `message`.
    #[must_use]
    pub fn blocking(mut self, message: Option<&str>) -> Self {
        self.on_fail = Some(FailMode::BlockAction);
        self.message = message.map(str::to_string);
        self
    }

    /// True if the step listens to `topic`.
    #[must_use]
    pub fn matches(&self, topic: &str) -> bool {
        self.when == topics::ALWAYS || self.when == topic
    }

    #[must_use]
    pub fn blocks_on_fail(&self) -> bool {
        self.on_fail == Some(FailMode::BlockAction)
    }
}

/// One effect invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: String,

    #[serde(
        default,
        skip_serializing_if = "Map::is_empty",
        deserialize_with = "null_as_empty"
    )]
    pub params: Params,
}

/// `"params": null` reads as no parameters.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Params, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Params>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ActionStep {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Params::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }
}

/// A raw event binding: run `do` whenever `event` is raised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandlerBinding {
    pub event: String,

    #[serde(rename = "do", default, deserialize_with = "one_or_many")]
    pub actions: Vec<ActionStep>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<ActionStep>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ActionStep),
        Many(Vec<ActionStep>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(step) => vec![step],
        OneOrMany::Many(steps) => steps,
    })
}
