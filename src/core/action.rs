//! # Actions
//!
//! Every navigation request becomes an `Action`.
//! Caller asks for the `detail` scene? That's `push` with key `detail`.
//! Back button? That's `back` with no key.
//!
//! The `reduce()` function takes the current state and an action,
//! then returns the new state. No side effects there. Callbacks happen in the navigator.
//!
//! ```text
//! State + Action  →  reduce()  →  New State (or None: not handled here)
//! ```
//!
//! Actions are transient: built, dispatched, dropped. They serialize so a
//! session can be logged and replayed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::scene::SceneType;
use crate::core::state::NavigationState;

/// Properties carried by an action into a stack entry.
pub type Props = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "push")]
    Push,
    #[serde(rename = "jump", alias = "switch")]
    Jump,
    #[serde(rename = "replace")]
    Replace,
    #[serde(rename = "back", alias = "pop", alias = "BackAction")]
    Pop,
    #[serde(rename = "refresh")]
    Refresh,
    #[serde(rename = "reset")]
    Reset,
    #[serde(rename = "init")]
    Init,
    #[serde(rename = "focus")]
    Focus,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Push => "push",
            ActionType::Jump => "jump",
            ActionType::Replace => "replace",
            ActionType::Pop => "back",
            ActionType::Refresh => "refresh",
            ActionType::Reset => "reset",
            ActionType::Init => "init",
            ActionType::Focus => "focus",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push" => Ok(ActionType::Push),
            "jump" | "switch" => Ok(ActionType::Jump),
            "replace" => Ok(ActionType::Replace),
            "back" | "pop" | "BackAction" => Ok(ActionType::Pop),
            "refresh" => Ok(ActionType::Refresh),
            "reset" => Ok(ActionType::Reset),
            "init" => Ok(ActionType::Init),
            "focus" => Ok(ActionType::Focus),
            other => Err(format!("unknown action type: {other}")),
        }
    }
}

impl From<SceneType> for ActionType {
    fn from(scene_type: SceneType) -> Self {
        match scene_type {
            SceneType::Push => ActionType::Push,
            SceneType::Jump => ActionType::Jump,
            SceneType::Reset => ActionType::Reset,
            SceneType::Replace => ActionType::Replace,
        }
    }
}

/// A navigation request: `{type, key?, props, parentKey?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
    /// Pins the action to the scope owned by this container route.
    #[serde(default, rename = "parentKey", skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    /// Replacement state, only read by `init`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Box<NavigationState>>,
}

impl Action {
    pub fn new(kind: ActionType) -> Self {
        Self {
            kind,
            key: None,
            props: Props::new(),
            parent_key: None,
            state: None,
        }
    }

    /// An action aimed at a route key.
    pub fn to(kind: ActionType, key: impl Into<String>, props: Props) -> Self {
        Self {
            key: Some(key.into()),
            props,
            ..Self::new(kind)
        }
    }

    pub fn pop() -> Self {
        Self::new(ActionType::Pop)
    }

    pub fn refresh(props: Props) -> Self {
        Self {
            props,
            ..Self::new(ActionType::Refresh)
        }
    }

    pub fn init(state: NavigationState) -> Self {
        Self {
            state: Some(Box::new(state)),
            ..Self::new(ActionType::Init)
        }
    }

    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent_key = Some(parent_key.into());
        self
    }
}

/// Normalizes a loose JSON payload into props.
///
/// Objects pass through, `null` is empty, anything else lands under `data`.
pub fn props_from_value(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        Value::Null => Props::new(),
        other => {
            let mut props = Props::new();
            props.insert("data".to_string(), other);
            props
        }
    }
}

/// Reads a pop count. Anything that isn't a positive number counts as 1.
pub fn coerce_pop_count(value: &Value) -> usize {
    let count = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match count {
        Some(n) if n.is_finite() && n >= 1.0 => n as usize,
        _ => 1,
    }
}
