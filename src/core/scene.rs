//! # Scene Descriptors
//!
//! The declarative input: a tree of scenes, usually read from a TOML or JSON
//! file. Leaves name a component, containers list children.
//!
//! ```text
//! root
//! ├── launch          (leaf, component = "Launch")
//! └── main  tabs      (container)
//!     ├── feed        (leaf, jump by default under tabs)
//!     └── profile     (leaf)
//! ```
//!
//! Nothing here validates the tree. That is `route::compile`'s job.

use std::fs;
use std::path::Path;

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::action::Props;
use crate::core::error::RouterError;

/// How a scene is entered when its trigger fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    Push,
    /// Select an existing peer by index. `switch` is accepted as an alias.
    #[serde(alias = "switch")]
    Jump,
    Reset,
    Replace,
}

impl SceneType {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneType::Push => "push",
            SceneType::Jump => "jump",
            SceneType::Reset => "reset",
            SceneType::Replace => "replace",
        }
    }
}

fn default_root_key() -> String {
    "root".to_string()
}

/// One node of the declarative scene tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SceneDescriptor {
    /// Unique scene key. Defaults to `root`, which only makes sense for the top node.
    #[serde(default = "default_root_key")]
    pub key: String,
    /// Navigation type. Defaults to `push`, or `jump` under a tab container.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<SceneType>,
    /// Marks this container's children as tabs.
    #[serde(default)]
    pub tabs: bool,
    /// Host component rendered for a leaf.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Index of the child shown first. Defaults to 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<usize>,
    /// Static props attached to every entry of this scene.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SceneDescriptor>>,
}

impl SceneDescriptor {
    pub fn leaf(key: impl Into<String>, component: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            scene_type: None,
            tabs: false,
            component: Some(component.into()),
            initial: None,
            props: Props::new(),
            children: None,
        }
    }

    /// A push-stack container.
    pub fn stack(key: impl Into<String>, children: Vec<SceneDescriptor>) -> Self {
        Self {
            key: key.into(),
            scene_type: None,
            tabs: false,
            component: None,
            initial: None,
            props: Props::new(),
            children: Some(children),
        }
    }

    /// A tab container: children become peers selected by `jump`.
    pub fn tabs(key: impl Into<String>, children: Vec<SceneDescriptor>) -> Self {
        Self {
            tabs: true,
            ..Self::stack(key, children)
        }
    }

    pub fn with_type(mut self, scene_type: SceneType) -> Self {
        self.scene_type = Some(scene_type);
        self
    }

    pub fn with_initial(mut self, initial: usize) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// Reads a scene tree from a `.toml` or `.json` file (by extension, TOML otherwise).
pub fn load_scene_file(path: &Path) -> Result<SceneDescriptor, RouterError> {
    let scene_error = |reason: String| RouterError::SceneFile {
        path: path.to_path_buf(),
        reason,
    };

    let contents = fs::read_to_string(path).map_err(|e| scene_error(e.to_string()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let scene: SceneDescriptor = if is_json {
        serde_json::from_str(&contents).map_err(|e| scene_error(e.to_string()))?
    } else {
        toml::from_str(&contents).map_err(|e| scene_error(e.to_string()))?
    };

    debug!("Loaded scene tree '{}' from {}", scene.key, path.display());
    Ok(scene)
}

/// JSON Schema of the scene file format.
pub fn scene_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(SceneDescriptor)
}
