//! # Route Table
//!
//! `compile()` flattens a `SceneDescriptor` tree into a `RouteTable`: one
//! `Route` per key, linked to its parent and children by key.
//!
//! ```text
//! main (tabs)                     main      jump?  children [feed, profile]
//! ├── feed    (leaf)      ──►     feed      jump   children [feed_]
//! └── profile (leaf)              feed_     push   component Feed
//!                                 profile   jump   children [profile_]
//!                                 profile_  push   component Profile
//! ```
//!
//! A leaf under a tab container is wrapped so each tab hosts its own push
//! stack. The wrapper keeps the scene's key; the leaf moves to `<key>_`.
//!
//! The table also owns the trigger registry: a fixed map from scene key to a
//! closure that builds the action for that scene. It's filled once, here,
//! and never changes afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::action::{Action, ActionType, Props};
use crate::core::error::{KeyConflict, RouterError};
use crate::core::scene::{SceneDescriptor, SceneType};

/// Names that would shadow an action identifier or a navigator entry point.
pub const RESERVED_KEYS: &[&str] = &[
    "jump",
    "push",
    "replace",
    "back",
    "pop",
    "BackAction",
    "refresh",
    "reset",
    "init",
    "focus",
    "route",
    "dispatch",
    "apply",
    "current",
    "undo",
    "state",
];

/// Suffix for the synthesized inner route of a wrapped tab leaf.
pub const TAB_WRAPPER_SUFFIX: &str = "_";

/// A compiled scene. Immutable once the table is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub key: String,
    /// Scene name. Equals `key` except on synthesized tab wrappers.
    pub name: String,
    pub parent: Option<String>,
    pub children: Vec<String>,
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    pub component: Option<String>,
    pub tabs: bool,
    /// Default child index, already clamped to `children`.
    pub initial: usize,
    pub props: Props,
}

impl Route {
    /// Containers own a nested navigation scope.
    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_synthesized(&self) -> bool {
        self.name != self.key
    }
}

/// Builds the action for one scene from caller props.
pub type Trigger = Arc<dyn Fn(Props) -> Action + Send + Sync>;

#[derive(Clone)]
pub struct RouteTable {
    root: String,
    routes: HashMap<String, Route>,
    triggers: BTreeMap<String, Trigger>,
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("root", &self.root)
            .field("routes", &self.routes.len())
            .field("triggers", &self.triggers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RouteTable {
    pub fn root(&self) -> &Route {
        &self.routes[&self.root]
    }

    pub fn get(&self, key: &str) -> Option<&Route> {
        self.routes.get(key)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// True when `name` is a direct child of the `container` route.
    pub fn defines(&self, container: &str, name: &str) -> bool {
        self.routes
            .get(container)
            .is_some_and(|route| route.children.iter().any(|child| child == name))
    }

    pub fn trigger(&self, name: &str) -> Option<&Trigger> {
        self.triggers.get(name)
    }

    /// Scene keys that have a named trigger, sorted.
    pub fn trigger_names(&self) -> impl Iterator<Item = &str> {
        self.triggers.keys().map(String::as_str)
    }

    /// Indented listing of the tree, one route per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&self.root, 0, &mut out);
        out
    }

    fn describe_into(&self, key: &str, depth: usize, out: &mut String) {
        let Some(route) = self.routes.get(key) else {
            return;
        };
        let mut line = format!("{}{} [{}", "  ".repeat(depth), route.key, route.scene_type.as_str());
        if route.tabs {
            line.push_str(", tabs");
        }
        if let Some(component) = &route.component {
            line.push_str(&format!(", component={component}"));
        }
        line.push(']');
        out.push_str(&line);
        out.push('\n');
        for child in &route.children {
            self.describe_into(child, depth + 1, out);
        }
    }
}

/// Compiles a scene tree into a route table.
pub fn compile(root: &SceneDescriptor) -> Result<RouteTable, RouterError> {
    let mut compiler = Compiler::default();
    compiler.scene(root, None)?;

    let triggers = compiler
        .routes
        .values()
        .filter(|route| !route.is_synthesized())
        .map(|route| (route.key.clone(), make_trigger(route)))
        .collect();

    info!(
        "Compiled scene tree '{}' into {} routes",
        root.key,
        compiler.routes.len()
    );

    Ok(RouteTable {
        root: root.key.clone(),
        routes: compiler.routes,
        triggers,
    })
}

fn make_trigger(route: &Route) -> Trigger {
    let key = route.key.clone();
    let kind = ActionType::from(route.scene_type);
    Arc::new(move |props| Action::to(kind, key.clone(), props))
}

#[derive(Default)]
struct Compiler {
    routes: HashMap<String, Route>,
    taken: HashSet<String>,
}

/// Parent facts a child needs while compiling.
struct ParentInfo<'a> {
    key: &'a str,
    tabs: bool,
}

impl Compiler {
    fn claim(&mut self, key: &str) -> Result<(), RouterError> {
        if RESERVED_KEYS.contains(&key) {
            return Err(RouterError::DuplicateKey {
                key: key.to_string(),
                conflict: KeyConflict::Reserved,
            });
        }
        if !self.taken.insert(key.to_string()) {
            return Err(RouterError::DuplicateKey {
                key: key.to_string(),
                conflict: KeyConflict::Scene,
            });
        }
        Ok(())
    }

    fn scene(
        &mut self,
        scene: &SceneDescriptor,
        parent: Option<ParentInfo<'_>>,
    ) -> Result<String, RouterError> {
        let key = scene.key.clone();
        self.claim(&key)?;

        let parent_tabs = parent.as_ref().is_some_and(|p| p.tabs);
        let default_type = if parent_tabs {
            SceneType::Jump
        } else {
            SceneType::Push
        };

        let mut route = Route {
            key: key.clone(),
            name: key.clone(),
            parent: parent.map(|p| p.key.to_string()),
            children: Vec::new(),
            scene_type: scene.scene_type.unwrap_or(default_type),
            component: scene.component.clone(),
            tabs: scene.tabs,
            initial: 0,
            props: scene.props.clone(),
        };

        match &scene.children {
            Some(children) => {
                if children.is_empty() {
                    return Err(RouterError::EmptyContainer { key });
                }
                for child in children {
                    let info = ParentInfo {
                        key: &key,
                        tabs: scene.tabs,
                    };
                    let child_key = self.scene(child, Some(info))?;
                    route.children.push(child_key);
                }
                route.initial = clamp_initial(&key, scene.initial, children.len());
            }
            None => {
                if route.component.is_none() {
                    return Err(RouterError::MissingComponent { key });
                }
                if parent_tabs {
                    let inner_key = format!("{key}{TAB_WRAPPER_SUFFIX}");
                    self.claim(&inner_key)?;
                    let inner = Route {
                        key: inner_key.clone(),
                        name: key.clone(),
                        parent: Some(key.clone()),
                        children: Vec::new(),
                        scene_type: SceneType::Push,
                        component: route.component.take(),
                        tabs: false,
                        initial: 0,
                        props: route.props.clone(),
                    };
                    debug!("Wrapped tab leaf '{}' as '{}'", key, inner_key);
                    self.routes.insert(inner_key.clone(), inner);
                    route.children.push(inner_key);
                }
            }
        }

        self.routes.insert(key.clone(), route);
        Ok(key)
    }
}

fn clamp_initial(key: &str, initial: Option<usize>, len: usize) -> usize {
    let initial = initial.unwrap_or(0);
    if initial >= len {
        warn!(
            "Scene '{}' has initial={} but only {} children, using {}",
            key,
            initial,
            len,
            len - 1
        );
        return len - 1;
    }
    initial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{nested_tabs_scene, simple_stack_scene};

    #[test]
    fn test_compile_simple_stack() {
        let table = compile(&simple_stack_scene()).unwrap();
        assert_eq!(table.root().key, "root");
        assert_eq!(table.root().parent, None);
        assert_eq!(table.root().children, vec!["home", "detail", "settings"]);

        let detail = table.get("detail").unwrap();
        assert_eq!(detail.parent.as_deref(), Some("root"));
        assert_eq!(detail.scene_type, SceneType::Push);
        assert!(!detail.is_container());
        assert!(table.defines("root", "detail"));
        assert!(!table.defines("detail", "root"));
    }

    #[test]
    fn test_duplicate_key_same_level_fails() {
        let scene = SceneDescriptor::stack(
            "root",
            vec![
                SceneDescriptor::leaf("home", "Home"),
                SceneDescriptor::leaf("home", "OtherHome"),
            ],
        );
        let err = compile(&scene).unwrap_err();
        assert!(matches!(
            err,
            RouterError::DuplicateKey { ref key, conflict: KeyConflict::Scene } if key == "home"
        ));
    }

    #[test]
    fn test_duplicate_key_across_levels_fails() {
        let scene = SceneDescriptor::stack(
            "root",
            vec![
                SceneDescriptor::leaf("home", "Home"),
                SceneDescriptor::stack("inner", vec![SceneDescriptor::leaf("home", "Home")]),
            ],
        );
        assert!(matches!(
            compile(&scene),
            Err(RouterError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_reserved_key_fails() {
        for reserved in ["push", "back", "refresh", "route"] {
            let scene = SceneDescriptor::stack(
                "root",
                vec![SceneDescriptor::leaf(reserved, "Whatever")],
            );
            assert!(matches!(
                compile(&scene),
                Err(RouterError::DuplicateKey { conflict: KeyConflict::Reserved, .. })
            ));
        }
    }

    #[test]
    fn test_wrapper_key_collision_fails() {
        let scene = SceneDescriptor::tabs(
            "root",
            vec![
                SceneDescriptor::leaf("feed", "Feed"),
                SceneDescriptor::leaf("feed_", "NotAWrapper"),
            ],
        );
        assert!(matches!(
            compile(&scene),
            Err(RouterError::DuplicateKey { ref key, .. }) if key == "feed_"
        ));
    }

    #[test]
    fn test_leaf_without_component_fails() {
        let mut leaf = SceneDescriptor::leaf("home", "Home");
        leaf.component = None;
        let scene = SceneDescriptor::stack("root", vec![leaf]);
        assert!(matches!(
            compile(&scene),
            Err(RouterError::MissingComponent { ref key }) if key == "home"
        ));
    }

    #[test]
    fn test_empty_container_fails() {
        let scene = SceneDescriptor::stack("root", vec![SceneDescriptor::stack("empty", vec![])]);
        assert!(matches!(
            compile(&scene),
            Err(RouterError::EmptyContainer { ref key }) if key == "empty"
        ));
    }

    #[test]
    fn test_tab_leaves_are_wrapped() {
        let table = compile(&nested_tabs_scene()).unwrap();

        let profile = table.get("profile").unwrap();
        assert_eq!(profile.scene_type, SceneType::Jump);
        assert_eq!(profile.component, None);
        assert_eq!(profile.children, vec!["profile_"]);

        let inner = table.get("profile_").unwrap();
        assert_eq!(inner.name, "profile");
        assert_eq!(inner.scene_type, SceneType::Push);
        assert_eq!(inner.parent.as_deref(), Some("profile"));
        assert_eq!(inner.component.as_deref(), Some("Profile"));
        assert!(inner.is_synthesized());
    }

    #[test]
    fn test_tab_containers_default_to_jump_and_are_not_wrapped() {
        let table = compile(&nested_tabs_scene()).unwrap();
        let feed_tab = table.get("feedTab").unwrap();
        assert_eq!(feed_tab.scene_type, SceneType::Jump);
        assert_eq!(feed_tab.children, vec!["feed", "post"]);
        assert_eq!(table.get("post").unwrap().scene_type, SceneType::Push);
    }

    #[test]
    fn test_triggers_build_typed_actions() {
        let table = compile(&nested_tabs_scene()).unwrap();
        let names: Vec<&str> = table.trigger_names().collect();
        assert!(names.contains(&"post"));
        assert!(names.contains(&"profile"));
        assert!(!names.contains(&"profile_"));

        let mut props = Props::new();
        props.insert("id".to_string(), 3.into());
        let action = (table.trigger("post").unwrap())(props);
        assert_eq!(action.kind, ActionType::Push);
        assert_eq!(action.key.as_deref(), Some("post"));
        assert_eq!(action.props["id"], 3);

        let action = (table.trigger("profile").unwrap())(Props::new());
        assert_eq!(action.kind, ActionType::Jump);
    }

    #[test]
    fn test_initial_is_clamped() {
        let scene = SceneDescriptor::tabs(
            "root",
            vec![
                SceneDescriptor::leaf("a", "A"),
                SceneDescriptor::leaf("b", "B"),
            ],
        )
        .with_initial(9);
        let table = compile(&scene).unwrap();
        assert_eq!(table.root().initial, 1);
    }

    #[test]
    fn test_describe_lists_every_route() {
        let table = compile(&nested_tabs_scene()).unwrap();
        let listing = table.describe();
        assert_eq!(listing.lines().count(), table.len());
        assert!(listing.contains("  main [push, tabs]"));
        assert!(listing.contains("component=Profile"));
    }
}
