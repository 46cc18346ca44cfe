//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::core::action::Props;
use crate::core::route::{RouteTable, compile};
use crate::core::scene::SceneDescriptor;

/// `root` push stack with three leaves: home, detail, settings.
pub fn simple_stack_scene() -> SceneDescriptor {
    SceneDescriptor::stack(
        "root",
        vec![
            SceneDescriptor::leaf("home", "Home"),
            SceneDescriptor::leaf("detail", "Detail"),
            SceneDescriptor::leaf("settings", "Settings"),
        ],
    )
}

/// ```text
/// root
/// ├── launch
/// └── main (tabs)
///     ├── feedTab   [feed, post]
///     └── profile   (wrapped as profile_)
/// ```
pub fn nested_tabs_scene() -> SceneDescriptor {
    SceneDescriptor::stack(
        "root",
        vec![
            SceneDescriptor::leaf("launch", "Launch"),
            SceneDescriptor::tabs(
                "main",
                vec![
                    SceneDescriptor::stack(
                        "feedTab",
                        vec![
                            SceneDescriptor::leaf("feed", "Feed"),
                            SceneDescriptor::leaf("post", "Post"),
                        ],
                    ),
                    SceneDescriptor::leaf("profile", "Profile"),
                ],
            ),
        ],
    )
}

pub fn simple_stack_table() -> RouteTable {
    compile(&simple_stack_scene()).expect("fixture compiles")
}

pub fn nested_tabs_table() -> RouteTable {
    compile(&nested_tabs_scene()).expect("fixture compiles")
}

/// String-valued props from pairs.
pub fn props(pairs: &[(&str, &str)]) -> Props {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
        .collect()
}
