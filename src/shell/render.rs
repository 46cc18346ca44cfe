use crate::core::navigator::{CurrentScene, SceneRenderer};
use crate::core::state::NavigationState;

/// Renders the active path as indented text, one scope per line.
///
/// ```text
/// root: [launch, *main]
///   main: [*feedTab, profile]
///     feedTab: [feed, *post]
/// → post (Post) {"id":1}
/// ```
///
/// `*` marks the entry at each scope's index.
#[derive(Debug, Default)]
pub struct TextRenderer {
    /// Print only the arrow line.
    pub compact: bool,
}

impl SceneRenderer for TextRenderer {
    type Output = String;

    fn render(&mut self, state: &NavigationState, scene: &CurrentScene<'_>) -> String {
        let mut out = String::new();
        if !self.compact {
            for (depth, scope) in state.active_path().iter().enumerate() {
                let entries: Vec<String> = scope
                    .stack()
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| {
                        if i == scope.index() {
                            format!("*{}", entry.key)
                        } else {
                            entry.key.clone()
                        }
                    })
                    .collect();
                out.push_str(&format!(
                    "{}{}: [{}]\n",
                    "  ".repeat(depth),
                    scope.key(),
                    entries.join(", ")
                ));
            }
        }

        out.push_str(&format!("→ {}", scene.name));
        if let Some(component) = scene.component {
            out.push_str(&format!(" ({component})"));
        }
        if !scene.props.is_empty() {
            let props = serde_json::Value::Object(scene.props.clone());
            out.push_str(&format!(" {props}"));
        }
        out.push('\n');
        out
    }
}
