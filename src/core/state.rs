//! # Navigation State
//!
//! A tree of scopes. Each scope is a stack of entries plus an index, owned by
//! one container route. An entry whose route is itself a container owns the
//! child scope for it, so dropping the entry drops everything under it.
//!
//! ```text
//! NavigationState (key = root)
//! ├── index: 1
//! └── stack
//!     ├── StackEntry launch
//!     └── StackEntry main  ──► NavigationState (key = main, tabs)
//!                             ├── index: 0
//!                             └── stack
//!                                 ├── StackEntry feedTab ──► NavigationState [feed, post]
//!                                 └── StackEntry profile ──► NavigationState [profile_]
//! ```
//!
//! The active path is the walk from the root through `stack[index].child`.
//! It's recomputed from the value whenever someone asks; nothing stores
//! pointers into the tree. States are plain values: reducers build new ones
//! and old ones stay valid for history.

use serde::{Deserialize, Serialize};

use crate::core::action::Props;
use crate::core::error::RouterError;
use crate::core::route::{Route, RouteTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<NavigationState>,
}

/// One navigation scope. Always holds at least one entry with `index` in range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedState", into = "PersistedState")]
pub struct NavigationState {
    pub(crate) key: String,
    pub(crate) index: usize,
    pub(crate) stack: Vec<StackEntry>,
}

/// Wire shape: `{key, current, index, stack}` with `current` = `stack[index].key`.
#[derive(Serialize, Deserialize)]
struct PersistedState {
    key: String,
    current: String,
    index: usize,
    stack: Vec<StackEntry>,
}

impl From<NavigationState> for PersistedState {
    fn from(state: NavigationState) -> Self {
        PersistedState {
            current: state.current().key.clone(),
            key: state.key,
            index: state.index,
            stack: state.stack,
        }
    }
}

impl TryFrom<PersistedState> for NavigationState {
    type Error = String;

    fn try_from(persisted: PersistedState) -> Result<Self, Self::Error> {
        let Some(entry) = persisted.stack.get(persisted.index) else {
            return Err(format!(
                "scope '{}' has index {} but {} entries",
                persisted.key,
                persisted.index,
                persisted.stack.len()
            ));
        };
        if entry.key != persisted.current {
            return Err(format!(
                "scope '{}' says current='{}' but index points at '{}'",
                persisted.key, persisted.current, entry.key
            ));
        }
        Ok(NavigationState {
            key: persisted.key,
            index: persisted.index,
            stack: persisted.stack,
        })
    }
}

impl NavigationState {
    /// Key of the container route that owns this scope.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Never true for a state built by this crate; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The entry at `index`.
    pub fn current(&self) -> &StackEntry {
        &self.stack[self.index]
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.stack.iter().position(|entry| entry.key == key)
    }

    /// Route keys of the stack, bottom first.
    pub fn keys(&self) -> Vec<&str> {
        self.stack.iter().map(|entry| entry.key.as_str()).collect()
    }

    /// Every scope on the active path, root first.
    pub fn active_path(&self) -> Vec<&NavigationState> {
        let mut path = vec![self];
        let mut scope = self;
        while let Some(child) = scope.current().child.as_ref() {
            path.push(child);
            scope = child;
        }
        path
    }

    /// Copy of `self` with the active scope at `depth` swapped for `scope`.
    ///
    /// Returns `None` when the active path is shallower than `depth`.
    pub(crate) fn with_scope(&self, depth: usize, scope: NavigationState) -> Option<NavigationState> {
        let mut root = self.clone();
        let mut slot = &mut root;
        for _ in 0..depth {
            let index = slot.index;
            slot = slot.stack.get_mut(index)?.child.as_mut()?;
        }
        *slot = scope;
        Some(root)
    }

    /// Checks the whole tree against the route table.
    pub fn validate(&self, table: &RouteTable) -> Result<(), RouterError> {
        if self.key != table.root().key {
            return Err(RouterError::InvalidState(format!(
                "root scope is '{}', expected '{}'",
                self.key,
                table.root().key
            )));
        }
        self.validate_scope(table)
    }

    fn validate_scope(&self, table: &RouteTable) -> Result<(), RouterError> {
        let invalid = |msg: String| Err(RouterError::InvalidState(msg));

        let Some(container) = table.get(&self.key) else {
            return invalid(format!("unknown scope route '{}'", self.key));
        };
        if self.stack.is_empty() {
            return invalid(format!("scope '{}' has an empty stack", self.key));
        }
        if self.index >= self.stack.len() {
            return invalid(format!(
                "scope '{}' index {} is out of range",
                self.key, self.index
            ));
        }
        // every tab is a peer on the stack, in declaration order
        if container.tabs && self.keys() != container.children {
            return invalid(format!(
                "tab scope '{}' holds {:?}, expected {:?}",
                self.key,
                self.keys(),
                container.children
            ));
        }

        for entry in &self.stack {
            let belongs = table.defines(&self.key, &entry.key)
                || (!container.is_container() && entry.key == self.key);
            if !belongs {
                return invalid(format!(
                    "'{}' is not a child of '{}'",
                    entry.key, self.key
                ));
            }
            let owns_scope = table.get(&entry.key).is_some_and(Route::is_container)
                && entry.key != self.key;
            match (&entry.child, owns_scope) {
                (Some(child), true) if child.key == entry.key => child.validate_scope(table)?,
                (Some(child), true) => {
                    return invalid(format!(
                        "entry '{}' owns a scope keyed '{}'",
                        entry.key, child.key
                    ));
                }
                (None, true) => {
                    return invalid(format!("container '{}' has no child scope", entry.key));
                }
                (Some(_), false) => {
                    return invalid(format!("leaf '{}' owns a child scope", entry.key));
                }
                (None, false) => {}
            }
        }
        Ok(())
    }
}

/// The deepest scope on the active path. Actions land here by default.
pub fn resolve_active(state: &NavigationState) -> &NavigationState {
    let mut scope = state;
    while let Some(child) = scope.current().child.as_ref() {
        scope = child;
    }
    scope
}

/// Seeds the root state from the route table.
pub fn initial_state(table: &RouteTable) -> NavigationState {
    let root = table.root();
    if root.is_container() {
        return seed_scope(table, root);
    }
    // single-scene app: the root leaf is its own one-entry stack
    NavigationState {
        key: root.key.clone(),
        index: 0,
        stack: vec![StackEntry {
            key: root.key.clone(),
            props: Props::new(),
            child: None,
        }],
    }
}

/// Fresh scope for a container: every tab, or just the initial child of a stack.
pub(crate) fn seed_scope(table: &RouteTable, container: &Route) -> NavigationState {
    if container.tabs {
        NavigationState {
            key: container.key.clone(),
            index: container.initial,
            stack: container
                .children
                .iter()
                .map(|child| seed_entry(table, child, Props::new()))
                .collect(),
        }
    } else {
        let first = &container.children[container.initial];
        NavigationState {
            key: container.key.clone(),
            index: 0,
            stack: vec![seed_entry(table, first, Props::new())],
        }
    }
}

/// New stack entry, with its own child scope when the route is a container.
pub(crate) fn seed_entry(table: &RouteTable, key: &str, props: Props) -> StackEntry {
    let child = table
        .get(key)
        .filter(|route| route.is_container())
        .map(|route| seed_scope(table, route));
    StackEntry {
        key: key.to_string(),
        props,
        child,
    }
}
