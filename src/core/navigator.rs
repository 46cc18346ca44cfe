//! # Navigator
//!
//! The dispatch context. One `Navigator` per navigation tree; nothing global.
//!
//! ```text
//! Navigator
//! ├── table: RouteTable                 // compiled once, read-only
//! ├── state: Option<NavigationState>    // None until mount()
//! ├── active_depth: Option<usize>       // scope that handled the last action
//! ├── history: History                  // prior states for undo()
//! └── listener: Option<Listener>        // host callback
//! ```
//!
//! ## Resolution
//!
//! Every dispatch recomputes the active path (root → `stack[index].child` →
//! ...) from the current value, starts at its deepest scope and walks up
//! until a scope's container defines the requested name.
//!
//! ```text
//! route("post")
//!   root     defines [launch, main]     ▲
//!   main     defines [feedTab, profile] │ ascend
//!   feedTab  defines [feed, post]   ◄───┘ start here: found
//! ```
//!
//! The path is a fresh `Vec` of borrows, so there are no back-pointers
//! to get wrong and no way to loop.
//!
//! ## Reentrancy
//!
//! The listener can't borrow the navigator. It gets a `Deferred` queue
//! instead; whatever it queues runs right after it returns, each dispatch
//! to completion, before the outer call returns.

use std::collections::VecDeque;
use std::fmt;

use log::{debug, info, warn};
use serde_json::Value;

use crate::core::action::{Action, ActionType, Props, coerce_pop_count, props_from_value};
use crate::core::error::RouterError;
use crate::core::history::History;
use crate::core::reducer::reduce;
use crate::core::route::RouteTable;
use crate::core::state::{NavigationState, initial_state};

/// Deferred dispatches nested deeper than this are dropped with a warning.
pub const MAX_DEFERRED_DEPTH: usize = 16;

/// Host callback, run after every successful state change.
pub type Listener = Box<dyn FnMut(&Action, &NavigationState, &mut Deferred)>;

#[derive(Debug)]
enum DeferredOp {
    Route { name: String, props: Props },
    Pop(usize),
    Apply(Action),
}

/// Navigation requests made from inside a listener.
#[derive(Debug, Default)]
pub struct Deferred {
    ops: VecDeque<DeferredOp>,
}

impl Deferred {
    pub fn route(&mut self, name: impl Into<String>, props: Props) {
        self.ops.push_back(DeferredOp::Route {
            name: name.into(),
            props,
        });
    }

    pub fn pop(&mut self, count: usize) {
        self.ops.push_back(DeferredOp::Pop(count));
    }

    pub fn apply(&mut self, action: Action) {
        self.ops.push_back(DeferredOp::Apply(action));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// What the rendering side needs to draw the active leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentScene<'a> {
    pub key: &'a str,
    pub name: &'a str,
    pub component: Option<&'a str>,
    /// Static scene props with the entry's props merged on top.
    pub props: Props,
    /// Depth of the scope holding this entry (root = 0).
    pub depth: usize,
}

/// The rendering collaborator. The navigator never draws anything itself.
pub trait SceneRenderer {
    type Output;

    fn render(&mut self, state: &NavigationState, scene: &CurrentScene<'_>) -> Self::Output;
}

pub struct Navigator {
    table: RouteTable,
    state: Option<NavigationState>,
    active_depth: Option<usize>,
    history: History,
    listener: Option<Listener>,
    deferred_depth: usize,
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("table", &self.table)
            .field("state", &self.state)
            .field("active_depth", &self.active_depth)
            .field("history", &self.history.len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Named shortcut for one scene: `navigator.scene("detail")?.go(props)`.
pub struct SceneHandle<'a> {
    navigator: &'a mut Navigator,
    name: String,
}

impl SceneHandle<'_> {
    pub fn go(self, props: Props) -> Result<bool, RouterError> {
        self.navigator.dispatch(&self.name, props)
    }
}

impl Navigator {
    /// A navigator with nothing mounted. Dispatching fails until `mount`.
    pub fn new(table: RouteTable) -> Self {
        Self {
            table,
            state: None,
            active_depth: None,
            history: History::default(),
            listener: None,
            deferred_depth: 0,
        }
    }

    pub fn with_history(mut self, history: History) -> Self {
        debug!("History keeps up to {} states", history.limit());
        self.history = history;
        self
    }

    /// Seeds the initial state and makes the root the current router.
    pub fn mount(&mut self) -> &NavigationState {
        let state = initial_state(&self.table);
        info!(
            "Mounted navigation tree '{}' at {:?}",
            state.key(),
            state.active_path().iter().map(|s| s.current().key.as_str()).collect::<Vec<_>>()
        );
        self.history.clear();
        self.active_depth = Some(0);
        self.state.insert(state)
    }

    pub fn unmount(&mut self) {
        self.state = None;
        self.active_depth = None;
        self.history.clear();
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&Action, &NavigationState, &mut Deferred) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn state(&self) -> Option<&NavigationState> {
        self.state.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The scope that handled the last successful action.
    pub fn active_scope(&self) -> Option<&NavigationState> {
        let state = self.state.as_ref()?;
        let depth = self.active_depth?;
        let path = state.active_path();
        path.get(depth.min(path.len() - 1)).copied()
    }

    /// The deepest active entry, resolved against the route table.
    pub fn current_scene(&self) -> Option<CurrentScene<'_>> {
        let state = self.state.as_ref()?;
        let path = state.active_path();
        let scope: &NavigationState = *path.last()?;
        let entry = scope.current();
        let route = self.table.get(&entry.key)?;

        let mut props = route.props.clone();
        for (name, value) in &entry.props {
            props.insert(name.clone(), value.clone());
        }

        Some(CurrentScene {
            key: &route.key,
            name: &route.name,
            component: route.component.as_deref(),
            props,
            depth: path.len() - 1,
        })
    }

    pub fn render<R: SceneRenderer>(&self, renderer: &mut R) -> Option<R::Output> {
        let state = self.state.as_ref()?;
        let scene = self.current_scene()?;
        Some(renderer.render(state, &scene))
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Navigates to a scene by name using that scene's own type.
    pub fn dispatch(&mut self, name: &str, props: Props) -> Result<bool, RouterError> {
        let depth = self.resolve(name, None)?;
        let action = self.action_for(name, props);
        self.commit(depth, action)
    }

    /// Same as `dispatch`.
    pub fn route(&mut self, name: &str, props: Props) -> Result<bool, RouterError> {
        self.dispatch(name, props)
    }

    /// `dispatch` for a loose payload: non-objects end up under `data`.
    pub fn dispatch_value(&mut self, name: &str, payload: Value) -> Result<bool, RouterError> {
        self.dispatch(name, props_from_value(payload))
    }

    /// Shortcut handle for a compiled scene.
    pub fn scene(&mut self, name: &str) -> Result<SceneHandle<'_>, RouterError> {
        if self.table.trigger(name).is_none() {
            return Err(RouterError::RouterResolution {
                name: name.to_string(),
            });
        }
        Ok(SceneHandle {
            navigator: self,
            name: name.to_string(),
        })
    }

    pub fn push(&mut self, key: &str, props: Props) -> Result<bool, RouterError> {
        self.apply(Action::to(ActionType::Push, key, props))
    }

    pub fn jump(&mut self, key: &str, props: Props) -> Result<bool, RouterError> {
        self.apply(Action::to(ActionType::Jump, key, props))
    }

    pub fn replace(&mut self, key: &str, props: Props) -> Result<bool, RouterError> {
        self.apply(Action::to(ActionType::Replace, key, props))
    }

    pub fn reset(&mut self, key: &str, props: Props) -> Result<bool, RouterError> {
        self.apply(Action::to(ActionType::Reset, key, props))
    }

    pub fn focus(&mut self, key: &str) -> Result<bool, RouterError> {
        self.apply(Action::to(ActionType::Focus, key, Props::new()))
    }

    /// Merges props into the deepest active entry.
    pub fn refresh(&mut self, props: Props) -> Result<bool, RouterError> {
        self.apply(Action::refresh(props))
    }

    /// Replaces the whole tree, e.g. from a deep link or a saved session.
    pub fn init(&mut self, state: NavigationState) -> Result<bool, RouterError> {
        self.mounted_state()?;
        state.validate(&self.table)?;
        self.commit(0, Action::init(state))
    }

    /// Pops `count` entries, one at a time.
    ///
    /// Stops at the first pop nothing can handle and returns `false`. Pops
    /// already done stay done.
    pub fn pop(&mut self, count: usize) -> Result<bool, RouterError> {
        self.mounted_state()?;
        if count > 1 {
            for done in 0..count {
                if !self.pop_once()? {
                    debug!("Pop {} of {} failed, keeping {} pops", done + 1, count, done);
                    return Ok(false);
                }
            }
            return Ok(true);
        }
        self.pop_once()
    }

    /// Applies a raw action record.
    pub fn apply(&mut self, action: Action) -> Result<bool, RouterError> {
        match action.kind {
            ActionType::Init => {
                let state = action
                    .state
                    .ok_or(RouterError::MissingTarget(ActionType::Init))?;
                self.init(*state)
            }
            ActionType::Pop => {
                let count = action.props.get("count").map_or(1, coerce_pop_count);
                self.pop(count)
            }
            ActionType::Refresh => {
                let depth = match action.parent_key.as_deref() {
                    Some(parent) => self.scope_depth(parent, parent)?,
                    None => self.deepest()?,
                };
                self.commit(depth, action)
            }
            kind => {
                let key = action
                    .key
                    .as_deref()
                    .ok_or(RouterError::MissingTarget(kind))?;
                let depth = self.resolve(key, action.parent_key.as_deref())?;
                self.commit(depth, action)
            }
        }
    }

    /// Restores the state before the last successful change.
    pub fn undo(&mut self) -> Result<bool, RouterError> {
        self.mounted_state()?;
        let Some(entry) = self.history.pop() else {
            return Ok(false);
        };
        debug!("Undoing '{}' recorded at {}", entry.cause, entry.recorded_at);
        self.active_depth = Some(entry.state.active_path().len() - 1);
        self.state = Some(entry.state.clone());
        self.notify(&Action::init(entry.state));
        Ok(true)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn mounted_state(&self) -> Result<&NavigationState, RouterError> {
        match (&self.state, self.active_depth) {
            (Some(state), Some(_)) => Ok(state),
            _ => Err(RouterError::NoCurrentRouter),
        }
    }

    fn deepest(&self) -> Result<usize, RouterError> {
        Ok(self.mounted_state()?.active_path().len() - 1)
    }

    /// Depth of the active scope owned by the `parent` container.
    fn scope_depth(&self, parent: &str, name: &str) -> Result<usize, RouterError> {
        self.mounted_state()?
            .active_path()
            .iter()
            .position(|scope| scope.key() == parent)
            .ok_or_else(|| RouterError::RouterResolution {
                name: name.to_string(),
            })
    }

    /// Finds the scope on the active path whose container defines `name`.
    fn resolve(&self, name: &str, parent: Option<&str>) -> Result<usize, RouterError> {
        let state = self.mounted_state()?;
        if let Some(parent) = parent {
            let depth = self.scope_depth(parent, name)?;
            if !self.table.defines(parent, name) {
                return Err(RouterError::RouterResolution {
                    name: name.to_string(),
                });
            }
            return Ok(depth);
        }

        let path = state.active_path();
        (0..path.len())
            .rev()
            .find(|&depth| self.table.defines(path[depth].key(), name))
            .ok_or_else(|| RouterError::RouterResolution {
                name: name.to_string(),
            })
    }

    fn action_for(&self, name: &str, props: Props) -> Action {
        match self.table.trigger(name) {
            Some(trigger) => trigger(props),
            // synthesized tab wrappers have no trigger; they're plain pushes
            None => Action::to(ActionType::Push, name, props),
        }
    }

    /// Reduces `action` at the active scope `depth` and installs the result.
    fn commit(&mut self, depth: usize, action: Action) -> Result<bool, RouterError> {
        let state = self.mounted_state()?;
        let path = state.active_path();
        let Some(scope) = path.get(depth) else {
            return Ok(false);
        };
        let Some(next_scope) = reduce(scope, &action, &self.table) else {
            debug!(
                "'{}' {:?} not handled at scope '{}'",
                action.kind,
                action.key,
                scope.key()
            );
            return Ok(false);
        };
        let Some(next) = state.with_scope(depth, next_scope) else {
            return Ok(false);
        };
        self.install(next, depth, action)
    }

    fn pop_once(&mut self) -> Result<bool, RouterError> {
        let action = Action::pop();
        let state = self.mounted_state()?;
        let path = state.active_path();
        for depth in (0..path.len()).rev() {
            if let Some(scope) = reduce(path[depth], &action, &self.table) {
                let Some(next) = state.with_scope(depth, scope) else {
                    return Ok(false);
                };
                return self.install(next, depth, action);
            }
        }
        debug!("Nothing on the active path can pop");
        Ok(false)
    }

    fn install(
        &mut self,
        next: NavigationState,
        depth: usize,
        action: Action,
    ) -> Result<bool, RouterError> {
        let scope_key = next
            .active_path()
            .get(depth)
            .map(|scope| scope.key().to_string())
            .unwrap_or_default();
        debug!(
            "Applied '{}' {:?} at scope '{}' (depth {})",
            action.kind, action.key, scope_key, depth
        );

        if let Some(previous) = self.state.replace(next) {
            self.history.record(previous, action.kind);
        }
        self.active_depth = Some(depth);
        self.notify(&action);
        Ok(true)
    }

    /// Runs the listener and whatever it queued. The transition that
    /// triggered it is already committed, so queued failures are only logged.
    fn notify(&mut self, action: &Action) {
        let (Some(listener), Some(state)) = (self.listener.as_mut(), self.state.as_ref()) else {
            return;
        };
        let mut deferred = Deferred::default();
        listener(action, state, &mut deferred);
        self.run_deferred(deferred)
    }

    fn run_deferred(&mut self, deferred: Deferred) {
        if deferred.is_empty() {
            return;
        }
        if self.deferred_depth >= MAX_DEFERRED_DEPTH {
            warn!(
                "Dropping {} deferred navigation requests: nested deeper than {}",
                deferred.len(),
                MAX_DEFERRED_DEPTH
            );
            return;
        }

        self.deferred_depth += 1;
        for op in deferred.ops {
            let label = format!("{op:?}");
            let outcome = match op {
                DeferredOp::Route { name, props } => self.dispatch(&name, props),
                DeferredOp::Pop(count) => self.pop(count),
                DeferredOp::Apply(action) => self.apply(action),
            };
            match outcome {
                Ok(true) => {}
                Ok(false) => debug!("Deferred {label} changed nothing"),
                Err(e) => warn!("Deferred {label} failed: {e}"),
            }
        }
        self.deferred_depth -= 1;
    }
}
