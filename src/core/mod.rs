//! # Navigation Core
//!
//! Scene compilation, navigation state and the reducer/resolver.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • compile() (routes)   │
//!                    │  • NavigationState      │
//!                    │  • reduce() (reducer)   │
//!                    │  • Navigator (resolve)  │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ SceneRenderer + listener
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │   Shell    │      │  Native    │      │    Web     │
//!     │  Adapter   │      │  Adapter   │      │  Adapter   │
//!     │  (text)    │      │  (future)  │      │  (future)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`scene`]: `SceneDescriptor`, the declarative input tree
//! - [`route`]: `compile()` and the flat `RouteTable`
//! - [`state`]: `NavigationState`, the stack-of-stacks
//! - [`action`]: the `Action` record
//! - [`reducer`]: `reduce()`, one action against one scope
//! - [`navigator`]: the dispatch context that resolves scopes
//! - [`history`]: prior states for undo
//! - [`config`]: settings file and override resolution
//!
//! `config` and `scene::load_scene_file` are the only places that touch the
//! filesystem.

pub mod action;
pub mod config;
pub mod error;
pub mod history;
pub mod navigator;
pub mod reducer;
pub mod route;
pub mod scene;
pub mod state;

// Re-export commonly used types for convenience
pub use action::{Action, ActionType, Props};
pub use error::RouterError;
pub use navigator::{CurrentScene, Deferred, Navigator, SceneRenderer};
pub use route::{Route, RouteTable, compile};
pub use scene::{SceneDescriptor, SceneType};
pub use state::{NavigationState, StackEntry, initial_state, resolve_active};
