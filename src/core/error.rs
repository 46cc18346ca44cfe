//! # Router Errors
//!
//! Two families live here:
//!
//! - **Compile-time** (`DuplicateKey`, `MissingComponent`, `EmptyContainer`,
//!   `SceneFile`): the scene tree is broken and the app should not start.
//! - **Dispatch-time** (`RouterResolution`, `NoCurrentRouter`,
//!   `InvalidState`): the caller asked for something that cannot exist.
//!
//! An infeasible transition (popping the last entry, focusing a key that
//! isn't on the stack) is NOT an error. The navigator reports it as
//! `Ok(false)` so callers can probe without matching on errors.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::action::ActionType;

/// What a duplicate key collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyConflict {
    /// Another scene (or a synthesized tab wrapper) already uses the key.
    Scene,
    /// The key is an action identifier or a navigator entry point.
    Reserved,
}

impl fmt::Display for KeyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyConflict::Scene => write!(f, "is already defined"),
            KeyConflict::Reserved => write!(f, "is not allowed as key name"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("key '{key}' {conflict}")]
    DuplicateKey { key: String, conflict: KeyConflict },

    #[error("component property is not set for key={key}")]
    MissingComponent { key: String },

    #[error("scene '{key}' has an empty children list")]
    EmptyContainer { key: String },

    #[error("cannot find router for route={name}")]
    RouterResolution { name: String },

    #[error("no current router is set")]
    NoCurrentRouter,

    #[error("'{0}' action needs a target key")]
    MissingTarget(ActionType),

    /// A restored state does not fit the route table.
    #[error("invalid navigation state: {0}")]
    InvalidState(String),

    #[error("failed to load scene file {}: {reason}", .path.display())]
    SceneFile { path: PathBuf, reason: String },
}

impl RouterError {
    /// True for errors that come out of `compile` or scene loading.
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            RouterError::DuplicateKey { .. }
                | RouterError::MissingComponent { .. }
                | RouterError::EmptyContainer { .. }
                | RouterError::SceneFile { .. }
        )
    }
}
