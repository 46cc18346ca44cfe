//! # History
//!
//! Prior root states, newest last. States are values, so keeping one is a
//! clone and restoring one is a move. Bounded: the oldest entry falls off
//! once the limit is reached.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::core::action::ActionType;
use crate::core::state::NavigationState;

/// Default number of states kept for undo.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// State as it was before `cause` was applied.
    pub state: NavigationState,
    pub cause: ActionType,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A limit of 0 disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn record(&mut self, state: NavigationState, cause: ActionType) {
        if self.limit == 0 {
            return;
        }
        self.entries.push_back(HistoryEntry {
            state,
            cause,
            recorded_at: Utc::now(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    /// Takes the most recent entry.
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
