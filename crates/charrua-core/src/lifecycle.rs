//! App lifecycle tracking
//!
//! Front ends report the platform's app state; the tracker turns raw state
//! updates into foreground transitions that drive polling and the booking
//! reset after an external payment page.

use serde::{Deserialize, Serialize};

/// Platform app state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppLifecycleState {
    Active,
    Inactive,
    Background,
}

impl AppLifecycleState {
    pub fn is_foreground(&self) -> bool {
        matches!(self, AppLifecycleState::Active)
    }
}

impl Default for AppLifecycleState {
    fn default() -> Self {
        AppLifecycleState::Active
    }
}

/// Foreground edge produced by a state update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleTransition {
    EnteredForeground,
    LeftForeground,
}

/// Remembers the last reported state and detects foreground edges
#[derive(Debug, Clone, Default)]
pub struct LifecycleTracker {
    current: AppLifecycleState,
}

impl LifecycleTracker {
    pub fn new(initial: AppLifecycleState) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> AppLifecycleState {
        self.current
    }

    /// Record the next state; returns the edge crossed, if any
    pub fn update(&mut self, next: AppLifecycleState) -> Option<LifecycleTransition> {
        let previous = std::mem::replace(&mut self.current, next);
        match (previous.is_foreground(), next.is_foreground()) {
            (false, true) => Some(LifecycleTransition::EnteredForeground),
            (true, false) => Some(LifecycleTransition::LeftForeground),
            _ => None,
        }
    }
}
