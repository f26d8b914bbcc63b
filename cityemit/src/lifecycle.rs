//! Application lifecycle state
//!
//! Tracks whether the host application is foregrounded. The producer gates
//! emission on this state; the presentation layer drives it.

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// Lifecycle states of the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    /// Constructed, not yet visible
    Created,
    /// Visible and interactive
    Resumed,
    /// Backgrounded
    Paused,
    /// Torn down
    Destroyed,
}

impl LifecycleState {
    /// Only `Resumed` counts as foreground
    pub fn is_foreground(self) -> bool {
        matches!(self, LifecycleState::Resumed)
    }
}

/// Owner of the lifecycle state channel
pub struct AppLifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl AppLifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Created);
        Self { tx }
    }

    /// Receiver observing every future transition
    pub fn observe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    pub fn is_foreground(&self) -> bool {
        self.state().is_foreground()
    }

    pub fn resume(&self) {
        self.transition(LifecycleState::Resumed);
    }

    pub fn pause(&self) {
        self.transition(LifecycleState::Paused);
    }

    pub fn destroy(&self) {
        self.transition(LifecycleState::Destroyed);
    }

    fn transition(&self, next: LifecycleState) {
        let previous = self.tx.send_replace(next);
        if previous != next {
            debug!("Lifecycle {:?} -> {:?}", previous, next);
        }
    }
}

impl Default for AppLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
