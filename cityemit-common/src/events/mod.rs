//! Event types for the CityEmit event system
//!
//! Provides the shared event definitions and the EventBus used to announce
//! production and storage activity to any interested component.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// How a reconciled emission reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOutcome {
    /// First emission for this city
    Inserted,
    /// Existing city record overwritten in place
    Updated,
}

/// CityEmit event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CityEvent {
    /// An emission was written to the store
    EmissionRecorded {
        id: i64,
        city: String,
        color: String,
        outcome: RecordOutcome,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A storage write failed and the emission was dropped
    StorageFailure {
        city: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Background production task started
    ProductionStarted {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Background production task was cancelled
    ProductionStopped {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Producer ran out of cities
    ProductionExhausted {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Delayed greeting for a selected city
    WelcomeNotice {
        city: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CityEvent {
    /// Event type name as serialized in the `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            CityEvent::EmissionRecorded { .. } => "EmissionRecorded",
            CityEvent::StorageFailure { .. } => "StorageFailure",
            CityEvent::ProductionStarted { .. } => "ProductionStarted",
            CityEvent::ProductionStopped { .. } => "ProductionStopped",
            CityEvent::ProductionExhausted { .. } => "ProductionExhausted",
            CityEvent::WelcomeNotice { .. } => "WelcomeNotice",
        }
    }
}

/// Broadcast bus for CityEvents
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CityEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<CityEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CityEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
