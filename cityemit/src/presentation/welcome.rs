//! Delayed welcome notices
//!
//! Selecting a city schedules a one-shot "Welcome to <city>" notice that is
//! published on the event bus after a fixed delay.

use cityemit_common::events::{CityEvent, EventBus};
use cityemit_common::time;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Schedules one-shot welcome notices
#[derive(Clone)]
pub struct WelcomeScheduler {
    events: EventBus,
    delay: Duration,
}

impl WelcomeScheduler {
    pub fn new(events: EventBus, delay: Duration) -> Self {
        Self { events, delay }
    }

    /// Publish `Welcome to <city>` after the configured delay
    ///
    /// Blank city names are rejected and nothing is scheduled.
    pub fn schedule(&self, city: &str) -> Option<JoinHandle<()>> {
        let city = city.trim();
        if city.is_empty() {
            debug!("Ignoring welcome request without a city name");
            return None;
        }

        debug!("Scheduling welcome notice for {} in {:?}", city, self.delay);
        let events = self.events.clone();
        let delay = self.delay;
        let city = city.to_string();

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let message = welcome_message(&city);
            info!("{}", message);
            events.emit_lossy(CityEvent::WelcomeNotice {
                city,
                message,
                timestamp: time::now(),
            });
        }))
    }
}

pub fn welcome_message(city: &str) -> String {
    format!("Welcome to {}", city)
}
