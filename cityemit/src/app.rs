//! Object graph wiring
//!
//! Builds every component once and hands out shared references, the way the
//! binary and the integration tests both need them.

use crate::lifecycle::AppLifecycle;
use crate::presentation::{MainViewModel, WelcomeScheduler};
use crate::producer::EmissionProducer;
use crate::repository::{CityRepository, EmissionRepository};
use crate::store::SqliteEmissionStore;
use crate::usecases::{GetCityEmissions, StartEmissionProduction, StopEmissionProduction};
use cityemit_common::config::TomlConfig;
use cityemit_common::events::EventBus;
use cityemit_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Runtime knobs for the object graph
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Delay between producer cycles
    pub emission_interval: Duration,
    /// Delay before welcome notices are published
    pub welcome_delay: Duration,
    /// EventBus buffer size
    pub event_capacity: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

impl AppSettings {
    pub fn from_toml(config: &TomlConfig) -> Self {
        Self {
            emission_interval: config.producer.interval(),
            welcome_delay: config.presentation.welcome_delay(),
            event_capacity: 256,
        }
    }
}

/// Fully wired application
pub struct AppContext {
    pub lifecycle: Arc<AppLifecycle>,
    pub events: EventBus,
    pub producer: Arc<EmissionProducer>,
    pub repository: EmissionRepository,
    pub view_model: MainViewModel,
}

impl AppContext {
    /// Wire the application over an initialized database pool
    pub async fn build(pool: SqlitePool, settings: AppSettings) -> Result<Self> {
        let lifecycle = Arc::new(AppLifecycle::new());
        let events = EventBus::new(settings.event_capacity);

        let store = Arc::new(SqliteEmissionStore::new(pool));
        let producer = Arc::new(EmissionProducer::new(
            settings.emission_interval,
            lifecycle.observe(),
        ));

        let repository = EmissionRepository::new(store, producer.clone(), events.clone()).await?;
        let shared: Arc<dyn CityRepository> = Arc::new(repository.clone());

        let view_model = MainViewModel::new(
            GetCityEmissions::new(shared.clone()),
            StartEmissionProduction::new(shared.clone()),
            StopEmissionProduction::new(shared),
            WelcomeScheduler::new(events.clone(), settings.welcome_delay),
        );

        Ok(Self {
            lifecycle,
            events,
            producer,
            repository,
            view_model,
        })
    }

    /// Bring the application to the foreground
    pub async fn resume(&self) {
        self.lifecycle.resume();
        self.view_model.on_resume().await;
    }

    /// Open the production subscription without entering the foreground
    ///
    /// The producer gate stays closed until the next `resume`.
    pub async fn start_backgrounded(&self) {
        self.view_model.start_producing().await;
        self.lifecycle.pause();
    }

    /// Send the application to the background
    pub async fn pause(&self) {
        self.lifecycle.pause();
        self.view_model.on_pause().await;
    }

    /// Tear down: stop production and mark the lifecycle destroyed
    pub async fn shutdown(&self) {
        self.view_model.on_cleared().await;
        self.lifecycle.destroy();
    }
}
