//! Main screen view model
//!
//! Holds the subscription to the stored emissions and drives production from
//! lifecycle transitions. Start and stop are guarded so repeated resumes never
//! create a second production subscription.

use super::details::EmissionDetails;
use super::welcome::WelcomeScheduler;
use crate::usecases::{GetCityEmissions, StartEmissionProduction, StopEmissionProduction};
use cityemit_common::CityEmission;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

pub struct MainViewModel {
    emissions: watch::Receiver<Vec<CityEmission>>,
    start_production: StartEmissionProduction,
    stop_production: StopEmissionProduction,
    welcome: WelcomeScheduler,
    is_producing: AtomicBool,
}

impl MainViewModel {
    pub fn new(
        get_emissions: GetCityEmissions,
        start_production: StartEmissionProduction,
        stop_production: StopEmissionProduction,
        welcome: WelcomeScheduler,
    ) -> Self {
        Self {
            emissions: get_emissions.execute(),
            start_production,
            stop_production,
            welcome,
            is_producing: AtomicBool::new(false),
        }
    }

    /// Current list, ordered by city name
    pub fn emissions(&self) -> Vec<CityEmission> {
        self.emissions.borrow().clone()
    }

    /// Independent receiver for a renderer
    pub fn subscribe(&self) -> watch::Receiver<Vec<CityEmission>> {
        self.emissions.clone()
    }

    /// Stream yielding the current list and every subsequent change
    pub fn emission_stream(&self) -> WatchStream<Vec<CityEmission>> {
        WatchStream::new(self.emissions.clone())
    }

    pub fn is_producing(&self) -> bool {
        self.is_producing.load(Ordering::SeqCst)
    }

    pub async fn start_producing(&self) {
        if self
            .is_producing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            debug!("Starting emission production");
            self.start_production.execute().await;
        } else {
            debug!("Emission production already active, skipping");
        }
    }

    pub async fn stop_producing(&self) {
        if self
            .is_producing
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            debug!("Stopping emission production");
            self.stop_production.execute().await;
        }
    }

    /// Foreground transition
    pub async fn on_resume(&self) {
        self.start_producing().await;
    }

    /// Background transition
    ///
    /// Production keeps its subscription; the producer itself skips cycles
    /// while backgrounded.
    pub async fn on_pause(&self) {}

    /// Final teardown
    pub async fn on_cleared(&self) {
        self.stop_producing().await;
    }

    /// Detail projection for a city in the current list
    pub fn details(&self, city: &str) -> Option<EmissionDetails> {
        self.emissions
            .borrow()
            .iter()
            .find(|e| e.city == city)
            .map(EmissionDetails::from)
    }

    /// Schedule a delayed welcome notice for a city
    pub fn schedule_welcome(&self, city: &str) -> Option<JoinHandle<()>> {
        debug!("Scheduling welcome notice for city: {}", city);
        self.welcome.schedule(city)
    }
}
