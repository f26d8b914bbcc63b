//! Use cases exposed to the presentation layer

use crate::repository::CityRepository;
use cityemit_common::CityEmission;
use std::sync::Arc;
use tokio::sync::watch;

/// Subscribe to the ordered list of stored emissions
#[derive(Clone)]
pub struct GetCityEmissions {
    repository: Arc<dyn CityRepository>,
}

impl GetCityEmissions {
    pub fn new(repository: Arc<dyn CityRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> watch::Receiver<Vec<CityEmission>> {
        self.repository.city_emissions()
    }
}

/// Start background emission production
#[derive(Clone)]
pub struct StartEmissionProduction {
    repository: Arc<dyn CityRepository>,
}

impl StartEmissionProduction {
    pub fn new(repository: Arc<dyn CityRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) {
        self.repository.start_producing().await
    }
}

/// Stop background emission production
#[derive(Clone)]
pub struct StopEmissionProduction {
    repository: Arc<dyn CityRepository>,
}

impl StopEmissionProduction {
    pub fn new(repository: Arc<dyn CityRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) {
        self.repository.stop_producing().await
    }
}
