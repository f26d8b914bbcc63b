//! Repository layer
//!
//! Mediates between the emission producer and the persistence gateway.

mod emission_repository;

pub use emission_repository::EmissionRepository;

use async_trait::async_trait;
use cityemit_common::events::RecordOutcome;
use cityemit_common::CityEmission;
use tokio::sync::watch;

/// Operations the use cases need from a repository
#[async_trait]
pub trait CityRepository: Send + Sync {
    /// Observable list of every stored emission, always ordered by city name
    fn city_emissions(&self) -> watch::Receiver<Vec<CityEmission>>;

    /// Start the background production task; no-op while one is running
    async fn start_producing(&self);

    /// Cancel the background production task and wait for it to wind down
    ///
    /// Nothing is stored once this returns.
    async fn stop_producing(&self);

    /// Reconcile one emission against the store
    ///
    /// Returns `None` when the write failed; failures are logged, never raised.
    async fn insert_emission(&self, emission: CityEmission) -> Option<RecordOutcome>;
}
