//! Persistence gateway
//!
//! Thin async interface over the emissions table. The repository is the only
//! writer; everything else reads through the repository's snapshot.

use async_trait::async_trait;
use cityemit_common::{db, CityEmission, Error, Result};
use sqlx::SqlitePool;

/// Emission storage operations
#[async_trait]
pub trait EmissionStore: Send + Sync {
    /// All stored emissions ordered by city name
    async fn all_emissions(&self) -> Result<Vec<CityEmission>>;

    /// The record stored for `city`, if any
    async fn emission_by_city(&self, city: &str) -> Result<Option<CityEmission>>;

    /// Insert a new record, returning its assigned id
    async fn insert_emission(&self, emission: &CityEmission) -> Result<i64>;

    /// Overwrite the record identified by `emission.id`
    async fn update_emission(&self, emission: &CityEmission) -> Result<()>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteEmissionStore {
    pool: SqlitePool,
}

impl SqliteEmissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl EmissionStore for SqliteEmissionStore {
    async fn all_emissions(&self) -> Result<Vec<CityEmission>> {
        db::load_all_emissions(&self.pool).await
    }

    async fn emission_by_city(&self, city: &str) -> Result<Option<CityEmission>> {
        db::load_emission_by_city(&self.pool, city).await
    }

    async fn insert_emission(&self, emission: &CityEmission) -> Result<i64> {
        db::insert_emission(&self.pool, emission).await
    }

    async fn update_emission(&self, emission: &CityEmission) -> Result<()> {
        match db::update_emission(&self.pool, emission).await? {
            0 => Err(Error::NotFound(format!("emission id {}", emission.id))),
            _ => Ok(()),
        }
    }
}
