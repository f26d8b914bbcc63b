//! Emission data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated record describing a city, a color tag, a timestamp and coordinates.
///
/// `id` is assigned by the store on first insert; emissions fresh out of the
/// producer carry `0`. The city name is the natural dedup key: the store holds
/// at most one record per city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityEmission {
    pub id: i64,
    pub city: String,
    /// Color tag as produced (e.g. "Blue")
    pub color: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl CityEmission {
    /// Create an unsaved emission
    pub fn new(
        city: impl Into<String>,
        color: impl Into<String>,
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: 0,
            city: city.into(),
            color: color.into(),
            timestamp,
            latitude,
            longitude,
        }
    }

    /// Coordinates formatted as `(lat, lon)`
    pub fn formatted_coordinates(&self) -> String {
        crate::time::format_coordinates(self.latitude, self.longitude)
    }
}
