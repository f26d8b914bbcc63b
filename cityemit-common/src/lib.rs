//! # CityEmit Common Library
//!
//! Shared code for the city emission tracker:
//! - Emission data model and SQLite persistence
//! - Event types (CityEvent enum) and the EventBus
//! - Bootstrap configuration loading
//! - Timestamp and formatting helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::CityEmission;
