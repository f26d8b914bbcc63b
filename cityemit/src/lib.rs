//! cityemit library
//!
//! Periodically produces synthetic city emissions, reconciles them into a
//! SQLite table keyed by city name and exposes the stored list as an
//! observable, city-ordered collection.
//!
//! Production flows producer → repository → store; consumption flows
//! store → repository → presentation.

pub mod app;
pub mod catalog;
pub mod lifecycle;
pub mod presentation;
pub mod producer;
pub mod repository;
pub mod store;
pub mod usecases;

pub use app::{AppContext, AppSettings};
pub use repository::{CityRepository, EmissionRepository};
