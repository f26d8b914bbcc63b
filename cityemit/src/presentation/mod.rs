//! Presentation layer
//!
//! View model, detail projection, welcome notices and terminal rendering.

pub mod details;
pub mod render;
pub mod view_model;
pub mod welcome;

pub use details::{DisplayColor, EmissionDetails};
pub use view_model::MainViewModel;
pub use welcome::WelcomeScheduler;
