//! Timestamp and display formatting utilities

use chrono::{DateTime, Utc};

/// Display pattern for emission timestamps
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp as `yyyy-MM-dd HH:mm:ss`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}

/// Format coordinates as `(lat, lon)`
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    format!("({}, {})", latitude, longitude)
}
