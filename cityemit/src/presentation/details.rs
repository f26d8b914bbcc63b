//! Detail projection for a single emission

use cityemit_common::{time, CityEmission};
use serde::Serialize;

/// Display color resolved from an emission's color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisplayColor {
    Yellow,
    White,
    Green,
    Blue,
    Red,
    Black,
    /// Fallback for unrecognized tags
    Gray,
}

impl DisplayColor {
    /// Case-insensitive lookup; unknown tags map to `Gray`
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "yellow" => DisplayColor::Yellow,
            "white" => DisplayColor::White,
            "green" => DisplayColor::Green,
            "blue" => DisplayColor::Blue,
            "red" => DisplayColor::Red,
            "black" => DisplayColor::Black,
            _ => DisplayColor::Gray,
        }
    }

    /// Foreground color used by the terminal table
    pub fn table_color(self) -> comfy_table::Color {
        match self {
            DisplayColor::Yellow => comfy_table::Color::Yellow,
            DisplayColor::White => comfy_table::Color::White,
            DisplayColor::Green => comfy_table::Color::Green,
            DisplayColor::Blue => comfy_table::Color::Blue,
            DisplayColor::Red => comfy_table::Color::Red,
            DisplayColor::Black => comfy_table::Color::Black,
            DisplayColor::Gray => comfy_table::Color::DarkGrey,
        }
    }
}

/// Everything the detail view shows for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionDetails {
    pub id: i64,
    pub city: String,
    pub color: String,
    pub display_color: DisplayColor,
    /// `yyyy-MM-dd HH:mm:ss`
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    /// `(lat, lon)`
    pub coordinates: String,
}

impl From<&CityEmission> for EmissionDetails {
    fn from(emission: &CityEmission) -> Self {
        Self {
            id: emission.id,
            city: emission.city.clone(),
            color: emission.color.clone(),
            display_color: DisplayColor::from_tag(&emission.color),
            timestamp: time::format_timestamp(&emission.timestamp),
            latitude: emission.latitude,
            longitude: emission.longitude,
            coordinates: emission.formatted_coordinates(),
        }
    }
}
