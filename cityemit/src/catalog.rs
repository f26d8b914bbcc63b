//! Fixed city pool, color palette and city coordinates

/// Cities the producer draws from, each at most once
pub const CITIES: [&str; 7] = [
    "New York",
    "Los Angeles",
    "Scranton",
    "Philadelphia",
    "Nashville",
    "Saint Louis",
    "Miami",
];

/// Color tags assigned to emissions
pub const COLORS: [&str; 6] = ["Yellow", "White", "Green", "Blue", "Red", "Black"];

/// Hardcoded `(latitude, longitude)` for a city; unknown names map to `(0, 0)`
pub fn coordinates_for(city: &str) -> (f64, f64) {
    match city {
        "New York" => (40.7128, -74.0060),
        "Los Angeles" => (34.0522, -118.2437),
        "Scranton" => (41.4090, -75.6624),
        "Philadelphia" => (39.9526, -75.1652),
        "Nashville" => (36.1627, -86.7816),
        "Saint Louis" => (38.6270, -90.1994),
        "Miami" => (25.7617, -80.1918),
        _ => (0.0, 0.0),
    }
}
