//! Terminal rendering of the emission list

use super::details::{DisplayColor, EmissionDetails};
use cityemit_common::{time, CityEmission};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, Table};

/// Render the list as a table: city, color, timestamp, coordinates
pub fn render_emissions(emissions: &[CityEmission]) -> String {
    if emissions.is_empty() {
        return "No emissions yet".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["City", "Color", "Timestamp", "Coordinates"]);

    for emission in emissions {
        let color = DisplayColor::from_tag(&emission.color);
        table.add_row(vec![
            Cell::new(&emission.city),
            Cell::new(&emission.color).fg(color.table_color()),
            Cell::new(time::format_timestamp(&emission.timestamp)),
            Cell::new(emission.formatted_coordinates()),
        ]);
    }

    table.to_string()
}

/// Render the detail view for one city
pub fn render_details(details: &EmissionDetails) -> String {
    format!(
        "{}\n  color: {} ({:?})\n  recorded: {}\n  location: {}",
        details.city, details.color, details.display_color, details.timestamp, details.coordinates
    )
}
