//! Emission table operations

use crate::model::CityEmission;
use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Load all emissions ordered by city name
pub async fn load_all_emissions(pool: &SqlitePool) -> Result<Vec<CityEmission>> {
    let rows = sqlx::query(
        r#"
        SELECT id, city, color, timestamp, latitude, longitude
        FROM emissions
        ORDER BY city ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_emission).collect()
}

/// Load the emission stored for a city
pub async fn load_emission_by_city(pool: &SqlitePool, city: &str) -> Result<Option<CityEmission>> {
    let row = sqlx::query(
        r#"
        SELECT id, city, color, timestamp, latitude, longitude
        FROM emissions
        WHERE city = ?
        LIMIT 1
        "#,
    )
    .bind(city)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_emission).transpose()
}

/// Insert a new emission, returning its assigned id
pub async fn insert_emission(pool: &SqlitePool, emission: &CityEmission) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO emissions (city, color, timestamp, latitude, longitude)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&emission.city)
    .bind(&emission.color)
    .bind(emission.timestamp.to_rfc3339())
    .bind(emission.latitude)
    .bind(emission.longitude)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrite color, timestamp and coordinates of the row with `emission.id`
///
/// Returns the number of rows touched (0 when the id is unknown).
pub async fn update_emission(pool: &SqlitePool, emission: &CityEmission) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE emissions
        SET color = ?, timestamp = ?, latitude = ?, longitude = ?
        WHERE id = ?
        "#,
    )
    .bind(&emission.color)
    .bind(emission.timestamp.to_rfc3339())
    .bind(emission.latitude)
    .bind(emission.longitude)
    .bind(emission.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Count stored emissions
pub async fn count_emissions(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM emissions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn row_to_emission(row: &SqliteRow) -> Result<CityEmission> {
    let timestamp_str: String = row.try_get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)?.with_timezone(&Utc);

    Ok(CityEmission {
        id: row.try_get("id")?,
        city: row.try_get("city")?,
        color: row.try_get("color")?,
        timestamp,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
    })
}
