use super::Database;

use sqlx::{postgres::PgRow, Executor, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Location, LocationRecord, Trip},
    error::{trip_not_found_error, Error},
};

pub const TRIP_COLUMNS: &str =
    "id, user_id, title, description, image_url, start_date, end_date, created_at";

pub const LOCATION_COLUMNS: &str = "id, trip_id, location_title, lat, lng, \"order\", created_at";

pub fn trip_from_row(row: &PgRow) -> Result<Trip, Error> {
    Ok(Trip {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn location_from_row(row: &PgRow) -> Result<Location, Error> {
    Ok(Location {
        id: row.try_get("id")?,
        trip_id: row.try_get("trip_id")?,
        location_title: row.try_get("location_title")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        order: row.try_get("order")?,
        created_at: row.try_get("created_at")?,
    })
}

pub fn record_from_row(row: &PgRow) -> Result<LocationRecord, Error> {
    Ok(LocationRecord {
        title: row.try_get("location_title")?,
        lat: row.try_get("lat")?,
        lng: row.try_get("lng")?,
        trip_title: row.try_get("trip_title")?,
    })
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_trip_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Trip, Error> {
    let query = format!("SELECT {} FROM trips WHERE id = $1 FOR UPDATE", TRIP_COLUMNS);

    let row = tx
        .fetch_optional(sqlx::query(&query).bind(id))
        .await?
        .ok_or_else(trip_not_found_error)?;

    trip_from_row(&row)
}

#[tracing::instrument(skip(tx))]
pub async fn count_locations(
    tx: &mut Transaction<'_, Database>,
    trip_id: &Uuid,
) -> Result<i64, Error> {
    let count: i64 = tx
        .fetch_one(sqlx::query("SELECT COUNT(*) AS count FROM locations WHERE trip_id = $1").bind(trip_id))
        .await?
        .try_get("count")?;

    Ok(count)
}

#[tracing::instrument(skip(tx))]
pub async fn insert_location(
    tx: &mut Transaction<'_, Database>,
    location: &Location,
) -> Result<(), Error> {
    let query = format!(
        "INSERT INTO locations ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        LOCATION_COLUMNS
    );

    tx.execute(
        sqlx::query(&query)
            .bind(&location.id)
            .bind(&location.trip_id)
            .bind(&location.location_title)
            .bind(location.lat)
            .bind(location.lng)
            .bind(location.order)
            .bind(location.created_at),
    )
    .await?;

    Ok(())
}
