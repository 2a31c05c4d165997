use super::helpers::{location_from_row, trip_from_row, LOCATION_COLUMNS, TRIP_COLUMNS};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;
use uuid::Uuid;

use crate::{
    api::TripAPI,
    auth::User,
    entities::{NewTrip, Trip, TripDetails},
    error::{trip_not_found_error, Error},
};

#[async_trait]
impl TripAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_trip(&self, user: User, params: NewTrip) -> Result<Trip, Error> {
        let trip = Trip::new(user.id, params)?;

        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "INSERT INTO trips ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            TRIP_COLUMNS
        );

        conn.execute(
            sqlx::query(&query)
                .bind(&trip.id)
                .bind(&trip.user_id)
                .bind(&trip.title)
                .bind(&trip.description)
                .bind(&trip.image_url)
                .bind(trip.start_date)
                .bind(trip.end_date)
                .bind(trip.created_at),
        )
        .await?;

        Ok(trip)
    }

    #[tracing::instrument(skip(self))]
    async fn list_trips(&self, user: User) -> Result<Vec<Trip>, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT {} FROM trips WHERE user_id = $1 ORDER BY created_at DESC",
            TRIP_COLUMNS
        );

        let rows = conn
            .fetch_all(sqlx::query(&query).bind(&user.id))
            .await?;

        rows.iter().map(trip_from_row).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn find_trip(&self, user: User, id: Uuid) -> Result<TripDetails, Error> {
        let mut conn = self.pool.acquire().await?;

        let query = format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS);
        let row = conn
            .fetch_optional(sqlx::query(&query).bind(&id))
            .await?
            .ok_or_else(trip_not_found_error)?;
        let trip = trip_from_row(&row)?;

        self.authorize(user.clone(), "read", trip.clone())?;

        let query = format!(
            "SELECT {} FROM locations WHERE trip_id = $1 ORDER BY \"order\" ASC",
            LOCATION_COLUMNS
        );
        let rows = conn
            .fetch_all(sqlx::query(&query).bind(&id))
            .await?;
        let locations = rows.iter().map(location_from_row).collect::<Result<_, _>>()?;

        Ok(TripDetails { trip, locations })
    }
}
