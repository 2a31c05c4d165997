use super::helpers::{
    count_locations, fetch_trip_for_update, insert_location, record_from_row, trip_from_row,
    TRIP_COLUMNS,
};
use super::Engine;

use async_trait::async_trait;
use sqlx::Executor;
use uuid::Uuid;

use crate::{
    api::LocationAPI,
    auth::User,
    enrichment,
    entities::{EnrichedLocation, Location},
    error::{trip_not_found_error, unexpected_error, validation_error, Error},
};

#[async_trait]
impl LocationAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn add_location(
        &self,
        user: User,
        trip_id: Uuid,
        address: String,
    ) -> Result<Location, Error> {
        let address = address.trim().to_string();
        if address.is_empty() {
            return Err(validation_error("Missing address"));
        }

        let result = self.insert_geocoded_location(user, trip_id, address.clone()).await;

        if let Err(err) = &result {
            tracing::error!(%trip_id, %address, error = %err, "failed to add location");
        }

        result
    }

    #[tracing::instrument(skip(self))]
    async fn list_enriched_locations(&self, user: User) -> Result<Vec<EnrichedLocation>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rows = conn
            .fetch_all(
                sqlx::query(
                    "SELECT l.location_title, l.lat, l.lng, t.title AS trip_title
                     FROM locations l JOIN trips t ON t.id = l.trip_id
                     WHERE t.user_id = $1
                     ORDER BY t.created_at ASC, l.\"order\" ASC",
                )
                .bind(&user.id),
            )
            .await?;

        // release the connection before the slow part
        drop(conn);

        let records = rows.iter().map(record_from_row).collect::<Result<Vec<_>, _>>()?;

        Ok(enrichment::enrich(&records, self.enrich_concurrency, self.geocoder.as_ref()).await)
    }
}

impl Engine {
    async fn insert_geocoded_location(
        &self,
        user: User,
        trip_id: Uuid,
        address: String,
    ) -> Result<Location, Error> {
        let query = format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS);
        let row = self
            .pool
            .fetch_optional(sqlx::query(&query).bind(&trip_id))
            .await?
            .ok_or_else(trip_not_found_error)?;
        let trip = trip_from_row(&row)?;

        self.authorize(user.clone(), "add_location", trip)?;

        let coordinates = self.geocoder.forward_geocode(&address).await?;

        let mut tx = self.pool.begin().await?;

        // the row lock serializes order assignment per trip
        fetch_trip_for_update(&mut tx, &trip_id).await?;
        let count = count_locations(&mut tx, &trip_id).await?;
        let order = i32::try_from(count).map_err(|_| unexpected_error())?;

        let location = Location::new(trip_id, address, coordinates, order);
        insert_location(&mut tx, &location).await?;

        tx.commit().await?;

        Ok(location)
    }
}
