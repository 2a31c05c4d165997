use axum::extract::{Extension, Json, Path};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::{NewTrip, Trip, TripDetails};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<NewTrip>,
) -> Result<Json<Trip>, Error> {
    let trip = api.create_trip(user, params).await?;

    Ok(trip.into())
}

pub async fn list(Extension(api): Extension<DynAPI>, user: User) -> Result<Json<Vec<Trip>>, Error> {
    let trips = api.list_trips(user).await?;

    Ok(trips.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<TripDetails>, Error> {
    let trip = api.find_trip(user, id).await?;

    Ok(trip.into())
}
