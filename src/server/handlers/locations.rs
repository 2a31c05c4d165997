use axum::extract::{Extension, Form, Json, Path};
use axum::response::Redirect;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::entities::EnrichedLocation;
use crate::error::Error;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    address: String,
}

/// Adds a location to a trip from a form post and sends the browser back to
/// the trip page.
pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(trip_id): Path<Uuid>,
    Form(params): Form<CreateParams>,
) -> Result<Redirect, Error> {
    api.add_location(user, trip_id, params.address).await?;

    Ok(Redirect::to(&format!("/trips/{}", trip_id)))
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<EnrichedLocation>>, Error> {
    let locations = api.list_enriched_locations(user).await?;

    Ok(locations.into())
}
