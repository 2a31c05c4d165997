use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Location;
use crate::error::{validation_error, Error};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrip {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// A trip together with its locations in visiting order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripDetails {
    #[serde(flatten)]
    pub trip: Trip,
    pub locations: Vec<Location>,
}

impl Trip {
    pub fn new(user_id: Uuid, params: NewTrip) -> Result<Self, Error> {
        let title = params.title.trim();
        if title.is_empty() {
            return Err(validation_error("Missing title"));
        }

        if params.end_date < params.start_date {
            return Err(validation_error("End date must not precede start date"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: params.description,
            image_url: params.image_url.filter(|url| !url.trim().is_empty()),
            start_date: params.start_date,
            end_date: params.end_date,
            created_at: Utc::now(),
        })
    }
}

impl PolarClass for Trip {
    fn get_polar_class_builder() -> oso::ClassBuilder<Trip> {
        oso::Class::builder()
            .name("Trip")
            .add_attribute_getter("id", |recv: &Trip| recv.id.to_string())
            .add_attribute_getter("user_id", |recv: &Trip| recv.user_id.to_string())
    }

    fn get_polar_class() -> oso::Class {
        let builder = Trip::get_polar_class_builder();
        builder.build()
    }
}
