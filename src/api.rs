use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{EnrichedLocation, Location, NewTrip, Session, Trip, TripDetails};
use crate::error::Error;

#[async_trait]
pub trait SessionAPI {
    async fn create_session(&self, email: String, name: Option<String>) -> Result<Session, Error>;
    async fn find_session_user(&self, token: Uuid) -> Result<User, Error>;
    async fn delete_session(&self, token: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait TripAPI {
    async fn create_trip(&self, user: User, params: NewTrip) -> Result<Trip, Error>;
    async fn list_trips(&self, user: User) -> Result<Vec<Trip>, Error>;
    async fn find_trip(&self, user: User, id: Uuid) -> Result<TripDetails, Error>;
}

#[async_trait]
pub trait LocationAPI {
    async fn add_location(&self, user: User, trip_id: Uuid, address: String) -> Result<Location, Error>;
    async fn list_enriched_locations(&self, user: User) -> Result<Vec<EnrichedLocation>, Error>;
}

pub trait API: SessionAPI + TripAPI + LocationAPI {}

pub type DynAPI = Arc<dyn API + Send + Sync>;
