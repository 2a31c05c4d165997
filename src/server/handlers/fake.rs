use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::api::{DynAPI, LocationAPI, SessionAPI, TripAPI, API};
use crate::auth::User;
use crate::entities::{
    Coordinates, EnrichedLocation, GeocodeResult, Location, LocationRecord, NewTrip, Session,
    Trip, TripDetails,
};
use crate::error::{
    database_error, trip_not_found_error, unauthenticated_error, unauthorized_error,
    validation_error, Error,
};

/// In-memory stand-in for the engine.
#[derive(Default)]
pub struct FakeAPI {
    pub sessions: Mutex<HashMap<Uuid, User>>,
    pub trips: Mutex<Vec<Trip>>,
    pub locations: Mutex<Vec<Location>>,
    pub broken: bool,
}

impl FakeAPI {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn sign_in(&self, email: &str) -> (User, Uuid) {
        let user = User::new(email.into(), None);
        let token = Uuid::new_v4();
        self.sessions.lock().unwrap().insert(token, user.clone());
        (user, token)
    }

    pub fn add_trip(&self, user: &User, title: &str) -> Trip {
        let now = Utc::now();
        let trip = Trip::new(
            user.id,
            NewTrip {
                title: title.into(),
                description: "".into(),
                image_url: None,
                start_date: now,
                end_date: now,
            },
        )
        .unwrap();
        self.trips.lock().unwrap().push(trip.clone());
        trip
    }

    pub fn into_dyn(self) -> DynAPI {
        Arc::new(self)
    }
}

#[async_trait]
impl SessionAPI for FakeAPI {
    async fn create_session(&self, email: String, name: Option<String>) -> Result<Session, Error> {
        if email.trim().is_empty() {
            return Err(validation_error("Missing email"));
        }
        let session = Session::new(User::new(email, name));
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token, session.user.clone());
        Ok(session)
    }

    async fn find_session_user(&self, token: Uuid) -> Result<User, Error> {
        self.sessions
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .ok_or_else(unauthenticated_error)
    }

    async fn delete_session(&self, token: Uuid) -> Result<(), Error> {
        self.sessions.lock().unwrap().remove(&token);
        Ok(())
    }
}

#[async_trait]
impl TripAPI for FakeAPI {
    async fn create_trip(&self, user: User, params: NewTrip) -> Result<Trip, Error> {
        let trip = Trip::new(user.id, params)?;
        self.trips.lock().unwrap().push(trip.clone());
        Ok(trip)
    }

    async fn list_trips(&self, user: User) -> Result<Vec<Trip>, Error> {
        Ok(self
            .trips
            .lock()
            .unwrap()
            .iter()
            .filter(|trip| trip.user_id == user.id)
            .cloned()
            .collect())
    }

    async fn find_trip(&self, user: User, id: Uuid) -> Result<TripDetails, Error> {
        let trip = self.owned_trip(&user, id)?;
        let locations = self
            .locations
            .lock()
            .unwrap()
            .iter()
            .filter(|location| location.trip_id == id)
            .cloned()
            .collect();
        Ok(TripDetails { trip, locations })
    }
}

#[async_trait]
impl LocationAPI for FakeAPI {
    async fn add_location(&self, user: User, trip_id: Uuid, address: String) -> Result<Location, Error> {
        if address.trim().is_empty() {
            return Err(validation_error("Missing address"));
        }
        self.owned_trip(&user, trip_id)?;

        let mut locations = self.locations.lock().unwrap();
        let order = locations.iter().filter(|l| l.trip_id == trip_id).count() as i32;
        let location = Location::new(trip_id, address, Coordinates { lat: 1.0, lng: 2.0 }, order);
        locations.push(location.clone());
        Ok(location)
    }

    async fn list_enriched_locations(&self, user: User) -> Result<Vec<EnrichedLocation>, Error> {
        if self.broken {
            return Err(database_error("connection refused"));
        }

        let trips = self.list_trips(user).await?;
        let locations = self.locations.lock().unwrap();

        let enriched = trips
            .iter()
            .flat_map(|trip| {
                locations
                    .iter()
                    .filter(move |l| l.trip_id == trip.id)
                    .map(move |l| {
                        let record = LocationRecord {
                            title: l.location_title.clone(),
                            lat: l.lat,
                            lng: l.lng,
                            trip_title: trip.title.clone(),
                        };
                        record.resolved(&GeocodeResult {
                            country: "Testland".into(),
                            formatted_address: l.location_title.clone(),
                        })
                    })
            })
            .collect();

        Ok(enriched)
    }
}

impl FakeAPI {
    fn owned_trip(&self, user: &User, id: Uuid) -> Result<Trip, Error> {
        let trip = self
            .trips
            .lock()
            .unwrap()
            .iter()
            .find(|trip| trip.id == id)
            .cloned()
            .ok_or_else(trip_not_found_error)?;

        if trip.user_id != user.id {
            return Err(unauthorized_error());
        }

        Ok(trip)
    }
}

impl API for FakeAPI {}
