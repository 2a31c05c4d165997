use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const UNKNOWN: &str = "Unknown";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A stop on a trip, as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub location_title: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(trip_id: Uuid, location_title: String, coordinates: Coordinates, order: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            location_title,
            lat: Some(coordinates.lat),
            lng: Some(coordinates.lng),
            order,
            created_at: Utc::now(),
        }
    }
}

/// A location joined with the title of the trip that owns it.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationRecord {
    pub title: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub trip_title: String,
}

impl LocationRecord {
    pub fn key(&self) -> String {
        coordinate_key(self.lat, self.lng)
    }

    /// Both coordinates, if both are present and finite.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinates { lat, lng })
            }
            _ => None,
        }
    }

    pub fn resolved(&self, result: &GeocodeResult) -> EnrichedLocation {
        self.labelled(&result.formatted_address, &result.country)
    }

    pub fn unknown_location(&self) -> EnrichedLocation {
        self.labelled("Unknown location", UNKNOWN)
    }

    pub fn unknown_address(&self) -> EnrichedLocation {
        self.labelled("Unknown address", UNKNOWN)
    }

    fn labelled(&self, place: &str, country: &str) -> EnrichedLocation {
        EnrichedLocation {
            name: format!("{} - {}", self.trip_title, place),
            lat: self.lat,
            lng: self.lng,
            country: country.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    pub country: String,
    pub formatted_address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLocation {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub country: String,
}

/// Cache key for a pair of raw coordinates, `"<lat>,<lng>"`. Values are not
/// rounded; a missing coordinate renders as `null`.
pub fn coordinate_key(lat: Option<f64>, lng: Option<f64>) -> String {
    fn part(value: Option<f64>) -> String {
        value.map_or_else(|| "null".into(), |v| v.to_string())
    }

    format!("{},{}", part(lat), part(lng))
}
