pub mod location_iq;

use async_trait::async_trait;

use crate::entities::{Coordinates, GeocodeResult};
use crate::error::Error;

pub use location_iq::LocationIq;

/// Reverse and forward lookups against a geocoding provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<GeocodeResult, Error>;

    async fn forward_geocode(&self, address: &str) -> Result<Coordinates, Error>;
}
