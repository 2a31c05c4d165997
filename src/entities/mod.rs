mod location;
mod session;
mod trip;

pub use location::{
    coordinate_key, Coordinates, EnrichedLocation, GeocodeResult, Location, LocationRecord,
};
pub use session::Session;
pub use trip::{NewTrip, Trip, TripDetails};
