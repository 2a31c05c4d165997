//! Reverse-geocoding enrichment of a user's locations.
//!
//! Records are processed in fixed windows of `concurrency` items: every item of
//! a window is resolved concurrently and the next window starts once the whole
//! window has finished, so at most `concurrency` lookups are in flight. Lookups
//! are cached per call by coordinate key; a lookup that is still in flight is
//! shared with every other item carrying the same key. Failed lookups are
//! logged and degrade to a placeholder for the affected items only.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures::future::{join_all, BoxFuture, FutureExt, Shared};

use crate::entities::{Coordinates, EnrichedLocation, GeocodeResult, LocationRecord};
use crate::external::Geocoder;

pub const DEFAULT_CONCURRENCY: usize = 5;

type Lookup<'a> = Shared<BoxFuture<'a, Option<GeocodeResult>>>;

/// Resolves every record to an [`EnrichedLocation`], preserving input order.
#[tracing::instrument(skip_all, fields(records = records.len(), concurrency = concurrency))]
pub async fn enrich(
    records: &[LocationRecord],
    concurrency: usize,
    geocoder: &dyn Geocoder,
) -> Vec<EnrichedLocation> {
    let cache = LookupCache::new(geocoder);
    let mut enriched = Vec::with_capacity(records.len());

    for window in records.chunks(concurrency.max(1)) {
        let resolved = join_all(window.iter().map(|record| cache.resolve(record))).await;
        enriched.extend(resolved);
    }

    enriched
}

struct LookupCache<'a> {
    geocoder: &'a dyn Geocoder,
    lookups: Mutex<HashMap<String, Lookup<'a>>>,
}

impl<'a> LookupCache<'a> {
    fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self {
            geocoder,
            lookups: Mutex::new(HashMap::new()),
        }
    }

    async fn resolve(&self, record: &LocationRecord) -> EnrichedLocation {
        let key = record.key();

        let (lookup, issued) = match self.lookup_for(&key, record) {
            Some(found) => found,
            None => return record.unknown_location(),
        };

        match lookup.await {
            Some(result) => record.resolved(&result),
            None => {
                if issued {
                    self.forget(&key);
                }
                record.unknown_address()
            }
        }
    }

    /// Cached (or in-flight) lookup for `key`, otherwise a newly issued one.
    /// `None` when nothing is cached and the record has no usable coordinates.
    fn lookup_for(&self, key: &str, record: &LocationRecord) -> Option<(Lookup<'a>, bool)> {
        let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(lookup) = lookups.get(key) {
            return Some((lookup.clone(), false));
        }

        let coordinates = record.coordinates()?;
        let lookup = reverse_geocode(self.geocoder, key.to_string(), coordinates).shared();
        lookups.insert(key.to_string(), lookup.clone());

        Some((lookup, true))
    }

    fn forget(&self, key: &str) {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

fn reverse_geocode<'a>(
    geocoder: &'a dyn Geocoder,
    key: String,
    coordinates: Coordinates,
) -> BoxFuture<'a, Option<GeocodeResult>> {
    async move {
        match geocoder.reverse_geocode(coordinates).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "reverse geocode failed");
                None
            }
        }
    }
    .boxed()
}
