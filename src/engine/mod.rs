mod helpers;
mod location_api;
mod session_api;
mod trip_api;


use std::sync::Arc;

use oso::Oso;
use sqlx::{Pool, Postgres};

use crate::{
    api::API,
    auth::authorizor,
    db,
    error::{unauthorized_error, Error},
    external::Geocoder,
};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    authorizor: Oso,
    geocoder: Arc<dyn Geocoder>,
    enrich_concurrency: usize,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(
        pool: Pool<Database>,
        geocoder: Arc<dyn Geocoder>,
        enrich_concurrency: usize,
    ) -> Result<Self, Error> {
        db::init_schema(&pool).await?;

        Ok(Self {
            pool,
            authorizor: authorizor::new()?,
            geocoder,
            enrich_concurrency,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
