use sqlx::{postgres::PgPoolOptions, Executor, Pool, Postgres};

use crate::error::Error;

pub struct PgPool(pub Pool<Postgres>);

impl PgPool {
    #[tracing::instrument(name = "PgPool::new", skip(db_uri))]
    pub async fn new(db_uri: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_uri)
            .await?;

        Ok(Self(pool))
    }
}

/// Creates the tables the engine relies on, leaving existing data in place.
#[tracing::instrument(skip_all)]
pub async fn init_schema(pool: &Pool<Postgres>) -> Result<(), Error> {
    pool.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email VARCHAR NOT NULL UNIQUE,
            name VARCHAR,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
            token UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            expires_at TIMESTAMPTZ NOT NULL
        )",
    )
    .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title VARCHAR NOT NULL,
            description TEXT NOT NULL,
            image_url TEXT,
            start_date TIMESTAMPTZ NOT NULL,
            end_date TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .await?;

    pool.execute(
        "CREATE TABLE IF NOT EXISTS locations (
            id UUID PRIMARY KEY,
            trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            location_title VARCHAR NOT NULL,
            lat DOUBLE PRECISION,
            lng DOUBLE PRECISION,
            \"order\" INT4 NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .await?;

    pool.execute("CREATE INDEX IF NOT EXISTS locations_trip_id_idx ON locations (trip_id)")
        .await?;

    Ok(())
}
