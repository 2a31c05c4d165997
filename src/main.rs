use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use wayfarer::config::Config;
use wayfarer::db::PgPool;
use wayfarer::engine::Engine;
use wayfarer::error::Error;
use wayfarer::external::LocationIq;
use wayfarer::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    tracing::debug!(
        listen_addr = %config.listen_addr,
        enrich_concurrency = config.enrich_concurrency,
        location_iq = ?config.location_iq,
        "loaded configuration"
    );

    if config.location_iq.api_key.is_none() {
        tracing::warn!("LOCATIONIQ_KEY is not set, geocoding requests will fail");
    }

    let PgPool(pool) = PgPool::new(&config.database_url, config.max_connections).await?;
    let geocoder = Arc::new(LocationIq::new(&config.location_iq)?);

    let engine = Engine::new(pool, geocoder, config.enrich_concurrency).await?;

    serve(engine, config.listen_addr).await
}
