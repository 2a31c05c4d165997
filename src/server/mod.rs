mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::error::{server_error, Error};
use crate::server::handlers::{locations, sessions, trips};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/sessions", post(sessions::create).delete(sessions::delete))
        .route("/trips", get(trips::list).post(trips::create))
        .route("/trips/:id", get(trips::find))
        .route("/trips/:id/locations", post(locations::create))
        .route("/trips-locations", get(locations::list))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(Arc::new(api) as DynAPI);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}
