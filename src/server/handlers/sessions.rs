use axum::extract::{Extension, Json};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::auth::session_token;
use crate::entities::Session;
use crate::error::{unauthenticated_error, Error};

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    email: String,
    #[serde(default)]
    name: Option<String>,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<CreateParams>,
) -> Result<impl IntoResponse, Error> {
    let session = api.create_session(params.email, params.name).await?;

    Ok(([(SET_COOKIE, session_cookie(&session))], Json(session)))
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    let token = session_token(&headers).ok_or_else(unauthenticated_error)?;
    api.delete_session(token).await?;

    Ok((
        StatusCode::NO_CONTENT,
        [(SET_COOKIE, "session_token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")],
    ))
}

fn session_cookie(session: &Session) -> String {
    let max_age = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);

    format!(
        "session_token={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.token, max_age
    )
}
