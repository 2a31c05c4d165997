use async_trait::async_trait;
use axum::extract::{Extension, FromRequest, RequestParts};
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::api::DynAPI;
use crate::auth::User;
use crate::error::{server_error, unauthenticated_error, Error};

pub const SESSION_COOKIE: &str = "session_token";

/// Session token carried by a request, from `Authorization: Bearer` or the
/// session cookie. Malformed tokens count as absent.
pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| Uuid::parse_str(token.trim()).ok());

    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, token)| Uuid::parse_str(token).ok())
}

#[async_trait]
impl<B> FromRequest<B> for User
where
    B: Send,
{
    type Rejection = Error;

    async fn from_request(req: &mut RequestParts<B>) -> Result<Self, Self::Rejection> {
        let Extension(api) = Extension::<DynAPI>::from_request(req)
            .await
            .map_err(server_error)?;

        let token = session_token(req.headers()).ok_or_else(unauthenticated_error)?;

        api.find_session_user(token).await
    }
}
