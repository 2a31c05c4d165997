use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt::{self, Debug};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        database_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl From<oso::OsoError> for Error {
    fn from(err: oso::OsoError) -> Self {
        authorizor_error(err)
    }
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self.code {
            1..=99 => StatusCode::INTERNAL_SERVER_ERROR,
            UNAUTHENTICATED => StatusCode::UNAUTHORIZED,
            UNAUTHORIZED => StatusCode::FORBIDDEN,
            NOT_FOUND => StatusCode::NOT_FOUND,
            200..=299 => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self.code {
            1..=99 => "Internal Error".to_string(),
            _ => self.message,
        };

        (status, body).into_response()
    }
}

const UNAUTHENTICATED: i32 = 102;
const UNAUTHORIZED: i32 = 103;
const NOT_FOUND: i32 = 104;

pub fn validation_error(message: &str) -> Error {
    Error {
        code: 101,
        message: message.into(),
    }
}

pub fn unauthenticated_error() -> Error {
    Error {
        code: UNAUTHENTICATED,
        message: "Not authenticated".into(),
    }
}

pub fn unauthorized_error() -> Error {
    Error {
        code: UNAUTHORIZED,
        message: "Not authorized".into(),
    }
}

pub fn trip_not_found_error() -> Error {
    Error {
        code: NOT_FOUND,
        message: "Trip not found".into(),
    }
}

pub fn config_error(name: &str) -> Error {
    Error {
        code: 1,
        message: format!("invalid configuration value for {}", name),
    }
}

pub fn database_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "database error");

    Error {
        code: 2,
        message: "database error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::error!(error = %err, "reqwest error");

    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

pub fn authorizor_error(err: oso::OsoError) -> Error {
    tracing::error!(error = %err, "authorizor error");

    Error {
        code: 6,
        message: "authorizor error".into(),
    }
}

pub fn server_error<T: Debug>(err: T) -> Error {
    tracing::error!(error = ?err, "server error");

    Error {
        code: 7,
        message: "server error".into(),
    }
}

pub fn geocoding_unavailable_error() -> Error {
    Error {
        code: 200,
        message: "Geocoding is not available (missing LOCATIONIQ_KEY).".into(),
    }
}

pub fn geocoding_upstream_error() -> Error {
    Error {
        code: 201,
        message: "Failed to contact geocoding service.".into(),
    }
}

pub fn geocoding_response_error() -> Error {
    Error {
        code: 202,
        message: "Invalid response from geocoding service.".into(),
    }
}

pub fn geocoding_no_results_error() -> Error {
    Error {
        code: 203,
        message: "No results found for the given address.".into(),
    }
}

pub fn geocoding_coordinates_error() -> Error {
    Error {
        code: 204,
        message: "Geocoding returned invalid coordinates.".into(),
    }
}

#[test]
fn status_mapping_test() {
    assert_eq!(database_error("boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(unauthenticated_error().status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unauthorized_error().status(), StatusCode::FORBIDDEN);
    assert_eq!(trip_not_found_error().status(), StatusCode::NOT_FOUND);
    assert_eq!(validation_error("Missing address").status(), StatusCode::BAD_REQUEST);
    assert_eq!(geocoding_no_results_error().status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn internal_error_body_is_masked_test() {
    let response = unexpected_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Internal Error");

    let response = unauthenticated_error().into_response();
    assert_eq!(body_text(response).await, "Not authenticated");
}

#[cfg(test)]
pub(crate) async fn body_text(response: Response) -> String {
    use axum::body::HttpBody;

    let mut body = response.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        bytes.extend_from_slice(&chunk.unwrap());
    }

    String::from_utf8(bytes).unwrap()
}
