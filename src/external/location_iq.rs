use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::LocationIqConfig,
    entities::{Coordinates, GeocodeResult},
    error::{
        geocoding_coordinates_error, geocoding_no_results_error, geocoding_response_error,
        geocoding_unavailable_error, geocoding_upstream_error, Error,
    },
    external::Geocoder,
};

const UNKNOWN_COUNTRY: &str = "Unknown";
const UNKNOWN_ADDRESS: &str = "Unknown Address";

/// LocationIQ (OpenStreetMap) client.
pub struct LocationIq {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    address: Option<ReverseAddress>,
}

#[derive(Debug, Deserialize)]
struct ReverseAddress {
    country: Option<String>,
}

impl LocationIq {
    pub fn new(config: &LocationIqConfig) -> Result<Self, Error> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').into(),
            api_key: config.api_key.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, Error> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => {
                tracing::debug!(key = %mask(key), "using LocationIQ key");
                Ok(key)
            }
            _ => {
                tracing::error!("missing LOCATIONIQ_KEY");
                Err(geocoding_unavailable_error())
            }
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, Error> {
        let key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(url)
            .query(&[("key", key)])
            .query(query)
            .query(&[("format", "json")])
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, path, "LocationIQ request failed");
                geocoding_upstream_error()
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, path, "LocationIQ returned an error");
            return Err(geocoding_upstream_error());
        }

        Ok(res)
    }
}

#[async_trait]
impl Geocoder for LocationIq {
    #[tracing::instrument(skip(self))]
    async fn reverse_geocode(&self, coordinates: Coordinates) -> Result<GeocodeResult, Error> {
        let query = [
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lng.to_string()),
        ];

        let data: ReverseResponse = self
            .get("/v1/reverse.php", &query)
            .await?
            .json()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "failed to parse LocationIQ reverse response");
                geocoding_response_error()
            })?;

        Ok(GeocodeResult {
            country: data
                .address
                .and_then(|address| address.country)
                .unwrap_or_else(|| UNKNOWN_COUNTRY.into()),
            formatted_address: data.display_name.unwrap_or_else(|| UNKNOWN_ADDRESS.into()),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn forward_geocode(&self, address: &str) -> Result<Coordinates, Error> {
        let query = [("q", address.to_string()), ("limit", "1".to_string())];

        let body = self.get("/v1/search", &query).await?.bytes().await.map_err(|err| {
            tracing::error!(error = %err, "failed to read LocationIQ search response");
            geocoding_upstream_error()
        })?;

        let data: Value = serde_json::from_slice(&body).map_err(|err| {
            tracing::error!(error = %err, "failed to parse LocationIQ search response");
            geocoding_response_error()
        })?;

        let item = match data.as_array().and_then(|items| items.first()) {
            Some(item) => item,
            None => {
                tracing::error!(address, response = %data, "LocationIQ returned no results");
                return Err(geocoding_no_results_error());
            }
        };

        match (parse_coordinate(&item["lat"]), parse_coordinate(&item["lon"])) {
            (Some(lat), Some(lng)) => Ok(Coordinates { lat, lng }),
            _ => {
                tracing::error!(item = %item, "LocationIQ returned invalid coordinates");
                Err(geocoding_coordinates_error())
            }
        }
    }
}

/// LocationIQ encodes coordinates as decimal strings; plain numbers are
/// accepted too.
fn parse_coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    };

    parsed.filter(|v| v.is_finite())
}

fn mask(key: &str) -> String {
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::matchers::{all_of, contains, request, url_decoded};
    use httptest::responders::{json_encoded, status_code};
    use httptest::{Expectation, Server};
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &Server, api_key: Option<&str>) -> LocationIq {
        LocationIq::new(&LocationIqConfig {
            base_url: server.url_str(""),
            api_key: api_key.map(String::from),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    const PARIS: Coordinates = Coordinates {
        lat: 48.8566,
        lng: 2.3522,
    };

    #[tokio::test]
    async fn reverse_geocode_reads_country_and_display_name() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/v1/reverse.php"),
                request::query(url_decoded(contains(("key", "test-key")))),
                request::query(url_decoded(contains(("format", "json")))),
            ])
            .respond_with(json_encoded(json!({
                "display_name": "Paris, Île-de-France, France",
                "address": { "country": "France" },
            }))),
        );

        let result = client(&server, Some("test-key"))
            .reverse_geocode(PARIS)
            .await
            .unwrap();

        assert_eq!(result.country, "France");
        assert_eq!(result.formatted_address, "Paris, Île-de-France, France");
    }

    #[tokio::test]
    async fn reverse_geocode_defaults_missing_fields() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/reverse.php"))
                .respond_with(json_encoded(json!({}))),
        );

        let result = client(&server, Some("test-key"))
            .reverse_geocode(PARIS)
            .await
            .unwrap();

        assert_eq!(result.country, "Unknown");
        assert_eq!(result.formatted_address, "Unknown Address");
    }

    #[tokio::test]
    async fn reverse_geocode_fails_on_error_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/reverse.php"))
                .respond_with(status_code(429)),
        );

        let err = client(&server, Some("test-key"))
            .reverse_geocode(PARIS)
            .await
            .unwrap_err();

        assert_eq!(err, geocoding_upstream_error());
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let server = Server::run();

        let err = client(&server, None).reverse_geocode(PARIS).await.unwrap_err();
        assert_eq!(err, geocoding_unavailable_error());

        let err = client(&server, None)
            .forward_geocode("Paris")
            .await
            .unwrap_err();
        assert_eq!(err, geocoding_unavailable_error());
    }

    #[tokio::test]
    async fn forward_geocode_parses_first_result() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/v1/search"),
                request::query(url_decoded(contains(("q", "Eiffel Tower, Paris")))),
                request::query(url_decoded(contains(("limit", "1")))),
            ])
            .respond_with(json_encoded(json!([
                { "lat": "48.8582599", "lon": "2.2945006", "display_name": "Eiffel Tower" },
            ]))),
        );

        let coordinates = client(&server, Some("test-key"))
            .forward_geocode("Eiffel Tower, Paris")
            .await
            .unwrap();

        assert_eq!(
            coordinates,
            Coordinates {
                lat: 48.8582599,
                lng: 2.2945006
            }
        );
    }

    #[tokio::test]
    async fn forward_geocode_rejects_empty_results() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/search"))
                .respond_with(json_encoded(json!([]))),
        );

        let err = client(&server, Some("test-key"))
            .forward_geocode("nowhere")
            .await
            .unwrap_err();

        assert_eq!(err, geocoding_no_results_error());
    }

    #[tokio::test]
    async fn forward_geocode_rejects_unparsable_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/search"))
                .respond_with(status_code(200).body("<html>oops</html>")),
        );

        let err = client(&server, Some("test-key"))
            .forward_geocode("Paris")
            .await
            .unwrap_err();

        assert_eq!(err, geocoding_response_error());
    }

    #[tokio::test]
    async fn forward_geocode_rejects_invalid_coordinates() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v1/search"))
                .respond_with(json_encoded(json!([{ "lat": "north", "lon": "2.29" }]))),
        );

        let err = client(&server, Some("test-key"))
            .forward_geocode("Paris")
            .await
            .unwrap_err();

        assert_eq!(err, geocoding_coordinates_error());
    }

    #[test]
    fn mask_keeps_last_four_characters() {
        assert_eq!(mask("pk.abcdef123456"), "****3456");
        assert_eq!(mask("ab"), "****ab");
    }
}
