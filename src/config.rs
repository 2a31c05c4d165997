use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ENRICH_CONCURRENCY: usize = 5;
const DEFAULT_LOCATIONIQ_BASE_URL: &str = "https://us1.locationiq.com";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
    pub enrich_concurrency: usize,
    pub location_iq: LocationIqConfig,
}

#[derive(Clone)]
pub struct LocationIqConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for LocationIqConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationIqConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment. A `.env` file
    /// should already have been loaded by the caller.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or_else(|| config_error("DATABASE_URL"))?;

        let enrich_concurrency = parse_or(&lookup, "ENRICH_CONCURRENCY", DEFAULT_ENRICH_CONCURRENCY)?;
        if enrich_concurrency == 0 {
            return Err(config_error("ENRICH_CONCURRENCY"));
        }

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            listen_addr: parse_or(
                &lookup,
                "LISTEN_ADDR",
                DEFAULT_LISTEN_ADDR.parse::<SocketAddr>().map_err(|_| config_error("LISTEN_ADDR"))?,
            )?,
            enrich_concurrency,
            location_iq: LocationIqConfig {
                base_url: lookup("LOCATIONIQ_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LOCATIONIQ_BASE_URL.into()),
                api_key: lookup("LOCATIONIQ_KEY").filter(|key| !key.trim().is_empty()),
                timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "GEOCODER_TIMEOUT_SECS",
                    DEFAULT_GEOCODER_TIMEOUT_SECS,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| config_error(name)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("DATABASE_URL", "postgresql://localhost/wayfarer")]).unwrap();

        assert_eq!(config.max_connections, 5);
        assert_eq!(config.enrich_concurrency, 5);
        assert_eq!(config.listen_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.location_iq.base_url, "https://us1.locationiq.com");
        assert_eq!(config.location_iq.api_key, None);
        assert_eq!(config.location_iq.timeout, Duration::from_secs(10));
    }

    #[test]
    fn database_url_is_required() {
        assert!(config(&[]).is_err());
    }

    #[test]
    fn rejects_malformed_values() {
        let url = ("DATABASE_URL", "postgresql://localhost/wayfarer");

        assert!(config(&[url, ("ENRICH_CONCURRENCY", "0")]).is_err());
        assert!(config(&[url, ("ENRICH_CONCURRENCY", "many")]).is_err());
        assert!(config(&[url, ("LISTEN_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = config(&[
            ("DATABASE_URL", "postgresql://localhost/wayfarer"),
            ("LOCATIONIQ_KEY", "  "),
        ])
        .unwrap();

        assert_eq!(config.location_iq.api_key, None);
    }

    #[test]
    fn debug_masks_key() {
        let config = config(&[
            ("DATABASE_URL", "postgresql://localhost/wayfarer"),
            ("LOCATIONIQ_KEY", "pk.secret"),
        ])
        .unwrap();

        assert!(!format!("{:?}", config).contains("pk.secret"));
    }
}
