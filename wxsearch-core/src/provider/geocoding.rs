use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{config::Config, error::LookupError, model::Location, provider::truncate_body};

use super::Geocoder;

/// Open-Meteo geocoding API client.
#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    base_url: String,
    language: String,
    http: Client,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            base_url: config.geocoding_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            http,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: String,
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    // absent when nothing matched
    #[serde(default)]
    results: Vec<GeoResult>,
}

impl From<GeoResult> for Location {
    fn from(r: GeoResult) -> Self {
        Location {
            name: r.name,
            country: r.country,
            region: r.admin1,
            latitude: r.latitude,
            longitude: r.longitude,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, name: &str, count: usize) -> Result<Vec<Location>, LookupError> {
        let url = format!("{}/search", self.base_url);
        let count = count.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("count", count.as_str()),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(format!("geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LookupError::Network(format!("failed to read geocoding body: {e}")))?;

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: GeoResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::Network(format!("failed to parse geocoding JSON: {e}")))?;

        debug!(matches = parsed.results.len(), "geocoding lookup finished");

        Ok(parsed.results.into_iter().map(Location::from).collect())
    }
}
