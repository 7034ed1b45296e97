use crate::{
    error::LookupError,
    model::{Forecast, Location},
};
use async_trait::async_trait;
use std::{collections::HashSet, fmt::Debug};
use tracing::warn;

pub mod forecast;
pub mod geocoding;

pub use forecast::OpenMeteoForecast;
pub use geocoding::OpenMeteoGeocoder;

/// Resolves free-text place names to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Raw lookup returning up to `count` candidates in relevance order.
    async fn search(&self, name: &str, count: usize) -> Result<Vec<Location>, LookupError>;

    /// Best single match for `city`.
    async fn resolve_one(&self, city: &str) -> Result<Location, LookupError> {
        self.search(city, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::NotFound(city.to_string()))
    }

    /// Up to `limit` distinct suggestions for a partial name.
    ///
    /// Never fails: lookup errors are logged and yield an empty list.
    async fn suggest(&self, partial: &str, limit: usize) -> Vec<Location> {
        match self.search(partial, limit.saturating_mul(2)).await {
            Ok(candidates) => dedup_locations(candidates, limit),
            Err(err) => {
                warn!(query = partial, error = %err, "suggestion lookup failed");
                Vec::new()
            }
        }
    }
}

/// Retrieves current conditions and the daily outlook for a coordinate pair.
#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, LookupError>;
}

/// Drops repeated (name, country) pairs, keeping first-seen order.
pub fn dedup_locations(candidates: Vec<Location>, limit: usize) -> Vec<Location> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(limit.min(candidates.len()));

    for location in candidates {
        if unique.len() == limit {
            break;
        }
        if seen.insert((location.name.clone(), location.country.clone())) {
            unique.push(location);
        }
    }

    unique
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
