use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    config::Config,
    error::LookupError,
    model::{CurrentConditions, DailyForecastEntry, Forecast},
    provider::truncate_body,
};

use super::ForecastSource;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
                              weather_code,wind_speed_10m,wind_direction_10m";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
                            precipitation_probability_max,wind_speed_10m_max";

/// Days requested upstream. The first one is today and gets dropped.
pub const REQUESTED_DAYS: usize = 8;

/// Open-Meteo forecast API client.
#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    base_url: String,
    http: Client,
}

impl OpenMeteoForecast {
    pub fn new(config: &Config) -> Result<Self, LookupError> {
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self { base_url: config.forecast_url.trim_end_matches('/').to_string(), http })
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    time: Option<String>,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current: OmCurrent,
    daily: OmDaily,
}

impl From<OmCurrent> for CurrentConditions {
    fn from(c: OmCurrent) -> Self {
        let observed_at = c
            .time
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok());

        CurrentConditions {
            temperature_c: c.temperature_2m,
            apparent_temperature_c: c.apparent_temperature,
            relative_humidity_pct: c.relative_humidity_2m,
            weather_code: c.weather_code,
            wind_speed_kmh: c.wind_speed_10m,
            wind_direction_deg: c.wind_direction_10m,
            observed_at,
        }
    }
}

fn at<T: Copy>(values: &[Option<T>], index: usize) -> Option<T> {
    values.get(index).copied().flatten()
}

/// Builds the outlook from upstream indices 1 through 7.
fn daily_entries(daily: &OmDaily) -> Result<Vec<DailyForecastEntry>, LookupError> {
    daily
        .time
        .iter()
        .enumerate()
        .skip(1)
        .take(REQUESTED_DAYS - 1)
        .map(|(i, day)| -> Result<DailyForecastEntry, LookupError> {
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                LookupError::Network(format!("invalid forecast date '{day}': {e}"))
            })?;

            Ok(DailyForecastEntry {
                date,
                weather_code: at(&daily.weather_code, i),
                max_temp_c: at(&daily.temperature_2m_max, i),
                min_temp_c: at(&daily.temperature_2m_min, i),
                precipitation_probability_pct: at(&daily.precipitation_probability_max, i),
                max_wind_speed_kmh: at(&daily.wind_speed_10m_max, i),
            })
        })
        .collect()
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    #[instrument(skip(self))]
    async fn fetch(&self, latitude: f64, longitude: f64) -> Result<Forecast, LookupError> {
        let url = format!("{}/forecast", self.base_url);
        let latitude = latitude.to_string();
        let longitude = longitude.to_string();
        let days = REQUESTED_DAYS.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current", CURRENT_FIELDS),
                ("daily", DAILY_FIELDS),
                ("timezone", "auto"),
                ("forecast_days", days.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(format!("forecast request failed: {e}")))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| LookupError::Network(format!("failed to read forecast body: {e}")))?;

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "forecast request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmForecastResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::Network(format!("failed to parse forecast JSON: {e}")))?;

        let daily = daily_entries(&parsed.daily)?;
        debug!(days = daily.len(), "forecast fetched");

        Ok(Forecast { current: parsed.current.into(), daily })
    }
}
