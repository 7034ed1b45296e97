use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::{self, BackgroundTheme, IconCategory};

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    /// Identity used when de-duplicating suggestions.
    pub fn key(&self) -> (&str, &str) {
        (self.name.as_str(), self.country.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(region) = self.region.as_deref().filter(|r| !r.is_empty() && *r != self.name) {
            write!(f, ", {region}")?;
        }
        if !self.country.is_empty() {
            write!(f, ", {}", self.country)?;
        }
        Ok(())
    }
}

/// Conditions at observation time. Missing upstream values stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: Option<f64>,
    pub apparent_temperature_c: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_kmh: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    /// Local time of the location (the forecast is requested with `timezone=auto`).
    pub observed_at: Option<NaiveDateTime>,
}

impl CurrentConditions {
    pub fn description(&self) -> &'static str {
        self.weather_code.map_or("Unknown", classify::describe)
    }

    pub fn icon(&self) -> IconCategory {
        self.weather_code.map_or(IconCategory::Default, IconCategory::from_code)
    }

    pub fn background(&self, local_hour: u32) -> BackgroundTheme {
        // -1 is outside every code range and lands on the default day theme
        BackgroundTheme::select(self.weather_code.unwrap_or(-1), local_hour)
    }
}

/// One day of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub weather_code: Option<i32>,
    pub max_temp_c: Option<f64>,
    pub min_temp_c: Option<f64>,
    pub precipitation_probability_pct: Option<f64>,
    pub max_wind_speed_kmh: Option<f64>,
}

impl DailyForecastEntry {
    pub fn description(&self) -> &'static str {
        self.weather_code.map_or("Unknown", classify::describe)
    }

    pub fn icon(&self) -> IconCategory {
        self.weather_code.map_or(IconCategory::Default, IconCategory::from_code)
    }
}

/// What the forecast endpoint returns for one coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub current: CurrentConditions,
    /// Starts the day after the request date.
    pub daily: Vec<DailyForecastEntry>,
}

/// Combined result published to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecastEntry>,
}

impl WeatherReport {
    pub fn new(location: Location, forecast: Forecast) -> Self {
        Self { location, current: forecast.current, daily: forecast.daily }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Location {
        Location {
            name: "Paris".into(),
            country: "France".into(),
            region: Some("Île-de-France".into()),
            latitude: 48.85,
            longitude: 2.35,
        }
    }

    #[test]
    fn location_display_includes_region() {
        assert_eq!(paris().to_string(), "Paris, Île-de-France, France");

        let no_region = Location { region: None, ..paris() };
        assert_eq!(no_region.to_string(), "Paris, France");
    }

    #[test]
    fn location_key_is_name_and_country() {
        let other_region = Location { region: Some("Elsewhere".into()), latitude: 0.0, ..paris() };
        assert_eq!(paris().key(), other_region.key());
    }

    #[test]
    fn missing_code_degrades_to_defaults() {
        let current = CurrentConditions::default();
        assert_eq!(current.description(), "Unknown");
        assert_eq!(current.icon(), IconCategory::Default);
        assert_eq!(current.background(12), BackgroundTheme::DayDefault);
        assert_eq!(current.background(2), BackgroundTheme::Night);
    }
}
