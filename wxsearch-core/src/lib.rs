//! Core library for the `wxsearch` CLI.
//!
//! This crate defines:
//! - Weather-code and wind classification for display
//! - Geocoding and forecast clients for the Open-Meteo APIs
//! - The debounced search orchestrator and its state
//! - Configuration handling
//!
//! It is used by `wxsearch-cli`, but any front-end can drive a
//! [`SearchOrchestrator`] and render its [`SearchState`].

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod search;

pub use classify::{BackgroundTheme, IconCategory, WindStrength};
pub use config::Config;
pub use error::LookupError;
pub use model::{CurrentConditions, DailyForecastEntry, Forecast, Location, WeatherReport};
pub use provider::{ForecastSource, Geocoder, OpenMeteoForecast, OpenMeteoGeocoder};
pub use search::{LookupStatus, Phase, SearchOrchestrator, SearchState};
