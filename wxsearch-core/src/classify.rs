//! Mapping of raw WMO weather codes and wind readings to display labels.
//!
//! Every function here is total: unknown inputs fall back to a default
//! category instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Human-readable label for a WMO weather code, `"Unknown"` for anything else.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Icon bucket for a weather code.
///
/// Buckets are range based, so codes without a description (66, 67, 56...)
/// still land in a bucket when they fall inside a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Clear,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    RainShowers,
    SnowShowers,
    Thunderstorm,
    Default,
}

impl IconCategory {
    pub fn from_code(code: i32) -> Self {
        match code {
            0..=1 => IconCategory::Clear,
            2..=3 => IconCategory::Cloudy,
            45 | 48 => IconCategory::Fog,
            51..=55 => IconCategory::Drizzle,
            61..=67 => IconCategory::Rain,
            71..=77 => IconCategory::Snow,
            80..=82 => IconCategory::RainShowers,
            85..=86 => IconCategory::SnowShowers,
            95 | 96 | 99 => IconCategory::Thunderstorm,
            _ => IconCategory::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IconCategory::Clear => "clear",
            IconCategory::Cloudy => "cloudy",
            IconCategory::Fog => "fog",
            IconCategory::Drizzle => "drizzle",
            IconCategory::Rain => "rain",
            IconCategory::Snow => "snow",
            IconCategory::RainShowers => "rain_showers",
            IconCategory::SnowShowers => "snow_showers",
            IconCategory::Thunderstorm => "thunderstorm",
            IconCategory::Default => "default",
        }
    }

    /// Terminal stand-in for the icon artwork.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconCategory::Clear => "☀️",
            IconCategory::Cloudy | IconCategory::Default => "☁️",
            IconCategory::Fog => "🌫️",
            IconCategory::Drizzle => "🌦️",
            IconCategory::Rain | IconCategory::RainShowers => "🌧️",
            IconCategory::Snow | IconCategory::SnowShowers => "❄️",
            IconCategory::Thunderstorm => "⛈️",
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background colour theme token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundTheme {
    Night,
    DayClear,
    DayPartlyCloudy,
    DayOvercast,
    DayFog,
    DayDrizzle,
    DayRain,
    DaySnow,
    DayRainShowers,
    DaySnowShowers,
    DayThunderstorm,
    DayDefault,
}

impl BackgroundTheme {
    /// Picks a theme for `code` observed at `local_hour` (0-23).
    ///
    /// Before 06:00 and after 20:00 the night theme wins regardless of code.
    pub fn select(code: i32, local_hour: u32) -> Self {
        if !(6..=20).contains(&local_hour) {
            return BackgroundTheme::Night;
        }

        match code {
            2 => BackgroundTheme::DayPartlyCloudy,
            3 => BackgroundTheme::DayOvercast,
            _ => match IconCategory::from_code(code) {
                IconCategory::Clear => BackgroundTheme::DayClear,
                // 2 and 3 are split above
                IconCategory::Cloudy => BackgroundTheme::DayOvercast,
                IconCategory::Fog => BackgroundTheme::DayFog,
                IconCategory::Drizzle => BackgroundTheme::DayDrizzle,
                IconCategory::Rain => BackgroundTheme::DayRain,
                IconCategory::Snow => BackgroundTheme::DaySnow,
                IconCategory::RainShowers => BackgroundTheme::DayRainShowers,
                IconCategory::SnowShowers => BackgroundTheme::DaySnowShowers,
                IconCategory::Thunderstorm => BackgroundTheme::DayThunderstorm,
                IconCategory::Default => BackgroundTheme::DayDefault,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundTheme::Night => "night",
            BackgroundTheme::DayClear => "day_clear",
            BackgroundTheme::DayPartlyCloudy => "day_partly_cloudy",
            BackgroundTheme::DayOvercast => "day_overcast",
            BackgroundTheme::DayFog => "day_fog",
            BackgroundTheme::DayDrizzle => "day_drizzle",
            BackgroundTheme::DayRain => "day_rain",
            BackgroundTheme::DaySnow => "day_snow",
            BackgroundTheme::DayRainShowers => "day_rain_showers",
            BackgroundTheme::DaySnowShowers => "day_snow_showers",
            BackgroundTheme::DayThunderstorm => "day_thunderstorm",
            BackgroundTheme::DayDefault => "day_default",
        }
    }
}

impl fmt::Display for BackgroundTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass abbreviation for a wind direction in degrees.
pub fn compass_label(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = round_for_display(normalized / 22.5).rem_euclid(16);
    COMPASS_POINTS[index as usize]
}

/// Qualitative wind strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindStrength {
    Calm,
    LightBreeze,
    Moderate,
    Strong,
    VeryStrong,
}

impl WindStrength {
    pub fn from_speed(speed_kmh: f64) -> Self {
        if speed_kmh < 5.0 {
            WindStrength::Calm
        } else if speed_kmh < 15.0 {
            WindStrength::LightBreeze
        } else if speed_kmh < 30.0 {
            WindStrength::Moderate
        } else if speed_kmh < 50.0 {
            WindStrength::Strong
        } else {
            WindStrength::VeryStrong
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindStrength::Calm => "Calm",
            WindStrength::LightBreeze => "Light breeze",
            WindStrength::Moderate => "Moderate",
            WindStrength::Strong => "Strong",
            WindStrength::VeryStrong => "Very strong",
        }
    }
}

impl fmt::Display for WindStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-up rounding used for every number shown to the user (-2.5 -> -2).
pub fn round_for_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
