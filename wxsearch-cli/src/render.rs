use chrono::{Local, Timelike};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use std::fmt;
use wxsearch_core::{
    DailyForecastEntry, Location, WeatherReport, WindStrength,
    classify::{compass_label, round_for_display},
};

fn rounded(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{}{unit}", round_for_display(v)))
}

fn wind(speed: Option<f64>) -> String {
    speed.map_or_else(
        || "--".to_string(),
        |v| format!("{} km/h ({})", round_for_display(v), WindStrength::from_speed(v)),
    )
}

/// Local hour at the location, falling back to this machine's clock.
pub fn local_hour(report: &WeatherReport) -> u32 {
    report.current.observed_at.map_or_else(|| Local::now().hour(), |t| t.hour())
}

/// Headline and current details of a report, themed for `hour`.
pub struct ReportView<'a> {
    pub report: &'a WeatherReport,
    pub hour: u32,
}

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = &self.report.current;
        let icon = current.icon();

        writeln!(f, "{}", self.report.location)?;
        writeln!(
            f,
            "{} {}  {}",
            icon.glyph(),
            rounded(current.temperature_c, "°C"),
            current.description()
        )?;
        writeln!(f, "Feels like {}", rounded(current.apparent_temperature_c, "°C"))?;
        writeln!(f, "theme: {}  icon: {icon}", current.background(self.hour))?;
        writeln!(f)?;

        writeln!(f, "Humidity:       {}", rounded(current.relative_humidity_pct, "%"))?;
        writeln!(f, "Wind speed:     {}", wind(current.wind_speed_kmh))?;
        match current.wind_direction_deg {
            Some(deg) => {
                writeln!(f, "Wind direction: {}° {}", round_for_display(deg), compass_label(deg))?
            }
            None => writeln!(f, "Wind direction: --")?,
        }
        if let Some(observed) = current.observed_at {
            writeln!(f, "Last updated:   {}", observed.format("%Y-%m-%d %H:%M"))?;
        }

        Ok(())
    }
}

pub fn forecast_table(days: &[DailyForecastEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(vec![
        "#", "Day", "", "Conditions", "High", "Low", "Rain", "Wind",
    ]);

    for (i, day) in days.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            day.date.format("%a %d %b").to_string(),
            day.icon().glyph().to_string(),
            day.description().to_string(),
            rounded(day.max_temp_c, "°"),
            rounded(day.min_temp_c, "°"),
            rounded(day.precipitation_probability_pct, "%"),
            rounded(day.max_wind_speed_kmh, " km/h"),
        ]);
    }

    table
}

/// Full detail of one forecast day.
pub struct DayDetail<'a>(pub &'a DailyForecastEntry);

impl fmt::Display for DayDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = self.0;

        writeln!(f, "{}", day.date.format("%A, %d %B %Y"))?;
        writeln!(f, "{} {} ({})", day.icon().glyph(), day.description(), day.icon())?;
        writeln!(f, "High:          {}", rounded(day.max_temp_c, "°C"))?;
        writeln!(f, "Low:           {}", rounded(day.min_temp_c, "°C"))?;
        writeln!(f, "Precipitation: {}", rounded(day.precipitation_probability_pct, "%"))?;
        writeln!(f, "Max wind:      {}", wind(day.max_wind_speed_kmh))
    }
}

pub struct SuggestionList<'a>(pub &'a [Location]);

impl fmt::Display for SuggestionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, location) in self.0.iter().enumerate() {
            writeln!(f, "{}. {location}", i + 1)?;
        }
        Ok(())
    }
}
