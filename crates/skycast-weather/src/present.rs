//! Terminal rendering of a [`WeatherReport`].

use std::fmt;

use serde::Serialize;
use skycast_core::Units;

use crate::types::{CurrentConditions, ForecastSample, WeatherReport};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Day label format, e.g. "Sat, Oct 17"
const DAY_LABEL_FORMAT: &str = "%a, %b %-d";

/// URL of the 2x icon for an OpenWeatherMap icon code
pub fn icon_url(code: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, code)
}

/// Round half up (2.5 -> 3, -2.5 -> -2)
pub fn round_half_up(value: f64) -> i64 {
    // `(value + 0.5).floor()` misrounds just below .5 (0.49999999999999994 + 0.5 == 1.0)
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

pub fn format_temperature(value: f64, units: Units) -> String {
    format!("{}{}", round_half_up(value), units.temperature_symbol())
}

pub fn format_wind(speed: f64, units: Units) -> String {
    format!("{} {}", round_half_up(speed), units.wind_unit())
}

/// "City, CC", or just the city when the country is missing
pub fn city_label(current: &CurrentConditions) -> String {
    match current.country() {
        Some(country) => format!("{}, {}", current.name, country),
        None => current.name.clone(),
    }
}

fn write_icon(f: &mut fmt::Formatter<'_>, url: Option<&str>, label: Option<&str>) -> fmt::Result {
    match (url, label.filter(|l| !l.is_empty())) {
        (Some(url), Some(label)) => writeln!(f, "  icon: {} ({})", url, label),
        (Some(url), None) => writeln!(f, "  icon: {}", url),
        (None, _) => Ok(()),
    }
}

/// Current conditions block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub city: String,
    pub description: String,
    pub icon_url: Option<String>,
    /// Condition group shown with the icon, e.g. "Clouds"
    pub icon_label: Option<String>,
    pub temperature: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
}

impl CurrentView {
    pub fn new(current: &CurrentConditions, units: Units) -> Self {
        let condition = current.condition();
        Self {
            city: city_label(current),
            description: condition
                .map(|c| c.description.clone())
                .unwrap_or_else(|| "—".to_string()),
            icon_url: condition.map(|c| icon_url(&c.icon)),
            icon_label: condition.map(|c| c.main.clone()),
            temperature: format_temperature(current.main.temp, units),
            feels_like: format_temperature(current.main.feels_like, units),
            humidity: format!("{}%", current.main.humidity),
            wind: format_wind(current.wind.speed, units),
        }
    }
}

impl fmt::Display for CurrentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.city)?;
        writeln!(f, "  {}  {}", self.temperature, self.description)?;
        write_icon(f, self.icon_url.as_deref(), self.icon_label.as_deref())?;
        write!(
            f,
            "  Feels like {} | Humidity {} | Wind {}",
            self.feels_like, self.humidity, self.wind
        )
    }
}

/// One forecast day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTile {
    pub day: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub icon_label: Option<String>,
    pub high: String,
    pub low: String,
}

impl ForecastTile {
    pub fn new(sample: &ForecastSample, units: Units) -> Self {
        let condition = sample.condition();
        Self {
            day: sample
                .timestamp()
                .map(|t| t.format(DAY_LABEL_FORMAT).to_string())
                .unwrap_or_default(),
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            icon_url: condition.map(|c| icon_url(&c.icon)),
            icon_label: condition.map(|c| c.main.clone()),
            high: format_temperature(sample.main.temp_max, units),
            low: format_temperature(sample.main.temp_min, units),
        }
    }
}

impl fmt::Display for ForecastTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.day)?;
        writeln!(f, "  {}", self.description)?;
        write_icon(f, self.icon_url.as_deref(), self.icon_label.as_deref())?;
        write!(f, "  High: {} • Low: {}", self.high, self.low)
    }
}

/// Everything shown for one lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub current: CurrentView,
    pub forecast: Vec<ForecastTile>,
}

impl ReportView {
    pub fn new(report: &WeatherReport) -> Self {
        Self {
            current: CurrentView::new(&report.current, report.units),
            forecast: report
                .forecast
                .iter()
                .map(|s| ForecastTile::new(s, report.units))
                .collect(),
        }
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.current)?;
        for tile in &self.forecast {
            write!(f, "\n\n{}", tile)?;
        }
        Ok(())
    }
}

/// Render a report as terminal text
pub fn render_report(report: &WeatherReport) -> String {
    ReportView::new(report).to_string()
}
