//! Weather lookups for Skycast
//!
//! Fetches current conditions and a 3-day forecast from OpenWeatherMap,
//! resolves the device location and renders the result for a terminal.

pub mod forecast;
pub mod location;
pub mod present;
pub mod provider;
pub mod types;

pub use forecast::{select_forecast_days, select_forecast_days_now};
pub use location::{get_current_location, IpLocator};
pub use present::{render_report, ReportView};
pub use provider::WeatherProvider;
pub use skycast_core::Units;
pub use types::*;
