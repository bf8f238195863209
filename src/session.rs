//! Lookup orchestration shared by one-shot commands and the interactive prompt.

use skycast_core::{AppError, Config, LocationConfig, Units};
use skycast_weather::{
    get_current_location, render_report, IpLocator, WeatherProvider, WeatherReport,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// What to look up
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords { latitude: f64, longitude: f64 },
    Here,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Text,
    Json,
}

/// Provider plus location source, built once per process
pub struct Lookup {
    provider: WeatherProvider,
    locator: IpLocator,
    location: LocationConfig,
}

impl Lookup {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let provider = WeatherProvider::new(&config.weather)?;
        let locator = IpLocator::new(&config.location)?;

        Ok(Self {
            provider,
            locator,
            location: config.location.clone(),
        })
    }

    pub async fn run(&self, query: &Query, units: Units) -> Result<WeatherReport, AppError> {
        let report = match query {
            Query::City(name) => self.provider.fetch_by_city(name, units).await?,
            Query::Coords {
                latitude,
                longitude,
            } => {
                self.provider
                    .fetch_by_coords(*latitude, *longitude, units)
                    .await?
            }
            Query::Here => {
                let location = get_current_location(&self.location, &self.locator).await?;
                self.provider.fetch(&location, units).await?
            }
        };

        Ok(report)
    }
}

pub fn print_report(report: &WeatherReport, output: Output) -> Result<(), AppError> {
    match output {
        Output::Text => println!("{}", render_report(report)),
        Output::Json => {
            let json = serde_json::to_string_pretty(report).map_err(anyhow::Error::from)?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// One line of interactive input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Geo,
    ToggleUnits,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":geo" | ":here" => Self::Geo,
            ":units" | ":u" => Self::ToggleUnits,
            ":help" | ":h" | "?" => Self::Help,
            ":quit" | ":q" | ":exit" => Self::Quit,
            city => Self::Search(city.to_string()),
        }
    }
}

const HELP: &str = "Type a city name to search.
  :geo    weather at your current location
  :units  switch between metric and imperial
  :quit   exit";

/// Interactive prompt state. Units live here and are passed into every
/// lookup, so a toggle only affects lookups started after it.
pub struct Session {
    lookup: Lookup,
    units: Units,
    output: Output,
    last_query: Option<Query>,
}

impl Session {
    pub fn new(lookup: Lookup, units: Units, output: Output) -> Self {
        Self {
            lookup,
            units,
            output,
            last_query: None,
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// Run until `:quit` or end of input
    pub async fn run(&mut self) -> Result<(), AppError> {
        println!("{}\nUnits: {}", HELP, self.units());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            if !self.handle(Command::parse(&line)).await {
                break;
            }
        }

        Ok(())
    }

    /// Returns false when the session should end
    async fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return false,
            Command::Help => println!("{}", HELP),
            Command::ToggleUnits => {
                self.units = self.units.toggle();
                println!("Units: {}", self.units);
                if let Some(query) = self.last_query.clone() {
                    self.lookup_and_print(query).await;
                }
            }
            Command::Geo => self.lookup_and_print(Query::Here).await,
            Command::Search(city) => self.lookup_and_print(Query::City(city)).await,
        }
        true
    }

    async fn lookup_and_print(&mut self, query: Query) {
        tracing::debug!(?query, units = %self.units, "Running lookup");

        let result = self
            .lookup
            .run(&query, self.units)
            .await
            .and_then(|report| print_report(&report, self.output));

        match result {
            Ok(()) => self.last_query = Some(query),
            Err(e) => {
                tracing::warn!("Lookup failed: {}", e);
                eprintln!("{}", e.user_message());
            }
        }
    }
}
