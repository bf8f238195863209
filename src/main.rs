//! Skycast CLI
//!
//! Current weather and a 3-day forecast from OpenWeatherMap.

mod session;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use skycast_core::{log_filter_from_verbosity, AppError, Config, ConfigError, Units};

use crate::session::{print_report, Lookup, Output, Query, Session};

#[derive(Parser)]
#[command(name = "skycast")]
#[command(author, version, about = "Current weather and a 3-day forecast", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: <config dir>/skycast/config.toml)
    #[arg(short, long, global = true, env = "SKYCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Unit system: metric or imperial (default from config)
    #[arg(short, long, global = true)]
    units: Option<Units>,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a city by name
    City {
        /// City name, e.g. "London" or "Paris,FR"
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Look up a latitude/longitude pair
    #[command(allow_negative_numbers = true)]
    Coords { latitude: f64, longitude: f64 },

    /// Look up the current device location
    Here,

    /// Interactive prompt with unit toggling
    Interactive,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = skycast_core::init(log_filter_from_verbosity(cli.verbose)) {
        eprintln!("{:#}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, _) = Config::load_validated(cli.config.as_deref())
        .map_err(|e| ConfigError::from_load_error(&e))?;

    let units = cli.units.unwrap_or(config.weather.units);
    let output = if cli.json { Output::Json } else { Output::Text };
    let lookup = Lookup::new(&config)?;

    let query = match cli.command {
        Commands::City { name } => Query::City(name.join(" ")),
        Commands::Coords {
            latitude,
            longitude,
        } => Query::Coords {
            latitude,
            longitude,
        },
        Commands::Here => Query::Here,
        Commands::Interactive => {
            return Session::new(lookup, units, output).run().await;
        }
    };

    let report = lookup.run(&query, units).await?;
    print_report(&report, output)
}
