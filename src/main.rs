use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use weathersense::app::AppContext;
use weathersense::simulated::{RandomSimulation, SimulatedPanel};
use weathersense::storage::PreferenceStore;
use weathersense::{
    Coordinates, OpenWeatherClient, Preferences, TextDisplay, WeatherSenseConfig, logging,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "weathersense",
    version,
    about = "Weather dashboard with cached multi-source fetching and personalised recommendations"
)]
struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Show the dashboard for a place, a coordinate pair, or the last location
    Weather {
        /// Place name or "lat,lon"
        #[arg(short, long, conflicts_with_all = ["lat", "lon"])]
        location: Option<String>,
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Show the dashboard for the configured home position
    Locate,
    /// Reload the last saved location
    Refresh,
    /// Switch between metric and imperial units
    ToggleUnits,
    /// Switch between light and dark theme
    ToggleTheme,
    /// Forget the saved theme, units and last location
    ResetPreferences,
    /// Print the simulated panels for a position without any network access
    Simulate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

async fn load_preferences(config: &WeatherSenseConfig) -> Result<Preferences> {
    let path = config.storage_path()?;
    debug!("Opening preference store at {}", path.display());
    let store = PreferenceStore::open(&path)
        .with_context(|| format!("Failed to open preference store at {}", path.display()))?;
    Ok(Preferences::load(store, false, Utc::now()).await?)
}

async fn build_app(config: &WeatherSenseConfig) -> Result<AppContext<TextDisplay>> {
    let client = OpenWeatherClient::new(&config.weather)?;
    let preferences = load_preferences(config).await?;
    Ok(AppContext::from_config(
        config,
        Arc::new(client),
        TextDisplay::full(),
        preferences,
    ))
}

/// Print the dashboard whether or not the handler succeeded
fn finish(app: &AppContext<TextDisplay>, outcome: weathersense::Result<()>) -> Result<()> {
    println!("{}", app.display().render());
    outcome.context("Dashboard update failed")
}

async fn run(cli: Cli) -> Result<()> {
    let config = WeatherSenseConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    info!("WeatherSense {} starting", weathersense::VERSION);

    match cli.command {
        Command::Weather { location, lat, lon } => {
            let mut app = build_app(&config).await?;
            let outcome = match (location, lat, lon) {
                (Some(query), _, _) => app.search(&query).await,
                (None, Some(lat), Some(lon)) => app.load_weather(Coordinates::new(lat, lon)).await,
                _ => app.initialize().await,
            };
            finish(&app, outcome)
        }
        Command::Locate => {
            let mut app = build_app(&config).await?;
            let outcome = app.use_current_location().await;
            finish(&app, outcome)
        }
        Command::Refresh => {
            let mut app = build_app(&config).await?;
            let outcome = app.refresh().await;
            finish(&app, outcome)
        }
        Command::ToggleUnits => {
            let mut preferences = load_preferences(&config).await?;
            let units = preferences.toggle_units().await?;
            println!("Units: {units} ({})", units.toggle_label());
            Ok(())
        }
        Command::ToggleTheme => {
            let mut preferences = load_preferences(&config).await?;
            let theme = preferences.toggle_theme(Utc::now()).await?;
            println!("Theme: {}", theme.as_str());
            Ok(())
        }
        Command::ResetPreferences => {
            let mut preferences = load_preferences(&config).await?;
            preferences.reset().await?;
            println!("Preferences reset");
            Ok(())
        }
        Command::Simulate { lat, lon, seed } => {
            let coordinates = Coordinates::new(lat, lon);
            anyhow::ensure!(coordinates.is_valid(), "Invalid coordinates: {coordinates}");
            let provider = match seed {
                Some(seed) => RandomSimulation::seeded(seed),
                None => RandomSimulation::from_entropy(),
            };
            for line in SimulatedPanel::build(&provider, coordinates, Utc::now()).lines() {
                println!("{line}");
            }
            Ok(())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
