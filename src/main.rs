//! Breeze command-line interface

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use breeze::dashboard::{email_summary, loading_message, share_text};
use breeze::models::TemperatureUnit;
use breeze::resolution::{Unsupported, cities::find_city};
use breeze::{
    Action, BreezeConfig, Dashboard, DeepLink, PreferenceStore, Report, ReqwestTransport,
    Transport, telemetry, web,
};

#[derive(Parser)]
#[command(name = "breeze")]
#[command(version, about = "Air quality, pollen and climate for any location")]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for breeze itself
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the dashboard for a location
    Report {
        /// Place name or "lat,lon"
        query: Option<String>,
        /// Latitude, used together with --lon
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude, used together with --lat
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Display name for --lat/--lon
        #[arg(long)]
        name: Option<String>,
        /// One of the ticker cities
        #[arg(long)]
        city: Option<String>,
        /// Deep-link query string, e.g. "city=Paris&lat=48.8566&lon=2.3522"
        #[arg(long)]
        link: Option<String>,
        /// Also print share text and an email summary
        #[arg(long)]
        share: bool,
        /// Base URL for the printed deep link
        #[arg(long, default_value = "https://breeze.earth/")]
        base_url: String,
    },
    /// List location suggestions for a query
    Search { query: String },
    /// Current AQI for the curated world cities
    Ticker,
    /// Run the web server with the pollen relay
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show or change preferences
    Prefs {
        #[arg(long, value_enum)]
        dark_mode: Option<Switch>,
        #[arg(long, value_enum)]
        unit: Option<UnitArg>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    C,
    F,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::C => TemperatureUnit::Celsius,
            UnitArg::F => TemperatureUnit::Fahrenheit,
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<BreezeConfig> {
    BreezeConfig::load_from_path(path).context("Failed to load configuration")
}

fn open_preferences(config: &BreezeConfig) -> Option<PreferenceStore> {
    let path = BreezeConfig::expand_path(&config.preferences.location);
    match PreferenceStore::open(&path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("Preferences unavailable, using defaults: {:#}", e);
            None
        }
    }
}

async fn build_dashboard(config: &BreezeConfig, transport: Arc<dyn Transport>) -> Dashboard {
    let dashboard = Dashboard::new(config, transport, Arc::new(Unsupported));
    match open_preferences(config) {
        Some(store) => dashboard.with_preferences(store).await,
        None => dashboard,
    }
}

fn report_action(
    query: Option<String>,
    coordinates: Option<(f64, f64)>,
    name: Option<String>,
    city: Option<String>,
    link: Option<String>,
) -> Result<Action> {
    if let Some(link) = link {
        let link = DeepLink::from_query(&link)
            .ok_or_else(|| anyhow!("A deep link needs city, lat and lon"))?;
        return Ok(Action::OpenLink(link));
    }
    if let Some((lat, lon)) = coordinates {
        let city = name.unwrap_or_else(|| format!("{lat:.4}, {lon:.4}"));
        return Ok(Action::OpenLink(DeepLink { city, lat, lon }));
    }
    if let Some(city) = city {
        let city = find_city(&city).ok_or_else(|| anyhow!("Unknown ticker city: {city}"))?;
        return Ok(Action::SelectCity(*city));
    }
    match query {
        Some(query) => Ok(Action::Search(query)),
        None => bail!("Give a place name, --lat/--lon, --city or --link"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config)?;
    let mut telemetry = telemetry::init(&config.logging, cli.verbose)?;
    info!("Breeze {} starting", breeze::VERSION);

    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&config.providers)?);

    let result = match cli.command {
        Command::Report {
            query,
            lat,
            lon,
            name,
            city,
            link,
            share,
            base_url,
        } => {
            let action = report_action(query, lat.zip(lon), name, city, link)?;
            let dashboard = build_dashboard(&config, transport).await;

            eprintln!("{}", loading_message());
            match dashboard.dispatch(action).await {
                Ok(()) => {
                    let state = dashboard.state();
                    let view = state
                        .view
                        .as_ref()
                        .ok_or_else(|| anyhow!("No air quality data available."))?;
                    println!("{}", Report { view, unit: state.unit, base_url: &base_url });
                    if share {
                        let url = view.link.url(&base_url);
                        let (subject, body) = email_summary(view, &url);
                        println!();
                        println!("{}", share_text(view));
                        println!("Subject: {subject}");
                        println!("{body}");
                    }
                    Ok(())
                }
                Err(e) => Err(anyhow!(e.user_message())),
            }
        }
        Command::Search { query } => {
            let dashboard = Dashboard::new(&config, transport, Arc::new(Unsupported));
            match dashboard.search(&query).await {
                Ok(suggestions) if suggestions.is_empty() => {
                    println!("No locations found for \"{}\".", query.trim());
                    Ok(())
                }
                Ok(suggestions) => {
                    for suggestion in suggestions {
                        println!(
                            "{}  ({:.4}, {:.4})",
                            suggestion.full_name(),
                            suggestion.latitude,
                            suggestion.longitude
                        );
                    }
                    Ok(())
                }
                Err(e) => Err(anyhow!(e.user_message())),
            }
        }
        Command::Ticker => {
            let dashboard = Dashboard::new(&config, transport, Arc::new(Unsupported));
            match dashboard.ticker().await {
                Ok(snapshots) => {
                    for snapshot in snapshots {
                        println!(
                            "{:<14} {:<12} {:>4}  {}",
                            snapshot.city.name,
                            snapshot.city.country,
                            snapshot.display_aqi(),
                            snapshot.bucket.key()
                        );
                    }
                    Ok(())
                }
                Err(_) => Err(anyhow!("Unable to load global data")),
            }
        }
        Command::Serve { port } => {
            let mut config = config.clone();
            if let Some(port) = port {
                config.server.port = port;
            }
            let dashboard = Arc::new(Dashboard::new(&config, transport.clone(), Arc::new(Unsupported)));
            web::run(&config, dashboard, transport).await
        }
        Command::Prefs { dark_mode, unit } => {
            let path = BreezeConfig::expand_path(&config.preferences.location);
            let store = PreferenceStore::open(&path)?;
            if let Some(switch) = dark_mode {
                store.set_dark_mode(matches!(switch, Switch::On)).await?;
            }
            if let Some(unit) = unit {
                store.set_temperature_unit(unit.into()).await?;
            }
            let prefs = store.load().await?;
            println!("dark mode: {}", if prefs.dark_mode { "on" } else { "off" });
            println!("temperature unit: {}", prefs.unit.symbol());
            Ok(())
        }
    };

    telemetry.shutdown();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
