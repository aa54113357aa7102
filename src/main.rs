mod feed;
mod routes;
mod state;
mod weather;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wallcal_core::config::DashboardConfig;

use crate::feed::FeedClient;
use crate::state::AppState;
use crate::weather::WeatherClient;

#[derive(Parser)]
#[command(name = "wallcal")]
#[command(about = "Serve a wall calendar dashboard from a public iCalendar feed")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding `bind` from the config
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wallcal=info,wallcal_core=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => DashboardConfig::config_path()?,
    };
    if !config_path.exists() {
        DashboardConfig::create_default_config(&config_path)?;
        bail!(
            "Created {}\nSet feed_url there and start wallcal again.",
            config_path.display()
        );
    }

    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let tz = resolve_timezone(&config)?;
    let bind = cli.bind.unwrap_or_else(|| config.bind.clone());

    let feed = FeedClient::new(&config.feed_url)?;
    let weather = config.weather.as_ref().map(WeatherClient::new).transpose()?;

    let state = AppState::new(config, tz);
    tokio::spawn(feed::poll_calendar(state.clone(), feed));
    if let Some(client) = weather {
        tokio::spawn(weather::poll_weather(state.clone(), client));
    }

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(%bind, timezone = tz.name(), "wallcal listening on http://{bind}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Configured zone, else the system zone, else UTC.
fn resolve_timezone(config: &DashboardConfig) -> Result<Tz> {
    if let Some(tz) = config.timezone()? {
        return Ok(tz);
    }

    match iana_time_zone::get_timezone() {
        Ok(name) => match name.parse::<Tz>() {
            Ok(tz) => Ok(tz),
            Err(_) => {
                warn!(zone = %name, "Unknown system timezone, using UTC");
                Ok(Tz::UTC)
            }
        },
        Err(e) => {
            warn!(error = %e, "Could not detect system timezone, using UTC");
            Ok(Tz::UTC)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
