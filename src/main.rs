use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use windroute::config::LoggingConfig;
use windroute::track::decode_gpx;
use windroute::{
    AnalysisRequest, OpenMeteoClient, RouteAnalysisService, WindRouteConfig, parse_track, web,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find the better direction to ride a GPX route in the wind", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.config/windroute/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Parse a GPX file into simplified segments
    Parse {
        #[arg(value_hint = ValueHint::FilePath)]
        gpx: PathBuf,
    },
    /// Score a GPX file against the wind forecast
    Analyze {
        #[arg(value_hint = ValueHint::FilePath)]
        gpx: PathBuf,

        /// Ride start in local time, YYYY-MM-DDTHH:MM
        #[arg(short, long)]
        datetime: String,

        /// Average rider speed in km/h
        #[arg(short, long)]
        speed: Option<f64>,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_track(path: &Path, config: &WindRouteConfig) -> Result<windroute::ParseResponse> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content = decode_gpx(&bytes)?;
    let file_name = path.file_name().and_then(|name| name.to_str());
    parse_track(file_name, &content, &config.analysis)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = WindRouteConfig::load_from_path(cli.config.clone())?;
    init_logging(&config.logging, cli.verbose);

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            info!("Starting windroute v{}", windroute::VERSION);
            web::run(config).await
        }
        Command::Parse { gpx } => print_json(&read_track(&gpx, &config)?),
        Command::Analyze {
            gpx,
            datetime,
            speed,
        } => {
            let parsed = read_track(&gpx, &config)?;
            let client = OpenMeteoClient::new(&config.weather)?;
            let service = RouteAnalysisService::new(Arc::new(client), &config)?;

            let request = AnalysisRequest {
                segments: parsed.segments,
                datetime,
                rider_speed: speed.unwrap_or(config.analysis.default_rider_speed),
            };
            let response = service.analyze(&request).await?;
            print_json(&response)
        }
    }
}
