//! Binary entry point: parse flags, load or synthesize the configuration,
//! build the fleet and serve the HTTP API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use phantombot::config::{self, Config, RobotConfig};
use phantombot::registry::RobotRegistry;
use phantombot::robot::Robot;
use phantombot::web::api::{app_state, create_router};

#[derive(Parser, Debug)]
#[command(
    name = "phantombot",
    about = "Configure and spin up a simulated fleet robot."
)]
struct Cli {
    /// Name of the robot
    #[arg(short = 'r', long, default_value = "robot1")]
    robot_name: String,

    /// Port to run the API server on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Comma separated location of the robot (x,y,yaw)
    #[arg(short, long, default_value = "0.0,0.0,0.0", value_parser = parse_location)]
    location: (f64, f64, f64),

    /// Current map of the robot
    #[arg(short, long, default_value = "L1")]
    map: String,

    /// Path to a TOML config file; its robot list replaces the single-robot flags
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_location(s: &str) -> Result<(f64, f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected x,y,yaw but got '{s}'"));
    }
    let mut values = [0.0_f64; 3];
    for (slot, part) in values.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|e| format!("invalid coordinate '{part}': {e}"))?;
    }
    Ok((values[0], values[1], values[2]))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting phantombot fleet robot simulator");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            config::load_config(path).map_err(|e| {
                tracing::error!("Failed to load config from '{}': {}", path.display(), e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?
        }
        None => {
            let (x, y, yaw) = cli.location;
            let mut config = Config::default();
            config.server.port = cli.port;
            config.robots.push(RobotConfig {
                name: cli.robot_name.clone(),
                x,
                y,
                yaw,
                map: cli.map.clone(),
            });
            config.validate().map_err(|e| {
                tracing::error!("Invalid command line arguments: {}", e);
                Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
            })?;
            config
        }
    };

    let mut registry = RobotRegistry::new();
    for robot in &config.robots {
        registry.insert(Robot::new(robot, &config.simulation));
    }
    tracing::info!(
        robots = registry.len(),
        speed = config.simulation.speed,
        tick_ms = config.simulation.tick_ms,
        "fleet ready"
    );

    let stop_freeze = Duration::try_from_secs_f64(config.simulation.stop_freeze_secs)?;
    let state = app_state(Arc::new(registry), stop_freeze);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((
        config.server.bind_address.as_str(),
        config.server.port,
    ))
    .await?;
    tracing::info!("Web API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
