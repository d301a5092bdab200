//! TOML configuration for the simulator: HTTP binding, motion timing and
//! the fleet of robots to spin up. Every field has a default so a config
//! file (or a bare CLI invocation) only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,

    /// The fleet. A config file lists one `[[robots]]` table per robot;
    /// the CLI path builds a single entry from its flags.
    #[serde(default)]
    pub robots: Vec<RobotConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Constant linear speed in m/s for every leg of travel.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Interval between position updates while a leg is active.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Seconds every endpoint hangs after a stop request, simulating the
    /// robot dropping off the network. 0 disables the outage; the fleet
    /// adapter drills historically used 30.
    #[serde(default)]
    pub stop_freeze_secs: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RobotConfig {
    #[serde(default = "default_robot_name")]
    pub name: String,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,

    #[serde(default)]
    pub yaw: f64,

    #[serde(default = "default_map")]
    pub map: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_speed() -> f64 {
    0.6
}
fn default_tick_ms() -> u64 {
    100
}
fn default_robot_name() -> String {
    "robot1".to_string()
}
fn default_map() -> String {
    "L1".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            simulation: SimulationConfig::default(),
            robots: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            tick_ms: default_tick_ms(),
            stop_freeze_secs: 0.0,
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: default_robot_name(),
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            map: default_map(),
        }
    }
}

impl Config {
    /// Rejects configurations the motion worker cannot honor. A
    /// non-positive speed would make every leg take infinite time, so it
    /// is refused here rather than discovered as a robot that never
    /// arrives.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.simulation.speed.is_finite() && self.simulation.speed > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation.speed must be finite and positive, got {}",
                self.simulation.speed
            )));
        }
        if self.simulation.tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_ms must be at least 1".to_string(),
            ));
        }
        if !(self.simulation.stop_freeze_secs.is_finite() && self.simulation.stop_freeze_secs >= 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "simulation.stop_freeze_secs must be finite and non-negative, got {}",
                self.simulation.stop_freeze_secs
            )));
        }
        if self.robots.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one robot must be configured".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for robot in &self.robots {
            if robot.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "robot name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(robot.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate robot name '{}'",
                    robot.name
                )));
            }
            if !(robot.x.is_finite() && robot.y.is_finite() && robot.yaw.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "robot '{}' has a non-finite starting pose",
                    robot.name
                )));
            }
        }
        Ok(())
    }
}

/// Loads and validates a TOML config file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_simulator() {
        let config: Config = toml::from_str("[[robots]]\n").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.simulation.speed, 0.6);
        assert_eq!(config.simulation.tick_ms, 100);
        assert_eq!(config.simulation.stop_freeze_secs, 0.0);
        assert_eq!(config.robots.len(), 1);
        assert_eq!(config.robots[0].name, "robot1");
        assert_eq!(config.robots[0].map, "L1");
        config.validate().unwrap();
    }

    #[test]
    fn parses_a_fleet() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [simulation]
            speed = 1.5
            tick_ms = 20

            [[robots]]
            name = "deliverbot"
            x = 45.26
            y = -20.12
            map = "B2"

            [[robots]]
            name = "tuggerbot"
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.simulation.speed, 1.5);
        assert_eq!(config.robots.len(), 2);
        assert_eq!(config.robots[0].name, "deliverbot");
        assert_eq!(config.robots[0].map, "B2");
        assert_eq!(config.robots[1].name, "tuggerbot");
        assert_eq!(config.robots[1].x, 0.0);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let mut config = Config::default();
        config.robots.push(RobotConfig::default());
        config.simulation.speed = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.simulation.speed = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_tick() {
        let mut config = Config::default();
        config.robots.push(RobotConfig::default());
        config.simulation.tick_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_empty_fleet_and_duplicate_names() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.robots.push(RobotConfig::default());
        config.robots.push(RobotConfig::default());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_non_finite_starting_pose() {
        let mut config = Config::default();
        config.robots.push(RobotConfig {
            x: f64::NAN,
            ..RobotConfig::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
