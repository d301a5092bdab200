//! Data models for API requests and responses.
//!
//! Field names on the wire are frozen: they are what the fleet adapters
//! already send and parse, quirks included (`curr_path_size` carries the
//! remaining path itself, not its length).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::motion::Waypoint;
use crate::state::StatusSnapshot;

/// A single point on a map as the adapters describe it. Every field is
/// optional on the wire; which ones must actually be present depends on
/// the endpoint consuming it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub yaw: Option<f64>,
    #[serde(default)]
    pub obey_approach_speed_limit: Option<bool>,
    #[serde(default)]
    pub approach_speed_limit: Option<f64>,
    #[serde(default)]
    pub level_name: Option<String>,
    #[serde(default)]
    pub index: Option<i64>,
}

impl Location {
    /// Converts a wire location into a motion waypoint. `x`, `y` and
    /// `yaw` must be present; a missing timestamp defaults to 0 so that
    /// goals without one still compare equal to each other.
    pub fn to_waypoint(&self, position: usize) -> Result<Waypoint, String> {
        let x = self
            .x
            .ok_or_else(|| format!("waypoint {position} is missing x"))?;
        let y = self
            .y
            .ok_or_else(|| format!("waypoint {position} is missing y"))?;
        let yaw = self
            .yaw
            .ok_or_else(|| format!("waypoint {position} is missing yaw"))?;
        Ok(Waypoint {
            x,
            y,
            yaw,
            timestamp: self.timestamp.unwrap_or(0.0),
            floor_hint: self.level_name.clone(),
            sequence: self.index,
        })
    }

    pub fn from_waypoint(waypoint: &Waypoint) -> Self {
        Self {
            timestamp: Some(waypoint.timestamp),
            x: Some(waypoint.x),
            y: Some(waypoint.y),
            yaw: Some(waypoint.yaw),
            obey_approach_speed_limit: Some(false),
            approach_speed_limit: None,
            level_name: waypoint.floor_hint.clone(),
            index: waypoint.sequence,
        }
    }
}

/// A path command from a fleet adapter. `destination` is the ordered
/// path; `task`, `data` and `speed_limit` are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRequest {
    #[serde(default)]
    pub map_name: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub destination: Vec<Location>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

/// The envelope every endpoint replies with.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub data: Option<Value>,
    pub success: bool,
    pub msg: String,
}

impl ApiResponse {
    /// The all-clear reply. The greeting is load-bearing: at least one
    /// adapter smoke test greps for it.
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            data,
            success: true,
            msg: "Beep Boop Beep".to_string(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            msg: msg.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PositionData {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

/// The status payload served to fleet adapters. Battery never drains and
/// `completed_request` stays false; adapters watch `last_completed_request`
/// and the path emptying out instead.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusData {
    pub robot_name: String,
    pub map_name: String,
    pub position: PositionData,
    pub battery: f64,
    pub completed_request: bool,
    pub destination_arrival: Option<Value>,
    pub curr_path_size: Vec<Location>,
    pub last_completed_request: i64,
}

impl StatusData {
    pub fn from_snapshot(name: &str, snapshot: &StatusSnapshot) -> Self {
        Self {
            robot_name: name.to_string(),
            map_name: snapshot.pose.floor.clone(),
            position: PositionData {
                x: snapshot.pose.x,
                y: snapshot.pose.y,
                yaw: snapshot.pose.yaw,
            },
            battery: 100.0,
            completed_request: false,
            destination_arrival: None,
            curr_path_size: snapshot
                .current_path
                .iter()
                .map(Location::from_waypoint)
                .collect(),
            last_completed_request: snapshot.current_command_id,
        }
    }
}
