//! Simulated motion: path commands, straight-line leg planning, and the
//! worker task that drives each robot.

pub mod model;
pub(crate) mod worker;

/// One point of a commanded path. Immutable once built.
#[derive(Debug, Clone)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Requested final orientation. Carried through but never applied:
    /// the robot's yaw always follows the direction of travel.
    pub yaw: f64,
    /// Seconds-since-epoch stamp assigned by the fleet manager.
    pub timestamp: f64,
    /// Floor the waypoint lives on, when the caller names one.
    pub floor_hint: Option<String>,
    /// Caller-side ordinal of this waypoint.
    pub sequence: Option<i64>,
}

impl Waypoint {
    /// Exact-equality goal comparison. Fleet managers re-send a goal as a
    /// byte-identical message, so x, y, yaw and timestamp all matching
    /// means the same goal, and any field differing (even the timestamp
    /// alone) means a new one. No tolerance is applied.
    pub fn same_target(&self, other: &Waypoint) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.yaw == other.yaw
            && self.timestamp == other.timestamp
    }
}

/// A caller-issued command: an id and the ordered waypoints to visit.
/// Consumed exactly once by the motion worker.
#[derive(Debug, Clone)]
pub struct PathCommand {
    /// Caller-assigned id, reported back as `current_command_id` once the
    /// command finishes or is skipped.
    pub id: i64,
    pub path: Vec<Waypoint>,
    /// Map label to apply as legs complete, when the request names one.
    pub floor: Option<String>,
}
