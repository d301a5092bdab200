//! Shared per-robot state and the snapshots readers see.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::motion::Waypoint;

/// Where the robot is: position, orientation and the floor it is on.
#[derive(Debug, Clone)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Radians; always points along the direction of travel while moving.
    pub yaw: f64,
    pub floor: String,
}

/// Derived view of what the worker is doing. `Stopped` takes precedence:
/// a robot frozen mid-path is stopped, not moving, even though the worker
/// still remembers where it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Idle,
    Moving,
    Stopped,
}

/// Everything mutable about one robot, guarded by a single lock.
///
/// The motion worker is the only writer of `pose.x`/`pose.y`/`pose.yaw`,
/// `moving`, `current_path`, `current_command_id` and
/// `last_accepted_target`. The control surface writes only `stopped` and
/// the floor label. Fields are crate-private so nothing outside can break
/// that split; readers go through [`RobotState::snapshot`].
#[derive(Debug)]
pub struct RobotState {
    pub(crate) pose: Pose,
    pub(crate) moving: bool,
    pub(crate) stopped: bool,
    /// Waypoints still to be visited for the in-flight command. Replaced
    /// wholesale when a command is picked up, popped as legs finish,
    /// cleared when a command is skipped as a duplicate.
    pub(crate) current_path: VecDeque<Waypoint>,
    /// Id of the last command that finished or was skipped. Never touched
    /// mid-execution.
    pub(crate) current_command_id: i64,
    /// Final waypoint of the most recent accepted command, kept for the
    /// duplicate filter.
    pub(crate) last_accepted_target: Option<Waypoint>,
}

pub(crate) type SharedState = Arc<RwLock<RobotState>>;

impl RobotState {
    pub(crate) fn new(pose: Pose) -> Self {
        Self {
            pose,
            moving: false,
            stopped: false,
            current_path: VecDeque::new(),
            current_command_id: 0,
            last_accepted_target: None,
        }
    }

    pub fn execution_state(&self) -> ExecutionState {
        if self.stopped {
            ExecutionState::Stopped
        } else if self.moving {
            ExecutionState::Moving
        } else {
            ExecutionState::Idle
        }
    }

    /// Clones out a consistent view under the caller's read guard, so a
    /// reader never sees a half-updated pose.
    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            pose: self.pose.clone(),
            execution_state: self.execution_state(),
            is_moving: self.moving,
            current_path: self.current_path.iter().cloned().collect(),
            current_command_id: self.current_command_id,
        }
    }
}

/// Point-in-time copy of a robot's observable state.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub pose: Pose,
    pub execution_state: ExecutionState,
    /// True from the moment a command's first leg starts until its last
    /// leg ends, including while stopped mid-path.
    pub is_moving: bool,
    pub current_path: Vec<Waypoint>,
    pub current_command_id: i64,
}
