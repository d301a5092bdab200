//! One simulated robot: shared state, the command queue's sending half,
//! and the control surface the HTTP layer calls into.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{RobotConfig, SimulationConfig};
use crate::motion::worker::MotionWorker;
use crate::motion::{PathCommand, Waypoint};
use crate::state::{Pose, RobotState, SharedState, StatusSnapshot};

#[derive(Debug, Error)]
pub enum RobotError {
    #[error("path must contain at least one waypoint")]
    EmptyPath,
    #[error("waypoint {index} has a non-finite coordinate")]
    NonFiniteWaypoint { index: usize },
    #[error("motion worker is no longer running")]
    WorkerUnavailable,
}

/// Handle to one robot. Cheap to share behind an [`Arc`]; all methods
/// take `&self` and are safe to call from any number of tasks.
pub struct Robot {
    name: String,
    state: SharedState,
    commands: mpsc::UnboundedSender<PathCommand>,
}

impl Robot {
    /// Builds the robot at its starting pose and spawns its motion
    /// worker. Must be called from within a tokio runtime.
    pub fn new(robot: &RobotConfig, simulation: &SimulationConfig) -> Self {
        let pose = Pose {
            x: robot.x,
            y: robot.y,
            yaw: robot.yaw,
            floor: robot.map.clone(),
        };
        let state: SharedState = Arc::new(RwLock::new(RobotState::new(pose)));
        let (commands, queue) = mpsc::unbounded_channel();

        let worker = MotionWorker::new(
            robot.name.clone(),
            state.clone(),
            queue,
            simulation.speed,
            Duration::from_millis(simulation.tick_ms),
        );
        tokio::spawn(worker.run());

        info!(
            robot = %robot.name,
            x = robot.x,
            y = robot.y,
            yaw = robot.yaw,
            map = %robot.map,
            "robot created"
        );
        Self {
            name: robot.name.clone(),
            state,
            commands,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validates and enqueues a path command, returning as soon as it is
    /// queued; execution is asynchronous and strictly FIFO. Empty paths
    /// and non-finite coordinates are rejected here so the worker never
    /// sees a leg it cannot finish.
    pub async fn submit_path(
        &self,
        cmd_id: i64,
        path: Vec<Waypoint>,
        floor: Option<String>,
    ) -> Result<(), RobotError> {
        if path.is_empty() {
            return Err(RobotError::EmptyPath);
        }
        for (index, waypoint) in path.iter().enumerate() {
            let finite = waypoint.x.is_finite()
                && waypoint.y.is_finite()
                && waypoint.yaw.is_finite()
                && waypoint.timestamp.is_finite();
            if !finite {
                return Err(RobotError::NonFiniteWaypoint { index });
            }
        }

        self.commands
            .send(PathCommand {
                id: cmd_id,
                path,
                floor,
            })
            .map_err(|_| RobotError::WorkerUnavailable)?;

        // Submitting new work releases a stopped robot; an explicit
        // resume is not required. Kept exactly as the fleet adapters
        // expect it, including the ordering after the enqueue.
        let mut state = self.state.write().await;
        if state.stopped {
            info!(robot = %self.name, cmd_id, "robot was stopped, new command releases it");
            state.stopped = false;
        }
        Ok(())
    }

    /// Freezes motion in place. The in-flight leg is kept, not aborted;
    /// travel continues on `resume` or on the next submitted command.
    /// Idempotent.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        state.stopped = true;
        info!(robot = %self.name, "stop requested");
    }

    /// Clears the stop flag. Logs and does nothing when the robot is not
    /// stopped. Idempotent.
    pub async fn resume(&self) {
        let mut state = self.state.write().await;
        if state.stopped {
            state.stopped = false;
            info!(robot = %self.name, "resume requested");
        } else {
            warn!(robot = %self.name, "resume requested but robot is not stopped");
        }
    }

    /// Consistent snapshot of pose and execution progress, taken under a
    /// single read guard.
    pub async fn status(&self) -> StatusSnapshot {
        self.state.read().await.snapshot()
    }

    /// Relabels the floor the robot reports itself on, without any motion
    /// implication. Returns the previous label.
    pub async fn set_floor(&self, floor: impl Into<String>) -> String {
        let mut state = self.state.write().await;
        std::mem::replace(&mut state.pose.floor, floor.into())
    }
}
