//! The single consumer task that executes path commands for one robot.
//!
//! Exactly one worker per robot: it owns the receiving half of the
//! command queue and is the only writer of the interpolated pose, so pose
//! updates can never race no matter how many callers enqueue, stop or
//! read concurrently.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::motion::model::Leg;
use crate::motion::{PathCommand, Waypoint};
use crate::state::SharedState;

pub(crate) struct MotionWorker {
    name: String,
    state: SharedState,
    commands: UnboundedReceiver<PathCommand>,
    speed: f64,
    tick: Duration,
}

impl MotionWorker {
    pub(crate) fn new(
        name: String,
        state: SharedState,
        commands: UnboundedReceiver<PathCommand>,
        speed: f64,
        tick: Duration,
    ) -> Self {
        Self {
            name,
            state,
            commands,
            speed,
            tick,
        }
    }

    /// Runs until the sending half of the command queue is dropped.
    /// Suspends on the empty queue, on the per-tick timer, and while
    /// stopped; never anywhere else.
    pub(crate) async fn run(mut self) {
        info!(robot = %self.name, speed = self.speed, "motion worker started");
        while let Some(command) = self.commands.recv().await {
            self.execute(command).await;
        }
        info!(robot = %self.name, "command queue closed, motion worker exiting");
    }

    async fn execute(&mut self, command: PathCommand) {
        let Some(final_target) = command.path.last().cloned() else {
            // Empty paths are rejected before they can be enqueued.
            return;
        };

        {
            let mut state = self.state.write().await;
            let duplicate = state
                .last_accepted_target
                .as_ref()
                .is_some_and(|target| target.same_target(&final_target));
            if duplicate {
                info!(
                    robot = %self.name,
                    cmd_id = command.id,
                    "final target repeats the last accepted command, skipping"
                );
                state.current_command_id = command.id;
                state.current_path.clear();
                return;
            }
            state.last_accepted_target = Some(final_target);
            state.current_path = command.path.iter().cloned().collect();
            state.moving = true;
        }

        info!(
            robot = %self.name,
            cmd_id = command.id,
            waypoints = command.path.len(),
            "executing path command"
        );
        for waypoint in &command.path {
            self.drive_leg(waypoint).await;
            let mut state = self.state.write().await;
            if let Some(floor) = &command.floor {
                state.pose.floor.clone_from(floor);
            }
            state.current_path.pop_front();
        }

        let mut state = self.state.write().await;
        state.current_command_id = command.id;
        state.moving = false;
        info!(robot = %self.name, cmd_id = command.id, "path command complete");
    }

    /// Drives one straight leg on the fixed tick, freezing in place while
    /// the stop flag is raised.
    async fn drive_leg(&self, target: &Waypoint) {
        let mut leg = self.begin_leg(target).await;
        if leg.duration == 0.0 {
            // Already on the waypoint: snap without consuming a tick.
            self.arrive(target).await;
            return;
        }

        let mut leg_started = Instant::now();
        loop {
            if self.state.read().await.stopped {
                self.hold_while_stopped().await;
                // Re-anchor the leg on the frozen pose: the remaining
                // distance is preserved and travel restarts from where
                // the robot actually is, so there is no position jump.
                leg = self.begin_leg(target).await;
                leg_started = Instant::now();
                continue;
            }

            let elapsed = leg_started.elapsed().as_secs_f64();
            if leg.is_complete(elapsed) {
                self.arrive(target).await;
                return;
            }

            {
                let mut state = self.state.write().await;
                let (x, y) = leg.position_at(elapsed);
                state.pose.x = x;
                state.pose.y = y;
                debug!(
                    robot = %self.name,
                    x,
                    y,
                    remaining = state.current_path.len(),
                    "position update"
                );
            }
            sleep(self.tick).await;
        }
    }

    /// Plans the leg from wherever the robot currently is and turns it to
    /// face the target for the duration of the leg.
    async fn begin_leg(&self, target: &Waypoint) -> Leg {
        let mut state = self.state.write().await;
        let leg = Leg::plan(state.pose.x, state.pose.y, target.x, target.y, self.speed);
        state.pose.yaw = leg.heading;
        debug!(
            robot = %self.name,
            from_x = state.pose.x,
            from_y = state.pose.y,
            to_x = target.x,
            to_y = target.y,
            duration = leg.duration,
            "leg planned"
        );
        leg
    }

    async fn arrive(&self, target: &Waypoint) {
        let mut state = self.state.write().await;
        state.pose.x = target.x;
        state.pose.y = target.y;
        debug!(robot = %self.name, x = target.x, y = target.y, "waypoint reached");
    }

    /// Polls the stop flag at the tick interval without touching the
    /// pose, so readers observe a fully frozen robot.
    async fn hold_while_stopped(&self) {
        info!(robot = %self.name, "robot stopped, holding position");
        while self.state.read().await.stopped {
            sleep(self.tick).await;
        }
        info!(robot = %self.name, "robot released, resuming travel");
    }
}
