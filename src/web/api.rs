//! Defines the Axum API routes and handlers.
//!
//! Routes and payloads follow the fleet-adapter dialect, so a controller
//! that already drives the real robot can be pointed at this simulator
//! without changes. Robots are addressed by the `robot_name` query
//! parameter; deployments with a single robot may omit it everywhere.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::registry::RobotRegistry;
use crate::robot::{Robot, RobotError};
use crate::state::StatusSnapshot;
use crate::web::models::{ApiResponse, Location, PathRequest, StatusData};

pub struct AppStateInner {
    pub registry: Arc<RobotRegistry>,
    /// Most recent path request per robot, compared whole against each
    /// incoming one. Fleet controllers re-send an entire request on their
    /// own schedule; an identical re-send is acknowledged without being
    /// queued again.
    recent_paths: Mutex<HashMap<String, PathRequest>>,
    /// Taken for writing while a stop outage runs. Every request passes
    /// through a read acquisition first, so holding the write side hangs
    /// the whole API at once.
    freeze_gate: RwLock<()>,
    stop_freeze: Duration,
}

pub type AppState = Arc<AppStateInner>;

pub fn app_state(registry: Arc<RobotRegistry>, stop_freeze: Duration) -> AppState {
    Arc::new(AppStateInner {
        registry,
        recent_paths: Mutex::new(HashMap::new()),
        freeze_gate: RwLock::new(()),
        stop_freeze,
    })
}

/// Creates the Axum router with all the API endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/navigate_to_pose/", post(navigate_to_pose))
        .route("/status/", post(status))
        .route("/map_switch/", post(map_switch))
        .route("/rmf_path/", post(rmf_path))
        .route("/rmf_status", get(rmf_status))
        .route("/stop/", post(stop))
        .route("/resume/", post(resume))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            freeze_gate_middleware,
        ))
        .with_state(state)
}

/// For tests: same router, caller-supplied state.
pub fn app_with_state(state: AppState) -> Router {
    create_router(state)
}

/// Parks every request while a simulated connection loss is in effect.
/// The guard is dropped before the handler runs; the stop handler takes
/// the write side itself and must not deadlock against its own request.
async fn freeze_gate_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    drop(state.freeze_gate.read().await);
    next.run(request).await
}

#[derive(Deserialize)]
struct RobotQuery {
    robot_name: Option<String>,
}

#[derive(Deserialize)]
struct PathQuery {
    robot_name: Option<String>,
    cmd_id: i64,
}

#[derive(Deserialize)]
struct MapSwitchQuery {
    robot_name: Option<String>,
    map: String,
}

/// Helper to build an error envelope with a status code.
fn envelope_error(msg: impl Into<String>, code: StatusCode) -> Response {
    (code, Json(ApiResponse::error(msg))).into_response()
}

fn lookup(state: &AppState, name: Option<&str>) -> Result<Arc<Robot>, Response> {
    match state.registry.resolve(name) {
        Some(robot) => Ok(robot),
        None => {
            let msg = match name {
                Some(name) => format!("unknown robot '{name}'"),
                None => "robot_name is required when more than one robot is registered"
                    .to_string(),
            };
            warn!(%msg, "rejecting request");
            Err(envelope_error(msg, StatusCode::NOT_FOUND))
        }
    }
}

fn rejection(err: RobotError) -> Response {
    let code = match err {
        RobotError::EmptyPath | RobotError::NonFiniteWaypoint { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RobotError::WorkerUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };
    envelope_error(err.to_string(), code)
}

fn status_reply(name: &str, snapshot: &StatusSnapshot) -> Response {
    let data = StatusData::from_snapshot(name, snapshot);
    match serde_json::to_value(&data) {
        Ok(value) => Json(ApiResponse::ok(Some(value))).into_response(),
        Err(err) => envelope_error(
            format!("failed to encode status: {err}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// Handler for a single-destination command. The destination's `index`
/// doubles as the command id and its `level_name` as the target floor;
/// with no floor named the robot keeps its current one.
async fn navigate_to_pose(
    State(state): State<AppState>,
    Query(query): Query<RobotQuery>,
    Json(destination): Json<Location>,
) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    info!(robot = %robot.name(), ?destination, "navigate_to_pose called");

    let waypoint = match destination.to_waypoint(0) {
        Ok(waypoint) => waypoint,
        Err(msg) => return envelope_error(msg, StatusCode::UNPROCESSABLE_ENTITY),
    };
    let cmd_id = destination.index.unwrap_or(0);
    let floor = match destination.level_name {
        Some(level) => level,
        None => {
            info!(robot = %robot.name(), "destination names no floor, keeping the current one");
            robot.status().await.pose.floor
        }
    };

    match robot.submit_path(cmd_id, vec![waypoint], Some(floor)).await {
        Ok(()) => Json(ApiResponse::ok(None)).into_response(),
        Err(err) => rejection(err),
    }
}

/// Handler to get the current status of the robot.
async fn status(State(state): State<AppState>, Query(query): Query<RobotQuery>) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    let snapshot = robot.status().await;
    status_reply(robot.name(), &snapshot)
}

/// Handler to relabel the floor a robot reports itself on. Pure label
/// change, no motion.
async fn map_switch(
    State(state): State<AppState>,
    Query(query): Query<MapSwitchQuery>,
) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    let previous = robot.set_floor(query.map.clone()).await;
    info!(robot = %robot.name(), from = %previous, to = %query.map, "map_switch called");
    Json(ApiResponse::ok(None)).into_response()
}

/// Handler for a full path command.
async fn rmf_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    Json(request): Json<PathRequest>,
) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };

    {
        let recent = state.recent_paths.lock().await;
        if recent
            .get(robot.name())
            .is_some_and(|previous| *previous == request)
        {
            info!(
                robot = %robot.name(),
                cmd_id = query.cmd_id,
                "request repeats the previous one verbatim, not queueing it again"
            );
            return Json(ApiResponse {
                data: None,
                success: true,
                msg: "Duplicate request ignored".to_string(),
            })
            .into_response();
        }
    }

    let mut path = Vec::with_capacity(request.destination.len());
    for (index, location) in request.destination.iter().enumerate() {
        match location.to_waypoint(index) {
            Ok(waypoint) => path.push(waypoint),
            Err(msg) => return envelope_error(msg, StatusCode::UNPROCESSABLE_ENTITY),
        }
    }
    info!(
        robot = %robot.name(),
        cmd_id = query.cmd_id,
        waypoints = path.len(),
        "rmf_path called"
    );
    for target in &path {
        info!(
            x = target.x,
            y = target.y,
            yaw = target.yaw,
            timestamp = target.timestamp,
            "target"
        );
    }

    let floor = request.map_name.clone();
    match robot.submit_path(query.cmd_id, path, floor).await {
        Ok(()) => {
            // Remembered only once accepted, so a rejected request does
            // not shadow a later valid identical one.
            let mut recent = state.recent_paths.lock().await;
            recent.insert(robot.name().to_string(), request);
            Json(ApiResponse::ok(None)).into_response()
        }
        Err(err) => rejection(err),
    }
}

/// Handler for the polling variant of status.
async fn rmf_status(State(state): State<AppState>, Query(query): Query<RobotQuery>) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    let snapshot = robot.status().await;
    status_reply(robot.name(), &snapshot)
}

/// Handler to freeze the robot in place. When an outage duration is
/// configured, the whole API hangs for that long afterwards, the way the
/// real robot disappears from the network when it is e-stopped.
async fn stop(State(state): State<AppState>, Query(query): Query<RobotQuery>) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    robot.stop().await;

    if !state.stop_freeze.is_zero() {
        info!(
            secs = state.stop_freeze.as_secs_f64(),
            "freezing all APIs to simulate a connection loss"
        );
        let _gate = state.freeze_gate.write().await;
        tokio::time::sleep(state.stop_freeze).await;
        info!("connection loss over, APIs back");
    }
    Json(ApiResponse::ok(None)).into_response()
}

/// Handler to release a stopped robot.
async fn resume(State(state): State<AppState>, Query(query): Query<RobotQuery>) -> Response {
    let robot = match lookup(&state, query.robot_name.as_deref()) {
        Ok(robot) => robot,
        Err(response) => return response,
    };
    robot.resume().await;
    Json(ApiResponse::ok(None)).into_response()
}
