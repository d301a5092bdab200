//! Phantombot simulates fleet robots that exist only as state: each robot
//! accepts path commands over the Open-RMF fleet-adapter HTTP dialect and
//! "drives" them by interpolating its pose at a fixed tick, so a fleet
//! manager under test sees live positions and command completions without
//! any hardware in the loop.

pub mod config;
pub mod motion;
pub mod registry;
pub mod robot;
pub mod state;
pub mod web;
