//! Name-addressed lookup for a fleet of simulated robots.
//!
//! Built once at startup and immutable afterwards; every robot runs its
//! own worker and shares nothing with its neighbours.

use std::collections::HashMap;
use std::sync::Arc;

use crate::robot::Robot;

#[derive(Default)]
pub struct RobotRegistry {
    robots: HashMap<String, Arc<Robot>>,
}

impl RobotRegistry {
    pub fn new() -> Self {
        Self {
            robots: HashMap::new(),
        }
    }

    pub fn insert(&mut self, robot: Robot) {
        self.robots.insert(robot.name().to_string(), Arc::new(robot));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Robot>> {
        self.robots.get(name).cloned()
    }

    /// The only registered robot, when there is exactly one. Lets
    /// single-robot deployments omit `robot_name` on every request, as
    /// the single-robot server always did.
    pub fn solo(&self) -> Option<Arc<Robot>> {
        if self.robots.len() == 1 {
            self.robots.values().next().cloned()
        } else {
            None
        }
    }

    /// Resolves an optional caller-supplied name: a named robot must
    /// exist, an absent name falls back to the solo robot.
    pub fn resolve(&self, name: Option<&str>) -> Option<Arc<Robot>> {
        match name {
            Some(name) => self.get(name),
            None => self.solo(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.robots.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RobotConfig, SimulationConfig};

    fn robot(name: &str) -> Robot {
        let config = RobotConfig {
            name: name.to_string(),
            ..RobotConfig::default()
        };
        Robot::new(&config, &SimulationConfig::default())
    }

    #[tokio::test]
    async fn lookup_by_name() {
        let mut registry = RobotRegistry::new();
        registry.insert(robot("alpha"));
        registry.insert(robot("beta"));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("alpha").is_some());
        assert!(registry.get("gamma").is_none());
        assert_eq!(registry.names(), vec!["alpha", "beta"]);
    }

    #[tokio::test]
    async fn solo_fallback_requires_exactly_one_robot() {
        let mut registry = RobotRegistry::new();
        assert!(registry.resolve(None).is_none());

        registry.insert(robot("alpha"));
        assert_eq!(registry.resolve(None).unwrap().name(), "alpha");
        assert_eq!(registry.resolve(Some("alpha")).unwrap().name(), "alpha");

        registry.insert(robot("beta"));
        assert!(registry.resolve(None).is_none());
        assert!(registry.resolve(Some("beta")).is_some());
    }
}
