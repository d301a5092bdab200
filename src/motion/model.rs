//! Constant-speed straight-line legs.
//!
//! A leg is planned once from the robot's current position to the next
//! waypoint and then evaluated purely as a function of elapsed time, so
//! the interpolated pose can never drift from the plan.

/// A planned move between two points at constant speed.
#[derive(Debug, Clone)]
pub struct Leg {
    origin_x: f64,
    origin_y: f64,
    target_x: f64,
    target_y: f64,
    velocity_x: f64,
    velocity_y: f64,
    /// Bearing from origin to target, `atan2(dy, dx)`. Adopted as the
    /// robot's yaw for the whole leg.
    pub heading: f64,
    /// Seconds needed to reach the target. Zero when the origin already
    /// sits on the target.
    pub duration: f64,
}

impl Leg {
    /// Breaks the origin-to-target vector into per-axis velocities and a
    /// total travel time.
    ///
    /// Travel time per axis is `distance / velocity`, taken as zero when
    /// the velocity component is exactly zero, and the leg takes the
    /// longer of the two axes. Both axes already on target gives a
    /// zero-duration leg. `speed` must be finite and positive; the
    /// configuration layer rejects anything else before it can get here.
    pub fn plan(origin_x: f64, origin_y: f64, target_x: f64, target_y: f64, speed: f64) -> Self {
        let heading = (target_y - origin_y).atan2(target_x - origin_x);
        let velocity_x = speed * heading.cos();
        let velocity_y = speed * heading.sin();

        let time_x = if velocity_x == 0.0 {
            0.0
        } else {
            (target_x - origin_x) / velocity_x
        };
        let time_y = if velocity_y == 0.0 {
            0.0
        } else {
            (target_y - origin_y) / velocity_y
        };
        let duration = time_x.abs().max(time_y.abs());

        Self {
            origin_x,
            origin_y,
            target_x,
            target_y,
            velocity_x,
            velocity_y,
            heading,
            duration,
        }
    }

    /// True once the travel time has fully elapsed.
    pub fn is_complete(&self, elapsed: f64) -> bool {
        elapsed >= self.duration
    }

    /// Position `elapsed` seconds after the leg started. Interpolates
    /// `origin + elapsed * velocity` during travel and snaps exactly onto
    /// the target afterwards, so floating-point residue never survives a
    /// completed leg.
    pub fn position_at(&self, elapsed: f64) -> (f64, f64) {
        if self.is_complete(elapsed) {
            (self.target_x, self.target_y)
        } else {
            (
                self.origin_x + elapsed * self.velocity_x,
                self.origin_y + elapsed * self.velocity_y,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn travel_time_is_distance_over_speed() {
        // 3-4-5 triangle: 5 units of distance at 2 units/s.
        let leg = Leg::plan(0.0, 0.0, 3.0, 4.0, 2.0);
        assert!((leg.duration - 2.5).abs() < EPS);
        assert!((leg.heading - 4.0_f64.atan2(3.0)).abs() < EPS);
        assert!((leg.velocity_x - 1.2).abs() < EPS);
        assert!((leg.velocity_y - 1.6).abs() < EPS);
    }

    #[test]
    fn interpolation_is_linear_in_time() {
        let leg = Leg::plan(0.0, 0.0, 3.0, 4.0, 2.0);
        let (x, y) = leg.position_at(1.25);
        assert!((x - 1.5).abs() < EPS);
        assert!((y - 2.0).abs() < EPS);
    }

    #[test]
    fn position_snaps_to_target_after_duration() {
        let leg = Leg::plan(1.0, -1.0, 4.0, 3.0, 0.6);
        let (x, y) = leg.position_at(leg.duration);
        assert_eq!((x, y), (4.0, 3.0));
        let (x, y) = leg.position_at(leg.duration + 100.0);
        assert_eq!((x, y), (4.0, 3.0));
    }

    #[test]
    fn zero_distance_leg_completes_immediately() {
        let leg = Leg::plan(2.5, -7.0, 2.5, -7.0, 0.6);
        assert_eq!(leg.duration, 0.0);
        assert!(leg.is_complete(0.0));
        assert_eq!(leg.position_at(0.0), (2.5, -7.0));
        // atan2(0, 0) is 0: a degenerate leg points the robot east.
        assert_eq!(leg.heading, 0.0);
    }

    #[test]
    fn axis_aligned_leg_keeps_the_idle_axis_pinned() {
        // Straight north: the x velocity component is cos(pi/2), which is
        // tiny but not exactly zero; the x travel time must still be zero
        // and the drift must stay negligible over the whole leg.
        let leg = Leg::plan(2.0, 7.0, 2.0, 12.0, 0.5);
        assert!((leg.duration - 10.0).abs() < EPS);
        let (x, y) = leg.position_at(4.0);
        assert!((x - 2.0).abs() < 1e-12);
        assert!((y - 9.0).abs() < EPS);
        let (x, y) = leg.position_at(leg.duration);
        assert_eq!(x, 2.0);
        assert_eq!(y, 12.0);
    }

    #[test]
    fn negative_direction_has_positive_duration() {
        let leg = Leg::plan(10.0, 0.0, -10.0, 0.0, 0.6);
        assert!(leg.duration > 0.0);
        assert!((leg.duration - 20.0 / 0.6).abs() < EPS);
        assert!((leg.heading.abs() - std::f64::consts::PI).abs() < EPS);
        let (x, _) = leg.position_at(leg.duration / 2.0);
        assert!((x - 0.0).abs() < 1e-6);
    }

    #[test]
    fn speed_scales_duration_inversely() {
        let slow = Leg::plan(0.0, 0.0, 6.0, 0.0, 0.6);
        let fast = Leg::plan(0.0, 0.0, 6.0, 0.0, 1.2);
        assert!((slow.duration - 10.0).abs() < EPS);
        assert!((fast.duration - 5.0).abs() < EPS);
    }
}
