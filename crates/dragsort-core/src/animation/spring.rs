#![forbid(unsafe_code)]

//! Damped spring driving one animated row property.
//!
//! Vertical offset, scale and shadow elevation each get their own
//! [`Spring`]. The force on a spring is
//!
//!   a = -stiffness * (value - goal) - damping * velocity
//!
//! integrated with semi-implicit Euler in steps of at most 4ms.
//!
//! # Invariants
//!
//! 1. A settled spring does not move until [`Spring::retarget`] or
//!    [`Spring::jump_to`] changes it.
//! 2. [`Spring::jump_to`] moves value and goal together and leaves the
//!    spring settled with zero velocity.
//! 3. A spring settles exactly on its goal, never near it.
//!
//! # Failure Modes
//!
//! - A stalled frame loop handing in seconds of `dt` is subdivided, so the
//!   spring lands instead of exploding.
//! - Zero damping oscillates forever and never settles.

use std::time::Duration;

use super::Animation;

/// Largest integration step, in seconds.
const STEP_SECS: f64 = 0.004;

/// Velocity below which a spring inside its rest threshold may settle.
const SETTLE_VELOCITY: f64 = 0.01;

const MIN_STIFFNESS: f64 = 0.1;

/// Tuning shared by the springs of one row property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    /// Distance from the goal at which the spring may settle. Pixel
    /// offsets want about 0.01, scale factors far less.
    pub rest_threshold: f64,
}

impl SpringParams {
    /// Critically damped (`damping = 2 * sqrt(stiffness)`): rows glide into
    /// place without overshooting.
    #[must_use]
    pub fn critical(stiffness: f64) -> Self {
        let stiffness = stiffness.max(MIN_STIFFNESS);
        Self {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
            rest_threshold: 0.001,
        }
    }

    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    #[must_use]
    pub fn with_rest_threshold(mut self, rest_threshold: f64) -> Self {
        self.rest_threshold = rest_threshold;
        self
    }

    fn clamped(self) -> Self {
        Self {
            stiffness: self.stiffness.max(MIN_STIFFNESS),
            damping: self.damping.max(0.0),
            rest_threshold: self.rest_threshold.abs(),
        }
    }
}

impl Default for SpringParams {
    fn default() -> Self {
        Self::critical(170.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    velocity: f64,
    goal: f64,
    params: SpringParams,
    settled: bool,
}

impl Spring {
    /// Spring settled at `value`.
    #[must_use]
    pub fn at(value: f64, params: SpringParams) -> Self {
        Self {
            value,
            velocity: 0.0,
            goal: value,
            params: params.clamped(),
            settled: true,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[must_use]
    pub fn goal(&self) -> f64 {
        self.goal
    }

    #[must_use]
    pub fn params(&self) -> SpringParams {
        self.params
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Head for `goal`. Moves within the rest threshold are dropped.
    pub fn retarget(&mut self, goal: f64) {
        if (goal - self.goal).abs() > self.params.rest_threshold {
            self.goal = goal;
            self.settled = false;
        }
    }

    /// Skip interpolation: land on `value` now and stay there.
    pub fn jump_to(&mut self, value: f64) {
        self.value = value;
        self.goal = value;
        self.velocity = 0.0;
        self.settled = true;
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.settled {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let h = remaining.min(STEP_SECS);
            let accel = -self.params.stiffness * (self.value - self.goal)
                - self.params.damping * self.velocity;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        let close = (self.value - self.goal).abs() < self.params.rest_threshold;
        if close && self.velocity.abs() < SETTLE_VELOCITY {
            self.jump_to(self.goal);
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);

    fn pixel() -> SpringParams {
        SpringParams::default().with_rest_threshold(0.01)
    }

    fn frames(spring: &mut Spring, n: usize) {
        for _ in 0..n {
            spring.tick(FRAME);
        }
    }

    #[test]
    fn default_tuning_is_critical() {
        let params = SpringParams::default();
        assert_eq!(params.stiffness, 170.0);
        assert!((params.damping - 2.0 * 170.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn glides_to_row_without_overshoot() {
        let mut spring = Spring::at(0.0, pixel());
        spring.retarget(120.0);
        let mut peak = 0.0_f64;
        for _ in 0..300 {
            spring.tick(FRAME);
            peak = peak.max(spring.value());
        }
        assert!(spring.is_complete(), "value {}", spring.value());
        assert_eq!(spring.value(), 120.0);
        assert!(peak <= 120.5, "overshoot to {peak}");
    }

    #[test]
    fn one_frame_moves_part_way() {
        let mut spring = Spring::at(0.0, pixel());
        spring.retarget(40.0);
        spring.tick(FRAME);
        assert!(spring.value() > 0.0 && spring.value() < 40.0);
    }

    #[test]
    fn jump_lands_and_settles() {
        let mut spring = Spring::at(0.0, pixel());
        spring.retarget(100.0);
        spring.tick(FRAME);
        spring.jump_to(37.5);
        assert_eq!(spring.value(), 37.5);
        assert_eq!(spring.goal(), 37.5);
        assert_eq!(spring.velocity(), 0.0);
        assert!(spring.is_settled());
    }

    #[test]
    fn settled_spring_ignores_time() {
        let mut spring = Spring::at(8.0, pixel());
        spring.advance(Duration::from_secs(10));
        assert_eq!(spring.value(), 8.0);
    }

    #[test]
    fn tiny_retarget_is_dropped() {
        let mut spring = Spring::at(1.0, pixel());
        spring.retarget(1.005);
        assert!(spring.is_settled());
        assert_eq!(spring.goal(), 1.0);
        spring.retarget(2.0);
        assert!(!spring.is_settled());
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut spring = Spring::at(0.0, pixel());
        spring.retarget(1.0);
        spring.tick(Duration::ZERO);
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn stalled_frame_still_lands() {
        let mut spring = Spring::at(0.0, SpringParams::default());
        spring.retarget(1.0);
        spring.tick(Duration::from_secs(5));
        assert!((spring.value() - 1.0).abs() < 0.01);
    }

    #[test]
    fn latest_goal_wins() {
        let mut spring = Spring::at(0.0, pixel());
        spring.retarget(80.0);
        frames(&mut spring, 5);
        spring.retarget(0.0);
        frames(&mut spring, 400);
        assert!(spring.is_complete());
        assert_eq!(spring.value(), 0.0);
    }

    #[test]
    fn nonsense_params_are_clamped() {
        let params = SpringParams {
            stiffness: -4.0,
            damping: -1.0,
            rest_threshold: -0.2,
        };
        let spring = Spring::at(0.0, params);
        assert_eq!(spring.params().stiffness, MIN_STIFFNESS);
        assert_eq!(spring.params().damping, 0.0);
        assert_eq!(spring.params().rest_threshold, 0.2);
    }

    #[test]
    fn undamped_spring_never_settles() {
        let mut spring = Spring::at(0.0, pixel().with_damping(0.0));
        spring.retarget(10.0);
        frames(&mut spring, 600);
        assert!(!spring.is_settled());
    }
}
