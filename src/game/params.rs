//! Simulation parameters
//!
//! One immutable value object built at startup and handed to every
//! component by reference. The numbers must match the server; if they do
//! not, predictions drift but nothing fails.

use crate::util::time::SIM_STEP_SECONDS;

use super::geometry::Vec2;

/// Pitch geometry in meters (canonical frame, own goal at -X)
#[derive(Debug, Clone, Copy)]
pub struct FieldParams {
    pub length: f64,
    pub width: f64,
    pub goal_width: f64,
    pub penalty_width: f64,
    pub penalty_depth: f64,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            length: 100.0,
            width: 65.0,
            goal_width: 8.0,
            penalty_width: 40.0,
            penalty_depth: 16.0,
        }
    }
}

impl FieldParams {
    pub fn half_length(&self) -> f64 {
        self.length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn opponent_goal(&self) -> Vec2 {
        Vec2::new(self.half_length(), 0.0)
    }

    /// Upper and lower posts of the opponent goal, aimed at when shooting
    pub fn opponent_posts(&self) -> (Vec2, Vec2) {
        let post = self.goal_width / 2.0 - 1.0;
        (
            Vec2::new(self.half_length(), post),
            Vec2::new(self.half_length(), -post),
        )
    }

    /// Far corners (top, bottom) of the own penalty area
    pub fn own_penalty_corners(&self) -> (Vec2, Vec2) {
        let x = -self.half_length() + self.penalty_depth;
        let y = self.penalty_width / 2.0;
        (Vec2::new(x, y), Vec2::new(x, -y))
    }

    /// True if `pos` lies on the pitch
    pub fn contains(&self, pos: &Vec2) -> bool {
        pos.x.abs() <= self.half_length() && pos.y.abs() <= self.half_width()
    }

    /// True if `pos` is strictly inside the own penalty area
    pub fn in_own_penalty_area(&self, pos: &Vec2) -> bool {
        self.in_penalty_area(pos, 0.0)
    }

    /// Own penalty area test with a margin (negative shrinks the area)
    pub fn in_penalty_area(&self, pos: &Vec2, margin: f64) -> bool {
        if pos.x >= 0.0 {
            return false;
        }
        let depth_ok = self.half_length() + pos.x < self.penalty_depth + margin;
        let width_ok = pos.y.abs() < self.penalty_width / 2.0 + margin;
        depth_ok && width_ok && pos.x.abs() <= self.half_length()
    }
}

/// Ball and player dynamics, velocities in meters per step
#[derive(Debug, Clone, Copy)]
pub struct PhysicsParams {
    /// Simulation step in seconds
    pub step_seconds: f64,
    /// Ball-player distance under which the player controls the ball
    pub control_range: f64,
    /// Maximum ball speed (m/s)
    pub ball_max_speed: f64,
    /// Fraction of ball velocity lost each step
    pub friction: f64,
    /// Player maximum speed (m/s)
    pub player_max_speed: f64,
    /// Seconds a player needs to reach full speed without friction
    pub time_to_max_speed: f64,
    pub max_dash_force: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            step_seconds: SIM_STEP_SECONDS,
            control_range: 1.5,
            ball_max_speed: 23.0,
            friction: 0.065,
            player_max_speed: 7.5,
            time_to_max_speed: 1.0,
            max_dash_force: 100.0,
        }
    }
}

impl PhysicsParams {
    /// Dash force to acceleration factor
    pub fn k1(&self) -> f64 {
        self.player_max_speed * self.step_seconds * self.step_seconds
            / self.time_to_max_speed
            / self.max_dash_force
    }

    /// Player running friction factor
    pub fn k2(&self) -> f64 {
        self.max_dash_force / (self.player_max_speed * self.step_seconds) * self.k1()
    }

    /// Distance a full-force kick moves the ball in its first step
    pub fn ball_step_speed(&self) -> f64 {
        self.ball_max_speed * self.step_seconds
    }
}

/// Everything the agent knows about the simulated world's rules
#[derive(Debug, Clone, Copy)]
pub struct SimParams {
    pub field: FieldParams,
    pub physics: PhysicsParams,
    /// Steps a goalie may hold the ball; overridden by the server at init
    pub max_grabbed_steps: u32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            field: FieldParams::default(),
            physics: PhysicsParams::default(),
            max_grabbed_steps: 70,
        }
    }
}

impl SimParams {
    /// Apply the server's grab limit; negative values clamp to zero
    pub fn with_max_grabbed_steps(mut self, steps: i32) -> Self {
        self.max_grabbed_steps = steps.max(0) as u32;
        self
    }
}
