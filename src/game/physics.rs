//! Ball and player kinematics prediction
//!
//! Discrete-time rollouts of the server's motion model: the ball decays by
//! `(1 - friction)` each step, a running player accelerates as
//! `a = force * (cos, sin)(dir) * K1 - v * K2`. All velocities are in meters
//! per simulation step.

use super::geometry::{direction, distance, polar, Vec2};
use super::params::PhysicsParams;

/// Ball speed (m/step) below which the ball is considered at rest
const BALL_REST_SPEED: f64 = 0.1;

/// Upper bound on rest-position iterations; friction converges long before
const MAX_REST_STEPS: u32 = 10_000;

/// Steps simulated when estimating intercept time
pub const INTERCEPT_TIME_HORIZON: u32 = 150;

/// Steps simulated when estimating the intercept point
pub const INTERCEPT_POSITION_HORIZON: u32 = 100;

/// A player running after the ball
#[derive(Debug, Clone, Copy)]
pub struct Pursuer {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Heading used for the first step's acceleration; `None` starts at rest
    pub facing: Option<f64>,
    /// Dash force applied every step
    pub force: f64,
}

impl Pursuer {
    /// A pursuer standing still
    pub fn standing(position: Vec2, force: f64) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            facing: None,
            force,
        }
    }
}

/// Kinematics predictor (stateless)
pub struct Kinematics;

impl Kinematics {
    /// Player acceleration when dashing with `force` toward `dir` degrees
    pub fn acceleration(force: f64, dir: f64, velocity: &Vec2, params: &PhysicsParams) -> Vec2 {
        polar(force * params.k1(), dir) - velocity * params.k2()
    }

    /// Where a free-rolling ball comes to rest
    pub fn predict_ball_rest_position(
        ball_pos: Vec2,
        ball_vel: Vec2,
        params: &PhysicsParams,
    ) -> Vec2 {
        let mut pos = ball_pos;
        let mut vel = ball_vel;
        let mut steps = 0;

        while vel.norm() > BALL_REST_SPEED && steps < MAX_REST_STEPS {
            pos += vel;
            vel *= 1.0 - params.friction;
            steps += 1;
        }

        pos
    }

    /// Steps until the pursuer is within control range of the ball, or
    /// [`INTERCEPT_TIME_HORIZON`] if it never gets there
    pub fn predict_intercept_time(
        ball_pos: Vec2,
        ball_vel: Vec2,
        pursuer: &Pursuer,
        params: &PhysicsParams,
    ) -> u32 {
        Self::rollout(ball_pos, ball_vel, pursuer, INTERCEPT_TIME_HORIZON, params)
            .map(|(step, _)| step)
            .unwrap_or(INTERCEPT_TIME_HORIZON)
    }

    /// Predicted ball position when the pursuer first reaches it; the ball's
    /// rest position if that does not happen within the horizon
    pub fn predict_intercept_position(
        ball_pos: Vec2,
        ball_vel: Vec2,
        pursuer: &Pursuer,
        params: &PhysicsParams,
    ) -> Vec2 {
        Self::rollout(ball_pos, ball_vel, pursuer, INTERCEPT_POSITION_HORIZON, params)
            .map(|(_, point)| point)
            .unwrap_or_else(|| Self::predict_ball_rest_position(ball_pos, ball_vel, params))
    }

    /// Pure-pursuit rollout: each step the pursuer re-aims at the ball's
    /// current predicted position
    fn rollout(
        ball_pos: Vec2,
        ball_vel: Vec2,
        pursuer: &Pursuer,
        horizon: u32,
        params: &PhysicsParams,
    ) -> Option<(u32, Vec2)> {
        let mut ball_pos = ball_pos;
        let mut ball_vel = ball_vel;

        let mut pos = pursuer.position;
        let mut vel = pursuer.velocity;
        let mut acc = pursuer
            .facing
            .map(|dir| Self::acceleration(pursuer.force, dir, &vel, params))
            .unwrap_or_else(Vec2::zeros);

        for step in 0..horizon {
            ball_pos += ball_vel;
            ball_vel *= 1.0 - params.friction;

            let dir_to_ball = direction(&pos, &ball_pos);

            pos += vel;
            vel += acc;
            acc = Self::acceleration(pursuer.force, dir_to_ball, &vel, params);

            if distance(&pos, &ball_pos) < params.control_range {
                return Some((step, ball_pos));
            }
        }

        None
    }
}
