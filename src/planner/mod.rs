//! Decision planner
//!
//! One [`Action`] per cycle from the current [`WorldState`]. Dispatch is by
//! role; field players and the goalie share the ball-possession policy and
//! off-ball positioning.

pub mod action;
pub mod goalie;
pub mod passing;
pub mod positioning;
pub mod possession;

pub use action::Action;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::game::params::SimParams;
use crate::game::physics::{Kinematics, Pursuer};
use crate::game::world::WorldState;
use crate::net::protocol::Period;

use action::chase_force;

/// Per-agent planner
#[derive(Debug, Clone)]
pub struct Planner {
    params: SimParams,
    /// Candidate directions sampled by the pass evaluator
    pass_directions: u32,
    /// Dribble deviation stream
    rng: ChaCha8Rng,
}

impl Planner {
    pub fn new(params: SimParams, pass_directions: u32, seed: u64) -> Self {
        Self {
            params,
            pass_directions,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn pass_directions(&self) -> u32 {
        self.pass_directions
    }

    /// Apply the server's goalie hold limit
    pub fn set_max_grabbed_steps(&mut self, steps: i32) {
        self.params = self.params.with_max_grabbed_steps(steps);
    }

    /// Decide this cycle's action
    pub fn plan(&mut self, world: &mut WorldState) -> Action {
        let action = if world.period() == Period::NoGame {
            Action::NoAction
        } else if world.is_goalie() {
            goalie::decide(self, world)
        } else {
            self.field_player(world)
        };

        // Any kick lets go of a held ball
        if action.is_kick() {
            world.hold_mut().release();
        }

        action
    }

    fn field_player(&mut self, world: &WorldState) -> Action {
        if world.is_ball_controlled_by_me() {
            return self.possession(world);
        }

        if world.am_nearest_teammate() {
            if world.team_is_offside() || world.ball().grabbed {
                return Action::Move {
                    destination: positioning::destination(world, &self.params),
                };
            }
            return chase(world, &self.params);
        }

        positioning::position(world, &self.params)
    }

    fn possession(&mut self, world: &WorldState) -> Action {
        possession::decide(world, &self.params, self.pass_directions, &mut self.rng)
    }
}

/// This agent as a pursuer of the ball, starting from its current motion
fn intercept_pursuer(world: &WorldState) -> Pursuer {
    let me = world.me();
    Pursuer {
        position: me.position,
        velocity: world.my_velocity(),
        facing: Some(me.direction),
        force: chase_force(world.distance_to_ball()),
    }
}

/// Run to where the ball can be reached first
fn chase(world: &WorldState, params: &SimParams) -> Action {
    let target = Kinematics::predict_intercept_position(
        world.ball().position,
        world.ball_velocity(),
        &intercept_pursuer(world),
        &params.physics,
    );
    Action::Chase { target }
}
