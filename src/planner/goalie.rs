//! Goalie policy
//!
//! With the ball the goalie may catch it, run with it while the hold
//! countdown lasts, and finally pass or clear. Without it the goalie only
//! leaves its line for balls that will be reached inside the penalty area.

use tracing::debug;

use crate::game::geometry::{distance, polar_dir, Vec2};
use crate::game::params::SimParams;
use crate::game::physics::Kinematics;
use crate::game::world::WorldState;

use super::action::Action;
use super::{intercept_pursuer, positioning, possession, Planner};

/// Catch when more than one opponent is within this radius...
const CROWD_RADIUS: f64 = 20.0;
/// ...or any opponent is within this one
const DANGER_RADIUS: f64 = 10.0;
/// Inner margin of the penalty area the goalie keeps while holding the ball
const HOLD_MARGIN: f64 = 2.0;

pub fn decide(planner: &mut Planner, world: &mut WorldState) -> Action {
    if world.is_ball_controlled_by_me() {
        with_ball(planner, world)
    } else {
        without_ball(planner.params(), world)
    }
}

fn with_ball(planner: &mut Planner, world: &mut WorldState) -> Action {
    let params = *planner.params();

    if should_catch(world) {
        debug!(steps = params.max_grabbed_steps, "goalie caught the ball");
        world.hold_mut().arm(params.max_grabbed_steps);
        return Action::Grab;
    }

    if world.hold().is_held() {
        let action = move_with_ball_or_kick(planner, world);
        world.hold_mut().tick();
        return action;
    }

    planner.possession(world)
}

/// Catch an inbound ball when opponents are crowding the goalie
fn should_catch(world: &WorldState) -> bool {
    if polar_dir(&world.ball_velocity()).abs() < 90.0 {
        return false;
    }
    if world.hold().is_held() {
        return false;
    }

    let me = world.me().position;
    world.count_opponents_within(&me, CROWD_RADIUS) > 1
        || world.count_opponents_within(&me, DANGER_RADIUS) > 0
}

fn move_with_ball_or_kick(planner: &Planner, world: &mut WorldState) -> Action {
    let params = planner.params();
    let me = world.me().position;

    if !params.field.in_penalty_area(&me, -HOLD_MARGIN) {
        world.hold_mut().expire();
    } else if world.hold().steps_left() > 1 {
        return Action::MoveWithBall {
            destination: emptier_corner(world, params),
        };
    }

    possession::pass_or_clear(world, params, planner.pass_directions())
}

/// Far penalty-area corner with fewer opponents around; bottom on a tie
fn emptier_corner(world: &WorldState, params: &SimParams) -> Vec2 {
    let (top, bottom) = params.field.own_penalty_corners();
    let radius = params.field.width;
    if world.count_opponents_within(&top, radius) < world.count_opponents_within(&bottom, radius) {
        top
    } else {
        bottom
    }
}

fn without_ball(params: &SimParams, world: &WorldState) -> Action {
    let ball = world.ball();
    let pursuer = intercept_pursuer(world);
    let intercept = Kinematics::predict_intercept_position(
        ball.position,
        world.ball_velocity(),
        &pursuer,
        &params.physics,
    );

    if world.am_nearest_teammate() && params.field.in_own_penalty_area(&intercept) {
        debug!(
            dist = distance(&world.me().position, &intercept),
            "goalie coming out"
        );
        return Action::Chase { target: intercept };
    }

    positioning::position(world, params)
}
