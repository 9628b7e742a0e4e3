//! What to do with the ball at one's feet
//!
//! Options are tried in a fixed order and the first that applies wins:
//! shoot, pass, dribble fast, dribble slow, hold, clear.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::game::geometry::{direction, distance, normalize_dir};
use crate::game::params::SimParams;
use crate::game::world::WorldState;

use super::action::{Action, MAX_FORCE};
use super::passing::should_i_pass;

/// Shoot only from closer than this to the goal center
const SHOOT_RANGE: f64 = 20.0;
/// ...and not from beyond this X (too close to the goal line)
const SHOOT_MAX_X: f64 = 48.0;

/// Dribbling needs no opponent within this radius
const DRIBBLE_CLEARANCE: f64 = 5.0;
/// Kick force of a self-pass
const DRIBBLE_FORCE: f64 = 20.0;
/// Total spread in degrees of the random dribble deviation
const DRIBBLE_SPREAD: f64 = 30.0;

/// Run the full ball-possession policy
pub fn decide(
    world: &WorldState,
    params: &SimParams,
    pass_directions: u32,
    rng: &mut ChaCha8Rng,
) -> Action {
    if let Some(action) = shoot(world, params) {
        return action;
    }
    if let Some(action) = pass(world, params, pass_directions) {
        return action;
    }
    if let Some(action) = dribble_fast(world, params, rng) {
        return action;
    }
    if let Some(action) = dribble_slow(world) {
        return action;
    }
    if let Some(action) = hold(world) {
        return action;
    }
    clear(world, params)
}

/// Pass if possible, otherwise clear
pub fn pass_or_clear(world: &WorldState, params: &SimParams, pass_directions: u32) -> Action {
    pass(world, params, pass_directions).unwrap_or_else(|| clear(world, params))
}

/// Shoot at the post away from the opponent goalkeeper
pub fn shoot(world: &WorldState, params: &SimParams) -> Option<Action> {
    let me = world.me().position;
    let goal = params.field.opponent_goal();

    if distance(&me, &goal) >= SHOOT_RANGE || me.x >= SHOOT_MAX_X {
        return None;
    }

    let (high_post, low_post) = params.field.opponent_posts();
    // The goalkeeper is the first opponent listed
    let keeper_y = world
        .opponents()
        .first()
        .map(|p| p.position.y)
        .unwrap_or(0.0);

    let target = if keeper_y == 0.0 {
        if me.y <= 0.0 {
            low_post
        } else {
            high_post
        }
    } else if keeper_y > 0.0 {
        low_post
    } else {
        high_post
    };

    let dir = direction(&me, &target);
    debug!(dist = distance(&me, &goal), dir, "shooting at goal");
    Some(Action::Shoot {
        direction: dir,
        force: MAX_FORCE,
    })
}

pub fn pass(world: &WorldState, params: &SimParams, pass_directions: u32) -> Option<Action> {
    let choice = should_i_pass(world, pass_directions, params)?;
    debug!(dir = choice.direction, risk = choice.risk, "passing");
    Some(Action::Pass {
        direction: choice.direction,
        force: MAX_FORCE,
    })
}

/// Kick the ball a short way toward the opponent goal and run after it
pub fn dribble_fast(world: &WorldState, params: &SimParams, rng: &mut ChaCha8Rng) -> Option<Action> {
    if world.is_goalie() {
        return None;
    }
    let me = world.me().position;
    if world.count_opponents_within(&me, DRIBBLE_CLEARANCE) > 0 {
        return None;
    }

    let to_goal = direction(&me, &params.field.opponent_goal());
    let deviation = (rng.gen::<f64>() - 0.5) * DRIBBLE_SPREAD;
    let dir = normalize_dir(to_goal + deviation);
    debug!(dir, "dribbling");
    Some(Action::Pass {
        direction: dir,
        force: DRIBBLE_FORCE,
    })
}

/// Slow dribble under pressure; never chosen yet
pub fn dribble_slow(_world: &WorldState) -> Option<Action> {
    None
}

/// Shielding the ball; never chosen yet
pub fn hold(_world: &WorldState) -> Option<Action> {
    None
}

/// Full-force kick at the opponent goal center
pub fn clear(world: &WorldState, params: &SimParams) -> Action {
    let dir = direction(&world.me().position, &params.field.opponent_goal());
    debug!(dir, "clearing the ball");
    Action::Shoot {
        direction: dir,
        force: MAX_FORCE,
    }
}
