//! Off-ball positioning
//!
//! Outside active play everyone walks back to the formation home. During
//! play the destination blends the role's reference point with the ball.

use crate::game::geometry::{angle_between, direction, distance, Vec2};
use crate::game::params::SimParams;
use crate::game::world::{Possession, WorldState};

use super::action::Action;

/// Share of the ball position in the blended destination
const BALL_WEIGHT: f64 = 0.3;
/// Scales the ball's X pull for the goalie
const GOALIE_DAMPING: f64 = 0.33;

/// Home counts as reached within this distance
const HOME_TOLERANCE: f64 = 1.5;
/// Facing counts as on target within this many degrees
const FACING_TOLERANCE: f64 = 5.0;

/// Blend of the possession-dependent reference point and the ball
pub fn destination(world: &WorldState, params: &SimParams) -> Vec2 {
    let targets = world.targets();
    let reference = match world.possession() {
        Possession::Own => targets.offense,
        Possession::Opponent => targets.defense,
        Possession::Neutral => targets.home,
    };

    let ball = world.ball().position;
    let g = if world.is_goalie() { GOALIE_DAMPING } else { 1.0 };

    let x = ball.x * BALL_WEIGHT * g + reference.x * (1.0 - BALL_WEIGHT * g);
    let mut y = ball.y * BALL_WEIGHT + reference.y * (1.0 - BALL_WEIGHT);

    if world.is_goalie() {
        let limit = params.field.penalty_width / 2.0;
        y = y.clamp(-limit, limit);
    }

    Vec2::new(x, y)
}

/// Action for an agent not acting on the ball. Field players settle the
/// nearest-teammate chase before getting here, so the restart chase is
/// taken by a goalie whose intercept lies outside the penalty area.
pub fn position(world: &WorldState, params: &SimParams) -> Action {
    let mode = world.mode();

    if !world.period().is_playing() || mode.is_kick_off() {
        return back_home(world);
    }

    if mode.is_restart()
        && world.am_nearest_teammate()
        && world.side_to_continue() == Some(world.side())
    {
        return super::chase(world, params);
    }

    Action::Move {
        destination: destination(world, params),
    }
}

/// Walk home, then face the ball
fn back_home(world: &WorldState) -> Action {
    let me = world.me();
    let home = world.targets().home;

    if distance(&me.position, &home) > HOME_TOLERANCE {
        return Action::Move { destination: home };
    }

    let to_ball = direction(&me.position, &world.ball().position);
    if angle_between(me.direction, to_ball) > FACING_TOLERANCE {
        Action::Turn { direction: to_ball }
    } else {
        Action::NoAction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::tests::{perception, report, targets};
    use crate::planner::Planner;
    use crate::net::protocol::{GameMode, Period, PlayerRef, PlayerReport, RefereeCall, Side};

    fn world(goalie: bool, me: PlayerReport, ball: Vec2, call: RefereeCall) -> WorldState {
        let mut world = WorldState::new(
            PlayerRef {
                side: Side::Left,
                id: me.id,
            },
            goalie,
            targets(),
            None,
        );
        world.apply_referee(&call);
        world.apply_perception(&perception(me, vec![], vec![], ball));
        world
    }

    fn call(period: Period, mode: GameMode, side: Option<Side>) -> RefereeCall {
        RefereeCall {
            period,
            mode,
            side_to_continue: side,
        }
    }

    #[test]
    fn walks_home_before_kick_off() {
        let w = world(
            false,
            report(Side::Left, 4, 0.0, 0.0),
            Vec2::zeros(),
            call(Period::PreGame, GameMode::BeforeKickOff, None),
        );
        assert_eq!(
            position(&w, &SimParams::default()),
            Action::Move {
                destination: targets().home
            }
        );
    }

    #[test]
    fn turns_to_ball_once_home() {
        let home = targets().home;
        let mut me = report(Side::Left, 4, home.x, home.y);
        me.direction = 90.0;
        let w = world(
            false,
            me.clone(),
            Vec2::new(home.x + 10.0, home.y),
            call(Period::FirstHalf, GameMode::KickOff(Side::Left), None),
        );
        match position(&w, &SimParams::default()) {
            Action::Turn { direction } => assert!(direction.abs() < 1e-9),
            other => panic!("expected a turn, got {:?}", other),
        }

        me.direction = 2.0;
        let w = world(
            false,
            me,
            Vec2::new(home.x + 10.0, home.y),
            call(Period::FirstHalf, GameMode::KickOff(Side::Left), None),
        );
        assert_eq!(position(&w, &SimParams::default()), Action::NoAction);
    }

    #[test]
    fn neutral_blend_pulls_toward_ball() {
        let w = world(
            false,
            report(Side::Left, 4, -30.0, 0.0),
            Vec2::new(10.0, -10.0),
            call(Period::FirstHalf, GameMode::PlayOn, None),
        );
        let home = targets().home;
        let dest = destination(&w, &SimParams::default());
        assert!((dest.x - (10.0 * 0.3 + home.x * 0.7)).abs() < 1e-9);
        assert!((dest.y - (-10.0 * 0.3 + home.y * 0.7)).abs() < 1e-9);
    }

    #[test]
    fn goalie_drifts_less_and_stays_in_box_width() {
        let w = world(
            true,
            report(Side::Left, 1, -48.0, 0.0),
            Vec2::new(40.0, 30.0),
            call(Period::FirstHalf, GameMode::PlayOn, None),
        );
        let home = targets().home;
        let dest = destination(&w, &SimParams::default());
        let g = 0.3 * 0.33;
        assert!((dest.x - (40.0 * g + home.x * (1.0 - g))).abs() < 1e-9);
        // 30 * 0.3 + 20 * 0.7 = 23 exceeds the 20 m half-width
        assert_eq!(dest.y, 20.0);
    }

    #[test]
    fn goalie_takes_own_restart_outside_box() {
        let mut planner = Planner::new(SimParams::default(), 180, 1);

        let mut w = world(
            true,
            report(Side::Left, 1, -20.0, 20.0),
            Vec2::new(-15.0, 30.0),
            call(Period::FirstHalf, GameMode::ThrowIn(Side::Left), Some(Side::Left)),
        );
        assert!(matches!(planner.plan(&mut w), Action::Chase { .. }));

        let mut w = world(
            true,
            report(Side::Left, 1, -20.0, 20.0),
            Vec2::new(-15.0, 30.0),
            call(Period::FirstHalf, GameMode::ThrowIn(Side::Right), Some(Side::Right)),
        );
        assert!(matches!(planner.plan(&mut w), Action::Move { .. }));
    }
}
