//! Pass direction scoring
//!
//! Candidate directions are sampled around the full circle. A direction is
//! viable only if opponents along it are far from the ball's path; among
//! viable ones the lowest risk wins, with forward passes rewarded.

use crate::game::geometry::{direction, distance, normalize_dir, polar, Vec2};
use crate::game::params::SimParams;
use crate::game::physics::{Kinematics, Pursuer};
use crate::game::snapshot::Player;
use crate::game::world::WorldState;
use crate::net::protocol::PlayerRef;

use super::action::chase_force;

/// Half-width in degrees of the corridor searched for opponents
const OPPONENT_CORRIDOR: f64 = 12.0;
/// Half-width in degrees of the corridor searched for teammates
const TEAMMATE_CORRIDOR: f64 = 1.0;

/// Players closer than this to the ball block a corridor outright
const BLOCKER_DISTANCE: f64 = 9.0;
/// Players farther than this are ignored
const CORRIDOR_REACH: f64 = 40.0;
/// Intercept time credited to an empty corridor
const CLEAR_CORRIDOR_STEPS: u32 = 200;

/// Opponent value a direction must exceed to be considered
const MIN_OPPONENT_VALUE: f64 = 1900.0;
/// Best risk above this means no pass is worth making
const MAX_PASS_RISK: f64 = 250.0;
/// Starting point for the risk minimum
const RISK_CEILING: f64 = 100_000.0;
/// Added to directions whose lookahead point leaves the pitch
const OFF_FIELD_PENALTY: f64 = 55_500.0;
/// Weight of the forward-direction bonus
const FORWARD_BONUS: f64 = 1000.0;

/// Lookahead offsets (X, Y) used to detect passes off the pitch
const LOOKAHEAD_X: f64 = 10.0;
const LOOKAHEAD_Y: f64 = 15.0;

/// Winning pass direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassChoice {
    pub direction: f64,
    pub risk: f64,
}

/// A pass line searched for players
#[derive(Debug, Clone, Copy)]
pub struct Corridor {
    /// Passer position; angles and distances are measured from here
    pub origin: Vec2,
    /// Where the kicked ball starts rolling
    pub ball: Vec2,
    pub direction: f64,
    pub half_width: f64,
    /// Dash force assumed for players running onto the pass
    pub force: f64,
}

/// How clear the corridor is of `players`: twice the mean plus ten times
/// the best intercept time of those within `half_width` degrees of the
/// line. A player within the blocker distance zeroes the value.
pub fn corridor_value<'a>(
    corridor: &Corridor,
    me: PlayerRef,
    players: impl IntoIterator<Item = &'a Player>,
    params: &SimParams,
) -> f64 {
    let origin = &corridor.origin;
    let dir = corridor.direction;
    let ball_vel = polar(params.physics.ball_step_speed(), dir);

    let mut best = CLEAR_CORRIDOR_STEPS;
    let mut sum = 0u32;
    let mut count = 0u32;

    for player in players {
        if player.identity() == me {
            continue;
        }
        if normalize_dir(direction(origin, &player.position) - dir).abs() >= corridor.half_width {
            continue;
        }

        let dist = distance(origin, &player.position);
        if dist < BLOCKER_DISTANCE {
            best = 0;
            count = 1;
            sum = 0;
            break;
        }
        if dist < CORRIDOR_REACH {
            let pursuer = Pursuer::standing(player.position, corridor.force);
            let t = Kinematics::predict_intercept_time(corridor.ball, ball_vel, &pursuer, &params.physics);
            sum += t;
            count += 1;
            best = best.min(t);
        }
    }

    let mean = if count > 0 {
        sum / count
    } else {
        CLEAR_CORRIDOR_STEPS
    };

    2.0 * mean as f64 + 10.0 * best as f64
}

/// Pick the least risky pass over `samples` directions, if any is good enough
pub fn should_i_pass(world: &WorldState, samples: u32, params: &SimParams) -> Option<PassChoice> {
    if samples == 0 {
        return None;
    }

    let me = world.me();
    let me_ref = world.me_ref();
    let ball = world.ball().position;
    let force = chase_force(world.distance_to_ball());

    let mut best: Option<PassChoice> = None;
    let mut min_risk = RISK_CEILING;

    for i in 0..samples {
        let dir = normalize_dir(i as f64 * 360.0 / samples as f64);
        let rad = dir.to_radians();

        let lookahead = Vec2::new(
            me.position.x + LOOKAHEAD_X * rad.cos(),
            me.position.y + LOOKAHEAD_Y * rad.sin(),
        );
        let penalty = if params.field.contains(&lookahead) {
            0.0
        } else {
            OFF_FIELD_PENALTY
        };

        let mut corridor = Corridor {
            origin: me.position,
            ball,
            direction: dir,
            half_width: OPPONENT_CORRIDOR,
            force,
        };
        let opponent_value = corridor_value(&corridor, me_ref, world.opponents(), params);
        if opponent_value <= MIN_OPPONENT_VALUE {
            continue;
        }

        corridor.half_width = TEAMMATE_CORRIDOR;
        let teammate_value = corridor_value(&corridor, me_ref, world.snapshot().teammates(), params);

        let forward = -0.5 + (180.0 - dir.abs()) / 180.0;
        let risk = teammate_value + penalty - FORWARD_BONUS * forward;

        if risk < min_risk {
            min_risk = risk;
            best = Some(PassChoice {
                direction: dir,
                risk,
            });
        }
    }

    best.filter(|choice| choice.risk <= MAX_PASS_RISK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::tests::{perception, report, targets};
    use crate::net::protocol::{PlayerReport, Side};

    fn world(me: PlayerReport, own: Vec<PlayerReport>, their: Vec<PlayerReport>, ball: Vec2) -> WorldState {
        let mut world = WorldState::new(me_ref(me.id), false, targets(), None);
        world.apply_perception(&perception(me, own, their, ball));
        world
    }

    fn corridor(direction: f64, half_width: f64) -> Corridor {
        Corridor {
            origin: Vec2::zeros(),
            ball: Vec2::zeros(),
            direction,
            half_width,
            force: 100.0,
        }
    }

    fn me_ref(id: u8) -> PlayerRef {
        PlayerRef {
            side: Side::Left,
            id,
        }
    }

    #[test]
    fn empty_corridor_is_fully_clear() {
        let players: Vec<Player> = Vec::new();
        let value = corridor_value(&corridor(0.0, 12.0), me_ref(1), &players, &SimParams::default());
        assert_eq!(value, 2400.0);
    }

    #[test]
    fn close_player_blocks_corridor() {
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![],
            vec![report(Side::Right, 3, 5.0, 0.0), report(Side::Right, 4, 30.0, 0.0)],
            Vec2::zeros(),
        );
        let value = corridor_value(&corridor(0.0, 12.0), me_ref(5), w.opponents(), &SimParams::default());
        assert_eq!(value, 0.0);

        // Off the corridor the same players do not count
        let value = corridor_value(&corridor(90.0, 12.0), me_ref(5), w.opponents(), &SimParams::default());
        assert_eq!(value, 2400.0);
    }

    #[test]
    fn distant_player_uses_intercept_time() {
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![],
            vec![report(Side::Right, 3, 20.0, 0.0)],
            Vec2::zeros(),
        );
        let value = corridor_value(&corridor(0.0, 12.0), me_ref(5), w.opponents(), &SimParams::default());
        assert!(value > 0.0 && value < 2400.0);
    }

    #[test]
    fn corridor_skips_self() {
        let w = world(report(Side::Left, 5, 2.0, 0.0), vec![], vec![], Vec2::zeros());
        let value = corridor_value(&corridor(0.0, 1.0), me_ref(5), w.own_team(), &SimParams::default());
        assert_eq!(value, 2400.0);
    }

    #[test]
    fn corridor_is_measured_from_passer() {
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![],
            vec![report(Side::Right, 3, 8.5, 0.0)],
            Vec2::new(-1.0, 0.0),
        );
        let mut line = corridor(0.0, 12.0);
        line.ball = Vec2::new(-1.0, 0.0);
        let value = corridor_value(&line, me_ref(5), w.opponents(), &SimParams::default());
        assert_eq!(value, 0.0);

        // Measured from the ball the same opponent would not block
        line.origin = line.ball;
        let value = corridor_value(&line, me_ref(5), w.opponents(), &SimParams::default());
        assert!(value > 0.0);
    }

    #[test]
    fn receivers_are_timed_at_passer_chase_force() {
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![report(Side::Left, 7, 30.0, 0.0)],
            vec![],
            Vec2::zeros(),
        );
        let mut line = corridor(0.0, 1.0);
        line.force = 50.0;
        let slow = corridor_value(&line, me_ref(5), w.snapshot().teammates(), &SimParams::default());
        assert_eq!(slow, 936.0);

        // Too slow to reach under the risk bound, even straight ahead
        assert_eq!(should_i_pass(&w, 180, &SimParams::default()), None);
    }

    #[test]
    fn no_teammates_means_no_pass() {
        let w = world(report(Side::Left, 5, 0.0, 0.0), vec![], vec![], Vec2::zeros());
        assert_eq!(should_i_pass(&w, 180, &SimParams::default()), None);
    }

    #[test]
    fn forward_teammate_in_open_field_receives_pass() {
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![report(Side::Left, 7, 6.0, 0.0)],
            vec![report(Side::Right, 2, -20.0, 20.0)],
            Vec2::zeros(),
        );
        let choice = should_i_pass(&w, 180, &SimParams::default()).expect("a pass");
        assert_eq!(choice.direction, 0.0);
        assert_eq!(choice.risk, -500.0);
    }

    #[test]
    fn surrounded_player_finds_no_pass() {
        // Opponents every 10 degrees at 4 m cover every 12 degree corridor
        let ring: Vec<PlayerReport> = (0..36)
            .map(|k| {
                let p = polar(4.0, k as f64 * 10.0);
                report(Side::Right, k as u8, p.x, p.y)
            })
            .collect();
        let w = world(
            report(Side::Left, 5, 0.0, 0.0),
            vec![report(Side::Left, 7, 6.0, 0.0)],
            ring,
            Vec2::zeros(),
        );
        assert_eq!(should_i_pass(&w, 180, &SimParams::default()), None);
    }

    #[test]
    fn pass_choice_is_deterministic() {
        let w = world(
            report(Side::Left, 5, -10.0, 5.0),
            vec![report(Side::Left, 7, 5.0, 8.0), report(Side::Left, 8, -2.0, -6.0)],
            vec![report(Side::Right, 2, 10.0, -10.0), report(Side::Right, 3, 20.0, 15.0)],
            Vec2::new(-10.0, 5.0),
        );
        let params = SimParams::default();
        let first = should_i_pass(&w, 180, &params);
        for _ in 0..5 {
            assert_eq!(should_i_pass(&w, 180, &params), first);
        }
    }

    #[test]
    fn zero_samples_never_pass() {
        let w = world(report(Side::Left, 5, 0.0, 0.0), vec![], vec![], Vec2::zeros());
        assert_eq!(should_i_pass(&w, 0, &SimParams::default()), None);
    }
}
