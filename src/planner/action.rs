//! Planner output and its translation to wire commands
//!
//! Actions are expressed in the canonical frame. [`Action::to_commands`] is
//! the only place they are mapped back to the raw frame.

use crate::game::geometry::{direction, distance, Vec2};
use crate::game::world::WorldState;
use crate::net::protocol::{ClientMsg, TeleportMode};

/// Full dash or kick force
pub const MAX_FORCE: f64 = 100.0;

/// Within this distance of a Move destination the agent slows down
const MOVE_SLOWDOWN_DISTANCE: f64 = 5.0;
const MOVE_SLOW_FORCE: f64 = 10.0;

/// Ball this close: chase at half force to avoid overrunning it
const CHASE_SLOWDOWN_DISTANCE: f64 = 3.0;
const CHASE_SLOW_FORCE: f64 = 50.0;

/// One decision for one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    NoAction,
    /// Kick at the goal (also used to clear the ball)
    Shoot { direction: f64, force: f64 },
    Move { destination: Vec2 },
    /// Stand and face `direction`
    Turn { direction: f64 },
    /// Kick to a teammate or, with a low force, to oneself
    Pass { direction: f64, force: f64 },
    /// Run to the predicted intercept point
    Chase { target: Vec2 },
    /// Goalie takes the ball in hand
    Grab,
    /// Goalie runs while holding the ball
    MoveWithBall { destination: Vec2 },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::NoAction => "no_action",
            Action::Shoot { .. } => "shoot",
            Action::Move { .. } => "move",
            Action::Turn { .. } => "turn",
            Action::Pass { .. } => "pass",
            Action::Chase { .. } => "chase",
            Action::Grab => "grab",
            Action::MoveWithBall { .. } => "move_with_ball",
        }
    }

    /// True for actions that kick the ball
    pub fn is_kick(&self) -> bool {
        matches!(self, Action::Shoot { .. } | Action::Pass { .. })
    }

    /// Wire messages executing this action, in the raw frame
    pub fn to_commands(&self, world: &WorldState) -> Vec<ClientMsg> {
        let frame = world.frame();
        let me = world.me().position;

        let drive = |dir: f64, force: f64| ClientMsg::Drive {
            direction: frame.to_raw_dir(dir),
            force,
        };
        let grab = || ClientMsg::Teleport {
            mode: TeleportMode::Grab,
            side: world.side(),
            position: frame.to_raw_pos(me),
        };

        match *self {
            Action::NoAction => Vec::new(),
            Action::Shoot { direction, force } | Action::Pass { direction, force } => {
                vec![ClientMsg::Kick {
                    direction: frame.to_raw_dir(direction),
                    force,
                }]
            }
            Action::Move { destination } => {
                let force = move_force(distance(&me, &destination), world.ball().grabbed);
                vec![drive(direction(&me, &destination), force)]
            }
            Action::Turn { direction } => vec![drive(direction, 0.0)],
            Action::Chase { target } => {
                let force = chase_force(world.distance_to_ball());
                vec![drive(direction(&me, &target), force)]
            }
            Action::Grab => vec![grab()],
            Action::MoveWithBall { destination } => {
                vec![drive(direction(&me, &destination), MAX_FORCE), grab()]
            }
        }
    }
}

/// Dash force for a Move; gentle near a goalie holding the ball
pub fn move_force(remaining: f64, ball_grabbed: bool) -> f64 {
    if remaining >= MOVE_SLOWDOWN_DISTANCE {
        MAX_FORCE
    } else if ball_grabbed {
        MOVE_SLOW_FORCE / 3.0
    } else {
        MOVE_SLOW_FORCE
    }
}

/// Dash force when chasing a ball `ball_distance` meters away
pub fn chase_force(ball_distance: f64) -> f64 {
    if ball_distance >= CHASE_SLOWDOWN_DISTANCE {
        MAX_FORCE
    } else {
        CHASE_SLOW_FORCE
    }
}

/// Teleport request placing this agent on its home point
pub fn teleport_home(world: &WorldState) -> ClientMsg {
    let frame = world.frame();
    ClientMsg::Teleport {
        mode: TeleportMode::Player {
            id: world.me_ref().id,
        },
        side: world.side(),
        position: frame.to_raw_pos(world.targets().home),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::tests::{perception, report, targets};
    use crate::net::protocol::{PlayerRef, Side};

    fn right_world(me_x: f64, me_y: f64, ball: Vec2) -> WorldState {
        let me = PlayerRef {
            side: Side::Right,
            id: 3,
        };
        let mut world = WorldState::new(me, false, targets(), None);
        world.apply_perception(&perception(
            report(Side::Right, 3, me_x, me_y),
            vec![],
            vec![],
            ball,
        ));
        world
    }

    #[test]
    fn kicks_are_mirrored_for_right_side() {
        let world = right_world(0.0, 0.0, Vec2::zeros());
        let cmds = Action::Shoot {
            direction: 0.0,
            force: MAX_FORCE,
        }
        .to_commands(&world);
        assert_eq!(
            cmds,
            vec![ClientMsg::Kick {
                direction: 180.0,
                force: MAX_FORCE
            }]
        );
    }

    #[test]
    fn move_slows_down_near_destination() {
        // Raw (10, 0) on the right side is canonical (-10, 0)
        let world = right_world(10.0, 0.0, Vec2::new(30.0, 0.0));

        let far = Action::Move {
            destination: Vec2::new(0.0, 0.0),
        };
        match far.to_commands(&world).as_slice() {
            [ClientMsg::Drive { direction, force }] => {
                assert_eq!(*force, MAX_FORCE);
                assert!((direction.abs() - 180.0).abs() < 1e-9);
            }
            other => panic!("unexpected commands {:?}", other),
        }

        let near = Action::Move {
            destination: Vec2::new(-8.0, 0.0),
        };
        match near.to_commands(&world).as_slice() {
            [ClientMsg::Drive { force, .. }] => assert_eq!(*force, 10.0),
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[test]
    fn move_force_is_gentle_around_grabbed_ball() {
        assert_eq!(move_force(6.0, true), MAX_FORCE);
        assert!((move_force(2.0, true) - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(move_force(2.0, false), 10.0);
    }

    #[test]
    fn chase_force_halves_next_to_ball() {
        assert_eq!(chase_force(3.0), MAX_FORCE);
        assert_eq!(chase_force(2.9), 50.0);
    }

    #[test]
    fn turn_is_zero_force_drive() {
        let world = right_world(0.0, 0.0, Vec2::zeros());
        let cmds = Action::Turn { direction: 90.0 }.to_commands(&world);
        assert_eq!(
            cmds,
            vec![ClientMsg::Drive {
                direction: -90.0,
                force: 0.0
            }]
        );
    }

    #[test]
    fn move_with_ball_drives_and_drags_ball() {
        let world = right_world(45.0, 0.0, Vec2::new(45.0, 0.0));
        let cmds = Action::MoveWithBall {
            destination: Vec2::new(-34.0, 20.0),
        }
        .to_commands(&world);

        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], ClientMsg::Drive { force, .. } if force == MAX_FORCE));
        assert_eq!(
            cmds[1],
            ClientMsg::Teleport {
                mode: TeleportMode::Grab,
                side: Side::Right,
                position: Vec2::new(45.0, 0.0),
            }
        );
    }

    #[test]
    fn no_action_sends_nothing() {
        let world = right_world(0.0, 0.0, Vec2::zeros());
        assert!(Action::NoAction.to_commands(&world).is_empty());
    }

    #[test]
    fn home_teleport_uses_raw_home() {
        let world = right_world(0.0, 0.0, Vec2::zeros());
        let home = targets().home;
        assert_eq!(
            teleport_home(&world),
            ClientMsg::Teleport {
                mode: TeleportMode::Player { id: 3 },
                side: Side::Right,
                position: -home,
            }
        );
    }
}
