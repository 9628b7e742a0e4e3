//! Canonical perception snapshots
//!
//! A [`Snapshot`] is one server perception rewritten as if the own team
//! played on the left. It is rebuilt wholesale from every perception.

use crate::net::protocol::{OffsideStatus, Perception, PlayerRef, PlayerReport, Side};

use super::frame::CoordinateFrame;
use super::geometry::Vec2;

/// A player in the canonical frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub side: Side,
    pub id: u8,
    pub position: Vec2,
    /// Facing direction in degrees
    pub direction: f64,
}

impl Player {
    pub fn identity(&self) -> PlayerRef {
        PlayerRef {
            side: self.side,
            id: self.id,
        }
    }

    fn from_report(report: &PlayerReport, frame: &CoordinateFrame) -> Self {
        Self {
            side: report.side,
            id: report.id,
            position: frame.to_canonical_pos(report.position),
            direction: frame.to_canonical_dir(report.direction),
        }
    }
}

/// The ball in the canonical frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub position: Vec2,
    pub controller: Option<PlayerRef>,
    pub grabbed: bool,
}

/// One normalized perception
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Server step id
    pub time: u32,
    pub me: Player,
    /// Own team, the perceiving player last
    pub own_team: Vec<Player>,
    pub opponents: Vec<Player>,
    pub ball: Ball,
    pub offside: OffsideStatus,
}

impl Snapshot {
    /// Placeholder used before the first perception arrives
    pub fn empty(me: PlayerRef) -> Self {
        let me = Player {
            side: me.side,
            id: me.id,
            position: Vec2::zeros(),
            direction: 0.0,
        };
        Self {
            time: 0,
            me,
            own_team: vec![me],
            opponents: Vec::new(),
            ball: Ball {
                position: Vec2::zeros(),
                controller: None,
                grabbed: false,
            },
            offside: OffsideStatus::Clear,
        }
    }

    /// Normalize a raw perception into the canonical frame
    pub fn from_perception(perception: &Perception, frame: &CoordinateFrame) -> Self {
        let (own_raw, their_raw) = match frame.side() {
            Side::Left => (&perception.left_team, &perception.right_team),
            Side::Right => (&perception.right_team, &perception.left_team),
        };

        let me = Player::from_report(&perception.me, frame);

        let mut own_team: Vec<Player> = own_raw
            .iter()
            .map(|p| Player::from_report(p, frame))
            .collect();
        // The server leaves the perceiving player out of its team list
        own_team.push(me);

        let opponents = their_raw
            .iter()
            .map(|p| Player::from_report(p, frame))
            .collect();

        Self {
            time: perception.time,
            me,
            own_team,
            opponents,
            ball: Ball {
                position: frame.to_canonical_pos(perception.ball.position),
                controller: perception.ball.controller,
                grabbed: perception.ball.grabbed,
            },
            offside: perception.offside,
        }
    }

    /// Teammates, excluding the perceiving player
    pub fn teammates(&self) -> impl Iterator<Item = &Player> {
        let me = self.me.identity();
        self.own_team.iter().filter(move |p| p.identity() != me)
    }
}
