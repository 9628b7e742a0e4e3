//! Soccer server protocol message definitions
//! These are the wire types exchanged with the simulation server, one JSON
//! document per datagram. Positions and directions are in the server's raw
//! frame; the agent converts them at the core boundary.

use serde::{Deserialize, Serialize};

use crate::game::geometry::Vec2;

/// Team side as assigned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "l"),
            Side::Right => write!(f, "r"),
        }
    }
}

/// Identity of a player on the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub side: Side,
    pub id: u8,
}

/// Game period as announced by the referee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Server is not running a game yet
    #[default]
    NoGame,
    PreGame,
    FirstHalf,
    HalfTime,
    SecondHalf,
    PostGame,
}

impl Period {
    /// True during the two halves of actual play
    pub fn is_playing(self) -> bool {
        matches!(self, Period::FirstHalf | Period::SecondHalf)
    }
}

/// Game mode (interruption state) as announced by the referee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    BeforeKickOff,
    KickOff(Side),
    PlayOn,
    ThrowIn(Side),
    CornerKick(Side),
    GoalKick(Side),
    Offside(Side),
}

impl GameMode {
    /// Kick-off phases in which everyone returns to the formation
    pub fn is_kick_off(self) -> bool {
        matches!(self, GameMode::BeforeKickOff | GameMode::KickOff(_))
    }

    /// Set-piece restarts after a referee interruption
    pub fn is_restart(self) -> bool {
        matches!(
            self,
            GameMode::ThrowIn(_) | GameMode::CornerKick(_) | GameMode::GoalKick(_) | GameMode::Offside(_)
        )
    }
}

/// Offside signal carried by each perception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsideStatus {
    #[default]
    Clear,
    /// The perceiving player is offside
    SelfOffside,
    /// A teammate of the perceiving player is offside
    TeamOffside,
}

/// Role kind announced when connecting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Goalie,
    FieldPlayer,
    /// Field player the server places next to the ball at kick-offs
    FieldPlayerKicker,
}

/// One player as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerReport {
    pub side: Side,
    pub id: u8,
    pub position: Vec2,
    /// Facing direction in degrees
    pub direction: f64,
}

/// Ball as reported by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallReport {
    pub position: Vec2,
    /// Player currently controlling the ball, if any
    pub controller: Option<PlayerRef>,
    /// Held by a goalie under the grab rule
    #[serde(default)]
    pub grabbed: bool,
}

/// Visual perception sent every simulation step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perception {
    /// Server step id (modulo 1000)
    pub time: u32,
    /// The perceiving player
    pub me: PlayerReport,
    /// Left team, without the perceiving player
    pub left_team: Vec<PlayerReport>,
    /// Right team, without the perceiving player
    pub right_team: Vec<PlayerReport>,
    pub ball: BallReport,
    #[serde(default)]
    pub offside: OffsideStatus,
}

/// Referee decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RefereeCall {
    pub period: Period,
    pub mode: GameMode,
    /// Team entitled to continue after an interruption
    pub side_to_continue: Option<Side>,
}

/// Connection acknowledgement
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitInfo {
    /// Player id assigned by the server
    pub id: u8,
    /// Number of steps a goalie may hold the ball
    pub max_grab_steps: i32,
}

/// Messages sent from the server to an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    Init(InitInfo),
    See(Perception),
    Referee(RefereeCall),
}

/// What a teleport request moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TeleportMode {
    /// Goalie drags the grabbed ball to the given position
    Grab,
    /// Move the given player to the given position
    Player { id: u8 },
}

/// Messages sent from an agent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Request to join the game
    Connect {
        side: Side,
        role: AgentRole,
        /// Home position in the raw frame
        home: Vec2,
    },

    /// Run (or turn, with zero force) in a direction
    Drive {
        /// Direction in degrees
        direction: f64,
        /// Force 0..=100
        force: f64,
    },

    /// Kick the controlled ball
    Kick {
        direction: f64,
        force: f64,
    },

    /// Reposition the ball (grab) or a player
    Teleport {
        mode: TeleportMode,
        side: Side,
        position: Vec2,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referee_call_parses_side_payloads() {
        let json = r#"{"type":"referee","period":"first_half","mode":{"throw_in":"r"},"side_to_continue":"r"}"#;
        let msg: ServerMsg = serde_json::from_str(json).unwrap();
        match msg {
            ServerMsg::Referee(call) => {
                assert_eq!(call.period, Period::FirstHalf);
                assert_eq!(call.mode, GameMode::ThrowIn(Side::Right));
                assert_eq!(call.side_to_continue, Some(Side::Right));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn perception_defaults_missing_flags() {
        let json = r#"{
            "type": "see",
            "time": 12,
            "me": {"side": "l", "id": 3, "position": [1.0, 2.0], "direction": 45.0},
            "left_team": [],
            "right_team": [{"side": "r", "id": 1, "position": [40.0, 0.0], "direction": 180.0}],
            "ball": {"position": [0.0, 0.0], "controller": null}
        }"#;
        let msg: ServerMsg = serde_json::from_str(json).unwrap();
        let ServerMsg::See(see) = msg else {
            panic!("expected a perception");
        };
        assert_eq!(see.time, 12);
        assert!(!see.ball.grabbed);
        assert_eq!(see.offside, OffsideStatus::Clear);
        assert_eq!(see.right_team[0].position, Vec2::new(40.0, 0.0));
    }

    #[test]
    fn client_msg_is_tagged() {
        let msg = ClientMsg::Teleport {
            mode: TeleportMode::Grab,
            side: Side::Left,
            position: Vec2::new(-45.0, 3.0),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "teleport");
        assert_eq!(json["mode"]["kind"], "grab");
        assert_eq!(json["side"], "l");
    }

    #[test]
    fn mode_classification() {
        assert!(GameMode::BeforeKickOff.is_kick_off());
        assert!(GameMode::KickOff(Side::Left).is_kick_off());
        assert!(!GameMode::PlayOn.is_restart());
        assert!(GameMode::CornerKick(Side::Right).is_restart());
        assert!(Period::SecondHalf.is_playing());
        assert!(!Period::HalfTime.is_playing());
    }
}
