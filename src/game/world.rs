//! World state as perceived by one agent
//!
//! Holds the latest canonical snapshot plus quantities filtered across
//! perceptions: ball and own velocity, nearest players to the ball, the
//! ball-possession indicator, offside flags and the goalie hold countdown.
//! Game period and mode change only through referee calls.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::net::protocol::{
    GameMode, OffsideStatus, Perception, Period, PlayerRef, RefereeCall, Side,
};

use super::formation::RoleTargets;
use super::frame::CoordinateFrame;
use super::geometry::{distance, Vec2};
use super::snapshot::{Ball, Player, Snapshot};

/// Smoothing weight of the possession filter
const POSSESSION_WEIGHT: f64 = 0.15;
/// Indicator magnitude beyond which a team is deemed to control the ball
const POSSESSION_THRESHOLD: f64 = 0.7;
/// Indicator is clamped to +/- this value
const POSSESSION_LIMIT: f64 = 2.0;
/// Nearest player must be this close for the ball to count as contested
const POSSESSION_RADIUS: f64 = 10.0;
/// Relative amplitude of the optional cosmetic jitter
const JITTER_AMPLITUDE: f64 = 0.85;

/// Steps the agent keeps treating itself as offside after the server flags it
const OFFSIDE_COOLDOWN_STEPS: u32 = 30;

/// Players farther than this from the ball are never "nearest"
const NEAREST_SEARCH_LIMIT: f64 = 200.0;

/// Which team is deemed to control the ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Possession {
    Own,
    Neutral,
    Opponent,
}

/// Nearest player to the ball and its distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub player: PlayerRef,
    pub distance: f64,
}

/// Exponentially smoothed possession indicator in [-2, 2]
/// (negative: own team, positive: opponent)
#[derive(Debug, Clone)]
pub struct PossessionFilter {
    indicator: f64,
    jitter: Option<ChaCha8Rng>,
}

impl PossessionFilter {
    /// `jitter_seed` enables the multiplicative jitter with a seeded stream
    pub fn new(jitter_seed: Option<u64>) -> Self {
        Self {
            indicator: 0.0,
            jitter: jitter_seed.map(ChaCha8Rng::seed_from_u64),
        }
    }

    pub fn indicator(&self) -> f64 {
        self.indicator
    }

    /// Feed one step's signal (-1 own, 0 none, +1 opponent)
    pub fn push(&mut self, signal: f64) -> f64 {
        let mut next = POSSESSION_WEIGHT * signal + (1.0 - POSSESSION_WEIGHT) * self.indicator;
        if let Some(rng) = self.jitter.as_mut() {
            next *= 1.0 + JITTER_AMPLITUDE * (rng.gen::<f64>() - 0.5);
        }
        self.indicator = next.clamp(-POSSESSION_LIMIT, POSSESSION_LIMIT);
        self.indicator
    }

    /// Bypass the filter and snap to one team's full possession
    pub fn force(&mut self, possession: Possession) {
        self.indicator = match possession {
            Possession::Own => -POSSESSION_LIMIT,
            Possession::Neutral => 0.0,
            Possession::Opponent => POSSESSION_LIMIT,
        };
    }

    pub fn classify(&self) -> Possession {
        if self.indicator < -POSSESSION_THRESHOLD {
            Possession::Own
        } else if self.indicator > POSSESSION_THRESHOLD {
            Possession::Opponent
        } else {
            Possession::Neutral
        }
    }
}

/// Goalie ball-holding countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalieHold {
    held: bool,
    steps_left: u32,
}

impl GoalieHold {
    /// Start holding for `steps` cycles
    pub fn arm(&mut self, steps: u32) {
        self.held = true;
        self.steps_left = steps;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn steps_left(&self) -> u32 {
        self.steps_left
    }

    /// Leaving the penalty margin ends the hold at the next tick
    pub fn expire(&mut self) {
        self.steps_left = 0;
    }

    /// One cycle elapsed; the hold ends when the countdown reaches zero
    pub fn tick(&mut self) {
        self.steps_left = self.steps_left.saturating_sub(1);
        if self.steps_left == 0 {
            self.held = false;
        }
    }

    /// The ball left the goalie's hands
    pub fn release(&mut self) {
        self.held = false;
        self.steps_left = 0;
    }
}

/// The agent's belief about the world
#[derive(Debug, Clone)]
pub struct WorldState {
    frame: CoordinateFrame,
    me: PlayerRef,
    goalie: bool,
    targets: RoleTargets,

    snapshot: Snapshot,
    perceived: bool,

    period: Period,
    mode: GameMode,
    side_to_continue: Option<Side>,

    ball_velocity: Vec2,
    my_velocity: Vec2,

    nearest_overall: Option<Nearest>,
    nearest_teammate: Option<Nearest>,
    nearest_opponent: Option<Nearest>,

    possession: PossessionFilter,
    whose_ball: Possession,

    self_offside: bool,
    team_offside: bool,
    offside_steps: u32,

    hold: GoalieHold,
}

impl WorldState {
    /// Empty world awaiting the first perception
    pub fn new(me: PlayerRef, goalie: bool, targets: RoleTargets, jitter_seed: Option<u64>) -> Self {
        Self {
            frame: CoordinateFrame::new(me.side),
            me,
            goalie,
            targets,
            snapshot: Snapshot::empty(me),
            perceived: false,
            period: Period::NoGame,
            mode: GameMode::BeforeKickOff,
            side_to_continue: None,
            ball_velocity: Vec2::zeros(),
            my_velocity: Vec2::zeros(),
            nearest_overall: None,
            nearest_teammate: None,
            nearest_opponent: None,
            possession: PossessionFilter::new(jitter_seed),
            whose_ball: Possession::Neutral,
            self_offside: false,
            team_offside: false,
            offside_steps: 0,
            hold: GoalieHold::default(),
        }
    }

    /// Ingest one perception
    pub fn apply_perception(&mut self, perception: &Perception) {
        let snapshot = Snapshot::from_perception(perception, &self.frame);

        let (ball_velocity, my_velocity) = if self.perceived {
            (
                snapshot.ball.position - self.snapshot.ball.position,
                snapshot.me.position - self.snapshot.me.position,
            )
        } else {
            (Vec2::zeros(), Vec2::zeros())
        };

        self.me = snapshot.me.identity();
        self.snapshot = snapshot;
        self.perceived = true;

        self.update_offside();
        self.update_nearest();
        self.update_possession();

        self.ball_velocity = ball_velocity;
        self.my_velocity = my_velocity;
    }

    /// Ingest a referee decision verbatim
    pub fn apply_referee(&mut self, call: &RefereeCall) {
        self.period = call.period;
        self.mode = call.mode;
        self.side_to_continue = call.side_to_continue;
    }

    fn update_offside(&mut self) {
        self.team_offside = false;

        if self.self_offside {
            if self.offside_steps == 0 {
                self.self_offside = false;
            } else {
                self.offside_steps -= 1;
            }
            return;
        }

        match self.snapshot.offside {
            OffsideStatus::Clear => {}
            OffsideStatus::SelfOffside => {
                self.self_offside = true;
                self.team_offside = true;
                self.offside_steps = OFFSIDE_COOLDOWN_STEPS;
            }
            OffsideStatus::TeamOffside => {
                self.team_offside = true;
            }
        }
    }

    fn update_nearest(&mut self) {
        let ball = self.snapshot.ball.position;
        self.nearest_opponent = nearest_of(&self.snapshot.opponents, &ball);
        self.nearest_teammate = nearest_of(&self.snapshot.own_team, &ball);

        self.nearest_overall = match (self.nearest_teammate, self.nearest_opponent) {
            (Some(own), Some(their)) if own.distance < their.distance => Some(own),
            (Some(_), Some(their)) => Some(their),
            (own, their) => own.or(their),
        };
    }

    fn update_possession(&mut self) {
        let my_side = self.frame.side();

        if self.mode != GameMode::PlayOn {
            // Stoppage: the referee decides who continues
            let forced = if self.side_to_continue == Some(my_side) {
                Possession::Own
            } else {
                Possession::Opponent
            };
            self.possession.force(forced);
            self.whose_ball = forced;
            return;
        }

        let signal = match self.nearest_overall {
            Some(n) if n.distance < POSSESSION_RADIUS => {
                if n.player.side == my_side {
                    -1.0
                } else {
                    1.0
                }
            }
            _ => {
                // Loose ball: nobody keeps possession
                self.possession.force(Possession::Neutral);
                0.0
            }
        };
        self.possession.push(signal);
        self.whose_ball = self.possession.classify();

        let ball = &self.snapshot.ball;
        if ball.grabbed {
            let grabbed_by = if ball.controller.map(|c| c.side) == Some(my_side) {
                Possession::Own
            } else {
                Possession::Opponent
            };
            self.possession.force(grabbed_by);
            self.whose_ball = grabbed_by;
        }
    }

    // ---- queries ----

    pub fn frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn side(&self) -> Side {
        self.frame.side()
    }

    pub fn me_ref(&self) -> PlayerRef {
        self.me
    }

    pub fn me(&self) -> &Player {
        &self.snapshot.me
    }

    pub fn is_goalie(&self) -> bool {
        self.goalie
    }

    pub fn targets(&self) -> &RoleTargets {
        &self.targets
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn has_perception(&self) -> bool {
        self.perceived
    }

    pub fn ball(&self) -> &Ball {
        &self.snapshot.ball
    }

    pub fn own_team(&self) -> &[Player] {
        &self.snapshot.own_team
    }

    pub fn opponents(&self) -> &[Player] {
        &self.snapshot.opponents
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn side_to_continue(&self) -> Option<Side> {
        self.side_to_continue
    }

    pub fn ball_velocity(&self) -> Vec2 {
        self.ball_velocity
    }

    pub fn my_velocity(&self) -> Vec2 {
        self.my_velocity
    }

    pub fn nearest_to_ball(&self) -> Option<Nearest> {
        self.nearest_overall
    }

    pub fn nearest_teammate_to_ball(&self) -> Option<Nearest> {
        self.nearest_teammate
    }

    pub fn nearest_opponent_to_ball(&self) -> Option<Nearest> {
        self.nearest_opponent
    }

    /// True if this agent is its team's closest player to the ball
    pub fn am_nearest_teammate(&self) -> bool {
        self.nearest_teammate.map(|n| n.player) == Some(self.me)
    }

    pub fn possession(&self) -> Possession {
        self.whose_ball
    }

    pub fn possession_indicator(&self) -> f64 {
        self.possession.indicator()
    }

    /// True iff the server names this agent as the ball controller
    pub fn is_ball_controlled_by_me(&self) -> bool {
        self.snapshot.ball.controller == Some(self.me)
    }

    pub fn is_offside(&self) -> bool {
        self.self_offside
    }

    pub fn team_is_offside(&self) -> bool {
        self.team_offside
    }

    pub fn distance_to_ball(&self) -> f64 {
        distance(&self.snapshot.me.position, &self.snapshot.ball.position)
    }

    /// Opponents strictly within `radius` of `center`
    pub fn count_opponents_within(&self, center: &Vec2, radius: f64) -> usize {
        self.snapshot
            .opponents
            .iter()
            .filter(|p| distance(&p.position, center) < radius)
            .count()
    }

    pub fn hold(&self) -> &GoalieHold {
        &self.hold
    }

    pub fn hold_mut(&mut self) -> &mut GoalieHold {
        &mut self.hold
    }
}

/// First player with the minimum distance to `ball`
fn nearest_of(players: &[Player], ball: &Vec2) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;
    let mut min = NEAREST_SEARCH_LIMIT;
    for player in players {
        let d = distance(&player.position, ball);
        if d < min {
            min = d;
            best = Some(Nearest {
                player: player.identity(),
                distance: d,
            });
        }
    }
    best
}
