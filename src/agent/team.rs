//! Team roster launch and the per-agent startup handshake

use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::{Config, TeamConfig};
use crate::game::formation::{Formation, RoleTargets, Slot};
use crate::game::frame::CoordinateFrame;
use crate::game::params::SimParams;
use crate::game::world::WorldState;
use crate::net::protocol::{AgentRole, ClientMsg, InitInfo, PlayerRef, ServerMsg, Side};
use crate::net::Link;
use crate::planner::Planner;

use super::runner::AgentLoop;
use super::AgentError;

/// Handshake errors
#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("No init from server after {attempts} attempts")]
    TimedOut { attempts: u32 },

    #[error("Link closed during handshake")]
    LinkClosed,
}

/// Everything one agent needs to start; nothing here is shared
#[derive(Debug, Clone)]
pub struct AgentSetup {
    pub side: Side,
    /// Index into the formation, 0 is the goalie
    pub role: usize,
    pub slot: Slot,
    pub server: SocketAddr,
    pub pass_directions: u32,
    pub seed: u64,
    pub possession_jitter: bool,
    pub handshake_timeout: Duration,
    pub handshake_attempts: u32,
    pub teleport_home: bool,
}

impl AgentSetup {
    pub fn is_goalie(&self) -> bool {
        Formation::is_goalie(self.role)
    }

    pub fn agent_role(&self) -> AgentRole {
        if self.is_goalie() {
            AgentRole::Goalie
        } else if self.slot.kicker {
            AgentRole::FieldPlayerKicker
        } else {
            AgentRole::FieldPlayer
        }
    }

    /// Connect request, home expressed in the raw frame
    pub fn connect_msg(&self) -> ClientMsg {
        ClientMsg::Connect {
            side: self.side,
            role: self.agent_role(),
            home: CoordinateFrame::new(self.side).to_raw_pos(self.slot.home),
        }
    }
}

/// Agents to launch, right before left for each role
pub fn roster(config: &Config) -> Vec<AgentSetup> {
    let left = Formation::new(config.left.formation);
    let right = Formation::new(config.right.formation);
    let teams: [(Side, &TeamConfig, &Formation); 2] = [
        (Side::Right, &config.right, &right),
        (Side::Left, &config.left, &left),
    ];

    let mut setups = Vec::new();
    let max_roles = left.len().max(right.len());

    for role in 0..max_roles {
        for (side, team, formation) in teams {
            if role >= team.size {
                continue;
            }
            let Some(slot) = formation.slot(role) else {
                continue;
            };
            let seed = config.agent_seed.wrapping_add(setups.len() as u64);
            setups.push(AgentSetup {
                side,
                role,
                slot: *slot,
                server: config.server_addr,
                pass_directions: config.pass_directions,
                seed,
                possession_jitter: config.possession_jitter,
                handshake_timeout: config.handshake_timeout,
                handshake_attempts: config.handshake_attempts,
                teleport_home: config.teleport_home_before_kick_off,
            });
        }
    }

    setups
}

/// Spawn every agent of the roster as its own task
pub fn launch(config: &Config) -> Vec<JoinHandle<()>> {
    let setups = roster(config);
    info!(agents = setups.len(), server = %config.server_addr, "Launching roster");

    setups
        .into_iter()
        .map(|setup| {
            tokio::spawn(async move {
                let (side, role) = (setup.side, setup.role);
                if let Err(e) = run_agent(setup).await {
                    error!(side = %side, role, error = %e, "Agent failed");
                }
            })
        })
        .collect()
}

/// Connect one agent and run it until its link closes
pub async fn run_agent(setup: AgentSetup) -> Result<(), AgentError> {
    let mut link = Link::open(setup.server).await?;

    let init = handshake(
        &mut link,
        setup.connect_msg(),
        setup.handshake_timeout,
        setup.handshake_attempts,
    )
    .await?;
    info!(side = %setup.side, role = setup.role, id = init.id, "Connected to server");

    let me = PlayerRef {
        side: setup.side,
        id: init.id,
    };
    let targets = RoleTargets::for_slot(&setup.slot);
    let jitter_seed = setup.possession_jitter.then_some(setup.seed);
    let world = WorldState::new(me, setup.is_goalie(), targets, jitter_seed);

    let params = SimParams::default().with_max_grabbed_steps(init.max_grab_steps);
    let planner = Planner::new(params, setup.pass_directions, setup.seed);

    AgentLoop::new(world, planner, link, setup.teleport_home)
        .run()
        .await;
    Ok(())
}

/// Send the connect request until the server answers with its init message
pub async fn handshake(
    link: &mut Link,
    connect: ClientMsg,
    wait: Duration,
    attempts: u32,
) -> Result<InitInfo, HandshakeError> {
    for attempt in 1..=attempts {
        link.outgoing
            .send(connect.clone())
            .await
            .map_err(|_| HandshakeError::LinkClosed)?;

        match timeout(wait, link.incoming.recv()).await {
            Ok(Some(ServerMsg::Init(init))) => return Ok(init),
            Ok(Some(_)) => debug!(attempt, "Ignoring message before init"),
            Ok(None) => return Err(HandshakeError::LinkClosed),
            Err(_) => debug!(attempt, "Waiting for server"),
        }
    }

    Err(HandshakeError::TimedOut { attempts })
}
