//! Agent loop: receive, update, plan, send
//!
//! One loop per agent. The only suspension point is waiting for the next
//! server message; everything else runs synchronously within the cycle.

use tracing::{debug, info, trace, warn};

use crate::game::world::WorldState;
use crate::net::protocol::{ClientMsg, GameMode, ServerMsg};
use crate::net::Link;
use crate::planner::action::teleport_home;
use crate::planner::Planner;
use crate::util::time::{step_duration, Timer};

use super::stats::{IdleStats, PacketLossTracker};

/// Runs one agent until its link closes
pub struct AgentLoop {
    world: WorldState,
    planner: Planner,
    link: Link,
    /// Teleport to the home point whenever a before-kick-off phase begins
    teleport_home: bool,
    last_mode: Option<GameMode>,
    loss: PacketLossTracker,
    idle: IdleStats,
}

impl AgentLoop {
    pub fn new(world: WorldState, planner: Planner, link: Link, teleport_home: bool) -> Self {
        Self {
            world,
            planner,
            link,
            teleport_home,
            last_mode: None,
            loss: PacketLossTracker::default(),
            idle: IdleStats::default(),
        }
    }

    pub async fn run(mut self) {
        let me = self.world.me_ref();
        info!(side = %me.side, id = me.id, goalie = self.world.is_goalie(), "Agent started");

        let step_seconds = self.planner.params().physics.step_seconds;
        let step_ms = step_duration().as_secs_f64() * 1000.0;
        let mut timer = Timer::new();

        while let Some(msg) = self.link.incoming.recv().await {
            timer.reset();

            for command in self.step(msg) {
                if self.link.outgoing.send(command).await.is_err() {
                    warn!(side = %me.side, id = me.id, "Outgoing channel closed");
                    return;
                }
            }

            let elapsed_ms = timer.elapsed_ms();
            if elapsed_ms > step_ms {
                warn!(side = %me.side, id = me.id, elapsed_ms, "Cycle overran the simulation step");
            }
            self.idle.record(elapsed_ms, step_seconds, &mut self.loss);
        }

        info!(side = %me.side, id = me.id, "Link closed, agent stopping");
    }

    /// Handle one server message; returns the commands to send
    pub fn step(&mut self, msg: ServerMsg) -> Vec<ClientMsg> {
        match msg {
            ServerMsg::See(perception) => {
                self.loss.record(perception.time);
                self.world.apply_perception(&perception);

                let action = self.planner.plan(&mut self.world);
                trace!(
                    time = perception.time,
                    action = action.name(),
                    possession = ?self.world.possession(),
                    indicator = self.world.possession_indicator(),
                    nearest = ?self.world.nearest_to_ball().map(|n| n.player),
                    offside = self.world.is_offside(),
                    "planned"
                );
                action.to_commands(&self.world)
            }
            ServerMsg::Referee(call) => {
                let entering_before_kick_off = call.mode == GameMode::BeforeKickOff
                    && self.last_mode != Some(GameMode::BeforeKickOff);
                self.last_mode = Some(call.mode);
                self.world.apply_referee(&call);
                debug!(period = ?call.period, mode = ?call.mode, "referee");

                if entering_before_kick_off && self.teleport_home {
                    vec![teleport_home(&self.world)]
                } else {
                    Vec::new()
                }
            }
            ServerMsg::Init(init) => {
                // Late duplicate of the handshake reply
                self.planner.set_max_grabbed_steps(init.max_grab_steps);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Vec2;
    use crate::game::params::SimParams;
    use crate::game::world::tests::{perception, report, targets};
    use crate::net::protocol::{InitInfo, Period, PlayerRef, RefereeCall, Side, TeleportMode};
    use std::time::Duration;
    use tokio::net::UdpSocket;

    const ME: PlayerRef = PlayerRef {
        side: Side::Right,
        id: 6,
    };

    async fn agent(teleport_home: bool) -> (AgentLoop, UdpSocket) {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let link = Link::open(server.local_addr().unwrap()).await.unwrap();
        let world = WorldState::new(ME, false, targets(), None);
        let planner = Planner::new(SimParams::default(), 180, 1);
        (AgentLoop::new(world, planner, link, teleport_home), server)
    }

    fn referee(mode: GameMode) -> ServerMsg {
        ServerMsg::Referee(RefereeCall {
            period: Period::FirstHalf,
            mode,
            side_to_continue: None,
        })
    }

    #[tokio::test]
    async fn perception_before_game_sends_nothing() {
        let (mut agent, _server) = agent(false).await;
        let see = ServerMsg::See(perception(report(Side::Right, 6, 10.0, 0.0), vec![], vec![], Vec2::zeros()));
        assert!(agent.step(see).is_empty());
        assert!(agent.world.has_perception());
    }

    #[tokio::test]
    async fn nearest_player_chases_in_raw_frame() {
        let (mut agent, _server) = agent(false).await;
        assert!(agent.step(referee(GameMode::PlayOn)).is_empty());

        // Raw ball to the right of the player: canonical ball to its left
        let see = ServerMsg::See(perception(
            report(Side::Right, 6, 10.0, 0.0),
            vec![],
            vec![],
            Vec2::new(20.0, 0.0),
        ));
        let commands = agent.step(see);
        match commands.as_slice() {
            [ClientMsg::Drive { direction, force }] => {
                assert_eq!(*force, 100.0);
                assert!(direction.abs() < 1e-9, "direction {}", direction);
            }
            other => panic!("unexpected commands {:?}", other),
        }
    }

    #[tokio::test]
    async fn teleports_home_when_kick_off_phase_begins() {
        let (mut agent, _server) = agent(true).await;
        assert!(agent.step(referee(GameMode::PlayOn)).is_empty());

        let commands = agent.step(referee(GameMode::BeforeKickOff));
        assert_eq!(
            commands,
            vec![ClientMsg::Teleport {
                mode: TeleportMode::Player { id: 6 },
                side: Side::Right,
                position: -targets().home,
            }]
        );

        // Only once per phase
        assert!(agent.step(referee(GameMode::BeforeKickOff)).is_empty());
    }

    #[tokio::test]
    async fn late_init_updates_grab_limit() {
        let (mut agent, _server) = agent(false).await;
        agent.step(ServerMsg::Init(InitInfo {
            id: 6,
            max_grab_steps: 12,
        }));
        assert_eq!(agent.planner.params().max_grabbed_steps, 12);
    }

    #[tokio::test]
    async fn run_forwards_commands_to_server() {
        let (agent, server) = agent(false).await;
        let mut buf = [0u8; 4096];

        // Learn the agent's address from a first datagram
        agent.link.outgoing
            .send(ClientMsg::Drive {
                direction: 0.0,
                force: 0.0,
            })
            .await
            .unwrap();
        let (_, peer) = server.recv_from(&mut buf).await.unwrap();

        let handle = tokio::spawn(agent.run());

        for msg in [
            referee(GameMode::PlayOn),
            ServerMsg::See(perception(
                report(Side::Right, 6, 10.0, 0.0),
                vec![],
                vec![],
                Vec2::new(20.0, 0.0),
            )),
        ] {
            server
                .send_to(&serde_json::to_vec(&msg).unwrap(), peer)
                .await
                .unwrap();
        }

        let (len, _) = tokio::time::timeout(Duration::from_secs(2), server.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let sent: ClientMsg = serde_json::from_slice(&buf[..len]).unwrap();
        assert!(matches!(sent, ClientMsg::Drive { force, .. } if force == 100.0));

        handle.abort();
    }
}
