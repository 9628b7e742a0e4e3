//! UDP link between one agent and the soccer server
//!
//! Each agent owns its own socket. A reader task decodes datagrams into
//! [`ServerMsg`]s and a writer task encodes [`ClientMsg`]s, so the agent loop
//! only ever deals with channels.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::protocol::{ClientMsg, ServerMsg};

/// Largest datagram the server sends
const MAX_DATAGRAM: usize = 8192;

/// Channel capacity in each direction
const CHANNEL_CAPACITY: usize = 64;

/// Link errors
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Channel ends of an open link
pub struct Link {
    pub outgoing: mpsc::Sender<ClientMsg>,
    pub incoming: mpsc::Receiver<ServerMsg>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Link {
    /// Bind an ephemeral local socket and connect it to the server
    pub async fn open(server: SocketAddr) -> Result<Self, LinkError> {
        let local: SocketAddr = if server.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        debug!(local = %socket.local_addr()?, server = %server, "UDP link open");
        Ok(Self::spawn(Arc::new(socket)))
    }

    fn spawn(socket: Arc<UdpSocket>) -> Self {
        let (out_tx, mut out_rx) = mpsc::channel::<ClientMsg>(CHANNEL_CAPACITY);
        let (in_tx, in_rx) = mpsc::channel::<ServerMsg>(CHANNEL_CAPACITY);

        // Reader task: datagrams -> agent
        let read_socket = socket.clone();
        let reader = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM];
            loop {
                let len = match read_socket.recv(&mut buf).await {
                    Ok(len) => len,
                    Err(e) => {
                        error!(error = %e, "UDP receive failed");
                        break;
                    }
                };

                match serde_json::from_slice::<ServerMsg>(&buf[..len]) {
                    Ok(msg) => {
                        if in_tx.send(msg).await.is_err() {
                            debug!("Incoming channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, len, "Dropping malformed datagram");
                    }
                }
            }
        });

        // Writer task: agent -> datagrams
        let writer = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                if let Err(e) = send_msg(&socket, &msg).await {
                    warn!(error = %e, "UDP send failed");
                }
            }
        });

        Self {
            outgoing: out_tx,
            incoming: in_rx,
            reader,
            writer,
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// Encode and send one message as a datagram
async fn send_msg(socket: &UdpSocket, msg: &ClientMsg) -> Result<(), LinkError> {
    let bytes = serde_json::to_vec(msg)?;
    socket.send(&bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::protocol::InitInfo;
    use std::time::Duration;

    #[tokio::test]
    async fn round_trips_through_a_local_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        let mut link = Link::open(server_addr).await.unwrap();
        link.outgoing
            .send(ClientMsg::Drive {
                direction: 90.0,
                force: 100.0,
            })
            .await
            .unwrap();

        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, peer) = tokio::time::timeout(Duration::from_secs(2), server.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let sent: ClientMsg = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(
            sent,
            ClientMsg::Drive {
                direction: 90.0,
                force: 100.0
            }
        );

        // Garbage is dropped, the following valid packet still arrives
        server.send_to(b"not json", peer).await.unwrap();
        let init = ServerMsg::Init(InitInfo {
            id: 4,
            max_grab_steps: 50,
        });
        server
            .send_to(&serde_json::to_vec(&init).unwrap(), peer)
            .await
            .unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), link.incoming.recv())
            .await
            .unwrap();
        match received {
            Some(ServerMsg::Init(info)) => {
                assert_eq!(info.id, 4);
                assert_eq!(info.max_grab_steps, 50);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
