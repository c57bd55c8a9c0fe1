//! Per-connection protocol loop translating JSON lines into service calls.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dto::request::ClientRequest;
use crate::dto::response::ServerMessage;
use crate::error::ServiceError;
use crate::services::{auth_service, leaderboard_service, matchmaking};
use crate::state::session::{AnswerReply, PlayerHandle};
use crate::state::{ClientConnection, SharedState};

/// Whether the read loop should keep serving the connection.
enum Flow {
    Continue,
    Disconnect,
}

/// Serve one client until it exits, the socket drops, or reading fails.
pub async fn handle_connection(state: SharedState, stream: TcpStream, addr: SocketAddr) {
    let conn_id = state.next_conn_id();
    let (read_half, write_half) = stream.into_split();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

    let writer_task = tokio::spawn(write_outbound(conn_id, write_half, outbound_rx));

    state.clients().insert(
        conn_id,
        ClientConnection {
            conn_id,
            tx: outbound_tx.clone(),
        },
    );
    info!(
        conn = conn_id,
        %addr,
        online = state.clients().len(),
        "client connected"
    );

    let mut session = ClientSession::new(state.clone(), conn_id, outbound_tx.clone());
    let mut lines = BufReader::new(read_half).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ClientRequest>(line) {
                    Ok(request) => {
                        if let Flow::Disconnect = session.dispatch(request).await {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(conn = conn_id, error = %err, "failed to parse client message");
                        session.send(ServerMessage::error("invalid message"));
                    }
                }
            }
            Ok(None) => break,
            Err(err) => {
                warn!(conn = conn_id, error = %err, "failed to read from client");
                break;
            }
        }
    }

    state.clients().remove(&conn_id);
    info!(
        conn = conn_id,
        online = state.clients().len(),
        "client disconnected"
    );
    // Dropping the session closes any open game ticket, so an in-flight game
    // sees this player as answering nothing from here on.
    drop(session);
    finalize(conn_id, writer_task, outbound_tx).await;
}

/// Drain the outbound queue into the socket, one JSON line per message.
async fn write_outbound(
    conn_id: u64,
    mut write_half: OwnedWriteHalf,
    mut outbound_rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(message) = outbound_rx.recv().await {
        match serde_json::to_string(&message) {
            Ok(mut payload) => {
                payload.push('\n');
                if let Err(err) = write_half.write_all(payload.as_bytes()).await {
                    warn!(conn = conn_id, error = %err, "failed to write to client");
                    break;
                }
            }
            Err(err) => {
                warn!(
                    conn = conn_id,
                    error = %err,
                    "failed to serialize server message (permanent error, skipping)"
                );
            }
        }
    }
}

/// Close the outbound queue and wait for the writer to flush and exit.
///
/// An active game session still holds an outbox clone, so this returns once
/// that session finishes at the latest.
async fn finalize(
    conn_id: u64,
    writer_task: JoinHandle<()>,
    outbound_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    drop(outbound_tx);
    if let Err(err) = writer_task.await {
        warn!(conn = conn_id, error = %err, "failed to finalize writer task");
    }
}

/// Per-connection protocol state: who is signed in and whether a game ticket
/// is open.
struct ClientSession {
    state: SharedState,
    conn_id: u64,
    outbound: mpsc::UnboundedSender<ServerMessage>,
    identity: Option<String>,
    ticket: Option<mpsc::UnboundedSender<AnswerReply>>,
}

impl ClientSession {
    fn new(
        state: SharedState,
        conn_id: u64,
        outbound: mpsc::UnboundedSender<ServerMessage>,
    ) -> Self {
        Self {
            state,
            conn_id,
            outbound,
            identity: None,
            ticket: None,
        }
    }

    fn send(&self, message: ServerMessage) {
        let _ = self.outbound.send(message);
    }

    fn send_error(&self, err: &ServiceError) {
        self.send(ServerMessage::error(err.client_message()));
    }

    /// Whether a game ticket is still open. A ticket whose session has
    /// already finished is cleared as a side effect.
    fn in_game(&mut self) -> bool {
        match &self.ticket {
            Some(tx) if !tx.is_closed() => true,
            Some(_) => {
                self.ticket = None;
                false
            }
            None => false,
        }
    }

    async fn dispatch(&mut self, request: ClientRequest) -> Flow {
        match request {
            ClientRequest::Register(credentials) => {
                match auth_service::register(&self.state, &credentials).await {
                    Ok(()) => self.send(ServerMessage::ack("registered")),
                    Err(err) => self.send_error(&err),
                }
            }
            ClientRequest::Login(credentials) => {
                match auth_service::login(&self.state, &credentials).await {
                    Ok(username) => {
                        info!(conn = self.conn_id, user = %username, "connection authenticated");
                        self.identity = Some(username);
                        self.send(ServerMessage::ack("logged in"));
                    }
                    Err(err) => self.send_error(&err),
                }
            }
            ClientRequest::Start => self.on_start().await,
            ClientRequest::Leaderboard => self.on_leaderboard().await,
            ClientRequest::Answer { id, choice } => self.on_answer(id, choice),
            ClientRequest::Exit => return Flow::Disconnect,
            ClientRequest::Unknown => self.send(ServerMessage::error("unknown command")),
        }
        Flow::Continue
    }

    async fn on_start(&mut self) {
        let Some(username) = self.identity.clone() else {
            self.send(ServerMessage::error("login required"));
            return;
        };
        if self.in_game() {
            self.send(ServerMessage::error("already waiting or in a game"));
            return;
        }

        let (ticket_tx, ticket_rx) = mpsc::unbounded_channel();
        let player = PlayerHandle::new(self.conn_id, username, self.outbound.clone(), ticket_rx);
        self.ticket = Some(ticket_tx);
        // Queued before matchmaking so the confirmation precedes the first
        // question when this player completes a group immediately.
        self.send(ServerMessage::info("waiting for players"));
        matchmaking::join_queue(&self.state, player).await;
    }

    async fn on_leaderboard(&self) {
        if self.identity.is_none() {
            self.send(ServerMessage::error("login required"));
            return;
        }
        match leaderboard_service::top_standings(&self.state).await {
            Ok(entries) => self.send(ServerMessage::Leaderboard { entries }),
            Err(err) => self.send_error(&err),
        }
    }

    fn on_answer(&mut self, id: u64, choice: u32) {
        if !self.in_game() {
            self.send(ServerMessage::error("no question is open"));
            return;
        }
        // The session can close between the check above and this send.
        let delivered = self
            .ticket
            .as_ref()
            .map(|tx| {
                tx.send(AnswerReply {
                    question_id: id,
                    choice,
                })
                .is_ok()
            })
            .unwrap_or(false);
        if !delivered {
            self.ticket = None;
            self.send(ServerMessage::error("no question is open"));
        }
    }
}
