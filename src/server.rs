//! TCP accept loop and graceful shutdown plumbing.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::dto::response::ServerMessage;
use crate::services::connection_service;
use crate::state::SharedState;

/// Accept connections on `listener` until `shutdown` resolves.
///
/// Each accepted socket is served on its own task; the caller keeps ownership
/// of binding so tests can listen on an ephemeral port.
pub async fn serve(
    state: SharedState,
    listener: TcpListener,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tokio::spawn(connection_service::handle_connection(
                        state.clone(),
                        stream,
                        peer,
                    ));
                }
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                }
            },
            _ = &mut shutdown => break,
        }
    }

    notify_shutdown(&state).await;
    Ok(())
}

/// Tell every connected client the server is going away, then give their
/// writer tasks a moment to flush.
async fn notify_shutdown(state: &SharedState) {
    let mut notified = 0usize;
    for entry in state.clients().iter() {
        if entry
            .tx
            .send(ServerMessage::info("server shutting down"))
            .is_ok()
        {
            notified += 1;
        }
    }
    info!(notified, "server shutting down");
    tokio::time::sleep(Duration::from_millis(100)).await;
}
