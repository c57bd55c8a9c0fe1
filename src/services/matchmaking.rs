//! Grouping of waiting players into game sessions.

use tracing::{debug, info};
use uuid::Uuid;

use crate::services::game_service;
use crate::state::SharedState;
use crate::state::session::PlayerHandle;

/// Add a player to the waiting room, launching a session when a group forms.
///
/// The completed group runs on its own task so the connection that tipped the
/// queue over the threshold is not held hostage by the game loop.
pub async fn join_queue(state: &SharedState, player: PlayerHandle) {
    let username = player.username().to_string();
    match state.queue().push(player).await {
        Some(group) => {
            let session_id = Uuid::new_v4();
            info!(
                session = %session_id,
                players = group.len(),
                "group formed; launching game session"
            );
            tokio::spawn(game_service::run_session(state.clone(), session_id, group));
        }
        None => {
            let waiting = state.queue().waiting_count().await;
            debug!(user = %username, waiting, "player queued");
        }
    }
}
