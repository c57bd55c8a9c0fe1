use std::collections::VecDeque;

use tokio::sync::Mutex;

use crate::state::session::PlayerHandle;

/// Waiting room for players who asked to start a game.
///
/// Players are kept in arrival order. As soon as the queue holds the minimum
/// group size, that many players are drained from the front; anyone beyond
/// the minimum stays queued for the next group.
pub struct MatchQueue {
    min_players: usize,
    waiting: Mutex<VecDeque<PlayerHandle>>,
}

impl MatchQueue {
    /// Create an empty queue that forms groups of `min_players`.
    pub fn new(min_players: usize) -> Self {
        Self {
            min_players,
            waiting: Mutex::new(VecDeque::new()),
        }
    }

    /// Group size this queue forms.
    pub fn min_players(&self) -> usize {
        self.min_players
    }

    /// Enqueue a player, returning a full group if this arrival completes one.
    ///
    /// The check and drain happen under one lock so two arrivals can never
    /// claim the same waiting player.
    pub async fn push(&self, player: PlayerHandle) -> Option<Vec<PlayerHandle>> {
        let mut waiting = self.waiting.lock().await;
        waiting.push_back(player);
        if waiting.len() >= self.min_players {
            Some(waiting.drain(..self.min_players).collect())
        } else {
            None
        }
    }

    /// Number of players currently waiting.
    pub async fn waiting_count(&self) -> usize {
        self.waiting.lock().await.len()
    }
}
