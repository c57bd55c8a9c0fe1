//! Shared server state and the session-side building blocks.

pub mod queue;
pub mod session;
pub mod state_machine;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::dao::question_bank::QuestionBank;
use crate::dao::user_store::UserStore;
use crate::dto::response::ServerMessage;
use crate::state::queue::MatchQueue;

pub type SharedState = Arc<AppState>;

#[derive(Clone)]
/// Handle used to push messages to a connected client.
pub struct ClientConnection {
    pub conn_id: u64,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Central application state storing live connections and storage handles.
pub struct AppState {
    config: ServerConfig,
    store: Arc<dyn UserStore>,
    bank: QuestionBank,
    queue: MatchQueue,
    clients: DashMap<u64, ClientConnection>,
    next_conn_id: AtomicU64,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: ServerConfig, store: Arc<dyn UserStore>, bank: QuestionBank) -> SharedState {
        let queue = MatchQueue::new(config.min_players);
        Arc::new(Self {
            config,
            store,
            bank,
            queue,
            clients: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        })
    }

    /// Resolved server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handle to the persistent user store.
    pub fn store(&self) -> Arc<dyn UserStore> {
        self.store.clone()
    }

    /// Question bank sessions draw from.
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Waiting room for players asking to start a game.
    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    /// Registry of active client connections keyed by connection id.
    pub fn clients(&self) -> &DashMap<u64, ClientConnection> {
        &self.clients
    }

    /// Mint a fresh connection id.
    pub fn next_conn_id(&self) -> u64 {
        self.next_conn_id.fetch_add(1, Ordering::Relaxed)
    }
}
