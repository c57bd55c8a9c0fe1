//! Quizline binary entrypoint wiring the TCP protocol, matchmaking, and storage layers.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizline::config::{ServerConfig, StoreBackend};
use quizline::dao::question_bank::QuestionBank;
use quizline::dao::user_store::UserStore;
use quizline::dao::user_store::json::JsonUserStore;
use quizline::dao::user_store::memory::MemoryUserStore;
use quizline::server;
use quizline::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env();
    info!(?config, "resolved configuration");

    let store: Arc<dyn UserStore> = match config.store {
        StoreBackend::Json => Arc::new(
            JsonUserStore::open(&config.users_file)
                .await
                .context("opening users file")?,
        ),
        StoreBackend::Memory => Arc::new(MemoryUserStore::new()),
    };
    let bank = QuestionBank::load(&config.questions_file).context("loading question bank")?;

    let addr = config.addr;
    let state = AppState::new(config, store, bank);

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    server::serve(state, listener, shutdown_signal()).await
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
