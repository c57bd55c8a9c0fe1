//! Server configuration resolved from environment variables at startup.

use std::{env, fmt::Display, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use tracing::warn;

/// Default TCP port the server listens on.
const DEFAULT_PORT: u16 = 5000;
/// Default users file consumed by the JSON store backend.
const DEFAULT_USERS_FILE: &str = "data.json";
/// Default question bank file.
const DEFAULT_QUESTIONS_FILE: &str = "questions.json";
/// Default minimum group size for matchmaking.
const DEFAULT_MIN_PLAYERS: usize = 2;
/// Default number of questions sampled per game.
const DEFAULT_QUESTIONS_PER_GAME: usize = 5;
/// Default per-answer deadline in seconds.
const DEFAULT_ANSWER_TIMEOUT_SECS: u64 = 15;

/// Which user-store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Persistent JSON file store.
    Json,
    /// Ephemeral in-memory store.
    Memory,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
///
/// Every knob is fixed at process start; nothing is renegotiated while
/// sessions are running.
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub addr: SocketAddr,
    /// Users file consumed by the JSON store backend.
    pub users_file: PathBuf,
    /// Question bank file.
    pub questions_file: PathBuf,
    /// Selected user-store backend.
    pub store: StoreBackend,
    /// Players needed before a group is formed.
    pub min_players: usize,
    /// Questions sampled for each game session.
    pub questions_per_game: usize,
    /// Deadline for collecting each player's answer.
    pub answer_timeout: Duration,
}

impl ServerConfig {
    /// Resolve the configuration from `QUIZLINE_*` environment variables,
    /// falling back to defaults on missing or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let addr = parse_env("QUIZLINE_ADDR", defaults.addr);
        let users_file = env::var("QUIZLINE_USERS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.users_file);
        let questions_file = env::var("QUIZLINE_QUESTIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.questions_file);

        let min_players = parse_positive("QUIZLINE_MIN_PLAYERS", defaults.min_players);
        let questions_per_game =
            parse_positive("QUIZLINE_QUESTIONS_PER_GAME", defaults.questions_per_game);
        let answer_timeout = Duration::from_secs(parse_env(
            "QUIZLINE_ANSWER_TIMEOUT_SECS",
            DEFAULT_ANSWER_TIMEOUT_SECS,
        ));

        let store = match env::var("QUIZLINE_STORE") {
            Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                "json" => StoreBackend::Json,
                "memory" => StoreBackend::Memory,
                other => {
                    warn!(value = other, "unknown store backend; using json");
                    StoreBackend::Json
                }
            },
            Err(_) => defaults.store,
        };

        Self {
            addr,
            users_file,
            questions_file,
            store,
            min_players,
            questions_per_game,
            answer_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            questions_file: PathBuf::from(DEFAULT_QUESTIONS_FILE),
            store: StoreBackend::Json,
            min_players: DEFAULT_MIN_PLAYERS,
            questions_per_game: DEFAULT_QUESTIONS_PER_GAME,
            answer_timeout: Duration::from_secs(DEFAULT_ANSWER_TIMEOUT_SECS),
        }
    }
}

/// Parse one environment variable, warning and falling back on bad values.
fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(err) => {
                warn!(key, value = %raw, error = %err, "invalid value; using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Like [`parse_env`] but treats zero as invalid.
fn parse_positive(key: &str, default: usize) -> usize {
    let value = parse_env(key, default);
    if value == 0 {
        warn!(key, "value must be at least 1; using default");
        default
    } else {
        value
    }
}
