/// Account registration and login.
pub mod auth_service;
/// Per-connection protocol loop.
pub mod connection_service;
/// Game session orchestration and scoring.
pub mod game_service;
/// Global top standings.
pub mod leaderboard_service;
/// Grouping of waiting players into sessions.
pub mod matchmaking;
