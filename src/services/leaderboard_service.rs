//! Global top standings across all persisted accounts.

use crate::dto::response::LeaderboardEntry;
use crate::error::ServiceError;
use crate::state::SharedState;

/// Number of entries the leaderboard exposes.
pub const LEADERBOARD_SIZE: usize = 10;

/// Snapshot the highest-scoring accounts, best first.
///
/// Equal scores are ordered by username so repeated calls against an
/// unchanged store return the same page.
pub async fn top_standings(state: &SharedState) -> Result<Vec<LeaderboardEntry>, ServiceError> {
    let mut scores = state.store().list_scores().await?;
    scores.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scores.truncate(LEADERBOARD_SIZE);

    Ok(scores
        .into_iter()
        .map(|(user, score)| LeaderboardEntry { user, score })
        .collect())
}
