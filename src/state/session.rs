use indexmap::IndexMap;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

use crate::dto::response::{RankingEntry, ServerMessage};

/// Reply forwarded from a connection into its game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerReply {
    /// Question the client is answering.
    pub question_id: u64,
    /// Index of the chosen option.
    pub choice: u32,
}

/// Connection-side handle a game session holds for one player.
///
/// The outbox feeds the connection's writer task. The answer receiver is the
/// session-scoped channel minted by the connection on `start`; the connection
/// keeps the sender half and learns the session is over when this half is
/// dropped.
pub struct PlayerHandle {
    conn_id: u64,
    username: String,
    outbox: mpsc::UnboundedSender<ServerMessage>,
    answers: mpsc::UnboundedReceiver<AnswerReply>,
}

impl PlayerHandle {
    /// Bundle a connection's channels into a queueable handle.
    pub fn new(
        conn_id: u64,
        username: String,
        outbox: mpsc::UnboundedSender<ServerMessage>,
        answers: mpsc::UnboundedReceiver<AnswerReply>,
    ) -> Self {
        Self {
            conn_id,
            username,
            outbox,
            answers,
        }
    }

    /// Connection this handle belongs to.
    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    /// Account the player was signed in as when they queued.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Queue a message on the player's connection.
    ///
    /// Best-effort: a closed outbox (disconnected client) is reported as
    /// `false`, never an error.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbox.send(message).is_ok()
    }

    /// Wait until `deadline` for a reply to `question_id`.
    ///
    /// Replies carrying another question id are drained and discarded so a
    /// late answer from a previous round cannot poison the current one.
    /// Deadline expiry and a closed channel (disconnect or exit) both yield
    /// `None`.
    pub async fn await_answer(&mut self, question_id: u64, deadline: Instant) -> Option<u32> {
        loop {
            match timeout_at(deadline, self.answers.recv()).await {
                Ok(Some(reply)) if reply.question_id == question_id => return Some(reply.choice),
                Ok(Some(stale)) => {
                    debug!(
                        conn = self.conn_id,
                        expected = question_id,
                        got = stale.question_id,
                        "discarding stale answer"
                    );
                }
                Ok(None) | Err(_) => return None,
            }
        }
    }
}

/// Per-session score table keyed by username in group order.
///
/// Insertion order doubles as the stable tie-break when ranking equal
/// scores, so the player who queued first wins the tie.
#[derive(Debug, Default)]
pub struct ScoreTable {
    scores: IndexMap<String, i64>,
}

impl ScoreTable {
    /// Initialise a zeroed table for the given group, preserving its order.
    pub fn for_group<'a>(usernames: impl IntoIterator<Item = &'a str>) -> Self {
        let scores = usernames
            .into_iter()
            .map(|name| (name.to_string(), 0))
            .collect();
        Self { scores }
    }

    /// Add `delta` to one player's session score, returning the new value.
    pub fn apply(&mut self, username: &str, delta: i64) -> i64 {
        let entry = self.scores.entry(username.to_string()).or_insert(0);
        *entry += delta;
        *entry
    }

    /// Rows in group order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, i64)> {
        self.scores.iter().map(|(name, score)| (name.as_str(), *score))
    }

    /// Final standings sorted by descending score; ties keep group order.
    pub fn ranking(&self) -> Vec<RankingEntry> {
        let mut entries: Vec<RankingEntry> = self
            .scores
            .iter()
            .map(|(user, pts)| RankingEntry {
                user: user.clone(),
                pts: *pts,
            })
            .collect();
        entries.sort_by_key(|entry| std::cmp::Reverse(entry.pts));
        entries
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn handle(
        conn_id: u64,
        username: &str,
    ) -> (
        PlayerHandle,
        mpsc::UnboundedReceiver<ServerMessage>,
        mpsc::UnboundedSender<AnswerReply>,
    ) {
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let (answer_tx, answer_rx) = mpsc::unbounded_channel();
        (
            PlayerHandle::new(conn_id, username.into(), outbox_tx, answer_rx),
            outbox_rx,
            answer_tx,
        )
    }

    #[tokio::test]
    async fn valid_answer_is_returned() {
        let (mut player, _outbox, answers) = handle(1, "ada");
        answers
            .send(AnswerReply {
                question_id: 7,
                choice: 2,
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        assert_eq!(player.await_answer(7, deadline).await, Some(2));
    }

    #[tokio::test]
    async fn stale_answers_are_drained() {
        let (mut player, _outbox, answers) = handle(1, "ada");
        answers
            .send(AnswerReply {
                question_id: 6,
                choice: 0,
            })
            .unwrap();
        answers
            .send(AnswerReply {
                question_id: 7,
                choice: 3,
            })
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(1);
        assert_eq!(player.await_answer(7, deadline).await, Some(3));
    }

    #[tokio::test]
    async fn deadline_expiry_yields_none() {
        let (mut player, _outbox, _answers) = handle(1, "ada");

        let deadline = Instant::now() + Duration::from_millis(50);
        assert_eq!(player.await_answer(7, deadline).await, None);
    }

    #[tokio::test]
    async fn closed_channel_yields_none() {
        let (mut player, _outbox, answers) = handle(1, "ada");
        drop(answers);

        let deadline = Instant::now() + Duration::from_secs(5);
        assert_eq!(player.await_answer(7, deadline).await, None);
    }

    #[test]
    fn send_reports_a_closed_outbox() {
        let (player, outbox, _answers) = handle(1, "ada");
        assert!(player.send(ServerMessage::info("hi")));
        drop(outbox);
        assert!(!player.send(ServerMessage::info("gone")));
    }

    #[test]
    fn ranking_sorts_descending_with_stable_ties() {
        let mut table = ScoreTable::for_group(["ada", "bob", "eve"]);
        table.apply("ada", 10);
        table.apply("bob", -5);
        table.apply("eve", 10);

        let ranking = table.ranking();
        let order: Vec<(&str, i64)> = ranking
            .iter()
            .map(|entry| (entry.user.as_str(), entry.pts))
            .collect();
        // ada and eve tie at 10; ada queued first so she stays ahead.
        assert_eq!(order, vec![("ada", 10), ("eve", 10), ("bob", -5)]);
    }

    #[test]
    fn duplicate_usernames_collapse_to_one_row() {
        let mut table = ScoreTable::for_group(["ada", "ada"]);
        table.apply("ada", 10);
        table.apply("ada", 10);

        assert_eq!(table.rows().collect::<Vec<_>>(), vec![("ada", 20)]);
    }
}
