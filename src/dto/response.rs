use serde::{Deserialize, Serialize};

use crate::dao::models::QuestionRecord;

/// Messages pushed to clients on the line protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Positive acknowledgement of a request.
    #[serde(rename = "ok")]
    Ack {
        /// Human-readable detail.
        msg: String,
    },
    /// Status notice that is not a direct acknowledgement.
    #[serde(rename = "info")]
    Info {
        /// Human-readable detail.
        msg: String,
    },
    /// Request rejected or failed.
    #[serde(rename = "error")]
    Error {
        /// Reason shown to the client.
        msg: String,
    },
    /// New round opened for the recipient's group.
    #[serde(rename = "question")]
    Question {
        /// Identifier to echo back in the answer.
        id: u64,
        /// Prompt text.
        question: String,
        /// Candidate answers in display order.
        options: Vec<String>,
    },
    /// Per-player outcome for the just-scored round.
    #[serde(rename = "result")]
    RoundResult {
        /// Whether the player picked the correct option in time.
        correct: bool,
        /// The player's running session score.
        score: i64,
    },
    /// Final standings for the group, descending score.
    #[serde(rename = "session_end")]
    SessionEnd {
        /// Session scores, best first.
        ranking: Vec<RankingEntry>,
    },
    /// Global top standings.
    #[serde(rename = "leaderboard")]
    Leaderboard {
        /// Cumulative scores, best first, at most ten rows.
        entries: Vec<LeaderboardEntry>,
    },
}

/// One row of a session's final standings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankingEntry {
    /// Player username.
    pub user: String,
    /// Session score earned by that player.
    pub pts: i64,
}

/// One row of the global leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Player username.
    pub user: String,
    /// Cumulative all-time score.
    pub score: i64,
}

impl ServerMessage {
    /// Positive acknowledgement with the given detail.
    pub fn ack(msg: impl Into<String>) -> Self {
        ServerMessage::Ack { msg: msg.into() }
    }

    /// Status notice with the given detail.
    pub fn info(msg: impl Into<String>) -> Self {
        ServerMessage::Info { msg: msg.into() }
    }

    /// Rejection carrying a reason shown to the client.
    pub fn error(msg: impl Into<String>) -> Self {
        ServerMessage::Error { msg: msg.into() }
    }

    /// Wire form of a question; the correct-option index stays server-side.
    pub fn question(record: &QuestionRecord) -> Self {
        ServerMessage::Question {
            id: record.id,
            question: record.question.clone(),
            options: record.options.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_the_wire_names() {
        let payload = serde_json::to_string(&ServerMessage::ack("registered")).unwrap();
        assert_eq!(payload, r#"{"type":"ok","msg":"registered"}"#);

        let payload = serde_json::to_string(&ServerMessage::RoundResult {
            correct: true,
            score: 10,
        })
        .unwrap();
        assert_eq!(payload, r#"{"type":"result","correct":true,"score":10}"#);

        let payload = serde_json::to_string(&ServerMessage::SessionEnd {
            ranking: vec![RankingEntry {
                user: "ada".into(),
                pts: 10,
            }],
        })
        .unwrap();
        assert_eq!(
            payload,
            r#"{"type":"session_end","ranking":[{"user":"ada","pts":10}]}"#
        );
    }

    #[test]
    fn question_wire_form_never_leaks_the_answer() {
        let record = QuestionRecord {
            id: 7,
            question: "2 + 2?".into(),
            options: vec!["3".into(), "4".into()],
            answer: 1,
        };

        let payload = serde_json::to_string(&ServerMessage::question(&record)).unwrap();
        assert!(payload.contains(r#""id":7"#));
        assert!(!payload.contains("answer"));
    }
}
