use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Stored account data for a single player.
///
/// Keyed by username in the users document; the name itself is not repeated
/// inside the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Hex-encoded SHA-256 digest of the account password.
    pub password_hash: String,
    /// All-time score accumulated across completed game sessions.
    #[serde(default)]
    pub score: i64,
    /// Registration timestamp for auditing/debugging.
    #[serde(default = "SystemTime::now")]
    pub created_at: SystemTime,
}

impl UserEntity {
    /// Fresh account with a zero score.
    pub fn new(password_hash: String) -> Self {
        Self {
            password_hash,
            score: 0,
            created_at: SystemTime::now(),
        }
    }
}

/// One multiple-choice question loaded from the bank file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionRecord {
    /// Stable identifier referenced by answer replies.
    pub id: u64,
    /// Prompt shown identically to every player of a group.
    pub question: String,
    /// Ordered list of candidate answers.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer. Stays server-side.
    pub answer: u32,
}
