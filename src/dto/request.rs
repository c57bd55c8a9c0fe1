use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::validation::{validate_password, validate_username};

/// Messages accepted from clients on the line protocol.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Create a new account.
    #[serde(rename = "register")]
    Register(Credentials),
    /// Bind this connection to an existing account.
    #[serde(rename = "login")]
    Login(Credentials),
    /// Join the matchmaking queue.
    #[serde(rename = "start")]
    Start,
    /// Fetch the global top standings.
    #[serde(rename = "leaderboard")]
    Leaderboard,
    /// Reply to the currently open question.
    #[serde(rename = "answer")]
    Answer {
        /// Identifier of the question being answered.
        id: u64,
        /// Index of the chosen option.
        choice: u32,
    },
    /// Close the connection.
    #[serde(rename = "exit")]
    Exit,
    #[serde(other)]
    Unknown,
}

/// Credential pair carried by `register` and `login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    /// Account name.
    pub user: String,
    /// Clear-text password; hashed before it ever reaches the store.
    pub pass: String,
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_username(&self.user) {
            errors.add("user", e);
        }
        if let Err(e) = validate_password(&self.pass) {
            errors.add("pass", e);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
