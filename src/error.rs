use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Errors surfaced by the service layer to the protocol edge.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed underneath a request.
    #[error("storage failure")]
    Storage(#[source] StorageError),
    /// Credentials rejected, or the action needs a signed-in user.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Request payload failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Request is well-formed but cannot run right now.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl ServiceError {
    /// Message safe to put in an `error` reply to the remote client.
    ///
    /// Storage internals stay in the logs; everything else carries text
    /// written for the player.
    pub fn client_message(&self) -> String {
        match self {
            ServiceError::Storage(_) => "internal storage error".into(),
            ServiceError::Unauthorized(msg)
            | ServiceError::InvalidInput(msg)
            | ServiceError::InvalidState(msg) => msg.clone(),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Storage(err)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {err}"))
    }
}
