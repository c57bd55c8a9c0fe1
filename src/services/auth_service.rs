//! Account registration and login against the user store.

use sha2::{Digest, Sha256};
use tracing::info;
use validator::Validate;

use crate::dao::storage::StorageError;
use crate::dto::request::Credentials;
use crate::error::ServiceError;
use crate::state::SharedState;

/// Hex-encoded SHA-256 digest of a password.
///
/// This is the only form a password ever takes past the wire; plaintext is
/// never stored or logged.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Create a new account from the supplied credentials.
pub async fn register(state: &SharedState, credentials: &Credentials) -> Result<(), ServiceError> {
    credentials.validate()?;

    let hash = hash_password(&credentials.pass);
    match state
        .store()
        .create_user(credentials.user.clone(), hash)
        .await
    {
        Ok(()) => {
            info!(user = %credentials.user, "registered new user");
            Ok(())
        }
        Err(StorageError::DuplicateUser { .. }) => {
            Err(ServiceError::InvalidState("user already exists".into()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Check the supplied credentials and hand back the authenticated username.
///
/// Login deliberately skips input validation so accounts created before a
/// rule change can still sign in; only the stored hash decides.
pub async fn login(state: &SharedState, credentials: &Credentials) -> Result<String, ServiceError> {
    let user = state
        .store()
        .find_user(credentials.user.clone())
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".into()))?;

    if user.password_hash != hash_password(&credentials.pass) {
        return Err(ServiceError::Unauthorized("invalid credentials".into()));
    }

    info!(user = %credentials.user, "user logged in");
    Ok(credentials.user.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ServerConfig;
    use crate::dao::models::QuestionRecord;
    use crate::dao::question_bank::QuestionBank;
    use crate::dao::user_store::memory::MemoryUserStore;
    use crate::state::AppState;

    fn test_state() -> SharedState {
        let bank = QuestionBank::from_records(vec![QuestionRecord {
            id: 1,
            question: "placeholder".into(),
            options: vec!["a".into(), "b".into()],
            answer: 0,
        }]);
        AppState::new(
            ServerConfig::default(),
            Arc::new(MemoryUserStore::new()),
            bank,
        )
    }

    fn creds(user: &str, pass: &str) -> Credentials {
        Credentials {
            user: user.into(),
            pass: pass.into(),
        }
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        // SHA-256 of the empty string, a fixed vector.
        assert_eq!(
            hash_password(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(hash_password("secret").len(), 64);
    }

    #[tokio::test]
    async fn test_register_then_login_round_trips() {
        let state = test_state();
        register(&state, &creds("ada", "hunter2")).await.unwrap();

        let username = login(&state, &creds("ada", "hunter2")).await.unwrap();
        assert_eq!(username, "ada");
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let state = test_state();
        register(&state, &creds("ada", "hunter2")).await.unwrap();

        let err = register(&state, &creds("ada", "other")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(err.client_message(), "user already exists");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let state = test_state();
        register(&state, &creds("ada", "hunter2")).await.unwrap();

        let err = login(&state, &creds("ada", "wrong")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthorized() {
        let state = test_state();

        let err = login(&state, &creds("ghost", "whatever")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert_eq!(err.client_message(), "invalid credentials");
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_username() {
        let state = test_state();

        let err = register(&state, &creds("a", "hunter2")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
