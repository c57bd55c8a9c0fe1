//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a username is 3 to 24 characters of letters, digits,
/// `_`, `-` or `.`.
///
/// # Examples
///
/// ```ignore
/// validate_username("ada")        // Ok
/// validate_username("a")          // Err - too short
/// validate_username("ada lovela") // Err - whitespace
/// ```
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    if name.len() < 3 || name.len() > 24 {
        let mut err = ValidationError::new("username_length");
        err.message =
            Some(format!("username must be 3 to 24 characters (got {})", name.len()).into());
        return Err(err);
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        let mut err = ValidationError::new("username_format");
        err.message = Some("username may only contain letters, digits, '_', '-' and '.'".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a password is 4 to 128 bytes long.
pub fn validate_password(pass: &str) -> Result<(), ValidationError> {
    if pass.len() < 4 || pass.len() > 128 {
        let mut err = ValidationError::new("password_length");
        err.message =
            Some(format!("password must be 4 to 128 characters (got {})", pass.len()).into());
        return Err(err);
    }

    Ok(())
}
