/// Password policy
///
/// Passwords are stored by the hosted auth service, never here. The API
/// still checks a minimum policy before forwarding a sign-up so users get a
/// field-level validation error instead of an opaque upstream rejection.
///
/// # Rules
///
/// - 8 to 72 characters (72 is the bcrypt input limit upstream)
/// - at least one letter
/// - at least one digit
///
/// # Example
///
/// ```
/// use swamp_shared::auth::password::validate_password_strength;
///
/// assert!(validate_password_strength("chomp1234").is_ok());
/// assert!(validate_password_strength("short1").is_err());
/// ```

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 72;

/// Error type for password policy checks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least 8 characters")]
    TooShort,

    #[error("Password must be at most 72 characters")]
    TooLong,

    #[error("Password must contain a letter")]
    MissingLetter,

    #[error("Password must contain a digit")]
    MissingDigit,
}

/// Checks a password against the policy
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();

    if len < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }
    // Byte length is what the upstream limit counts
    if password.len() > MAX_PASSWORD_LEN {
        return Err(PasswordError::TooLong);
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(PasswordError::MissingLetter);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::MissingDigit);
    }

    Ok(())
}
