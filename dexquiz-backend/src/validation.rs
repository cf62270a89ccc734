/// Input validation for the game routes
use thiserror::Error;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_CHARS: usize = 32;

/// Longest accepted raw guess, in characters.
pub const MAX_GUESS_CHARS: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Username cannot be empty")]
    UsernameEmpty,

    #[error("Username too long (max {max} characters, got {actual})")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("Username contains control characters")]
    UsernameInvalidChars,

    #[error("Guess too long (max {max} characters, got {actual})")]
    GuessTooLong { max: usize, actual: usize },
}

/// Validates an already trimmed username
///
/// Rules:
/// - Cannot be empty
/// - At most 32 characters
/// - No control characters
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }

    let len = name.chars().count();
    if len > MAX_USERNAME_CHARS {
        return Err(ValidationError::UsernameTooLong {
            max: MAX_USERNAME_CHARS,
            actual: len,
        });
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::UsernameInvalidChars);
    }

    Ok(())
}

/// Validates a raw guess. Empty guesses are allowed through; the session rejects them itself.
pub fn validate_guess(guess: &str) -> Result<(), ValidationError> {
    let len = guess.chars().count();
    if len > MAX_GUESS_CHARS {
        return Err(ValidationError::GuessTooLong {
            max: MAX_GUESS_CHARS,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("ash").is_ok());
        assert!(validate_username("Ash Ketchum").is_ok());
        assert!(validate_username("ミスティ").is_ok());
        assert!(validate_username(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_empty_username() {
        assert_eq!(validate_username(""), Err(ValidationError::UsernameEmpty));
    }

    #[test]
    fn test_username_too_long() {
        assert_eq!(
            validate_username(&"a".repeat(33)),
            Err(ValidationError::UsernameTooLong {
                max: MAX_USERNAME_CHARS,
                actual: 33
            })
        );
    }

    #[test]
    fn test_username_too_long_message() {
        let err = validate_username(&"a".repeat(40)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Username too long (max {MAX_USERNAME_CHARS} characters, got 40)")
        );
    }

    #[test]
    fn test_username_control_chars() {
        assert_eq!(
            validate_username("ash\nketchum"),
            Err(ValidationError::UsernameInvalidChars)
        );
    }

    #[test]
    fn test_guess_length() {
        assert!(validate_guess("").is_ok());
        assert!(validate_guess("Mr. Mime").is_ok());
        assert_eq!(
            validate_guess(&"x".repeat(65)),
            Err(ValidationError::GuessTooLong {
                max: 64,
                actual: 65
            })
        );
    }
}
