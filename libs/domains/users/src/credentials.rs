//! Argon2 password hashing and the password strength policy.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{UserError, UserResult};

pub fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Internal(format!("Password hashing error: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| UserError::Internal(format!("Stored password hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 8 to 128 characters with an uppercase letter, a lowercase letter, a digit
/// and any character that is neither a letter nor a digit.
pub fn is_strong_password(password: &str) -> bool {
    let len = password.chars().count();

    (8..=128).contains(&len)
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("Sup3r$ecret").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Sup3r$ecret", &hash).unwrap());
        assert!(!verify_password("sup3r$ecret", &hash).unwrap());
    }

    #[test]
    fn test_verify_against_garbage_hash_is_internal_error() {
        let result = verify_password("Sup3r$ecret", "not-a-phc-string");
        assert!(matches!(result, Err(UserError::Internal(_))));
    }

    #[test]
    fn test_password_policy() {
        assert!(is_strong_password("Sup3r$ecret"));
        assert!(!is_strong_password("Sh0rt$"));
        assert!(!is_strong_password("nouppercase1$"));
        assert!(!is_strong_password("NOLOWERCASE1$"));
        assert!(!is_strong_password("NoDigits$$"));
        assert!(!is_strong_password("NoSpecial123"));
        assert!(!is_strong_password(&"Aa1$".repeat(33)));
    }

    #[test]
    fn test_any_non_alphanumeric_counts_as_special() {
        for password in ["Passw0rd~", "Passw0rd/", "Passw0rd'", "Passw0rd \u{20ac}", "Passw0rd\""] {
            assert!(is_strong_password(password), "{password} should be accepted");
        }
        assert!(!is_strong_password("Passw0rd\u{e9}"));
    }
}
