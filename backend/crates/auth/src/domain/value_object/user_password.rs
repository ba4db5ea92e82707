//! User Password Value Objects
//!
//! Domain wrappers over `platform::password`.
//! - [`RawPassword`]: user input, zeroized on drop
//! - [`UserPassword`]: Argon2id PHC string, safe to store, never serialized

use platform::password::{ClearTextPassword, HashedPassword, HashingPolicy, PasswordPolicyError};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a password that is about to be stored
    ///
    /// ## Validation Rules (NIST SP 800-63B)
    /// - 8 to 128 characters
    /// - No control characters
    /// - No common patterns (sequential, keyboard, dictionary)
    /// - Unicode NFKC normalized
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw).map(Self)
    }

    /// Wrap a submitted password that will only be compared
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password for database storage
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password
    pub fn from_raw(
        raw: &RawPassword,
        pepper: Option<&[u8]>,
        policy: &HashingPolicy,
    ) -> AuthResult<Self> {
        raw.inner()
            .hash(pepper, policy)
            .map(Self)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
    }

    /// Create from PHC string (from database)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".to_string()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash (constant time)
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self, policy: &HashingPolicy) -> bool {
        self.0.needs_rehash(policy)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: HashingPolicy = HashingPolicy::insecure_fast();

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("ValidPass#2024".to_string()).is_ok());
        assert!(matches!(
            RawPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(matches!(
            RawPassword::new("password123".to_string()),
            Err(PasswordPolicyError::CommonPattern)
        ));
    }

    #[test]
    fn test_hash_and_verify_with_login_wrapper() {
        let raw = RawPassword::new("Granite-Meadow-7".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, None, &FAST).unwrap();

        assert!(hashed.verify(&RawPassword::for_login("Granite-Meadow-7".to_string()), None));
        assert!(!hashed.verify(&RawPassword::for_login("granite-meadow-7".to_string()), None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let raw = RawPassword::new("Granite-Meadow-7".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(b"pepper"), &FAST).unwrap();

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, Some(b"pepper")));
        assert!(UserPassword::from_phc_string("garbage").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::for_login("SecretPassword123!".to_string());
        assert!(!format!("{:?}", raw).contains("Secret"));

        let hashed = UserPassword::from_raw(&raw, None, &FAST).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }
}
