//! Credential Hasher
//!
//! Hashes and verifies passwords with the configured pepper and Argon2 cost.
//! Also burns one verification against a throwaway hash when the account
//! does not exist, so unknown emails take as long as wrong passwords.

use platform::password::HashingPolicy;

use crate::application::config::AuthConfig;
use crate::domain::value_object::{RawPassword, UserPassword};
use crate::error::AuthResult;

pub struct CredentialHasher {
    pepper: Option<Vec<u8>>,
    policy: HashingPolicy,
    dummy: UserPassword,
}

impl CredentialHasher {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let filler = RawPassword::for_login(uuid::Uuid::new_v4().to_string());
        let dummy = UserPassword::from_raw(&filler, config.pepper(), &config.hashing)?;

        Ok(Self {
            pepper: config.password_pepper.clone(),
            policy: config.hashing,
            dummy,
        })
    }

    pub fn hash(&self, password: &RawPassword) -> AuthResult<UserPassword> {
        UserPassword::from_raw(password, self.pepper.as_deref(), &self.policy)
    }

    pub fn verify(&self, password: &RawPassword, stored: &UserPassword) -> bool {
        stored.verify(password, self.pepper.as_deref())
    }

    /// Equalizes timing for unknown accounts. Always fails.
    pub fn verify_dummy(&self, password: &RawPassword) {
        let _ = self.dummy.verify(password, self.pepper.as_deref());
    }

    pub fn needs_rehash(&self, stored: &UserPassword) -> bool {
        stored.needs_rehash(&self.policy)
    }
}
