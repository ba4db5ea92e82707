//! Input validation shared by registration and user administration
//!
//! Every check appends to a list of field errors so a client sees all of
//! its mistakes in one response.

use kernel::error::app_error::FieldError;
use platform::password::PasswordPolicyError;

use crate::domain::value_object::{Email, RawPassword};
use crate::error::AuthError;

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_PHONE_LENGTH: usize = 20;
pub const MAX_AVATAR_LENGTH: usize = 255;

/// Collects field errors while parsing one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message.into()));
    }

    pub fn email(&mut self, field: &'static str, raw: &str) -> Option<Email> {
        Email::new(raw)
            .map_err(|e| self.push(field, e.to_string()))
            .ok()
    }

    /// A password that is about to be stored
    pub fn new_password(&mut self, field: &'static str, raw: String) -> Option<RawPassword> {
        RawPassword::new(raw)
            .map_err(|e| {
                let message = match e {
                    PasswordPolicyError::EmptyOrWhitespace => "Password is required".to_string(),
                    other => other.to_string(),
                };
                self.push(field, message)
            })
            .ok()
    }

    /// Non-empty after trimming, at most `max` characters
    pub fn required_text(
        &mut self,
        field: &'static str,
        label: &str,
        raw: &str,
        max: usize,
    ) -> Option<String> {
        let value = raw.trim();
        if value.is_empty() {
            self.push(field, format!("{label} is required"));
            return None;
        }
        self.optional_text(field, label, value, max)
    }

    /// At most `max` characters after trimming
    pub fn optional_text(
        &mut self,
        field: &'static str,
        label: &str,
        raw: &str,
        max: usize,
    ) -> Option<String> {
        let value = raw.trim();
        if value.chars().count() > max {
            self.push(field, format!("{label} must be at most {max} characters"));
            return None;
        }
        Some(value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_error(self) -> AuthError {
        AuthError::Validation(self.errors)
    }

    /// `Err(Validation)` if anything was pushed
    pub fn finish(self) -> Result<(), AuthError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_error() {
        let mut v = Validator::new();
        assert!(v.email("email", "nope").is_none());
        assert!(v.new_password("password", "short".into()).is_none());
        assert!(v.required_text("fullName", "Full name", "   ", 10).is_none());
        assert!(v.required_text("phone", "Phone", "12345678901", 10).is_none());

        let Err(AuthError::Validation(errors)) = v.finish() else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_ref()).collect();
        assert_eq!(fields, vec!["email", "password", "fullName", "phone"]);
    }

    #[test]
    fn test_trims_values() {
        let mut v = Validator::new();
        assert_eq!(
            v.required_text("fullName", "Full name", "  Ada  ", 10).as_deref(),
            Some("Ada")
        );
        assert!(v.finish().is_ok());
    }

    #[test]
    fn test_empty_password_message() {
        let mut v = Validator::new();
        v.new_password("password", String::new());
        let Err(AuthError::Validation(errors)) = v.finish() else {
            panic!("expected validation error");
        };
        assert_eq!(errors[0].message, "Password is required");
    }
}
