//! Customer accounts: login, registration, and profiles.
//!
//! The backend owns accounts. This module validates forms before they are
//! sent and describes the responses that come back.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Login and registration form failures.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountError {
    #[error("Please fill all fields")]
    MissingFields,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Login form (`POST /api/users/login`).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Check both fields are filled and the email looks like one.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AccountError::MissingFields);
        }
        if !self.email.contains('@') {
            return Err(AccountError::InvalidEmail);
        }
        Ok(())
    }
}

/// Registration form.
#[derive(Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// `POST /api/users/register` body.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl RegistrationForm {
    /// Validate and build the backend payload.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(self) -> Result<Registration, AccountError> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        if first_name.is_empty()
            || last_name.is_empty()
            || email.is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(AccountError::MissingFields);
        }
        if !email.contains('@') {
            return Err(AccountError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AccountError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(AccountError::PasswordMismatch);
        }
        Ok(Registration {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email: email.to_owned(),
            password: self.password,
        })
    }
}

/// Successful login response.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub role: Role,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// An account as returned by `GET /api/users`, `/api/users/profile` and
/// the admin user listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id", default)]
    pub id: UserId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub is_blocked: bool,
}

impl Profile {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> RegistrationForm {
        RegistrationForm {
            first_name: "Nimal".to_owned(),
            last_name: "Perera".to_owned(),
            email: "nimal@example.com".to_owned(),
            password: "secret1".to_owned(),
            confirm_password: "secret1".to_owned(),
        }
    }

    #[test]
    fn test_credentials() {
        let mut creds = Credentials::default();
        assert_eq!(creds.validate(), Err(AccountError::MissingFields));
        creds.email = "nimal".to_owned();
        creds.password = "x".to_owned();
        assert_eq!(creds.validate(), Err(AccountError::InvalidEmail));
        creds.email = "nimal@example.com".to_owned();
        assert!(creds.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            email: "a@b.c".to_owned(),
            password: "hunter22".to_owned(),
        };
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[test]
    fn test_registration_rules() {
        let mut form = registration();
        form.last_name = " ".to_owned();
        assert_eq!(form.validate().err(), Some(AccountError::MissingFields));

        let mut form = registration();
        form.email = "nimal.example.com".to_owned();
        assert_eq!(form.validate().err(), Some(AccountError::InvalidEmail));

        let mut form = registration();
        form.password = "12345".to_owned();
        form.confirm_password = "12345".to_owned();
        assert_eq!(form.validate().err(), Some(AccountError::PasswordTooShort));

        let mut form = registration();
        form.confirm_password = "secret2".to_owned();
        assert_eq!(form.validate().err(), Some(AccountError::PasswordMismatch));
    }

    #[test]
    fn test_registration_payload() {
        let payload = registration().validate().unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["firstName"], "Nimal");
        assert_eq!(json["lastName"], "Perera");
        assert!(json.get("confirmPassword").is_none());
    }

    #[test]
    fn test_auth_response_defaults_role() {
        let auth: AuthResponse = serde_json::from_str(r#"{"token": "t"}"#).unwrap();
        assert_eq!(auth.role, Role::User);
    }

    #[test]
    fn test_full_name() {
        let profile = Profile {
            first_name: "Nimal".to_owned(),
            ..Profile::default()
        };
        assert_eq!(profile.full_name(), "Nimal");
    }
}
