//! Email address type.
//!
//! Login, registration and contact forms only check for an `@`. Reviews are
//! tied to past orders by address, so they go through [`Email::parse`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an address was rejected.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email cannot contain whitespace")]
    Whitespace,
    #[error("email must contain exactly one @ symbol")]
    AtSymbol,
    #[error("email needs a name before the @")]
    NoMailbox,
    #[error("email domain must look like name.suffix")]
    Domain,
}

/// A checked email address, stored as typed (surrounding spaces removed).
///
/// ```
/// use nikola_core::Email;
///
/// assert!(Email::parse(" kasun@nikola.lk ").is_ok());
/// assert!(Email::parse("kasun@localhost").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse an address of the form `mailbox@name.suffix`.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        let (mailbox, domain) = s.split_once('@').ok_or(EmailError::AtSymbol)?;
        if domain.contains('@') {
            return Err(EmailError::AtSymbol);
        }
        if mailbox.is_empty() {
            return Err(EmailError::NoMailbox);
        }
        match domain.split_once('.') {
            Some((name, suffix)) if !name.is_empty() && !suffix.is_empty() => {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Domain),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything after the @.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_addresses() {
        for input in ["kasun@nikola.lk", "a.b+gifts@mail.example.co.uk", "x@y.z"] {
            assert_eq!(Email::parse(input).unwrap().as_str(), input);
        }
    }

    #[test]
    fn test_trims_surrounding_space() {
        let email = Email::parse("  kasun@nikola.lk\n").unwrap();
        assert_eq!(email.to_string(), "kasun@nikola.lk");
        assert_eq!(email.domain(), "nikola.lk");
    }

    #[test]
    fn test_rejections() {
        let cases = [
            ("   ", EmailError::Empty),
            ("kasun perera@nikola.lk", EmailError::Whitespace),
            ("kasun.nikola.lk", EmailError::AtSymbol),
            ("a@b@nikola.lk", EmailError::AtSymbol),
            ("@nikola.lk", EmailError::NoMailbox),
            ("kasun@localhost", EmailError::Domain),
            ("kasun@.lk", EmailError::Domain),
            ("kasun@nikola.", EmailError::Domain),
        ];
        for (input, expected) in cases {
            assert_eq!(Email::parse(input), Err(expected), "{input:?}");
        }

        let long = format!("{}@nikola.lk", "a".repeat(250));
        assert_eq!(Email::parse(&long), Err(EmailError::TooLong));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email: Email = "kasun@nikola.lk".parse().unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"kasun@nikola.lk\"");
    }
}
