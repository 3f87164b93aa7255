//! Support tickets and newsletter sign-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::TicketId;

/// Contact and newsletter form failures.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Please enter email")]
    MissingNewsletterEmail,
    #[error("Enter OTP")]
    MissingOtp,
}

/// Contact form body (`POST /api/tickets`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTicket {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactTicket {
    /// Trim every field and check they are filled and the email has an `@`.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(self) -> Result<Self, ContactError> {
        let ticket = Self {
            name: self.name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            subject: self.subject.trim().to_owned(),
            message: self.message.trim().to_owned(),
        };
        if [&ticket.name, &ticket.email, &ticket.subject, &ticket.message]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(ContactError::MissingFields);
        }
        if !ticket.email.contains('@') {
            return Err(ContactError::InvalidEmail);
        }
        Ok(ticket)
    }
}

/// A stored ticket, as listed in the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: TicketId,
    #[serde(flatten)]
    pub body: ContactTicket,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Newsletter email step: the address that should receive an OTP.
///
/// # Errors
///
/// Returns [`ContactError::MissingNewsletterEmail`] for a blank address.
pub fn newsletter_email(email: &str) -> Result<String, ContactError> {
    let email = email.trim();
    if email.is_empty() {
        Err(ContactError::MissingNewsletterEmail)
    } else {
        Ok(email.to_owned())
    }
}

/// Newsletter OTP step.
///
/// # Errors
///
/// Returns [`ContactError::MissingOtp`] for a blank code.
pub fn newsletter_otp(otp: &str) -> Result<String, ContactError> {
    let otp = otp.trim();
    if otp.is_empty() {
        Err(ContactError::MissingOtp)
    } else {
        Ok(otp.to_owned())
    }
}
