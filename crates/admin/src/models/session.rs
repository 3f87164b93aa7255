//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state and panel
//! preferences.

use serde::{Deserialize, Serialize};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin and
/// call the backend on their behalf.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's email address.
    pub email: String,
    /// Admin's display name.
    pub name: String,
    /// Backend bearer token.
    pub token: String,
}

impl std::fmt::Debug for CurrentAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentAdmin")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys for admin data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the auto-saved new-product form.
    pub const PRODUCT_DRAFT: &str = "product_draft";

    /// Key for the panel colour theme.
    pub const THEME: &str = "theme";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_token() {
        let admin = CurrentAdmin {
            email: "ops@nikola.lk".to_string(),
            name: "Ops".to_string(),
            token: "eyJhbGciOi.secret".to_string(),
        };
        let debug = format!("{admin:?}");
        assert!(debug.contains("ops@nikola.lk"));
        assert!(!debug.contains("secret"));
    }
}
