//! Session-related types.
//!
//! Types stored in the session for authentication state and per-visitor
//! storefront state.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;

use nikola_core::Role;

/// Session-stored customer identity.
///
/// The bearer token is forwarded to the backend for account-scoped calls.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Email used to log in.
    pub email: String,
    /// Backend role (`admin` accounts get an admin link and reply rights).
    pub role: Role,
    /// Backend bearer token.
    pub token: String,
}

impl std::fmt::Debug for CurrentCustomer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentCustomer")
            .field("email", &self.email)
            .field("role", &self.role)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl CurrentCustomer {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Toast severity, used as a CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A one-shot notification shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            message: message.into(),
        }
    }
}

/// Session keys for storefront data.
pub mod session_keys {
    /// Logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Cart lines.
    pub const CART: &str = "cart";

    /// Wishlisted products.
    pub const WISHLIST: &str = "wishlist";

    /// Pending toast notifications.
    pub const TOASTS: &str = "toasts";

    /// Order frozen at checkout, awaiting payment.
    pub const ORDER_DRAFT: &str = "order_draft";

    /// Last shipping details entered, to refill the checkout form.
    pub const SHIPPING_DETAILS: &str = "shipping_details";

    /// Advent calendar progress.
    pub const ADVENT: &str = "advent_calendar";

    /// Popup and gift box bookkeeping.
    pub const POPUP: &str = "popup_tracker";

    /// Site testimonials added by this visitor.
    pub const TESTIMONIALS: &str = "testimonials";

    /// Set once the visitor has entered the contest.
    pub const CONTEST_ENTERED: &str = "contest_entered";

    /// Last wheel result, shown until the next spin.
    pub const LAST_SPIN: &str = "last_spin";
}

/// Read a value from the session, falling back to its default when absent.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load<T>(session: &Session, key: &str) -> Result<T, tower_sessions::session::Error>
where
    T: Default + DeserializeOwned,
{
    Ok(session.get::<T>(key).await?.unwrap_or_default())
}

/// Write a value to the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn store<T>(
    session: &Session,
    key: &str,
    value: &T,
) -> Result<(), tower_sessions::session::Error>
where
    T: Serialize + Send + Sync,
{
    session.insert(key, value).await
}

/// Queue a toast for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn push_toast(session: &Session, toast: Toast) -> Result<(), tower_sessions::session::Error> {
    let mut toasts: Vec<Toast> = load(session, session_keys::TOASTS).await?;
    toasts.push(toast);
    store(session, session_keys::TOASTS, &toasts).await
}

/// Take every pending toast, leaving none behind.
///
/// # Errors
///
/// Returns an error if the session store cannot be accessed.
pub async fn take_toasts(session: &Session) -> Result<Vec<Toast>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Toast>>(session_keys::TOASTS)
        .await?
        .unwrap_or_default())
}
