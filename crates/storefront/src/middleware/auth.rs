//! Authentication extractors.
//!
//! A customer is "logged in" when the session holds a [`CurrentCustomer`]
//! with a backend bearer token.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentCustomer, Toast, push_toast, session_keys};

/// Extractor that requires a logged-in customer.
///
/// Page requests without one are sent to `/login` with a toast; JSON
/// requests get `401`.
///
/// # Example
///
/// ```rust,ignore
/// async fn payment_page(RequireAuth(customer): RequireAuth) -> impl IntoResponse {
///     format!("Paying as {}", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        if let Some(customer) = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
            .ok()
            .flatten()
        {
            return Ok(Self(customer));
        }

        if parts.uri.path().starts_with("/api/") {
            return Err(AuthRejection::Unauthorized);
        }
        if let Err(e) = push_toast(session, Toast::error("Please log in first")).await {
            tracing::warn!(error = %e, "Failed to queue login toast");
        }
        Err(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the current customer.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the customer in the session after login.
///
/// The session ID is cycled to prevent fixation.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Remove the customer from the session (logout).
///
/// Cart and wishlist stay with the visitor.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    session.remove_value(session_keys::ORDER_DRAFT).await?;
    Ok(())
}
