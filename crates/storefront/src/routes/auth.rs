//! Authentication route handlers.
//!
//! Accounts live in the backend. A successful login stores the backend
//! bearer token and role in the session; admin accounts are sent on to the
//! admin panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::account::{AuthResponse, Credentials, RegistrationForm};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{PageContext, clear_current_customer, set_current_customer};
use crate::models::{CurrentCustomer, Toast, push_toast};
use crate::routes::redirect_with_toast;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

/// Display the login page.
pub async fn login_page(ctx: PageContext) -> impl IntoResponse {
    LoginTemplate { ctx }
}

/// Display the registration page.
pub async fn register_page(ctx: PageContext) -> impl IntoResponse {
    RegisterTemplate { ctx }
}

/// Store the logged-in customer and pick where to send them.
async fn start_session(
    state: &AppState,
    session: &Session,
    email: &str,
    auth: AuthResponse,
) -> Result<Redirect> {
    let customer = CurrentCustomer {
        email: email.trim().to_string(),
        role: auth.role,
        token: auth.token,
    };
    set_current_customer(session, &customer).await?;
    set_sentry_user(&customer.email);

    if customer.is_admin() {
        tracing::info!("Admin account logged in, redirecting to admin panel");
        return Ok(Redirect::to(&state.config().admin_url));
    }
    Ok(Redirect::to("/"))
}

/// Handle login form submission.
#[instrument(skip(state, session, credentials), fields(email = %credentials.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Redirect> {
    if let Err(e) = credentials.validate() {
        return redirect_with_toast(&session, "/login", Toast::error(e.to_string())).await;
    }

    match state.backend().login(&credentials).await {
        Ok(auth) => {
            let redirect = start_session(&state, &session, &credentials.email, auth).await?;
            push_toast(&session, Toast::success("Login successful")).await?;
            Ok(redirect)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            let message = e.user_message("Login failed").to_string();
            redirect_with_toast(&session, "/login", Toast::error(message)).await
        }
    }
}

/// Handle registration form submission.
///
/// When the backend answers with a token the new customer is logged in.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegistrationForm>,
) -> Result<Redirect> {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(e) => {
            return redirect_with_toast(&session, "/register", Toast::error(e.to_string())).await;
        }
    };

    match state.backend().register(&registration).await {
        Ok(Some(auth)) => {
            let redirect = start_session(&state, &session, &registration.email, auth).await?;
            push_toast(&session, Toast::success("Registration successful"))
                .await?;
            Ok(redirect)
        }
        Ok(None) => {
            redirect_with_toast(
                &session,
                "/login",
                Toast::success("Registration successful. Please log in."),
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            let message = e.user_message("Registration failed").to_string();
            redirect_with_toast(&session, "/register", Toast::error(message)).await
        }
    }
}

/// Log out. Cart and wishlist stay with the visitor.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_customer(&session).await?;
    clear_sentry_user();
    redirect_with_toast(&session, "/login", Toast::info("Logged out")).await
}
