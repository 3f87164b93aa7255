//! Admin authentication routes.
//!
//! Admins sign in with their backend account. The login response must
//! carry the admin role, and `/api/users/profile` is asked to confirm it
//! before a session is created.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::account::{Credentials, Profile};

use crate::{
    backend::BackendError,
    error::{Result, clear_sentry_user, set_sentry_user},
    filters,
    middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin},
    models::CurrentAdmin,
    routes::{NoticeQuery, redirect_error, redirect_success, render},
    state::AppState,
};

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page, or skip it for an active session.
#[instrument(skip(admin, notice))]
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(notice): Query<NoticeQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    let template = LoginTemplate {
        email: String::new(),
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    };
    render(&template).into_response()
}

/// Display name for the session: full name, else the login email.
fn display_name(profile: &Profile, email: &str) -> String {
    let name = profile.full_name();
    if name.is_empty() {
        email.to_string()
    } else {
        name
    }
}

fn login_failed(email: &str, message: &str) -> Html<String> {
    render(&LoginTemplate {
        email: email.to_string(),
        success_message: None,
        error_message: Some(message.to_string()),
    })
}

/// Handle the login form.
#[instrument(skip(state, session, credentials), fields(email = %credentials.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> Result<Response> {
    if let Err(e) = credentials.validate() {
        return Ok(login_failed(&credentials.email, &e.to_string()).into_response());
    }

    let auth = match state.backend().login(&credentials).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "Admin login failed");
            let message = e.user_message("Login failed").to_string();
            return Ok(login_failed(&credentials.email, &message).into_response());
        }
    };

    if !auth.role.is_admin() {
        tracing::warn!("Non-admin account tried the admin panel");
        return Ok(redirect_error("/login", "not_admin").into_response());
    }

    let profile = match state.backend().profile(&auth.token).await {
        Ok(profile) if profile.role.is_admin() => profile,
        Ok(_) | Err(BackendError::Unauthorized(_)) => {
            return Ok(redirect_error("/login", "not_admin").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let admin = CurrentAdmin {
        email: credentials.email.trim().to_string(),
        name: display_name(&profile, credentials.email.trim()),
        token: auth.token,
    };
    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.email, &admin.name);

    tracing::info!(admin = %admin.email, "Admin logged in");
    Ok(Redirect::to("/").into_response())
}

/// Log out and return to the login page.
#[instrument(skip(session))]
async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(redirect_success("/login", "logged_out"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_profile() {
        let profile = Profile {
            first_name: "Kasun".to_string(),
            last_name: "Perera".to_string(),
            ..Profile::default()
        };
        assert_eq!(display_name(&profile, "k@nikola.lk"), "Kasun Perera");
        assert_eq!(display_name(&Profile::default(), "k@nikola.lk"), "k@nikola.lk");
    }
}
