//! Registered accounts.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tracing::instrument;

use nikola_core::account::Profile;

use crate::{
    filters,
    middleware::auth::RequireAdminAuth,
    routes::{NoticeQuery, render},
    state::AppState,
};

use super::dashboard::AdminUserView;

/// User row.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
    pub is_blocked: bool,
}

impl From<&Profile> for UserView {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.full_name(),
            email: profile.email.clone(),
            role: profile.role.to_string(),
            is_admin: profile.role.is_admin(),
            is_blocked: profile.is_blocked,
        }
    }
}

/// Users page template.
#[derive(Template)]
#[template(path = "users.html")]
pub struct UsersTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub users: Vec<UserView>,
    pub blocked_count: usize,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(users_index))
}

/// Every registered account.
#[instrument(skip(admin, state, notice))]
async fn users_index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let mut error_message = notice.error_message();
    let users: Vec<UserView> = match state.backend().users(&admin.token).await {
        Ok(users) => users.iter().map(UserView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch users: {e}");
            error_message = Some("Failed to load users".to_string());
            Vec::new()
        }
    };

    render(&UsersTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/users".to_string(),
        blocked_count: users.iter().filter(|u| u.is_blocked).count(),
        users,
        success_message: notice.success_message(),
        error_message,
    })
}
