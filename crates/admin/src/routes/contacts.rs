//! Support tickets sent through the storefront contact form.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tracing::instrument;

use nikola_core::contact::Ticket;

use crate::{
    filters,
    middleware::auth::RequireAdminAuth,
    routes::{NoticeQuery, render},
    state::AppState,
};

use super::dashboard::AdminUserView;

/// Ticket row.
#[derive(Debug, Clone)]
pub struct TicketView {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub received: String,
}

impl From<&Ticket> for TicketView {
    fn from(ticket: &Ticket) -> Self {
        Self {
            name: ticket.body.name.clone(),
            email: ticket.body.email.clone(),
            subject: ticket.body.subject.clone(),
            message: ticket.body.message.clone(),
            status: ticket.status.clone().unwrap_or_else(|| "open".to_string()),
            received: ticket
                .created_at
                .map(|at| at.format("%b %d, %Y %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Contacts page template.
#[derive(Template)]
#[template(path = "contacts.html")]
pub struct ContactsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub tickets: Vec<TicketView>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the contacts router.
pub fn router() -> Router<AppState> {
    Router::new().route("/contacts", get(contacts_index))
}

/// Support tickets, newest first.
#[instrument(skip(admin, state, notice))]
async fn contacts_index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let mut error_message = notice.error_message();
    let tickets = match state.backend().tickets(&admin.token).await {
        Ok(mut tickets) => {
            tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            tickets.iter().map(TicketView::from).collect()
        }
        Err(e) => {
            tracing::error!("Failed to fetch tickets: {e}");
            error_message = Some("Failed to load messages".to_string());
            Vec::new()
        }
    };

    render(&ContactsTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/contacts".to_string(),
        tickets,
        success_message: notice.success_message(),
        error_message,
    })
}
