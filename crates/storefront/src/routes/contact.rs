//! Contact form and newsletter sign-up.
//!
//! The contact form files a support ticket with the backend. Newsletter
//! sign-up is two steps: request a one-time code by email, then confirm it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::contact::{self as contact_rules, ContactTicket};

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::Toast;
use crate::routes::{local_path, redirect_with_toast};
use crate::state::AppState;

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub ctx: PageContext,
}

/// Newsletter form data. `otp` is only sent on the second step.
#[derive(Debug, Deserialize)]
pub struct NewsletterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Display the contact page.
pub async fn show(ctx: PageContext) -> impl IntoResponse {
    ContactTemplate { ctx }
}

/// File a support ticket.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactTicket>,
) -> Result<Redirect> {
    let ticket = match form.validate() {
        Ok(ticket) => ticket,
        Err(e) => {
            return redirect_with_toast(&session, "/contact-us", Toast::error(e.to_string())).await;
        }
    };

    match state.backend().submit_ticket(&ticket).await {
        Ok(()) => {
            tracing::info!(subject = %ticket.subject, "Support ticket submitted");
            redirect_with_toast(
                &session,
                "/contact-us",
                Toast::success("Message sent! We'll get back to you soon."),
            )
            .await
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to submit support ticket");
            let message = e.user_message("Failed to send message").to_string();
            redirect_with_toast(&session, "/contact-us", Toast::error(message)).await
        }
    }
}

/// Newsletter step one: email a one-time code.
#[instrument(skip(state, session, form))]
pub async fn newsletter_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewsletterForm>,
) -> Result<Redirect> {
    let back = local_path(form.next.as_deref(), "/");
    let email = match contact_rules::newsletter_email(&form.email) {
        Ok(email) => email,
        Err(e) => return redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    };

    match state.backend().newsletter_send_otp(&email).await {
        Ok(()) => {
            redirect_with_toast(&session, &back, Toast::success("OTP sent to your email")).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to send newsletter OTP");
            let message = e.user_message("Failed to send OTP").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}

/// Newsletter step two: confirm the code.
#[instrument(skip(state, session, form))]
pub async fn newsletter_verify(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewsletterForm>,
) -> Result<Redirect> {
    let back = local_path(form.next.as_deref(), "/");
    let checked = contact_rules::newsletter_email(&form.email).and_then(|email| {
        let otp = contact_rules::newsletter_otp(&form.otp)?;
        Ok((email, otp))
    });
    let (email, otp) = match checked {
        Ok(pair) => pair,
        Err(e) => return redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    };

    match state.backend().newsletter_verify_otp(&email, &otp).await {
        Ok(()) => {
            redirect_with_toast(
                &session,
                &back,
                Toast::success("Subscribed to our newsletter!"),
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Newsletter OTP rejected");
            let message = e.user_message("Invalid OTP").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}
