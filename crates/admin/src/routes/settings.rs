//! Admin settings routes.
//!
//! Panel colours live in the admin's session and are served back as CSS
//! variables from `/theme.css`. Promo codes, newsletter broadcasts and
//! holiday mode are stored by the backend.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::admin::{Broadcast, Promo, PromoForm, Theme};
use nikola_core::promo::{HolidayStatus, HolidayUpdate};

use crate::{
    error::Result,
    filters,
    middleware::auth::RequireAdminAuth,
    models::session_keys,
    routes::{NoticeQuery, redirect_error, redirect_success, render},
    state::AppState,
};

use super::dashboard::AdminUserView;

// =============================================================================
// Templates
// =============================================================================

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub theme: Theme,
    pub promos: Vec<Promo>,
    pub default_discount: u8,
    pub holiday: Option<HolidayStatus>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(settings_page))
        .route("/settings/theme", post(update_theme))
        .route("/settings/promos", post(create_promo))
        .route("/settings/broadcast", post(send_broadcast))
        .route("/settings/holiday", post(update_holiday))
        .route("/theme.css", get(theme_css))
}

async fn current_theme(session: &Session) -> Result<Theme> {
    Ok(session
        .get::<Theme>(session_keys::THEME)
        .await?
        .unwrap_or_default())
}

// =============================================================================
// Page
// =============================================================================

/// Settings page.
#[instrument(skip(admin, state, session, notice))]
async fn settings_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(notice): Query<NoticeQuery>,
) -> Result<Html<String>> {
    let theme = current_theme(&session).await?;
    let backend = state.backend();
    let (promos, holiday) = tokio::join!(backend.promos(&admin.token), backend.holiday_status());

    let promos = promos.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch promos: {e}");
        Vec::new()
    });
    let holiday = holiday
        .map_err(|e| tracing::error!("Failed to fetch holiday status: {e}"))
        .ok();

    Ok(render(&SettingsTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/settings".to_string(),
        theme,
        promos,
        default_discount: PromoForm::DEFAULT_DISCOUNT,
        holiday,
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    }))
}

// =============================================================================
// Theme
// =============================================================================

/// Save panel colours for this session.
#[instrument(skip(_admin, session, theme))]
async fn update_theme(
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    Form(theme): Form<Theme>,
) -> Result<Redirect> {
    let theme = match theme.validate() {
        Ok(theme) => theme,
        Err(e) => return Ok(redirect_error("/settings", &e.to_string())),
    };
    session.insert(session_keys::THEME, theme).await?;
    Ok(redirect_success("/settings", "Theme saved"))
}

/// Stylesheet body for a theme.
fn theme_stylesheet(theme: &Theme) -> String {
    format!(
        ":root {{\n  --accent: {};\n  --bg-main: {};\n  --text-main: {};\n}}\n",
        theme.accent, theme.bg_main, theme.text_main
    )
}

/// Panel colours as CSS variables. Served before login too, with defaults.
async fn theme_css(session: Session) -> Result<Response> {
    // Only validated colours reach the stylesheet
    let theme = current_theme(&session)
        .await?
        .validate()
        .unwrap_or_default();
    Ok((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        theme_stylesheet(&theme),
    )
        .into_response())
}

// =============================================================================
// Promos & newsletter
// =============================================================================

/// Create a promo code.
#[instrument(skip(admin, state, form))]
async fn create_promo(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<PromoForm>,
) -> Redirect {
    let promo = match form.validate() {
        Ok(promo) => promo,
        Err(e) => return redirect_error("/settings", &e.to_string()),
    };

    match state.backend().create_promo(&promo, &admin.token).await {
        Ok(()) => {
            tracing::info!(code = %promo.code, discount = promo.discount_percent, "Promo created");
            redirect_success("/settings", &format!("Promo {} created", promo.code))
        }
        Err(e) => {
            tracing::error!("Failed to create promo: {e}");
            redirect_error("/settings", e.user_message("Failed to create promo"))
        }
    }
}

/// Email every newsletter subscriber.
#[instrument(skip(admin, state, form))]
async fn send_broadcast(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<Broadcast>,
) -> Redirect {
    let broadcast = match form.validate() {
        Ok(broadcast) => broadcast,
        Err(e) => return redirect_error("/settings", &e.to_string()),
    };

    match state.backend().broadcast(&broadcast, &admin.token).await {
        Ok(()) => {
            tracing::info!(subject = %broadcast.subject, "Newsletter broadcast sent");
            redirect_success("/settings", "Broadcast sent")
        }
        Err(e) => {
            tracing::error!("Failed to send broadcast: {e}");
            redirect_error("/settings", e.user_message("Failed to send broadcast"))
        }
    }
}

// =============================================================================
// Holiday mode
// =============================================================================

/// Holiday form. Unticked checkboxes are omitted by browsers.
#[derive(Debug, Deserialize)]
pub struct HolidayForm {
    #[serde(default)]
    pub enabled: Option<String>,
    #[serde(default)]
    pub discount: String,
}

impl HolidayForm {
    fn parse(&self) -> std::result::Result<HolidayUpdate, String> {
        let discount = self
            .discount
            .trim()
            .parse::<i64>()
            .map_err(|_| "Discount must be a whole number".to_string())?;
        HolidayUpdate::new(self.enabled.is_some(), discount).map_err(|e| e.to_string())
    }
}

/// Switch holiday mode and set its discount.
#[instrument(skip(admin, state, form))]
async fn update_holiday(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<HolidayForm>,
) -> Redirect {
    let update = match form.parse() {
        Ok(update) => update,
        Err(message) => return redirect_error("/settings", &message),
    };

    match state.backend().update_holiday(&update, &admin.token).await {
        Ok(()) => {
            tracing::info!(
                enabled = update.enabled,
                discount = update.discount,
                "Holiday mode updated"
            );
            let message = if update.enabled {
                format!("Holiday mode on at {}% off", update.discount)
            } else {
                "Holiday mode off".to_string()
            };
            redirect_success("/settings", &message)
        }
        Err(e) => {
            tracing::error!("Failed to update holiday mode: {e}");
            redirect_error("/settings", e.user_message("Failed to update holiday mode"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_stylesheet_variables() {
        let css = theme_stylesheet(&Theme::default());
        assert!(css.contains("--accent: #dc2626;"));
        assert!(css.contains("--bg-main: #ffffff;"));
        assert!(css.contains("--text-main: #000000;"));
    }

    #[test]
    fn test_holiday_form_parses_checkbox_and_discount() {
        let form = HolidayForm {
            enabled: Some("on".to_string()),
            discount: " 30 ".to_string(),
        };
        let update = form.parse().unwrap();
        assert!(update.enabled);
        assert_eq!(update.discount, 30);

        let form = HolidayForm {
            enabled: None,
            discount: "0".to_string(),
        };
        assert!(!form.parse().unwrap().enabled);
    }

    #[test]
    fn test_holiday_form_rejects_bad_discount() {
        let form = HolidayForm {
            enabled: None,
            discount: "150".to_string(),
        };
        assert!(form.parse().is_err());
        let form = HolidayForm {
            enabled: None,
            discount: "lots".to_string(),
        };
        assert_eq!(form.parse().unwrap_err(), "Discount must be a whole number");
    }
}
