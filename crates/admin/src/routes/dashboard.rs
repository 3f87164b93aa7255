//! Dashboard route handler.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tracing::instrument;

use nikola_core::order::Order;
use nikola_core::promo::HolidayStatus;

use crate::{
    filters,
    middleware::auth::RequireAdminAuth,
    models::CurrentAdmin,
    routes::{NoticeQuery, render},
    state::AppState,
};

/// Admin user view for templates.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl AdminUserView {
    /// First letter of the name, for the avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default()
    }
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.clone(),
        }
    }
}

/// Dashboard metrics. `None` when the backend call failed.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: Option<usize>,
    pub orders: Option<u32>,
    pub users: Option<usize>,
}

impl DashboardMetrics {
    fn show(count: Option<impl ToString>) -> String {
        count.map_or_else(|| "-".to_string(), |c| c.to_string())
    }

    #[must_use]
    pub fn products_display(&self) -> String {
        Self::show(self.products)
    }

    #[must_use]
    pub fn orders_display(&self) -> String {
        Self::show(self.orders)
    }

    #[must_use]
    pub fn users_display(&self) -> String {
        Self::show(self.users)
    }
}

/// Recent order view for dashboard.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub order_id: String,
    pub customer_name: String,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
}

impl From<&Order> for RecentOrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            customer_name: if order.name.trim().is_empty() {
                order.email.clone()
            } else {
                order.name.clone()
            },
            total: order.total.display(),
            status: order.status.label().to_string(),
            status_class: super::orders::status_class(order.status),
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub metrics: DashboardMetrics,
    pub recent_orders: Vec<RecentOrderView>,
    pub holiday: Option<HolidayStatus>,
    pub storefront_url: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(dashboard))
}

/// Number of orders listed under "Recent orders".
const RECENT_ORDERS: u32 = 5;

/// Dashboard page handler.
#[instrument(skip(admin, state, notice))]
pub async fn dashboard(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let backend = state.backend();
    let token = admin.token.as_str();

    // With a page size of one, the page count is the order count
    let (products_result, order_count_result, recent_result, users_result, holiday_result) = tokio::join!(
        backend.products(token),
        backend.orders_page(1, 1, token),
        backend.orders_page(1, RECENT_ORDERS, token),
        backend.users(token),
        backend.holiday_status(),
    );

    let products = products_result
        .map_err(|e| tracing::error!("Failed to fetch products: {e}"))
        .ok()
        .map(|products| products.len());
    let orders = order_count_result
        .map_err(|e| tracing::error!("Failed to count orders: {e}"))
        .ok()
        .map(|page| page.total_pages);
    let users = users_result
        .map_err(|e| tracing::error!("Failed to fetch users: {e}"))
        .ok()
        .map(|users| users.len());
    let recent_orders = recent_result
        .map(|page| page.orders.iter().map(RecentOrderView::from).collect())
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch recent orders: {e}");
            Vec::new()
        });

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        metrics: DashboardMetrics {
            products,
            orders,
            users,
        },
        recent_orders,
        holiday: holiday_result.ok(),
        storefront_url: state.config().storefront_url.clone(),
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    };

    render(&template)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_display_dash_when_unknown() {
        let metrics = DashboardMetrics {
            products: Some(12),
            orders: None,
            users: Some(0),
        };
        assert_eq!(metrics.products_display(), "12");
        assert_eq!(metrics.orders_display(), "-");
        assert_eq!(metrics.users_display(), "0");
    }

    #[test]
    fn test_admin_initial() {
        let view = AdminUserView {
            name: "nimal".to_string(),
            email: "nimal@nikola.lk".to_string(),
        };
        assert_eq!(view.initial(), "N");
    }
}
