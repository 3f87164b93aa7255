//! Order management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use nikola_core::order::{DEFAULT_PAGE_SIZE, Order, OrderUpdate, clamp_page};
use nikola_core::{OrderId, OrderStatus};

use crate::{
    error::Result,
    filters,
    middleware::auth::RequireAdminAuth,
    routes::{NoticeQuery, redirect_error, redirect_success, render},
    state::AppState,
};

use super::dashboard::AdminUserView;

/// Page sizes offered on the listing.
pub const PAGE_SIZES: [u32; 4] = [5, 10, 20, 50];

/// CSS class for a status badge.
#[must_use]
pub const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "badge-pending",
        OrderStatus::Completed => "badge-completed",
        OrderStatus::Cancelled => "badge-cancelled",
    }
}

/// `?page=&limit=` on the listing and detail pages.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

const fn first_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: first_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationQuery {
    /// Page at least 1, limit one of [`PAGE_SIZES`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: if PAGE_SIZES.contains(&self.limit) {
                self.limit
            } else {
                DEFAULT_PAGE_SIZE
            },
        }
    }

    fn query_string(self) -> String {
        format!("page={}&limit={}", self.page, self.limit)
    }
}

/// Order row for the listing.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub order_id: String,
    pub customer_name: String,
    pub email: String,
    pub date: String,
    pub item_count: u32,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
}

fn order_date(order: &Order) -> String {
    order
        .date
        .map(|d| d.format("%b %d, %Y").to_string())
        .unwrap_or_default()
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            customer_name: order.name.clone(),
            email: order.email.clone(),
            date: order_date(order),
            item_count: order.item_count(),
            total: order.total.display(),
            status: order.status.label().to_string(),
            status_class: status_class(order.status),
        }
    }
}

/// Orders list template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub orders: Vec<OrderRowView>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
    pub page_sizes: Vec<u32>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Order line for the detail page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub image: String,
    pub variant: String,
    pub qty: u32,
    pub price: String,
    pub line_total: String,
}

/// A status option in the picker.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Order detail template.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub order_id: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub date: String,
    pub notes: String,
    pub status: String,
    pub status_class: &'static str,
    pub statuses: Vec<StatusOption>,
    pub lines: Vec<OrderLineView>,
    pub total: String,
    pub page: u32,
    pub limit: u32,
    pub back_query: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Status and notes form.
#[derive(Debug, Deserialize)]
pub struct OrderUpdateForm {
    pub status: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders_index))
        .route("/orders/{id}", get(order_show).post(order_update))
        .route("/orders/{id}/delete", post(order_delete))
}

/// Paginated order listing.
#[instrument(skip(admin, state, notice))]
async fn orders_index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(pagination): Query<PaginationQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let pagination = pagination.normalized();
    let backend = state.backend();

    let mut error_message = notice.error_message();
    let mut page = pagination.page;
    let mut result = backend
        .orders_page(page, pagination.limit, &admin.token)
        .await;

    // Past the end, e.g. after deleting the last order on the final page
    if let Ok(listing) = &result {
        let clamped = clamp_page(page, listing.total_pages);
        if clamped != page {
            page = clamped;
            result = backend
                .orders_page(page, pagination.limit, &admin.token)
                .await;
        }
    }

    let (orders, total_pages) = match result {
        Ok(listing) => (
            listing.orders.iter().map(OrderRowView::from).collect(),
            listing.total_pages.max(1),
        ),
        Err(e) => {
            tracing::error!("Failed to fetch orders: {e}");
            error_message = Some("Failed to load orders".to_string());
            (Vec::new(), 1)
        }
    };

    render(&OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        orders,
        page,
        limit: pagination.limit,
        total_pages,
        prev_page: (page > 1).then(|| page - 1),
        next_page: (page < total_pages).then(|| page + 1),
        page_sizes: PAGE_SIZES.to_vec(),
        success_message: notice.success_message(),
        error_message,
    })
}

/// Order detail, looked up on the listing page it came from.
#[instrument(skip(admin, state, notice))]
async fn order_show(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Html<String>> {
    let pagination = pagination.normalized();
    let order = state
        .backend()
        .order_on_page(
            &OrderId::new(id),
            pagination.page,
            pagination.limit,
            &admin.token,
        )
        .await?;

    let lines = order
        .items
        .iter()
        .map(|line| OrderLineView {
            name: line.name.clone(),
            image: line.image.clone(),
            variant: [line.size.as_str(), line.color.as_str()]
                .into_iter()
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(" / "),
            qty: line.qty,
            price: line.price.display(),
            line_total: line.line_total().display(),
        })
        .collect();

    let statuses = OrderStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
            selected: *s == order.status,
        })
        .collect();

    Ok(render(&OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/orders".to_string(),
        order_id: order.order_id.to_string(),
        customer_name: order.name.clone(),
        email: order.email.clone(),
        phone: order.phone.clone(),
        address: order.address.clone(),
        city: order.city.clone(),
        date: order_date(&order),
        notes: order.notes.clone(),
        status: order.status.label().to_string(),
        status_class: status_class(order.status),
        statuses,
        lines,
        total: order.total.display(),
        page: pagination.page,
        limit: pagination.limit,
        back_query: pagination.query_string(),
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    }))
}

/// Save status and notes. Unchanged submissions skip the backend.
#[instrument(skip(admin, state, form))]
async fn order_update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<OrderUpdateForm>,
) -> Result<Redirect> {
    let pagination = PaginationQuery {
        page: form.page,
        limit: form.limit,
    }
    .normalized();
    let id = OrderId::new(id);
    let back = format!(
        "/orders/{}?{}",
        urlencoding::encode(id.as_str()),
        pagination.query_string()
    );

    let status: OrderStatus = match form.status.parse() {
        Ok(status) => status,
        Err(e) => return Ok(redirect_error(&back, &e)),
    };
    let update = OrderUpdate {
        status,
        notes: form.notes.trim().to_string(),
    };

    let order = state
        .backend()
        .order_on_page(&id, pagination.page, pagination.limit, &admin.token)
        .await?;
    if !update.differs_from(&order) {
        return Ok(redirect_success(&back, "No changes"));
    }

    match state
        .backend()
        .update_order(&id, &update, &admin.token)
        .await
    {
        Ok(()) => {
            tracing::info!(order_id = %id, status = %update.status, "Order updated");
            Ok(redirect_success(&back, "Order updated"))
        }
        Err(e) => {
            tracing::error!("Failed to update order: {e}");
            Ok(redirect_error(&back, e.user_message("Failed to update order")))
        }
    }
}

/// Pagination carried by the delete form.
#[derive(Debug, Deserialize)]
pub struct DeleteOrderForm {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Delete an order and return to the listing page.
#[instrument(skip(admin, state, form))]
async fn order_delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteOrderForm>,
) -> Redirect {
    let pagination = PaginationQuery {
        page: form.page,
        limit: form.limit,
    }
    .normalized();
    let back = format!("/orders?{}", pagination.query_string());

    match state
        .backend()
        .delete_order(&OrderId::new(id), &admin.token)
        .await
    {
        Ok(()) => redirect_success(&back, "Order deleted"),
        Err(e) => {
            tracing::error!("Failed to delete order: {e}");
            redirect_error(&back, e.user_message("Failed to delete order"))
        }
    }
}
