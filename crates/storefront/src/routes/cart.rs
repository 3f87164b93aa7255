//! Cart route handlers.
//!
//! The cart lives in the session. Prices are frozen when a line is added,
//! including the holiday discount active at that moment.

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

use nikola_core::ProductId;
use nikola_core::cart::{Cart, CartItem, CartSummary};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Toast, load, session_keys, store};
use crate::routes::{local_path, redirect_with_toast};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

const fn one() -> u32 {
    1
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub index: usize,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub index: usize,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub ctx: PageContext,
    pub cart: Cart,
    pub summary: CartSummary,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(session, ctx))]
pub async fn show(session: Session, ctx: PageContext) -> Result<impl IntoResponse> {
    let cart: Cart = load(&session, session_keys::CART).await?;
    let summary = cart.summary();
    Ok(CartShowTemplate { ctx, cart, summary })
}

/// Add a product to the cart.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let back = local_path(form.next.as_deref(), "/cart");
    let product = state
        .backend()
        .product(&ProductId::new(form.product_id.clone()))
        .await?;

    if !product.purchasable() {
        return redirect_with_toast(&session, &back, Toast::error("This product is out of stock"))
            .await;
    }

    let discount = state.backend().holiday_status().await.active_discount();
    let item = CartItem::from_product(
        &product,
        product.holiday_price(discount),
        form.quantity,
        form.size,
        form.color,
    );

    let mut cart: Cart = load(&session, session_keys::CART).await?;
    cart.add(item);
    store(&session, session_keys::CART, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
    redirect_with_toast(
        &session,
        &back,
        Toast::success(format!("{} added to cart", product.name)),
    )
    .await
}

/// Change the quantity of a line. Zero removes it.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut cart: Cart = load(&session, session_keys::CART).await?;
    if cart.set_quantity(form.index, form.quantity) {
        store(&session, session_keys::CART, &cart).await?;
        Ok(Redirect::to("/cart"))
    } else {
        redirect_with_toast(&session, "/cart", Toast::error("That item is no longer in your cart"))
            .await
    }
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart: Cart = load(&session, session_keys::CART).await?;
    match cart.remove(form.index) {
        Some(item) => {
            store(&session, session_keys::CART, &cart).await?;
            redirect_with_toast(
                &session,
                "/cart",
                Toast::info(format!("{} removed from cart", item.name)),
            )
            .await
        }
        None => Ok(Redirect::to("/cart")),
    }
}

/// Cart count badge fragment.
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart: Cart = load(&session, session_keys::CART).await?;
    Ok(CartCountTemplate {
        count: cart.count(),
    })
}
