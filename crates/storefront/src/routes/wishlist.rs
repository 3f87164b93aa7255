//! Wishlist handlers.

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
use nikola_core::wishlist::{Toggled, Wishlist, WishlistItem};

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Toast, load, session_keys, store};
use crate::routes::{local_path, redirect_with_toast};
use crate::state::AppState;

/// Wishlist form data.
#[derive(Debug, Deserialize)]
pub struct WishlistForm {
    pub product_id: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub ctx: PageContext,
    pub wishlist: Wishlist,
}

/// Display the wishlist.
#[instrument(skip(session, ctx))]
pub async fn show(session: Session, ctx: PageContext) -> Result<impl IntoResponse> {
    let wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;
    Ok(WishlistTemplate { ctx, wishlist })
}

/// Save or unsave a product.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<WishlistForm>,
) -> Result<Redirect> {
    let back = local_path(form.next.as_deref(), "/wishlist");
    let product = state
        .backend()
        .product(&ProductId::new(form.product_id))
        .await?;

    let mut wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;
    let toast = match wishlist.toggle(WishlistItem::from(&product)) {
        Toggled::Added => Toast::success("Added to wishlist"),
        Toggled::Removed => Toast::info("Removed from wishlist"),
    };
    store(&session, session_keys::WISHLIST, &wishlist).await?;

    redirect_with_toast(&session, &back, toast).await
}

/// Remove a product from the wishlist page.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<WishlistForm>) -> Result<Redirect> {
    let mut wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;
    if wishlist.remove(&ProductId::new(form.product_id)) {
        store(&session, session_keys::WISHLIST, &wishlist).await?;
        return redirect_with_toast(&session, "/wishlist", Toast::info("Removed from wishlist"))
            .await;
    }
    Ok(Redirect::to("/wishlist"))
}
