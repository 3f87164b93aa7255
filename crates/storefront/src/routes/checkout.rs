//! Checkout and payment handlers.
//!
//! Checkout freezes the cart with shipping details into an [`OrderDraft`]
//! kept in the session. Payment validates the card form, places the order
//! with the backend and clears the cart. Card details never leave this
//! process.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::cart::{Cart, CartSummary};
use nikola_core::checkout::{COUNTRY, OrderDraft, PaymentCard, ShippingDetails};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext};
use crate::models::{CurrentCustomer, Toast, load, session_keys, store};
use crate::routes::redirect_with_toast;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/shipping.html")]
pub struct CheckoutTemplate {
    pub ctx: PageContext,
    pub shipping: ShippingDetails,
    pub cart: Cart,
    pub summary: CartSummary,
    pub country: &'static str,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub ctx: PageContext,
    pub draft: OrderDraft,
    pub summary: CartSummary,
}

/// Shipping details to pre-fill: what the visitor typed last, else their
/// backend profile.
async fn prefill(
    state: &AppState,
    session: &Session,
    customer: Option<&CurrentCustomer>,
) -> Result<ShippingDetails> {
    if let Some(shipping) = session
        .get::<ShippingDetails>(session_keys::SHIPPING_DETAILS)
        .await?
    {
        return Ok(shipping);
    }

    let Some(customer) = customer else {
        return Ok(ShippingDetails::default());
    };
    match state.backend().profile(&customer.token).await {
        Ok(profile) => Ok(ShippingDetails {
            full_name: profile.full_name(),
            email: profile.email,
            ..ShippingDetails::default()
        }),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load profile for checkout");
            Ok(ShippingDetails {
                email: customer.email.clone(),
                ..ShippingDetails::default()
            })
        }
    }
}

/// Display the shipping form.
#[instrument(skip(state, session, customer, ctx))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    ctx: PageContext,
) -> Result<Response> {
    let cart: Cart = load(&session, session_keys::CART).await?;
    if cart.is_empty() {
        return Ok(redirect_with_toast(
            &session,
            "/products",
            Toast::error("Your cart is empty. Add something first!"),
        )
        .await?
        .into_response());
    }

    let shipping = prefill(&state, &session, customer.as_ref()).await?;
    let summary = cart.summary();
    Ok(CheckoutTemplate {
        ctx,
        shipping,
        cart,
        summary,
        country: COUNTRY,
    }
    .into_response())
}

/// Validate shipping details and freeze the order.
#[instrument(skip(session, shipping))]
pub async fn submit(session: Session, Form(shipping): Form<ShippingDetails>) -> Result<Redirect> {
    store(&session, session_keys::SHIPPING_DETAILS, &shipping).await?;
    let cart: Cart = load(&session, session_keys::CART).await?;

    match OrderDraft::from_cart(&cart, shipping) {
        Ok(draft) => {
            store(&session, session_keys::ORDER_DRAFT, &draft).await?;
            Ok(Redirect::to("/payment"))
        }
        Err(e) => redirect_with_toast(&session, "/checkout", Toast::error(e.to_string())).await,
    }
}

/// Display the card form.
#[instrument(skip(session, ctx))]
pub async fn payment_page(session: Session, ctx: PageContext) -> Result<Response> {
    let Some(draft) = session.get::<OrderDraft>(session_keys::ORDER_DRAFT).await? else {
        return Ok(
            redirect_with_toast(&session, "/cart", Toast::error("No order data found"))
                .await?
                .into_response(),
        );
    };
    let summary = draft.summary();
    Ok(PaymentTemplate {
        ctx,
        draft,
        summary,
    }
    .into_response())
}

/// Validate the card and place the order.
#[instrument(skip(state, session, customer, card))]
pub async fn pay(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Form(card): Form<PaymentCard>,
) -> Result<Redirect> {
    let Some(draft) = session.get::<OrderDraft>(session_keys::ORDER_DRAFT).await? else {
        return redirect_with_toast(&session, "/cart", Toast::error("No order data found")).await;
    };

    let card = card.sanitize();
    if let Err(e) = card.validate() {
        return redirect_with_toast(&session, "/payment", Toast::error(e.to_string())).await;
    }

    let token = customer.as_ref().map(|c| c.token.as_str());
    if let Err(e) = state.backend().place_order(&draft.request(), token).await {
        tracing::warn!(error = %e, "Order placement failed");
        let message = e
            .user_message("Failed to place order. Please try again.")
            .to_string();
        return redirect_with_toast(&session, "/payment", Toast::error(message)).await;
    }

    tracing::info!(lines = draft.items.len(), card = %card.last_four(), "Order placed");
    add_breadcrumb("checkout", "Order placed", None);

    store(&session, session_keys::CART, &Cart::default()).await?;
    session.remove_value(session_keys::ORDER_DRAFT).await?;
    session.remove_value(session_keys::SHIPPING_DETAILS).await?;

    redirect_with_toast(
        &session,
        "/products",
        Toast::success("Payment successful! 🎉 Order placed."),
    )
    .await
}
