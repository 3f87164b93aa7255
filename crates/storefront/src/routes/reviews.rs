//! Product review handlers.
//!
//! Only verified buyers may review: the customer's backend order history
//! must contain the product. Authors edit and delete their own reviews;
//! admin accounts reply.

use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::order::has_purchased;
use nikola_core::review::{ReviewForm, validate_reply};
use nikola_core::{ProductId, ReviewId};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Toast;
use crate::routes::redirect_with_toast;
use crate::state::AppState;

/// Reply form.
#[derive(Debug, Deserialize)]
pub struct ReplyForm {
    #[serde(default)]
    pub comment: String,
}

fn reviews_anchor(product: &ProductId) -> String {
    format!("/overview/{}#reviews", urlencoding::encode(product.as_str()))
}

/// Add a review.
#[instrument(skip(state, session, customer, form), fields(product_id = %id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(customer): OptionalAuth,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Result<Redirect> {
    let product = ProductId::new(id);
    let back = reviews_anchor(&product);

    let purchased = match &customer {
        Some(customer) => match state.backend().my_orders(&customer.token).await {
            Ok(orders) => has_purchased(&orders, &product),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load orders for purchase check");
                false
            }
        },
        None => false,
    };

    let review = match form.validate(purchased) {
        Ok(review) => review,
        Err(e) => return redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    };

    let token = customer.as_ref().map(|c| c.token.as_str());
    match state.backend().add_review(&product, &review, token).await {
        Ok(()) => {
            add_breadcrumb("review", "Review added", Some(&[("product_id", product.as_str())]));
            redirect_with_toast(&session, &back, Toast::success("Review submitted. Thank you!"))
                .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected review");
            let message = e.user_message("Failed to submit review").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}

/// Edit the customer's own review.
#[instrument(skip(state, session, customer, form), fields(product_id = %id, review_id = %review_id))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path((id, review_id)): Path<(String, String)>,
    Form(mut form): Form<ReviewForm>,
) -> Result<Redirect> {
    let product = ProductId::new(id);
    let back = reviews_anchor(&product);

    form.email.clone_from(&customer.email);
    let edit = match form.validate_edit() {
        Ok(edit) => edit,
        Err(e) => return redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    };

    let review = ReviewId::new(review_id);
    match state
        .backend()
        .edit_review(&product, &review, &edit, Some(&customer.token))
        .await
    {
        Ok(()) => redirect_with_toast(&session, &back, Toast::success("Review updated")).await,
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected review edit");
            let message = e.user_message("Failed to update review").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}

/// Delete the customer's own review.
#[instrument(skip(state, session, customer), fields(product_id = %id, review_id = %review_id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path((id, review_id)): Path<(String, String)>,
) -> Result<Redirect> {
    let product = ProductId::new(id);
    let back = reviews_anchor(&product);
    let review = ReviewId::new(review_id);

    match state
        .backend()
        .delete_review(&product, &review, Some(&customer.email), Some(&customer.token))
        .await
    {
        Ok(()) => redirect_with_toast(&session, &back, Toast::success("Review deleted")).await,
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected review deletion");
            let message = e.user_message("Failed to delete review").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}

/// Reply to a review. Admin accounts only.
#[instrument(skip(state, session, customer, form), fields(product_id = %id, review_id = %review_id))]
pub async fn reply(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
    Path((id, review_id)): Path<(String, String)>,
    Form(form): Form<ReplyForm>,
) -> Result<Redirect> {
    let product = ProductId::new(id);
    let back = reviews_anchor(&product);

    if !customer.is_admin() {
        return redirect_with_toast(&session, &back, Toast::error("Only admins can reply")).await;
    }
    let comment = match validate_reply(&form.comment) {
        Ok(comment) => comment,
        Err(e) => return redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    };

    let review = ReviewId::new(review_id);
    match state
        .backend()
        .reply_to_review(&product, &review, &comment, &customer.token)
        .await
    {
        Ok(()) => redirect_with_toast(&session, &back, Toast::success("Reply posted")).await,
        Err(e) => {
            tracing::warn!(error = %e, "Backend rejected reply");
            let message = e.user_message("Failed to post reply").to_string();
            redirect_with_toast(&session, &back, Toast::error(message)).await
        }
    }
}
