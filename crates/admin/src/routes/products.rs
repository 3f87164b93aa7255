//! Product management route handlers.
//!
//! The new-product form is kept in the session as a draft so an admin can
//! leave the page and pick up where they stopped. Images on both forms are
//! uploaded to the backend in parallel before the product is saved.

use askama::Template;
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::ProductId;
use nikola_core::admin::{AdminFormError, ProductDraft, ProductPayload};
use nikola_core::catalog::{Category, Product};

use crate::{
    error::Result,
    filters,
    middleware::auth::RequireAdminAuth,
    models::session_keys,
    routes::{
        NoticeQuery, redirect_error, redirect_success, render,
        multipart::{MAX_UPLOAD_BYTES, ProductForm},
    },
    state::AppState,
};

use super::dashboard::AdminUserView;

/// Product row for the listing.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: String,
    pub code: String,
    pub name: String,
    pub price: String,
    pub labelled_price: Option<String>,
    pub stock: i64,
    pub is_available: bool,
    pub image: Option<String>,
    pub categories: String,
}

impl From<&Product> for ProductRowView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            code: product.code.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            labelled_price: product.on_sale().then(|| product.labelled_price.display()),
            stock: product.stock,
            is_available: product.is_available,
            image: product.primary_image().map(ToOwned::to_owned),
            categories: product.category.join(", "),
        }
    }
}

/// A category checkbox.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub value: String,
    pub name: String,
    pub checked: bool,
}

/// Checkboxes for every known category, ticked when selected. Selected
/// values the backend no longer lists are kept so they are not lost.
fn category_options(categories: &[Category], selected: &[String]) -> Vec<CategoryOption> {
    let mut options: Vec<CategoryOption> = categories
        .iter()
        .map(|category| {
            let value = category.slug_or_name();
            CategoryOption {
                checked: selected.iter().any(|s| s.eq_ignore_ascii_case(&value)),
                value,
                name: category.name.clone(),
            }
        })
        .collect();

    for value in selected {
        if !options.iter().any(|o| o.value.eq_ignore_ascii_case(value)) {
            options.push(CategoryOption {
                value: value.clone(),
                name: value.clone(),
                checked: true,
            });
        }
    }
    options
}

/// Products list template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub products: Vec<ProductRowView>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// New product template.
#[derive(Template)]
#[template(path = "products/new.html")]
pub struct NewProductTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub draft: ProductDraft,
    pub categories: Vec<CategoryOption>,
    pub draft_saved_at: Option<String>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Edit form values.
#[derive(Debug, Clone)]
pub struct ProductEditView {
    pub code: String,
    pub name: String,
    pub alt_names: String,
    pub labelled_price: String,
    pub price: String,
    pub description: String,
    pub stock: i64,
    pub is_available: bool,
    pub colors_enabled: bool,
    pub colors: String,
}

impl From<&Product> for ProductEditView {
    fn from(product: &Product) -> Self {
        Self {
            code: product.code.to_string(),
            name: product.name.clone(),
            alt_names: product.alt_names.join(", "),
            labelled_price: product.labelled_price.plain(),
            price: product.price.plain(),
            description: product.description.clone(),
            stock: product.stock,
            is_available: product.is_available,
            colors_enabled: !product.colors.is_empty(),
            colors: product.colors.join(", "),
        }
    }
}

/// Edit product template.
#[derive(Template)]
#[template(path = "products/edit.html")]
pub struct EditProductTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub product_id: String,
    pub product: ProductEditView,
    pub images: Vec<String>,
    pub categories: Vec<CategoryOption>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products_index))
        .route("/products/new", get(new_product_page).post(create_product))
        .route("/products/new/draft", post(save_draft))
        .route("/products/new/draft/clear", post(clear_draft))
        .route(
            "/products/{id}/edit",
            get(edit_product_page).post(update_product),
        )
        .route("/products/{id}/delete", post(delete_product))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

// =============================================================================
// Listing
// =============================================================================

/// Product listing.
#[instrument(skip(admin, state, notice))]
async fn products_index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let (products, error_message) = match state.backend().products(&admin.token).await {
        Ok(products) => (
            products.iter().map(ProductRowView::from).collect(),
            notice.error_message(),
        ),
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            (Vec::new(), Some("Failed to load products".to_string()))
        }
    };

    render(&ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        products,
        success_message: notice.success_message(),
        error_message,
    })
}

/// Delete a product.
#[instrument(skip(admin, state))]
async fn delete_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    match state
        .backend()
        .delete_product(&ProductId::new(id), &admin.token)
        .await
    {
        Ok(()) => redirect_success("/products", "Product deleted"),
        Err(e) => {
            tracing::error!("Failed to delete product: {e}");
            redirect_error("/products", e.user_message("Failed to delete product"))
        }
    }
}

// =============================================================================
// New product & draft
// =============================================================================

async fn load_draft(session: &Session) -> Result<ProductDraft> {
    Ok(session
        .get::<ProductDraft>(session_keys::PRODUCT_DRAFT)
        .await?
        .unwrap_or_default())
}

async fn store_draft(session: &Session, mut draft: ProductDraft) -> Result<()> {
    draft.saved_at = Some(Utc::now());
    session.insert(session_keys::PRODUCT_DRAFT, draft).await?;
    Ok(())
}

/// New product form, restoring any saved draft.
#[instrument(skip(admin, state, session, notice))]
async fn new_product_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(notice): Query<NoticeQuery>,
) -> Result<Html<String>> {
    let draft = load_draft(&session).await?;
    let categories = state
        .backend()
        .categories(&admin.token)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        });

    let draft_saved_at = draft
        .saved_at
        .filter(|_| !draft.is_blank())
        .map(|at| at.format("%b %d, %Y %H:%M UTC").to_string());

    Ok(render(&NewProductTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products/new".to_string(),
        categories: category_options(&categories, &draft.categories),
        draft,
        draft_saved_at,
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    }))
}

/// Save the form as it stands. Attached files are not kept.
#[instrument(skip(_admin, session, multipart))]
async fn save_draft(
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let form = ProductForm::read(multipart).await?;
    store_draft(&session, form.draft()).await?;
    Ok(redirect_success("/products/new", "draft_saved"))
}

/// Discard the draft.
#[instrument(skip(_admin, session))]
async fn clear_draft(
    RequireAdminAuth(_admin): RequireAdminAuth,
    session: Session,
) -> Result<Redirect> {
    session
        .remove::<ProductDraft>(session_keys::PRODUCT_DRAFT)
        .await?;
    Ok(redirect_success("/products/new", "draft_cleared"))
}

/// Check name and price before anything is uploaded.
fn precheck(
    result: std::result::Result<ProductPayload, AdminFormError>,
) -> std::result::Result<(), AdminFormError> {
    match result {
        Ok(_) | Err(AdminFormError::MissingImages) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Create a product.
///
/// The form is kept as a draft until the product is saved, so a failed
/// submission loses nothing but the attached files.
#[instrument(skip(admin, state, session, multipart))]
async fn create_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Redirect> {
    let mut form = ProductForm::read(multipart).await?;
    let draft = form.draft();
    store_draft(&session, draft.clone()).await?;

    if let Err(e) = precheck(draft.clone().into_payload(Vec::new())) {
        return Ok(redirect_error("/products/new", &e.to_string()));
    }
    if form.images().is_empty() {
        return Ok(redirect_error(
            "/products/new",
            &AdminFormError::MissingImages.to_string(),
        ));
    }

    let images = match state
        .backend()
        .upload_images(form.take_images(), &admin.token)
        .await
    {
        Ok(urls) => urls,
        Err(e) => {
            tracing::error!("Image upload failed: {e}");
            return Ok(redirect_error(
                "/products/new",
                e.user_message("Failed to upload images"),
            ));
        }
    };

    let payload = match draft.into_payload(images) {
        Ok(payload) => payload,
        Err(e) => return Ok(redirect_error("/products/new", &e.to_string())),
    };

    match state.backend().create_product(&payload, &admin.token).await {
        Ok(()) => {
            session
                .remove::<ProductDraft>(session_keys::PRODUCT_DRAFT)
                .await?;
            tracing::info!(name = %payload.name, "Product created");
            Ok(redirect_success("/products", "Product added"))
        }
        Err(e) => {
            tracing::error!("Failed to create product: {e}");
            Ok(redirect_error(
                "/products/new",
                e.user_message("Failed to add product"),
            ))
        }
    }
}

// =============================================================================
// Edit
// =============================================================================

/// Edit form for one product.
#[instrument(skip(admin, state, notice))]
async fn edit_product_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(notice): Query<NoticeQuery>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let backend = state.backend();
    let (product, categories) = tokio::join!(
        backend.product(&id, &admin.token),
        backend.categories(&admin.token),
    );
    let product = product?;
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!("Failed to fetch categories: {e}");
        Vec::new()
    });

    Ok(render(&EditProductTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/products".to_string(),
        product_id: product.id.to_string(),
        product: ProductEditView::from(&product),
        images: product.images.clone(),
        categories: category_options(&categories, &product.category),
        success_message: notice.success_message(),
        error_message: notice.error_message(),
    })
    .into_response())
}

/// Update a product. New images replace the old ones; without any, the
/// current images stay.
#[instrument(skip(admin, state, multipart))]
async fn update_product(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect> {
    let id = ProductId::new(id);
    let back = format!("/products/{}/edit", urlencoding::encode(id.as_str()));
    let mut form = ProductForm::read(multipart).await?;
    let edit = form.edit_form();

    if let Err(e) = precheck(edit.clone().into_payload(Vec::new(), Vec::new(), Vec::new())) {
        return Ok(redirect_error(&back, &e.to_string()));
    }

    let existing = state.backend().product(&id, &admin.token).await?;
    let new_images = if form.images().is_empty() {
        Vec::new()
    } else {
        match state
            .backend()
            .upload_images(form.take_images(), &admin.token)
            .await
        {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!("Image upload failed: {e}");
                return Ok(redirect_error(&back, e.user_message("Failed to upload images")));
            }
        }
    };

    let payload = match edit.into_payload(new_images, existing.images, existing.sizes) {
        Ok(payload) => payload,
        Err(e) => return Ok(redirect_error(&back, &e.to_string())),
    };

    match state
        .backend()
        .update_product(&id, &payload, &admin.token)
        .await
    {
        Ok(()) => Ok(redirect_success("/products", "Product updated")),
        Err(e) => {
            tracing::error!("Failed to update product: {e}");
            Ok(redirect_error(&back, e.user_message("Failed to update product")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nikola_core::CategoryId;

    use super::*;

    fn category(name: &str, slug: &str) -> Category {
        Category {
            id: CategoryId::new(name),
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_category_options_tick_selected() {
        let categories = [category("Kitchen", "kitchen"), category("Decor", "decor")];
        let options = category_options(&categories, &["Decor".to_string()]);
        let checked: Vec<&str> = options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(options.len(), 2);
        assert_eq!(checked, vec!["decor"]);
    }

    #[test]
    fn test_category_options_keep_unknown_selection() {
        let categories = [category("Kitchen", "kitchen")];
        let options = category_options(&categories, &["retired".to_string()]);
        let last = options.last().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(last.value, "retired");
        assert!(last.checked);
    }

    #[test]
    fn test_precheck_ignores_missing_images_only() {
        assert!(precheck(Err(AdminFormError::MissingImages)).is_ok());
        assert_eq!(
            precheck(Err(AdminFormError::InvalidPrice)),
            Err(AdminFormError::InvalidPrice)
        );
    }
}
