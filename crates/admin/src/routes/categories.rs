//! Category management route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use tracing::instrument;

use nikola_core::CategoryId;
use nikola_core::admin::NewCategory;
use nikola_core::catalog::Category;

use crate::{
    filters,
    middleware::auth::RequireAdminAuth,
    routes::{NoticeQuery, redirect_error, redirect_success, render},
    state::AppState,
};

use super::dashboard::AdminUserView;

/// Category row.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug_or_name(),
            description: category.description.clone(),
        }
    }
}

/// Categories page template.
#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub categories: Vec<CategoryView>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories_index).post(create_category))
        .route("/categories/{id}/delete", post(delete_category))
}

/// Category listing with the add form.
#[instrument(skip(admin, state, notice))]
async fn categories_index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(notice): Query<NoticeQuery>,
) -> Html<String> {
    let mut error_message = notice.error_message();
    let categories = match state.backend().categories(&admin.token).await {
        Ok(categories) => categories.iter().map(CategoryView::from).collect(),
        Err(e) => {
            tracing::error!("Failed to fetch categories: {e}");
            error_message = Some("Failed to load categories".to_string());
            Vec::new()
        }
    };

    render(&CategoriesTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/categories".to_string(),
        categories,
        success_message: notice.success_message(),
        error_message,
    })
}

/// Add a category.
#[instrument(skip(admin, state, form))]
async fn create_category(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<NewCategory>,
) -> Redirect {
    let category = match form.validate() {
        Ok(category) => category,
        Err(e) => return redirect_error("/categories", &e.to_string()),
    };

    match state
        .backend()
        .create_category(&category, &admin.token)
        .await
    {
        Ok(()) => {
            tracing::info!(name = %category.name, "Category created");
            redirect_success("/categories", "Category added")
        }
        Err(e) => {
            tracing::error!("Failed to create category: {e}");
            redirect_error("/categories", e.user_message("Failed to add category"))
        }
    }
}

/// Delete a category.
#[instrument(skip(admin, state))]
async fn delete_category(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    match state
        .backend()
        .delete_category(&CategoryId::new(id), &admin.token)
        .await
    {
        Ok(()) => redirect_success("/categories", "Category deleted"),
        Err(e) => {
            tracing::error!("Failed to delete category: {e}");
            redirect_error("/categories", e.user_message("Failed to delete category"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_view_falls_back_to_lowercase_name() {
        let category = Category {
            id: CategoryId::new("c1"),
            name: "Gift Sets".to_string(),
            slug: String::new(),
            description: String::new(),
        };
        let view = CategoryView::from(&category);
        assert_eq!(view.slug, "gift sets");
        assert_eq!(view.id, "c1");
    }
}
