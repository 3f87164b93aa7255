//! Home, testimonials and about pages.

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

use nikola_core::catalog::Product;
use nikola_core::review::{Testimonial, add_testimonial as prepend_testimonial, seed_testimonials};

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{Toast, session_keys, store};
use crate::routes::christmas::{CalendarView, calendar_view};
use crate::routes::redirect_with_toast;
use crate::state::AppState;

/// Products shown on the home page.
const FEATURED_LIMIT: usize = 8;

/// Testimonials shown on the home page.
const HOME_TESTIMONIALS: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
    pub featured: Vec<Product>,
    pub calendar: CalendarView,
    pub testimonials: Vec<Testimonial>,
}

/// Testimonials page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/reviews.html")]
pub struct TestimonialsTemplate {
    pub ctx: PageContext,
    pub testimonials: Vec<Testimonial>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub ctx: PageContext,
}

/// New testimonial form.
#[derive(Debug, Deserialize)]
pub struct TestimonialForm {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub text: String,
}

const fn default_rating() -> u8 {
    5
}

/// Testimonials for this visitor: the seeded set plus any they added.
async fn load_testimonials(session: &Session) -> Result<Vec<Testimonial>> {
    Ok(session
        .get::<Vec<Testimonial>>(session_keys::TESTIMONIALS)
        .await?
        .unwrap_or_else(seed_testimonials))
}

/// Display the home page.
#[instrument(skip(state, session, ctx))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let featured = match state.backend().products().await {
        Ok(products) => products.into_iter().take(FEATURED_LIMIT).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        }
    };
    let calendar = calendar_view(&session).await?;
    let mut testimonials = load_testimonials(&session).await?;
    testimonials.truncate(HOME_TESTIMONIALS);

    Ok(HomeTemplate {
        ctx,
        featured,
        calendar,
        testimonials,
    })
}

/// Display the testimonials page.
#[instrument(skip(session, ctx))]
pub async fn testimonials(session: Session, ctx: PageContext) -> Result<impl IntoResponse> {
    let testimonials = load_testimonials(&session).await?;
    Ok(TestimonialsTemplate { ctx, testimonials })
}

/// Add a testimonial to the top of the list.
#[instrument(skip(session, form))]
pub async fn add_testimonial(
    session: Session,
    Form(form): Form<TestimonialForm>,
) -> Result<Redirect> {
    let mut testimonials = load_testimonials(&session).await?;
    if let Err(e) = prepend_testimonial(&mut testimonials, &form.name, form.rating, &form.text) {
        return redirect_with_toast(&session, "/reviews", Toast::error(e.to_string())).await;
    }
    store(&session, session_keys::TESTIMONIALS, &testimonials).await?;
    redirect_with_toast(&session, "/reviews", Toast::success("Thank you for your review!")).await
}

/// Display the about page.
pub async fn about(ctx: PageContext) -> impl IntoResponse {
    AboutTemplate { ctx }
}
