//! Christmas promotion handlers.
//!
//! The offers page hosts the prize wheel, the limited-spots contest and the
//! advent calendar. Everything here is gated on the backend's holiday mode.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::catalog::Product;
use nikola_core::promo::advent::{ADVENT_DAYS, DoorState};
use nikola_core::promo::gift_finder::SIZES;
use nikola_core::promo::wheel::{self, MAX_TURNS, MIN_TURNS};
use nikola_core::promo::{
    ADVENT_REWARDS, AdventCalendar, Budget, ContestSpots, GiftQuiz, HolidayStatus, Recipient,
    SpinResult, Style, WHEEL_SEGMENTS,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireAuth};
use crate::models::{Toast, load, session_keys, store};
use crate::routes::{local_path, redirect_with_toast};
use crate::state::AppState;

/// Store time zone, UTC+05:30.
const STORE_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

const OFFERS_PATH: &str = "/christmas-offers";

/// Day of the month in store time.
fn day_in_store_time(now: DateTime<Utc>) -> u32 {
    FixedOffset::east_opt(STORE_OFFSET_SECS)
        .map_or_else(|| now.day(), |offset| now.with_timezone(&offset).day())
}

fn store_today() -> u32 {
    day_in_store_time(Utc::now())
}

// =============================================================================
// Advent calendar view
// =============================================================================

/// One door as drawn on the page.
#[derive(Debug, Clone)]
pub struct DoorView {
    pub day: u32,
    pub reward: &'static str,
    pub description: &'static str,
    pub class: &'static str,
    pub can_open: bool,
}

/// The advent calendar as drawn on the page.
#[derive(Debug, Clone)]
pub struct CalendarView {
    pub doors: Vec<DoorView>,
    pub streak: u32,
    pub today: u32,
    pub claimed_today: bool,
    pub opened: usize,
    pub total: u32,
}

const fn door_class(state: DoorState) -> &'static str {
    match state {
        DoorState::Opened => "door-opened",
        DoorState::Today => "door-today",
        DoorState::Available => "door-available",
        DoorState::Locked => "door-locked",
    }
}

fn build_calendar(calendar: &AdventCalendar, today: u32) -> CalendarView {
    let claimed_today = calendar.claimed_today(today);
    let doors = ADVENT_REWARDS
        .iter()
        .map(|reward| {
            let state = calendar.door_state(reward.day, today);
            DoorView {
                day: reward.day,
                reward: reward.reward,
                description: reward.description,
                class: door_class(state),
                can_open: !claimed_today
                    && matches!(state, DoorState::Today | DoorState::Available),
            }
        })
        .collect();

    CalendarView {
        doors,
        streak: calendar.streak,
        today,
        claimed_today,
        opened: calendar.claimed_days.len(),
        total: ADVENT_DAYS,
    }
}

/// Calendar for the visitor in this session.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn calendar_view(session: &Session) -> Result<CalendarView> {
    let calendar: AdventCalendar = load(session, session_keys::ADVENT).await?;
    Ok(build_calendar(&calendar, store_today()))
}

// =============================================================================
// Offers page
// =============================================================================

/// Last wheel result kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSpin {
    pub code: String,
    pub prize: String,
    pub rotation: f64,
}

/// Where the wheel stops for `result`.
fn spin_rotation(result: &SpinResult) -> f64 {
    let mut rng = rand::rng();
    let turns = rng.random_range(MIN_TURNS..=MAX_TURNS);
    let jitter: f64 = rng.random_range(0.1..0.9);
    wheel::rotation(turns, result.segment_index(), jitter)
}

/// One wheel slice as drawn on the page.
#[derive(Debug, Clone, Copy)]
pub struct SegmentView {
    pub label: &'static str,
    pub color: &'static str,
    pub rotation: f64,
}

#[allow(clippy::cast_precision_loss)]
fn wheel_face() -> Vec<SegmentView> {
    WHEEL_SEGMENTS
        .iter()
        .enumerate()
        .map(|(index, segment)| SegmentView {
            label: segment.label,
            color: segment.color,
            rotation: index as f64 * wheel::segment_angle(),
        })
        .collect()
}

/// Christmas offers page template.
#[derive(Template, WebTemplate)]
#[template(path = "christmas/offers.html")]
pub struct OffersTemplate {
    pub ctx: PageContext,
    pub segments: Vec<SegmentView>,
    pub last_spin: Option<LastSpin>,
    pub spots: Option<ContestSpots>,
    pub contest_entered: bool,
    pub calendar: CalendarView,
}

impl OffersTemplate {
    /// Final rotation for the last spin, zero before the first spin.
    #[must_use]
    pub fn wheel_rotation(&self) -> f64 {
        self.last_spin.as_ref().map_or(0.0, |spin| spin.rotation)
    }
}

/// Display the Christmas offers page.
#[instrument(skip(state, session, ctx))]
pub async fn offers(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let spots = if ctx.holiday.enabled {
        match state.backend().contest_spots().await {
            Ok(spots) => Some(spots),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load contest spots");
                None
            }
        }
    } else {
        None
    };

    let last_spin = session.get::<LastSpin>(session_keys::LAST_SPIN).await?;
    let contest_entered = session
        .get::<bool>(session_keys::CONTEST_ENTERED)
        .await?
        .unwrap_or(false);
    let calendar = calendar_view(&session).await?;

    Ok(OffersTemplate {
        ctx,
        segments: wheel_face(),
        last_spin,
        spots,
        contest_entered,
        calendar,
    })
}

async fn holiday_closed(state: &AppState, session: &Session, back: &str) -> Result<Option<Redirect>> {
    if state.backend().holiday_status().await.enabled {
        return Ok(None);
    }
    redirect_with_toast(
        session,
        back,
        Toast::info("Christmas offers are not running right now"),
    )
    .await
    .map(Some)
}

/// Spin the prize wheel. Logged-in customers only.
#[instrument(skip(state, session, customer))]
pub async fn spin(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Redirect> {
    if let Some(redirect) = holiday_closed(&state, &session, OFFERS_PATH).await? {
        return Ok(redirect);
    }

    match state.backend().spin_wheel(&customer.token).await {
        Ok(result) => {
            let spin = LastSpin {
                rotation: spin_rotation(&result),
                code: result.code,
                prize: result.prize,
            };
            store(&session, session_keys::LAST_SPIN, &spin).await?;
            add_breadcrumb("christmas", "Wheel spun", Some(&[("prize", spin.prize.as_str())]));
            redirect_with_toast(
                &session,
                OFFERS_PATH,
                Toast::success(format!("🎉 You won {}! Code: {}", spin.prize, spin.code)),
            )
            .await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Wheel spin failed");
            let message = e.user_message("Spin failed").to_string();
            redirect_with_toast(&session, OFFERS_PATH, Toast::error(message)).await
        }
    }
}

/// Enter the limited-spots contest, once per session.
#[instrument(skip(state, session, customer))]
pub async fn enter_contest(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(customer): RequireAuth,
) -> Result<Redirect> {
    if let Some(redirect) = holiday_closed(&state, &session, OFFERS_PATH).await? {
        return Ok(redirect);
    }

    let entered = session
        .get::<bool>(session_keys::CONTEST_ENTERED)
        .await?
        .unwrap_or(false);
    if entered {
        return redirect_with_toast(
            &session,
            OFFERS_PATH,
            Toast::info("You have already entered the contest"),
        )
        .await;
    }

    match state.backend().enter_contest(&customer.token).await {
        Ok(entry) => {
            store(&session, session_keys::CONTEST_ENTERED, &true).await?;
            let message = match &entry.code {
                Some(code) if entry.is_winner => format!("{} Code: {code}", entry.message()),
                _ => entry.message(),
            };
            redirect_with_toast(&session, OFFERS_PATH, Toast::success(message)).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Contest entry failed");
            let message = e.user_message("Failed to enter contest").to_string();
            redirect_with_toast(&session, OFFERS_PATH, Toast::error(message)).await
        }
    }
}

/// Where to go after opening a door.
#[derive(Debug, Default, Deserialize)]
pub struct DoorForm {
    #[serde(default)]
    pub next: Option<String>,
}

/// Open an advent calendar door.
#[instrument(skip(state, session, form))]
pub async fn open_door(
    State(state): State<AppState>,
    session: Session,
    Path(day): Path<u32>,
    Form(form): Form<DoorForm>,
) -> Result<Redirect> {
    let back = local_path(form.next.as_deref(), "/christmas-offers#calendar");
    if let Some(redirect) = holiday_closed(&state, &session, &back).await? {
        return Ok(redirect);
    }

    let mut calendar: AdventCalendar = load(&session, session_keys::ADVENT).await?;
    match calendar.claim(day, store_today()) {
        Ok(reward) => {
            store(&session, session_keys::ADVENT, &calendar).await?;
            let message = format!(
                "🎁 Day {day}: {} - {} (streak {})",
                reward.reward, reward.description, calendar.streak
            );
            redirect_with_toast(&session, &back, Toast::success(message)).await
        }
        Err(e) => redirect_with_toast(&session, &back, Toast::error(e.to_string())).await,
    }
}

// =============================================================================
// Gift finder
// =============================================================================

/// Raw quiz answers; unknown values are treated as unanswered.
#[derive(Debug, Default, Deserialize)]
pub struct GiftFinderQuery {
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl GiftFinderQuery {
    /// The completed quiz, if every required question was answered.
    fn quiz(&self) -> Option<GiftQuiz> {
        let recipient = Recipient::ALL
            .into_iter()
            .find(|r| Some(r.value()) == self.recipient.as_deref())?;
        let style = Style::ALL
            .into_iter()
            .find(|s| Some(s.value()) == self.style.as_deref())?;
        let budget = Budget::ALL
            .into_iter()
            .find(|b| Some(b.value()) == self.budget.as_deref())?;
        let size = self
            .size
            .as_deref()
            .filter(|size| SIZES.contains(size))
            .map(str::to_owned);

        Some(GiftQuiz {
            recipient,
            style,
            budget,
            size,
        })
    }
}

/// Gift finder page template.
#[derive(Template, WebTemplate)]
#[template(path = "christmas/gift_finder.html")]
pub struct GiftFinderTemplate {
    pub ctx: PageContext,
    pub recipients: [Recipient; 4],
    pub styles: [Style; 4],
    pub budgets: [Budget; 4],
    pub sizes: [&'static str; 6],
    pub quiz: Option<GiftQuiz>,
    pub total: usize,
    pub suggestions: Vec<Product>,
}

impl GiftFinderTemplate {
    fn is_recipient(&self, recipient: &Recipient) -> bool {
        self.quiz.as_ref().is_some_and(|q| q.recipient == *recipient)
    }

    fn is_style(&self, style: &Style) -> bool {
        self.quiz.as_ref().is_some_and(|q| q.style == *style)
    }

    fn is_budget(&self, budget: &Budget) -> bool {
        self.quiz.as_ref().is_some_and(|q| q.budget == *budget)
    }

    fn is_size(&self, size: &str) -> bool {
        self.quiz
            .as_ref()
            .and_then(|q| q.size.as_deref())
            .is_some_and(|s| s == size)
    }
}

/// Display the gift finder and, once answered, its suggestions.
#[instrument(skip(state, ctx))]
pub async fn gift_finder(
    State(state): State<AppState>,
    ctx: PageContext,
    Query(answers): Query<GiftFinderQuery>,
) -> Result<impl IntoResponse> {
    let quiz = answers.quiz();
    let (total, suggestions) = match &quiz {
        Some(quiz) => match state.backend().search_products(&quiz.query()).await {
            Ok(products) => quiz.shortlist(products),
            Err(e) => {
                tracing::warn!(error = %e, "Gift finder search failed");
                (0, Vec::new())
            }
        },
        None => (0, Vec::new()),
    };

    Ok(GiftFinderTemplate {
        ctx,
        recipients: Recipient::ALL,
        styles: Style::ALL,
        budgets: Budget::ALL,
        sizes: SIZES,
        quiz,
        total,
        suggestions,
    })
}

/// Current holiday mode, for client-side refresh.
pub async fn holiday_status(State(state): State<AppState>) -> Json<HolidayStatus> {
    Json(state.backend().holiday_status().await)
}
