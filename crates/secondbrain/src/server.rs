use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use secondbrain_client::{ApiClient, ApiError};

use crate::board;
use crate::calendar::{generate_grid, Cell, MonthRef};
use crate::html;
use crate::schedule;

/// Application state shared across requests
pub struct AppState {
    /// Authenticated backend client; every page load fetches fresh data
    pub client: ApiClient,
}

/// Start the web server
pub async fn serve(port: u16, client: ApiClient) -> anyhow::Result<()> {
    match client.health().await {
        Ok(_) => info!(backend = client.base_url(), "Backend reachable"),
        Err(e) => warn!(backend = client.base_url(), error = %e, "Backend not reachable"),
    }

    let state = Arc::new(AppState { client });
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!(url = %format!("http://{addr}"), "Server running");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/schedule", get(schedule_handler))
        .route("/tasks", get(tasks_handler))
        .route("/notes", get(notes_handler))
        .route("/resources", get(resources_handler))
        .route("/api/calendar", get(calendar_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Backend failure rendered as an error page.
pub struct AppError(ApiError);

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_unauthorized() {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::BAD_GATEWAY
        };
        warn!(error = %self.0, "Backend request failed");
        (status, Html(html::render_error(&self.0.to_string()).into_string())).into_response()
    }
}

/// `?year=2025&month=12`, month one-indexed. Missing parts default to the
/// current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl MonthQuery {
    fn resolve(&self, today: chrono::NaiveDate) -> MonthRef {
        let current = MonthRef::from_date(today);
        MonthRef::from_month1(
            self.year.unwrap_or(current.year()),
            self.month.unwrap_or(current.month1() as i32),
        )
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

async fn month_cells(
    client: &ApiClient,
    query: &MonthQuery,
) -> Result<(MonthRef, Vec<Cell>), AppError> {
    let today = today();
    let month = query.resolve(today);
    let events = schedule::fetch_events(client).await?;
    Ok((month, generate_grid(month, &events, today)))
}

async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let stats = state.client.stats().await?;
    Ok(Html(html::render_dashboard(&stats).into_string()))
}

async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Html<String>, AppError> {
    let (month, cells) = month_cells(&state.client, &query).await?;
    Ok(Html(html::render_schedule(month, &cells).into_string()))
}

async fn tasks_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let tasks = state.client.list_tasks().await?;
    let columns = board::group_by_status(&tasks);
    Ok(Html(html::render_board(&columns).into_string()))
}

async fn notes_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let notes = state.client.list_notes().await?;
    Ok(Html(html::render_notes(&notes).into_string()))
}

async fn resources_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let resources = state.client.list_resources().await?;
    Ok(Html(html::render_resources(&resources).into_string()))
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    /// One-indexed month
    pub month: u32,
    pub label: String,
    pub cells: Vec<Cell>,
}

/// Return the month grid as JSON
async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let (month, cells) = month_cells(&state.client, &query).await?;
    Ok(Json(CalendarResponse {
        year: month.year(),
        month: month.month1(),
        label: month.label(),
        cells,
    }))
}
