use std::sync::Arc;

use axum::{extract::State, http::Method, routing::get, Json, Router};
use chrono::Local;
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::catalog::FixtureCatalog;
use crate::config::{Config, FetchFailurePolicy};
use crate::error::{AppError, Result};
use crate::fetcher::{build_client, fetch_sheet_rows};
use crate::fixtures::build_fixtures;
use crate::types::{Fixture, SheetRow};

#[derive(Clone)]
pub struct ApiState {
    pub cfg: Arc<Config>,
    pub client: reqwest::Client,
    pub catalog: Arc<FixtureCatalog>,
}

impl ApiState {
    pub fn new(cfg: Config, catalog: FixtureCatalog) -> Result<Self> {
        let client = build_client(&cfg)?;
        Ok(Self {
            cfg: Arc::new(cfg),
            client,
            catalog: Arc::new(catalog),
        })
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/matches", get(get_matches))
        .route("/debug/sheet-data", get(get_sheet_data))
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin, with credentials. Origin and request headers are echoed back
/// because a literal `*` is rejected by browsers when credentials are allowed.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(true)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MatchesResponse {
    pub status: &'static str,
    pub data: Vec<Fixture>,
    pub count: usize,
    /// Server date at response time (YYYY-MM-DD), not a fixture date.
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct SheetDataResponse {
    pub status: &'static str,
    pub raw_data: Vec<SheetRow>,
    pub count: usize,
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_matches(State(state): State<ApiState>) -> Result<Json<MatchesResponse>> {
    let rows = load_rows(&state).await?;
    let today = Local::now().date_naive();

    let fixtures = build_fixtures(&rows, &state.catalog, state.cfg.merge_policy, today)
        .inspect_err(|e| error!("Fixture build failed: {e}"))?;

    info!(
        rows = rows.len(),
        fixtures = fixtures.len(),
        policy = %state.cfg.merge_policy,
        "Serving {} fixtures from {} sheet rows",
        fixtures.len(),
        rows.len(),
    );

    Ok(Json(MatchesResponse {
        status: "success",
        count: fixtures.len(),
        data: fixtures,
        date: today.format("%Y-%m-%d").to_string(),
    }))
}

async fn get_sheet_data(State(state): State<ApiState>) -> Result<Json<SheetDataResponse>> {
    let rows = load_rows(&state).await?;
    Ok(Json(SheetDataResponse {
        status: "success",
        count: rows.len(),
        raw_data: rows,
        message: "Raw data from Google Sheets",
    }))
}

/// Fetch the sheet, applying the configured failure policy.
async fn load_rows(state: &ApiState) -> Result<Vec<SheetRow>> {
    match fetch_sheet_rows(&state.client, &state.cfg).await {
        Ok(rows) => Ok(rows),
        Err(e) => match state.cfg.on_fetch_failure {
            FetchFailurePolicy::Degrade => {
                warn!("Sheet fetch failed, continuing with no rows: {e}");
                Ok(Vec::new())
            }
            FetchFailurePolicy::Error => {
                error!("Sheet fetch failed: {e}");
                Err(AppError::Sheet(format!("could not load odds sheet: {e}")))
            }
        },
    }
}
