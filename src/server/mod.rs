//! The shared high-score endpoint.
//!
//! One path, three methods: `OPTIONS` for browser preflight, `GET` for the
//! current best and `POST` to offer a new score. The stored value only ever
//! goes up.

pub mod config;
pub mod payload;
pub mod store;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tokio::sync::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::protocol::{ErrorResponse, HighScoreResponse, HIGHSCORE_PATH};
use config::ServerConfig;
use payload::{coerce_score, parse_body, parse_stored, to_score};
use store::ScoreStore;

/// Key the counter lives under
pub const HIGHSCORE_KEY: &str = "global_highscore";
/// Upper bound enforced when bounds checking is on
pub const MAX_SCORE: u64 = 1_000_000;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn store_failure(err: StoreError) -> ApiError {
    error!("high score store failure: {}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

#[derive(Clone)]
pub struct ApiState {
    store: Option<Arc<dyn ScoreStore>>,
    enforce_bounds: bool,
    // read-max-write must not interleave within this process
    write_lock: Arc<Mutex<()>>,
}

impl ApiState {
    pub fn new(store: Option<Arc<dyn ScoreStore>>, enforce_bounds: bool) -> Self {
        Self {
            store,
            enforce_bounds,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn store(&self) -> Result<&dyn ScoreStore, ApiError> {
        self.store
            .as_deref()
            .ok_or_else(|| store_failure(StoreError::Unconfigured))
    }
}

async fn read_current(store: &dyn ScoreStore) -> Result<u64, ApiError> {
    let raw = store.get(HIGHSCORE_KEY).await.map_err(store_failure)?;
    Ok(parse_stored(raw.as_deref()).unwrap_or_else(|| {
        warn!(value = ?raw, "stored high score is not a number, treating as 0");
        0
    }))
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn get_high_score(
    State(state): State<ApiState>,
) -> Result<Json<HighScoreResponse>, ApiError> {
    let current = read_current(state.store()?).await?;
    Ok(Json(HighScoreResponse {
        high_score: current,
    }))
}

async fn submit_score(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<HighScoreResponse>, ApiError> {
    let store = state.store()?;
    let payload =
        parse_body(&body).map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid payload"))?;

    let incoming = coerce_score(&payload);
    if state.enforce_bounds && !(0.0..=MAX_SCORE as f64).contains(&incoming) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Score out of range"));
    }
    let incoming = to_score(incoming);

    let _guard = state.write_lock.lock().await;
    let current = read_current(store).await?;
    let next = current.max(incoming);
    if next != current {
        store
            .set(HIGHSCORE_KEY, &next.to_string())
            .await
            .map_err(store_failure)?;
        info!(previous = current, high_score = next, "new world best");
    }

    Ok(Json(HighScoreResponse { high_score: next }))
}

async fn method_not_allowed() -> ApiError {
    api_error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Router for the high-score API. Every response carries the CORS headers,
/// including errors and preflight.
pub fn router(state: ApiState, allow_origin: HeaderValue) -> Router {
    Router::new()
        .route(
            HIGHSCORE_PATH,
            get(get_high_score)
                .post(submit_score)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET,POST,OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
}

/// Router wired from a resolved [`ServerConfig`]
pub fn build_router(config: &ServerConfig) -> Router {
    let state = ApiState::new(config.build_store(), config.enforce_bounds);
    router(state, config.allow_origin_header())
}
