//! Pawtection web surface
//!
//! Serves the quote form and a small JSON API over a shared, read-only
//! [`Predictor`].

pub mod render;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use pawtection_model::{Predictor, Quote, Selection};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use render::{render_page, FormLayout, Outcome, FORM_LAYOUT};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub layout: FormLayout,
}

impl AppState {
    pub fn new(predictor: Arc<Predictor>) -> Self {
        Self {
            predictor,
            layout: FORM_LAYOUT,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    schema_version: u32,
    n_trees: usize,
    n_samples: usize,
    seed: u64,
    trained_at: i64,
    base_price: u32,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/quote", post(submit_quote))
        .route("/api/quote", post(api_quote))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `router` on `listener` until `shutdown` resolves, then let
/// in-flight requests finish.
pub async fn serve_until<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(
        &state.layout,
        state.predictor.schema(),
        None,
        &Outcome::Hint,
    ))
}

async fn submit_quote(State(state): State<AppState>, Form(selection): Form<Selection>) -> Html<String> {
    let outcome = match state.predictor.quote(&selection) {
        Ok(quote) => {
            log_quote(&quote);
            Outcome::Quoted(quote)
        }
        Err(err) => {
            warn!("Rejected form submission: {:?}", err);
            Outcome::Warning(err.to_string())
        }
    };

    Html(render_page(
        &state.layout,
        state.predictor.schema(),
        Some(&selection),
        &outcome,
    ))
}

async fn api_quote(
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> Result<Json<Quote>, ApiError> {
    let quote = state
        .predictor
        .quote(&selection)
        .map_err(|err| ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string()))?;
    log_quote(&quote);
    Ok(Json(quote))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let metadata = &state.predictor.pipeline().metadata;
    Json(HealthResponse {
        status: "ok",
        version: pawtection_model::VERSION,
        schema_version: state.predictor.schema().version,
        n_trees: state.predictor.pipeline().forest.num_trees(),
        n_samples: metadata.n_samples,
        seed: metadata.seed,
        trained_at: metadata.trained_at,
        base_price: state.predictor.config().base_price,
    })
}

fn log_quote(quote: &Quote) {
    info!(
        score = quote.score,
        premium = quote.premium,
        band = ?quote.band,
        "Quote issued"
    );
}
