//! HTTP surface of the Review Gateway.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness check |
//! | `POST` | `/review` | Submit code for review |
//!
//! # Error Contract
//!
//! All failure responses carry a JSON body of the form:
//!
//! ```json
//! { "detail": "Code content cannot be empty." }
//! ```
//!
//! Statuses: `400` for invalid input, `502` when Gemini returned no usable
//! text, `500` when the outbound call itself failed.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so browser frontends
//! can call the gateway directly. Restrict at the deployment layer.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::review::{self, ReviewError, ReviewRequest, ReviewResponse};

/// Shared application state passed to route handlers via Axum's `State`
/// extractor. The client is the only shared resource; it is read-only, so
/// requests never coordinate with each other.
#[derive(Clone)]
struct AppState {
    client: Arc<GeminiClient>,
}

/// Build the gateway router for the given configuration.
///
/// Exposed separately from [`run_server`] so tests can serve the router on
/// an ephemeral port with the client pointed at a mock upstream.
pub fn app(config: &Config) -> anyhow::Result<Router> {
    let state = AppState {
        client: Arc::new(GeminiClient::new(config.gemini.clone())?),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/", get(handle_root))
        .route("/review", post(handle_review))
        .layer(cors)
        .with_state(state))
}

/// Start the gateway HTTP server.
///
/// Binds to the address configured in `[server].bind` and serves until the
/// process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = app(config)?;

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!("Review Gateway listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON body for all failure responses.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReviewError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ReviewError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ReviewError::EmptyResponse => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ============ GET / ============

/// JSON response body for `GET /`.
#[derive(Serialize)]
struct RootResponse {
    message: String,
}

/// Handler for `GET /`.
///
/// Fixed liveness payload; no failure modes, no state consulted.
async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Gemini Code Review Assistant API is running.".to_string(),
    })
}

// ============ POST /review ============

/// Handler for `POST /review`.
///
/// Validates the request, makes one outbound Gemini call, and relays the
/// extracted review. Each invocation is independent; the outbound call is
/// the sole await point and is bounded by the configured timeout.
async fn handle_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ReviewResponse>, ReviewError> {
    let result = review::run_review(&state.client, &request).await?;
    Ok(Json(result))
}
