use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, ACCEPT, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::Response,
    routing::{get, post},
    Router,
};
use common_http_errors::ApiError;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::app_state::AppState;
use crate::charge_handlers::make_charge;

async fn health() -> &'static str {
    "ok"
}

async fn render_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    let buffer = state.metrics.encode().map_err(ApiError::internal)?;
    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )
        .body(Body::from(buffer))
        .map_err(ApiError::internal)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(render_metrics))
        .route("/charge", post(make_charge))
        .with_state(state)
}

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE])
}
