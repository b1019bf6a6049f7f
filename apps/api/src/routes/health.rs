use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Job Search API",
        "version": "1.0.0"
    }))
}

/// GET /health
/// Liveness only; providers are not contacted.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "gateway"
    }))
}
