use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status":"pong"}`
///
/// Used by load balancers and uptime monitors to verify the gateway is
/// operational.
pub async fn ping() -> Json<serde_json::Value> {
    // Return a simple JSON response indicating the server is alive
    Json(json!({ "status": "pong" }))
}
