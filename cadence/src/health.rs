use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

async fn ok() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not_found"})))
}

/// Serves the hosting platform's liveness probe until the process exits.
///
/// # Errors
/// When binding the port fails.
pub async fn serve(port: u16) -> Result<(), std::io::Error> {
    let app = Router::new()
        .route("/", get(ok))
        .route("/health", get(ok))
        .fallback(not_found);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("health endpoint listening on port {port}");
    axum::serve(listener, app).await
}
