use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;

pub async fn not_found_handler(uri: Uri, headers: HeaderMap) -> Response {
    tracing::debug!(path = %uri.path(), "no route");

    let wants_json = headers
        .get(axum::http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false);

    if wants_json || uri.path().starts_with(crate::http_server::API_PREFIX) {
        let err_msg = serde_json::json!({"msg": "not found", "path": uri.path()});
        return (StatusCode::NOT_FOUND, Json(err_msg)).into_response();
    }

    (
        StatusCode::NOT_FOUND,
        [(axum::http::header::CONTENT_TYPE, "text/plain")],
        "not found",
    )
        .into_response()
}
