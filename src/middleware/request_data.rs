use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::collections::HashMap;

use crate::api::GatewayRequest;
use crate::error::ApiError;
use crate::handlers::AppState;

/// Middleware that extracts the `data` payload from the body or query string,
/// parses it as JSON or XML and injects the resulting `GatewayRequest`
pub async fn request_data_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let (parts, body) = request.into_parts();

    let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(params)| params)
        .unwrap_or_default();

    let bytes = to_bytes(body, state.max_request_size).await.map_err(|e| {
        tracing::warn!("Failed to read request body: {}", e);
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(json!({ "response": "request body too large" })),
        )
            .into_response()
    })?;

    let is_form = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false);

    let raw = select_data(&bytes, is_form, query.get("data").map(String::as_str));
    let callback = query.get("callback").filter(|cb| !cb.is_empty()).cloned();

    let gateway_request = GatewayRequest::parse(&raw, callback).map_err(|e| {
        tracing::error!("{}", e);
        ApiError::from(e).into_response()
    })?;

    tracing::debug!("Request data: {}", gateway_request.data);

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(gateway_request);

    Ok(next.run(request).await)
}

/// Pick the raw data document: the body (or its `data` form field) when
/// present, otherwise the `data` query parameter
fn select_data(body: &[u8], is_form: bool, query_data: Option<&str>) -> String {
    let from_body = if is_form {
        url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "data")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(String::from_utf8_lossy(body).into_owned())
    };

    match from_body {
        Some(data) if !data.trim().is_empty() => data,
        _ => query_data.unwrap_or_default().to_string(),
    }
}
