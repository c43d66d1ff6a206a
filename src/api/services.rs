use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::ops::Range;
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::{
    error::ApiError,
    models::{AudioQuery, HealthResponse, ResolveResponse},
    state::AppState,
    utils::{ByteRange, content_range, parse_range},
};
use crate::proxy::{
    ProxyError, StreamResponse,
    headers::{CACHE_DIRECTIVE, DEFAULT_CONTENT_TYPE, cors_headers},
};

/// Key probed by the health check; never written
const HEALTH_PROBE_KEY: &str = "__health__";

/// The `url` parameter, or a JSON error when the query string does not decode
/// (e.g. `url` given twice)
fn url_param(
    state: &AppState,
    query: Result<Query<AudioQuery>, QueryRejection>,
) -> Result<Option<String>, ApiError> {
    match query {
        Ok(Query(query)) => Ok(query.url),
        Err(rejection) => {
            state.metrics.request_rejected();
            Err(ProxyError::MalformedUrl(rejection.body_text()).into())
        }
    }
}

/// Caching resolver (GET /v1/audio/resolve?url=...)
///
/// Validates the origin URL, derives the cache key and makes sure the audio
/// is in the blob store, fetching it from the origin on first access.
/// Answers `{"success": true, "fileId": key}`; the file is then readable at
/// `/v1/audio/files/{fileId}`.
pub async fn resolve_audio(
    State(state): State<AppState>,
    query: Result<Query<AudioQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let span = info_span!("resolve", request_id = %Uuid::now_v7());
    let url = url_param(&state, query)?;

    let key = state
        .proxy
        .resolve(url.as_deref())
        .instrument(span)
        .await?;

    Ok((StatusCode::OK, Json(ResolveResponse::cached(key.into_string()))))
}

/// Streaming passthrough (GET|HEAD|OPTIONS /v1/audio/stream?url=...)
///
/// Relays the origin response with CORS headers. `Range` is forwarded so
/// players can seek; upstream status codes (200, 206, 4xx, 5xx) pass through.
/// `OPTIONS` is answered before the query string is looked at.
pub async fn stream_audio(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    query: Result<Query<AudioQuery>, QueryRejection>,
) -> Result<StreamResponse, ApiError> {
    if method == Method::OPTIONS {
        return Ok(StreamResponse::preflight());
    }

    let span = info_span!("stream", request_id = %Uuid::now_v7(), %method);
    let url = url_param(&state, query)?;

    let response = state
        .proxy
        .stream(&method, url.as_deref(), headers.get(header::RANGE))
        .instrument(span)
        .await?;

    Ok(response)
}

/// Cached file delivery (GET|HEAD /v1/audio/files/{file_id})
///
/// Serves a blob written by the resolver, honoring a single byte range.
/// HEAD is answered from object metadata without reading the blob.
pub async fn cached_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    method: Method,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !is_cache_key(&file_id) {
        return Err(ApiError::NotFound(file_id));
    }

    let store = state.proxy.store();
    let bucket = state.proxy.bucket();

    let info = store
        .head(bucket, &file_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(file_id.clone()))?;

    let requested = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let range = match parse_range(requested, info.size) {
        ByteRange::Full => None,
        ByteRange::Partial(range) => Some(range),
        ByteRange::Unsatisfiable => {
            return Err(ApiError::RangeNotSatisfiable { size: info.size });
        }
    };

    if method == Method::HEAD {
        // The resolver only ever stores audio/mpeg
        let served = range.clone().unwrap_or(0..info.size);
        let response_headers = file_headers(
            HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            &served,
            info.size,
            range.is_some(),
        );
        return Ok((status_for(&range), response_headers).into_response());
    }

    // The blob may vanish between head and get
    let blob = store
        .get(bucket, &file_id, range.clone())
        .await?
        .ok_or_else(|| ApiError::NotFound(file_id.clone()))?;

    let content_type = blob
        .content_type
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    let response_headers = file_headers(content_type, &blob.range, blob.size, range.is_some());

    Ok((status_for(&range), response_headers, blob.data).into_response())
}

fn status_for(range: &Option<Range<u64>>) -> StatusCode {
    if range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    }
}

/// Headers for `served` bytes out of a `size`-byte blob
fn file_headers(
    content_type: HeaderValue,
    served: &Range<u64>,
    size: u64,
    partial: bool,
) -> HeaderMap {
    let mut headers = cors_headers();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_DIRECTIVE));
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(served.end.saturating_sub(served.start)),
    );

    if partial {
        if let Ok(value) = HeaderValue::from_str(&content_range(served, size)) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    headers
}

/// CORS preflight for cached files
pub async fn preflight() -> StreamResponse {
    StreamResponse::preflight()
}

/// Keys are `jamendo_<digits>` or 32 hex chars; anything else cannot exist
fn is_cache_key(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate.len() <= 128
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Health check endpoint (GET /health)
///
/// Returns health status of all components:
/// - api: Axum HTTP server
/// - storage: blob store, probed with a lookup
///
/// Returns 503 Service Unavailable if any component is unhealthy.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    use std::collections::HashMap;

    let mut components = HashMap::new();
    components.insert("api".to_string(), "healthy".to_string());

    let storage_status = match state
        .proxy
        .store()
        .head(state.proxy.bucket(), HEALTH_PROBE_KEY)
        .await
    {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!(error = %e, "Storage health probe failed");
            "unhealthy"
        }
    };
    components.insert("storage".to_string(), storage_status.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let (overall_status, status_code) = if all_healthy {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}

/// Proxy counters (GET /operators/stats)
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
