//! Credential relay for the Google Pollen API. The key stays on the server.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, warn};

use super::{ApiError, ApiState};
use crate::providers::pollen::google_lookup_url;

#[derive(Debug, Deserialize)]
pub struct RelayParams {
    lat: Option<String>,
    lon: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// `GET /api/pollen?lat=..&lon=..`
pub async fn pollen(
    State(state): State<ApiState>,
    method: Method,
    Query(params): Query<RelayParams>,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    if method != Method::GET {
        return ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    }

    let (Some(lat), Some(lon)) = (
        present(params.lat.as_deref()),
        present(params.lon.as_deref()),
    ) else {
        return ApiError::new(StatusCode::BAD_REQUEST, "Missing latitude or longitude")
            .into_response();
    };

    let Some(api_key) = state.pollen.usable_api_key() else {
        return ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "API key not configured")
            .into_response();
    };

    let url = google_lookup_url(&state.pollen.upstream_url, api_key, lat, lon);
    match state.transport.get(&url).await {
        Ok(upstream) => {
            if !upstream.is_success() {
                warn!("Google Pollen API error: {}", upstream.status);
            }
            let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                Body::from(upstream.body),
            )
                .into_response()
        }
        Err(e) => {
            error!("Pollen relay error: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}
