use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::{PollenConfig, ServerConfig};
use crate::dashboard::{Dashboard, DashboardView};
use crate::models::Location;
use crate::providers::Transport;
use crate::resolution::CitySnapshot;
use crate::BreezeError;

pub mod relay;

/// Shared handles for all API routes
#[derive(Clone)]
pub struct ApiState {
    pub dashboard: Arc<Dashboard>,
    pub transport: Arc<dyn Transport>,
    pub pollen: Arc<PollenConfig>,
}

/// `{"error": "..."}` with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<BreezeError> for ApiError {
    fn from(err: BreezeError) -> Self {
        let status = match &err {
            BreezeError::Network { .. } | BreezeError::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            }
            BreezeError::NoData { .. } => StatusCode::NOT_FOUND,
            BreezeError::UnsupportedInput { .. } => StatusCode::BAD_REQUEST,
            BreezeError::Config { .. } | BreezeError::Preferences { .. } | BreezeError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.user_message())
    }
}

/// CORS restricted to the configured origins, GET/OPTIONS only
fn cors(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn router(state: ApiState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/pollen", any(relay::pollen))
        .route("/dashboard", get(get_dashboard))
        .route("/ticker", get(get_ticker))
        .layer(cors(server))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    city: Option<String>,
    lat: Option<String>,
    lon: Option<String>,
}

/// Parsed here rather than by `Query` so a bad number still gets a JSON error
fn coordinate(value: Option<&str>) -> Option<f64> {
    value.map(str::trim).and_then(|value| value.parse().ok())
}

async fn get_dashboard(
    State(state): State<ApiState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardView>, ApiError> {
    let (Some(city), Some(lat), Some(lon)) = (
        params.city.filter(|city| !city.trim().is_empty()),
        coordinate(params.lat.as_deref()),
        coordinate(params.lon.as_deref()),
    ) else {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "Missing city, latitude or longitude",
        ));
    };

    let location = Location::try_new(city, lat, lon)?;
    let view = state.dashboard.fetch_view(location).await?;
    Ok(Json(view))
}

async fn get_ticker(State(state): State<ApiState>) -> Result<Json<Vec<CitySnapshot>>, ApiError> {
    Ok(Json(state.dashboard.ticker().await?))
}
