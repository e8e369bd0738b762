//! HTTP API for fertilizer recommendation
//!
//! Provides REST endpoints over a loaded artifact bundle using axum.
//!
//! ## Endpoints
//!
//! - `GET /` - Service banner and endpoint listing
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus-formatted metrics
//! - `GET /categories` - Valid soil and crop categories with their IDs
//! - `POST /recommend` - Fertilizer recommendation for one input row
//!
//! ## Example
//!
//! ```rust,ignore
//! use abonar::api::{create_router, AppState};
//!
//! let state = AppState::new(artifacts);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```
//!
//! Every response passes through a permissive CORS layer so browser clients
//! on any origin can call the API directly.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::artifact::Artifacts;
use crate::error::AbonarError;
use crate::features::RecommendInput;
use crate::mapper::CategoryEntry;
use crate::metrics::MetricsCollector;
use crate::service::RecommendationService;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    service: RecommendationService,
}

impl AppState {
    /// Create state over a loaded artifact bundle
    #[must_use]
    pub fn new(artifacts: Arc<Artifacts>) -> Self {
        Self {
            service: RecommendationService::new(artifacts, Arc::new(MetricsCollector::new())),
        }
    }

    /// The recommendation service
    #[must_use]
    pub fn service(&self) -> &RecommendationService {
        &self.service
    }
}

/// Root banner response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Available endpoint paths
    pub endpoints: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process is serving
    pub status: String,
    /// Crate version
    pub version: String,
}

/// One category with its model-facing ID, as listed by `/categories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryItem {
    /// Integer ID clients send in requests
    pub id: i64,
    /// Human-readable category name
    pub name: String,
}

impl From<&CategoryEntry> for CategoryItem {
    fn from(entry: &CategoryEntry) -> Self {
        Self {
            id: entry.code,
            name: entry.name.clone(),
        }
    }
}

/// Category listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    /// Soil categories in mapping order
    pub soil_types: Vec<CategoryItem>,
    /// Crop categories in mapping order
    pub crop_types: Vec<CategoryItem>,
}

/// Recommendation request body
///
/// Field names are the trained column names verbatim, including the
/// "Temparature" spelling the model was fit with. All eight fields are
/// required; a missing field is a deserialization error, not a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Temperature measurement
    #[serde(rename = "Temparature")]
    pub temparature: i64,
    /// Relative humidity measurement
    #[serde(rename = "Humidity")]
    pub humidity: i64,
    /// Soil moisture measurement
    #[serde(rename = "Moisture")]
    pub moisture: i64,
    /// Soil type category ID
    #[serde(rename = "Soil_Type_ID")]
    pub soil_type_id: i64,
    /// Crop type category ID
    #[serde(rename = "Crop_Type_ID")]
    pub crop_type_id: i64,
    /// Nitrogen content
    #[serde(rename = "Nitrogen")]
    pub nitrogen: i64,
    /// Potassium content
    #[serde(rename = "Potassium")]
    pub potassium: i64,
    /// Phosphorous content
    #[serde(rename = "Phosphorous")]
    pub phosphorous: i64,
}

impl From<&RecommendRequest> for RecommendInput {
    fn from(req: &RecommendRequest) -> Self {
        Self {
            temparature: req.temparature,
            humidity: req.humidity,
            moisture: req.moisture,
            soil_type_id: req.soil_type_id,
            crop_type_id: req.crop_type_id,
            nitrogen: req.nitrogen,
            potassium: req.potassium,
            phosphorous: req.phosphorous,
        }
    }
}

/// Recommendation response body
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    /// Unique ID assigned to this request
    pub request_id: String,
    /// Recommended fertilizer name
    pub recommended_fertilizer: String,
    /// End-to-end handler latency in milliseconds
    pub latency_ms: f64,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error description
    pub error: String,
}

/// Create the API router with all routes configured
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/categories", get(categories_handler))
        .route("/recommend", post(recommend_handler))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Permissive CORS: allow any origin, method, and header
async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&mut response);
        return response;
    }
    let mut response = next.run(request).await;
    apply_cors_headers(&mut response);
    response
}

fn apply_cors_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("*"),
    );
}

/// Root endpoint: service banner
async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        service: "abonar".to_string(),
        version: crate::VERSION.to_string(),
        endpoints: vec![
            "/".to_string(),
            "/health".to_string(),
            "/metrics".to_string(),
            "/categories".to_string(),
            "/recommend".to_string(),
        ],
    })
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Metrics endpoint in Prometheus text format
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.service.metrics().snapshot().to_prometheus()
}

/// Category listing endpoint
async fn categories_handler(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let (soil, crop) = state.service.list_categories();
    Json(CategoriesResponse {
        soil_types: soil.iter().map(CategoryItem::from).collect(),
        crop_types: crop.iter().map(CategoryItem::from).collect(),
    })
}

/// Recommendation endpoint
///
/// Unknown soil or crop IDs are client errors (400). An unmappable
/// prediction means the artifact bundle disagrees with itself and
/// surfaces as a server error (500).
async fn recommend_handler(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, (StatusCode, Json<ErrorResponse>)> {
    let start = Instant::now();
    let input = RecommendInput::from(&request);

    match state.service.recommend(&input) {
        Ok(recommendation) => Ok(Json(RecommendResponse {
            request_id: uuid::Uuid::new_v4().to_string(),
            recommended_fertilizer: recommendation.fertilizer,
            latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        })),
        Err(e) => {
            let status = match e {
                AbonarError::InvalidCategory { .. } => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
