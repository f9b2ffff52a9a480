//! HTTP request handlers for the viewer session API.
//!
//! # Endpoints
//!
//! - `POST /viewers` - Create a viewer session
//! - `GET /viewers/{viewer_id}` - Viewer metadata
//! - `DELETE /viewers/{viewer_id}` - Drop a viewer session
//! - `POST /viewers/{viewer_id}/motions` - Rotate/translate the slide
//! - `POST /viewers/{viewer_id}/undo` - Undo the last motion
//! - `GET /viewers/{viewer_id}/pixels/{vx}/{vy}` - Slide coordinate of one viewer pixel
//! - `GET /viewers/{viewer_id}/registrations` - Slide coordinates of a rectangle
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{SessionError, ViewerError};
use crate::session::{SessionId, SessionInfo, SessionRegistry};
use crate::transform::{Motion, TransformState, Translation};

/// Default side length of a registrations query.
pub const DEFAULT_REGION_SIZE: u32 = 64;

/// Maximum side length of a registrations query.
pub const MAX_REGION_SIZE: u32 = 1024;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state, passed to handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Live viewer sessions
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(sessions: SessionRegistry) -> Self {
        Self {
            sessions: Arc::new(sessions),
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Body of `POST /viewers`.
#[derive(Debug, Deserialize)]
pub struct CreateViewerRequest {
    /// Viewer width in pixels
    pub width: u32,

    /// Viewer height in pixels
    pub height: u32,

    /// Initial slide x offset of viewer pixel (0, 0)
    #[serde(default)]
    pub offset_x: Option<f64>,

    /// Initial slide y offset of viewer pixel (0, 0)
    #[serde(default)]
    pub offset_y: Option<f64>,
}

impl CreateViewerRequest {
    fn offset(&self) -> Option<(f64, f64)> {
        match (self.offset_x, self.offset_y) {
            (None, None) => None,
            (ox, oy) => Some((ox.unwrap_or(0.0), oy.unwrap_or(0.0))),
        }
    }
}

/// Body of `POST /viewers/{viewer_id}/motions`.
///
/// Angles are entered in degrees and converted to radians before they reach
/// the engine. A missing translation component defaults to zero.
#[derive(Debug, Deserialize)]
pub struct MotionRequest {
    /// Rotation of the slide, counter-clockwise, in degrees
    pub angle_degrees: f64,

    #[serde(default)]
    pub dx: Option<f64>,

    #[serde(default)]
    pub dy: Option<f64>,
}

impl MotionRequest {
    pub fn to_motion(&self) -> Motion {
        let translation = match (self.dx, self.dy) {
            (None, None) => None,
            (dx, dy) => Some(Translation::new(dx.unwrap_or(0.0), dy.unwrap_or(0.0))),
        };
        Motion::from_degrees(self.angle_degrees, translation)
    }
}

/// Path parameters for single-pixel lookups.
#[derive(Debug, Deserialize)]
pub struct PixelPathParams {
    pub viewer_id: String,
    pub vx: i64,
    pub vy: i64,
}

/// Query parameters for the registrations endpoint.
#[derive(Debug, Deserialize)]
pub struct RegionQueryParams {
    #[serde(default)]
    pub x: u32,

    #[serde(default)]
    pub y: u32,

    /// Region width (default: 64, max: 1024)
    #[serde(default = "default_region_size")]
    pub width: u32,

    /// Region height (default: 64, max: 1024)
    #[serde(default = "default_region_size")]
    pub height: u32,
}

fn default_region_size() -> u32 {
    DEFAULT_REGION_SIZE
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_motion")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Viewer metadata.
#[derive(Debug, Serialize)]
pub struct ViewerResponse {
    pub viewer_id: String,
    pub width: u32,
    pub height: u32,
    pub motion_count: usize,
}

impl From<SessionInfo> for ViewerResponse {
    fn from(info: SessionInfo) -> Self {
        Self {
            viewer_id: info.id.to_string(),
            width: info.width,
            height: info.height,
            motion_count: info.motion_count,
        }
    }
}

/// Response from the undo endpoint.
#[derive(Debug, Serialize)]
pub struct UndoResponse {
    #[serde(flatten)]
    pub viewer: ViewerResponse,

    /// The motion that was undone
    pub undone: Motion,
}

/// One viewer pixel and the slide coordinate it displays.
#[derive(Debug, Serialize)]
pub struct PixelResponse {
    pub vx: i32,
    pub vy: i32,
    pub sx: f64,
    pub sy: f64,
}

impl From<TransformState> for PixelResponse {
    fn from(state: TransformState) -> Self {
        let pixel = state.viewer_pixel();
        let coord = state.current();
        Self {
            vx: pixel.vx,
            vy: pixel.vy,
            sx: coord.sx,
            sy: coord.sy,
        }
    }
}

/// Response from the registrations endpoint, in row-major order.
#[derive(Debug, Serialize)]
pub struct RegionResponse {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub registrations: Vec<PixelResponse>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert SessionError to HTTP response.
///
/// 5xx errors are logged at ERROR, 404 at DEBUG, other 4xx at WARN.
impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            SessionError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            SessionError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "viewer_too_large"),
            SessionError::Motion(_) => (StatusCode::BAD_REQUEST, "invalid_motion"),
            SessionError::Viewer(viewer_err) => match viewer_err {
                ViewerError::EmptyExtent { .. } | ViewerError::ExtentTooLarge { .. } => {
                    (StatusCode::BAD_REQUEST, "invalid_extent")
                }
                ViewerError::NonFiniteOffset { .. } => (StatusCode::BAD_REQUEST, "invalid_offset"),
                ViewerError::PixelOutOfBounds { .. } => (StatusCode::BAD_REQUEST, "out_of_bounds"),
                ViewerError::NothingToUndo => (StatusCode::CONFLICT, "nothing_to_undo"),
            },
            SessionError::Worker { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "worker_error"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

fn parse_viewer_id(viewer_id: &str) -> Result<SessionId, SessionError> {
    viewer_id.parse()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a viewer session.
pub async fn create_viewer_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateViewerRequest>,
) -> Result<(StatusCode, Json<ViewerResponse>), SessionError> {
    let info = state
        .sessions
        .create(request.width, request.height, request.offset())
        .await?;
    Ok((StatusCode::CREATED, Json(info.into())))
}

/// Viewer metadata.
pub async fn viewer_info_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> Result<Json<ViewerResponse>, SessionError> {
    let id = parse_viewer_id(&viewer_id)?;
    let info = state.sessions.info(id).await?;
    Ok(Json(info.into()))
}

/// Drop a viewer session.
pub async fn delete_viewer_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> Result<StatusCode, SessionError> {
    let id = parse_viewer_id(&viewer_id)?;
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a motion to every pixel of a viewer.
pub async fn motion_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
    Json(request): Json<MotionRequest>,
) -> Result<Json<ViewerResponse>, SessionError> {
    let id = parse_viewer_id(&viewer_id)?;
    let info = state
        .sessions
        .apply_motion(id, request.to_motion())
        .await?;
    Ok(Json(info.into()))
}

/// Undo the last motion of a viewer.
pub async fn undo_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
) -> Result<Json<UndoResponse>, SessionError> {
    let id = parse_viewer_id(&viewer_id)?;
    let (info, undone) = state.sessions.undo(id).await?;
    Ok(Json(UndoResponse {
        viewer: info.into(),
        undone,
    }))
}

/// Slide coordinate displayed at one viewer pixel.
pub async fn pixel_handler(
    State(state): State<AppState>,
    Path(params): Path<PixelPathParams>,
) -> Result<Json<PixelResponse>, SessionError> {
    let id = parse_viewer_id(&params.viewer_id)?;
    let registration = state
        .sessions
        .registration(id, params.vx, params.vy)
        .await?;
    Ok(Json(registration.into()))
}

/// Slide coordinates of a rectangle of viewer pixels, clipped to the viewer.
pub async fn registrations_handler(
    State(state): State<AppState>,
    Path(viewer_id): Path<String>,
    Query(query): Query<RegionQueryParams>,
) -> Result<Json<RegionResponse>, SessionError> {
    let id = parse_viewer_id(&viewer_id)?;
    let width = query.width.clamp(1, MAX_REGION_SIZE);
    let height = query.height.clamp(1, MAX_REGION_SIZE);

    let region = state
        .sessions
        .region(id, query.x, query.y, width, height)
        .await?;

    Ok(Json(RegionResponse {
        x: region.x,
        y: region.y,
        width: region.width,
        height: region.height,
        registrations: region.registrations.into_iter().map(Into::into).collect(),
    }))
}

// =============================================================================
// Tests
// =============================================================================
