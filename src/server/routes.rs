//! Router configuration for the viewer session API.
//!
//! # Route Structure
//!
//! ```text
//! /health                                         - Health check
//! /viewers                                        - Create a viewer (POST)
//! /viewers/{viewer_id}                            - Metadata (GET), drop (DELETE)
//! /viewers/{viewer_id}/motions                    - Apply a motion (POST)
//! /viewers/{viewer_id}/undo                       - Undo the last motion (POST)
//! /viewers/{viewer_id}/pixels/{vx}/{vy}           - One registration (GET)
//! /viewers/{viewer_id}/registrations              - Rectangle of registrations (GET)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use slide_viewer::server::{create_router, RouterConfig};
//! use slide_viewer::session::SessionRegistry;
//!
//! let router = create_router(SessionRegistry::new(), RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_viewer_handler, delete_viewer_handler, health_handler, motion_handler, pixel_handler,
    registrations_handler, undo_handler, viewer_info_handler, AppState,
};
use crate::session::SessionRegistry;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default CORS allows any origin and tracing is enabled.
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router over a session registry.
pub fn create_router(sessions: SessionRegistry, config: RouterConfig) -> Router {
    let app_state = AppState::new(sessions);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/viewers", post(create_viewer_handler))
        .route(
            "/viewers/{viewer_id}",
            get(viewer_info_handler).delete(delete_viewer_handler),
        )
        .route("/viewers/{viewer_id}/motions", post(motion_handler))
        .route("/viewers/{viewer_id}/undo", post(undo_handler))
        .route("/viewers/{viewer_id}/pixels/{vx}/{vy}", get(pixel_handler))
        .route(
            "/viewers/{viewer_id}/registrations",
            get(registrations_handler),
        )
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
