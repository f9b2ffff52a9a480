//! HTTP server layer.
//!
//! Exposes viewer sessions over a JSON API: clients create a viewer, submit
//! motions as the user rotates or drags the slide, and read back the slide
//! coordinate each viewer pixel should display.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   POST /viewers/{id}/motions   GET /viewers/{id}/pixels/..      │
//! │                                                                 │
//! │  ┌──────────────────────┐        ┌──────────────────────────┐   │
//! │  │       handlers       │        │          routes          │   │
//! │  │ (requests, errors)   │        │  (router, CORS, tracing) │   │
//! │  └──────────────────────┘        └──────────────────────────┘   │
//! └────────────────────────────────┬────────────────────────────────┘
//!                                  ▼
//!                          SessionRegistry
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    create_viewer_handler, delete_viewer_handler, health_handler, motion_handler, pixel_handler,
    registrations_handler, undo_handler, viewer_info_handler, AppState, CreateViewerRequest,
    ErrorResponse, HealthResponse, MotionRequest, PixelResponse, RegionResponse, UndoResponse,
    ViewerResponse,
};
pub use routes::{create_router, RouterConfig};
