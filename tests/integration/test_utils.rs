//! Shared helpers for integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use approx::assert_relative_eq;
use axum::Router;
use http_body_util::BodyExt;
use image::{Rgb, RgbImage};
use tower::ServiceExt;

use slide_viewer::session::SessionRegistry;
use slide_viewer::transform::precision::{DEFAULT_ABSOLUTE_TOLERANCE, DEFAULT_RELATIVE_TOLERANCE};
use slide_viewer::transform::SlideCoordinate;
use slide_viewer::{create_router, RouterConfig};

/// Router over a fresh registry, with request tracing disabled.
pub fn test_router() -> Router {
    create_router(SessionRegistry::new(), RouterConfig::new().with_tracing(false))
}

/// Router over a registry with explicit limits.
pub fn test_router_with_limits(sessions: usize, max_pixels: u64) -> Router {
    create_router(
        SessionRegistry::with_capacity(sessions, max_pixels),
        RouterConfig::new().with_tracing(false),
    )
}

/// Router whose viewers keep at most `max_history` motions for undo.
pub fn test_router_with_history(max_history: usize) -> Router {
    create_router(
        SessionRegistry::new().with_history_limit(max_history),
        RouterConfig::new().with_tracing(false),
    )
}

/// Send a request and decode the JSON body.
///
/// Empty bodies decode to Null; non-JSON bodies (e.g. extractor rejections)
/// are returned as a JSON string.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

/// Create a viewer and return its id.
pub async fn create_viewer(router: &Router, width: u32, height: u32) -> String {
    let (status, json) = send(
        router,
        "POST",
        "/viewers",
        Some(serde_json::json!({ "width": width, "height": height })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["viewer_id"].as_str().unwrap().to_string()
}

/// Assert a coordinate matches within the default tolerance.
pub fn assert_coord(actual: SlideCoordinate, sx: f64, sy: f64) {
    assert_relative_eq!(
        actual.sx,
        sx,
        epsilon = DEFAULT_ABSOLUTE_TOLERANCE,
        max_relative = DEFAULT_RELATIVE_TOLERANCE
    );
    assert_relative_eq!(
        actual.sy,
        sy,
        epsilon = DEFAULT_ABSOLUTE_TOLERANCE,
        max_relative = DEFAULT_RELATIVE_TOLERANCE
    );
}

/// Assert a JSON pixel response matches within the default tolerance.
pub fn assert_json_coord(json: &serde_json::Value, sx: f64, sy: f64) {
    let actual = SlideCoordinate::new(json["sx"].as_f64().unwrap(), json["sy"].as_f64().unwrap());
    assert_coord(actual, sx, sy);
}

/// A slide whose pixel (x, y) has colour (x, y, 7).
pub fn numbered_slide(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]))
}

/// Check if data starts with JPEG SOI marker.
pub fn is_valid_jpeg(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0xFF && data[1] == 0xD8
}
