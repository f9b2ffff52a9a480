//! API integration tests for viewer sessions.
//!
//! Tests verify:
//! - Viewer creation, metadata and deletion
//! - Motions and undo through the HTTP layer
//! - Single-pixel and region lookups
//! - Error cases and their JSON error bodies

use axum::http::StatusCode;
use serde_json::json;

use super::test_utils::{
    assert_json_coord, create_viewer, send, test_router, test_router_with_history,
    test_router_with_limits,
};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = test_router();
    let (status, json) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// Viewer Lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_and_get_viewer() {
    let router = test_router();
    let (status, created) = send(
        &router,
        "POST",
        "/viewers",
        Some(json!({ "width": 32, "height": 16 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["width"], 32);
    assert_eq!(created["height"], 16);
    assert_eq!(created["motion_count"], 0);

    let id = created["viewer_id"].as_str().unwrap();
    assert_eq!(id.len(), 16);

    let (status, info) = send(&router, "GET", &format!("/viewers/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info, created);
}

#[tokio::test]
async fn test_create_with_offset() {
    let router = test_router();
    let (_, created) = send(
        &router,
        "POST",
        "/viewers",
        Some(json!({ "width": 4, "height": 4, "offset_x": 100.0, "offset_y": -2.5 })),
    )
    .await;
    let id = created["viewer_id"].as_str().unwrap();

    let (status, pixel) = send(&router, "GET", &format!("/viewers/{}/pixels/1/2", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pixel["vx"], 1);
    assert_eq!(pixel["vy"], 2);
    assert_json_coord(&pixel, 101.0, -0.5);
}

#[tokio::test]
async fn test_delete_viewer() {
    let router = test_router();
    let id = create_viewer(&router, 4, 4).await;

    let (status, body) = send(&router, "DELETE", &format!("/viewers/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, json) = send(&router, "GET", &format!("/viewers/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_unknown_and_malformed_viewer_ids() {
    let router = test_router();

    let (status, json) = send(&router, "GET", "/viewers/00000000000000ff", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);

    let (status, _) = send(&router, "GET", "/viewers/not-a-viewer", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_empty_viewer_rejected() {
    let router = test_router();
    let (status, json) = send(
        &router,
        "POST",
        "/viewers",
        Some(json!({ "width": 0, "height": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_extent");
}

#[tokio::test]
async fn test_create_oversized_viewer_rejected() {
    let router = test_router_with_limits(4, 64);
    let (status, json) = send(
        &router,
        "POST",
        "/viewers",
        Some(json!({ "width": 9, "height": 8 })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "viewer_too_large");
}

#[tokio::test]
async fn test_least_recently_used_viewer_evicted() {
    let router = test_router_with_limits(1, 64);
    let first = create_viewer(&router, 2, 2).await;
    let second = create_viewer(&router, 2, 2).await;

    let (status, _) = send(&router, "GET", &format!("/viewers/{}", first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, "GET", &format!("/viewers/{}", second), None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Motions
// =============================================================================

#[tokio::test]
async fn test_quarter_turn_and_back() {
    let router = test_router();
    let id = create_viewer(&router, 4, 4).await;
    let motions = format!("/viewers/{}/motions", id);
    let pixel = format!("/viewers/{}/pixels/1/0", id);

    let (status, info) = send(&router, "POST", &motions, Some(json!({ "angle_degrees": 90 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["motion_count"], 1);

    let (_, json) = send(&router, "GET", &pixel, None).await;
    assert_json_coord(&json, 0.0, -1.0);

    send(&router, "POST", &motions, Some(json!({ "angle_degrees": -90 }))).await;
    let (_, json) = send(&router, "GET", &pixel, None).await;
    assert_json_coord(&json, 1.0, 0.0);
}

#[tokio::test]
async fn test_rotation_with_translation() {
    let router = test_router();
    let id = create_viewer(&router, 4, 4).await;

    let (status, _) = send(
        &router,
        "POST",
        &format!("/viewers/{}/motions", id),
        Some(json!({ "angle_degrees": 45, "dx": 1, "dy": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&router, "GET", &format!("/viewers/{}/pixels/2/3", id), None).await;
    assert_json_coord(&json, 4.535533905932738, -0.2928932188134524);
}

#[tokio::test]
async fn test_malformed_motion_body_rejected() {
    let router = test_router();
    let id = create_viewer(&router, 2, 2).await;

    let (status, _) = send(
        &router,
        "POST",
        &format!("/viewers/{}/motions", id),
        Some(json!({ "angle": 90 })),
    )
    .await;
    assert!(status.is_client_error());

    let (_, info) = send(&router, "GET", &format!("/viewers/{}", id), None).await;
    assert_eq!(info["motion_count"], 0);
}

#[tokio::test]
async fn test_undo() {
    let router = test_router();
    let id = create_viewer(&router, 4, 4).await;
    let undo = format!("/viewers/{}/undo", id);

    let (status, json) = send(&router, "POST", &undo, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "nothing_to_undo");

    send(
        &router,
        "POST",
        &format!("/viewers/{}/motions", id),
        Some(json!({ "angle_degrees": 30, "dx": 5, "dy": 5 })),
    )
    .await;

    let (status, json) = send(&router, "POST", &undo, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["motion_count"], 0);
    assert_eq!(json["undone"]["translation"]["dx"], 5.0);

    let (_, json) = send(&router, "GET", &format!("/viewers/{}/pixels/3/2", id), None).await;
    assert_json_coord(&json, 3.0, 2.0);
}

#[tokio::test]
async fn test_motion_history_is_bounded() {
    let router = test_router_with_history(4);
    let id = create_viewer(&router, 2, 1).await;
    let motions = format!("/viewers/{}/motions", id);

    for _ in 0..20 {
        let (status, _) = send(&router, "POST", &motions, Some(json!({ "angle_degrees": 1 }))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, info) = send(&router, "GET", &format!("/viewers/{}", id), None).await;
    assert_eq!(info["motion_count"], 4);

    let undo = format!("/viewers/{}/undo", id);
    for remaining in (0..4).rev() {
        let (status, json) = send(&router, "POST", &undo, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["motion_count"], remaining);
    }
    let (status, _) = send(&router, "POST", &undo, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Sixteen one-degree turns were dropped from the history and stay applied.
    let (_, json) = send(&router, "GET", &format!("/viewers/{}/pixels/1/0", id), None).await;
    let kept = 16f64.to_radians();
    assert_json_coord(&json, kept.cos(), -kept.sin());
}

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn test_pixel_out_of_bounds() {
    let router = test_router();
    let id = create_viewer(&router, 4, 4).await;

    let (status, json) = send(&router, "GET", &format!("/viewers/{}/pixels/4/0", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "out_of_bounds");

    let (status, _) = send(&router, "GET", &format!("/viewers/{}/pixels/-1/0", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_registrations_region() {
    let router = test_router();
    let id = create_viewer(&router, 5, 5).await;
    send(
        &router,
        "POST",
        &format!("/viewers/{}/motions", id),
        Some(json!({ "angle_degrees": 180 })),
    )
    .await;

    let (status, json) = send(
        &router,
        "GET",
        &format!("/viewers/{}/registrations?x=3&y=1&width=10&height=2", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["width"], 2);
    assert_eq!(json["height"], 2);

    let registrations = json["registrations"].as_array().unwrap();
    assert_eq!(registrations.len(), 4);
    assert_eq!(registrations[1]["vx"], 4);
    assert_eq!(registrations[1]["vy"], 1);
    assert_json_coord(&registrations[1], -4.0, -1.0);
}

#[tokio::test]
async fn test_registrations_default_region() {
    let router = test_router();
    let id = create_viewer(&router, 3, 2).await;

    let (status, json) = send(
        &router,
        "GET",
        &format!("/viewers/{}/registrations", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["registrations"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_registrations_origin_outside_viewer() {
    let router = test_router();
    let id = create_viewer(&router, 3, 2).await;

    let (status, json) = send(
        &router,
        "GET",
        &format!("/viewers/{}/registrations?x=3", id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "out_of_bounds");
}
