//! Transform engine integration tests.
//!
//! Tests verify:
//! - Round-trip, identity and norm preservation over a range of angles
//! - The single-pixel scenarios (quarter turn, back, rotation with translation)
//! - Motions fold over the previous coordinate
//! - Batch results do not depend on evaluation order or parallelism

use std::f64::consts::PI;

use slide_viewer::transform::{
    approx_eq, BatchMapper, Motion, SlideCoordinate, Tolerance, TransformState,
};
use slide_viewer::viewer::Viewer;

use super::test_utils::assert_coord;

fn angles() -> Vec<f64> {
    (-24..=24).map(|i| f64::from(i) * PI / 12.0 + 0.013).collect()
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_round_trip_for_all_angles() {
    for theta in angles() {
        for (sx, sy) in [(1.0, 0.0), (-3.5, 12.25), (1024.0, 768.0), (0.0, 0.0)] {
            let mut state = TransformState::initialize(0, 0, sx, sy);
            state.apply(&Motion::rotation(theta));
            state.apply(&Motion::rotation(-theta));
            assert_coord(state.current(), sx, sy);
        }
    }
}

#[test]
fn test_identity_motion_leaves_coordinate_unchanged() {
    let mut state = TransformState::initialize(4, 4, 123.456, -78.9);
    state.apply(&Motion::identity());
    state.apply(&Motion::new(0.0, 0.0, 0.0));
    assert_eq!(state.current(), SlideCoordinate::new(123.456, -78.9));
}

#[test]
fn test_rotation_preserves_distance_from_origin() {
    for theta in angles() {
        let mut state = TransformState::initialize(0, 0, 300.0, -400.0);
        let before = state.current().norm_squared();
        state.apply(&Motion::rotation(theta));
        assert!(approx_eq(state.current().norm_squared(), before));
    }
}

#[test]
fn test_inverse_motion_round_trip_with_translation() {
    for theta in angles() {
        let motion = Motion::new(theta, 17.0, -4.25);
        let mut state = TransformState::initialize(0, 0, 9.0, 2.0);
        state.apply(&motion);
        state.apply(&motion.inverse());
        assert_coord(state.current(), 9.0, 2.0);
    }
}

// =============================================================================
// Concrete Scenarios
// =============================================================================

#[test]
fn test_scenario_quarter_turn_and_back() {
    let mut state = TransformState::initialize(1, 0, 1.0, 0.0);

    let first = state.apply(&Motion::from_degrees(90.0, None));
    assert_coord(first, 0.0, -1.0);
    assert_eq!(first.to_string(), "(0.00, -1.00)");
    assert_eq!(
        state.to_string(),
        "Viewer pixel (1,0) displays slide pixel (0.00, -1.00)"
    );

    let second = state.apply(&Motion::from_degrees(-90.0, None));
    assert_coord(second, 1.0, 0.0);
    assert_eq!(second.to_string(), "(1.00, 0.00)");
    assert_eq!(
        state.to_string(),
        "Viewer pixel (1,0) displays slide pixel (1.00, 0.00)"
    );
}

#[test]
fn test_scenario_rotation_with_translation() {
    let mut state = TransformState::initialize(2, 3, 2.0, 3.0);
    let result = state.apply(&Motion::new(45f64.to_radians(), 1.0, -1.0));

    assert!((result.sx - 4.5355).abs() < 1e-4);
    assert!((result.sy - -0.2929).abs() < 1e-4);
}

// =============================================================================
// Composition
// =============================================================================

#[test]
fn test_each_apply_starts_from_previous_result() {
    let motions = [
        Motion::new(0.3, 5.0, 0.0),
        Motion::new(-1.2, 0.0, 2.0),
        Motion::rotation(2.0),
    ];

    let mut state = TransformState::initialize(0, 0, 1.0, 1.0);
    let mut expected = (1.0f64, 1.0f64);
    for motion in &motions {
        let (s, c) = motion.theta.sin_cos();
        let t = motion.translation.unwrap_or_default();
        expected = (
            c * expected.0 + s * expected.1 + t.dx,
            -s * expected.0 + c * expected.1 + t.dy,
        );
        state.apply(motion);
    }

    assert_coord(state.current(), expected.0, expected.1);
}

#[test]
fn test_translated_sequence_is_not_one_combined_motion() {
    let mut folded = TransformState::initialize(0, 0, 10.0, 0.0);
    folded.apply(&Motion::new(PI / 2.0, 3.0, 0.0));
    folded.apply(&Motion::new(PI / 2.0, 3.0, 0.0));

    let mut combined = TransformState::initialize(0, 0, 10.0, 0.0);
    combined.apply(&Motion::new(PI, 6.0, 0.0));

    assert!(!Tolerance::default().matches_coordinate(folded.current(), combined.current()));
}

// =============================================================================
// Pixel Independence
// =============================================================================

#[test]
fn test_batch_independent_of_order_and_parallelism() {
    let viewer = Viewer::with_offset(37, 23, -5.0, 8.0).unwrap();
    let motion = Motion::new(0.77, -3.0, 1.5);

    let mapper = BatchMapper::new();
    let mut sequential = viewer.registrations().to_vec();
    mapper.apply_to_all(&mut sequential, &motion);

    let mut parallel = viewer.registrations().to_vec();
    BatchMapper::with_min_chunk(1).par_apply_to_all(&mut parallel, &motion);

    // Interleave the slice order: odds first, then evens.
    let mut shuffled: Vec<TransformState> = viewer
        .registrations()
        .iter()
        .skip(1)
        .step_by(2)
        .chain(viewer.registrations().iter().step_by(2))
        .copied()
        .collect();
    mapper.apply_to_all(&mut shuffled, &motion);
    shuffled.sort_by_key(|s| (s.viewer_pixel().vy, s.viewer_pixel().vx));

    assert_eq!(sequential, parallel);
    assert_eq!(sequential, shuffled);
}

#[test]
fn test_viewer_apply_matches_single_pixel_apply() {
    let mut viewer = Viewer::new(16, 16).unwrap();
    let mut single = TransformState::new(11, 5);

    for motion in [Motion::rotation(0.5), Motion::new(-0.25, 2.0, 2.0)] {
        viewer.apply(motion);
        single.apply(&motion);
    }

    assert_eq!(viewer.registration(11, 5).copied(), Some(single));
}
