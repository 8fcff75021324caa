//! Interval mapping tests

use std::time::Duration;

use stillcam::pacing::PacingPolicy;

#[test]
fn identical_frames_stretch_the_interval() {
    let policy = PacingPolicy::default();
    assert_eq!(policy.interval_for(Some(1.0)), Duration::from_secs(66));
}

#[test]
fn floor_similarity_yields_the_minimum_interval() {
    let policy = PacingPolicy::default();
    assert_eq!(policy.interval_for(Some(0.5)), Duration::from_secs(6));
}

#[test]
fn low_similarity_is_clamped_to_the_floor() {
    let policy = PacingPolicy::default();
    for score in [0.0, 0.2, 0.49] {
        assert_eq!(
            policy.interval_for(Some(score)),
            policy.interval_for(Some(0.5)),
            "score {} should map like 0.5",
            score
        );
    }
}

#[test]
fn unavailable_similarity_uses_the_fallback() {
    let policy = PacingPolicy::default();
    assert_eq!(policy.interval_for(None), Duration::from_secs(10));
}

#[test]
fn mapping_matches_the_floor_formula_above_the_clamp() {
    let policy = PacingPolicy::default();
    for score in [0.5f64, 0.6, 0.75, 0.9, 0.99, 1.0] {
        let expected = (120.0 * (score - 0.45) + 1e-9).floor() as u64;
        assert_eq!(
            policy.interval_for(Some(score)),
            Duration::from_secs(expected)
        );
        assert!(expected >= 6);
    }
}

#[test]
fn intervals_never_go_negative() {
    // Even a policy whose pivot sits above the similarity floor saturates
    // at zero instead of underflowing.
    let policy = PacingPolicy {
        pivot: 0.9,
        ..Default::default()
    };
    assert_eq!(policy.interval_for(Some(0.1)), Duration::from_secs(0));
}
