//! End-to-end survey reconstruction on synthetic sessions.
//!
//! Two viewpoints observe the same synthetic excess: a 3x3 pixel blob
//! peaking at grid cell (70, 70) of the difference map, plus an isolated
//! low-count pixel that must not survive clustering.

use muograph_core::{BarHit, DetectorSession, EventRecord, InvalidEventPolicy};
use muograph_recon::{reconstruct_survey, ReconstructionConfig, Viewpoint};

/// An event whose x and y trajectories are set by even step numbers: the
/// upper plane responds at step `s`, the lower at `s - 4`, which lands the
/// image-plane crossing at a pixel controlled by `s`.
fn blob_event(sx: u16, sy: u16) -> EventRecord {
    EventRecord::new(vec![
        BarHit::new(100 + sx - 1, 2.0),
        BarHit::new(200 + sy - 1, 2.0),
        BarHit::new(300 + sx - 5, 2.0),
        BarHit::new(400 + sy - 5, 2.0),
    ])
}

/// A steeper event landing far outside the blob.
fn outlier_event() -> EventRecord {
    EventRecord::new(vec![
        BarHit::new(109, 2.0),
        BarHit::new(215, 2.0),
        BarHit::new(301, 2.0),
        BarHit::new(411, 2.0),
    ])
}

/// Builds the signal session: steps 8/16/24 map to pixels 69/70/71 on each
/// axis for a detector at x = y = -455 cm.
fn signal_session(position: [f64; 2]) -> DetectorSession {
    let mut events = Vec::new();
    let spread = [(8, 69), (16, 70), (24, 71)];
    for &(sx, px) in &spread {
        for &(sy, py) in &spread {
            let count = match (px, py) {
                (70, 70) => 100,
                (70, _) | (_, 70) => 40,
                _ => 35,
            };
            events.extend((0..count).map(|_| blob_event(sx, sy)));
        }
    }
    events.extend((0..3).map(|_| outlier_event()));
    events.push(EventRecord::default()); // truncated trailing record
    DetectorSession::new(events, position, 25.0)
}

fn background_session(position: [f64; 2]) -> DetectorSession {
    DetectorSession::new(vec![EventRecord::default()], position, 25.0)
}

fn viewpoint(position: [f64; 2]) -> Viewpoint {
    Viewpoint::new(signal_session(position), background_session(position))
}

#[test]
fn test_survey_reconstruction_end_to_end() {
    let config = ReconstructionConfig::default();
    let survey = reconstruct_survey(
        &[viewpoint([-455.0, -455.0]), viewpoint([-452.0, -452.0])],
        &config,
    )
    .unwrap();

    // Viewpoint 0: the difference map carries the raw peak.
    let first = &survey.viewpoints[0];
    assert_eq!(first.difference.max(), 100);
    let (peak, _) = first
        .difference
        .data()
        .indexed_iter()
        .max_by_key(|&(_, &v)| v)
        .unwrap();
    assert_eq!(peak, (70, 70));

    // Clustering claims exactly the 3x3 blob; the outlier pixel is dropped.
    assert_eq!(first.clusters.regions.len(), 1);
    assert_eq!(first.clusters.claimed_pixels(), 9);
    assert!(first.clusters.claimed.contains(&(70, 70)));
    assert!(!first.clusters.claimed.contains(&(100, 70)));

    // Selection keeps every blob event and nothing else.
    assert_eq!(first.trajectories.len(), 400);

    // Volume projection succeeds for all selected trajectories.
    assert_eq!(first.projection.degenerate_events, 0);
    assert!(first.projection.volume.max() > 0);

    // Both viewpoints see the same object: one group containing both.
    assert_eq!(survey.edges.len(), 2);
    assert_eq!(survey.groups.len(), 1);
    assert_eq!(survey.groups[0].members, vec![0, 1]);
    assert_eq!(survey.groups[0].target.len(), 30);
    assert!(survey.groups[0].composite.max() > 0.0);
}

#[test]
fn test_difference_map_subtracts_background() {
    // Background shares the blob's weak shoulder; only the excess remains.
    let position = [-455.0, -455.0];
    let mut background_events = vec![blob_event(8, 16); 25];
    background_events.push(EventRecord::default());
    let viewpoint = Viewpoint::new(
        signal_session(position),
        DetectorSession::new(background_events, position, 25.0),
    );

    let config = ReconstructionConfig::default();
    let survey = reconstruct_survey(&[viewpoint], &config).unwrap();
    let diff = &survey.viewpoints[0].difference;
    assert_eq!(diff.data()[[69, 70]], 15); // 40 signal - 25 background
    assert_eq!(diff.data()[[70, 70]], 100);
}

#[test]
fn test_mismatched_viewpoint_sessions_rejected() {
    let vp = Viewpoint::new(
        signal_session([-455.0, -455.0]),
        background_session([0.0, 0.0]),
    );
    let config = ReconstructionConfig::default();
    assert!(reconstruct_survey(&[vp], &config).is_err());
}

#[test]
fn test_abort_policy_rejects_session_with_invalid_event() {
    let position = [-455.0, -455.0];
    let mut events = vec![blob_event(16, 16); 10];
    events.push(EventRecord::new(vec![BarHit::new(107, 2.0)])); // one plane only
    events.push(EventRecord::default());
    let vp = Viewpoint::new(
        DetectorSession::new(events, position, 25.0),
        background_session(position),
    );

    let abort = ReconstructionConfig::default();
    assert!(reconstruct_survey(&[vp.clone()], &abort).is_err());

    let skip =
        ReconstructionConfig::new().with_invalid_event_policy(InvalidEventPolicy::Skip);
    let survey = reconstruct_survey(&[vp], &skip).unwrap();
    assert_eq!(survey.viewpoints[0].difference.data().sum(), 10);
}
