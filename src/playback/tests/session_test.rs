use super::fixture::{Fixture, FRAME_COUNT, RIDGE};
use crate::config::Config;
use crate::detector::impl_fake::DetectorFake;
use crate::playback::core::State;
use crate::playback::view::PlaybackStatus;

#[test]
fn test_start_resolves_location_and_risk_before_first_frame() {
    let mut f = Fixture::new();

    f.session.start(1);

    let view = f.session.view();
    assert_eq!(view.status, PlaybackStatus::Playing);
    assert_eq!(view.video_name.as_deref(), Some("b_ridge.mp4"));
    assert_eq!(view.coordinate, Some(RIDGE));
    assert_eq!(view.risk, "Medium");
    assert_eq!(view.frame_offset, 0);
    assert!(view.frame.is_none());
    assert_eq!(f.risk_oracle.calls(), 1);
}

#[test]
fn test_unknown_video_uses_fallback_coordinate() {
    let mut f = Fixture::new();

    f.session.start(0);

    assert_eq!(f.session.view().coordinate, Some(f.config.locations.fallback));
    assert_eq!(f.risk_oracle.queried(), vec![f.config.locations.fallback]);
}

#[test]
fn test_switching_n_times_returns_to_start() {
    let mut f = Fixture::new();
    f.session.start(2);

    for _ in 0..3 {
        f.session.switch(1);
    }
    assert_eq!(f.session.view().video_index, Some(2));

    for _ in 0..3 {
        f.session.switch(-1);
    }
    assert_eq!(f.session.view().video_index, Some(2));
}

#[test]
fn test_advance_shows_consecutive_frames() {
    let mut f = Fixture::new();
    f.session.start(0);

    f.session.advance();
    assert_eq!(f.shown_frame_index(), Some(0));
    f.session.advance();
    assert_eq!(f.shown_frame_index(), Some(1));
    assert_eq!(f.session.view().frame_offset, 2);
}

#[test]
fn test_read_after_last_frame_loops_to_first() {
    let mut f = Fixture::new();
    f.session.start(0);

    for _ in 0..FRAME_COUNT {
        f.session.advance();
    }
    assert_eq!(f.shown_frame_index(), Some((FRAME_COUNT - 1) as u8));

    f.session.advance();

    assert_eq!(f.shown_frame_index(), Some(0));
    assert_eq!(f.session.view().frame_offset, 1);
    assert_eq!(f.session.view().status, PlaybackStatus::Playing);
}

#[test]
fn test_alerts_follow_detections() {
    let mut f = Fixture::detecting([true, false, true, true, false]);
    f.session.start(0);

    for _ in 0..5 {
        f.session.advance();
    }

    let view = f.session.view();
    assert_eq!(view.alert_count, 3);
    assert!(view
        .alerts
        .iter()
        .all(|alert| alert.message == "Fire detected in a_valley.mp4 (risk: Medium)"));
    assert_eq!(view.detections, 0);
}

#[test]
fn test_each_switch_queries_risk_once_even_when_revisiting() {
    let mut f = Fixture::new();
    f.session.start(0);
    for _ in 0..3 {
        f.session.advance();
    }

    f.session.switch(1);
    assert_eq!(f.session.view().frame_offset, 0);
    f.session.switch(-1);
    f.session.switch(1);

    assert_eq!(f.risk_oracle.calls(), 4);
    assert_eq!(
        f.risk_oracle.queried(),
        vec![
            f.config.locations.fallback,
            RIDGE,
            f.config.locations.fallback,
            RIDGE
        ]
    );
}

#[test]
fn test_advance_does_nothing_before_start() {
    let mut f = Fixture::new();

    f.session.advance();

    assert_eq!(f.session.model().state, State::Idle);
    assert_eq!(f.risk_oracle.calls(), 0);
}

#[test]
fn test_unreadable_video_fails_and_can_be_skipped() {
    let mut f = Fixture::with(
        Config::default(),
        DetectorFake::scripted([]),
        Some("b_ridge.mp4"),
    );
    f.session.start(1);

    let view = f.session.view();
    assert_eq!(view.status, PlaybackStatus::Failed);
    assert!(view.error.unwrap().starts_with("Cannot open b_ridge.mp4"));
    assert_eq!(view.risk, "Medium");
    assert!(f
        .logger
        .lines()
        .iter()
        .any(|line| line.starts_with("WARN playback: Cannot open b_ridge.mp4")));

    f.session.advance();
    assert!(f.shown_frame_index().is_none());

    f.session.switch(1);
    f.session.advance();
    assert_eq!(f.session.view().status, PlaybackStatus::Playing);
    assert_eq!(f.shown_frame_index(), Some(0));
}

#[test]
fn test_view_carries_only_newest_alerts() {
    let mut config = Config::default();
    config.view_alert_limit = 2;
    let mut f = Fixture::with(config, DetectorFake::scripted([true; 5]), None);
    f.session.start(0);

    for _ in 0..5 {
        f.session.advance();
    }

    let view = f.session.view();
    assert_eq!(view.alert_count, 5);
    assert_eq!(view.alerts.len(), 2);
}

#[test]
fn test_frame_traffic_is_not_logged() {
    let mut f = Fixture::new();
    f.session.start(0);
    let before = f.logger.lines().len();

    for _ in 0..3 {
        f.session.advance();
    }

    assert_eq!(f.logger.lines().len(), before);
}
