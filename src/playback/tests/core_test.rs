use crate::config::{AlertLogPolicy, Config};
use crate::detector::interface::BoundingBox;
use crate::location::Coordinate;
use crate::playback::core::{
    init, transition, wrap_index, Effect, Model, Msg, PlaybackCursor, State, PENDING_RISK,
};
use crate::risk_oracle::interface::RiskLabel;
use chrono::{DateTime, FixedOffset, TimeZone};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;

fn names() -> Vec<String> {
    vec!["a.mp4".to_string(), "b.mp4".to_string(), "c.mp4".to_string()]
}

fn at() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .unwrap()
}

fn frame() -> Arc<DynamicImage> {
    Arc::new(DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]))))
}

fn fire() -> BoundingBox {
    BoundingBox {
        x_min: 0.0,
        y_min: 0.0,
        x_max: 2.0,
        y_max: 2.0,
        confidence: 0.9,
        class_id: 0,
        label: "fire".to_string(),
    }
}

fn detected(video_index: usize, boxes: Vec<BoundingBox>) -> Msg {
    Msg::FrameDetected {
        video_index,
        boxes,
        annotated: Arc::new(RgbImage::new(4, 4)),
        at: at(),
    }
}

fn playing(config: &Config, video_index: usize) -> Model {
    let (model, _) = transition(config, init(names()), Msg::Start { video_index });
    model
}

fn cursor(model: &Model) -> PlaybackCursor {
    match model.state {
        State::Playing { cursor } => cursor,
        _ => panic!("Unexpected state"),
    }
}

#[test]
fn test_init_is_idle() {
    let model = init(names());

    assert_eq!(model.state, State::Idle);
    assert!(model.alert_log.is_empty());
    assert_eq!(model.risk_text(), PENDING_RISK);
}

#[test]
fn test_start_opens_video_and_resolves_location_once() {
    let config = Config::default();

    let (model, effects) = transition(&config, init(names()), Msg::Start { video_index: 1 });

    assert_eq!(
        model.state,
        State::Playing {
            cursor: PlaybackCursor {
                video_index: 1,
                frame_offset: 0
            }
        }
    );
    assert_eq!(
        effects,
        vec![
            Effect::OpenVideo { video_index: 1 },
            Effect::ResolveLocation { video_index: 1 },
        ]
    );
    assert_eq!(model.video_name(), Some("b.mp4"));
}

#[test]
fn test_resolved_location_triggers_one_risk_query() {
    let config = Config::default();
    let model = playing(&config, 0);
    let coordinate = Coordinate::new(30.1, 79.2);

    let (model, effects) = transition(
        &config,
        model,
        Msg::LocationResolved {
            video_index: 0,
            coordinate,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::AssessRisk {
            video_index: 0,
            coordinate
        }]
    );
    assert_eq!(model.coordinate, Some(coordinate));
    assert_eq!(model.risk_text(), PENDING_RISK);

    let (model, effects) = transition(
        &config,
        model,
        Msg::RiskAssessed {
            video_index: 0,
            label: RiskLabel::High,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(model.risk_text(), "High");
}

#[test]
fn test_wrap_index_both_directions() {
    assert_eq!(wrap_index(2, 1, 3), 0);
    assert_eq!(wrap_index(0, -1, 3), 2);
    assert_eq!(wrap_index(1, 7, 3), 2);
    assert_eq!(wrap_index(1, -7, 3), 0);
    assert_eq!(wrap_index(0, 1, 0), 0);
}

#[test]
fn test_switch_n_times_returns_to_start() {
    let config = Config::default();
    let count = names().len();

    for delta in [1, -1] {
        let mut model = playing(&config, 1);
        for _ in 0..count {
            let (next, effects) = transition(&config, model, Msg::Switch { delta });
            assert_eq!(effects.len(), 2);
            model = next;
        }
        assert_eq!(model.state.video_index(), Some(1));
    }
}

#[test]
fn test_switch_resets_cursor_risk_and_frame() {
    let config = Config::default();
    let model = playing(&config, 0);
    let (model, _) = transition(
        &config,
        model,
        Msg::RiskAssessed {
            video_index: 0,
            label: RiskLabel::Low,
        },
    );
    let (model, _) = transition(
        &config,
        model,
        Msg::FrameRead {
            video_index: 0,
            result: Ok(Some(frame())),
        },
    );
    let (model, _) = transition(&config, model, detected(0, vec![]));
    assert_eq!(cursor(&model).frame_offset, 1);
    assert!(model.frame.is_some());

    let (model, _) = transition(&config, model, Msg::Switch { delta: -1 });

    assert_eq!(
        cursor(&model),
        PlaybackCursor {
            video_index: 2,
            frame_offset: 0
        }
    );
    assert!(model.risk.is_none());
    assert!(model.frame.is_none());
    assert!(model.coordinate.is_none());
}

#[test]
fn test_tick_reads_only_while_playing() {
    let config = Config::default();

    let (_, effects) = transition(&config, init(names()), Msg::Tick);
    assert!(effects.is_empty());

    let (_, effects) = transition(&config, playing(&config, 2), Msg::Tick);
    assert_eq!(effects, vec![Effect::ReadFrame { video_index: 2 }]);
}

#[test]
fn test_frame_read_advances_cursor_and_detects() {
    let config = Config::default();
    let frame = frame();

    let (model, effects) = transition(
        &config,
        playing(&config, 0),
        Msg::FrameRead {
            video_index: 0,
            result: Ok(Some(frame.clone())),
        },
    );

    assert_eq!(cursor(&model).frame_offset, 1);
    assert_eq!(
        effects,
        vec![Effect::DetectFrame {
            video_index: 0,
            frame
        }]
    );
}

#[test]
fn test_end_of_stream_rewinds_and_reads_again() {
    let config = Config::default();
    let (model, _) = transition(
        &config,
        playing(&config, 0),
        Msg::FrameRead {
            video_index: 0,
            result: Ok(Some(frame())),
        },
    );

    let (model, effects) = transition(
        &config,
        model,
        Msg::FrameRead {
            video_index: 0,
            result: Ok(None),
        },
    );
    assert_eq!(cursor(&model).frame_offset, 0);
    assert_eq!(effects, vec![Effect::RewindVideo { video_index: 0 }]);

    let (_, effects) = transition(
        &config,
        model,
        Msg::Rewound {
            video_index: 0,
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::ReadFrame { video_index: 0 }]);
}

#[test]
fn test_stream_without_frames_fails() {
    let config = Config::default();

    let (model, effects) = transition(
        &config,
        playing(&config, 0),
        Msg::FrameRead {
            video_index: 0,
            result: Ok(None),
        },
    );

    assert!(effects.is_empty());
    match model.state {
        State::Failed {
            video_index,
            message,
        } => {
            assert_eq!(video_index, 0);
            assert_eq!(message, "a.mp4 has no readable frames");
        }
        _ => panic!("Unexpected state"),
    }
}

#[test]
fn test_open_failure_fails_and_navigation_recovers() {
    let config = Config::default();

    let (model, _) = transition(
        &config,
        playing(&config, 1),
        Msg::VideoOpened {
            video_index: 1,
            result: Err("corrupt header".to_string()),
        },
    );
    assert!(matches!(
        &model.state,
        State::Failed { video_index: 1, message } if message == "Cannot open b.mp4: corrupt header"
    ));

    let (model, effects) = transition(&config, model, Msg::Tick);
    assert!(effects.is_empty());

    let (model, effects) = transition(&config, model, Msg::Switch { delta: 1 });
    assert_eq!(cursor(&model).video_index, 2);
    assert_eq!(effects[0], Effect::OpenVideo { video_index: 2 });
}

#[test]
fn test_failed_video_still_gets_location_and_risk() {
    let config = Config::default();
    let (model, _) = transition(
        &config,
        playing(&config, 0),
        Msg::VideoOpened {
            video_index: 0,
            result: Err("missing".to_string()),
        },
    );

    let (_, effects) = transition(
        &config,
        model,
        Msg::LocationResolved {
            video_index: 0,
            coordinate: Coordinate::new(1.0, 2.0),
        },
    );

    assert_eq!(effects.len(), 1);
}

#[test]
fn test_alert_appended_only_for_non_empty_boxes() {
    let config = Config::default();
    let (mut model, _) = transition(
        &config,
        playing(&config, 0),
        Msg::RiskAssessed {
            video_index: 0,
            label: RiskLabel::Medium,
        },
    );

    for boxes in [vec![fire()], vec![], vec![fire(), fire()], vec![]] {
        let (next, _) = transition(&config, model, detected(0, boxes));
        model = next;
    }

    let messages: Vec<&str> = model
        .alert_log
        .entries()
        .iter()
        .map(|entry| entry.message.as_str())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Fire detected in a.mp4 (risk: Medium)",
            "Fire detected in a.mp4 (risk: Medium)",
        ]
    );
    assert_eq!(model.alert_log.entries()[0].at, at());
    assert_eq!(model.detections, 0);
}

#[test]
fn test_frame_detected_bumps_frame_serial() {
    let config = Config::default();
    let model = playing(&config, 0);
    let serial = model.frame_serial;

    let (model, _) = transition(&config, model, detected(0, vec![]));

    assert_eq!(model.frame_serial, serial + 1);
    assert!(model.frame.is_some());
}

#[test]
fn test_detection_failure_keeps_playing_with_raw_frame() {
    let config = Config::default();

    let (model, effects) = transition(
        &config,
        playing(&config, 0),
        Msg::DetectionFailed {
            video_index: 0,
            frame: frame(),
            message: "model exploded".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(matches!(model.state, State::Playing { .. }));
    assert_eq!(model.notice.as_deref(), Some("Detection failed: model exploded"));
    assert_eq!(model.frame.as_ref().unwrap().get_pixel(0, 0), &Rgb([1, 2, 3]));
    assert!(model.alert_log.is_empty());
}

#[test]
fn test_results_for_inactive_video_are_ignored() {
    let config = Config::default();
    let model = playing(&config, 2);

    let (model, effects) = transition(&config, model, detected(0, vec![fire()]));
    assert!(effects.is_empty());
    assert!(model.alert_log.is_empty());

    let (model, effects) = transition(
        &config,
        model,
        Msg::LocationResolved {
            video_index: 0,
            coordinate: Coordinate::new(1.0, 2.0),
        },
    );
    assert!(effects.is_empty());
    assert!(model.coordinate.is_none());
}

#[test]
fn test_session_policy_keeps_alerts_across_switches() {
    let config = Config::default();
    let (model, _) = transition(&config, playing(&config, 0), detected(0, vec![fire()]));

    let (model, _) = transition(&config, model, Msg::Switch { delta: 1 });

    assert_eq!(model.alert_log.len(), 1);
}

#[test]
fn test_per_video_policy_clears_alerts_on_change_only() {
    let mut config = Config::default();
    config.alert_log_policy = AlertLogPolicy::PerVideo;
    let (model, _) = transition(&config, playing(&config, 0), detected(0, vec![fire()]));

    let (model, _) = transition(&config, model, Msg::Start { video_index: 0 });
    assert_eq!(model.alert_log.len(), 1);

    let (model, _) = transition(&config, model, Msg::Switch { delta: 1 });
    assert!(model.alert_log.is_empty());
}
