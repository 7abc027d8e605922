use crate::config::{AlertLogPolicy, Config};
use crate::detector::interface::BoundingBox;
use crate::location::Coordinate;
use crate::playback::alert_log::{AlertEntry, AlertLog};
use crate::risk_oracle::interface::RiskLabel;
use chrono::{DateTime, FixedOffset};
use image::{DynamicImage, RgbImage};
use std::sync::Arc;

pub const PENDING_RISK: &str = "Assessing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    pub video_index: usize,
    /// Frames consumed from the active stream since open or the last rewind.
    pub frame_offset: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Idle,
    Playing { cursor: PlaybackCursor },
    Failed { video_index: usize, message: String },
}

impl State {
    pub fn video_index(&self) -> Option<usize> {
        match self {
            State::Idle => None,
            State::Playing { cursor } => Some(cursor.video_index),
            State::Failed { video_index, .. } => Some(*video_index),
        }
    }
}

#[derive(Clone)]
pub struct Model {
    pub state: State,
    pub video_names: Vec<String>,
    pub coordinate: Option<Coordinate>,
    /// `None` while the risk query for the active video is outstanding.
    pub risk: Option<RiskLabel>,
    pub frame: Option<Arc<RgbImage>>,
    /// Bumped whenever `frame` changes.
    pub frame_serial: u64,
    pub detections: usize,
    pub alert_log: AlertLog,
    pub notice: Option<String>,
}

impl Model {
    pub fn video_name(&self) -> Option<&str> {
        self.state
            .video_index()
            .and_then(|index| self.video_names.get(index))
            .map(String::as_str)
    }

    pub fn risk_text(&self) -> String {
        match self.risk {
            Some(label) => label.to_string(),
            None => PENDING_RISK.to_string(),
        }
    }

    fn set_frame(&mut self, frame: Option<Arc<RgbImage>>) {
        self.frame = frame;
        self.frame_serial += 1;
    }

    fn is_active(&self, video_index: usize) -> bool {
        matches!(self.state, State::Playing { cursor } if cursor.video_index == video_index)
    }

    fn fail(mut self, video_index: usize, message: String) -> Self {
        self.state = State::Failed {
            video_index,
            message,
        };
        self
    }
}

pub enum Msg {
    Start {
        video_index: usize,
    },
    Switch {
        delta: isize,
    },
    Tick,
    VideoOpened {
        video_index: usize,
        result: Result<(), String>,
    },
    LocationResolved {
        video_index: usize,
        coordinate: Coordinate,
    },
    RiskAssessed {
        video_index: usize,
        label: RiskLabel,
    },
    FrameRead {
        video_index: usize,
        result: Result<Option<Arc<DynamicImage>>, String>,
    },
    Rewound {
        video_index: usize,
        result: Result<(), String>,
    },
    FrameDetected {
        video_index: usize,
        boxes: Vec<BoundingBox>,
        annotated: Arc<RgbImage>,
        at: DateTime<FixedOffset>,
    },
    DetectionFailed {
        video_index: usize,
        frame: Arc<DynamicImage>,
        message: String,
    },
}

impl Msg {
    /// Per-frame traffic, too frequent to log.
    pub fn is_frame_traffic(&self) -> bool {
        matches!(
            self,
            Msg::Tick
                | Msg::FrameRead { result: Ok(Some(_)), .. }
                | Msg::FrameDetected { .. }
        )
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Msg::Start { video_index } => format!("Start {{ video_index: {} }}", video_index),
            Msg::Switch { delta } => format!("Switch {{ delta: {} }}", delta),
            Msg::Tick => "Tick".to_string(),
            Msg::VideoOpened {
                video_index,
                result,
            } => format!("VideoOpened {{ video_index: {}, result: {:?} }}", video_index, result),
            Msg::LocationResolved {
                video_index,
                coordinate,
            } => format!(
                "LocationResolved {{ video_index: {}, coordinate: ({}) }}",
                video_index, coordinate
            ),
            Msg::RiskAssessed { video_index, label } => {
                format!("RiskAssessed {{ video_index: {}, label: {} }}", video_index, label)
            }
            Msg::FrameRead {
                video_index,
                result,
            } => {
                let result = match result {
                    Ok(Some(_)) => "Ok(Some(..))".to_string(),
                    Ok(None) => "Ok(None)".to_string(),
                    Err(e) => format!("Err({:?})", e),
                };
                format!("FrameRead {{ video_index: {}, result: {} }}", video_index, result)
            }
            Msg::Rewound {
                video_index,
                result,
            } => format!("Rewound {{ video_index: {}, result: {:?} }}", video_index, result),
            Msg::FrameDetected {
                video_index, boxes, ..
            } => format!(
                "FrameDetected {{ video_index: {}, boxes: {} }}",
                video_index,
                boxes.len()
            ),
            Msg::DetectionFailed {
                video_index,
                message,
                ..
            } => format!(
                "DetectionFailed {{ video_index: {}, message: {:?} }}",
                video_index, message
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    OpenVideo {
        video_index: usize,
    },
    ResolveLocation {
        video_index: usize,
    },
    AssessRisk {
        video_index: usize,
        coordinate: Coordinate,
    },
    ReadFrame {
        video_index: usize,
    },
    RewindVideo {
        video_index: usize,
    },
    DetectFrame {
        video_index: usize,
        frame: Arc<DynamicImage>,
    },
}

impl Effect {
    pub fn to_display_string(&self) -> String {
        match self {
            Effect::DetectFrame { video_index, .. } => {
                format!("DetectFrame {{ video_index: {}, frame: .. }}", video_index)
            }
            effect => format!("{:?}", effect),
        }
    }
}

/// `(current + delta) mod len`, in both directions.
pub fn wrap_index(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}

pub fn init(video_names: Vec<String>) -> Model {
    Model {
        state: State::Idle,
        video_names,
        coordinate: None,
        risk: None,
        frame: None,
        frame_serial: 0,
        detections: 0,
        alert_log: AlertLog::new(),
        notice: None,
    }
}

pub fn transition(config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    match msg {
        Msg::Start { video_index } => start(config, model, video_index),

        Msg::Switch { delta } => {
            let current = model.state.video_index().unwrap_or(0);
            let next = wrap_index(current, delta, model.video_names.len());
            start(config, model, next)
        }

        Msg::Tick => match model.state {
            State::Playing { cursor } => (
                model,
                vec![Effect::ReadFrame {
                    video_index: cursor.video_index,
                }],
            ),
            _ => (model, vec![]),
        },

        Msg::VideoOpened {
            video_index,
            result,
        } if model.is_active(video_index) => match result {
            Ok(()) => (model, vec![]),
            Err(e) => {
                let message = format!("Cannot open {}: {}", video_label(&model, video_index), e);
                (model.fail(video_index, message), vec![])
            }
        },

        Msg::LocationResolved {
            video_index,
            coordinate,
        } if model.state.video_index() == Some(video_index) => {
            let mut model = model;
            model.coordinate = Some(coordinate);
            (
                model,
                vec![Effect::AssessRisk {
                    video_index,
                    coordinate,
                }],
            )
        }

        Msg::RiskAssessed { video_index, label }
            if model.state.video_index() == Some(video_index) =>
        {
            let mut model = model;
            model.risk = Some(label);
            (model, vec![])
        }

        Msg::FrameRead {
            video_index,
            result,
        } if model.is_active(video_index) => {
            let State::Playing { cursor } = model.state else {
                return (model, vec![]);
            };
            match result {
                Ok(Some(frame)) => {
                    let mut model = model;
                    model.state = State::Playing {
                        cursor: PlaybackCursor {
                            frame_offset: cursor.frame_offset + 1,
                            ..cursor
                        },
                    };
                    (model, vec![Effect::DetectFrame { video_index, frame }])
                }
                Ok(None) if cursor.frame_offset > 0 => {
                    let mut model = model;
                    model.state = State::Playing {
                        cursor: PlaybackCursor {
                            frame_offset: 0,
                            ..cursor
                        },
                    };
                    (model, vec![Effect::RewindVideo { video_index }])
                }
                Ok(None) => {
                    let message =
                        format!("{} has no readable frames", video_label(&model, video_index));
                    (model.fail(video_index, message), vec![])
                }
                Err(e) => {
                    let message = format!("Cannot read {}: {}", video_label(&model, video_index), e);
                    (model.fail(video_index, message), vec![])
                }
            }
        }

        Msg::Rewound {
            video_index,
            result,
        } if model.is_active(video_index) => match result {
            Ok(()) => (model, vec![Effect::ReadFrame { video_index }]),
            Err(e) => {
                let message = format!("Cannot rewind {}: {}", video_label(&model, video_index), e);
                (model.fail(video_index, message), vec![])
            }
        },

        Msg::FrameDetected {
            video_index,
            boxes,
            annotated,
            at,
        } if model.is_active(video_index) => {
            let mut model = model;
            if !boxes.is_empty() {
                let message = format!(
                    "Fire detected in {} (risk: {})",
                    video_label(&model, video_index),
                    model.risk_text()
                );
                model.alert_log.push(AlertEntry { at, message });
            }
            model.detections = boxes.len();
            model.notice = None;
            model.set_frame(Some(annotated));
            (model, vec![])
        }

        Msg::DetectionFailed {
            video_index,
            frame,
            message,
        } if model.is_active(video_index) => {
            let mut model = model;
            model.detections = 0;
            model.notice = Some(format!("Detection failed: {}", message));
            model.set_frame(Some(Arc::new(frame.to_rgb8())));
            (model, vec![])
        }

        // Results for a video that is no longer active.
        _ => (model, vec![]),
    }
}

fn start(config: &Config, mut model: Model, video_index: usize) -> (Model, Vec<Effect>) {
    if model.video_names.is_empty() {
        return (model, vec![]);
    }
    let video_index = video_index % model.video_names.len();

    let previous = model.state.video_index();
    if config.alert_log_policy == AlertLogPolicy::PerVideo && previous != Some(video_index) {
        model.alert_log.clear();
    }

    model.state = State::Playing {
        cursor: PlaybackCursor {
            video_index,
            frame_offset: 0,
        },
    };
    model.coordinate = None;
    model.risk = None;
    model.detections = 0;
    model.notice = None;
    model.set_frame(None);

    (
        model,
        vec![
            Effect::OpenVideo { video_index },
            Effect::ResolveLocation { video_index },
        ],
    )
}

fn video_label(model: &Model, video_index: usize) -> String {
    model
        .video_names
        .get(video_index)
        .cloned()
        .unwrap_or_else(|| format!("video #{}", video_index))
}
