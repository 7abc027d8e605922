use crate::config::Config;
use crate::detector::interface::Detector;
use crate::library::logger::interface::Logger;
use crate::location::LocationLookup;
use crate::playback::core::{init, transition, Effect, Model, Msg, State};
use crate::playback::view::PlaybackView;
use crate::playlist::Playlist;
use crate::risk_oracle::interface::RiskOracle;
use crate::video_source::interface::{VideoSource, VideoStream};
use std::collections::VecDeque;
use std::sync::Arc;

/// Owns everything one playback needs: the playlist, the open stream and the
/// model. Effects run synchronously on the caller's thread.
pub struct PlaybackSession {
    pub config: Config,
    pub logger: Arc<dyn Logger + Send + Sync>,
    playlist: Playlist,
    locations: LocationLookup,
    video_source: Arc<dyn VideoSource + Send + Sync>,
    detector: Arc<dyn Detector + Send + Sync>,
    risk_oracle: Arc<dyn RiskOracle + Send + Sync>,
    model: Model,
    stream: Option<Box<dyn VideoStream>>,
}

impl PlaybackSession {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        playlist: Playlist,
        locations: LocationLookup,
        video_source: Arc<dyn VideoSource + Send + Sync>,
        detector: Arc<dyn Detector + Send + Sync>,
        risk_oracle: Arc<dyn RiskOracle + Send + Sync>,
    ) -> Self {
        let model = init(
            playlist
                .entries()
                .iter()
                .map(|entry| entry.name.clone())
                .collect(),
        );

        Self {
            config,
            logger: logger.with_namespace("playback"),
            playlist,
            locations,
            video_source,
            detector,
            risk_oracle,
            model,
            stream: None,
        }
    }

    pub fn start(&mut self, video_index: usize) {
        self.dispatch(Msg::Start { video_index });
    }

    /// Reads, detects and annotates the next frame, looping at end of stream.
    /// Does nothing unless playing.
    pub fn advance(&mut self) {
        self.dispatch(Msg::Tick);
    }

    pub fn switch(&mut self, delta: isize) {
        self.dispatch(Msg::Switch { delta });
    }

    pub fn video_count(&self) -> usize {
        self.playlist.len()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn view(&self) -> PlaybackView {
        PlaybackView::from_model(&self.model, self.config.view_alert_limit)
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);

        while let Some(msg) = queue.pop_front() {
            if !msg.is_frame_traffic() {
                let _ = self
                    .logger
                    .info(&format!("Processing msg: {}", msg.to_display_string()));
            }

            let previous_state = self.model.state.clone();
            let current = std::mem::replace(&mut self.model, init(Vec::new()));
            let (model, effects) = transition(&self.config, current, msg);
            self.model = model;

            if let State::Failed { message, .. } = &self.model.state {
                if self.model.state != previous_state {
                    let _ = self.logger.warn(message);
                }
            }

            for effect in effects {
                queue.push_back(self.run_effect(effect));
            }
        }
    }

    fn run_effect(&mut self, effect: Effect) -> Msg {
        if !matches!(effect, Effect::ReadFrame { .. } | Effect::DetectFrame { .. }) {
            let _ = self
                .logger
                .info(&format!("Running effect: {}", effect.to_display_string()));
        }

        match effect {
            Effect::OpenVideo { video_index } => {
                self.stream = None;
                let entry = self.playlist.get(video_index);
                let result = match self.video_source.open(&entry.path) {
                    Ok(stream) => {
                        self.stream = Some(stream);
                        Ok(())
                    }
                    Err(e) => Err(e.to_string()),
                };
                Msg::VideoOpened {
                    video_index,
                    result,
                }
            }
            Effect::ResolveLocation { video_index } => {
                let entry = self.playlist.get(video_index);
                Msg::LocationResolved {
                    video_index,
                    coordinate: self.locations.lookup(&entry.name),
                }
            }
            Effect::AssessRisk {
                video_index,
                coordinate,
            } => Msg::RiskAssessed {
                video_index,
                label: self.risk_oracle.assess(coordinate),
            },
            Effect::ReadFrame { video_index } => {
                let result = match self.stream.as_mut() {
                    Some(stream) => stream
                        .read_frame()
                        .map(|frame| frame.map(Arc::new))
                        .map_err(|e| e.to_string()),
                    None => Err("no open stream".to_string()),
                };
                Msg::FrameRead {
                    video_index,
                    result,
                }
            }
            Effect::RewindVideo { video_index } => {
                let result = match self.stream.as_mut() {
                    Some(stream) => stream.rewind().map_err(|e| e.to_string()),
                    None => Err("no open stream".to_string()),
                };
                Msg::Rewound {
                    video_index,
                    result,
                }
            }
            Effect::DetectFrame { video_index, frame } => {
                match self
                    .detector
                    .detect(&frame, self.config.detector.confidence_threshold)
                {
                    Ok(detection) => Msg::FrameDetected {
                        video_index,
                        boxes: detection.boxes,
                        annotated: Arc::new(detection.annotated),
                        at: chrono::Utc::now().with_timezone(&self.config.logger.timezone()),
                    },
                    Err(e) => Msg::DetectionFailed {
                        video_index,
                        frame,
                        message: e.to_string(),
                    },
                }
            }
        }
    }
}
