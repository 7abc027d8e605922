use crate::location::Coordinate;
use crate::playback::core::{Model, State};
use image::RgbImage;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRow {
    pub time: String,
    pub message: String,
}

/// Immutable snapshot handed to presenters after every step.
#[derive(Clone, Serialize)]
pub struct PlaybackView {
    pub status: PlaybackStatus,
    pub video_index: Option<usize>,
    pub video_count: usize,
    pub video_name: Option<String>,
    pub frame_offset: u64,
    pub coordinate: Option<Coordinate>,
    pub risk: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub detections: usize,
    /// Newest alerts, oldest first.
    pub alerts: Vec<AlertRow>,
    pub alert_count: usize,
    pub frame_serial: u64,
    #[serde(skip)]
    pub frame: Option<Arc<RgbImage>>,
}

impl PlaybackView {
    pub fn from_model(model: &Model, alert_limit: usize) -> Self {
        let (status, frame_offset, error) = match &model.state {
            State::Idle => (PlaybackStatus::Idle, 0, None),
            State::Playing { cursor } => (PlaybackStatus::Playing, cursor.frame_offset, None),
            State::Failed { message, .. } => (PlaybackStatus::Failed, 0, Some(message.clone())),
        };

        Self {
            status,
            video_index: model.state.video_index(),
            video_count: model.video_names.len(),
            video_name: model.video_name().map(str::to_string),
            frame_offset,
            coordinate: model.coordinate,
            risk: model.risk_text(),
            error,
            notice: model.notice.clone(),
            detections: model.detections,
            alerts: model
                .alert_log
                .recent(alert_limit)
                .iter()
                .map(|entry| AlertRow {
                    time: entry.time_label(),
                    message: entry.message.clone(),
                })
                .collect(),
            alert_count: model.alert_log.len(),
            frame_serial: model.frame_serial,
            frame: model.frame.clone(),
        }
    }

    pub fn title(&self) -> String {
        match &self.video_name {
            Some(name) => format!("Forest Fire Watch - {}", name),
            None => "Forest Fire Watch".to_string(),
        }
    }
}

impl Default for PlaybackView {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            video_index: None,
            video_count: 0,
            video_name: None,
            frame_offset: 0,
            coordinate: None,
            risk: crate::playback::core::PENDING_RISK.to_string(),
            error: None,
            notice: None,
            detections: 0,
            alerts: Vec::new(),
            alert_count: 0,
            frame_serial: 0,
            frame: None,
        }
    }
}
