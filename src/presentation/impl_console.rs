use crate::library::logger::interface::Logger;
use crate::playback::view::{PlaybackStatus, PlaybackView};
use crate::presentation::interface::Presenter;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Seen {
    video_index: Option<usize>,
    risk: String,
    error: Option<String>,
    notice: Option<String>,
    alert_count: usize,
}

/// Headless front end: reports switches, risk labels, failures and new
/// alerts through the logger instead of drawing anything.
pub struct PresenterConsole {
    logger: Arc<dyn Logger + Send + Sync>,
    seen: Mutex<Seen>,
}

impl PresenterConsole {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("console"),
            seen: Mutex::new(Seen::default()),
        }
    }
}

impl Presenter for PresenterConsole {
    fn render(&self, view: &PlaybackView) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut seen = self.seen.lock().map_err(|e| e.to_string())?;

        if view.video_index != seen.video_index {
            let name = view.video_name.as_deref().unwrap_or("-");
            let position = view.video_index.map(|i| i + 1).unwrap_or(0);
            self.logger.info(&format!(
                "Now playing {} ({}/{})",
                name, position, view.video_count
            ))?;
            seen.video_index = view.video_index;
            seen.risk.clear();
        }

        if view.risk != seen.risk {
            let at = view
                .coordinate
                .map(|c| format!(" at {}", c))
                .unwrap_or_default();
            self.logger.info(&format!("Fire risk{}: {}", at, view.risk))?;
            seen.risk = view.risk.clone();
        }

        if view.status == PlaybackStatus::Failed && view.error != seen.error {
            if let Some(error) = &view.error {
                self.logger.error(error)?;
            }
        }
        seen.error = view.error.clone();

        if view.notice != seen.notice {
            if let Some(notice) = &view.notice {
                self.logger.warn(notice)?;
            }
            seen.notice = view.notice.clone();
        }

        // The view only carries the newest alerts; print the ones not seen yet.
        if view.alert_count < seen.alert_count {
            seen.alert_count = 0;
        }
        let fresh = view.alert_count - seen.alert_count;
        let skip = view.alerts.len().saturating_sub(fresh);
        for alert in view.alerts.iter().skip(skip) {
            self.logger
                .warn(&format!("[{}] {}", alert.time, alert.message))?;
        }
        seen.alert_count = view.alert_count;

        Ok(())
    }
}
