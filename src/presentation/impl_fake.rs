use crate::playback::run::Command;
use crate::playback::view::PlaybackView;
use crate::presentation::interface::Presenter;
use std::error::Error;
use std::sync::mpsc::Sender;
use std::sync::Mutex;

/// Records every view. Optionally asks the runner to stop after a number of
/// renders.
pub struct PresenterFake {
    views: Mutex<Vec<PlaybackView>>,
    shutdown: Option<(usize, Mutex<Sender<Command>>)>,
}

impl PresenterFake {
    pub fn new() -> Self {
        Self {
            views: Mutex::new(Vec::new()),
            shutdown: None,
        }
    }

    pub fn stopping_after(renders: usize, commands: Sender<Command>) -> Self {
        Self {
            views: Mutex::new(Vec::new()),
            shutdown: Some((renders, Mutex::new(commands))),
        }
    }

    pub fn views(&self) -> Vec<PlaybackView> {
        self.views.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Presenter for PresenterFake {
    fn render(&self, view: &PlaybackView) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut views = self.views.lock().map_err(|e| e.to_string())?;
        views.push(view.clone());

        if let Some((renders, commands)) = &self.shutdown {
            if views.len() >= *renders {
                let commands = commands.lock().map_err(|e| e.to_string())?;
                commands.send(Command::Shutdown)?;
            }
        }
        Ok(())
    }
}
