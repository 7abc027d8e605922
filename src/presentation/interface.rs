use crate::playback::view::PlaybackView;
use std::error::Error;

/// Receives a snapshot after every playback step. Called from the playback
/// thread, so implementations hand the view off rather than block on it.
pub trait Presenter: Send + Sync {
    fn render(&self, view: &PlaybackView) -> Result<(), Box<dyn Error + Send + Sync>>;
}
