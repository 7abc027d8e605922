use crate::playback::session::PlaybackSession;
use crate::presentation::interface::Presenter;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prev,
    Next,
    Shutdown,
}

impl PlaybackSession {
    /// Plays from the first video until `Shutdown` arrives or every command
    /// sender is gone. One frame per configured interval.
    pub fn run(&mut self, presenter: &dyn Presenter, commands: &Receiver<Command>) {
        let interval = self.config.frame_interval();

        self.start(0);

        loop {
            let tick_start = Instant::now();

            loop {
                match commands.try_recv() {
                    Ok(Command::Prev) => self.switch(-1),
                    Ok(Command::Next) => self.switch(1),
                    Ok(Command::Shutdown) | Err(TryRecvError::Disconnected) => {
                        let _ = self.logger.info("Playback stopped");
                        return;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            self.advance();

            if let Err(e) = presenter.render(&self.view()) {
                let _ = self.logger.warn(&format!("Render failed: {}", e));
            }

            std::thread::sleep(interval.saturating_sub(tick_start.elapsed()));
        }
    }
}

pub fn spawn(
    mut session: PlaybackSession,
    presenter: Arc<dyn Presenter>,
    commands: Receiver<Command>,
) -> JoinHandle<()> {
    std::thread::spawn(move || session.run(presenter.as_ref(), &commands))
}
