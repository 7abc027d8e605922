use crate::config::{
    Config, DetectorBackend, LoggerBackend, MapBackend, RiskBackend, VideoBackend,
};
use crate::detector::impl_fake::DetectorFake;
use crate::detector::impl_tract_onnx::DetectorTractOnnx;
use crate::detector::interface::Detector;
use crate::library::logger::impl_console::LoggerConsole;
use crate::library::logger::impl_tracing::LoggerTracing;
use crate::library::logger::interface::Logger;
use crate::location::LocationLookup;
use crate::map::impl_fake::MapRendererFake;
use crate::map::impl_osm::MapRendererOsm;
use crate::map::interface::MapRenderer;
use crate::playback::run::{spawn, Command};
use crate::playback::session::PlaybackSession;
use crate::playlist::Playlist;
use crate::presentation::impl_console::PresenterConsole;
use crate::presentation::impl_gui::PresenterGui;
use crate::presentation::impl_web::PresenterWeb;
use crate::risk_oracle::impl_earth_engine::RiskOracleEarthEngine;
use crate::risk_oracle::impl_fake::RiskOracleFake;
use crate::risk_oracle::interface::RiskOracle;
use crate::video_source::impl_fake::VideoSourceFake;
use crate::video_source::interface::VideoSource;
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Plays a folder of videos through a fire detector and shows the fire risk
/// of each video's location.
#[derive(Debug, Parser)]
#[command(name = "forest-fire-watch", version)]
pub struct Cli {
    /// TOML configuration file. Defaults to `config/default.toml` when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub front_end: Option<FrontEnd>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum FrontEnd {
    /// Native window (default)
    Desktop,
    /// Browser dashboard served over HTTP
    Dashboard,
    /// No UI; progress and alerts go to the log
    Headless,
}

pub struct App {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let logger: Arc<dyn Logger + Send + Sync> = match config.logger.backend {
            LoggerBackend::Tracing => {
                LoggerTracing::install_subscriber(&config.logger.filter);
                Arc::new(LoggerTracing::new())
            }
            LoggerBackend::Console => Arc::new(LoggerConsole::new(config.logger.timezone())),
        };

        Self::with_logger(config, logger)
    }

    pub fn with_logger(config: Config, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self { config, logger }
    }

    pub fn start(&self, front_end: FrontEnd) -> anyhow::Result<()> {
        let session = self.session()?;

        let _ = self.logger.info(&format!(
            "Starting {:?} front end with {} videos",
            front_end,
            session.video_count()
        ));

        match front_end {
            FrontEnd::Desktop => self.run_desktop(session),
            FrontEnd::Dashboard => self.run_dashboard(session),
            FrontEnd::Headless => self.run_headless(session),
        }
    }

    fn run_desktop(&self, session: PlaybackSession) -> anyhow::Result<()> {
        let (sender, receiver) = channel();
        let presenter = PresenterGui::new();
        let playback = spawn(session, Arc::new(presenter.clone()), receiver);

        let result = self.map_renderer().and_then(|map_renderer| {
            presenter
                .run_window(self.config.desktop.clone(), sender.clone(), map_renderer)
                .map_err(|e| anyhow!(e))
        });

        stop(playback, &sender)?;
        result
    }

    fn run_dashboard(&self, session: PlaybackSession) -> anyhow::Result<()> {
        let (sender, receiver) = channel();
        let presenter = PresenterWeb::new();
        let playback = spawn(session, Arc::new(presenter.clone()), receiver);

        let result = presenter
            .serve(
                self.config.dashboard.clone(),
                sender.clone(),
                self.logger.clone(),
            )
            .map_err(|e| anyhow!(e));

        stop(playback, &sender)?;
        result
    }

    fn run_headless(&self, mut session: PlaybackSession) -> anyhow::Result<()> {
        // Held so the runner never sees a disconnected channel.
        let (_sender, receiver) = channel::<Command>();
        let presenter = PresenterConsole::new(self.logger.clone());

        session.run(&presenter, &receiver);
        Ok(())
    }

    fn session(&self) -> anyhow::Result<PlaybackSession> {
        let playlist = match Playlist::scan(
            &self.config.video.directory,
            &self.config.video.extensions,
        ) {
            Ok(playlist) => playlist,
            Err(e) => {
                let _ = self.logger.error(&format!("Cannot start playback: {}", e));
                return Err(e.into());
            }
        };

        Ok(PlaybackSession::new(
            self.config.clone(),
            self.logger.clone(),
            playlist,
            LocationLookup::from_config(&self.config.locations),
            self.video_source()?,
            self.detector()?,
            self.risk_oracle()?,
        ))
    }

    fn video_source(&self) -> anyhow::Result<Arc<dyn VideoSource + Send + Sync>> {
        match self.config.video.backend {
            VideoBackend::Opencv => opencv_video_source(),
            VideoBackend::Synthetic => {
                let _ = self.logger.warn(
                    "Synthetic video backend: video files are not decoded, frames are generated; \
                     build with --features opencv and set video.backend = \"opencv\" to play them",
                );
                let (width, height) = self.config.video.synthetic_frame_size;
                Ok(Arc::new(VideoSourceFake::new(
                    self.config.video.synthetic_frame_count,
                    width,
                    height,
                )))
            }
        }
    }

    fn detector(&self) -> anyhow::Result<Arc<dyn Detector + Send + Sync>> {
        match self.config.detector.backend {
            DetectorBackend::Tract => {
                let detector = DetectorTractOnnx::new(self.config.detector.clone())
                    .map_err(|e| anyhow!(e))
                    .with_context(|| {
                        format!(
                            "failed to load detector model {}",
                            self.config.detector.model.onnx_model_path
                        )
                    })?;
                Ok(Arc::new(detector))
            }
            DetectorBackend::Fake => Ok(Arc::new(DetectorFake::random(
                self.config.detector.fake_detection_probability,
            ))),
        }
    }

    fn risk_oracle(&self) -> anyhow::Result<Arc<dyn RiskOracle + Send + Sync>> {
        match self.config.risk.backend {
            RiskBackend::EarthEngine => Ok(Arc::new(RiskOracleEarthEngine::new(
                self.config.risk.clone(),
                self.logger.clone(),
            )?)),
            RiskBackend::Fake => Ok(Arc::new(RiskOracleFake::new(
                self.config.risk.fake_vegetation_index,
                self.config.risk.thresholds,
            ))),
        }
    }

    fn map_renderer(&self) -> anyhow::Result<Arc<dyn MapRenderer>> {
        match self.config.map.backend {
            MapBackend::Osm => Ok(Arc::new(MapRendererOsm::new(
                self.config.map.clone(),
                self.logger.clone(),
            )?)),
            MapBackend::Fake => Ok(Arc::new(MapRendererFake::new())),
        }
    }
}

fn stop(playback: JoinHandle<()>, sender: &Sender<Command>) -> anyhow::Result<()> {
    let _ = sender.send(Command::Shutdown);
    playback
        .join()
        .map_err(|_| anyhow!("playback thread panicked"))
}

#[cfg(feature = "opencv")]
fn opencv_video_source() -> anyhow::Result<Arc<dyn VideoSource + Send + Sync>> {
    Ok(Arc::new(
        crate::video_source::impl_opencv::VideoSourceOpenCv::new(),
    ))
}

#[cfg(not(feature = "opencv"))]
fn opencv_video_source() -> anyhow::Result<Arc<dyn VideoSource + Send + Sync>> {
    anyhow::bail!(
        "video.backend is \"opencv\" but this build lacks the `opencv` feature; \
         rebuild with `--features opencv` or set video.backend = \"synthetic\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_front_end_defaults_to_none() {
        let cli = Cli::parse_from(["forest-fire-watch"]);

        assert!(cli.front_end.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parses_config_and_front_end() {
        let cli = Cli::parse_from(["forest-fire-watch", "--config", "fire.toml", "headless"]);

        assert_eq!(cli.config, Some(PathBuf::from("fire.toml")));
        assert_eq!(cli.front_end, Some(FrontEnd::Headless));
    }

    #[test]
    fn test_missing_video_directory_refuses_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.logger.backend = LoggerBackend::Console;
        config.video.directory = dir.path().join("missing");

        let app = App::new(config);

        assert!(app.start(FrontEnd::Headless).is_err());
    }

    #[test]
    fn test_synthetic_video_backend_warns_that_files_are_not_decoded() {
        let logger = LoggerFake::new();
        let mut config = Config::default();
        config.video.backend = VideoBackend::Synthetic;
        let app = App::with_logger(config, Arc::new(logger.clone()));

        assert!(app.video_source().is_ok());

        assert!(logger
            .lines()
            .iter()
            .any(|line| line.starts_with("WARN") && line.contains("video files are not decoded")));
    }
}
