use crate::location::Coordinate;
use chrono::Offset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoBackend {
    Opencv,
    Synthetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorBackend {
    Tract,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBackend {
    EarthEngine,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapBackend {
    Osm,
    Fake,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerBackend {
    Console,
    Tracing,
}

/// Whether the alert log survives a switch to a different video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLogPolicy {
    #[default]
    Session,
    PerVideo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub directory: PathBuf,
    pub extensions: Vec<String>,
    pub backend: VideoBackend,
    pub synthetic_frame_count: u64,
    pub synthetic_frame_size: (u32, u32),
    pub frame_interval_ms: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("videos"),
            extensions: vec!["mp4".to_string()],
            backend: if cfg!(feature = "opencv") {
                VideoBackend::Opencv
            } else {
                VideoBackend::Synthetic
            },
            synthetic_frame_count: 90,
            synthetic_frame_size: (640, 360),
            frame_interval_ms: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub onnx_model_path: String,
    /// (height, width)
    pub input_shape: (u32, u32),
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            onnx_model_path: "models/fire.onnx".to_string(),
            input_shape: (640, 640),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub backend: DetectorBackend,
    pub model: ModelConfig,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub class_names: Vec<String>,
    pub fake_detection_probability: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::Tract,
            model: ModelConfig::default(),
            confidence_threshold: 0.4,
            iou_threshold: 0.45,
            max_detections: 100,
            class_names: vec!["fire".to_string()],
            fake_detection_probability: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub high_below: f64,
    pub medium_below: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high_below: 0.3,
            medium_below: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub backend: RiskBackend,
    pub endpoint: String,
    pub project: String,
    pub access_token: Option<String>,
    pub collection: String,
    pub start_date: String,
    pub end_date: String,
    pub nir_band: String,
    pub red_band: String,
    pub cloud_property: String,
    pub scale_m: f64,
    pub max_pixels: f64,
    pub timeout_secs: u64,
    pub thresholds: RiskThresholds,
    pub fake_vegetation_index: Option<f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            backend: RiskBackend::EarthEngine,
            endpoint: "https://earthengine.googleapis.com".to_string(),
            project: String::new(),
            access_token: None,
            collection: "COPERNICUS/S2_SR_HARMONIZED".to_string(),
            start_date: "2024-01-01".to_string(),
            end_date: "2025-01-01".to_string(),
            nir_band: "B8".to_string(),
            red_band: "B4".to_string(),
            cloud_property: "CLOUDY_PIXEL_PERCENTAGE".to_string(),
            scale_m: 10.0,
            max_pixels: 1e9,
            timeout_secs: 20,
            thresholds: RiskThresholds::default(),
            fake_vegetation_index: Some(0.42),
        }
    }
}

impl RiskConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLocation {
    pub video: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Kept as a list because the `config` crate lowercases table keys, and
/// video file names are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub fallback: Coordinate,
    pub videos: Vec<VideoLocation>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback: Coordinate::new(30.1, 79.2),
            videos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub backend: MapBackend,
    pub zoom: u8,
    pub tile_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            backend: MapBackend::Osm,
            zoom: 6,
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            user_agent: concat!("forest-fire-watch/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub window_size: (f32, f32),
    pub frame_size: (u32, u32),
    pub map_size: (u32, u32),
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            window_size: (1200.0, 800.0),
            frame_size: (520, 340),
            map_size: (520, 340),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub bind_addr: String,
    pub poll_interval_ms: u64,
    pub jpeg_quality: u8,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            poll_interval_ms: 100,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub backend: LoggerBackend,
    pub utc_offset_minutes: i32,
    pub filter: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            backend: LoggerBackend::Tracing,
            utc_offset_minutes: 0,
            filter: "forest_fire_watch=info".to_string(),
        }
    }
}

impl LoggerConfig {
    pub fn timezone(&self) -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or(chrono::Utc.fix())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub video: VideoConfig,
    pub detector: DetectorConfig,
    pub risk: RiskConfig,
    pub locations: LocationConfig,
    pub alert_log_policy: AlertLogPolicy,
    /// Most recent alerts handed to presenters; the log itself is unbounded.
    pub view_alert_limit: usize,
    pub map: MapConfig,
    pub desktop: DesktopConfig,
    pub dashboard: DashboardConfig,
    pub logger: LoggerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConfig::default(),
            detector: DetectorConfig::default(),
            risk: RiskConfig::default(),
            locations: LocationConfig::default(),
            alert_log_policy: AlertLogPolicy::default(),
            view_alert_limit: 200,
            map: MapConfig::default(),
            desktop: DesktopConfig::default(),
            dashboard: DashboardConfig::default(),
            logger: LoggerConfig::default(),
        }
    }
}

impl Config {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.video.frame_interval_ms)
    }

    /// Layers the optional file (or `config/default.toml` when present) and
    /// `FIRE_WATCH__SECTION__KEY` environment variables over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();
        settings = match path {
            Some(p) => settings.add_source(config::File::from(p)),
            None => settings.add_source(config::File::with_name("config/default").required(false)),
        };
        settings = settings.add_source(
            config::Environment::with_prefix("FIRE_WATCH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        let settings = settings.build()?;
        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_behaviour() {
        let config = Config::default();

        assert_eq!(config.detector.confidence_threshold, 0.4);
        assert_eq!(config.risk.thresholds.high_below, 0.3);
        assert_eq!(config.risk.thresholds.medium_below, 0.5);
        assert_eq!(config.locations.fallback, Coordinate::new(30.1, 79.2));
        assert_eq!(config.video.extensions, vec!["mp4".to_string()]);
        assert_eq!(config.frame_interval(), Duration::from_millis(30));
        assert_eq!(config.alert_log_policy, AlertLogPolicy::Session);
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
alert_log_policy = "per_video"

[video]
directory = "clips"

[[locations.videos]]
video = "Ridge_North.mp4"
latitude = 31.25
longitude = 78.5
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.video.directory, PathBuf::from("clips"));
        assert_eq!(config.video.frame_interval_ms, 30);
        assert_eq!(config.alert_log_policy, AlertLogPolicy::PerVideo);
        assert_eq!(
            config.locations.videos,
            vec![VideoLocation {
                video: "Ridge_North.mp4".to_string(),
                latitude: 31.25,
                longitude: 78.5,
            }]
        );
        assert_eq!(config.locations.fallback, Coordinate::new(30.1, 79.2));
        assert_eq!(config.detector, DetectorConfig::default());
    }

    #[test]
    fn test_logger_timezone_from_offset() {
        let config = LoggerConfig {
            utc_offset_minutes: 330,
            ..LoggerConfig::default()
        };

        assert_eq!(config.timezone().local_minus_utc(), 330 * 60);
    }
}
