use crate::config::DashboardConfig;
use crate::library::logger::interface::Logger;
use crate::playback::run::Command;
use crate::playback::view::PlaybackView;
use crate::presentation::interface::Presenter;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::error::Error;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

const INDEX_HTML: &str = include_str!("dashboard.html");

type JpegCache = Option<(u64, Arc<Vec<u8>>)>;

#[derive(Clone)]
struct DashboardState {
    view: Arc<Mutex<Option<PlaybackView>>>,
    jpeg: Arc<Mutex<JpegCache>>,
    commands: Arc<Mutex<Sender<Command>>>,
    config: DashboardConfig,
}

impl DashboardState {
    fn current_view(&self) -> PlaybackView {
        self.view
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_default()
    }

    fn send(&self, command: Command) -> StatusCode {
        match self.commands.lock() {
            Ok(commands) if commands.send(command).is_ok() => StatusCode::ACCEPTED,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Encodes each frame once, however many clients poll it.
    fn frame_jpeg(&self, view: &PlaybackView) -> Result<Option<Arc<Vec<u8>>>, image::ImageError> {
        let Some(frame) = &view.frame else {
            return Ok(None);
        };

        let mut cache = match self.jpeg.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((serial, bytes)) = cache.as_ref() {
            if *serial == view.frame_serial {
                return Ok(Some(bytes.clone()));
            }
        }

        let bytes = Arc::new(encode_jpeg(frame, self.config.jpeg_quality)?);
        *cache = Some((view.frame_serial, bytes.clone()));
        Ok(Some(bytes))
    }
}

pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(buffer)
}

async fn index_handler(State(state): State<DashboardState>) -> Html<String> {
    Html(INDEX_HTML.replace("__POLL_MS__", &state.config.poll_interval_ms.to_string()))
}

async fn state_handler(State(state): State<DashboardState>) -> Json<PlaybackView> {
    Json(state.current_view())
}

async fn frame_handler(State(state): State<DashboardState>) -> Response {
    let view = state.current_view();
    match state.frame_jpeg(&view) {
        Ok(Some(bytes)) => (
            [
                (header::CONTENT_TYPE, "image/jpeg"),
                (header::CACHE_CONTROL, "no-store"),
            ],
            bytes.to_vec(),
        )
            .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode frame: {}", e),
        )
            .into_response(),
    }
}

async fn prev_handler(State(state): State<DashboardState>) -> StatusCode {
    state.send(Command::Prev)
}

async fn next_handler(State(state): State<DashboardState>) -> StatusCode {
    state.send(Command::Next)
}

fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/state", get(state_handler))
        .route("/api/frame.jpg", get(frame_handler))
        .route("/api/prev", post(prev_handler))
        .route("/api/next", post(next_handler))
        .with_state(state)
}

/// Browser front end. Playback pushes views into a shared slot; HTTP
/// handlers read it and forward navigation as commands.
#[derive(Clone, Default)]
pub struct PresenterWeb {
    view: Arc<Mutex<Option<PlaybackView>>>,
}

impl PresenterWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves the dashboard until Ctrl-C. Blocks the calling thread.
    pub fn serve(
        &self,
        config: DashboardConfig,
        commands: Sender<Command>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let logger = logger.with_namespace("dashboard");
        let state = DashboardState {
            view: self.view.clone(),
            jpeg: Arc::new(Mutex::new(None)),
            commands: Arc::new(Mutex::new(commands)),
            config: config.clone(),
        };

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
            logger.info(&format!(
                "Dashboard listening on http://{}",
                listener.local_addr()?
            ))?;

            axum::serve(listener, router(state))
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;

            logger.info("Dashboard stopped")?;
            Ok::<(), Box<dyn Error + Send + Sync>>(())
        })
    }
}

impl Presenter for PresenterWeb {
    fn render(&self, view: &PlaybackView) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.view.lock().map_err(|e| e.to_string())? = Some(view.clone());
        Ok(())
    }
}
