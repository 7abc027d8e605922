use crate::config::DesktopConfig;
use crate::location::Coordinate;
use crate::map::interface::MapRenderer;
use crate::playback::run::Command;
use crate::playback::view::{PlaybackStatus, PlaybackView};
use crate::presentation::interface::Presenter;
use eframe::egui;
use image::{imageops, RgbImage};
use std::error::Error;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0xFF, 0x52, 0x52);
const LOG_TEXT: egui::Color32 = egui::Color32::from_rgb(0x00, 0xFF, 0x9C);
const LOG_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x1E, 0x1E, 0x1E);

type MapResult = (Coordinate, Result<RgbImage, String>);

fn to_color_image(image: &RgbImage) -> egui::ColorImage {
    egui::ColorImage::from_rgb(
        [image.width() as usize, image.height() as usize],
        image.as_raw(),
    )
}

struct FireWatchWindow {
    view: Arc<Mutex<Option<PlaybackView>>>,
    commands: Sender<Command>,
    map_renderer: Arc<dyn MapRenderer>,
    config: DesktopConfig,
    video_texture: Option<egui::TextureHandle>,
    video_serial: u64,
    map_requested: Option<Coordinate>,
    map_results: Arc<Mutex<Vec<MapResult>>>,
    map_texture: Option<egui::TextureHandle>,
    map_error: Option<String>,
}

impl FireWatchWindow {
    fn send(&self, command: Command) {
        let _ = self.commands.send(command);
    }

    fn refresh_video(&mut self, ctx: &egui::Context, view: &PlaybackView) {
        if view.frame_serial == self.video_serial {
            return;
        }
        self.video_serial = view.frame_serial;

        self.video_texture = view.frame.as_ref().map(|frame| {
            let (width, height) = self.config.frame_size;
            let scaled = imageops::resize(&**frame, width, height, imageops::FilterType::Triangle);
            ctx.load_texture("video", to_color_image(&scaled), egui::TextureOptions::LINEAR)
        });
    }

    /// Renders the map on a helper thread whenever the coordinate changes.
    fn refresh_map(&mut self, ctx: &egui::Context, view: &PlaybackView) {
        if view.coordinate != self.map_requested {
            self.map_requested = view.coordinate;
            self.map_texture = None;
            self.map_error = None;

            if let Some(coordinate) = view.coordinate {
                let renderer = self.map_renderer.clone();
                let results = self.map_results.clone();
                let size = self.config.map_size;
                let ctx = ctx.clone();
                thread::spawn(move || {
                    let rendered = renderer
                        .render(coordinate, size)
                        .map_err(|e| e.to_string());
                    if let Ok(mut results) = results.lock() {
                        results.push((coordinate, rendered));
                    }
                    ctx.request_repaint();
                });
            }
        }

        let finished: Vec<MapResult> = self
            .map_results
            .lock()
            .map(|mut results| results.drain(..).collect())
            .unwrap_or_default();
        // Renders for a previous video may land late.
        let current = finished
            .into_iter()
            .rev()
            .find(|(coordinate, _)| Some(*coordinate) == self.map_requested);
        if let Some((_, rendered)) = current {
            match rendered {
                Ok(image) => {
                    self.map_texture = Some(ctx.load_texture(
                        "map",
                        to_color_image(&image),
                        egui::TextureOptions::LINEAR,
                    ))
                }
                Err(e) => self.map_error = Some(e),
            }
        }
    }

    fn map_panel(&self, ui: &mut egui::Ui, view: &PlaybackView) {
        let (width, height) = self.config.map_size;
        let size = egui::vec2(width as f32, height as f32);

        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Location").strong());
            match (&self.map_texture, &self.map_error, view.coordinate) {
                (Some(texture), _, _) => {
                    ui.image((texture.id(), size));
                }
                (None, Some(error), _) => {
                    ui.allocate_ui(size, |ui| {
                        ui.label(format!("Map unavailable: {}", error));
                    });
                }
                (None, None, Some(_)) => {
                    ui.allocate_ui(size, |ui| {
                        ui.spinner();
                    });
                }
                (None, None, None) => {
                    ui.allocate_space(size);
                }
            }
            if let Some(coordinate) = view.coordinate {
                ui.label(format!("Lat/Lon: {}", coordinate));
            }
        });
    }

    fn video_panel(&self, ui: &mut egui::Ui, view: &PlaybackView) {
        let (width, height) = self.config.frame_size;
        let size = egui::vec2(width as f32, height as f32);

        ui.vertical(|ui| {
            ui.label(egui::RichText::new("Live Feed").strong());
            match (&self.video_texture, &view.error) {
                (_, Some(error)) if view.status == PlaybackStatus::Failed => {
                    ui.allocate_ui(size, |ui| {
                        ui.colored_label(ACCENT, error);
                    });
                }
                (Some(texture), _) => {
                    ui.image((texture.id(), size));
                }
                _ => {
                    ui.allocate_space(size);
                }
            }
            if let Some(notice) = &view.notice {
                ui.colored_label(egui::Color32::YELLOW, notice);
            }
        });
    }

    fn alert_log(&self, ui: &mut egui::Ui, view: &PlaybackView) {
        ui.label(egui::RichText::new(format!("Alert Log ({})", view.alert_count)).strong());
        egui::Frame::none()
            .fill(LOG_BACKGROUND)
            .inner_margin(egui::Margin::same(8.0))
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for alert in &view.alerts {
                            ui.label(
                                egui::RichText::new(format!("[{}] {}", alert.time, alert.message))
                                    .monospace()
                                    .color(LOG_TEXT),
                            );
                        }
                    });
            });
    }
}

impl eframe::App for FireWatchWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let view = self
            .view
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_default();

        self.refresh_video(ctx, &view);
        self.refresh_map(ctx, &view);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(view.title());
            ui.label(
                egui::RichText::new(format!("Fire Risk: {}", view.risk))
                    .color(ACCENT)
                    .size(18.0)
                    .strong(),
            );
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                self.map_panel(ui, &view);
                ui.add_space(16.0);
                self.video_panel(ui, &view);
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("◀ Previous").clicked() {
                    self.send(Command::Prev);
                }
                if ui.button("Next ▶").clicked() {
                    self.send(Command::Next);
                }
                if let Some(index) = view.video_index {
                    ui.label(format!("{}/{}", index + 1, view.video_count));
                }
            });

            ui.add_space(8.0);
            self.alert_log(ui, &view);
        });
    }
}

/// Desktop front end. Playback pushes views into a shared slot that the
/// window reads on every repaint.
#[derive(Clone, Default)]
pub struct PresenterGui {
    view: Arc<Mutex<Option<PlaybackView>>>,
    ctx: Arc<Mutex<Option<egui::Context>>>,
}

impl PresenterGui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the window is closed. Must run on the main thread.
    pub fn run_window(
        &self,
        config: DesktopConfig,
        commands: Sender<Command>,
        map_renderer: Arc<dyn MapRenderer>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window_size.0, config.window_size.1]),
            ..Default::default()
        };

        let window = FireWatchWindow {
            view: self.view.clone(),
            commands,
            map_renderer,
            config,
            video_texture: None,
            video_serial: 0,
            map_requested: None,
            map_results: Arc::new(Mutex::new(Vec::new())),
            map_texture: None,
            map_error: None,
        };

        let ctx_slot = self.ctx.clone();
        eframe::run_native(
            "Forest Fire Watch",
            options,
            Box::new(move |cc| {
                if let Ok(mut slot) = ctx_slot.lock() {
                    *slot = Some(cc.egui_ctx.clone());
                }
                Box::new(window)
            }),
        )
        .map_err(|e| e.to_string())?;

        Ok(())
    }
}

impl Presenter for PresenterGui {
    fn render(&self, view: &PlaybackView) -> Result<(), Box<dyn Error + Send + Sync>> {
        *self.view.lock().map_err(|e| e.to_string())? = Some(view.clone());
        if let Some(ctx) = self.ctx.lock().map_err(|e| e.to_string())?.as_ref() {
            ctx.request_repaint();
        }
        Ok(())
    }
}
