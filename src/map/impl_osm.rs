use crate::config::MapConfig;
use crate::library::logger::interface::Logger;
use crate::location::Coordinate;
use crate::map::interface::MapRenderer;
use crate::map::marker::draw_marker;
use crate::map::tiles::{tile_window, TileId};
use image::{imageops, Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BACKGROUND: Rgb<u8> = Rgb([224, 224, 224]);

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("tile request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tile server answered {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("cannot decode tile: {0}")]
    Decode(#[from] image::ImageError),
    #[error("no map tile could be fetched")]
    NoTiles,
}

/// Composes OpenStreetMap raster tiles around the coordinate. Tiles are kept
/// for the lifetime of the renderer.
pub struct MapRendererOsm {
    client: reqwest::blocking::Client,
    config: MapConfig,
    cache: Mutex<HashMap<TileId, Arc<RgbImage>>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl MapRendererOsm {
    pub fn new(config: MapConfig, logger: Arc<dyn Logger + Send + Sync>) -> Result<Self, MapError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
            logger: logger.with_namespace("map"),
        })
    }

    fn tile(&self, id: TileId) -> Result<Arc<RgbImage>, MapError> {
        if let Some(tile) = self.cache.lock().ok().and_then(|c| c.get(&id).cloned()) {
            return Ok(tile);
        }

        let url = id.url(&self.config.tile_url);
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Status { url, status });
        }
        let bytes = response.bytes()?;
        let tile = Arc::new(image::load_from_memory(&bytes)?.to_rgb8());

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(id, tile.clone());
        }
        Ok(tile)
    }
}

impl MapRenderer for MapRendererOsm {
    fn render(
        &self,
        coordinate: Coordinate,
        size: (u32, u32),
    ) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        let window = tile_window(coordinate, self.config.zoom, size);
        let mut canvas = RgbImage::from_pixel(size.0, size.1, BACKGROUND);

        let mut drawn = 0;
        for placed in &window.tiles {
            match self.tile(placed.id) {
                Ok(tile) => {
                    imageops::replace(&mut canvas, &*tile, placed.offset.0, placed.offset.1);
                    drawn += 1;
                }
                Err(e) => {
                    let _ = self
                        .logger
                        .warn(&format!("Tile {:?} unavailable: {}", placed.id, e));
                }
            }
        }
        if drawn == 0 && !window.tiles.is_empty() {
            return Err(Box::new(MapError::NoTiles));
        }

        draw_marker(&mut canvas, window.marker);
        Ok(canvas)
    }
}
