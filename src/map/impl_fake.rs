use crate::location::Coordinate;
use crate::map::interface::MapRenderer;
use crate::map::marker::draw_marker;
use image::{Rgb, RgbImage};

const BACKGROUND: Rgb<u8> = Rgb([170, 211, 223]);

/// Plain background with the marker in the middle, for offline runs.
pub struct MapRendererFake {}

impl MapRendererFake {
    pub fn new() -> Self {
        Self {}
    }
}

impl MapRenderer for MapRendererFake {
    fn render(
        &self,
        _coordinate: Coordinate,
        size: (u32, u32),
    ) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>> {
        let mut image = RgbImage::from_pixel(size.0, size.1, BACKGROUND);
        draw_marker(&mut image, (i64::from(size.0 / 2), i64::from(size.1 / 2)));
        Ok(image)
    }
}
