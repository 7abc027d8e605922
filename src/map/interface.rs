use crate::location::Coordinate;
use image::RgbImage;

pub trait MapRenderer: Send + Sync {
    /// A `size` picture of the area around `coordinate` with a marker on it.
    fn render(
        &self,
        coordinate: Coordinate,
        size: (u32, u32),
    ) -> Result<RgbImage, Box<dyn std::error::Error + Send + Sync>>;
}
