use image::DynamicImage;
use std::path::Path;

pub trait VideoSource: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>>;
}

/// An open video file read front to back.
pub trait VideoStream: Send {
    /// `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>>;

    /// Seeks back to the first frame.
    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
