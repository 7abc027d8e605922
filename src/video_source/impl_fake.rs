use crate::video_source::interface::{VideoSource, VideoStream};
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::HashSet;
use std::path::Path;

/// Produces `frame_count` solid frames per file. The red channel of every
/// pixel carries the frame index (mod 256) so callers can tell frames apart.
#[derive(Debug, Clone)]
pub struct VideoSourceFake {
    frame_count: u64,
    width: u32,
    height: u32,
    unreadable: HashSet<String>,
}

impl VideoSourceFake {
    pub fn new(frame_count: u64, width: u32, height: u32) -> Self {
        Self {
            frame_count,
            width,
            height,
            unreadable: HashSet::new(),
        }
    }

    /// Files with this name fail to open.
    #[allow(dead_code)]
    pub fn with_unreadable(mut self, file_name: &str) -> Self {
        self.unreadable.insert(file_name.to_string());
        self
    }
}

impl VideoSource for VideoSourceFake {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.unreadable.contains(name) {
            return Err(format!("cannot decode {}", path.display()).into());
        }

        Ok(Box::new(VideoStreamFake {
            frame_count: self.frame_count,
            width: self.width,
            height: self.height,
            position: 0,
        }))
    }
}

pub struct VideoStreamFake {
    frame_count: u64,
    width: u32,
    height: u32,
    position: u64,
}

pub fn synthetic_frame(index: u64, width: u32, height: u32) -> DynamicImage {
    let red = (index % 256) as u8;
    let image = RgbImage::from_pixel(width, height, Rgb([red, 96, 48]));
    DynamicImage::ImageRgb8(image)
}

impl VideoStream for VideoStreamFake {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>> {
        if self.position >= self.frame_count {
            return Ok(None);
        }
        let frame = synthetic_frame(self.position, self.width, self.height);
        self.position += 1;
        Ok(Some(frame))
    }

    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.position = 0;
        Ok(())
    }
}
