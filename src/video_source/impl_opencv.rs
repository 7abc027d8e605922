use crate::video_source::interface::{VideoSource, VideoStream};
use image::{DynamicImage, RgbImage};
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct VideoSourceOpenCv;

impl VideoSourceOpenCv {
    pub fn new() -> Self {
        Self
    }
}

impl VideoSource for VideoSourceOpenCv {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>> {
        let path_str = path
            .to_str()
            .ok_or_else(|| format!("non UTF-8 video path {}", path.display()))?;
        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("unable to open {}", path.display()).into());
        }

        Ok(Box::new(VideoStreamOpenCv { capture }))
    }
}

pub struct VideoStreamOpenCv {
    capture: VideoCapture,
}

impl VideoStream for VideoStreamOpenCv {
    fn read_frame(&mut self) -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        let size = rgb.size()?;
        let data = rgb.data_bytes()?.to_vec();
        let image = RgbImage::from_raw(size.width as u32, size.height as u32, data)
            .ok_or("decoded frame does not match its reported size")?;

        Ok(Some(DynamicImage::ImageRgb8(image)))
    }

    fn rewind(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.capture.set(videoio::CAP_PROP_POS_FRAMES, 0.0)?;
        Ok(())
    }
}
