use image::{imageops, DynamicImage, RgbImage};
use tract_onnx::prelude::*;

/// How a frame was scaled and padded into the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Maps a point from model input space back to frame pixels.
    pub fn to_frame(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

pub fn letterbox_image(image: &DynamicImage, width: u32, height: u32) -> (RgbImage, Letterbox) {
    let (w, h) = (image.width().max(1) as f32, image.height().max(1) as f32);
    let scale = (width as f32 / w).min(height as f32 / h);
    let new_w = ((w * scale).round() as u32).clamp(1, width);
    let new_h = ((h * scale).round() as u32).clamp(1, height);

    let scaled = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    let x_offset = (width - new_w) / 2;
    let y_offset = (height - new_h) / 2;

    let mut padded = RgbImage::new(width, height);
    imageops::replace(&mut padded, &scaled, x_offset as i64, y_offset as i64);

    (
        padded,
        Letterbox {
            scale,
            pad_x: x_offset as f32,
            pad_y: y_offset as f32,
        },
    )
}

fn image_to_tensor(rgb: &RgbImage) -> Tensor {
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    tract_ndarray::Array4::from_shape_fn((1, 3, height, width), |(_, c, y, x)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    })
    .into_tensor()
}

pub fn letterbox_to_tensor(image: &DynamicImage, width: u32, height: u32) -> (Tensor, Letterbox) {
    let (padded, letterbox) = letterbox_image(image, width, height);
    (image_to_tensor(&padded), letterbox)
}
