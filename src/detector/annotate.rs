use crate::detector::interface::BoundingBox;
use image::{Rgb, RgbImage};

const BOX_COLOR: Rgb<u8> = Rgb([255, 82, 82]);
const BOX_THICKNESS: u32 = 3;

/// Clamp a pixel-space box to the image. `None` when nothing is left.
pub fn clamp_box(bbox: &BoundingBox, dims: (u32, u32)) -> Option<[u32; 4]> {
    let (w, h) = dims;
    if w == 0 || h == 0 {
        return None;
    }
    let clamp = |v: f32, max: u32| -> u32 { v.max(0.0).min((max - 1) as f32) as u32 };
    let x0 = clamp(bbox.x_min, w);
    let y0 = clamp(bbox.y_min, h);
    let x1 = clamp(bbox.x_max, w);
    let y1 = clamp(bbox.y_max, h);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some([x0, y0, x1, y1])
}

/// Draw a rectangle border with given thickness.
pub fn draw_rect(img: &mut RgbImage, bbox_px: [u32; 4], color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    let [x0, y0, x1, y1] = bbox_px;
    for t in 0..thickness {
        let xx0 = x0.saturating_add(t);
        let yy0 = y0.saturating_add(t);
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 >= w || yy0 >= h || xx1 >= w || yy1 >= h || xx0 > xx1 || yy0 > yy1 {
            continue;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}

pub fn annotate(frame: &RgbImage, boxes: &[BoundingBox]) -> RgbImage {
    let mut annotated = frame.clone();
    for bbox in boxes {
        if let Some(px) = clamp_box(bbox, annotated.dimensions()) {
            draw_rect(&mut annotated, px, BOX_COLOR, BOX_THICKNESS);
        }
    }
    annotated
}
