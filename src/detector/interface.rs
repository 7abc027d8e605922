use image::{DynamicImage, RgbImage};

/// Axis-aligned box in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
    pub confidence: f32,
    pub class_id: usize,
    pub label: String,
}

impl BoundingBox {
    pub fn area(&self) -> f32 {
        (self.x_max - self.x_min).max(0.0) * (self.y_max - self.y_min).max(0.0)
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        let intersection = (x_max - x_min).max(0.0) * (y_max - y_min).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

#[derive(Debug, Clone)]
pub struct Detection {
    pub boxes: Vec<BoundingBox>,
    /// RGB copy of the input frame with `boxes` drawn on it.
    pub annotated: RgbImage,
}

pub trait Detector: Send + Sync {
    fn detect(
        &self,
        frame: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Detection, Box<dyn std::error::Error + Send + Sync>>;
}
