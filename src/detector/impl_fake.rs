use crate::detector::annotate::annotate;
use crate::detector::interface::{BoundingBox, Detection, Detector};
use image::DynamicImage;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Mode {
    Random { probability: f64 },
    Scripted(Mutex<VecDeque<bool>>),
}

/// Reports a single centered "fire" box, either at random or following a
/// script of per-frame outcomes. An exhausted script detects nothing.
pub struct DetectorFake {
    mode: Mode,
}

impl DetectorFake {
    pub fn random(probability: f64) -> Self {
        Self {
            mode: Mode::Random {
                probability: probability.clamp(0.0, 1.0),
            },
        }
    }

    #[allow(dead_code)]
    pub fn scripted(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self {
            mode: Mode::Scripted(Mutex::new(outcomes.into_iter().collect())),
        }
    }

    fn next_outcome(&self) -> bool {
        match &self.mode {
            Mode::Random { probability } => rand::random::<f64>() < *probability,
            Mode::Scripted(outcomes) => outcomes
                .lock()
                .ok()
                .and_then(|mut outcomes| outcomes.pop_front())
                .unwrap_or(false),
        }
    }
}

fn centered_box(width: u32, height: u32) -> BoundingBox {
    let (w, h) = (width as f32, height as f32);
    BoundingBox {
        x_min: w * 0.25,
        y_min: h * 0.25,
        x_max: w * 0.75,
        y_max: h * 0.75,
        confidence: 0.9,
        class_id: 0,
        label: "fire".to_string(),
    }
}

impl Detector for DetectorFake {
    fn detect(
        &self,
        frame: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Detection, Box<dyn std::error::Error + Send + Sync>> {
        let mut boxes = Vec::new();
        if self.next_outcome() {
            let bbox = centered_box(frame.width(), frame.height());
            if bbox.confidence >= confidence_threshold {
                boxes.push(bbox);
            }
        }

        let annotated = annotate(&frame.to_rgb8(), &boxes);
        Ok(Detection { boxes, annotated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn frame() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 20, Rgb([0, 0, 0])))
    }

    #[test]
    fn test_scripted_outcomes_in_order() {
        let detector = DetectorFake::scripted([true, false, true]);

        let counts: Vec<usize> = (0..4)
            .map(|_| detector.detect(&frame(), 0.4).unwrap().boxes.len())
            .collect();

        assert_eq!(counts, vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_detection_is_drawn_on_annotated_frame() {
        let detector = DetectorFake::scripted([true]);

        let detection = detector.detect(&frame(), 0.4).unwrap();

        assert_eq!(detection.boxes[0].label, "fire");
        assert_eq!(detection.annotated.dimensions(), (40, 20));
        assert_eq!(detection.annotated.get_pixel(10, 5), &Rgb([255, 82, 82]));
    }

    #[test]
    fn test_threshold_above_fake_confidence_hides_box() {
        let detector = DetectorFake::scripted([true]);

        assert!(detector.detect(&frame(), 0.95).unwrap().boxes.is_empty());
    }

    #[test]
    fn test_random_extremes() {
        let never = DetectorFake::random(0.0);
        let always = DetectorFake::random(1.0);

        for _ in 0..20 {
            assert!(never.detect(&frame(), 0.4).unwrap().boxes.is_empty());
            assert_eq!(always.detect(&frame(), 0.4).unwrap().boxes.len(), 1);
        }
    }
}
