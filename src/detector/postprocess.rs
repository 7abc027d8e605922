use crate::detector::interface::BoundingBox;
use crate::detector::tract::image::Letterbox;
use tract_onnx::prelude::tract_ndarray::ArrayViewD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// YOLOv8 style `[1, 4 + classes, anchors]`, no objectness.
    ChannelsFirst,
    /// YOLOv5 style `[1, anchors, 5 + classes]` with objectness at index 4.
    AnchorsFirst,
}

impl OutputLayout {
    pub fn detect(shape: &[usize]) -> Option<Self> {
        match shape {
            [1, a, b] if a < b && *a > 4 => Some(OutputLayout::ChannelsFirst),
            [1, a, b] if a >= b && *b > 5 => Some(OutputLayout::AnchorsFirst),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unrecognized detector output shape {0:?}; expected [1, 4+classes, anchors] or [1, anchors, 5+classes]")]
    UnrecognizedLayout(Vec<usize>),
}

pub struct DecodeParams<'a> {
    pub confidence_threshold: f32,
    pub letterbox: Letterbox,
    pub frame_size: (u32, u32),
    pub class_names: &'a [String],
}

fn class_label(class_names: &[String], class_id: usize) -> String {
    class_names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class_{}", class_id))
}

fn best_class(scores: impl Iterator<Item = f32>) -> (usize, f32) {
    scores
        .enumerate()
        .fold((0, f32::MIN), |best, (idx, score)| {
            if score > best.1 {
                (idx, score)
            } else {
                best
            }
        })
}

/// Turns a raw detector output into frame-space boxes above the threshold.
pub fn decode(
    output: &ArrayViewD<f32>,
    params: &DecodeParams,
) -> Result<Vec<BoundingBox>, DecodeError> {
    let shape = output.shape().to_vec();
    let Some(layout) = OutputLayout::detect(&shape) else {
        return Err(DecodeError::UnrecognizedLayout(shape));
    };

    let (anchors, num_classes) = match layout {
        OutputLayout::ChannelsFirst => (shape[2], shape[1] - 4),
        OutputLayout::AnchorsFirst => (shape[1], shape[2] - 5),
    };

    let at = |anchor: usize, channel: usize| -> f32 {
        match layout {
            OutputLayout::ChannelsFirst => output[[0, channel, anchor]],
            OutputLayout::AnchorsFirst => output[[0, anchor, channel]],
        }
    };

    let (frame_w, frame_h) = (params.frame_size.0 as f32, params.frame_size.1 as f32);
    let mut boxes = Vec::new();

    for anchor in 0..anchors {
        let (class_id, confidence) = match layout {
            OutputLayout::ChannelsFirst => best_class((0..num_classes).map(|c| at(anchor, 4 + c))),
            OutputLayout::AnchorsFirst => {
                let objectness = at(anchor, 4);
                let (class_id, prob) = best_class((0..num_classes).map(|c| at(anchor, 5 + c)));
                (class_id, objectness * prob)
            }
        };
        if confidence < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (at(anchor, 0), at(anchor, 1), at(anchor, 2), at(anchor, 3));
        let (x_min, y_min) = params.letterbox.to_frame(cx - w / 2.0, cy - h / 2.0);
        let (x_max, y_max) = params.letterbox.to_frame(cx + w / 2.0, cy + h / 2.0);

        boxes.push(BoundingBox {
            x_min: x_min.clamp(0.0, frame_w),
            y_min: y_min.clamp(0.0, frame_h),
            x_max: x_max.clamp(0.0, frame_w),
            y_max: y_max.clamp(0.0, frame_h),
            confidence,
            class_id,
            label: class_label(params.class_names, class_id),
        });
    }

    Ok(boxes)
}

/// Greedy per-class non-maximum suppression, highest confidence first.
pub fn non_max_suppression(
    mut boxes: Vec<BoundingBox>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<BoundingBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<BoundingBox> = Vec::new();
    for candidate in boxes {
        if kept.len() >= max_detections {
            break;
        }
        let overlaps = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}
