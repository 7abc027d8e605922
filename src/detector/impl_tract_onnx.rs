use crate::config::DetectorConfig;
use crate::detector::annotate::annotate;
use crate::detector::interface::{Detection, Detector};
use crate::detector::postprocess::{decode, non_max_suppression, DecodeParams};
use crate::detector::tract::image::letterbox_to_tensor;
use image::DynamicImage;
use tract_onnx::prelude::*;

pub struct DetectorTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    config: DetectorConfig,
}

impl DetectorTractOnnx {
    pub fn new(config: DetectorConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let (height, width) = config.model.input_shape;

        let model = tract_onnx::onnx()
            .model_for_path(&config.model.onnx_model_path)?
            .with_input_fact(
                0,
                f32::fact([1, 3, height as usize, width as usize]).into(),
            )?
            .into_optimized()?
            .into_runnable()?;

        Ok(Self { model, config })
    }
}

impl Detector for DetectorTractOnnx {
    fn detect(
        &self,
        frame: &DynamicImage,
        confidence_threshold: f32,
    ) -> Result<Detection, Box<dyn std::error::Error + Send + Sync>> {
        let (height, width) = self.config.model.input_shape;
        let (input, letterbox) = letterbox_to_tensor(frame, width, height);

        let outputs = self.model.run(tvec!(input.into_tvalue()))?;
        let output = outputs
            .first()
            .ok_or("detector model produced no outputs")?
            .to_array_view::<f32>()?;

        let params = DecodeParams {
            confidence_threshold,
            letterbox,
            frame_size: (frame.width(), frame.height()),
            class_names: &self.config.class_names,
        };

        let boxes = non_max_suppression(
            decode(&output, &params)?,
            self.config.iou_threshold,
            self.config.max_detections,
        );

        let annotated = annotate(&frame.to_rgb8(), &boxes);

        Ok(Detection { boxes, annotated })
    }
}
