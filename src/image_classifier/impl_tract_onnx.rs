use crate::config::ModelConfig;
use crate::image_classifier::interface::{
    ClassificationError, ClassificationOutput, ImageClassifier,
};
use crate::image_classifier::labels::read_labels;
use crate::image_classifier::ranking::{softmax, top_classifications};
use crate::image_classifier::tract::image::image_to_tensor;
use crate::preprocess::scale_bitmap;
use image::DynamicImage;
use tract_onnx::prelude::*;

pub struct ImageClassifierTractOnnx {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    labels: Vec<String>,
    config: ModelConfig,
}

impl ImageClassifierTractOnnx {
    pub fn create(config: ModelConfig) -> Result<Self, ClassificationError> {
        let labels = read_labels(&config.label_path)?;
        let model = load_model(&config)
            .map_err(|e| ClassificationError::ModelLoad(format!("{}: {:#}", config.model_path.display(), e)))?;

        Ok(Self {
            model,
            labels,
            config,
        })
    }
}

fn load_model(
    config: &ModelConfig,
) -> TractResult<SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>> {
    let size = config.input_size as usize;
    let mut model = tract_onnx::onnx().model_for_path(&config.model_path)?;

    if let Some(input_name) = &config.input_name {
        model = model.with_input_names([input_name.as_str()])?;
    }
    if let Some(output_name) = &config.output_name {
        model = model.with_output_names([output_name.as_str()])?;
    }

    model
        .with_input_fact(0, f32::fact([1, 3, size, size]).into())?
        .into_optimized()?
        .into_runnable()
}

impl ImageClassifier for ImageClassifierTractOnnx {
    fn classify(&self, image: &DynamicImage) -> Result<ClassificationOutput, ClassificationError> {
        let scaled = scale_bitmap(image, self.config.input_size)?;
        let input = image_to_tensor(&scaled, self.config.image_mean, self.config.image_std)?;

        let outputs = self
            .model
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| ClassificationError::Inference(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| ClassificationError::Inference("model produced no output".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassificationError::Inference(format!("{:#}", e)))?;

        let scores: Vec<f32> = output.iter().copied().collect();
        let scores = if self.config.apply_softmax {
            softmax(&scores)
        } else {
            scores
        };

        Ok(top_classifications(
            &scores,
            &self.labels,
            self.config.threshold,
            self.config.max_results,
        ))
    }
}
