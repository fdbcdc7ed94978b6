//! Inference Predictor Module
//!
//! Runs the forward pass on a preprocessed image and packages the output.

use std::time::{Duration, Instant};

use burn::tensor::{backend::Backend, Tensor, TensorData};
use serde::{Deserialize, Serialize};

use super::preprocess::InputTensor;
use super::ranking::{argmax, top_k, RankedClass};
use crate::labels::class_name;
use crate::model::cnn::PlantClassifier;
use crate::utils::error::{PlantVillageError, Result};
use crate::NUM_CLASSES;

/// Result of a single prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class index (arg-max, lowest index on ties)
    pub index: usize,

    /// Predicted class name
    pub label: String,

    /// Probability of the predicted class
    pub confidence: f32,

    /// Full output vector, exactly as produced by the model's softmax
    pub probabilities: Vec<f32>,

    /// Inference time in milliseconds
    pub inference_time_ms: f64,
}

impl Prediction {
    /// Build a prediction from the model output
    pub fn from_probabilities(probabilities: Vec<f32>, inference_time: Duration) -> Result<Self> {
        if probabilities.len() != NUM_CLASSES {
            return Err(PlantVillageError::Inference(format!(
                "expected {} class scores, model produced {}",
                NUM_CLASSES,
                probabilities.len()
            )));
        }

        let index = argmax(&probabilities)
            .ok_or_else(|| PlantVillageError::Inference("empty model output".to_string()))?;
        let label = class_name(index)
            .ok_or_else(|| PlantVillageError::Inference(format!("no label for index {}", index)))?
            .to_string();

        Ok(Self {
            index,
            label,
            confidence: probabilities[index],
            probabilities,
            inference_time_ms: inference_time.as_secs_f64() * 1000.0,
        })
    }

    /// The `k` most probable classes, best first
    pub fn top_k(&self, k: usize) -> Vec<RankedClass> {
        top_k(&self.probabilities, k)
    }

    /// Get the margin between top-1 and top-2 predictions
    pub fn margin(&self) -> f32 {
        match self.top_k(2).as_slice() {
            [first, second] => first.probability - second.probability,
            _ => self.confidence,
        }
    }

    /// Pretty print the prediction result
    pub fn display(&self, k: usize) -> String {
        let mut output = String::new();

        output.push_str(&format!("Prediction: {} (class {})\n", self.label, self.index));
        output.push_str(&format!("Confidence: {:.2}%\n", self.confidence * 100.0));
        output.push_str(&format!("Inference time: {:.2} ms\n", self.inference_time_ms));

        output.push_str(&format!("\nTop-{} predictions:\n", k));
        for (i, ranked) in self.top_k(k).iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} (class {}) - {:.2}%\n",
                i + 1,
                ranked.label,
                ranked.index,
                ranked.probability * 100.0
            ));
        }

        output
    }
}

/// Run the classifier on an NHWC input and return the softmax output
///
/// The tensor is permuted to NCHW for the convolution stack.
pub fn forward_probabilities<B: Backend>(
    model: &PlantClassifier<B>,
    input: &InputTensor,
    device: &B::Device,
) -> Result<Vec<f32>> {
    let shape = input.shape();
    let tensor = Tensor::<B, 4>::from_data(TensorData::new(input.data().to_vec(), shape), device)
        .permute([0, 3, 1, 2]);

    let output = model.forward_softmax(tensor);
    let dims = output.dims();
    if dims[0] != 1 {
        return Err(PlantVillageError::Inference(format!(
            "expected a batch of 1, got output shape {:?}",
            dims
        )));
    }

    output
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| PlantVillageError::Inference(format!("Failed to extract probabilities: {:?}", e)))
}

/// Forward pass plus timing, packaged as a [`Prediction`]
pub fn predict_with<B: Backend>(
    model: &PlantClassifier<B>,
    input: &InputTensor,
    device: &B::Device,
) -> Result<Prediction> {
    let start = Instant::now();
    let probabilities = forward_probabilities(model, input, device)?;
    Prediction::from_probabilities(probabilities, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::preprocess::image_to_tensor;
    use crate::model::cnn::PlantClassifierConfig;
    use burn_ndarray::NdArray;
    use image::{DynamicImage, Rgb, RgbImage};

    type TestBackend = NdArray;

    #[test]
    fn test_prediction_from_probabilities() {
        let mut probs = vec![0.0; 38];
        probs[5] = 0.8;
        probs[10] = 0.15;
        probs[3] = 0.05;

        let result = Prediction::from_probabilities(probs, Duration::from_millis(50)).unwrap();

        assert_eq!(result.index, 5);
        assert_eq!(result.label, "Cherry_(including_sour)___Powdery_mildew");
        assert_eq!(result.confidence, 0.8);
        assert!((result.margin() - 0.65).abs() < 1e-6);
        assert_eq!(result.top_k(5).len(), 5);
        assert_eq!(result.top_k(5)[0].index, 5);
        assert!(result.inference_time_ms >= 50.0);
    }

    #[test]
    fn test_wrong_output_length_is_inference_error() {
        let err = Prediction::from_probabilities(vec![0.5, 0.5], Duration::ZERO).unwrap_err();
        assert!(matches!(err, PlantVillageError::Inference(_)));
    }

    #[test]
    fn test_display_lists_top_predictions() {
        let mut probs = vec![0.0; 38];
        probs[0] = 0.9;
        probs[1] = 0.1;
        let text = Prediction::from_probabilities(probs, Duration::from_millis(3))
            .unwrap()
            .display(5);
        assert!(text.contains("Apple___Apple_scab (class 0)"));
        assert!(text.contains("Top-5 predictions"));
        assert!(text.contains("2. Apple___Black_rot"));
    }

    #[test]
    fn test_predict_with_random_model() {
        let device = Default::default();
        let config = PlantClassifierConfig::new().with_base_filters(4);
        let model = PlantClassifier::<TestBackend>::new(&config, &device);

        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([30, 140, 60])));
        let input = image_to_tensor(&image, 128);

        let prediction = predict_with(&model, &input, &device).unwrap();
        assert_eq!(prediction.probabilities.len(), 38);
        assert!((prediction.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-3);

        let top = prediction.top_k(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].index, prediction.index);
        let mut distinct: Vec<usize> = top.iter().map(|r| r.index).collect();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 5);
    }
}
