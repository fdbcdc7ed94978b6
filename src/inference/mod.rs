//! Inference module: model loading, preprocessing, prediction and ranking
//!
//! The pipeline for one uploaded image:
//! 1. [`preprocess_bytes`] decodes and resizes to a `[1, 128, 128, 3]` tensor
//! 2. [`ModelLoader::get`] hands out the memoized classifier
//! 3. [`ModelHandle::predict`] runs the forward pass
//! 4. [`Prediction::top_k`] ranks the output

pub mod loader;
pub mod predictor;
pub mod preprocess;
pub mod ranking;

// Re-export main types for convenience
pub use loader::{load_model, record_path, ModelHandle, ModelLoader};
pub use predictor::Prediction;
pub use preprocess::{is_supported_upload, preprocess_bytes, InputTensor, SUPPORTED_EXTENSIONS};
pub use ranking::{argmax, top_k, RankedClass};
