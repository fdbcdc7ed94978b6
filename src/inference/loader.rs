//! Model loading
//!
//! The classifier record is read from disk once per process. [`ModelLoader`]
//! memoizes the first successful load behind a one-time cell; a failed load
//! is not cached, so the next request retries (e.g. after the file is put in
//! place).

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use burn::module::Module;
use burn::record::CompactRecorder;
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use super::predictor::{predict_with, Prediction};
use super::preprocess::InputTensor;
use crate::backend::{backend_name, default_device, InferenceBackend, InferenceDevice};
use crate::model::cnn::{PlantClassifier, PlantClassifierConfig};
use crate::utils::error::{PlantVillageError, Result};

/// A loaded classifier, shared read-only between requests
///
/// Burn modules are `Send` but not necessarily `Sync`, so forward passes are
/// serialized through a mutex. The module itself is never mutated.
pub struct ModelHandle {
    model: Mutex<PlantClassifier<InferenceBackend>>,
    device: InferenceDevice,
    config: PlantClassifierConfig,
    source: PathBuf,
}

impl ModelHandle {
    pub fn new(
        model: PlantClassifier<InferenceBackend>,
        device: InferenceDevice,
        config: PlantClassifierConfig,
        source: PathBuf,
    ) -> Self {
        Self {
            model: Mutex::new(model),
            device,
            config,
            source,
        }
    }

    /// Path the record was loaded from
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn config(&self) -> &PlantClassifierConfig {
        &self.config
    }

    /// Classify a preprocessed `[1, H, W, 3]` image
    pub fn predict(&self, input: &InputTensor) -> Result<Prediction> {
        let expected = [1, self.config.input_size, self.config.input_size, self.config.in_channels];
        if input.shape() != expected {
            return Err(PlantVillageError::Inference(format!(
                "input shape {:?} does not match model input {:?}",
                input.shape(),
                expected
            )));
        }

        // A panic in an earlier forward pass cannot leave the module half-written
        let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        predict_with(&model, input, &self.device)
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("source", &self.source)
            .field("backend", &backend_name())
            .field("num_classes", &self.config.num_classes)
            .finish()
    }
}

/// Extension the compact recorder reads and writes
pub const RECORD_EXTENSION: &str = "mpk";

/// The file the recorder actually opens for `path`
///
/// The recorder always swaps in its own extension, so `models/plant` and
/// `models/plant.mpk` name the same record.
pub fn record_path(path: &Path) -> PathBuf {
    path.with_extension(RECORD_EXTENSION)
}

/// Load a classifier record from disk (no memoization)
pub fn load_model(path: &Path, config: &PlantClassifierConfig) -> Result<ModelHandle> {
    let file = record_path(path);
    if !file.is_file() {
        return Err(PlantVillageError::ModelLoad(file, "file not found".to_string()));
    }

    let device = default_device();
    let recorder = CompactRecorder::new();

    let model = PlantClassifier::<InferenceBackend>::new(config, &device)
        .load_file(file.clone(), &recorder, &device)
        .map_err(|e| PlantVillageError::ModelLoad(file.clone(), format!("{:?}", e)))?;

    Ok(ModelHandle::new(model, device, config.clone(), file))
}

/// Memoizing loader: the record is read on first use and shared afterwards
pub struct ModelLoader {
    path: PathBuf,
    config: PlantClassifierConfig,
    handle: OnceCell<Arc<ModelHandle>>,
}

impl ModelLoader {
    pub fn new(path: impl Into<PathBuf>, config: PlantClassifierConfig) -> Self {
        Self {
            path: path.into(),
            config,
            handle: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a model has been loaded successfully
    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Shared handle, loading the record on the first call
    pub fn get(&self) -> Result<Arc<ModelHandle>> {
        self.handle
            .get_or_try_init(|| {
                info!("Loading model from {:?} ({})", self.path, backend_name());
                match load_model(&self.path, &self.config) {
                    Ok(handle) => {
                        info!(
                            "Model loaded from {:?}: {} classes",
                            handle.source(),
                            handle.config().num_classes
                        );
                        Ok(Arc::new(handle))
                    }
                    Err(e) => {
                        warn!("Model load failed: {}", e);
                        Err(e)
                    }
                }
            })
            .cloned()
    }
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("path", &self.path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::preprocess::image_to_tensor;
    use image::{DynamicImage, RgbImage};

    fn small_config() -> PlantClassifierConfig {
        PlantClassifierConfig::new().with_base_filters(4)
    }

    fn write_random_model(dir: &Path, config: &PlantClassifierConfig) -> PathBuf {
        let path = dir.join("model.mpk");
        PlantClassifier::<InferenceBackend>::new(config, &default_device())
            .save_file(path.clone(), &CompactRecorder::new())
            .unwrap();
        path
    }

    #[test]
    fn test_missing_model_is_model_load_error() {
        let loader = ModelLoader::new("/definitely/not/here.mpk", small_config());
        let err = loader.get().unwrap_err();
        assert!(matches!(err, PlantVillageError::ModelLoad(..)));
        assert!(!loader.is_loaded());
    }

    #[test]
    fn test_record_path_applies_recorder_extension() {
        assert_eq!(record_path(Path::new("models/plant")), PathBuf::from("models/plant.mpk"));
        assert_eq!(record_path(Path::new("models/plant.mpk")), PathBuf::from("models/plant.mpk"));
    }

    #[test]
    fn test_path_without_extension_loads() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        write_random_model(dir.path(), &config);

        let handle = load_model(&dir.path().join("model"), &config).unwrap();
        assert_eq!(handle.source(), dir.path().join("model.mpk"));

        let loader = ModelLoader::new(dir.path().join("model"), config);
        assert!(loader.get().is_ok());
    }

    #[test]
    fn test_corrupt_model_is_model_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mpk");
        std::fs::write(&path, b"this is not a burn record").unwrap();

        let err = load_model(&path, &small_config()).unwrap_err();
        assert!(matches!(err, PlantVillageError::ModelLoad(..)));
    }

    #[test]
    fn test_loader_memoizes_handle() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        let path = write_random_model(dir.path(), &config);

        let loader = ModelLoader::new(&path, config);
        let first = loader.get().unwrap();
        assert!(loader.is_loaded());

        // Removing the file must not matter once loaded
        std::fs::remove_file(&path).unwrap();
        let second = loader.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_load_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        let path = dir.path().join("model.mpk");

        let loader = ModelLoader::new(&path, config.clone());
        assert!(loader.get().is_err());

        write_random_model(dir.path(), &config);
        assert!(loader.get().is_ok());
    }

    #[test]
    fn test_handle_rejects_wrong_input_shape() {
        let dir = tempfile::tempdir().unwrap();
        let config = small_config();
        let path = write_random_model(dir.path(), &config);
        let handle = load_model(&path, &config).unwrap();

        let input = image_to_tensor(&DynamicImage::ImageRgb8(RgbImage::new(10, 10)), 64);
        let err = handle.predict(&input).unwrap_err();
        assert!(matches!(err, PlantVillageError::Inference(_)));

        let input = image_to_tensor(&DynamicImage::ImageRgb8(RgbImage::new(10, 10)), 128);
        assert_eq!(handle.predict(&input).unwrap().probabilities.len(), 38);
    }
}
