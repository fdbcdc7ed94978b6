//! Image preprocessing
//!
//! Turns uploaded bytes into the classifier input: decode, nearest-neighbour
//! resize to 128x128, RGB, raw 0-255 floats in NHWC order with a batch of one.
//!
//! No normalization is applied. The served record was trained on unscaled
//! pixel values and scaling here would degrade every prediction silently.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use tracing::debug;

use crate::utils::error::{PlantVillageError, Result};
use crate::IMAGE_SIZE;

/// File extensions accepted by the upload form
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Number of colour channels fed to the model
pub const CHANNELS: usize = 3;

/// A single-image batch in NHWC layout: `[1, height, width, 3]`
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Vec<f32>,
    shape: [usize; 4],
}

impl InputTensor {
    /// Shape as `[batch, height, width, channels]`
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Flat row-major values
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Value at `(y, x, channel)` of the single image in the batch
    pub fn pixel(&self, y: usize, x: usize, channel: usize) -> Option<f32> {
        let [_, height, width, channels] = self.shape;
        if y >= height || x >= width || channel >= channels {
            return None;
        }
        self.data.get((y * width + x) * channels + channel).copied()
    }
}

/// Check an upload filename against [`SUPPORTED_EXTENSIONS`] (case-insensitive)
pub fn is_supported_upload(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Decode raw upload bytes into an image
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(PlantVillageError::Decode("empty input".to_string()));
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Resize and lay out a decoded image as the model input
pub fn image_to_tensor(image: &DynamicImage, size: usize) -> InputTensor {
    let resized = image.resize_exact(size as u32, size as u32, FilterType::Nearest);
    let rgb = resized.to_rgb8();

    // RgbImage is already row-major HWC, so the raw buffer is the NHWC body
    let data: Vec<f32> = rgb.as_raw().iter().map(|&v| v as f32).collect();

    InputTensor {
        data,
        shape: [1, size, size, CHANNELS],
    }
}

/// Decode and preprocess uploaded bytes into a `[1, 128, 128, 3]` tensor
pub fn preprocess_bytes(bytes: &[u8]) -> Result<InputTensor> {
    let image = decode_image(bytes)?;
    debug!(
        "Decoded {}x{} image ({} bytes)",
        image.width(),
        image.height(),
        bytes.len()
    );
    Ok(image_to_tensor(&image, IMAGE_SIZE))
}
