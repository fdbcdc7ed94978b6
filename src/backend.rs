//! Backend selection for inference
//!
//! Picks the Burn backend at compile time:
//! - CUDA when built with the `cuda` feature
//! - NdArray (CPU) otherwise
//!
//! No autodiff wrapper is used, the server never trains.

use burn::tensor::backend::Backend;

#[cfg(feature = "cuda")]
use burn_cuda::Cuda;

#[cfg(not(feature = "cuda"))]
use burn_ndarray::NdArray;

#[cfg(feature = "cuda")]
pub type InferenceBackend = Cuda;

#[cfg(not(feature = "cuda"))]
pub type InferenceBackend = NdArray;

/// Device type of the inference backend
pub type InferenceDevice = <InferenceBackend as Backend>::Device;

/// Get a human-readable name for the current backend
pub fn backend_name() -> &'static str {
    #[cfg(feature = "cuda")]
    {
        "CUDA"
    }

    #[cfg(not(feature = "cuda"))]
    {
        "NdArray (CPU)"
    }
}

/// Get the default device for the current backend
pub fn default_device() -> InferenceDevice {
    InferenceDevice::default()
}
