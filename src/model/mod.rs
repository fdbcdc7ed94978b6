//! Model module for the CNN architecture using the Burn framework
//!
//! The classifier is only ever used for forward inference here; the record
//! it is loaded from is produced by a separate training run.

pub mod cnn;

// Re-export main types for convenience
pub use cnn::{PlantClassifier, PlantClassifierConfig};
