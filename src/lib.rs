//! # PlantVillage Web
//!
//! Leaf disease recognition served over HTTP. An uploaded leaf photo is
//! classified by a Burn CNN into one of the 38 PlantVillage classes, and the
//! result is shown together with static disease information in English,
//! Telugu or Tamil.
//!
//! ## Modules
//!
//! - `labels`: the fixed, training-ordered PlantVillage label set
//! - `model`: CNN architecture built with Burn
//! - `inference`: model loading, image preprocessing, prediction and top-k ranking
//! - `knowledge`: static disease records keyed by label
//! - `locale`: localized UI strings
//! - `analysis`: the upload → classify → look up flow behind the "analyze" action
//! - `server`: axum routes, page rendering and shared state
//! - `utils`: logging and error handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plantvillage_web::inference::{ModelLoader, preprocess_bytes};
//! use plantvillage_web::model::cnn::PlantClassifierConfig;
//!
//! let loader = ModelLoader::new("trained_plant_disease_model.mpk", PlantClassifierConfig::new());
//! let input = preprocess_bytes(&std::fs::read("leaf.jpg")?)?;
//! let prediction = loader.get()?.predict(&input)?;
//! println!("{}", prediction.label);
//! ```

pub mod analysis;
pub mod backend;
pub mod inference;
pub mod knowledge;
pub mod labels;
pub mod locale;
pub mod model;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use analysis::{analyze_upload, AnalysisReport};
pub use inference::{ModelHandle, ModelLoader, Prediction, RankedClass};
pub use knowledge::{DiseaseRecord, KnowledgeBase};
pub use labels::{class_name, CLASS_NAMES};
pub use locale::{Language, LocaleTable};
pub use model::cnn::{PlantClassifier, PlantClassifierConfig};
pub use utils::error::{PlantVillageError, Result};

/// Number of PlantVillage classes the classifier predicts
pub const NUM_CLASSES: usize = 38;

/// Side length of the square model input
pub const IMAGE_SIZE: usize = 128;

/// Number of ranked predictions shown to the user
pub const TOP_K: usize = 5;

/// Default location of the trained model record
pub const DEFAULT_MODEL_PATH: &str = "trained_plant_disease_model.mpk";

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
