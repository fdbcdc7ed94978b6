//! The "analyze" action: uploaded bytes in, displayable report out
//!
//! Blocking; the server calls it from a blocking worker thread.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::inference::{is_supported_upload, preprocess_bytes, ModelLoader, RankedClass};
use crate::knowledge::{DiseaseRecord, KnowledgeBase};
use crate::labels::display_name;
use crate::utils::error::{PlantVillageError, Result};
use crate::TOP_K;

/// An uploaded file as received from the form
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub filename: Option<&'a str>,
    pub bytes: &'a [u8],
}

impl<'a> Upload<'a> {
    pub fn new(filename: Option<&'a str>, bytes: &'a [u8]) -> Self {
        Self { filename, bytes }
    }

    /// Reject empty uploads and unsupported extensions before decoding
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(PlantVillageError::EmptyUpload);
        }
        match self.filename {
            Some(name) if !name.is_empty() && !is_supported_upload(name) => {
                Err(PlantVillageError::UnsupportedType(name.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Everything the result page shows for one analyzed image
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub id: String,
    pub label: String,
    pub display_name: String,
    pub index: usize,
    pub confidence: f32,
    pub top_k: Vec<RankedClass>,
    /// `None` when the label has no knowledge-base entry
    pub details: Option<DiseaseRecord>,
    pub inference_time_ms: f64,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn has_details(&self) -> bool {
        self.details.is_some()
    }
}

/// Validate, preprocess, classify, rank and look up one upload
pub fn analyze_upload(
    loader: &ModelLoader,
    knowledge: &KnowledgeBase,
    upload: Upload<'_>,
) -> Result<AnalysisReport> {
    let id = Uuid::new_v4().to_string();
    let span = info_span!("analyze", id = %id);
    let _guard = span.enter();

    upload.validate()?;

    let input = preprocess_bytes(upload.bytes).map_err(|e| {
        warn!("Rejected upload {:?}: {}", upload.filename, e);
        e
    })?;

    let model = loader.get()?;
    let prediction = model.predict(&input)?;

    info!(
        "Predicted {} ({:.1}%, margin {:.2}) in {:.1} ms",
        prediction.label,
        prediction.confidence * 100.0,
        prediction.margin(),
        prediction.inference_time_ms
    );

    let details = match knowledge.require(&prediction.label) {
        Ok(record) => Some(record.clone()),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    Ok(AnalysisReport {
        id,
        display_name: display_name(&prediction.label),
        top_k: prediction.top_k(TOP_K),
        label: prediction.label,
        index: prediction.index,
        confidence: prediction.confidence,
        details,
        inference_time_ms: prediction.inference_time_ms,
        analyzed_at: Utc::now(),
    })
}
