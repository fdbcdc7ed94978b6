//! Static disease knowledge base
//!
//! One record per label, embedded from `assets/diseases.json` and parsed once.
//! Healthy labels carry "N/A" in the fields that do not apply.

use std::collections::HashMap;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::labels::CLASS_NAMES;
use crate::utils::error::{PlantVillageError, Result};

const EMBEDDED_DISEASES: &str = include_str!("../assets/diseases.json");

/// Value used for fields that do not apply to a label (healthy plants)
pub const NOT_APPLICABLE: &str = "N/A";

/// Descriptive text for one label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub symptoms: String,
    pub causes: String,
    pub reasons_for_cause: String,
    pub precautions: String,
    pub treatments: String,
    pub detailed_info: String,
}

impl DiseaseRecord {
    /// Fields in display order, keyed by their locale string key
    pub fn sections(&self) -> [(&'static str, &str); 6] {
        [
            ("symptoms", self.symptoms.as_str()),
            ("causes", self.causes.as_str()),
            ("reasons", self.reasons_for_cause.as_str()),
            ("precautions", self.precautions.as_str()),
            ("treatments", self.treatments.as_str()),
            ("more_info", self.detailed_info.as_str()),
        ]
    }
}

/// Label -> record lookup table
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    records: HashMap<String, DiseaseRecord>,
}

impl KnowledgeBase {
    /// Parse a knowledge base from a JSON object of label -> record
    pub fn from_json(json: &str) -> Result<Self> {
        let records: HashMap<String, DiseaseRecord> = serde_json::from_str(json)?;
        Ok(Self { records })
    }

    /// The knowledge base compiled into the binary, parsed on first use
    pub fn embedded() -> Result<&'static KnowledgeBase> {
        static EMBEDDED: OnceCell<KnowledgeBase> = OnceCell::new();
        EMBEDDED.get_or_try_init(|| Self::from_json(EMBEDDED_DISEASES))
    }

    /// Record for `label`, `None` if the label is unknown
    pub fn lookup(&self, label: &str) -> Option<&DiseaseRecord> {
        self.records.get(label)
    }

    /// Like [`lookup`](Self::lookup), reporting a miss as [`PlantVillageError::LookupMiss`]
    pub fn require(&self, label: &str) -> Result<&DiseaseRecord> {
        self.lookup(label)
            .ok_or_else(|| PlantVillageError::LookupMiss(label.to_string()))
    }

    /// Labels from the label set without a record
    pub fn missing_labels(&self) -> Vec<&'static str> {
        CLASS_NAMES
            .iter()
            .copied()
            .filter(|label| !self.records.contains_key(*label))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
