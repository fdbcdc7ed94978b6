//! Application state for the web server
//!
//! Holds the configuration, the memoized model loader and the static tables.
//! Everything here is read-only after start-up.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::render::PageRenderer;
use crate::inference::ModelLoader;
use crate::knowledge::KnowledgeBase;
use crate::locale::{Language, LocaleTable};
use crate::model::cnn::PlantClassifierConfig;
use crate::utils::error::{PlantVillageError, Result};
use crate::DEFAULT_MODEL_PATH;

/// Default cap on request bodies (uploads)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Path to the trained classifier record
    pub model_path: PathBuf,
    /// Directory served under /static
    pub static_dir: PathBuf,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Language used when a request does not pick one
    pub default_language: Language,
    /// Load the model before accepting requests instead of on first use
    pub preload_model: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8501,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            static_dir: PathBuf::from("static"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_language: Language::English,
            preload_model: false,
        }
    }
}

impl ServerConfig {
    /// Check the configuration before serving
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(PlantVillageError::Config(
                "max upload size must be greater than zero".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| PlantVillageError::Config(format!("invalid bind address: {}", e)))
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Lazily loaded classifier
    pub loader: ModelLoader,
    /// Disease details by label
    pub knowledge: Arc<KnowledgeBase>,
    /// UI strings
    pub locales: &'static LocaleTable,
    /// Page templates
    pub pages: PageRenderer,
    /// Server start time
    pub started_at: Instant,
    pub started_at_utc: DateTime<Utc>,
}

impl AppState {
    /// Build state from configuration and the embedded static tables
    pub fn new(config: ServerConfig, model_config: PlantClassifierConfig) -> Result<Self> {
        let knowledge = KnowledgeBase::embedded()?.clone();
        let locales = LocaleTable::embedded()?;

        let missing = knowledge.missing_labels();
        if !missing.is_empty() {
            warn!("No disease details for {} labels: {:?}", missing.len(), missing);
        }

        Ok(Self {
            loader: ModelLoader::new(config.model_path.clone(), model_config),
            config,
            knowledge: Arc::new(knowledge),
            locales,
            pages: PageRenderer::new()?,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        })
    }

    /// Replace the knowledge base
    pub fn with_knowledge(mut self, knowledge: KnowledgeBase) -> Self {
        self.knowledge = Arc::new(knowledge);
        self
    }

    /// Language for a request: the `lang` parameter if supported, else the default
    pub fn language(&self, requested: Option<&str>) -> Language {
        requested
            .and_then(Language::from_code)
            .unwrap_or(self.config.default_language)
    }

    /// Load the model ahead of the first analysis (blocking)
    ///
    /// A failure is logged and leaves the server usable; the loader retries on
    /// the next analysis.
    pub fn preload(&self) -> bool {
        match self.loader.get() {
            Ok(handle) => {
                info!("Model preloaded from {:?}", handle.source());
                true
            }
            Err(e) => {
                warn!("Model preload failed, pages stay available: {}", e);
                false
            }
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.socket_addr().unwrap().port(), 8501);
        assert_eq!(config.model_path, PathBuf::from("trained_plant_disease_model.mpk"));
    }

    #[test]
    fn test_invalid_config() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(PlantVillageError::Config(_))));

        let config = ServerConfig {
            max_upload_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_language() {
        let config = ServerConfig {
            default_language: Language::Tamil,
            ..ServerConfig::default()
        };
        let state = AppState::new(config, PlantClassifierConfig::new()).unwrap();

        assert_eq!(state.language(Some("te")), Language::Telugu);
        assert_eq!(state.language(Some("xx")), Language::Tamil);
        assert_eq!(state.language(None), Language::Tamil);
        assert!(!state.loader.is_loaded());
    }

    #[test]
    fn test_failed_preload_is_not_fatal() {
        let config = ServerConfig {
            model_path: PathBuf::from("/no/such/model.mpk"),
            preload_model: true,
            ..ServerConfig::default()
        };
        let state = AppState::new(config, PlantClassifierConfig::new()).unwrap();

        assert!(!state.preload());
        assert!(!state.loader.is_loaded());
    }
}
