//! Error Handling Module
//!
//! Defines the error type for the recognition pipeline and the web layer.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for PlantVillage web operations
#[derive(Error, Debug)]
pub enum PlantVillageError {
    /// The classifier record could not be loaded
    #[error("Failed to load model from '{0}': {1}")]
    ModelLoad(PathBuf, String),

    /// Uploaded bytes are not a decodable image
    #[error("Could not decode image: {0}")]
    Decode(String),

    /// Failure during the forward pass
    #[error("Inference error: {0}")]
    Inference(String),

    /// Predicted label has no entry in the knowledge base
    #[error("No disease details for label '{0}'")]
    LookupMiss(String),

    /// Malformed form or missing `image` field
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// A file field was sent but carried no bytes
    #[error("Invalid upload: no image data received")]
    EmptyUpload,

    /// Filename extension other than .jpg, .jpeg or .png
    #[error("Invalid upload: '{0}' is not a .jpg, .jpeg or .png file")]
    UnsupportedType(String),

    /// Request body over the configured upload limit
    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Page rendering error
    #[error("Template error: {0}")]
    Template(String),
}

impl PlantVillageError {
    /// HTTP status used when this error ends an analyze request
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlantVillageError::ModelLoad(..) => StatusCode::SERVICE_UNAVAILABLE,
            PlantVillageError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlantVillageError::InvalidUpload(_)
            | PlantVillageError::EmptyUpload
            | PlantVillageError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            PlantVillageError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PlantVillageError::LookupMiss(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the user can recover by trying again (another file, later)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlantVillageError::ModelLoad(..)
                | PlantVillageError::Decode(_)
                | PlantVillageError::Inference(_)
                | PlantVillageError::InvalidUpload(_)
                | PlantVillageError::EmptyUpload
                | PlantVillageError::UnsupportedType(_)
                | PlantVillageError::PayloadTooLarge(_)
                | PlantVillageError::LookupMiss(_)
        )
    }
}

impl From<image::ImageError> for PlantVillageError {
    fn from(err: image::ImageError) -> Self {
        PlantVillageError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for PlantVillageError {
    fn from(err: serde_json::Error) -> Self {
        PlantVillageError::Serialization(err.to_string())
    }
}

impl From<minijinja::Error> for PlantVillageError {
    fn from(err: minijinja::Error) -> Self {
        PlantVillageError::Template(err.to_string())
    }
}

/// Convenience Result type for PlantVillage web operations
pub type Result<T> = std::result::Result<T, PlantVillageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlantVillageError::Inference("bad shape".to_string());
        assert_eq!(format!("{}", err), "Inference error: bad shape");
    }

    #[test]
    fn test_model_load_error_mentions_path() {
        let err = PlantVillageError::ModelLoad(
            PathBuf::from("models/trained.mpk"),
            "file not found".to_string(),
        );
        assert!(err.to_string().contains("trained.mpk"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_image_error_becomes_decode() {
        let err: PlantVillageError = image::load_from_memory(b"not an image").unwrap_err().into();
        assert!(matches!(err, PlantVillageError::Decode(_)));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_upload_errors_are_client_errors() {
        assert_eq!(PlantVillageError::EmptyUpload.status_code(), StatusCode::BAD_REQUEST);
        let err = PlantVillageError::UnsupportedType("leaf.gif".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("leaf.gif"));

        let err = PlantVillageError::PayloadTooLarge("length limit exceeded".to_string());
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlantVillageError = io_err.into();
        assert!(matches!(err, PlantVillageError::Io(_)));
        assert!(!err.is_recoverable());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
