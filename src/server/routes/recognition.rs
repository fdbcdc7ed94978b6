//! Disease recognition endpoints - upload form and analysis results

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use minijinja::context;
use serde::Serialize;
use tracing::{error, warn};

use super::pages::LangQuery;
use crate::analysis::{analyze_upload, AnalysisReport, Upload};
use crate::labels::display_name;
use crate::locale::Language;
use crate::server::render::Page;
use crate::server::state::SharedState;
use crate::utils::error::{PlantVillageError, Result};
use crate::utils::{format_probability, progress_value};

/// Name of the multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// A file pulled out of the multipart form
#[derive(Debug)]
struct ReceivedFile {
    filename: Option<String>,
    bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct RankedView {
    label: String,
    name: String,
    probability: String,
    value: f32,
}

#[derive(Debug, Serialize)]
struct SectionView<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct ReportView<'a> {
    id: &'a str,
    label: &'a str,
    display_name: &'a str,
    confidence: String,
    inference_time_ms: String,
    top_k: Vec<RankedView>,
    /// `None` renders the "details not found" warning
    sections: Option<Vec<SectionView<'a>>>,
}

impl<'a> ReportView<'a> {
    fn new(report: &'a AnalysisReport, state: &'a SharedState, language: Language) -> Self {
        let top_k = report
            .top_k
            .iter()
            .map(|ranked| RankedView {
                name: display_name(&ranked.label),
                label: ranked.label.clone(),
                probability: format_probability(ranked.probability),
                value: progress_value(ranked.probability),
            })
            .collect();

        let sections = report.details.as_ref().map(|record| {
            record
                .sections()
                .into_iter()
                .map(|(key, body)| SectionView {
                    title: state.locales.text(language, key),
                    body,
                })
                .collect()
        });

        Self {
            id: &report.id,
            label: &report.label,
            display_name: &report.display_name,
            confidence: format_probability(report.confidence),
            inference_time_ms: format!("{:.1}", report.inference_time_ms),
            top_k,
            sections,
        }
    }
}

/// GET /recognition - Upload form
pub async fn upload_form(
    State(state): State<SharedState>,
    Query(query): Query<LangQuery>,
) -> Result<Html<String>> {
    let language = state.language(query.lang.as_deref());
    let html = state
        .pages
        .render(&state, Page::Recognition, language, context! {})?;
    Ok(Html(html))
}

/// POST /recognition - Analyze the uploaded image and render the result
///
/// Every outcome renders the recognition page; failures carry the status of
/// the underlying error so the form stays usable for the next attempt.
pub async fn analyze(
    State(state): State<SharedState>,
    Query(query): Query<LangQuery>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Html<String>)> {
    let language = state.language(query.lang.as_deref());

    let received = match multipart {
        Ok(mut multipart) => read_image_field(&mut multipart).await,
        Err(rejection) => Err(upload_error(rejection.status(), rejection.body_text())),
    };

    let (preview, outcome) = match received {
        Ok(file) => {
            let preview = preview_data_uri(&file.bytes);
            (preview, run_analysis(state.clone(), file).await)
        }
        Err(e) => (None, Err(e)),
    };

    match outcome {
        Ok(report) => {
            let view = ReportView::new(&report, &state, language);
            let html = state.pages.render(
                &state,
                Page::Recognition,
                language,
                context! { report => view, preview => preview },
            )?;
            Ok((StatusCode::OK, Html(html)))
        }
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                error!("Analysis failed: {}", e);
            } else {
                warn!("Analysis rejected: {}", e);
            }
            let html = state.pages.render(
                &state,
                Page::Recognition,
                language,
                context! {
                    error => e.to_string(),
                    error_hint => hint_key(&e).map(|key| state.locales.text(language, key)),
                    preview => preview,
                },
            )?;
            Ok((status, Html(html)))
        }
    }
}

async fn read_image_field(multipart: &mut Multipart) -> Result<ReceivedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e.status(), e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(e.status(), e.body_text()))?;
        return Ok(ReceivedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Err(PlantVillageError::InvalidUpload(format!(
        "form has no '{}' field",
        IMAGE_FIELD
    )))
}

/// Model work is CPU bound, keep it off the async workers
async fn run_analysis(state: SharedState, file: ReceivedFile) -> Result<AnalysisReport> {
    tokio::task::spawn_blocking(move || {
        let upload = Upload::new(file.filename.as_deref(), &file.bytes);
        analyze_upload(&state.loader, &state.knowledge, upload)
    })
    .await
    .map_err(|e| PlantVillageError::Inference(format!("analysis task failed: {}", e)))?
}

/// Inline `data:` URI for the uploaded image, if its format is recognizable
fn preview_data_uri(bytes: &[u8]) -> Option<String> {
    let format = image::guess_format(bytes).ok()?;
    Some(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        STANDARD.encode(bytes)
    ))
}

/// Keep the body-limit status, anything else the form parser rejects is a bad request
fn upload_error(status: StatusCode, text: String) -> PlantVillageError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        PlantVillageError::PayloadTooLarge(text)
    } else {
        PlantVillageError::InvalidUpload(text)
    }
}

/// Locale key of the advice shown under an error
fn hint_key(error: &PlantVillageError) -> Option<&'static str> {
    match error {
        PlantVillageError::EmptyUpload => Some("no_file_selected"),
        PlantVillageError::UnsupportedType(_) => Some("unsupported_file"),
        PlantVillageError::PayloadTooLarge(_) => Some("upload_too_large"),
        e if e.is_recoverable() => Some("try_again"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_preview_data_uri() {
        let mut png = Vec::new();
        RgbImage::from_pixel(2, 2, Rgb([0, 255, 0]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let uri = preview_data_uri(&png).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(preview_data_uri(b"plain text").is_none());
    }

    #[test]
    fn test_hint_keys() {
        let empty = Upload::new(Some("leaf.jpg"), &[]).validate().unwrap_err();
        assert_eq!(hint_key(&empty), Some("no_file_selected"));

        let wrong_type = Upload::new(Some("leaf.gif"), b"GIF89a").validate().unwrap_err();
        assert_eq!(hint_key(&wrong_type), Some("unsupported_file"));

        let decode = PlantVillageError::Decode("bad header".to_string());
        assert_eq!(hint_key(&decode), Some("try_again"));

        let too_large = upload_error(StatusCode::PAYLOAD_TOO_LARGE, "limit".to_string());
        assert_eq!(hint_key(&too_large), Some("upload_too_large"));

        let template = PlantVillageError::Template("boom".to_string());
        assert_eq!(hint_key(&template), None);
    }

    #[test]
    fn test_upload_error_keeps_body_limit_status() {
        let err = upload_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".to_string());
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = upload_error(StatusCode::BAD_REQUEST, "malformed boundary".to_string());
        assert!(matches!(err, PlantVillageError::InvalidUpload(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
