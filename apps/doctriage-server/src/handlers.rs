//! Route handlers

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use doctriage_classify::ClassificationInput;
use doctriage_core::{Category, DocumentFilter, DocumentId, DocumentRecord, Priority};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::app::AppState;
use crate::error::ApiError;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "document";

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": "Doctriage",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// An uploaded file read from the multipart body.
struct Upload {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Option<Upload>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::from_multipart(e, limit))?;

        return Ok(Some(Upload {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}

/// Lower-cased extension of `filename`, empty when there is none.
fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Store, extract, classify, record, notify.
#[instrument(skip(state, multipart))]
pub async fn process_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let limit = state.max_upload_bytes;
    let upload = read_upload(&mut multipart, limit)
        .await?
        .filter(|u| !u.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    if upload.bytes.len() > limit {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let id = DocumentId::new();
    info!(document_id = %id, filename = %upload.filename, size = upload.bytes.len(), "Processing upload");

    let blob_path = state.blobs.put(&id, &upload.filename, &upload.bytes).await?;

    let extracted_text = state
        .extraction
        .extract(&blob_path, &file_extension(&upload.filename))
        .await;

    let classification = state
        .pipeline
        .classify(&ClassificationInput::new(
            extracted_text.clone(),
            upload.filename.clone(),
        ))
        .await;

    let record = DocumentRecord {
        id,
        filename: upload.filename,
        category: classification.category,
        priority: classification.priority,
        analysis: classification.summary,
        extracted_text,
        uploaded_at: Utc::now(),
        size: upload.bytes.len() as u64,
        content_type: upload.content_type,
        blob_path,
        degraded: classification.degraded,
    };

    state.documents.insert(record.clone()).await?;

    let report = state.notifier.notify_all(&record).await;
    info!(
        document_id = %record.id,
        category = %record.category,
        priority = %record.priority,
        notifications = report.receipts.len(),
        notification_failures = report.failures.len(),
        "Document processed"
    );

    Ok(Json(json!({
        "success": true,
        "document": record.view(),
    })))
}

/// Query string for listing documents
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub priority: Option<String>,
}

impl ListQuery {
    /// Exact, case-insensitive names; blank values are ignored.
    fn into_filter(self) -> Result<DocumentFilter, ApiError> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(
                Category::ALL
                    .into_iter()
                    .find(|c| c.as_str().eq_ignore_ascii_case(name))
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown category: {}", name)))?,
            ),
        };

        let priority = match self.priority.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => Some(
                Priority::ALL
                    .into_iter()
                    .find(|p| p.as_str().eq_ignore_ascii_case(name))
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown priority: {}", name)))?,
            ),
        };

        Ok(DocumentFilter { category, priority })
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = query.into_filter()?;
    let documents: Vec<_> = state
        .documents
        .list(filter)
        .await?
        .iter()
        .map(DocumentRecord::view)
        .collect();

    Ok(Json(json!({
        "success": true,
        "documents": documents,
    })))
}

async fn find_document(state: &AppState, id: &str) -> Result<DocumentRecord, ApiError> {
    let id = DocumentId::parse(id).ok_or_else(ApiError::document_not_found)?;
    state
        .documents
        .get(&id)
        .await?
        .ok_or_else(ApiError::document_not_found)
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let record = find_document(&state, &id).await?;
    Ok(Json(json!(record.view())))
}

/// `attachment` disposition with quotes and control characters replaced.
fn content_disposition(filename: &str) -> Result<HeaderValue, ApiError> {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = find_document(&state, &id).await?;

    let bytes = state.blobs.open(&record.blob_path).await.map_err(|err| {
        if err.is_not_found() {
            ApiError::NotFound("File not found on server".to_string())
        } else {
            ApiError::from(err)
        }
    })?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&record.filename)?,
            ),
        ],
        Body::from(bytes),
    )
        .into_response())
}
