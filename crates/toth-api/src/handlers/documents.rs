//! Document CRUD plus file upload and download.

use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use toth_core::{DocumentRequest, Error, PageRequest};

use super::{location_header, pagination_headers};
use crate::{ApiError, AppState};

const BASE_PATH: &str = "/api/documents";

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

pub async fn create_document(
    State(state): State<AppState>,
    Json(body): Json<DocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.id.is_some() {
        return Err(ApiError::BadRequest(
            "A new document cannot already have an ID".to_string(),
        ));
    }
    body.validate()?;

    let created = state.documents.insert(body.into_new()).await?;
    info!(
        subsystem = "api",
        op = "create_document",
        document_id = created.id,
        "Document created"
    );
    Ok((
        StatusCode::CREATED,
        location_header(BASE_PATH, created.id),
        Json(created),
    ))
}

/// Update title and type. The stored filename is kept as is.
pub async fn update_document(
    State(state): State<AppState>,
    Json(body): Json<DocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .id
        .ok_or_else(|| ApiError::BadRequest("Invalid id: null".to_string()))?;
    body.validate()?;

    let mut document = state
        .documents
        .get(id)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;
    let update = body.into_new();
    document.title = update.title;
    document.kind = update.kind;

    let saved = state.documents.save(&document).await?;
    Ok(Json(saved))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.documents.list(page).await?;
    Ok((pagination_headers(BASE_PATH, &page), Json(page.items)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .documents
        .get(id)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;
    Ok(Json(document))
}

/// Delete the record only; any stored blob stays on disk.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state.documents.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Store the `file` part of a multipart upload for a document.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let filename = field.file_name().map(str::to_string).ok_or_else(|| {
                ApiError::BadRequest("Upload field 'file' has no filename".to_string())
            })?;
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {}", e)))?;
            upload = Some((filename, data));
            break;
        }
    }

    let (filename, data) = upload.ok_or_else(|| {
        ApiError::BadRequest("No file uploaded. Use field name 'file'.".to_string())
    })?;

    let stored = state.files.store(id, &data, &filename).await?;
    Ok(Json(serde_json::json!({
        "id": id,
        "filename": stored,
    })))
}

/// Stream a document's stored file back to the client.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let file = state.files.load(id).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(file.content_type),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(file.reader.len()));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&file.filename),
    );

    Ok((headers, Body::from_stream(file.reader.into_stream())).into_response())
}

/// `attachment` disposition with an ASCII fallback name and an RFC 5987
/// `filename*` carrying the exact UTF-8 name.
fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
