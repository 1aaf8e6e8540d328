use std::collections::HashMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State, rejection::BytesRejection, rejection::QueryRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{debug, info};

use super::{
    models::{ArtifactResponse, HealthResponse, MetadataParams, ReorderParams, SplitParams},
    state::AppState,
    utils::{artifact_content_type, content_disposition, parse_content_type},
    validation::{parse_page_order, passphrase, validate_split},
};
use crate::api::error::ApiError;
use crate::ledger::HistoryEntry;
use crate::pdf::DocumentMetadata;
use crate::workflow::{self, Artifact, Workflow};

pub const ACTION_HEADER: &str = "X-Pdfdesk-Action";

/// Runs a blocking workflow call off the async runtime
async fn blocking<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    F: FnOnce(&Workflow) -> workflow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let workflow = state.workflow.clone();
    tokio::task::spawn_blocking(move || call(&workflow))
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
        .map_err(ApiError::from)
}

fn created(artifact: Artifact) -> (StatusCode, Json<ArtifactResponse>) {
    (StatusCode::CREATED, Json(artifact.into()))
}

/// Raw `application/pdf` request body
fn pdf_body(
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Vec<u8>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    parse_content_type(content_type)?;

    let body = body?;
    if body.is_empty() {
        return Err(ApiError::InvalidPayload("request body is empty".into()));
    }
    Ok(body.to_vec())
}

/// Collects every non-empty part of a multipart upload, in order
async fn read_parts(mut multipart: Multipart) -> Result<Vec<Vec<u8>>, ApiError> {
    let mut parts = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            debug!(file_name = ?name, "Skipping empty upload part");
            continue;
        }
        parts.push(bytes.to_vec());
    }

    if parts.is_empty() {
        return Err(ApiError::InvalidPayload("no files uploaded".into()));
    }
    Ok(parts)
}

/// `POST /merge`: multipart upload of one or more PDFs, merged in part order
pub async fn merge_pdfs(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let documents = read_parts(multipart).await?;
    info!(count = documents.len(), "Merging PDFs");

    let artifact = blocking(&state, move |wf| wf.merge(&documents)).await?;
    Ok(created(artifact))
}

/// `POST /split?start=&end=` with a raw PDF body
pub async fn split_pdf(
    State(state): State<AppState>,
    query: Result<Query<SplitParams>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let range = validate_split(&params)?;
    let document = pdf_body(&headers, body)?;

    let artifact = blocking(&state, move |wf| wf.split(&document, range)).await?;
    Ok(created(artifact))
}

/// `POST /reorder?order=2,0,1` with a raw PDF body
pub async fn reorder_pdf(
    State(state): State<AppState>,
    query: Result<Query<ReorderParams>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let order = parse_page_order(&params.order)?;
    let document = pdf_body(&headers, body)?;

    let artifact = blocking(&state, move |wf| wf.reorder(&document, &order)).await?;
    Ok(created(artifact))
}

/// `POST /metadata?author=&title=` with a raw PDF body
pub async fn update_metadata(
    State(state): State<AppState>,
    query: Result<Query<MetadataParams>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = query?;
    let document = pdf_body(&headers, body)?;
    let metadata = DocumentMetadata {
        author: params.author.filter(|s| !s.is_empty()),
        title: params.title.filter(|s| !s.is_empty()),
    };

    let artifact = blocking(&state, move |wf| wf.update_metadata(&document, &metadata)).await?;
    Ok(created(artifact))
}

/// `POST /images/merge`: multipart upload of images, one page each
pub async fn merge_images(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let images = read_parts(multipart).await?;
    info!(count = images.len(), "Converting images to PDF");

    let artifact = blocking(&state, move |wf| wf.merge_images(&images)).await?;
    Ok(created(artifact))
}

/// `POST /encrypt` with the passphrase in `X-Pdfdesk-Passphrase`
pub async fn encrypt_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let passphrase = passphrase(&headers)?;
    let document = pdf_body(&headers, body)?;

    let artifact = blocking(&state, move |wf| wf.encrypt(&document, &passphrase)).await?;
    Ok(created(artifact))
}

/// `GET /history`: every recorded operation, newest first
pub async fn list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let entries = blocking(&state, |wf| wf.history()).await?;
    Ok(Json(entries))
}

/// `GET /files/{filename}`
///
/// The action that produced the artifact, when the ledger knows it, is
/// echoed in `X-Pdfdesk-Action`.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let name = filename.clone();
    let (bytes, entry) = blocking(&state, move |wf| {
        let bytes = wf.artifact(&name)?;
        let entry = match bytes {
            Some(_) => wf.ledger().find(&name)?,
            None => None,
        };
        Ok((bytes, entry))
    })
    .await?;
    let bytes = bytes.ok_or_else(|| ApiError::NotFound(format!("artifact {filename}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(artifact_content_type(&filename).as_ref())
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(&filename))
            .map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    if let Some(value) = entry.and_then(|e| HeaderValue::from_str(&e.action).ok()) {
        headers.insert(ACTION_HEADER, value);
    }
    Ok((StatusCode::OK, headers, bytes))
}

/// `GET /health`: ledger readable and output root usable
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();

    components.insert("api".to_string(), "healthy".to_string());

    let ledger = match blocking(&state, |wf| wf.history()).await {
        Ok(_) => "healthy".to_string(),
        Err(err) => format!("unhealthy: {}", err.code()),
    };
    components.insert("ledger".to_string(), ledger);

    // The root is created on first write, so absence is fine.
    let root = state.workflow.store().root();
    let storage = if root.is_dir() || !root.exists() {
        "healthy"
    } else {
        "unhealthy"
    };
    components.insert("storage".to_string(), storage.to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let (status_code, overall_status) = if all_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        components,
        metrics: state.workflow.metrics().snapshot(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
