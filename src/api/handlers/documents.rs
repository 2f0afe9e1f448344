use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::document_error;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::documents::{self, guard};
use crate::storage::models::Document;
use crate::AppState;

/// Header carrying the document password (highest precedence)
pub const PASSWORD_HEADER: &str = "x-document-password";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
    pub created_at: String,
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub content: String,
    pub created_at: String,
    pub expires_at: Option<String>,
    pub id: String,
    pub locked: bool,
    pub updated_at: String,
    pub view_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct PasswordQuery {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateDocumentRequest {
    pub content: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetPasswordRequest {
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetExpiryRequest {
    /// None clears the expiry ("never expires")
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub password: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_document(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<CreateDocumentResponse>>, ApiError> {
    let db = state.db.clone();
    let id_length = state.config.documents.id_length;

    let document = tokio::task::spawn_blocking(move || documents::create(&db, id_length))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(document_error)?;

    Ok(JSend::success(CreateDocumentResponse {
        created_at: document.created_at.to_rfc3339(),
        id: document.id,
    }))
}

pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<PasswordQuery>,
) -> Result<Json<JSend<DocumentResponse>>, ApiError> {
    let credential = resolve_credential(&headers, query.password.as_deref(), None);

    // Argon2 verification is CPU-heavy; keep it off the async workers
    let db = state.db.clone();
    let document = tokio::task::spawn_blocking(move || {
        documents::read(&db, &id, credential.as_deref())
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
    .map_err(document_error)?;

    Ok(JSend::success(document_to_response(&document)))
}

pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<PasswordQuery>,
    AppJson(req): AppJson<UpdateDocumentRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    let credential = resolve_credential(&headers, query.password.as_deref(), req.password.as_deref());
    let max_content_bytes = state.config.documents.max_content_bytes;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        documents::update_content(&db, &id, &req.content, credential.as_deref(), max_content_bytes)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
    .map_err(document_error)?;

    Ok(JSend::success(()))
}

pub async fn set_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<SetPasswordRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    let min_password_length = state.config.documents.min_password_length;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        documents::set_password(&db, &id, &req.password, min_password_length)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
    .map_err(document_error)?;

    Ok(JSend::success(()))
}

pub async fn set_expiry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<PasswordQuery>,
    AppJson(req): AppJson<SetExpiryRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    let credential = resolve_credential(&headers, query.password.as_deref(), req.password.as_deref());

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || {
        documents::set_expiry(&db, &id, req.expires_at, credential.as_deref())
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
    .map_err(document_error)?;

    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Apply the header > query > body precedence for the document password.
fn resolve_credential(
    headers: &HeaderMap,
    query: Option<&str>,
    body: Option<&str>,
) -> Option<String> {
    let header = headers.get(PASSWORD_HEADER).and_then(|v| v.to_str().ok());
    guard::resolve_credential(header, query, body).map(str::to_string)
}

fn document_to_response(document: &Document) -> DocumentResponse {
    DocumentResponse {
        content: document.content.clone(),
        created_at: document.created_at.to_rfc3339(),
        expires_at: document.expires_at.map(|t| t.to_rfc3339()),
        id: document.id.clone(),
        locked: document.is_locked(),
        updated_at: document.updated_at.to_rfc3339(),
        view_count: document.view_count,
    }
}
