//! services/api/src/web/documents.rs
//!
//! Document endpoints: the unified save/generate upsert, CRUD over a user's
//! documents, and the PDF export.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::adapters::pdf::render_pdf;
use crate::web::error::{HttpError, HttpResult};
use crate::web::state::AppState;
use leximate_core::domain::{Document, DocumentPatch, DocumentStatus, DocumentType};
use leximate_core::ports::ensure_owner;
use leximate_core::templates::{render_document_text, TemplateFields};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDocumentRequest {
    pub document_type: Option<String>,
    pub document_id: Option<String>,
    // Mode flags; the older aliases are still sent by existing clients.
    pub save_as_draft: Option<bool>,
    pub save_draft: Option<bool>,
    pub generate_now: Option<bool>,
    pub start_generation: Option<bool>,
    pub current_page: Option<i32>,
    // Persisted party/term fields.
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub generated_text: Option<String>,
    // Template-only fields, interpolated but not stored as columns.
    pub disclosing_party: Option<String>,
    pub receiving_party: Option<String>,
    pub client_name: Option<String>,
    pub freelancer_name: Option<String>,
    pub project_title: Option<String>,
    pub payment_amount: Option<String>,
    pub payment_method: Option<String>,
}

impl GenerateDocumentRequest {
    fn template_fields(&self) -> TemplateFields {
        TemplateFields {
            company_name: self.company_name.clone(),
            counterparty_name: self.counterparty_name.clone(),
            effective_date: self.effective_date.clone(),
            duration: self.duration.clone(),
            governing_law: self.governing_law.clone(),
            confidentiality_level: self.confidentiality_level.clone(),
            purpose: self.purpose.clone(),
            additional_terms: self.additional_terms.clone(),
            disclosing_party: self.disclosing_party.clone(),
            receiving_party: self.receiving_party.clone(),
            client_name: self.client_name.clone(),
            freelancer_name: self.freelancer_name.clone(),
            project_title: self.project_title.clone(),
            payment_amount: self.payment_amount.clone(),
            payment_method: self.payment_method.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    /// Accepted as a fallback spelling for `type`.
    pub document_type: Option<String>,
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub generated_text: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub company_name: Option<String>,
    pub counterparty_name: Option<String>,
    pub effective_date: Option<String>,
    pub duration: Option<String>,
    pub governing_law: Option<String>,
    pub confidentiality_level: Option<String>,
    pub purpose: Option<String>,
    pub additional_terms: Option<String>,
    pub generated_text: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            user_id: doc.user_id,
            doc_type: doc.doc_type,
            company_name: doc.company_name,
            counterparty_name: doc.counterparty_name,
            effective_date: doc.effective_date,
            duration: doc.duration,
            governing_law: doc.governing_law,
            confidentiality_level: doc.confidentiality_level,
            purpose: doc.purpose,
            additional_terms: doc.additional_terms,
            generated_text: doc.generated_text,
            status: doc.status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

//=========================================================================================
// Save-mode Resolution
//=========================================================================================

/// The three accepted shapes of a save/generate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Draft,
    GenerateNow,
    /// The implicit "in progress, beyond the final form step" save.
    PageSave,
}

/// Resolves the request's mode flags. Draft wins over generate; a page-based
/// save only applies from page 4 onward; anything else is a bad request.
pub fn resolve_save_mode(
    save_as_draft: bool,
    generate_now: bool,
    current_page: Option<i32>,
) -> Option<SaveMode> {
    if save_as_draft {
        Some(SaveMode::Draft)
    } else if generate_now {
        Some(SaveMode::GenerateNow)
    } else if current_page.is_some_and(|p| p >= 4) {
        Some(SaveMode::PageSave)
    } else {
        None
    }
}

fn parse_document_id(raw: &str) -> Result<Uuid, HttpError> {
    Uuid::parse_str(raw).map_err(|_| HttpError::bad_request("Invalid document id"))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /generate-document - Unified save/generate entry point
#[utoipa::path(
    post,
    path = "/generate-document",
    request_body = GenerateDocumentRequest,
    responses(
        (status = 200, description = "Document saved or generated"),
        (status = 400, description = "Missing type, invalid mode, or invalid document type"),
        (status = 403, description = "Caller does not own the referenced document"),
        (status = 404, description = "Referenced document not found")
    )
)]
pub async fn generate_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<GenerateDocumentRequest>,
) -> HttpResult<impl IntoResponse> {
    let doc_type = req
        .document_type
        .clone()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| HttpError::bad_request("Document type is required"))?;

    let mode = resolve_save_mode(
        req.save_as_draft.unwrap_or(false) || req.save_draft.unwrap_or(false),
        req.generate_now.unwrap_or(false) || req.start_generation.unwrap_or(false),
        req.current_page,
    )
    .ok_or_else(|| HttpError::bad_request("Invalid request"))?;

    // An explicit id means update-in-place; the record must exist and belong
    // to the caller.
    let existing = match req.document_id.as_deref() {
        Some(raw) => {
            let id = parse_document_id(raw)?;
            let doc = state.db.get_document(id).await?;
            ensure_owner(doc.user_id, user_id)?;
            Some(doc)
        }
        None => None,
    };

    let now = Utc::now();
    let is_new = existing.is_none();
    let mut doc = existing.unwrap_or_else(|| Document {
        id: Uuid::new_v4(),
        user_id,
        doc_type: doc_type.clone(),
        company_name: None,
        counterparty_name: None,
        effective_date: None,
        duration: None,
        governing_law: None,
        confidentiality_level: None,
        purpose: None,
        additional_terms: None,
        generated_text: None,
        status: DocumentStatus::Draft.as_str().to_string(),
        created_at: now,
        updated_at: now,
    });

    doc.doc_type = doc_type.clone();
    doc.company_name = req.company_name.clone();
    doc.counterparty_name = req.counterparty_name.clone();
    doc.effective_date = req.effective_date.clone();
    doc.duration = req.duration.clone();
    doc.governing_law = req.governing_law.clone();
    doc.confidentiality_level = req.confidentiality_level.clone();
    doc.purpose = req.purpose.clone();
    doc.additional_terms = req.additional_terms.clone();

    match mode {
        SaveMode::Draft => {
            doc.generated_text = req.generated_text.clone();
            doc.status = DocumentStatus::Draft.as_str().to_string();
            persist(&state, &doc, is_new).await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "documentId": doc.id,
                "status": doc.status,
            }))
            .into_response())
        }
        SaveMode::PageSave => {
            doc.generated_text = None;
            doc.status = DocumentStatus::Pending.as_str().to_string();
            persist(&state, &doc, is_new).await?;
            Ok(Json(serde_json::json!({
                "success": true,
                "documentId": doc.id,
                "status": doc.status,
            }))
            .into_response())
        }
        SaveMode::GenerateNow => {
            doc.generated_text = None;
            doc.status = DocumentStatus::Pending.as_str().to_string();
            persist(&state, &doc, is_new).await?;

            // The pending record stays behind when the type is unknown.
            let parsed_type = DocumentType::parse(&doc_type)
                .ok_or_else(|| HttpError::bad_request("Invalid document type"))?;
            let text = render_document_text(parsed_type, &req.template_fields());

            doc.generated_text = Some(text.clone());
            doc.status = DocumentStatus::Completed.as_str().to_string();
            state.db.update_document(&doc).await?;

            Ok(Json(serde_json::json!({
                "success": true,
                "documentId": doc.id,
                "documentText": text,
                "status": doc.status,
            }))
            .into_response())
        }
    }
}

async fn persist(state: &AppState, doc: &Document, is_new: bool) -> HttpResult<()> {
    if is_new {
        state.db.insert_document(doc).await?;
    } else {
        state.db.update_document(doc).await?;
    }
    Ok(())
}

/// GET /documents - All documents owned by the caller
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The caller's documents"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> HttpResult<impl IntoResponse> {
    let docs = state.db.list_documents_for_user(user_id).await?;
    let documents: Vec<DocumentResponse> = docs.into_iter().map(Into::into).collect();
    Ok(Json(serde_json::json!({
        "success": true,
        "documents": documents,
    })))
}

/// GET /documents/{id} - Fetch a single document
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 400, description = "Malformed id"),
        (status = 403, description = "Caller does not own the document"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn get_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(doc_id): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let id = parse_document_id(&doc_id)?;
    let doc = state.db.get_document(id).await?;
    ensure_owner(doc.user_id, user_id)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "document": DocumentResponse::from(doc),
    })))
}

/// PUT /documents/{id} - Allow-listed field update
#[utoipa::path(
    put,
    path = "/documents/{id}",
    request_body = UpdateDocumentRequest,
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document updated"),
        (status = 400, description = "Malformed id, empty update, or invalid status"),
        (status = 403, description = "Caller does not own the document"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn update_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(doc_id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> HttpResult<impl IntoResponse> {
    let id = parse_document_id(&doc_id)?;
    let mut doc = state.db.get_document(id).await?;
    ensure_owner(doc.user_id, user_id)?;

    if let Some(status) = req.status.as_deref() {
        if DocumentStatus::parse(status).is_none() {
            return Err(HttpError::bad_request("Invalid status"));
        }
    }

    let patch = DocumentPatch {
        doc_type: req.doc_type.or(req.document_type),
        company_name: req.company_name,
        counterparty_name: req.counterparty_name,
        effective_date: req.effective_date,
        duration: req.duration,
        governing_law: req.governing_law,
        confidentiality_level: req.confidentiality_level,
        purpose: req.purpose,
        additional_terms: req.additional_terms,
        generated_text: req.generated_text,
        status: req.status,
    };

    if doc.apply_patch(patch) == 0 {
        return Err(HttpError::bad_request("No updatable fields provided"));
    }
    state.db.update_document(&doc).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "documentId": doc.id,
    })))
}

/// DELETE /documents/{id} - Owner-checked hard delete
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 400, description = "Malformed id"),
        (status = 403, description = "Caller does not own the document"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(doc_id): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let id = parse_document_id(&doc_id)?;
    let doc = state.db.get_document(id).await?;
    ensure_owner(doc.user_id, user_id)?;
    state.db.delete_document(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Document deleted",
    })))
}

/// GET /download-document/{id} - Render a completed document to PDF
///
/// The PDF is built in memory and streamed back as an attachment; nothing is
/// persisted by this operation.
#[utoipa::path(
    get,
    path = "/download-document/{id}",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "PDF attachment", content_type = "application/pdf"),
        (status = 400, description = "Malformed id or document not generated yet"),
        (status = 403, description = "Caller does not own the document"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(doc_id): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let id = parse_document_id(&doc_id)?;
    let doc = state.db.get_document(id).await?;
    ensure_owner(doc.user_id, user_id)?;

    let text = doc
        .generated_text
        .as_deref()
        .ok_or_else(|| HttpError::bad_request("Document not generated yet"))?;

    let title = doc.doc_type.to_uppercase();
    let bytes = render_pdf(&title, text).map_err(|e| {
        error!("Failed to render PDF: {:?}", e);
        HttpError::internal("Failed to render PDF")
    })?;

    let filename = format!("{}.pdf", doc.doc_type);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_flag_wins_over_generate() {
        assert_eq!(
            resolve_save_mode(true, true, Some(5)),
            Some(SaveMode::Draft)
        );
    }

    #[test]
    fn generate_flag_beats_page_save() {
        assert_eq!(
            resolve_save_mode(false, true, Some(5)),
            Some(SaveMode::GenerateNow)
        );
    }

    #[test]
    fn page_save_requires_page_four() {
        assert_eq!(resolve_save_mode(false, false, Some(4)), Some(SaveMode::PageSave));
        assert_eq!(resolve_save_mode(false, false, Some(3)), None);
        assert_eq!(resolve_save_mode(false, false, None), None);
    }

    #[test]
    fn no_flags_is_a_bad_request() {
        assert_eq!(resolve_save_mode(false, false, None), None);
    }
}
