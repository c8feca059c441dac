use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::{dsl::exists, prelude::*, select, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::{AppError, AppResult, FieldErrors},
    models::{NewProjectDocument, ProjectDocument, DEFAULT_DOCUMENT_STATUS, DOCUMENT_STATUSES},
    schema::{project_documents, projects, users},
    state::AppState,
    validate::{check_choice, choice_or_default, optional_str, require_str, signatures_or_default},
};

use super::to_iso;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub url: String,
    pub status: String,
    pub category: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
    pub uploaded_at: String,
    pub status_date: Option<String>,
    pub signatures: Value,
}

impl From<ProjectDocument> for DocumentResponse {
    fn from(document: ProjectDocument) -> Self {
        Self {
            id: document.id,
            project_id: document.project_id,
            name: document.name,
            url: document.url,
            status: document.status,
            category: document.category,
            uploaded_by_id: document.uploaded_by_id,
            uploaded_at: to_iso(document.uploaded_at),
            status_date: document.status_date.map(to_iso),
            signatures: document.signatures,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
    /// Storage URL or a self-contained base64 payload; stored verbatim.
    pub url: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
    pub signatures: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDocumentRequest {
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<Option<String>>,
    #[serde(default)]
    pub uploaded_by_id: Option<Option<Uuid>>,
    pub signatures: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = project_documents)]
struct DocumentChangeset {
    project_id: Option<Uuid>,
    name: Option<String>,
    url: Option<String>,
    status: Option<String>,
    category: Option<Option<String>>,
    uploaded_by_id: Option<Option<Uuid>>,
    status_date: Option<Option<chrono::NaiveDateTime>>,
    signatures: Option<Value>,
}

impl DocumentChangeset {
    fn has_changes(&self) -> bool {
        self.project_id.is_some()
            || self.name.is_some()
            || self.url.is_some()
            || self.status.is_some()
            || self.category.is_some()
            || self.uploaded_by_id.is_some()
            || self.status_date.is_some()
            || self.signatures.is_some()
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> AppResult<Json<Vec<DocumentResponse>>> {
    let mut conn = state.db()?;
    let mut statement = project_documents::table
        .order(project_documents::uploaded_at.desc())
        .into_boxed();
    if let Some(project_id) = query.project_id {
        statement = statement.filter(project_documents::project_id.eq(project_id));
    }
    let rows: Vec<ProjectDocument> = statement.load(&mut conn)?;
    Ok(Json(rows.into_iter().map(DocumentResponse::from).collect()))
}

pub async fn create_document(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateDocumentRequest>,
) -> AppResult<(StatusCode, Json<DocumentResponse>)> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let url = require_str(&mut errors, "url", payload.url.as_deref());
    if payload.project_id.is_none() {
        errors.insert("projectId".to_string(), "este campo es obligatorio".to_string());
    }
    let status = choice_or_default(
        &mut errors,
        "status",
        payload.status.as_deref(),
        DOCUMENT_STATUSES,
        DEFAULT_DOCUMENT_STATUS,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let project_id = payload.project_id.unwrap();

    let mut conn = state.db()?;
    resolve_project(&mut conn, project_id)?;
    let uploaded_by_id = match payload.uploaded_by_id {
        Some(id) => {
            resolve_user(&mut conn, id)?;
            Some(id)
        }
        // Default the uploader to the caller.
        None => Some(user.user_id),
    };

    let new_document = NewProjectDocument {
        id: Uuid::new_v4(),
        project_id,
        name: name.unwrap(),
        url: url.unwrap(),
        status,
        category: optional_str(payload.category.as_deref()),
        uploaded_by_id,
        status_date: None,
        signatures: signatures_or_default(payload.signatures),
    };

    diesel::insert_into(project_documents::table)
        .values(&new_document)
        .execute(&mut conn)?;

    let document: ProjectDocument = project_documents::table
        .find(new_document.id)
        .first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let document: ProjectDocument = project_documents::table.find(document_id).first(&mut conn)?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<CreateDocumentRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let url = require_str(&mut errors, "url", payload.url.as_deref());
    if payload.project_id.is_none() {
        errors.insert("projectId".to_string(), "este campo es obligatorio".to_string());
    }
    let status = choice_or_default(
        &mut errors,
        "status",
        payload.status.as_deref(),
        DOCUMENT_STATUSES,
        DEFAULT_DOCUMENT_STATUS,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let project_id = payload.project_id.unwrap();

    let mut conn = state.db()?;
    let existing: ProjectDocument = project_documents::table.find(document_id).first(&mut conn)?;
    resolve_project(&mut conn, project_id)?;
    if let Some(id) = payload.uploaded_by_id {
        resolve_user(&mut conn, id)?;
    }

    // A changed status value gets a fresh status timestamp.
    let status_date = if status != existing.status {
        Some(Some(Utc::now().naive_utc()))
    } else {
        None
    };

    let changeset = DocumentChangeset {
        project_id: Some(project_id),
        name,
        url,
        status: Some(status),
        category: Some(optional_str(payload.category.as_deref())),
        uploaded_by_id: payload.uploaded_by_id.map(Some),
        status_date,
        signatures: payload.signatures.map(|s| signatures_or_default(Some(s))),
    };

    diesel::update(project_documents::table.find(document_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let document: ProjectDocument = project_documents::table.find(document_id).first(&mut conn)?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn partial_update_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<PatchDocumentRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let mut conn = state.db()?;
    let existing: ProjectDocument = project_documents::table.find(document_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let name = match payload.name.as_deref() {
        Some(raw) => require_str(&mut errors, "name", Some(raw)),
        None => None,
    };
    let url = match payload.url.as_deref() {
        Some(raw) => require_str(&mut errors, "url", Some(raw)),
        None => None,
    };
    let status = match optional_str(payload.status.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "status", &value, DOCUMENT_STATUSES);
            Some(value)
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    if let Some(project_id) = payload.project_id {
        resolve_project(&mut conn, project_id)?;
    }
    if let Some(Some(uploaded_by_id)) = payload.uploaded_by_id {
        resolve_user(&mut conn, uploaded_by_id)?;
    }

    let status_date = match status {
        Some(ref value) if *value != existing.status => Some(Some(Utc::now().naive_utc())),
        _ => None,
    };

    let changeset = DocumentChangeset {
        project_id: payload.project_id,
        name,
        url,
        status,
        category: payload
            .category
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        uploaded_by_id: payload.uploaded_by_id,
        status_date,
        signatures: payload.signatures.map(|s| signatures_or_default(Some(s))),
    };

    if changeset.has_changes() {
        diesel::update(project_documents::table.find(document_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let document: ProjectDocument = project_documents::table.find(document_id).first(&mut conn)?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(project_documents::table.find(document_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn resolve_project(conn: &mut PgConnection, project_id: Uuid) -> AppResult<()> {
    let found: bool = select(exists(projects::table.find(project_id))).get_result(conn)?;
    if !found {
        return Err(AppError::field("projectId", "el proyecto indicado no existe"));
    }
    Ok(())
}

fn resolve_user(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    let found: bool = select(exists(users::table.find(user_id))).get_result(conn)?;
    if !found {
        return Err(AppError::field("uploadedById", "el usuario indicado no existe"));
    }
    Ok(())
}
