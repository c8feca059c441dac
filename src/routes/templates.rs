use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::Engine;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{DocumentTemplate, NewDocumentTemplate},
    schema::document_templates,
    state::AppState,
    validate::require_str,
};

use super::to_iso;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub file_data: String,
    pub file_name: String,
    pub updated_at: String,
}

impl From<DocumentTemplate> for TemplateResponse {
    fn from(template: DocumentTemplate) -> Self {
        Self {
            id: template.id,
            name: template.name,
            category: template.category,
            file_data: template.file_data,
            file_name: template.file_name,
            updated_at: to_iso(template.updated_at),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub file_data: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTemplateRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub file_data: Option<String>,
    pub file_name: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = document_templates)]
struct TemplateChangeset {
    name: Option<String>,
    category: Option<String>,
    file_data: Option<String>,
    file_name: Option<String>,
    updated_at: Option<chrono::NaiveDateTime>,
}

pub async fn list_templates(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TemplateResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<DocumentTemplate> = document_templates::table
        .order(document_templates::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(TemplateResponse::from).collect()))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(payload): Json<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<TemplateResponse>)> {
    let fields = validate_full(&payload)?;

    let new_template = NewDocumentTemplate {
        id: Uuid::new_v4(),
        name: fields.0,
        category: fields.1,
        file_data: fields.2,
        file_name: fields.3,
    };

    let mut conn = state.db()?;
    diesel::insert_into(document_templates::table)
        .values(&new_template)
        .execute(&mut conn)?;

    let template: DocumentTemplate = document_templates::table
        .find(new_template.id)
        .first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(TemplateResponse::from(template))))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> AppResult<Json<TemplateResponse>> {
    let mut conn = state.db()?;
    let template: DocumentTemplate = document_templates::table
        .find(template_id)
        .first(&mut conn)?;
    Ok(Json(TemplateResponse::from(template)))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<CreateTemplateRequest>,
) -> AppResult<Json<TemplateResponse>> {
    let fields = validate_full(&payload)?;

    let mut conn = state.db()?;
    let _existing: DocumentTemplate = document_templates::table
        .find(template_id)
        .first(&mut conn)?;

    let changeset = TemplateChangeset {
        name: Some(fields.0),
        category: Some(fields.1),
        file_data: Some(fields.2),
        file_name: Some(fields.3),
        updated_at: Some(chrono::Utc::now().naive_utc()),
    };

    diesel::update(document_templates::table.find(template_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let template: DocumentTemplate = document_templates::table
        .find(template_id)
        .first(&mut conn)?;
    Ok(Json(TemplateResponse::from(template)))
}

pub async fn partial_update_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<PatchTemplateRequest>,
) -> AppResult<Json<TemplateResponse>> {
    let mut conn = state.db()?;
    let _existing: DocumentTemplate = document_templates::table
        .find(template_id)
        .first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let name = match payload.name.as_deref() {
        Some(raw) => require_str(&mut errors, "name", Some(raw)),
        None => None,
    };
    let category = match payload.category.as_deref() {
        Some(raw) => require_str(&mut errors, "category", Some(raw)),
        None => None,
    };
    let file_data = match payload.file_data.as_deref() {
        Some(raw) => {
            let value = require_str(&mut errors, "fileData", Some(raw));
            if let Some(ref data) = value {
                check_base64(&mut errors, data);
            }
            value
        }
        None => None,
    };
    let file_name = match payload.file_name.as_deref() {
        Some(raw) => require_str(&mut errors, "fileName", Some(raw)),
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let changeset = TemplateChangeset {
        name,
        category,
        file_data,
        file_name,
        updated_at: Some(chrono::Utc::now().naive_utc()),
    };

    diesel::update(document_templates::table.find(template_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let template: DocumentTemplate = document_templates::table
        .find(template_id)
        .first(&mut conn)?;
    Ok(Json(TemplateResponse::from(template)))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(template_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted =
        diesel::delete(document_templates::table.find(template_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_full(
    payload: &CreateTemplateRequest,
) -> Result<(String, String, String, String), AppError> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let category = require_str(&mut errors, "category", payload.category.as_deref());
    let file_data = require_str(&mut errors, "fileData", payload.file_data.as_deref());
    let file_name = require_str(&mut errors, "fileName", payload.file_name.as_deref());
    if let Some(ref data) = file_data {
        check_base64(&mut errors, data);
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    Ok((
        name.unwrap(),
        category.unwrap(),
        file_data.unwrap(),
        file_name.unwrap(),
    ))
}

fn check_base64(errors: &mut crate::error::FieldErrors, data: &str) {
    // Payloads may arrive as data URLs; only the part after the comma is
    // base64.
    let encoded = data.rsplit(',').next().unwrap_or(data);
    if base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .is_err()
    {
        errors.insert(
            "fileData".to_string(),
            "el contenido no es base64 válido".to_string(),
        );
    }
}
