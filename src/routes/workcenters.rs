use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{NewWorkCenter, WorkCenter, PROVINCES, WORK_CENTER_TYPES},
    schema::work_centers,
    state::AppState,
    validate::{check_choice, optional_str, require_str},
};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkCenterResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub center_type: String,
    pub address: String,
    pub zip_code: String,
    pub phone: String,
    pub province: String,
    pub risk_info_url: Option<String>,
    pub risk_info_file_name: Option<String>,
}

impl From<WorkCenter> for WorkCenterResponse {
    fn from(center: WorkCenter) -> Self {
        Self {
            id: center.id,
            name: center.name,
            center_type: center.center_type,
            address: center.address,
            zip_code: center.zip_code,
            phone: center.phone,
            province: center.province,
            risk_info_url: center.risk_info_url,
            risk_info_file_name: center.risk_info_file_name,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkCenterRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub center_type: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub risk_info_url: Option<String>,
    pub risk_info_file_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchWorkCenterRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub center_type: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    #[serde(default)]
    pub risk_info_url: Option<Option<String>>,
    #[serde(default)]
    pub risk_info_file_name: Option<Option<String>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = work_centers)]
struct WorkCenterChangeset {
    name: Option<String>,
    center_type: Option<String>,
    address: Option<String>,
    zip_code: Option<String>,
    phone: Option<String>,
    province: Option<String>,
    risk_info_url: Option<Option<String>>,
    risk_info_file_name: Option<Option<String>>,
}

impl WorkCenterChangeset {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.center_type.is_some()
            || self.address.is_some()
            || self.zip_code.is_some()
            || self.phone.is_some()
            || self.province.is_some()
            || self.risk_info_url.is_some()
            || self.risk_info_file_name.is_some()
    }
}

fn validate_full(payload: &CreateWorkCenterRequest) -> Result<NewWorkCenterFields, AppError> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let center_type = require_str(&mut errors, "type", payload.center_type.as_deref());
    let address = require_str(&mut errors, "address", payload.address.as_deref());
    let zip_code = require_str(&mut errors, "zipCode", payload.zip_code.as_deref());
    let phone = require_str(&mut errors, "phone", payload.phone.as_deref());
    let province = require_str(&mut errors, "province", payload.province.as_deref());

    if let Some(ref value) = center_type {
        check_choice(&mut errors, "type", value, WORK_CENTER_TYPES);
    }
    if let Some(ref value) = province {
        check_choice(&mut errors, "province", value, PROVINCES);
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    Ok(NewWorkCenterFields {
        name: name.unwrap(),
        center_type: center_type.unwrap(),
        address: address.unwrap(),
        zip_code: zip_code.unwrap(),
        phone: phone.unwrap(),
        province: province.unwrap(),
        risk_info_url: optional_str(payload.risk_info_url.as_deref()),
        risk_info_file_name: optional_str(payload.risk_info_file_name.as_deref()),
    })
}

struct NewWorkCenterFields {
    name: String,
    center_type: String,
    address: String,
    zip_code: String,
    phone: String,
    province: String,
    risk_info_url: Option<String>,
    risk_info_file_name: Option<String>,
}

pub async fn list_work_centers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<WorkCenterResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<WorkCenter> = work_centers::table
        .order(work_centers::name.asc())
        .load(&mut conn)?;
    Ok(Json(rows.into_iter().map(WorkCenterResponse::from).collect()))
}

pub async fn create_work_center(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkCenterRequest>,
) -> AppResult<(StatusCode, Json<WorkCenterResponse>)> {
    let fields = validate_full(&payload)?;

    let new_center = NewWorkCenter {
        id: Uuid::new_v4(),
        name: fields.name,
        center_type: fields.center_type,
        address: fields.address,
        zip_code: fields.zip_code,
        phone: fields.phone,
        province: fields.province,
        risk_info_url: fields.risk_info_url,
        risk_info_file_name: fields.risk_info_file_name,
    };

    let mut conn = state.db()?;
    diesel::insert_into(work_centers::table)
        .values(&new_center)
        .execute(&mut conn)?;

    let center: WorkCenter = work_centers::table.find(new_center.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(WorkCenterResponse::from(center))))
}

pub async fn get_work_center(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
) -> AppResult<Json<WorkCenterResponse>> {
    let mut conn = state.db()?;
    let center: WorkCenter = work_centers::table.find(center_id).first(&mut conn)?;
    Ok(Json(WorkCenterResponse::from(center)))
}

pub async fn update_work_center(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
    Json(payload): Json<CreateWorkCenterRequest>,
) -> AppResult<Json<WorkCenterResponse>> {
    let fields = validate_full(&payload)?;

    let mut conn = state.db()?;
    let _existing: WorkCenter = work_centers::table.find(center_id).first(&mut conn)?;

    let changeset = WorkCenterChangeset {
        name: Some(fields.name),
        center_type: Some(fields.center_type),
        address: Some(fields.address),
        zip_code: Some(fields.zip_code),
        phone: Some(fields.phone),
        province: Some(fields.province),
        risk_info_url: Some(fields.risk_info_url),
        risk_info_file_name: Some(fields.risk_info_file_name),
    };

    diesel::update(work_centers::table.find(center_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let center: WorkCenter = work_centers::table.find(center_id).first(&mut conn)?;
    Ok(Json(WorkCenterResponse::from(center)))
}

pub async fn partial_update_work_center(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
    Json(payload): Json<PatchWorkCenterRequest>,
) -> AppResult<Json<WorkCenterResponse>> {
    let mut conn = state.db()?;
    let _existing: WorkCenter = work_centers::table.find(center_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let name = match payload.name.as_deref() {
        Some(raw) => require_str(&mut errors, "name", Some(raw)),
        None => None,
    };
    let center_type = match optional_str(payload.center_type.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "type", &value, WORK_CENTER_TYPES);
            Some(value)
        }
        None => None,
    };
    let address = match payload.address.as_deref() {
        Some(raw) => require_str(&mut errors, "address", Some(raw)),
        None => None,
    };
    let zip_code = match payload.zip_code.as_deref() {
        Some(raw) => require_str(&mut errors, "zipCode", Some(raw)),
        None => None,
    };
    let phone = match payload.phone.as_deref() {
        Some(raw) => require_str(&mut errors, "phone", Some(raw)),
        None => None,
    };
    let province = match optional_str(payload.province.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "province", &value, PROVINCES);
            Some(value)
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let changeset = WorkCenterChangeset {
        name,
        center_type,
        address,
        zip_code,
        phone,
        province,
        risk_info_url: payload
            .risk_info_url
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        risk_info_file_name: payload
            .risk_info_file_name
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
    };

    if changeset.has_changes() {
        diesel::update(work_centers::table.find(center_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let center: WorkCenter = work_centers::table.find(center_id).first(&mut conn)?;
    Ok(Json(WorkCenterResponse::from(center)))
}

pub async fn delete_work_center(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    // Referencing projects survive with the field cleared (ON DELETE SET NULL).
    let deleted = diesel::delete(work_centers::table.find(center_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}
