use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{Company, CompanyContact, NewCompany},
    schema::{companies, company_contacts},
    state::AppState,
    validate::{optional_email, optional_str, require_str},
};

use super::contacts::ContactResponse;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub cif: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
    pub contacts: Vec<ContactResponse>,
}

pub(crate) fn to_company_response(
    company: Company,
    contacts: Vec<CompanyContact>,
) -> CompanyResponse {
    CompanyResponse {
        id: company.id,
        name: company.name,
        cif: company.cif,
        email: company.email,
        phone: company.phone,
        logo: company.logo,
        contacts: contacts.into_iter().map(ContactResponse::from).collect(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: Option<String>,
    pub cif: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchCompanyRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub cif: Option<Option<String>>,
    #[serde(default)]
    pub email: Option<Option<String>>,
    #[serde(default)]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub logo: Option<Option<String>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = companies)]
struct CompanyChangeset {
    name: Option<String>,
    cif: Option<Option<String>>,
    email: Option<Option<String>>,
    phone: Option<Option<String>>,
    logo: Option<Option<String>>,
}

impl CompanyChangeset {
    fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.cif.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.logo.is_some()
    }
}

pub async fn list_companies(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CompanyResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Company> = companies::table.order(companies::name.asc()).load(&mut conn)?;
    let contacts: Vec<CompanyContact> = CompanyContact::belonging_to(&rows).load(&mut conn)?;

    let mut by_company: HashMap<Uuid, Vec<CompanyContact>> = HashMap::new();
    for contact in contacts {
        by_company.entry(contact.company_id).or_default().push(contact);
    }

    let response = rows
        .into_iter()
        .map(|company| {
            let contacts = by_company.remove(&company.id).unwrap_or_default();
            to_company_response(company, contacts)
        })
        .collect();
    Ok(Json(response))
}

pub async fn create_company(
    State(state): State<AppState>,
    Json(payload): Json<CreateCompanyRequest>,
) -> AppResult<(StatusCode, Json<CompanyResponse>)> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let email = optional_email(&mut errors, "email", payload.email.as_deref());
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let new_company = NewCompany {
        id: Uuid::new_v4(),
        name: name.unwrap(),
        cif: optional_str(payload.cif.as_deref()),
        email,
        phone: optional_str(payload.phone.as_deref()),
        logo: optional_str(payload.logo.as_deref()),
    };

    let mut conn = state.db()?;
    diesel::insert_into(companies::table)
        .values(&new_company)
        .execute(&mut conn)?;

    let company: Company = companies::table.find(new_company.id).first(&mut conn)?;
    Ok((
        StatusCode::CREATED,
        Json(to_company_response(company, Vec::new())),
    ))
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<Json<CompanyResponse>> {
    let mut conn = state.db()?;
    let company: Company = companies::table.find(company_id).first(&mut conn)?;
    let contacts = load_contacts(&mut conn, company_id)?;
    Ok(Json(to_company_response(company, contacts)))
}

pub async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateCompanyRequest>,
) -> AppResult<Json<CompanyResponse>> {
    let mut errors = FieldErrors::new();
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let email = optional_email(&mut errors, "email", payload.email.as_deref());
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let _existing: Company = companies::table.find(company_id).first(&mut conn)?;

    let changeset = CompanyChangeset {
        name,
        cif: Some(optional_str(payload.cif.as_deref())),
        email: Some(email),
        phone: Some(optional_str(payload.phone.as_deref())),
        logo: Some(optional_str(payload.logo.as_deref())),
    };

    diesel::update(companies::table.find(company_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let company: Company = companies::table.find(company_id).first(&mut conn)?;
    let contacts = load_contacts(&mut conn, company_id)?;
    Ok(Json(to_company_response(company, contacts)))
}

pub async fn partial_update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<PatchCompanyRequest>,
) -> AppResult<Json<CompanyResponse>> {
    let mut conn = state.db()?;
    let _existing: Company = companies::table.find(company_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let name = match payload.name.as_deref() {
        Some(raw) => require_str(&mut errors, "name", Some(raw)),
        None => None,
    };
    let email = match payload.email {
        Some(Some(ref raw)) => Some(optional_email(&mut errors, "email", Some(raw.as_str()))),
        Some(None) => Some(None),
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let changeset = CompanyChangeset {
        name,
        cif: payload
            .cif
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        email,
        phone: payload
            .phone
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        logo: payload
            .logo
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
    };

    if changeset.has_changes() {
        diesel::update(companies::table.find(company_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let company: Company = companies::table.find(company_id).first(&mut conn)?;
    let contacts = load_contacts(&mut conn, company_id)?;
    Ok(Json(to_company_response(company, contacts)))
}

pub async fn delete_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    // Contacts go with the company (ON DELETE CASCADE).
    let deleted = diesel::delete(companies::table.find(company_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_logo(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = state.db()?;
    let company: Company = companies::table.find(company_id).first(&mut conn)?;

    let mut uploaded: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart payload: {err}")))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(format!("failed to read file: {err}")))?;
            uploaded = Some((bytes.to_vec(), content_type));
        }
    }

    let (bytes, content_type) =
        uploaded.ok_or_else(|| AppError::bad_request("missing file field"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("file must not be empty"));
    }

    let key = format!("company_logos/{}/{}", company_id, Uuid::new_v4());
    state
        .storage
        .put_object(&key, bytes, content_type)
        .await
        .map_err(AppError::internal)?;

    diesel::update(companies::table.find(company_id))
        .set(companies::logo.eq(Some(key.clone())))
        .execute(&mut conn)?;

    if let Some(old_key) = company.logo.filter(|value| value.starts_with("company_logos/")) {
        if let Err(err) = state.storage.delete_object(&old_key).await {
            tracing::warn!(company_id = %company_id, error = %err, "failed to delete replaced logo");
        }
    }

    let url = state
        .storage
        .presign_get_object(&key, std::time::Duration::from_secs(300))
        .await
        .map_err(AppError::internal)?;

    Ok(Json(json!({ "logo": key, "url": url })))
}

fn load_contacts(conn: &mut PgConnection, company_id: Uuid) -> AppResult<Vec<CompanyContact>> {
    let contacts = company_contacts::table
        .filter(company_contacts::company_id.eq(company_id))
        .order(company_contacts::first_name.asc())
        .load(conn)?;
    Ok(contacts)
}
